//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 默认过滤指令：`--verbose` 强制 debug，否则使用配置中的级别
pub fn default_directive(config_level: &str, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config_level.to_string()
    }
}

/// 初始化 tracing，`RUST_LOG` 优先
pub fn init(config_level: &str, verbose: bool) {
    let directive = default_directive(config_level, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    // 重复初始化时保留已有的订阅者
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
