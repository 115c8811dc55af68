//! BlogForge
//!
//! 根据一个想法调用大模型生成博客标题和正文，再按用户反馈重新生成。
//!
//! ## Workspace 结构
//!
//! - blogforge-core：配置、消息模型、错误码、日志脱敏
//! - blogforge-providers：模型客户端（Groq / OpenAI 兼容接口）
//! - blogforge-services：状态图、生成步骤、反馈路由、草稿管理
//! - blogforge-server-utils：错误响应、HTML 转义、Markdown 渲染
//! - blogforge-server：Web 页面与 JSON API
//! - 主 crate：命令行入口

pub mod cli;
pub mod commands;
pub mod logger;

use blogforge_core::config::AppConfig;
use cli::{Cli, Commands};

/// 解析命令行并执行子命令
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    if let Commands::InitConfig { force } = cli.command {
        logger::init("info", cli.verbose);
        let path = cli.config.unwrap_or_else(AppConfig::default_path);
        commands::run_init_config(&path, force)?;
        println!("已写入配置文件: {}", path.display());
        return Ok(());
    }

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    logger::init(&config.logging.level, cli.verbose);
    let dotenv = commands::load_dotenv();

    match cli.command {
        Commands::Serve { host, port } => commands::run_serve(config, host, port, &dotenv).await,
        Commands::Draft { idea, feedback } => {
            let service = commands::build_service(&config, &dotenv)?;
            let mut stdout = std::io::stdout();
            commands::run_draft(&service, &idea, &feedback, &mut stdout).await
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}
