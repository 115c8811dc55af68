//! 命令行参数

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BlogForge - 根据一个想法生成博客标题和正文，并按反馈重新生成
#[derive(Parser, Debug)]
#[command(name = "blogforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 启动 Web 服务
    Serve {
        /// 监听地址（覆盖配置文件）
        #[arg(long)]
        host: Option<String>,

        /// 监听端口（覆盖配置文件）
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// 生成一篇博客并输出到标准输出
    Draft {
        /// 博客想法
        #[arg(short, long)]
        idea: String,

        /// 依次应用的反馈，例如 "change title"
        #[arg(short, long)]
        feedback: Vec<String>,
    },

    /// 写入默认配置文件
    InitConfig {
        /// 覆盖已存在的配置文件
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_draft_with_repeated_feedback() {
        let cli = Cli::try_parse_from([
            "blogforge",
            "draft",
            "--idea",
            "a robot learns to paint",
            "--feedback",
            "change title",
            "--feedback",
            "change content",
        ])
        .unwrap();

        match cli.command {
            Commands::Draft { idea, feedback } => {
                assert_eq!(idea, "a robot learns to paint");
                assert_eq!(feedback, vec!["change title", "change content"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_with_global_flags() {
        let cli = Cli::try_parse_from([
            "blogforge",
            "serve",
            "--port",
            "9000",
            "--verbose",
            "--config",
            "/tmp/blogforge.yaml",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/blogforge.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: Some(9000)
            }
        ));
    }
}
