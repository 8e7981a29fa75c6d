//! # Pacbot Nav
//!
//! Command-line runner for the Pacbot grid navigation controller.
//!
//! ```bash
//! # 连接 broker，空跑电机（Ctrl-C 停止）
//! LOCAL_ADDRESS=192.168.0.100 LOCAL_PORT=11297 pacbot-nav run
//!
//! # 在内置迷宫上仿真一串指令
//! pacbot-nav simulate --commands N,E,E,S,STOP
//!
//! # 查看 / 检查配置
//! pacbot-nav --config nav.toml config show
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{ConfigCommand, RunCommand, SimulateCommand};

/// 未设置 `RUST_LOG` 时的日志过滤
const DEFAULT_LOG_FILTER: &str = "pacbot_nav=info,pacbot_driver=info,pacbot_cli=info";

/// Pacbot 导航控制器
#[derive(Parser, Debug)]
#[command(name = "pacbot-nav")]
#[command(about = "Grid navigation controller for the Pacbot robot", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML 配置文件（省略时使用默认值 + 环境变量）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 连接 broker 并运行控制循环
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 在网格仿真上运行一串指令
    Simulate {
        #[command(flatten)]
        args: SimulateCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run { args } => args.execute(config_path),
        Commands::Simulate { args } => args.execute(config_path),
        Commands::Config(cmd) => cmd.execute(config_path),
    }
}
