//! 配置管理命令

use anyhow::{Context, Result};
use clap::Subcommand;
use pacbot_nav::{NavConfig, SettleMode};
use std::path::Path;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效的配置（TOML）
    Show,

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = NavConfig::load(config_path).context("Invalid configuration")?;
        match self {
            ConfigCommand::Show => {
                print!("{}", config.to_toml_string()?);
            },
            ConfigCommand::Check => {
                match config_path {
                    Some(path) => println!("配置文件: {}", path.display()),
                    None => println!("配置文件: (未指定，使用默认值)"),
                }
                println!("{}", describe(&config));
                println!("✅ 配置有效");
            },
        }
        Ok(())
    }
}

fn describe(config: &NavConfig) -> String {
    let recovery = match config.controller.recovery_policy().max_attempts {
        Some(n) => format!("最多 {} 次", n),
        None => "不限".to_string(),
    };
    let settle = match config.controller.settle {
        SettleMode::Await => format!("等待观测 {}ms", config.controller.settle_timeout_ms),
        SettleMode::Immediate => "立即比较".to_string(),
    };
    format!(
        "  broker:   {}\n  频率:     {} Hz\n  初始朝向: {}\n  卡住恢复: {}\n  位置采样: {}",
        config.broker.endpoint(),
        config.controller.tick_hz,
        config.controller.initial_heading,
        recovery,
        settle
    )
}
