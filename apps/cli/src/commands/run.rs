//! 运行命令
//!
//! 连接 broker，订阅指令和位置消息，用空跑电机执行（只记录日志）。

use super::{install_interrupt_handler, print_metrics};
use anyhow::{Context, Result};
use clap::Args;
use pacbot_driver::{BrokerClient, LoggingMotor};
use pacbot_nav::{NavConfig, NavController, run_nav_loop};
use std::path::Path;
use tracing::info;

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Broker 地址（覆盖配置和 LOCAL_ADDRESS）
    #[arg(short, long)]
    pub address: Option<String>,

    /// Broker 端口（覆盖配置和 LOCAL_PORT）
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 运行指定 tick 数后退出
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

impl RunCommand {
    /// 合并配置：命令行 > 环境变量 > 配置文件 > 默认值
    pub fn resolve_config(&self, config_path: Option<&Path>) -> Result<NavConfig> {
        let mut config = NavConfig::load(config_path).context("Failed to load config")?;
        if let Some(address) = &self.address {
            config.broker.address = address.clone();
        }
        if let Some(port) = self.port {
            config.broker.port = port;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = self.resolve_config(config_path)?;
        let endpoint = config.broker.endpoint();

        let (tx, mut inbox) = crossbeam_channel::unbounded();
        println!("🔌 连接到 broker {}...", endpoint);
        let client = BrokerClient::connect(&endpoint, &config.broker.transport_config(), tx)
            .with_context(|| format!("Failed to connect to broker at {}", endpoint))?;

        let is_running = install_interrupt_handler()?;
        let mut nav = NavController::from_config(LoggingMotor::new(), &config.controller);
        let mut loop_config = config.controller.loop_config();
        loop_config.max_ticks = self.max_ticks;

        println!("✅ 已连接，按 Ctrl-C 停止");
        let result = run_nav_loop(&mut nav, &mut inbox, &loop_config, &is_running, None);
        client.shutdown();

        let exit = result.context("Navigation loop failed")?;
        info!("Loop exited: {:?}", exit.reason);
        println!("🛑 已停止 ({:?}, {} ticks)", exit.reason, exit.ticks);
        print_metrics(&nav.metrics().snapshot());
        println!("  电机调用:       {}", nav.motor().total());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[broker]\naddress = \"10.1.1.1\"\nport = 5000").unwrap();

        let cmd = RunCommand {
            address: None,
            port: Some(6000),
            max_ticks: None,
        };
        let config = cmd.resolve_config(Some(file.path())).unwrap();
        assert_eq!(config.broker.port, 6000);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cmd = RunCommand {
            address: Some("  ".to_string()),
            port: None,
            max_ticks: None,
        };
        assert!(cmd.resolve_config(None).is_err());
    }
}
