//! 配置
//!
//! TOML 文件（所有段和字段都可省略），加载后再应用环境变量覆盖：
//!
//! ```toml
//! [broker]
//! address = "localhost"      # LOCAL_ADDRESS
//! port = 11295               # LOCAL_PORT
//! connect_timeout_ms = 2000
//! read_timeout_ms = 50
//!
//! [controller]
//! tick_hz = 60
//! initial_heading = "east"
//! max_recovery_attempts = 8  # 0 = 无限重试
//! settle = "await"           # "await" | "immediate"
//! settle_timeout_ms = 250
//! ```

use crate::error::ConfigError;
use crate::policy::{
    DEFAULT_MAX_RECOVERY_ATTEMPTS, DEFAULT_SETTLE_TIMEOUT, RecoveryPolicy, SettlePolicy,
};
use crate::runner::LoopConfig;
use pacbot_driver::TransportConfig;
use pacbot_protocol::Heading;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Broker 地址环境变量
pub const ENV_ADDRESS: &str = "LOCAL_ADDRESS";
/// Broker 端口环境变量
pub const ENV_PORT: &str = "LOCAL_PORT";

/// 完整配置
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    pub broker: BrokerConfig,
    pub controller: ControllerConfig,
}

/// `[broker]` 段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub address: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 11295,
            connect_timeout_ms: 2000,
            read_timeout_ms: 50,
        }
    }
}

impl BrokerConfig {
    /// `host:port`
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

/// 前进后的位置采样方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleMode {
    /// 等待位置观测（最长 `settle_timeout_ms`）
    #[default]
    Await,
    /// 只读取已到达的事件
    Immediate,
}

/// `[controller]` 段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub tick_hz: u32,
    pub initial_heading: Heading,
    /// 0 表示无限重试
    pub max_recovery_attempts: u32,
    pub settle: SettleMode,
    pub settle_timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            initial_heading: Heading::East,
            max_recovery_attempts: DEFAULT_MAX_RECOVERY_ATTEMPTS,
            settle: SettleMode::Await,
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ControllerConfig {
    pub fn settle_policy(&self) -> SettlePolicy {
        match self.settle {
            SettleMode::Await => SettlePolicy::AwaitObservation {
                timeout: Duration::from_millis(self.settle_timeout_ms),
            },
            SettleMode::Immediate => SettlePolicy::Immediate,
        }
    }

    pub fn recovery_policy(&self) -> RecoveryPolicy {
        match self.max_recovery_attempts {
            0 => RecoveryPolicy::UNBOUNDED,
            n => RecoveryPolicy::bounded(n),
        }
    }

    /// 不限制 tick 数的循环配置
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            tick_hz: self.tick_hz,
            max_ticks: None,
        }
    }
}

impl NavConfig {
    /// 加载配置：文件（可选）→ 环境变量覆盖 → 校验
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 只读取文件，不应用环境变量，不校验
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 用 `lookup` 查询 `LOCAL_ADDRESS` / `LOCAL_PORT` 并覆盖 broker 配置
    ///
    /// 空字符串视为未设置。
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup(ENV_ADDRESS).filter(|v| !v.trim().is_empty()) {
            debug!("{} overrides broker address: {}", ENV_ADDRESS, address);
            self.broker.address = address.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.trim().is_empty()) {
            self.broker.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT,
                value: port.clone(),
            })?;
            debug!("{} overrides broker port: {}", ENV_PORT, self.broker.port);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.address.trim().is_empty() {
            return Err(ConfigError::Invalid("broker.address must not be empty".to_string()));
        }
        if self.broker.port == 0 {
            return Err(ConfigError::Invalid("broker.port must not be 0".to_string()));
        }
        if self.broker.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "broker.read_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.controller.tick_hz == 0 {
            return Err(ConfigError::Invalid(
                "controller.tick_hz must be greater than 0".to_string(),
            ));
        }
        if self.controller.settle == SettleMode::Await && self.controller.settle_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "controller.settle_timeout_ms must be greater than 0 when settle = \"await\""
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NavConfig::default();
        assert_eq!(config.broker.endpoint(), "localhost:11295");
        assert_eq!(config.controller.tick_hz, 60);
        assert_eq!(config.controller.initial_heading, Heading::East);
        assert_eq!(config.controller.recovery_policy(), RecoveryPolicy::bounded(8));
        assert_eq!(config.controller.settle_policy(), SettlePolicy::default());
        assert_eq!(config.broker.transport_config(), TransportConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = NavConfig::from_toml_str(
            r#"
            [controller]
            initial_heading = "north"
            max_recovery_attempts = 0
            settle = "immediate"
            "#,
        )
        .unwrap();
        assert_eq!(config.broker, BrokerConfig::default());
        assert_eq!(config.controller.initial_heading, Heading::North);
        assert_eq!(config.controller.recovery_policy(), RecoveryPolicy::UNBOUNDED);
        assert_eq!(config.controller.settle_policy(), SettlePolicy::Immediate);
        assert_eq!(config.controller.tick_hz, 60);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = NavConfig::from_toml_str("[broker]\nhost = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = NavConfig::default();
        config.broker.port = 4000;
        config.controller.initial_heading = Heading::West;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("initial_heading = \"west\""));
        assert_eq!(NavConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = NavConfig::default();
        config
            .apply_env_with(env(&[(ENV_ADDRESS, "192.168.0.100"), (ENV_PORT, "11297")]))
            .unwrap();
        assert_eq!(config.broker.endpoint(), "192.168.0.100:11297");

        // 空值不覆盖
        config.apply_env_with(env(&[(ENV_ADDRESS, ""), (ENV_PORT, " ")])).unwrap();
        assert_eq!(config.broker.endpoint(), "192.168.0.100:11297");
    }

    #[test]
    fn test_env_invalid_port() {
        let mut config = NavConfig::default();
        let err = config.apply_env_with(env(&[(ENV_PORT, "70000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_PORT, .. }));
    }

    #[test]
    fn test_validate() {
        let mut config = NavConfig::default();
        config.controller.tick_hz = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = NavConfig::default();
        config.broker.port = 0;
        assert!(config.validate().is_err());

        let mut config = NavConfig::default();
        config.controller.settle_timeout_ms = 0;
        assert!(config.validate().is_err());
        config.controller.settle = SettleMode::Immediate;
        assert!(config.validate().is_ok());
    }
}
