//! 导航层错误类型定义

use pacbot_driver::MotorError;
use pacbot_protocol::CellPosition;
use std::path::PathBuf;
use thiserror::Error;

/// 指令执行错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// 电机故障（终止控制循环）
    #[error("Motor error: {0}")]
    Motor(#[from] MotorError),

    /// 卡住恢复次数耗尽，位置始终未变化
    #[error("Robot stuck at {position} after {attempts} recovery attempts")]
    Stuck { position: CellPosition, attempts: u32 },
}

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 环境变量值无效
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    /// 配置值无效
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_error_display() {
        let err = NavError::Stuck {
            position: CellPosition::new(3, 4),
            attempts: 8,
        };
        assert_eq!(err.to_string(), "Robot stuck at (3, 4) after 8 recovery attempts");

        let err: NavError = MotorError::Disconnected.into();
        assert!(err.to_string().starts_with("Motor error:"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidEnv {
            var: "LOCAL_PORT",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for LOCAL_PORT: \"abc\"");

        let err = ConfigError::Invalid("tick_hz must be greater than 0".to_string());
        assert!(err.to_string().contains("tick_hz"));
    }
}
