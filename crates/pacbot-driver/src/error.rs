//! 驱动层错误类型定义

use pacbot_protocol::ProtocolError;
use thiserror::Error;

/// 电机驱动错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotorError {
    /// 驱动器报告故障
    #[error("Motor fault: {0}")]
    Fault(String),

    /// 驱动器已断开
    #[error("Motor driver disconnected")]
    Disconnected,

    /// 运动未在规定时间内完成
    #[error("Motor operation timeout")]
    Timeout,
}

/// Broker 传输错误
#[derive(Error, Debug)]
pub enum TransportError {
    /// 地址解析失败
    #[error("Cannot resolve broker address '{0}'")]
    Resolve(String),

    /// 连接失败
    #[error("Failed to connect to broker at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// 仿真迷宫解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Maze is empty")]
    EmptyMaze,

    #[error("Maze has no start cell 'P'")]
    MissingStart,

    #[error("Maze has more than one start cell 'P' (row {row}, col {col})")]
    MultipleStarts { row: usize, col: usize },

    #[error("Invalid maze cell {ch:?} at row {row}, col {col}")]
    InvalidCell { ch: char, row: usize, col: usize },
}
