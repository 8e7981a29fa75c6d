//! # Pacbot Protocol
//!
//! 网格导航的值类型与 broker 线协议（无硬件依赖）
//!
//! ## 模块
//!
//! - `types`: 朝向、方向指令、网格坐标
//! - `turn`: 朝向 × 期望方向 → 转向动作 的邻接表
//! - `event`: 控制器收件箱中的入站事件
//! - `message`: broker 消息类型
//! - `codec`: 帧编码 / 流式解码
//!
//! ## 字节序
//!
//! 线协议使用大端字节序（网络字节序）。

pub mod codec;
pub mod event;
pub mod message;
pub mod turn;
pub mod types;

// 重新导出常用类型
pub use codec::{FrameDecoder, HEADER_LEN, MAX_PAYLOAD_LEN, encode};
pub use event::InboundEvent;
pub use message::{Message, MessageType};
pub use turn::{Turn, turn_for};
pub use types::{CellPosition, Command, Heading};

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid payload length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unknown message type: 0x{msg_type:04X}")]
    UnknownMessageType { msg_type: u16 },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },

    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Parse error: {0}")]
    ParseError(String),
}
