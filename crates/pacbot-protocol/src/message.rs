//! Broker 消息定义

use crate::event::InboundEvent;
use crate::types::{CellPosition, Command};
use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 消息类型（帧头 2 字节，大端）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum MessageType {
    /// 期望方向（1 字节负载）
    PacmanCommand = 0x0001,
    /// 灯光/游戏状态中的 Pacman 坐标（8 字节负载：x, y 各 i32）
    LightState = 0x0002,
    /// 订阅请求（负载为 u16 消息类型列表）
    Subscribe = 0x00FF,
}

impl MessageType {
    pub fn from_wire(value: u16) -> Result<Self, ProtocolError> {
        MessageType::try_from(value)
            .map_err(|_| ProtocolError::UnknownMessageType { msg_type: value })
    }
}

/// Broker 消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    PacmanCommand(Command),
    LightState(CellPosition),
    Subscribe(Vec<MessageType>),
}

impl Message {
    pub fn msg_type(&self) -> MessageType {
        match self {
            Message::PacmanCommand(_) => MessageType::PacmanCommand,
            Message::LightState(_) => MessageType::LightState,
            Message::Subscribe(_) => MessageType::Subscribe,
        }
    }

    /// 转换为控制器入站事件（`Subscribe` 没有对应事件）
    pub fn into_event(self) -> Option<InboundEvent> {
        match self {
            Message::PacmanCommand(cmd) => Some(InboundEvent::Command(cmd)),
            Message::LightState(pos) => Some(InboundEvent::Position(pos)),
            Message::Subscribe(_) => None,
        }
    }
}
