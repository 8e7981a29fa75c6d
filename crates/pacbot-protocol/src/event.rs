//! 入站事件
//!
//! 控制器收件箱按到达顺序消费的事件。

use crate::types::{CellPosition, Command};

/// 控制器入站事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    /// 期望方向指令（覆盖未执行的指令）
    Command(Command),
    /// 外部观测到的位置
    Position(CellPosition),
    /// 优雅退出请求
    Shutdown,
}

impl From<Command> for InboundEvent {
    fn from(cmd: Command) -> Self {
        InboundEvent::Command(cmd)
    }
}

impl From<CellPosition> for InboundEvent {
    fn from(pos: CellPosition) -> Self {
        InboundEvent::Position(pos)
    }
}
