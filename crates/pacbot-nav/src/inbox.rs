//! 收件箱抽象
//!
//! 控制器在执行指令期间（等待位置观测时）也需要读取事件，
//! 因此把事件来源抽象为 [`EventSource`]，而不是直接绑定到某种通道。

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use pacbot_protocol::InboundEvent;
use std::collections::VecDeque;
use std::time::Duration;

/// 一次读取的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recv {
    /// 收到事件
    Event(InboundEvent),
    /// 当前没有事件（或等待超时）
    Empty,
    /// 所有发送端已关闭，之后不会再有事件
    Closed,
}

/// 入站事件来源
pub trait EventSource {
    /// 非阻塞读取
    fn try_next(&mut self) -> Recv;

    /// 阻塞读取，最长等待 `timeout`
    fn next_timeout(&mut self, timeout: Duration) -> Recv;
}

impl EventSource for Receiver<InboundEvent> {
    fn try_next(&mut self) -> Recv {
        match self.try_recv() {
            Ok(event) => Recv::Event(event),
            Err(TryRecvError::Empty) => Recv::Empty,
            Err(TryRecvError::Disconnected) => Recv::Closed,
        }
    }

    fn next_timeout(&mut self, timeout: Duration) -> Recv {
        match self.recv_timeout(timeout) {
            Ok(event) => Recv::Event(event),
            Err(RecvTimeoutError::Timeout) => Recv::Empty,
            Err(RecvTimeoutError::Disconnected) => Recv::Closed,
        }
    }
}

/// 脚本化输入：按顺序弹出，耗尽后返回 `Empty`，不会等待
impl EventSource for VecDeque<InboundEvent> {
    fn try_next(&mut self) -> Recv {
        self.pop_front().map_or(Recv::Empty, Recv::Event)
    }

    fn next_timeout(&mut self, _timeout: Duration) -> Recv {
        self.try_next()
    }
}
