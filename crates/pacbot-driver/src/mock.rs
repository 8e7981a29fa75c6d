//! Mock 电机
//!
//! 记录所有原子运动，可选地注入故障或模拟"卡住"的摄像头。
//! 仅在测试或启用 `mock` feature 时编译。

use crate::error::MotorError;
use crate::motor::{MotorDriver, Primitive};
use crossbeam_channel::Sender;
use pacbot_protocol::{CellPosition, InboundEvent};
use parking_lot::Mutex;
use std::sync::Arc;

/// 已记录调用的共享句柄
#[derive(Debug, Clone, Default)]
pub struct MockCalls {
    inner: Arc<Mutex<Vec<Primitive>>>,
}

impl MockCalls {
    /// 当前记录的副本
    pub fn snapshot(&self) -> Vec<Primitive> {
        self.inner.lock().clone()
    }

    /// 取出并清空记录
    pub fn take(&self) -> Vec<Primitive> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// 某种原子运动的次数
    pub fn count(&self, primitive: Primitive) -> usize {
        self.inner.lock().iter().filter(|p| **p == primitive).count()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn push(&self, primitive: Primitive) {
        self.inner.lock().push(primitive);
    }
}

/// Mock 电机
///
/// # 示例
///
/// ```rust,ignore
/// let mut motor = MockMotor::new();
/// let calls = motor.calls();
/// motor.advance()?;
/// assert_eq!(calls.snapshot(), vec![Primitive::Advance]);
/// ```
#[derive(Debug, Default)]
pub struct MockMotor {
    calls: MockCalls,
    stuck_camera: Option<(Sender<InboundEvent>, CellPosition)>,
    fail_on: Option<Primitive>,
}

impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 调用记录句柄（电机被控制器拿走后仍可读取）
    pub fn calls(&self) -> MockCalls {
        self.calls.clone()
    }

    /// 每个原子运动之后都发布同一个位置，模拟机器人被墙挡住
    pub fn with_stuck_camera(mut self, camera: Sender<InboundEvent>, at: CellPosition) -> Self {
        self.stuck_camera = Some((camera, at));
        self
    }

    /// 执行指定原子运动时返回 `MotorError::Fault`
    pub fn fail_on(mut self, primitive: Primitive) -> Self {
        self.fail_on = Some(primitive);
        self
    }

    fn record(&mut self, primitive: Primitive) -> Result<(), MotorError> {
        self.calls.push(primitive);
        if self.fail_on == Some(primitive) {
            return Err(MotorError::Fault(format!("injected failure on {}", primitive)));
        }
        if let Some((camera, at)) = &self.stuck_camera {
            let _ = camera.send(InboundEvent::Position(*at));
        }
        Ok(())
    }
}

impl MotorDriver for MockMotor {
    fn advance(&mut self) -> Result<(), MotorError> {
        self.record(Primitive::Advance)
    }

    fn rotate_left(&mut self) -> Result<(), MotorError> {
        self.record(Primitive::RotateLeft)
    }

    fn rotate_right(&mut self) -> Result<(), MotorError> {
        self.record(Primitive::RotateRight)
    }

    fn reverse(&mut self) -> Result<(), MotorError> {
        self.record(Primitive::Reverse)
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.record(Primitive::Stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let mut motor = MockMotor::new();
        let calls = motor.calls();
        motor.advance().unwrap();
        motor.rotate_right().unwrap();
        motor.advance().unwrap();

        assert_eq!(calls.count(Primitive::Advance), 2);
        assert_eq!(
            calls.take(),
            vec![Primitive::Advance, Primitive::RotateRight, Primitive::Advance]
        );
        assert!(calls.is_empty());
    }

    #[test]
    fn test_mock_injected_failure() {
        let mut motor = MockMotor::new().fail_on(Primitive::Reverse);
        let calls = motor.calls();
        assert!(motor.advance().is_ok());
        assert!(matches!(motor.reverse(), Err(MotorError::Fault(_))));
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_mock_stuck_camera() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let at = CellPosition::new(2, 2);
        let mut motor = MockMotor::new().with_stuck_camera(tx, at);
        motor.advance().unwrap();
        motor.rotate_left().unwrap();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![InboundEvent::Position(at); 2]);
    }
}
