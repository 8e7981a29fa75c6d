//! 电机驱动抽象
//!
//! 控制器把每条指令分解为原子运动（[`Primitive`]），逐个交给 [`MotorDriver`]。
//! 原子运动不返回位置信息，运动结果只能通过之后的位置观测得知。

use crate::error::MotorError;
use std::fmt;
use tracing::info;

/// 原子运动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// 前进一格
    Advance,
    /// 原地左转 90°
    RotateLeft,
    /// 原地右转 90°
    RotateRight,
    /// 后退一格
    Reverse,
    /// 停止
    Stop,
}

impl Primitive {
    pub const ALL: [Primitive; 5] = [
        Primitive::Advance,
        Primitive::RotateLeft,
        Primitive::RotateRight,
        Primitive::Reverse,
        Primitive::Stop,
    ];

    const fn index(self) -> usize {
        match self {
            Primitive::Advance => 0,
            Primitive::RotateLeft => 1,
            Primitive::RotateRight => 2,
            Primitive::Reverse => 3,
            Primitive::Stop => 4,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Advance => "advance",
            Primitive::RotateLeft => "rotate-left",
            Primitive::RotateRight => "rotate-right",
            Primitive::Reverse => "reverse",
            Primitive::Stop => "stop",
        };
        f.write_str(name)
    }
}

/// 电机驱动 Trait
///
/// 每个方法都是阻塞调用：返回时运动已经下发（是否真的完成由位置观测判断）。
pub trait MotorDriver {
    /// 前进一格
    fn advance(&mut self) -> Result<(), MotorError>;

    /// 原地左转 90°
    fn rotate_left(&mut self) -> Result<(), MotorError>;

    /// 原地右转 90°
    fn rotate_right(&mut self) -> Result<(), MotorError>;

    /// 后退一格
    fn reverse(&mut self) -> Result<(), MotorError>;

    /// 停止
    fn stop(&mut self) -> Result<(), MotorError>;

    /// 按 [`Primitive`] 分发
    fn apply(&mut self, primitive: Primitive) -> Result<(), MotorError> {
        match primitive {
            Primitive::Advance => self.advance(),
            Primitive::RotateLeft => self.rotate_left(),
            Primitive::RotateRight => self.rotate_right(),
            Primitive::Reverse => self.reverse(),
            Primitive::Stop => self.stop(),
        }
    }
}

impl<M: MotorDriver + ?Sized> MotorDriver for Box<M> {
    fn advance(&mut self) -> Result<(), MotorError> {
        (**self).advance()
    }

    fn rotate_left(&mut self) -> Result<(), MotorError> {
        (**self).rotate_left()
    }

    fn rotate_right(&mut self) -> Result<(), MotorError> {
        (**self).rotate_right()
    }

    fn reverse(&mut self) -> Result<(), MotorError> {
        (**self).reverse()
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        (**self).stop()
    }

    fn apply(&mut self, primitive: Primitive) -> Result<(), MotorError> {
        (**self).apply(primitive)
    }
}

/// 空跑电机
///
/// 不驱动任何硬件，只记录日志并计数。用于在没有底盘的情况下联调 broker。
#[derive(Debug, Default)]
pub struct LoggingMotor {
    counts: [u64; 5],
}

impl LoggingMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某种原子运动已执行的次数
    pub fn count(&self, primitive: Primitive) -> u64 {
        self.counts[primitive.index()]
    }

    /// 所有原子运动的总次数
    pub fn total(&self) -> u64 {
        Primitive::ALL.iter().map(|p| self.count(*p)).sum()
    }

    fn record(&mut self, primitive: Primitive) -> Result<(), MotorError> {
        let n = &mut self.counts[primitive.index()];
        *n += 1;
        info!("[dry-run] motor {} (#{})", primitive, n);
        Ok(())
    }
}

impl MotorDriver for LoggingMotor {
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
