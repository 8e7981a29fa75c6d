//! 驱动层模块
//!
//! 本模块提供导航控制器的外部协作者：
//! - 电机驱动抽象（`MotorDriver`，原子运动：前进、左转、右转、后退、停止）
//! - 空跑电机（`LoggingMotor`，只记录日志）
//! - 网格仿真（`SimWorld` / `SimMotor`，模拟迷宫与俯视摄像头）
//! - Broker 传输（`BrokerClient`，订阅指令与位置消息并投递到收件箱）
//!
//! 控制器只依赖 `MotorDriver` trait 和入站事件通道，不依赖具体实现。

mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod motor;
pub mod sim;
pub mod transport;

pub use error::{MotorError, SimError, TransportError};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCalls, MockMotor};
pub use motor::{LoggingMotor, MotorDriver, Primitive};
pub use sim::{SimMotor, SimWorld};
pub use transport::{BrokerClient, TransportConfig};
