//! 定频控制循环
//!
//! 每个周期：取出收件箱中所有事件 → `on_tick` → 发布快照。
//! 使用绝对时间锚点 + `spin_sleep`，单次 tick 超时（卡住恢复）不会累积漂移。
//!
//! # 退出条件
//!
//! - `is_running` 被清除（Ctrl-C）
//! - 收到 `Shutdown` 事件
//! - 收件箱所有发送端关闭（broker 断开）
//! - 达到 `max_ticks`
//!
//! 无论哪种退出方式（包括电机错误），退出前都会调用一次 `on_shutdown` 停止电机。

use crate::controller::NavController;
use crate::error::NavError;
use crate::inbox::{EventSource, Recv};
use crate::observer::NavObserver;
use pacbot_driver::MotorDriver;
use spin_sleep::SpinSleeper;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 循环配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// tick 频率（Hz），0 按 1 处理
    pub tick_hz: u32,
    /// 最多运行的 tick 数（`None` 表示不限）
    pub max_ticks: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            max_ticks: None,
        }
    }
}

impl LoopConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }
}

/// 循环退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// 运行标志被清除
    Stopped,
    /// 收到 `Shutdown` 事件
    ShutdownRequested,
    /// 收件箱已关闭
    InboxClosed,
    /// 达到 `max_ticks`
    TickLimit,
}

/// 循环退出信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopExit {
    pub reason: ExitReason,
    pub ticks: u64,
}

/// 运行控制循环直到退出条件满足
///
/// # 错误
///
/// 电机错误会终止循环并返回 `NavError::Motor`（仍会尝试停止电机）。
/// `NavError::Stuck` 只记录日志，循环继续。
pub fn run_nav_loop<M, S>(
    controller: &mut NavController<M>,
    inbox: &mut S,
    config: &LoopConfig,
    is_running: &AtomicBool,
    observer: Option<&NavObserver>,
) -> Result<LoopExit, NavError>
where
    M: MotorDriver,
    S: EventSource + ?Sized,
{
    let period = config.period();
    let sleeper = SpinSleeper::default();
    let mut ticks = 0u64;
    let mut next_tick = Instant::now();
    info!("Navigation loop started at {} Hz", config.tick_hz.max(1));

    let outcome = loop {
        if !is_running.load(Ordering::Acquire) {
            break Ok(ExitReason::Stopped);
        }

        let mut closed = false;
        loop {
            match inbox.try_next() {
                Recv::Event(event) => controller.handle_event(event),
                Recv::Empty => break,
                Recv::Closed => {
                    closed = true;
                    break;
                },
            }
        }
        if controller.shutdown_requested() {
            break Ok(ExitReason::ShutdownRequested);
        }

        match controller.on_tick(inbox) {
            Ok(_) => {},
            Err(NavError::Stuck { position, attempts }) => {
                warn!(
                    "Command abandoned at {} after {} recovery attempts, waiting for next command",
                    position, attempts
                );
            },
            Err(e) => break Err(e),
        }
        ticks += 1;
        if let Some(observer) = observer {
            observer.publish(controller.snapshot());
        }

        if closed {
            break Ok(ExitReason::InboxClosed);
        }
        if controller.shutdown_requested() {
            break Ok(ExitReason::ShutdownRequested);
        }
        if config.max_ticks.is_some_and(|max| ticks >= max) {
            break Ok(ExitReason::TickLimit);
        }

        next_tick += period;
        let now = Instant::now();
        if next_tick > now {
            sleeper.sleep(next_tick - now);
        } else {
            // 本次 tick 超时（例如卡住恢复），重新对齐锚点，不补跑错过的 tick
            debug!("Tick overran by {:?}", now - next_tick);
            next_tick = now;
        }
    };

    let stopped = controller.on_shutdown();
    match outcome {
        Ok(reason) => {
            stopped?;
            info!("Navigation loop exited ({:?}) after {} ticks", reason, ticks);
            Ok(LoopExit { reason, ticks })
        },
        Err(e) => {
            error!("Navigation loop aborted after {} ticks: {}", ticks, e);
            if let Err(stop_err) = stopped {
                error!("Final stop failed: {}", stop_err);
            }
            Err(e)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::SettlePolicy;
    use pacbot_driver::{MockMotor, Primitive};
    use pacbot_protocol::{Command, InboundEvent};
    use std::collections::VecDeque;

    fn fast(max_ticks: u64) -> LoopConfig {
        LoopConfig {
            tick_hz: 1000,
            max_ticks: Some(max_ticks),
        }
    }

    #[test]
    fn test_period() {
        let config = LoopConfig::default();
        assert!((config.period().as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
        let zero = LoopConfig {
            tick_hz: 0,
            max_ticks: None,
        };
        assert_eq!(zero.period(), Duration::from_secs(1));
    }

    #[test]
    fn test_stops_when_flag_cleared() {
        let motor = MockMotor::new();
        let calls = motor.calls();
        let mut nav = NavController::new(motor);
        let running = AtomicBool::new(false);

        let mut inbox: VecDeque<InboundEvent> = VecDeque::new();

        let exit = run_nav_loop(&mut nav, &mut inbox, &fast(10), &running, None).unwrap();
        assert_eq!(
            exit,
            LoopExit {
                reason: ExitReason::Stopped,
                ticks: 0
            }
        );
        // 最终停止
        assert_eq!(calls.snapshot(), vec![Primitive::Stop]);
    }

    #[test]
    fn test_tick_limit_and_observer() {
        let motor = MockMotor::new();
        let calls = motor.calls();
        let mut nav = NavController::new(motor).with_settle_policy(SettlePolicy::Immediate);
        let observer = NavObserver::new();
        let running = AtomicBool::new(true);
        let mut inbox = VecDeque::from(vec![
            InboundEvent::Command(Command::North),
            InboundEvent::Command(Command::East),
        ]);

        let exit = run_nav_loop(&mut nav, &mut inbox, &fast(3), &running, Some(&observer)).unwrap();
        assert_eq!(exit.reason, ExitReason::TickLimit);
        assert_eq!(exit.ticks, 3);
        // 同一 tick 内两条指令只执行后一条
        assert_eq!(calls.snapshot(), vec![Primitive::Advance, Primitive::Stop]);
        assert_eq!(observer.snapshot().ticks, 3);
    }

    #[test]
    fn test_shutdown_event_skips_pending() {
        let motor = MockMotor::new();
        let calls = motor.calls();
        let mut nav = NavController::new(motor);
        let running = AtomicBool::new(true);
        let mut inbox = VecDeque::from(vec![
            InboundEvent::Command(Command::South),
            InboundEvent::Shutdown,
        ]);

        let exit = run_nav_loop(&mut nav, &mut inbox, &fast(10), &running, None).unwrap();
        assert_eq!(exit.reason, ExitReason::ShutdownRequested);
        assert_eq!(exit.ticks, 0);
        assert_eq!(calls.snapshot(), vec![Primitive::Stop]);
    }

    #[test]
    fn test_motor_error_still_stops() {
        let motor = MockMotor::new().fail_on(Primitive::Reverse);
        let calls = motor.calls();
        let mut nav = NavController::new(motor);
        let running = AtomicBool::new(true);
        let mut inbox = VecDeque::from(vec![InboundEvent::Command(Command::West)]);

        let err = run_nav_loop(&mut nav, &mut inbox, &fast(10), &running, None).unwrap_err();
        assert!(matches!(err, NavError::Motor(_)));
        assert_eq!(calls.snapshot(), vec![Primitive::Reverse, Primitive::Stop]);
    }
}
