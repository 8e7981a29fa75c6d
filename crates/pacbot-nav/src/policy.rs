//! 执行策略
//!
//! - [`SettlePolicy`]：前进之后如何获取"当前位置"用于卡住判断
//! - [`RecoveryPolicy`]：卡住恢复最多重试几次

use std::time::Duration;

/// 默认的观测等待时间
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(250);

/// 默认的最大恢复次数（两整圈）
pub const DEFAULT_MAX_RECOVERY_ATTEMPTS: u32 = 8;

/// 前进后的位置采样策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlePolicy {
    /// 只取出收件箱中已有的事件，立即比较
    ///
    /// 如果摄像头观测还没到达，会把一次成功的前进误判为卡住。
    Immediate,
    /// 取出已有事件；其中没有位置观测时，阻塞等待一个位置观测，最长 `timeout`
    AwaitObservation { timeout: Duration },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        SettlePolicy::AwaitObservation {
            timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }
}

/// 卡住恢复策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// 最大重试次数，`None` 表示无限重试
    pub max_attempts: Option<u32>,
}

impl RecoveryPolicy {
    /// 无限重试，直到位置变化
    pub const UNBOUNDED: RecoveryPolicy = RecoveryPolicy { max_attempts: None };

    pub const fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }

    /// 已重试 `attempts` 次之后是否应放弃
    pub fn exhausted(&self, attempts: u32) -> bool {
        matches!(self.max_attempts, Some(max) if attempts >= max)
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::bounded(DEFAULT_MAX_RECOVERY_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            SettlePolicy::default(),
            SettlePolicy::AwaitObservation {
                timeout: Duration::from_millis(250)
            }
        );
        assert_eq!(RecoveryPolicy::default().max_attempts, Some(8));
    }

    #[test]
    fn test_exhausted() {
        let policy = RecoveryPolicy::bounded(2);
        assert!(!policy.exhausted(0));
        assert!(!policy.exhausted(1));
        assert!(policy.exhausted(2));

        assert!(!RecoveryPolicy::UNBOUNDED.exhausted(u32::MAX));
        assert!(RecoveryPolicy::bounded(0).exhausted(0));
    }
}
