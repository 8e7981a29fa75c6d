//! 运动规划
//!
//! 指令 + 当前朝向 → 原子运动序列（最多两步，栈上分配）。

use pacbot_driver::Primitive;
use pacbot_protocol::{Command, Heading, Turn, turn_for};
use smallvec::{SmallVec, smallvec};

/// 一条指令对应的原子运动序列
pub type MotionPlan = SmallVec<[Primitive; 2]>;

/// 计算指令的原子运动序列
///
/// | 指令与朝向关系 | 序列 |
/// |---|---|
/// | STOP | `[Stop]` |
/// | 相同 | `[Advance]` |
/// | 逆时针 90° | `[RotateLeft, Advance]` |
/// | 顺时针 90° | `[RotateRight, Advance]` |
/// | 相反 | `[Reverse]`（不前进，朝向不变） |
///
/// 不包含卡住恢复产生的额外运动。
pub fn plan_motion(heading: Heading, command: Command) -> MotionPlan {
    let Some(desired) = command.direction() else {
        return smallvec![Primitive::Stop];
    };
    match turn_for(heading, desired) {
        Turn::None => smallvec![Primitive::Advance],
        Turn::Left => smallvec![Primitive::RotateLeft, Primitive::Advance],
        Turn::Right => smallvec![Primitive::RotateRight, Primitive::Advance],
        Turn::Reverse => smallvec![Primitive::Reverse],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_east() {
        let h = Heading::East;
        assert_eq!(plan_motion(h, Command::Stop).as_slice(), &[Primitive::Stop]);
        assert_eq!(plan_motion(h, Command::East).as_slice(), &[Primitive::Advance]);
        assert_eq!(
            plan_motion(h, Command::North).as_slice(),
            &[Primitive::RotateLeft, Primitive::Advance]
        );
        assert_eq!(
            plan_motion(h, Command::South).as_slice(),
            &[Primitive::RotateRight, Primitive::Advance]
        );
        assert_eq!(plan_motion(h, Command::West).as_slice(), &[Primitive::Reverse]);
    }

    #[test]
    fn test_plan_never_spills() {
        for heading in Heading::ALL {
            for command in [
                Command::Stop,
                Command::North,
                Command::South,
                Command::East,
                Command::West,
            ] {
                assert!(!plan_motion(heading, command).spilled());
            }
        }
    }
}
