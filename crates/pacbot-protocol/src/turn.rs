//! 转向邻接表
//!
//! 朝向 × 期望方向 → 前进前需要执行的转向动作。

use crate::types::Heading;

/// 前进前的转向动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    /// 期望方向与朝向一致，直接前进
    None,
    /// 期望方向在朝向逆时针 90°
    Left,
    /// 期望方向在朝向顺时针 90°
    Right,
    /// 期望方向与朝向相反，后退一格代替前进
    Reverse,
}

impl Turn {
    /// 执行此转向后的朝向
    ///
    /// `Reverse` 不改变朝向（机器人倒车，车头方向不变）。
    #[must_use]
    pub const fn apply(self, heading: Heading) -> Heading {
        match self {
            Turn::None | Turn::Reverse => heading,
            Turn::Left => heading.rotated_left(),
            Turn::Right => heading.rotated_right(),
        }
    }
}

// 行：当前朝向；列：期望方向。顺序均为 N, E, S, W。
const TURN_TABLE: [[Turn; 4]; 4] = [
    //   N              E              S              W
    [Turn::None, Turn::Right, Turn::Reverse, Turn::Left], // N
    [Turn::Left, Turn::None, Turn::Right, Turn::Reverse], // E
    [Turn::Reverse, Turn::Left, Turn::None, Turn::Right], // S
    [Turn::Right, Turn::Reverse, Turn::Left, Turn::None], // W
];

/// 查表得到从 `heading` 出发朝 `desired` 行进所需的转向
pub const fn turn_for(heading: Heading, desired: Heading) -> Turn {
    TURN_TABLE[heading.index()][desired.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_rotations() {
        for heading in Heading::ALL {
            assert_eq!(turn_for(heading, heading), Turn::None);
            assert_eq!(turn_for(heading, heading.rotated_left()), Turn::Left);
            assert_eq!(turn_for(heading, heading.rotated_right()), Turn::Right);
            assert_eq!(turn_for(heading, heading.opposite()), Turn::Reverse);
        }
    }

    #[test]
    fn test_left_pairs() {
        assert_eq!(turn_for(Heading::North, Heading::West), Turn::Left);
        assert_eq!(turn_for(Heading::West, Heading::South), Turn::Left);
        assert_eq!(turn_for(Heading::South, Heading::East), Turn::Left);
        assert_eq!(turn_for(Heading::East, Heading::North), Turn::Left);
    }

    #[test]
    fn test_right_pairs() {
        assert_eq!(turn_for(Heading::North, Heading::East), Turn::Right);
        assert_eq!(turn_for(Heading::East, Heading::South), Turn::Right);
        assert_eq!(turn_for(Heading::South, Heading::West), Turn::Right);
        assert_eq!(turn_for(Heading::West, Heading::North), Turn::Right);
    }

    #[test]
    fn test_apply_reaches_desired_unless_reversing() {
        for heading in Heading::ALL {
            for desired in Heading::ALL {
                let turn = turn_for(heading, desired);
                let after = turn.apply(heading);
                if turn == Turn::Reverse {
                    assert_eq!(after, heading);
                } else {
                    assert_eq!(after, desired);
                }
            }
        }
    }
}
