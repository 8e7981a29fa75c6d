//! 导航值类型
//!
//! 坐标约定：x 向东增长，y 向北增长。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;
use std::str::FromStr;

/// 机器人当前朝向（罗盘方向）
///
/// 只由控制器修改；初始值为 `East`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Heading {
    North,
    South,
    #[default]
    East,
    West,
}

impl Heading {
    /// 顺时针顺序（与 [`crate::turn`] 邻接表的行列顺序一致）
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// 逆时针旋转 90°（East → North → West → South → East）
    #[must_use]
    pub const fn rotated_left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
        }
    }

    /// 顺时针旋转 90°（East → South → West → North → East）
    #[must_use]
    pub const fn rotated_right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::South => Heading::West,
            Heading::West => Heading::North,
            Heading::North => Heading::East,
        }
    }

    /// 反方向
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Heading::North => Heading::South,
            Heading::South => Heading::North,
            Heading::East => Heading::West,
            Heading::West => Heading::East,
        }
    }

    /// 沿此朝向前进一格的坐标增量 `(dx, dy)`
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Heading::North => (0, 1),
            Heading::South => (0, -1),
            Heading::East => (1, 0),
            Heading::West => (-1, 0),
        }
    }

    /// 邻接表索引（顺时针：N=0, E=1, S=2, W=3）
    pub(crate) const fn index(self) -> usize {
        match self {
            Heading::North => 0,
            Heading::East => 1,
            Heading::South => 2,
            Heading::West => 3,
        }
    }

    /// 根据两次观测的坐标差推断行进方向
    ///
    /// 先比较 x 轴（West/East），再比较 y 轴（South/North）。
    /// 两轴都未变化时返回 `None`。两轴同时变化（对角跳变）时 x 轴优先，
    /// 例如 `(0,0) → (1,1)` 推断为 `East`。
    pub fn infer(prev: CellPosition, next: CellPosition) -> Option<Heading> {
        if prev.x > next.x {
            Some(Heading::West)
        } else if prev.x < next.x {
            Some(Heading::East)
        } else if prev.y > next.y {
            Some(Heading::South)
        } else if prev.y < next.y {
            Some(Heading::North)
        } else {
            None
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Heading::North => "NORTH",
            Heading::South => "SOUTH",
            Heading::East => "EAST",
            Heading::West => "WEST",
        };
        f.write_str(name)
    }
}

impl FromStr for Heading {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Command>()?.direction() {
            Some(heading) => Ok(heading),
            None => Err(ProtocolError::ParseError(format!(
                "'{}' is not a heading",
                s
            ))),
        }
    }
}

/// 期望行进方向指令
///
/// `Stop` 只作用于当前指令，不是朝向。线协议上以 1 字节编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[repr(u8)]
pub enum Command {
    Stop = 0,
    North = 1,
    South = 2,
    East = 3,
    West = 4,
}

impl Command {
    /// 指令对应的方向（`Stop` 返回 `None`）
    pub const fn direction(self) -> Option<Heading> {
        match self {
            Command::Stop => None,
            Command::North => Some(Heading::North),
            Command::South => Some(Heading::South),
            Command::East => Some(Heading::East),
            Command::West => Some(Heading::West),
        }
    }

    /// 从线协议字节解析
    pub fn from_wire(value: u8) -> Result<Self, ProtocolError> {
        Command::try_from(value).map_err(|_| ProtocolError::InvalidValue {
            field: "PacmanCommand".to_string(),
            value,
        })
    }
}

impl From<Heading> for Command {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::North => Command::North,
            Heading::South => Command::South,
            Heading::East => Command::East,
            Heading::West => Command::West,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction() {
            Some(heading) => fmt::Display::fmt(&heading, f),
            None => f.write_str("STOP"),
        }
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    /// 接受全称或首字母，大小写不敏感（`"n"`, `"North"`, `"STOP"`, `"x"`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Command::North),
            "s" | "south" => Ok(Command::South),
            "e" | "east" => Ok(Command::East),
            "w" | "west" => Ok(Command::West),
            "x" | "stop" => Ok(Command::Stop),
            other => Err(ProtocolError::ParseError(format!(
                "unknown command '{}'",
                other
            ))),
        }
    }
}

/// 网格坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPosition {
    pub x: i32,
    pub y: i32,
}

impl CellPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 沿 `heading` 相邻的格子
    #[must_use]
    pub const fn step(self, heading: Heading) -> Self {
        let (dx, dy) = heading.delta();
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for CellPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}
