//! 网格仿真
//!
//! `SimWorld` 模拟迷宫和机器人真实位姿，`SimMotor` 把原子运动作用到世界上，
//! 并在每次运动后像俯视摄像头一样发布一次位置观测。
//!
//! # 迷宫格式
//!
//! ```text
//! #####
//! #P..#
//! #.#.#
//! #####
//! ```
//!
//! - `#`: 墙
//! - `.` 或空格: 通道
//! - `P`: 起点（必须恰好一个）
//!
//! 第 0 行在最上方（y 最大），x 向右增长。

use crate::error::{MotorError, SimError};
use crate::motor::{MotorDriver, Primitive};
use crossbeam_channel::Sender;
use pacbot_protocol::{CellPosition, Heading, InboundEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// 仿真世界
#[derive(Debug, Clone)]
pub struct SimWorld {
    width: i32,
    height: i32,
    walls: HashSet<CellPosition>,
    robot: CellPosition,
    facing: Heading,
    history: Vec<Primitive>,
}

impl SimWorld {
    /// 创建无墙的矩形世界
    pub fn new(width: i32, height: i32, start: CellPosition, facing: Heading) -> Self {
        Self {
            width,
            height,
            walls: HashSet::new(),
            robot: start,
            facing,
            history: Vec::new(),
        }
    }

    /// 从 ASCII 迷宫解析
    pub fn from_ascii(map: &str, facing: Heading) -> Result<Self, SimError> {
        let rows: Vec<&str> = map
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .collect();
        if rows.is_empty() {
            return Err(SimError::EmptyMaze);
        }

        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut walls = HashSet::new();
        let mut start = None;

        for (row, line) in rows.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (col, ch) in line.chars().enumerate() {
                let pos = CellPosition::new(col as i32, y);
                match ch {
                    '#' => {
                        walls.insert(pos);
                    },
                    '.' | ' ' => {},
                    'P' => {
                        if start.is_some() {
                            return Err(SimError::MultipleStarts { row, col });
                        }
                        start = Some(pos);
                    },
                    other => return Err(SimError::InvalidCell { ch: other, row, col }),
                }
            }
        }

        let start = start.ok_or(SimError::MissingStart)?;
        Ok(Self {
            width,
            height,
            walls,
            robot: start,
            facing,
            history: Vec::new(),
        })
    }

    pub fn add_wall(&mut self, pos: CellPosition) {
        self.walls.insert(pos);
    }

    /// 格子在边界内且不是墙
    pub fn is_open(&self, pos: CellPosition) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.x < self.width
            && pos.y < self.height
            && !self.walls.contains(&pos)
    }

    /// 机器人真实位置
    pub fn robot(&self) -> CellPosition {
        self.robot
    }

    /// 机器人真实车头方向
    pub fn facing(&self) -> Heading {
        self.facing
    }

    /// 已执行的原子运动（按顺序）
    pub fn history(&self) -> &[Primitive] {
        &self.history
    }

    /// 执行一个原子运动，返回机器人是否换了格子
    pub fn apply(&mut self, primitive: Primitive) -> bool {
        self.history.push(primitive);
        let target = match primitive {
            Primitive::Advance => self.robot.step(self.facing),
            Primitive::Reverse => self.robot.step(self.facing.opposite()),
            Primitive::RotateLeft => {
                self.facing = self.facing.rotated_left();
                return false;
            },
            Primitive::RotateRight => {
                self.facing = self.facing.rotated_right();
                return false;
            },
            Primitive::Stop => return false,
        };

        if self.is_open(target) {
            self.robot = target;
            true
        } else {
            trace!("sim: {} blocked at {} facing {}", primitive, self.robot, self.facing);
            false
        }
    }
}

/// 仿真电机
///
/// 每个原子运动之后向收件箱发布一次 `Position` 观测（即使没有移动），
/// 与真实系统中持续发布位置的摄像头一致。
pub struct SimMotor {
    world: Arc<Mutex<SimWorld>>,
    camera: Sender<InboundEvent>,
}

impl SimMotor {
    pub fn new(world: SimWorld, camera: Sender<InboundEvent>) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
            camera,
        }
    }

    /// 共享的世界句柄（用于在控制循环外检查真实状态）
    pub fn world(&self) -> Arc<Mutex<SimWorld>> {
        self.world.clone()
    }

    /// 发布当前位置（启动时调用一次，让控制器获得第一帧观测）
    pub fn publish_position(&self) {
        let pos = self.world.lock().robot();
        // 收件箱已关闭说明控制循环已退出，没有人需要观测
        let _ = self.camera.send(InboundEvent::Position(pos));
    }

    fn step(&mut self, primitive: Primitive) -> Result<(), MotorError> {
        let moved = self.world.lock().apply(primitive);
        trace!("sim: {} (moved: {})", primitive, moved);
        self.publish_position();
        Ok(())
    }
}

impl MotorDriver for SimMotor {
    fn advance(&mut self) -> Result<(), MotorError> {
        self.step(Primitive::Advance)
    }

    fn rotate_left(&mut self) -> Result<(), MotorError> {
        self.step(Primitive::RotateLeft)
    }

    fn rotate_right(&mut self) -> Result<(), MotorError> {
        self.step(Primitive::RotateRight)
    }

    fn reverse(&mut self) -> Result<(), MotorError> {
        self.step(Primitive::Reverse)
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.step(Primitive::Stop)
    }
}
