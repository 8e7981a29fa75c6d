//! 仿真命令
//!
//! 在 ASCII 迷宫上运行控制器：仿真电机移动机器人并发布位置观测，
//! 指令按固定 tick 间隔依次投递，最后投递 `Shutdown`。

use super::{install_interrupt_handler, print_metrics};
use anyhow::{Context, Result, bail};
use clap::Args;
use pacbot_driver::{SimMotor, SimWorld};
use pacbot_nav::{NavConfig, NavController, NavObserver, run_nav_loop};
use pacbot_protocol::{Command, InboundEvent};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::debug;

/// 内置迷宫
pub const DEFAULT_MAZE: &str = "
#########
#P......#
#.##.##.#
#.......#
#.##.##.#
#.......#
#########
";

/// 仿真命令参数
#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// 迷宫文件（`#` 墙，`.` 通道，`P` 起点）
    #[arg(short, long)]
    pub maze: Option<PathBuf>,

    /// 指令序列，逗号分隔（N,S,E,W,STOP）
    #[arg(long, default_value = "E,E,E,S,S,W,W,W,N,N")]
    pub commands: String,

    /// 相邻指令之间间隔的 tick 数
    #[arg(long, default_value_t = 10)]
    pub ticks_per_command: u32,
}

/// 解析逗号分隔的指令序列
pub fn parse_commands(text: &str) -> Result<Vec<Command>> {
    let commands = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Command>().with_context(|| format!("Invalid command '{}'", s)))
        .collect::<Result<Vec<_>>>()?;
    if commands.is_empty() {
        bail!("No commands given");
    }
    Ok(commands)
}

impl SimulateCommand {
    pub fn execute(&self, config_path: Option<&Path>) -> Result<()> {
        let config = NavConfig::load(config_path).context("Failed to load config")?;
        let commands = parse_commands(&self.commands)?;
        let maze = match &self.maze {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read maze {}", path.display()))?,
            None => DEFAULT_MAZE.to_string(),
        };
        // 仿真车头与控制器初始朝向一致
        let world = SimWorld::from_ascii(&maze, config.controller.initial_heading)
            .context("Invalid maze")?;

        let (tx, mut inbox) = crossbeam_channel::unbounded();
        let motor = SimMotor::new(world, tx.clone());
        let world = motor.world();
        motor.publish_position();

        let loop_config = config.controller.loop_config();
        let gap = loop_config.period() * self.ticks_per_command.max(1);
        let feeder = thread::spawn(move || {
            for command in commands {
                debug!("sim: sending {}", command);
                if tx.send(InboundEvent::Command(command)).is_err() {
                    return;
                }
                thread::sleep(gap);
            }
            let _ = tx.send(InboundEvent::Shutdown);
        });

        let is_running = install_interrupt_handler()?;
        let observer = NavObserver::new();
        let mut nav = NavController::from_config(motor, &config.controller);
        let start = world.lock().robot();
        println!("🤖 起点 {}，朝向 {}", start, config.controller.initial_heading);

        let result = run_nav_loop(&mut nav, &mut inbox, &loop_config, &is_running, Some(&observer));
        // 收件箱关闭后 feeder 的下一次发送失败并退出
        drop(inbox);
        if feeder.join().is_err() {
            bail!("Command feeder thread panicked");
        }
        let exit = result.context("Navigation loop failed")?;

        let snapshot = observer.snapshot();
        let world = world.lock();
        println!("🛑 已停止 ({:?}, {} ticks)", exit.reason, exit.ticks);
        println!("  仿真位置:       {}，车头 {}", world.robot(), world.facing());
        match snapshot.position {
            Some(pos) => println!("  控制器认为:     {}，朝向 {}", pos, snapshot.heading),
            None => println!("  控制器认为:     (未知)，朝向 {}", snapshot.heading),
        }
        print_metrics(&nav.metrics().snapshot());
        Ok(())
    }
}
