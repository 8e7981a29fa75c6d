//! 命令定义和实现

pub mod config;
pub mod run;
pub mod simulate;

pub use config::ConfigCommand;
pub use run::RunCommand;
pub use simulate::SimulateCommand;

use anyhow::{Context, Result};
use pacbot_nav::MetricsSnapshot;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 安装 Ctrl-C 处理：清除运行标志，控制循环在下一个 tick 退出并停止电机
pub(crate) fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let is_running = Arc::new(AtomicBool::new(true));
    let flag = is_running.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal. Stopping...");
        flag.store(false, Ordering::Release);
    })
    .context("Failed to set Ctrl-C handler")?;
    Ok(is_running)
}

pub(crate) fn print_metrics(metrics: &MetricsSnapshot) {
    println!("📊 指标:");
    println!("  ticks:          {}", metrics.ticks);
    println!(
        "  指令:           执行 {} / 覆盖 {} ({:.1}%)",
        metrics.commands_executed,
        metrics.commands_overwritten,
        metrics.overwrite_rate()
    );
    println!(
        "  位置观测:       {} (朝向修正 {})",
        metrics.positions_observed, metrics.heading_corrections
    );
    println!("  原子运动:       {}", metrics.primitives_issued);
    println!(
        "  卡住恢复:       {} 次 (放弃 {})",
        metrics.recovery_attempts, metrics.stuck_aborts
    );
}
