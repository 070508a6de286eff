// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Frame-pacing demo: a render loop held to a fixed budget by a shared
//! [`TimingContext`], with one adaptive cycle fed through the hand-off
//! protocol and a master clock decoded along the way.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tempolib::{TimingConfig, TimingContext};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let frame_budget_us: u64 = std::env::var("FRAME_BUDGET_US")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(16_667); // 60 Hz
    let frame_count: u32 = std::env::var("FRAME_COUNT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);

    println!("=== Frame pacing demo ===");
    println!("budget: {frame_budget_us} us/frame, frames: {frame_count}\n");

    let timing = Arc::new(TimingContext::with_config(TimingConfig::default()));

    // Pretend the synchronization layer delivered a master clock:
    // day 0, 00:00:12 and 60 frames into the second, running.
    timing.set_master_clock(&[0, 0, 0, 0, 0, 12, 60, 0]);
    if let Some(master) = timing.master_clock_time() {
        println!(
            "master clock: {:?} elapsed{}\n",
            master.elapsed,
            if master.paused { " (paused)" } else { "" }
        );
    }

    for frame in 0..frame_count {
        timing.start("frame");
        simulate_render(frame, frame_budget_us);
        let overtime = timing.wait_until("frame", frame_budget_us);
        let tick_us = timing.since_last_seen("cadence");

        if overtime {
            tracing::warn!(
                frame,
                duration_us = timing.duration_us("frame"),
                "frame overran its budget"
            );
        } else {
            tracing::info!(
                frame,
                duration_us = timing.duration_us("frame"),
                tick_us,
                "frame paced"
            );
        }
    }

    // A budget computed mid-frame flows into the closing pacing call
    // without an explicit parameter: publish it, consume it later on
    // the same thread.
    timing.open("adaptive");
    timing.publish(frame_budget_us / 2);
    let overtime = timing.consume("adaptive");
    println!(
        "\nadaptive cycle: {} us (overtime: {overtime})",
        timing.duration_us("adaptive")
    );

    println!("\nrecorded durations:");
    let mut durations: Vec<_> = timing.durations().into_iter().collect();
    durations.sort();
    for (name, duration_us) in durations {
        println!("  {name:<10} {duration_us:>8} us");
    }

    Ok(())
}

/// Stand-in for scene rendering: burns roughly half the frame budget.
fn simulate_render(frame: u32, frame_budget_us: u64) {
    // Every eighth frame blows the budget so the overtime path shows up.
    let work_us = if frame % 8 == 7 {
        frame_budget_us + frame_budget_us / 4
    } else {
        frame_budget_us / 2
    };
    std::thread::sleep(Duration::from_micros(work_us));
}
