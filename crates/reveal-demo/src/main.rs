//! Scripted walkthrough of the reveal widgets

mod console;

use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reveal_a11y::{AccessibilityCoordinator, Disclosure, NodeId, TokioScheduler};
use reveal_common::{format_error, LogOptions};
use reveal_config::{ConfigLayer, ConfigLoader, CoordinationConfig, PlatformTarget};
use reveal_widgets::{Dropdown, ErrorBanner, Modal, Tooltip};
use tokio::task::LocalSet;
use tokio::time::sleep;
use tracing::info;

use crate::console::ConsolePlatform;

#[derive(Debug, Parser)]
#[command(name = "reveal-demo", version, about = "Walk through the reveal widgets")]
struct Args {
    /// Platform to emulate (ios or android)
    #[arg(long)]
    platform: Option<PlatformTarget>,

    /// Start with the screen reader switched on
    #[arg(long)]
    reader: bool,

    /// Skip animations
    #[arg(long)]
    reduce_motion: bool,

    /// Compact single-line log output
    #[arg(long)]
    compact: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("reveal-demo: {}", format_error(err.as_ref()));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let mut overrides = ConfigLayer {
        platform: args.platform,
        ..Default::default()
    };
    if args.reduce_motion {
        overrides.animation.reduce_motion = Some(true);
    }

    let config = ConfigLoader::new()
        .with_overrides(overrides)
        .load()
        .context("failed to load accessibility configuration")?;

    reveal_common::init(LogOptions {
        level: config.log_level()?,
        with_target: false,
        compact: args.compact,
    });

    LocalSet::new()
        .run_until(walkthrough(config, args.reader))
        .await
}

async fn walkthrough(config: CoordinationConfig, reader: bool) -> Result<()> {
    let platform = Rc::new(ConsolePlatform::new(config.platform(), reader));
    let coordinator = AccessibilityCoordinator::from_config(
        platform.clone(),
        Rc::new(TokioScheduler::new()),
        &config,
    );
    let profile = coordinator.profile();
    info!(platform = %profile.target, strategy = ?profile.strategy, "starting walkthrough");

    let reader_log = coordinator.subscribe_reader(|enabled| info!(enabled, "reader toggled"));
    if !reader {
        platform.switch_reader(true);
    }

    let dropdown = Dropdown::new(
        &coordinator,
        vec!["Email".to_string(), "Phone".to_string(), "Post".to_string()],
    )
    .with_label("Preferred contact");
    dropdown.trigger_ref().attach(NodeId(1));
    for index in 0..dropdown.options().len() {
        if let Some(node) = dropdown.option_ref(index) {
            node.attach(NodeId(10 + index as u64));
        }
    }

    info!(label = %dropdown.trigger_label(), "pressing dropdown");
    dropdown.press_trigger();
    settle(&coordinator, coordinator.widget_timings().dropdown_duration_ms).await;
    let picked = dropdown.select(1)?.to_string();
    info!(picked = %picked, "option selected");
    settle(&coordinator, profile.return_focus_delay_ms).await;
    info!(label = %dropdown.trigger_label(), z_index = dropdown.z_index().value(), "dropdown closed");

    let tooltip = Tooltip::new(&coordinator, "We only use this to confirm your identity.");
    tooltip.set_anchor_offset(24.0, 180.0);
    tooltip.press_icon();
    settle(&coordinator, coordinator.widget_timings().tooltip_duration_ms).await;
    tooltip.tap_outside();
    settle(&coordinator, coordinator.widget_timings().tooltip_duration_ms).await;

    let banner = ErrorBanner::new(&coordinator);
    banner.show("Phone number is required");
    settle(&coordinator, coordinator.widget_timings().error_duration_ms).await;
    banner.show("Phone number must have 10 digits");
    settle(&coordinator, 0).await;
    banner.hide();

    let modal = Modal::new(&coordinator).with_reason("Form submitted");
    modal.exit_ref().attach(NodeId(50));
    modal.opener_ref().attach(NodeId(2));
    modal.show();
    info!(exit_label = %modal.exit_label(), "modal shown");
    settle(&coordinator, coordinator.widget_timings().modal_announcement_duration_ms).await;
    info!(exit_label = %modal.exit_label(), "announcement window elapsed");
    modal.press_exit();
    settle(&coordinator, profile.return_focus_delay_ms).await;
    info!(phase = %modal.state().phase, "walkthrough finished");

    drop(reader_log);
    coordinator.shutdown();
    Ok(())
}

/// Let `ms` of animation and accessibility delays play out
async fn settle(coordinator: &AccessibilityCoordinator, ms: u64) {
    let margin = coordinator.animation().frame_interval_ms * 2;
    sleep(Duration::from_millis(ms + margin)).await;
}
