use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use astro_core::config::WorldConfig;
use astro_core::math::Vector3F;
use astro_core::scenario::{presets, Scenario};
use astro_core::sim::SimClock;

#[derive(Parser, Debug)]
#[command(version, about = "Floating-origin trajectory demo")]
struct Args {
    /// World configuration (YAML); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario description (YAML); the star/planet/vessel preset when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Fixed steps to run (default: sim.max_time / sim.dt)
    #[arg(short, long)]
    ticks: Option<usize>,

    /// Steps in the closing what-if preview
    #[arg(long, default_value_t = 120)]
    preview: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            WorldConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => WorldConfig {
            trail_length: 256,
            ..Default::default()
        },
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => presets::star_planet_vessel(),
    };

    let mut world = scenario.build(&config)?;
    let ticks = args
        .ticks
        .unwrap_or((config.sim.max_time / config.sim.dt) as usize);
    info!("running '{}' for {} ticks at dt={} s", scenario.name, ticks, config.sim.dt);

    let anchor_name = world
        .anchor()
        .and_then(|id| scenario.body_name(id))
        .unwrap_or("-")
        .to_string();

    // -----------------------------------------------------------------------
    // Header
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  FLOATING ORIGIN RUN: {}", scenario.name);
    println!("====================================================================");
    println!();
    println!(
        "  Bodies: {:>3}   Attractors: {:>3}   Anchor: {}",
        world.simulator().bodies().len(),
        world.simulator().attractors().len(),
        anchor_name
    );
    println!(
        "  Threshold: {:>8.0} ({:?})   dt: {} s",
        config.origin.threshold, config.origin.recenter, config.sim.dt
    );
    println!();
    println!(
        "  {:>9}  {:>10}  {:>10}  {:>10}  {:>14}  {:>8}",
        "t (s)", "local x", "local y", "local z", "|origin| (m)", "switches"
    );
    println!("  {}", "─".repeat(70));

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------
    let mut clock = SimClock::new(config.sim.dt);
    let sample_interval = (ticks / 25).max(1);
    for i in 0..ticks {
        world.tick(&clock, &mut [])?;
        clock.advance();

        if i % sample_interval != 0 && i + 1 != ticks {
            continue;
        }
        let local = world
            .anchor()
            .and_then(|id| world.local_position(id))
            .unwrap_or_else(Vector3F::zeros);
        println!(
            "  {:>9.2}  {:>10.2}  {:>10.2}  {:>10.2}  {:>14.4e}  {:>8}",
            world.simulator().ut(),
            local.x,
            local.y,
            local.z,
            world.frame().origin().norm(),
            world.origin().switch_count()
        );
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------
    let preview_dt = config.sim.dt * 50.0;
    let preview = world.simulator().predict(args.preview, preview_dt)?;
    println!();
    println!("  What-if preview ({} steps of {} s, local frame)", args.preview, preview_dt);
    println!("  ──────────────────────────────────────────────────────────────────");
    let frame = world.frame();
    if let Some(last) = preview.last() {
        for (body, position) in world.simulator().bodies().iter().zip(last) {
            let local = frame.transform_position(position);
            println!(
                "  {:<10} {:>16.1} {:>16.1} {:>16.1}",
                scenario.body_name(body.id).unwrap_or("?"),
                local.x,
                local.y,
                local.z
            );
        }
    }
    println!();
    println!("====================================================================");
    println!();
    Ok(())
}
