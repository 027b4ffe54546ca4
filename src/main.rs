/*
 *  main.rs
 *
 *  ARKeys e-ink - panel renderer
 *	(c) 2025-26 ARKeys contributors
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use arkeys_eink::config::{self, Cli, Scene};
use arkeys_eink::display::{create_panel, DisplayRenderer, MonoGlyphs, PanelDriver};
use arkeys_eink::scenes;
use arkeys_eink::shutdown::{install_signal_handler, StopFlag};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", cfg.to_yaml()?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);
    debug!("Effective config: {:?}", cfg);

    let stop = StopFlag::new();
    install_signal_handler(stop.clone()).context("installing signal handlers")?;

    let font = MonoGlyphs::by_name(&cfg.font())?;
    let panel = create_panel(&cfg).context("opening panel")?;
    let mut renderer = DisplayRenderer::new(panel, cfg.orientation(), cfg.settle_time());
    info!(
        "Panel {}x{}, frame {:?} ({:?}), settle {:?}",
        renderer.panel().width(),
        renderer.panel().height(),
        renderer.frame_size(),
        renderer.orientation(),
        renderer.settle_time()
    );

    match cli.scene.clone().unwrap_or(Scene::Hello) {
        Scene::Hello => {
            scenes::run_hello(&mut renderer, cfg.refresh(), &cfg.message(), &font)?;
        }
        Scene::Segments { interval_ms } => {
            scenes::run_segments(&mut renderer, Duration::from_millis(interval_ms), &stop)?;
        }
        Scene::Tracker { iterations, interval_ms } => {
            scenes::run_tracker(&mut renderer, &mut rand::rng(), iterations, Duration::from_millis(interval_ms), &stop)?;
        }
        Scene::Metrics { frames, interval_ms } => {
            scenes::run_metrics(&mut renderer, &mut rand::rng(), frames, Duration::from_millis(interval_ms), &stop)?;
        }
    }

    info!("Done, panel asleep");
    Ok(())
}
