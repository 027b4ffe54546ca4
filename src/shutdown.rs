/*
 *  shutdown.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Stop requests from SIGINT, SIGTERM and SIGHUP
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::info;
use tokio::signal::unix::{signal, SignalKind};

/// Granularity of `StopFlag::wait`
const POLL_STEP: Duration = Duration::from_millis(50);

/// Shared "please stop" flag checked by the scene loops between frames
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    stop: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Sleep up to `timeout`, returning early once a stop is requested.
    /// True when the wait was cut short.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_requested() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(POLL_STEP.min(deadline - now));
        }
    }
}

/// Register SIGINT, SIGTERM and SIGHUP and raise `stop` on the first one.
///
/// The handlers are in place when this returns; a small current-thread
/// runtime on its own thread waits for them.
pub fn install_signal_handler(stop: StopFlag) -> std::io::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let (mut sigint, mut sigterm, mut sighup) = {
        let _guard = rt.enter();
        (
            signal(SignalKind::interrupt())?,
            signal(SignalKind::terminate())?,
            signal(SignalKind::hangup())?,
        )
    };

    thread::Builder::new().name("signals".to_string()).spawn(move || {
        rt.block_on(async {
            tokio::select! {
                _ = sigint.recv() => {
                    info!("SIGINT received. Initiating graceful shutdown.");
                }
                _ = sigterm.recv() => {
                    info!("SIGTERM received. Initiating graceful shutdown.");
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received. Initiating graceful shutdown.");
                }
            }
        });
        stop.request();
    })?;
    Ok(())
}
