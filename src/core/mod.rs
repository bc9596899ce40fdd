//! Core orchestration loop.
//!
//! One thread polls the inputs every tick
//! ([`TICK_INTERVAL`](crate::constants::TICK_INTERVAL) by default). Within a tick the
//! order is fixed:
//!
//! 1. finished effects are reaped,
//! 2. the edge source is polled,
//! 3. touched zones are dispatched,
//! 4. the indicator is recomputed from zone activity and the button.
//!
//! A zone dispatched in a tick is therefore already visible to that tick's
//! indicator. The loop never waits on an effect; it only sleeps on the signal
//! channel, which also wakes it for shutdown.

pub mod edges;
pub mod effect;
pub mod indicator;
pub mod scheduler;
pub mod shutdown;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ZoneIndex, ZoneRegistry};
use crate::io::signals::SignalState;
use crate::io::{ButtonInput, SoundPlayer, TouchSensor};
use crate::strip::LedDriver;

use edges::{EdgeReport, EdgeSource};
use effect::{EffectRunner, SoundPolicy};
use indicator::Indicator;
use scheduler::{ZoneScheduler, ZoneState};

/// Everything the core needs, built once at startup.
pub struct CoreParams {
    pub zones: ZoneRegistry,
    pub driver: Arc<LedDriver>,
    pub sensor: Box<dyn TouchSensor>,
    pub button: Box<dyn ButtonInput>,
    pub player: Arc<dyn SoundPlayer>,
    pub sound: SoundPolicy,
    pub signal_state: SignalState,
    pub tick_interval: Duration,
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub edges: EdgeReport,
    pub dispatched: Vec<ZoneIndex>,
    pub any_running: bool,
    pub indicator_rendered: bool,
}

pub struct Core {
    driver: Arc<LedDriver>,
    edges: EdgeSource,
    scheduler: ZoneScheduler,
    runner: EffectRunner,
    indicator: Indicator,
    signal_state: SignalState,
    tick_interval: Duration,
}

impl Core {
    /// Create the core. Fails if the inputs cannot be read for priming.
    pub fn new(params: CoreParams) -> Result<Self> {
        let edges = EdgeSource::new(params.sensor, params.button, &params.zones)?;
        let primed = edges.state();
        log_debug!(
            "Inputs primed: touched {:#06x}, button {}",
            primed.current,
            if primed.button_level { "up" } else { "down" }
        );
        let indicator = Indicator::from_registry(&params.zones);
        let runner = EffectRunner::new(params.driver.clone(), params.player, params.sound);

        Ok(Self {
            driver: params.driver,
            edges,
            scheduler: ZoneScheduler::new(params.zones),
            runner,
            indicator,
            signal_state: params.signal_state,
            tick_interval: params.tick_interval,
        })
    }

    pub fn zone_state(&self, zone: ZoneIndex) -> ZoneState {
        self.scheduler.state(zone)
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator.is_on()
    }

    /// Run one polling step.
    pub fn tick(&mut self) -> TickSummary {
        self.scheduler.reap();

        let edges = self.edges.poll();

        for &zone in &edges.released {
            if let Some(zone) = self.scheduler.zones().get(zone) {
                log_debug!("Zone '{}' released", zone.id);
            }
        }
        if edges.button_changed {
            log_debug!(
                "Button {}",
                if edges.button_level { "released" } else { "pressed" }
            );
        }

        let dispatched = self.scheduler.dispatch(&edges.touched, &self.runner);
        let any_running = self.scheduler.any_running();
        let indicator_rendered =
            self.indicator
                .update(any_running, edges.button_level, &self.driver);

        TickSummary {
            edges,
            dispatched,
            any_running,
            indicator_rendered,
        }
    }

    /// Poll until a shutdown is requested, then run the shutdown sequence.
    pub fn execute(mut self) -> Result<()> {
        log_block_start!(
            "Watching {} touch zone(s)",
            self.scheduler.zones().touch_zones().count()
        );

        loop {
            self.tick();

            if self.signal_state.wait_for_shutdown(self.tick_interval) {
                break;
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Blank the strip and wait for every running effect.
    pub fn shutdown(&mut self) {
        shutdown::shutdown(&self.driver, &mut self.scheduler);
    }
}
