//! Zone scheduler: single-flight dispatch of effect runs.
//!
//! Each zone has at most one effect running. A touch on a busy zone is
//! dropped, never queued, and release edges never shorten a run: effects
//! end on their own timer.

use crate::config::{ZoneIndex, ZoneRegistry};

use super::effect::{EffectHandle, EffectRunner};

/// Observable state of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    Idle,
    Running,
}

/// Per-zone runtime bookkeeping.
#[derive(Default)]
pub struct ZoneRuntime {
    handle: Option<EffectHandle>,
}

impl ZoneRuntime {
    pub fn state(&self) -> ZoneState {
        match &self.handle {
            Some(handle) if !handle.is_finished() => ZoneState::Running,
            _ => ZoneState::Idle,
        }
    }
}

pub struct ZoneScheduler {
    zones: ZoneRegistry,
    runtime: Vec<ZoneRuntime>,
}

impl ZoneScheduler {
    pub fn new(zones: ZoneRegistry) -> Self {
        let runtime = (0..zones.len()).map(|_| ZoneRuntime::default()).collect();
        Self { zones, runtime }
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn state(&self, zone: ZoneIndex) -> ZoneState {
        self.runtime
            .get(zone)
            .map(ZoneRuntime::state)
            .unwrap_or(ZoneState::Idle)
    }

    /// Join the threads of effects that have already finished.
    pub fn reap(&mut self) {
        for runtime in &mut self.runtime {
            if runtime
                .handle
                .as_ref()
                .is_some_and(EffectHandle::is_finished)
                && let Some(handle) = runtime.handle.take()
            {
                handle.wait();
            }
        }
    }

    /// Start an effect for every idle, touchable zone in `touched`.
    ///
    /// Returns the zones that were actually dispatched.
    pub fn dispatch(&mut self, touched: &[ZoneIndex], runner: &EffectRunner) -> Vec<ZoneIndex> {
        let mut dispatched = Vec::new();

        for &index in touched {
            let Some(zone) = self.zones.get(index) else {
                continue;
            };
            if zone.sensor.channel().is_none() {
                continue;
            }

            let runtime = &mut self.runtime[index];
            if runtime.state() == ZoneState::Running {
                log_debug!("Zone '{}' is busy; touch ignored", zone.id);
                continue;
            }

            // A finished handle left over from the last run is joined first
            if let Some(previous) = runtime.handle.take() {
                previous.wait();
            }

            match runner.spawn(zone.clone()) {
                Ok(handle) => {
                    runtime.handle = Some(handle);
                    dispatched.push(index);
                }
                Err(e) => log_error!("Zone '{}' could not start: {e:#}", zone.id),
            }
        }

        dispatched
    }

    /// Whether any zone has an effect that has not completed yet.
    pub fn any_running(&self) -> bool {
        self.runtime
            .iter()
            .any(|runtime| runtime.state() == ZoneState::Running)
    }

    /// Number of zones currently running.
    pub fn running_count(&self) -> usize {
        self.runtime
            .iter()
            .filter(|runtime| runtime.state() == ZoneState::Running)
            .count()
    }

    /// Block until every outstanding effect has completed.
    pub fn wait_all(&mut self) {
        for (zone, runtime) in self.zones.zones().iter().zip(&mut self.runtime) {
            if let Some(handle) = runtime.handle.take() {
                if !handle.is_finished() {
                    log_indented!("Waiting for zone '{}' to finish", zone.id);
                }
                handle.wait();
            }
        }
    }
}
