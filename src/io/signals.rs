//! Signal handling for coordinated shutdown.
//!
//! A dedicated thread waits on SIGINT, SIGTERM and SIGHUP and forwards a
//! [`SignalMessage::Shutdown`] to the main loop, which sleeps on the
//! receiving end of the channel between ticks and therefore wakes at once.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread;
use std::time::Duration;

/// Messages delivered to the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Stop the main loop and run the shutdown sequence.
    Shutdown,
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared once a shutdown has been requested
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Kept so that other parts of the program (and tests) can request shutdown
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State without any OS signal registration.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    /// Request a shutdown as if an interrupt had arrived.
    pub fn request_shutdown(&self) {
        request_shutdown(&self.running, &self.signal_sender);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sleep for up to `timeout`, waking early on shutdown.
    ///
    /// Returns `true` once a shutdown has been requested.
    pub fn wait_for_shutdown(&self, timeout: Duration) -> bool {
        if !self.is_running() {
            return true;
        }
        match self.signal_receiver.recv_timeout(timeout) {
            Ok(SignalMessage::Shutdown) => true,
            Err(RecvTimeoutError::Timeout) => !self.is_running(),
            Err(RecvTimeoutError::Disconnected) => {
                log_warning!("Signal channel closed, shutting down");
                true
            }
        }
    }
}

fn request_shutdown(running: &AtomicBool, sender: &Sender<SignalMessage>) {
    running.store(false, Ordering::SeqCst);
    let _ = sender.send(SignalMessage::Shutdown);
}

/// Register the shutdown signals and start the forwarding thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let name = match sig {
                    SIGINT => "SIGINT",
                    SIGTERM => "SIGTERM",
                    SIGHUP => "SIGHUP",
                    _ => "unknown signal",
                };

                if running.load(Ordering::SeqCst) {
                    log_pipe!();
                    log_info!("Received {name}, shutting down...");
                    request_shutdown(&running, &sender);
                } else {
                    log_debug!("Ignoring {name}; shutdown already in progress");
                }
            }
        })
        .context("failed to start signal handler thread")?;

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shutdown_clears_running_and_notifies() {
        let state = SignalState::detached();
        assert!(state.is_running());

        state.request_shutdown();

        assert!(!state.is_running());
        assert_eq!(
            state.signal_receiver.try_recv().unwrap(),
            SignalMessage::Shutdown
        );
    }

    #[test]
    fn wait_for_shutdown_times_out_while_running() {
        let state = SignalState::detached();
        assert!(!state.wait_for_shutdown(Duration::from_millis(10)));
        assert!(state.is_running());
    }

    #[test]
    fn wait_for_shutdown_wakes_on_request() {
        let state = SignalState::detached();
        let running = state.running.clone();
        let sender = state.signal_sender.clone();

        let requester = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            request_shutdown(&running, &sender);
        });

        let start = std::time::Instant::now();
        assert!(state.wait_for_shutdown(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        requester.join().unwrap();

        // Stays answered after the message has been consumed
        assert!(state.wait_for_shutdown(Duration::from_secs(10)));
    }
}
