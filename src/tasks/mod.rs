//! Producer and consumer contexts around the relay engine.
//!
//! The sampler runs at the acquisition cadence and only fills the window.
//! Completed windows are handed to the evaluation task through a single slot
//! mailbox. While a window is in flight any further completed window is
//! dropped and counted, the producer never waits.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::error::Error;
use crate::filter::Sample;

pub mod evaluation;
pub mod sampler;

pub use evaluation::{evaluate_next_window, evaluation_task_entry, trip_clock_task_entry, trip_clock_tick, SharedRelay};
pub use sampler::{sampler_task_entry, SampleSource, Sampler, WindowTick};

pub struct WindowMailbox<const WINDOW_SIZE: usize> {
    window: Signal<CriticalSectionRawMutex, [Sample; WINDOW_SIZE]>,
    in_flight: AtomicBool,
    overruns: AtomicU32,
}

impl<const WINDOW_SIZE: usize> WindowMailbox<WINDOW_SIZE> {
    pub const fn new() -> Self {
        Self {
            window: Signal::new(),
            in_flight: AtomicBool::new(false),
            overruns: AtomicU32::new(0),
        }
    }

    /// Hands a completed window to the consumer.
    ///
    /// Fails with [`Error::Backpressure`] if the previous window has not been
    /// released yet, the new window is discarded.
    pub fn post(&self, window: [Sample; WINDOW_SIZE]) -> Result<(), Error> {
        // no atomic RMW on thumbv6m, so check and set under a critical section
        let accepted = critical_section::with(|_| {
            if self.in_flight.load(Ordering::Relaxed) {
                let overruns = self.overruns.load(Ordering::Relaxed);
                self.overruns.store(overruns.wrapping_add(1), Ordering::Relaxed);
                false
            } else {
                self.in_flight.store(true, Ordering::Relaxed);
                true
            }
        });

        if !accepted {
            return Err(Error::Backpressure);
        }

        self.window.signal(window);
        Ok(())
    }

    pub async fn wait(&self) -> [Sample; WINDOW_SIZE] {
        self.window.wait().await
    }

    /// Takes the pending window without waiting, if there is one.
    pub fn try_take(&self) -> Option<[Sample; WINDOW_SIZE]> {
        if !self.window.signaled() {
            return None;
        }

        // already signaled, resolves on the first poll
        Some(block_on(self.window.wait()))
    }

    /// Called by the consumer once it is done with the taken window.
    pub fn release(&self) {
        critical_section::with(|_| {
            self.in_flight.store(false, Ordering::Relaxed);
        });
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Completed windows dropped because the consumer was still busy.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl<const WINDOW_SIZE: usize> Default for WindowMailbox<WINDOW_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
