use crate::error::{ConfigurationError, Error};

/// Restartable countdown toward a trip, advanced by an external periodic tick.
///
/// All values are whole milliseconds so progress does not drift with the
/// board's embassy tick rate.
pub struct TrippingClock {
    elapsed_ms: u32,
    target_ms: u32,
    running: bool,
}

impl TrippingClock {
    pub const fn new() -> Self {
        Self {
            elapsed_ms: 0,
            target_ms: 0,
            running: false,
        }
    }

    /// Starts a fresh countdown, discarding any accumulated progress.
    pub fn start(&mut self, target_ms: u32) -> Result<(), Error> {
        self.resume(target_ms)?;
        self.elapsed_ms = 0;
        Ok(())
    }

    /// Replaces the target and keeps counting from the progress already made.
    pub fn resume(&mut self, target_ms: u32) -> Result<(), Error> {
        if target_ms == 0 {
            return Err(ConfigurationError::ZeroDuration.into());
        }

        self.target_ms = target_ms;
        self.running = true;
        Ok(())
    }

    /// Halts the countdown. Progress is kept until [`reset`](Self::reset).
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
        self.target_ms = 0;
    }

    /// Advances a running clock by one step, returns the elapsed time.
    pub fn tick(&mut self, step_ms: u32) -> u32 {
        if self.running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(step_ms);
        }

        self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    pub fn target_ms(&self) -> u32 {
        self.target_ms
    }

    pub fn percent_complete(&self) -> u32 {
        if self.target_ms == 0 {
            return 0;
        }

        let pct = (self.elapsed_ms as u64 * 100) / self.target_ms as u64;
        pct.min(u32::MAX as u64) as u32
    }

    pub fn expired(&self) -> bool {
        self.target_ms != 0 && self.elapsed_ms >= self.target_ms
    }
}

impl Default for TrippingClock {
    fn default() -> Self {
        Self::new()
    }
}
