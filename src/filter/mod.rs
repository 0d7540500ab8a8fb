pub mod rms;

pub use rms::compute_rms;

/// One raw reading from the line voltage ADC channel.
pub type Sample = i16;

/// Fixed capacity circular buffer of raw samples for one channel.
///
/// Samples are written in order and overwritten cyclically. [`push`](Self::push)
/// reports completion once per `WINDOW_SIZE` writes, at which point the
/// buffer holds exactly the last `WINDOW_SIZE` samples in insertion order.
pub struct SampleWindow<const WINDOW_SIZE: usize> {
    window: [Sample; WINDOW_SIZE],
    update_ind: usize,
    completed: bool,
}

impl<const WINDOW_SIZE: usize> SampleWindow<WINDOW_SIZE> {
    pub const fn new() -> Self {
        Self {
            window: [0; WINDOW_SIZE],
            update_ind: 0,
            completed: false,
        }
    }

    /// Appends one sample, returns true if this write completed a window.
    pub fn push(&mut self, sample: Sample) -> bool {
        self.window[self.update_ind] = sample;

        self.update_ind += 1;
        if self.update_ind >= WINDOW_SIZE {
            self.update_ind = 0;
            self.completed = true;
            return true;
        }

        false
    }

    /// The window contents, only once at least one full window has been written.
    ///
    /// Mid-window this still returns the last completed window's tail mixed with
    /// the new head, so callers should snapshot right after `push` returns true.
    pub fn samples(&self) -> Option<&[Sample; WINDOW_SIZE]> {
        if !self.completed {
            return None;
        }

        Some(&self.window)
    }

    pub fn fill_level(&self) -> usize {
        self.update_ind
    }

    pub fn reset(&mut self) {
        for i in 0..WINDOW_SIZE {
            self.window[i] = 0;
        }

        self.update_ind = 0;
        self.completed = false;
    }
}

impl<const WINDOW_SIZE: usize> Default for SampleWindow<WINDOW_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}
