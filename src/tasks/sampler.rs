use embassy_time::{Duration, Ticker};

use crate::filter::{Sample, SampleWindow};

use super::WindowMailbox;

/// Single channel acquisition, one raw reading per call.
pub trait SampleSource {
    fn acquire_sample(&mut self) -> Sample;
}

impl<T: SampleSource + ?Sized> SampleSource for &mut T {
    fn acquire_sample(&mut self) -> Sample {
        (**self).acquire_sample()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowTick {
    Filling,
    Posted,
    Dropped,
}

pub struct Sampler<'a, S: SampleSource, const WINDOW_SIZE: usize> {
    source: S,
    window: SampleWindow<WINDOW_SIZE>,
    mailbox: &'a WindowMailbox<WINDOW_SIZE>,
}

impl<'a, S: SampleSource, const WINDOW_SIZE: usize> Sampler<'a, S, WINDOW_SIZE> {
    pub fn new(source: S, mailbox: &'a WindowMailbox<WINDOW_SIZE>) -> Self {
        Self {
            source,
            window: SampleWindow::new(),
            mailbox,
        }
    }

    /// One acquisition period. Keep this short, it runs at the sample rate.
    pub fn on_window_tick(&mut self) -> WindowTick {
        let sample = self.source.acquire_sample();
        if !self.window.push(sample) {
            return WindowTick::Filling;
        }

        let window = match self.window.samples() {
            Some(samples) => *samples,
            None => return WindowTick::Filling,
        };

        match self.mailbox.post(window) {
            Ok(()) => WindowTick::Posted,
            Err(_) => {
                warn!("evaluation overrun, window dropped ({} total)", self.mailbox.overruns());
                WindowTick::Dropped
            }
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

pub async fn sampler_task_entry<S: SampleSource, const WINDOW_SIZE: usize>(
    mut sampler: Sampler<'_, S, WINDOW_SIZE>,
    period: Duration,
) -> ! {
    let mut ticker = Ticker::every(period);

    loop {
        sampler.on_window_tick();
        ticker.next().await;
    }
}
