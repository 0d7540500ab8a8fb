use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Ticker};

use crate::filter::compute_rms;
use crate::indicator::ActionSink;
use crate::relay::{Action, Decision, EventReporter, RelayEngine};

use super::WindowMailbox;

/// Engine shared between the evaluation task, the trip clock and the host
/// command handler.
pub type SharedRelay<A, R> = Mutex<CriticalSectionRawMutex, RelayEngine<A, R>>;

/// Frees the mailbox slot when dropped, including when the evaluation is
/// cancelled while waiting on the engine lock.
struct TakenWindow<'a, const WINDOW_SIZE: usize> {
    mailbox: &'a WindowMailbox<WINDOW_SIZE>,
}

impl<const WINDOW_SIZE: usize> Drop for TakenWindow<'_, WINDOW_SIZE> {
    fn drop(&mut self) {
        self.mailbox.release();
    }
}

/// Waits for the next completed window and runs one evaluation on it.
///
/// If the future is dropped after the window was taken, that window is lost
/// but the slot is released so the sampler can post again.
pub async fn evaluate_next_window<A: ActionSink, R: EventReporter, const WINDOW_SIZE: usize>(
    mailbox: &WindowMailbox<WINDOW_SIZE>,
    relay: &SharedRelay<A, R>,
) -> Decision {
    let window = mailbox.wait().await;
    let _taken = TakenWindow { mailbox };
    let rms = compute_rms(&window);

    let decision = relay.lock().await.evaluate(rms);

    trace!("window rms {} -> {:?}", rms, decision);
    decision
}

pub async fn evaluation_task_entry<A: ActionSink, R: EventReporter, const WINDOW_SIZE: usize>(
    mailbox: &WindowMailbox<WINDOW_SIZE>,
    relay: &SharedRelay<A, R>,
) -> ! {
    loop {
        evaluate_next_window(mailbox, relay).await;
    }
}

pub async fn trip_clock_tick<A: ActionSink, R: EventReporter>(relay: &SharedRelay<A, R>, step: Duration) -> Option<Action> {
    let step_ms = u32::try_from(step.as_millis()).unwrap_or(u32::MAX);
    relay.lock().await.on_trip_clock_tick(step_ms)
}

pub async fn trip_clock_task_entry<A: ActionSink, R: EventReporter>(relay: &SharedRelay<A, R>, period: Duration) -> ! {
    let mut ticker = Ticker::every(period);

    loop {
        ticker.next().await;
        trip_clock_tick(relay, period).await;
    }
}
