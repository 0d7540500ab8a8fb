//! Relay decision engine.
//!
//! Consumes one RMS magnitude per completed window and the trip clock's
//! periodic step, decides between idle, timing and tripped, drives the
//! indicator outputs and keeps the raise/lower counters.
//!
//! Definite time: the trip clock is started fresh when the band is left and
//! counts on the trip clock tick; the relay trips once it reaches the fixed
//! target. Inverse time: each evaluation recomputes the target from the
//! deviation and advances the accumulated exposure by one evaluation step,
//! without restarting, so severity changes mid-excursion carry the progress
//! over.
//!
//! A trip latches the raise or lower output for the rest of the excursion.
//! Timing starts again only after the band is regained or the excursion
//! flips direction.

pub mod curve;
pub mod report;

pub use curve::{Action, Direction, TripMode};
pub use report::{EventReporter, RelayEvent, ReportKind};

use crate::config::RelayConfig;
use crate::error::Error;
use crate::indicator::{ActionSink, Indicators};
use crate::time::TrippingClock;

use curve::{classify, deviation, inverse_trip_time_ms};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayState {
    Idle,
    OutOfBand(Direction),
    Tripped(Action),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counters {
    pub raises: u16,
    pub lowers: u16,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterSelect {
    Raises,
    Lowers,
    Both,
}

/// Outcome of one magnitude evaluation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    InBand,
    Timing(Direction),
    Tripped(Action),
    /// already tripped for this excursion, waiting for the band or a flip
    Holding(Action),
    /// input could not be used, nothing advanced
    Guarded,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TripProgress {
    pub elapsed_ms: u32,
    pub target_ms: u32,
    pub percent_complete: u32,
}

pub struct RelayEngine<A: ActionSink, R: EventReporter> {
    config: RelayConfig,
    mode: TripMode,
    state: RelayState,
    clock: TrippingClock,
    counters: Counters,

    last_rms: Option<f32>,
    guard_events: u32,
    indicators: Indicators,

    action_sink: A,
    reporter: R,
}

impl<A: ActionSink, R: EventReporter> RelayEngine<A, R> {
    pub fn new(config: RelayConfig, action_sink: A, reporter: R) -> Result<Self, Error> {
        if let Err(err) = config.validate() {
            error!("rejected relay configuration: {:?}", err);
            return Err(err);
        }

        let mut engine = Self {
            config,
            mode: config.initial_mode,
            state: RelayState::Idle,
            clock: TrippingClock::new(),
            counters: Counters::default(),
            last_rms: None,
            guard_events: 0,
            indicators: Indicators::IDLE,
            action_sink,
            reporter,
        };
        engine.command_indicators(Indicators::IDLE);

        Ok(engine)
    }

    /// Evaluates the magnitude of one completed window.
    pub fn evaluate(&mut self, rms: f32) -> Decision {
        let direction = match classify(rms, &self.config) {
            Ok(Some(direction)) => direction,
            Ok(None) => {
                self.last_rms = Some(rms);
                self.enter_band();
                return Decision::InBand;
            }
            Err(()) => {
                return self.guard(rms);
            }
        };
        self.last_rms = Some(rms);

        match self.state {
            RelayState::OutOfBand(prev) if prev == direction => {}
            RelayState::OutOfBand(prev) => {
                // opposite excursion, progress toward the old action is meaningless
                warn!("excursion flipped from {:?} to {:?} at {}", prev, direction, rms);
                self.clock.reset();
            }
            RelayState::Idle => {
                warn!("voltage left band {:?} at {}", direction, rms);
            }
            RelayState::Tripped(action) if action == direction.corrective_action() => {
                // latched until the band is regained
                self.command_indicators(trip_indicators(direction));
                return Decision::Holding(action);
            }
            RelayState::Tripped(action) => {
                warn!("excursion flipped to {:?} after {:?} trip at {}", direction, action, rms);
                self.clock.reset();
            }
        }
        self.state = RelayState::OutOfBand(direction);
        self.command_indicators(Indicators::ALARM);

        match self.mode {
            TripMode::Definite => {
                if !self.clock.is_running() {
                    if let Err(err) = self.clock.start(self.config.definite_trip_ms) {
                        error!("definite trip clock failed to start: {:?}", err);
                    }
                }

                Decision::Timing(direction)
            }
            TripMode::Inverse => self.advance_inverse(rms, direction),
        }
    }

    /// Periodic trip clock step. Returns the action if this step tripped.
    ///
    /// Only definite time counts here, inverse time advances per evaluation.
    pub fn on_trip_clock_tick(&mut self, step_ms: u32) -> Option<Action> {
        match (self.mode, self.state) {
            (TripMode::Definite, RelayState::OutOfBand(direction)) if self.clock.is_running() => {
                self.clock.tick(step_ms);

                if self.clock.expired() {
                    Some(self.trip(direction))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn set_mode(&mut self, mode: TripMode) {
        if mode != self.mode {
            info!("trip mode {:?} -> {:?}", self.mode, mode);
        }

        self.mode = mode;
        // never carry progress between curves
        self.clock.reset();
    }

    pub fn mode(&self) -> TripMode {
        self.mode
    }

    pub fn reset_counter(&mut self, which: CounterSelect) {
        match which {
            CounterSelect::Raises => self.counters.raises = 0,
            CounterSelect::Lowers => self.counters.lowers = 0,
            CounterSelect::Both => self.counters = Counters::default(),
        }

        info!("counter reset {:?}", which);
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn trip_progress(&self) -> TripProgress {
        TripProgress {
            elapsed_ms: self.clock.elapsed_ms(),
            target_ms: self.clock.target_ms(),
            percent_complete: self.clock.percent_complete(),
        }
    }

    pub fn is_timing(&self) -> bool {
        self.clock.is_running()
    }

    pub fn last_rms(&self) -> Option<f32> {
        self.last_rms
    }

    pub fn rms_volts(&self) -> Option<f32> {
        self.last_rms.map(|rms| rms / self.config.volts_per_unit)
    }

    /// Number of inputs skipped as measurement inconsistencies.
    pub fn guard_events(&self) -> u32 {
        self.guard_events
    }

    /// The last indicator set commanded on the action sink.
    pub fn indicators(&self) -> Indicators {
        self.indicators
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn action_sink(&self) -> &A {
        &self.action_sink
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// Pushes the requested value to the reporter. False if there is nothing
    /// to report yet (no window evaluated).
    pub fn report(&mut self, kind: ReportKind) -> bool {
        let event = match kind {
            ReportKind::Raises => RelayEvent::Raises(self.counters.raises),
            ReportKind::Lowers => RelayEvent::Lowers(self.counters.lowers),
            ReportKind::Mode => RelayEvent::Mode(self.mode),
            ReportKind::Rms => match self.rms_volts() {
                Some(volts) => RelayEvent::Rms(volts),
                None => {
                    debug!("rms requested before first window");
                    return false;
                }
            },
        };

        self.reporter.report_event(event);
        true
    }

    fn advance_inverse(&mut self, rms: f32, direction: Direction) -> Decision {
        let deviation = deviation(rms, &self.config);
        let target_ms = match inverse_trip_time_ms(deviation, self.config.inverse_floor_ms) {
            Some(target_ms) => target_ms,
            None => return self.guard(rms),
        };

        if let Err(err) = self.clock.resume(target_ms) {
            error!("inverse trip clock failed to resume: {:?}", err);
            return Decision::Timing(direction);
        }
        self.clock.tick(self.config.evaluation_step_ms);

        trace!(
            "inverse {} V off nominal, {} of {} ms ({}%)",
            deviation,
            self.clock.elapsed_ms(),
            target_ms,
            self.clock.percent_complete()
        );

        if self.clock.percent_complete() >= 100 {
            Decision::Tripped(self.trip(direction))
        } else {
            Decision::Timing(direction)
        }
    }

    fn trip(&mut self, direction: Direction) -> Action {
        let action = direction.corrective_action();
        let event = match direction {
            Direction::BelowLower => {
                self.counters.raises = self.counters.raises.saturating_add(1);
                RelayEvent::Raises(self.counters.raises)
            }
            Direction::AboveUpper => {
                self.counters.lowers = self.counters.lowers.saturating_add(1);
                RelayEvent::Lowers(self.counters.lowers)
            }
        };

        info!(
            "{:?} trip after {} ms, raises {} lowers {}",
            self.mode,
            self.clock.elapsed_ms(),
            self.counters.raises,
            self.counters.lowers
        );

        self.clock.reset();
        self.state = RelayState::Tripped(action);
        self.command_indicators(trip_indicators(direction));
        self.reporter.report_event(event);

        action
    }

    fn enter_band(&mut self) {
        if self.state != RelayState::Idle {
            info!("voltage back in band after {} ms", self.clock.elapsed_ms());
        }

        self.clock.reset();
        self.state = RelayState::Idle;
        self.command_indicators(Indicators::IDLE);
    }

    fn guard(&mut self, rms: f32) -> Decision {
        self.guard_events = self.guard_events.wrapping_add(1);
        warn!("skipping inconsistent magnitude {} ({} skipped)", rms, self.guard_events);

        Decision::Guarded
    }

    fn command_indicators(&mut self, indicators: Indicators) {
        self.indicators = indicators;
        self.action_sink.set_indicator(indicators);
    }
}

/// Outputs held while a trip for this excursion is signalled.
fn trip_indicators(direction: Direction) -> Indicators {
    match direction {
        Direction::BelowLower => Indicators::ALARM | Indicators::RAISE,
        Direction::AboveUpper => Indicators::ALARM | Indicators::LOWER,
    }
}
