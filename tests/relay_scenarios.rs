use ateam_vrr::config::{DEFAULT_RELAY_CONFIG, EVALUATION_STEP_MS};
use ateam_vrr::{
    Action, ActionSink, CounterSelect, Counters, Decision, Direction, EventReporter, Indicators, RelayConfig,
    RelayEngine, RelayEvent, RelayState, TripMode,
};

#[derive(Default)]
struct Outputs {
    history: Vec<Indicators>,
}

impl ActionSink for Outputs {
    fn set_indicator(&mut self, state: Indicators) {
        self.history.push(state);
    }
}

#[derive(Default)]
struct Host {
    events: Vec<RelayEvent>,
}

impl EventReporter for Host {
    fn report_event(&mut self, event: RelayEvent) {
        self.events.push(event);
    }
}

fn relay() -> RelayEngine<Outputs, Host> {
    RelayEngine::new(DEFAULT_RELAY_CONFIG, Outputs::default(), Host::default()).unwrap()
}

const ABOVE: f32 = DEFAULT_RELAY_CONFIG.upper + 0.5;
const BELOW: f32 = DEFAULT_RELAY_CONFIG.lower - 0.5;
// exactly one volt above nominal
const ONE_VOLT_HIGH: f32 = DEFAULT_RELAY_CONFIG.nominal + DEFAULT_RELAY_CONFIG.volts_per_unit;

/// One 10 ms step of the definite time pipeline: a window evaluation then a
/// trip clock tick.
fn definite_step(relay: &mut RelayEngine<Outputs, Host>, rms: f32) -> Option<Action> {
    relay.evaluate(rms);
    relay.on_trip_clock_tick(EVALUATION_STEP_MS)
}

#[test]
fn definite_trips_once_after_5000ms() {
    let mut relay = relay();

    let mut trips = 0;
    for step in 1..=500 {
        if let Some(action) = definite_step(&mut relay, ABOVE) {
            assert_eq!(step, 500);
            assert_eq!(action, Action::Lower);
            trips += 1;
        }
    }

    assert_eq!(trips, 1);
    assert_eq!(relay.counters(), Counters { raises: 0, lowers: 1 });
    assert_eq!(relay.state(), RelayState::Tripped(Action::Lower));
    assert_eq!(relay.indicators(), Indicators::ALARM | Indicators::LOWER);
    assert_eq!(relay.reporter().events, vec![RelayEvent::Lowers(1)]);
}

#[test]
fn definite_4990ms_then_in_band_does_not_trip() {
    let mut relay = relay();

    for _ in 0..499 {
        assert_eq!(definite_step(&mut relay, ABOVE), None);
    }
    assert_eq!(relay.trip_progress().elapsed_ms, 4990);

    assert_eq!(relay.evaluate(DEFAULT_RELAY_CONFIG.nominal), Decision::InBand);
    assert_eq!(relay.on_trip_clock_tick(EVALUATION_STEP_MS), None);

    assert_eq!(relay.counters(), Counters::default());
    assert_eq!(relay.state(), RelayState::Idle);
    assert_eq!(relay.trip_progress().elapsed_ms, 0);
    assert_eq!(relay.indicators(), Indicators::IDLE);
}

#[test]
fn trip_output_holds_until_band_return() {
    let mut relay = relay();

    for _ in 0..500 {
        definite_step(&mut relay, BELOW);
    }
    assert_eq!(relay.counters().raises, 1);

    // still low: the raise stays commanded and nothing is retimed
    for _ in 0..1000 {
        assert_eq!(definite_step(&mut relay, BELOW), None);
    }
    assert_eq!(relay.state(), RelayState::Tripped(Action::Raise));
    assert_eq!(relay.indicators(), Indicators::ALARM | Indicators::RAISE);
    assert_eq!(relay.evaluate(BELOW), Decision::Holding(Action::Raise));
    assert_eq!(relay.counters().raises, 1);
    assert!(!relay.is_timing());

    assert_eq!(relay.evaluate(DEFAULT_RELAY_CONFIG.nominal), Decision::InBand);
    assert_eq!(relay.indicators(), Indicators::IDLE);

    // a new excursion times from zero again
    for _ in 0..500 {
        definite_step(&mut relay, BELOW);
    }
    assert_eq!(relay.counters().raises, 2);
}

#[test]
fn direction_flip_after_trip_rearms() {
    let mut relay = relay();

    for _ in 0..500 {
        definite_step(&mut relay, BELOW);
    }

    assert_eq!(relay.evaluate(ABOVE), Decision::Timing(Direction::AboveUpper));
    assert_eq!(relay.indicators(), Indicators::ALARM);
    assert!(relay.is_timing());
    assert_eq!(relay.trip_progress().elapsed_ms, 0);
}

#[test]
fn inverse_trip_holds_while_excursion_continues() {
    let mut relay = relay();
    relay.set_mode(TripMode::Inverse);

    for _ in 0..250 {
        relay.evaluate(ONE_VOLT_HIGH);
    }
    assert_eq!(relay.counters().lowers, 1);

    for _ in 0..500 {
        assert_eq!(relay.evaluate(ONE_VOLT_HIGH), Decision::Holding(Action::Lower));
    }
    assert_eq!(relay.counters().lowers, 1);
    assert_eq!(relay.indicators(), Indicators::ALARM | Indicators::LOWER);
    assert_eq!(relay.trip_progress().elapsed_ms, 0);
}

#[test]
fn inverse_one_volt_trips_on_250th_evaluation() {
    let mut relay = relay();
    relay.set_mode(TripMode::Inverse);

    for _ in 0..249 {
        assert_eq!(relay.evaluate(ONE_VOLT_HIGH), Decision::Timing(Direction::AboveUpper));
    }

    let progress = relay.trip_progress();
    assert_eq!(progress.target_ms, 2500);
    assert_eq!(progress.elapsed_ms, 2490);
    assert_eq!(progress.percent_complete, 99);

    assert_eq!(relay.evaluate(ONE_VOLT_HIGH), Decision::Tripped(Action::Lower));
    assert_eq!(relay.counters(), Counters { raises: 0, lowers: 1 });
    assert_eq!(relay.trip_progress().elapsed_ms, 0);
}

#[test]
fn inverse_keeps_progress_when_severity_changes() {
    let mut relay = relay();
    relay.set_mode(TripMode::Inverse);

    // 1.5 V low, about 1667 ms target
    let low = DEFAULT_RELAY_CONFIG.nominal - 1.5 * DEFAULT_RELAY_CONFIG.volts_per_unit;
    for _ in 0..100 {
        assert_eq!(relay.evaluate(low), Decision::Timing(Direction::BelowLower));
    }
    assert_eq!(relay.trip_progress().elapsed_ms, 1000);

    // worse excursion hits the 1000 ms floor, accumulated exposure already covers it
    let far_low = DEFAULT_RELAY_CONFIG.nominal - 2.5 * DEFAULT_RELAY_CONFIG.volts_per_unit;
    assert_eq!(relay.evaluate(far_low), Decision::Tripped(Action::Raise));
    assert_eq!(relay.counters().raises, 1);
}

#[test]
fn mode_switch_discards_definite_progress() {
    let mut relay = relay();

    for _ in 0..300 {
        definite_step(&mut relay, ABOVE);
    }
    assert_eq!(relay.trip_progress().elapsed_ms, 3000);

    relay.set_mode(TripMode::Inverse);
    assert_eq!(relay.trip_progress().elapsed_ms, 0);
    assert!(!relay.is_timing());

    relay.evaluate(ONE_VOLT_HIGH);
    let progress = relay.trip_progress();
    assert_eq!(progress.elapsed_ms, EVALUATION_STEP_MS);
    assert_eq!(progress.target_ms, 2500);
}

#[test]
fn counter_reset_leaves_state_and_other_counter() {
    let mut relay = relay();

    for _ in 0..500 {
        definite_step(&mut relay, BELOW);
    }
    for _ in 0..500 {
        definite_step(&mut relay, ABOVE);
    }
    assert_eq!(relay.counters(), Counters { raises: 1, lowers: 1 });

    relay.evaluate(ABOVE);
    let state = relay.state();
    assert_eq!(state, RelayState::Tripped(Action::Lower));

    relay.reset_counter(CounterSelect::Raises);
    assert_eq!(relay.counters(), Counters { raises: 0, lowers: 1 });
    assert_eq!(relay.state(), state);
    assert_eq!(relay.indicators(), Indicators::ALARM | Indicators::LOWER);
}

#[test]
fn band_edges_are_in_band() {
    let mut relay = relay();

    assert_eq!(relay.evaluate(DEFAULT_RELAY_CONFIG.upper), Decision::InBand);
    assert_eq!(relay.evaluate(DEFAULT_RELAY_CONFIG.lower), Decision::InBand);
    assert_eq!(relay.state(), RelayState::Idle);
    assert!(!relay.is_timing());
}

#[test]
fn in_band_is_idempotent() {
    let mut relay = relay();

    for _ in 0..1000 {
        assert_eq!(relay.evaluate(DEFAULT_RELAY_CONFIG.nominal), Decision::InBand);
        assert_eq!(relay.on_trip_clock_tick(EVALUATION_STEP_MS), None);
    }

    assert_eq!(relay.counters(), Counters::default());
    assert!(!relay.is_timing());
    assert!(relay.action_sink().history.iter().all(|s| s.is_idle()));
    assert!(relay.reporter().events.is_empty());
}

#[test]
fn alarm_clears_on_return_to_band() {
    let mut relay = relay();

    relay.evaluate(BELOW);
    assert_eq!(relay.indicators(), Indicators::ALARM);

    relay.evaluate(DEFAULT_RELAY_CONFIG.nominal);
    assert_eq!(relay.indicators(), Indicators::IDLE);
    assert_eq!(
        relay.action_sink().history,
        vec![Indicators::IDLE, Indicators::ALARM, Indicators::IDLE]
    );
}

#[test]
fn near_zero_deviation_is_guarded() {
    // a scale this large makes any excursion look like no deviation at all
    let cfg = RelayConfig {
        volts_per_unit: 1.0e12,
        initial_mode: TripMode::Inverse,
        ..DEFAULT_RELAY_CONFIG
    };
    let mut relay = RelayEngine::new(cfg, Outputs::default(), Host::default()).unwrap();

    assert_eq!(relay.evaluate(ABOVE), Decision::Guarded);
    assert_eq!(relay.guard_events(), 1);
    assert_eq!(relay.trip_progress().elapsed_ms, 0);
    assert_eq!(relay.counters(), Counters::default());
}

#[test]
fn invalid_configs_refuse_to_build() {
    let bad = [
        RelayConfig { upper: 6000.0, ..DEFAULT_RELAY_CONFIG },
        RelayConfig { nominal: 10_000.0, ..DEFAULT_RELAY_CONFIG },
        RelayConfig { definite_trip_ms: 0, ..DEFAULT_RELAY_CONFIG },
        RelayConfig { volts_per_unit: -1.0, ..DEFAULT_RELAY_CONFIG },
    ];

    for cfg in bad {
        assert!(RelayEngine::new(cfg, Outputs::default(), Host::default()).is_err());
    }
}
