#![cfg_attr(not(test), no_std)]

//! Voltage regulating relay core.
//!
//! Samples one AC line channel, reduces each 16 sample cycle to an RMS
//! magnitude and decides, on a definite or inverse time curve, when to
//! command a raise or lower on the tap changer.

// must come first so the logging macros are visible to every other module
pub(crate) mod fmt;

pub mod command;
pub mod config;
pub mod error;
pub mod filter;
pub mod indicator;
pub mod packet;
pub mod relay;
pub mod tasks;
pub mod time;

pub use command::{CommandInterface, RelayCommand};
pub use config::{RelayConfig, DEFAULT_RELAY_CONFIG};
pub use error::{ConfigurationError, Error};
pub use filter::{compute_rms, Sample, SampleWindow};
pub use indicator::{ActionSink, Indicators};
pub use packet::{Packet, PacketError, PacketReader, PacketReporter};
pub use relay::{
    Action, CounterSelect, Counters, Decision, Direction, EventReporter, RelayEngine, RelayEvent, RelayState, ReportKind,
    TripMode, TripProgress,
};
pub use time::TrippingClock;
