use super::TripMode;

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayEvent {
    Raises(u16),
    Lowers(u16),
    Mode(TripMode),
    /// latest window magnitude, in volts
    Rms(f32),
}

/// What the host asked to be told about.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Raises,
    Lowers,
    Mode,
    Rms,
}

/// Outbound status channel to the host, usually the serial packet link.
pub trait EventReporter {
    fn report_event(&mut self, event: RelayEvent);
}

impl<T: EventReporter + ?Sized> EventReporter for &mut T {
    fn report_event(&mut self, event: RelayEvent) {
        (**self).report_event(event)
    }
}
