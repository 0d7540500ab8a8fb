/// Reasons a [`RelayConfig`](crate::config::RelayConfig) is refused.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationError {
    /// upper bound is not strictly above the lower bound
    ThresholdsInverted,
    /// nominal does not sit strictly inside (lower, upper)
    NominalOutOfBand,
    /// volts per unit is zero, negative or not a number
    NonPositiveScale,
    /// a trip or step duration of zero was requested
    ZeroDuration,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Configuration(ConfigurationError),
    /// a completed window arrived while the previous one was still being evaluated
    Backpressure,
}

impl From<ConfigurationError> for Error {
    fn from(err: ConfigurationError) -> Self {
        Error::Configuration(err)
    }
}
