use crate::indicator::ActionSink;
use crate::packet::{
    Packet, PacketError, CMD_FREQUENCY, CMD_NUMBER_OF_LOWERS, CMD_NUMBER_OF_RAISES, CMD_TIMING_MODE,
    CMD_VOLTAGE_RMS,
};
use crate::relay::{CounterSelect, EventReporter, RelayEngine, ReportKind, TripMode};

/// Configuration and query surface reachable from the host link.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayCommand {
    GetMode,
    SetMode(TripMode),
    GetRaises,
    ResetRaises,
    GetLowers,
    ResetLowers,
    GetRms,
}

impl TryFrom<&Packet> for RelayCommand {
    type Error = PacketError;

    fn try_from(packet: &Packet) -> Result<Self, Self::Error> {
        match (packet.command_code(), packet.param1) {
            (CMD_TIMING_MODE, 0) => Ok(RelayCommand::GetMode),
            (CMD_TIMING_MODE, mode) => TripMode::from_u8(mode)
                .map(RelayCommand::SetMode)
                .ok_or(PacketError::BadParameter),
            (CMD_NUMBER_OF_RAISES, 0) => Ok(RelayCommand::GetRaises),
            (CMD_NUMBER_OF_RAISES, 1) => Ok(RelayCommand::ResetRaises),
            (CMD_NUMBER_OF_LOWERS, 0) => Ok(RelayCommand::GetLowers),
            (CMD_NUMBER_OF_LOWERS, 1) => Ok(RelayCommand::ResetLowers),
            (CMD_NUMBER_OF_RAISES, _) | (CMD_NUMBER_OF_LOWERS, _) => Err(PacketError::BadParameter),
            (CMD_VOLTAGE_RMS, _) => Ok(RelayCommand::GetRms),
            _ => Err(PacketError::UnknownCommand),
        }
    }
}

pub trait CommandInterface {
    fn processes_cmd(&self, packet: &Packet) -> bool;

    /// `Ok` carries the acknowledgement echo, `Err` the negative
    /// acknowledgement (echo with the ack bit cleared).
    fn apply_command(&mut self, packet: &Packet) -> Result<Packet, Packet>;
}

impl<A: ActionSink, R: EventReporter> CommandInterface for RelayEngine<A, R> {
    fn processes_cmd(&self, packet: &Packet) -> bool {
        // frequency tracking is recognised so it can be refused explicitly
        matches!(
            packet.command_code(),
            CMD_TIMING_MODE | CMD_NUMBER_OF_RAISES | CMD_NUMBER_OF_LOWERS | CMD_FREQUENCY | CMD_VOLTAGE_RMS
        )
    }

    fn apply_command(&mut self, packet: &Packet) -> Result<Packet, Packet> {
        let command = match RelayCommand::try_from(packet) {
            Ok(command) => command,
            Err(err) => {
                warn!("refusing packet {:?}: {:?}", packet, err);
                return Err(packet.without_ack());
            }
        };

        debug!("host command {:?}", command);

        let handled = match command {
            RelayCommand::GetMode => self.report(ReportKind::Mode),
            RelayCommand::SetMode(mode) => {
                self.set_mode(mode);
                true
            }
            RelayCommand::GetRaises => self.report(ReportKind::Raises),
            RelayCommand::ResetRaises => {
                self.reset_counter(CounterSelect::Raises);
                true
            }
            RelayCommand::GetLowers => self.report(ReportKind::Lowers),
            RelayCommand::ResetLowers => {
                self.reset_counter(CounterSelect::Lowers);
                true
            }
            RelayCommand::GetRms => self.report(ReportKind::Rms),
        };

        if handled {
            Ok(*packet)
        } else {
            Err(packet.without_ack())
        }
    }
}
