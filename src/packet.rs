//! Five byte host packets: command, three parameters and an XOR checksum.

use heapless::Deque;

use crate::relay::{EventReporter, RelayEvent};

pub const PACKET_LEN: usize = 5;
pub const PACKET_ACK_MASK: u8 = 0x80;

pub const CMD_TIMING_MODE: u8 = 0x10;
pub const CMD_NUMBER_OF_RAISES: u8 = 0x11;
pub const CMD_NUMBER_OF_LOWERS: u8 = 0x12;
pub const CMD_FREQUENCY: u8 = 0x17;
pub const CMD_VOLTAGE_RMS: u8 = 0x18;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    BadChecksum,
    UnknownCommand,
    BadParameter,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    pub command: u8,
    pub param1: u8,
    pub param2: u8,
    pub param3: u8,
}

impl Packet {
    pub const fn new(command: u8, param1: u8, param2: u8, param3: u8) -> Self {
        Self { command, param1, param2, param3 }
    }

    pub const fn checksum(&self) -> u8 {
        self.command ^ self.param1 ^ self.param2 ^ self.param3
    }

    pub const fn to_bytes(&self) -> [u8; PACKET_LEN] {
        [self.command, self.param1, self.param2, self.param3, self.checksum()]
    }

    pub fn from_bytes(bytes: &[u8; PACKET_LEN]) -> Result<Self, PacketError> {
        let packet = Self::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        if packet.checksum() != bytes[4] {
            return Err(PacketError::BadChecksum);
        }

        Ok(packet)
    }

    /// Command with the acknowledgement bit stripped.
    pub const fn command_code(&self) -> u8 {
        self.command & !PACKET_ACK_MASK
    }

    pub const fn ack_requested(&self) -> bool {
        self.command & PACKET_ACK_MASK != 0
    }

    pub const fn without_ack(&self) -> Self {
        Self::new(self.command_code(), self.param1, self.param2, self.param3)
    }
}

/// Byte-at-a-time packet decoder.
///
/// A checksum mismatch slides the frame along by one byte so the reader
/// finds the next packet boundary without needing a delimiter.
pub struct PacketReader {
    buf: [u8; PACKET_LEN],
    len: usize,
    rejected: u32,
}

impl PacketReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; PACKET_LEN],
            len: 0,
            rejected: 0,
        }
    }

    pub fn push_byte(&mut self, byte: u8) -> Option<Packet> {
        self.buf[self.len] = byte;
        self.len += 1;

        if self.len < PACKET_LEN {
            return None;
        }

        match Packet::from_bytes(&self.buf) {
            Ok(packet) => {
                self.len = 0;
                Some(packet)
            }
            Err(err) => {
                self.rejected = self.rejected.wrapping_add(1);
                warn!("dropping byte {:?} from frame: {:?}", self.buf[0], err);

                self.buf.copy_within(1.., 0);
                self.len = PACKET_LEN - 1;
                None
            }
        }
    }

    /// Bytes discarded while hunting for a frame boundary.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

impl Default for PacketReader {
    fn default() -> Self {
        Self::new()
    }
}

impl From<RelayEvent> for Packet {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::Raises(n) => {
                let [lo, hi] = n.to_le_bytes();
                Packet::new(CMD_NUMBER_OF_RAISES, lo, hi, 0)
            }
            RelayEvent::Lowers(n) => {
                let [lo, hi] = n.to_le_bytes();
                Packet::new(CMD_NUMBER_OF_LOWERS, lo, hi, 0)
            }
            RelayEvent::Mode(mode) => Packet::new(CMD_TIMING_MODE, mode.as_u8(), 0, 0),
            RelayEvent::Rms(volts) => {
                // millivolts, saturating, NaN goes to 0
                let mv = libm::roundf(volts * 1000.0) as u16;
                let [lo, hi] = mv.to_le_bytes();
                Packet::new(CMD_VOLTAGE_RMS, lo, hi, 0)
            }
        }
    }
}

/// Reporter that queues encoded packets for the UART writer.
///
/// When full the oldest packet is dropped, the host re-polls for state so the
/// newest value matters more.
pub struct PacketReporter<const DEPTH: usize> {
    queue: Deque<Packet, DEPTH>,
    dropped: u32,
}

impl<const DEPTH: usize> PacketReporter<DEPTH> {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    pub fn push(&mut self, packet: Packet) {
        if self.queue.is_full() {
            self.queue.pop_front();
            self.dropped = self.dropped.wrapping_add(1);
            warn!("report queue full, dropped oldest ({} total)", self.dropped);
        }

        // room was just made
        let _ = self.queue.push_back(packet);
    }

    pub fn pop(&mut self) -> Option<Packet> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const DEPTH: usize> Default for PacketReporter<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> EventReporter for PacketReporter<DEPTH> {
    fn report_event(&mut self, event: RelayEvent) {
        self.push(event.into());
    }
}
