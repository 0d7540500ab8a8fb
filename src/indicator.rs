use core::ops::BitOr;

/// Set of relay output indicators. Alarm overlaps with raise/lower while a
/// trip is being signalled.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators(u8);

impl Indicators {
    pub const IDLE: Indicators = Indicators(0x00);
    pub const RAISE: Indicators = Indicators(0x01);
    pub const LOWER: Indicators = Indicators(0x02);
    pub const ALARM: Indicators = Indicators(0x04);

    pub const fn from_bits(bits: u8) -> Self {
        Indicators(bits & 0x07)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Indicators) -> Self {
        Indicators(self.0 | other.0)
    }

    pub const fn contains(self, other: Indicators) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_idle(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Indicators {
    type Output = Indicators;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Output side of the relay. Boards bind this to LEDs and the tap changer
/// contacts.
pub trait ActionSink {
    fn set_indicator(&mut self, state: Indicators);
}

impl<T: ActionSink + ?Sized> ActionSink for &mut T {
    fn set_indicator(&mut self, state: Indicators) {
        (**self).set_indicator(state)
    }
}
