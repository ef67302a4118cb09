//! Peripheral channel shared by the card reader and the display controller.

use std::fmt;

/// A board GPIO, named the way the board silkscreen names it (`D14`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(pub u8);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusPins {
    pub clock: Pin,
    pub mosi: Pin,
    pub miso: Pin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayPins {
    pub reset: Pin,
    pub command: Pin,
    pub chip_select: Pin,
    pub backlight: Pin,
}

/// Opaque bus handle. Storage and display both borrow it; neither looks inside.
#[derive(Debug)]
pub struct Bus {
    pins: BusPins,
}

impl Bus {
    pub fn new(pins: BusPins) -> Self {
        log::debug!(
            "bus up: clock {} mosi {} miso {}",
            pins.clock, pins.mosi, pins.miso
        );
        Self { pins }
    }

    pub fn pins(&self) -> BusPins {
        self.pins
    }
}
