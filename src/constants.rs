use std::time::Duration;

use crate::bus::{BusPins, DisplayPins, Pin};

pub const DISPLAY_WIDTH: u32 = 240;                         // GC9A01 round panel
pub const DISPLAY_HEIGHT: u32 = 240;
pub const DISPLAY_INTERVAL: Duration = Duration::from_secs(10); // Dwell time of each image
pub const BITMAP_EXTENSION: &str = ".bmp";                  // Matched ASCII case-insensitively
pub const MOUNT_POINT: &str = "/sd";

pub const BUS_PINS: BusPins = BusPins {
    clock: Pin(14),
    mosi: Pin(15),
    miso: Pin(2),
};
pub const CARD_SELECT: Pin = Pin(13);
pub const DISPLAY_PINS: DisplayPins = DisplayPins {
    reset: Pin(33),
    command: Pin(27),
    chip_select: Pin(5),
    backlight: Pin(32),
};

pub const RETRY_PAUSE: Duration = Duration::from_secs(1);   // Host pacing after a failed pre-cache
pub const FPS: u32 = 60;                                    // Simulator refresh rate
pub const WINDOW_SCALE: i32 = 2;                            // Simulator pixels per panel pixel
