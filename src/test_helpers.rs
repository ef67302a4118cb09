//! Fakes for driving the slideshow on virtual time.
//!
//! [`SharedTime`] is the one clock every fake reads: [`FakeClock`] advances it
//! when sleeping, [`FakeDecoder`] when decoding, and [`RecordingPanel`] stamps
//! each presentation with it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};
use std::time::Duration;

use image::{ColorType, ImageFormat, Rgb, RgbImage};

use crate::bus::{Bus, Pin};
use crate::clock::Clock;
use crate::display::{Panel, Visual};
use crate::frame::{BitmapDecoder, DecodeError, DecodedFrame, PixelShader};
use crate::storage::{DirEntry, MountedRoot, Storage, StorageError};

// =========================================================================
// Time
// =========================================================================

#[derive(Debug, Clone, Default)]
pub struct SharedTime(Rc<Cell<Duration>>);

impl SharedTime {
    pub fn now(&self) -> Duration {
        self.0.get()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

pub struct FakeClock {
    time: SharedTime,
}

impl FakeClock {
    pub fn new(time: SharedTime) -> Self {
        Self { time }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.time.now()
    }

    fn sleep(&mut self, duration: Duration) {
        self.time.advance(duration);
    }
}

// =========================================================================
// Storage
// =========================================================================

/// Card whose root is always `/sd`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub entries: Vec<DirEntry>,
    pub fail_mount: bool,
    pub fail_listing: bool,
}

impl MemoryStorage {
    pub fn with_files(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|name| DirEntry { name: name.to_string(), is_file: true })
                .collect(),
            ..Self::default()
        }
    }

    pub fn add_dir(&mut self, name: &str) {
        self.entries.push(DirEntry { name: name.to_string(), is_file: false });
    }
}

impl Storage for MemoryStorage {
    fn mount(&mut self, _bus: &Bus, _select: Pin) -> Result<MountedRoot, StorageError> {
        if self.fail_mount {
            return Err(StorageError::NoCard("/sd".into()));
        }
        Ok(MountedRoot::new("/sd"))
    }

    fn list_entries(&self, _root: &MountedRoot) -> Result<Vec<DirEntry>, StorageError> {
        if self.fail_listing {
            return Err(io::Error::other("card removed").into());
        }
        Ok(self.entries.clone())
    }
}

// =========================================================================
// Decoding
// =========================================================================

/// Produces blank bitmaps, failing scripted paths a given number of times.
pub struct FakeDecoder {
    time: SharedTime,
    cost: Duration,
    size: (u32, u32),
    failures: HashMap<String, u32>,
    attempts: Vec<String>,
}

impl FakeDecoder {
    pub fn new(time: SharedTime) -> Self {
        Self {
            time,
            cost: Duration::ZERO,
            size: (240, 240),
            failures: HashMap::new(),
            attempts: Vec::new(),
        }
    }

    /// Fail the next `times` decodes of `path`.
    pub fn fail(&mut self, path: &str, times: u32) {
        self.failures.insert(path.to_string(), times);
    }

    pub fn set_cost(&mut self, cost: Duration) {
        self.cost = cost;
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.clone()
    }
}

impl BitmapDecoder for FakeDecoder {
    fn decode(&mut self, path: &Path) -> Result<(RgbImage, PixelShader), DecodeError> {
        let key = path.display().to_string();
        self.attempts.push(key.clone());
        self.time.advance(self.cost);

        if let Some(remaining) = self.failures.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DecodeError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::other("scripted failure"),
                });
            }
        }
        let (width, height) = self.size;
        Ok((RgbImage::new(width, height), PixelShader::new(ColorType::Rgb8)))
    }
}

// =========================================================================
// Display
// =========================================================================

#[derive(Debug, Default)]
struct PanelRecord {
    released: bool,
    shown: Vec<String>,
    times: Vec<Duration>,
}

/// Read side of a [`RecordingPanel`], usable after the panel moved into a surface.
#[derive(Debug, Clone, Default)]
pub struct PanelLog(Rc<RefCell<PanelRecord>>);

impl PanelLog {
    pub fn released(&self) -> bool {
        self.0.borrow().released
    }

    pub fn shown(&self) -> Vec<String> {
        self.0.borrow().shown.clone()
    }

    pub fn times(&self) -> Vec<Duration> {
        self.0.borrow().times.clone()
    }
}

pub struct RecordingPanel {
    time: SharedTime,
    log: PanelLog,
}

impl RecordingPanel {
    pub fn new(time: SharedTime) -> Self {
        Self { time, log: PanelLog::default() }
    }

    pub fn log(&self) -> PanelLog {
        self.log.clone()
    }
}

impl Panel for RecordingPanel {
    fn release(&mut self) {
        self.log.0.borrow_mut().released = true;
    }

    fn present(&mut self, visual: &Visual, _frame: &DecodedFrame) {
        let mut record = self.log.0.borrow_mut();
        record.shown.push(visual.file.to_string());
        record.times.push(self.time.now());
    }
}

// =========================================================================
// Logging
// =========================================================================

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, log::Level, String)>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((thread::current().id(), record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger { records: Mutex::new(Vec::new()) };

/// Messages the calling thread logged at `level` while `f` ran.
pub fn captured_logs(level: log::Level, f: impl FnOnce()) -> Vec<String> {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);
    });

    let me = thread::current().id();
    let start = LOGGER.records.lock().unwrap().len();
    f();
    LOGGER.records.lock().unwrap()[start..]
        .iter()
        .filter(|(id, lvl, _)| *id == me && *lvl == level)
        .map(|(_, _, message)| message.clone())
        .collect()
}

// =========================================================================
// Fixtures
// =========================================================================

/// Write a solid-colour 24-bit bitmap.
pub fn write_bmp(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(rgb))
        .save_with_format(path, ImageFormat::Bmp)
        .unwrap();
}
