//! The double-buffered slideshow loop.
//!
//! Each [`Slideshow::step`] decodes the image after the one on screen, waits
//! out the dwell of the current image, then swaps. Decoding first hides its
//! latency inside the dwell, so the swap itself is immediate. A failed decode
//! leaves the screen alone and the same image is tried again next step.
//!
//! At most two frames are alive: `current` and, between a successful decode
//! and the swap, `next`.

use std::time::Duration;

use thiserror::Error;

use crate::bus::{Bus, DisplayPins, Pin};
use crate::catalog::{CatalogError, ImageCatalog};
use crate::clock::Clock;
use crate::constants::*;
use crate::display::{DisplaySurface, Panel};
use crate::frame::{BitmapDecoder, DecodeError, DecodedFrame, FrameCache};
use crate::state::Step;
use crate::storage::{Storage, StorageError};

/// Startup failures. None of them can clear without someone fixing the card.
#[derive(Error, Debug)]
pub enum Halt {
    #[error("failed to mount card: {0}")]
    Mount(#[source] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to show first image: {0}")]
    FirstFrame(#[source] DecodeError),
}

#[derive(Debug, Clone, Copy)]
pub struct SlideshowConfig {
    pub interval: Duration,
    pub card_select: Pin,
    pub display_pins: DisplayPins,
    pub width: u32,
    pub height: u32,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            interval: DISPLAY_INTERVAL,
            card_select: CARD_SELECT,
            display_pins: DISPLAY_PINS,
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
        }
    }
}

pub struct Slideshow<D, P, C> {
    catalog: ImageCatalog,
    cache: FrameCache<D>,
    display: DisplaySurface<P>,
    clock: C,
    interval: Duration,

    current_index: usize,
    current: DecodedFrame,
    failed_attempts: u32, // Consecutive failures for the pending index
}

impl<D: BitmapDecoder, P: Panel, C: Clock> Slideshow<D, P, C> {
    /// Mount, catalogue, bring up the display and show the first image.
    ///
    /// The display is only initialised once there is something to show, so a
    /// halted device leaves the panel dark.
    pub fn boot<S: Storage + ?Sized>(
        storage: &mut S,
        bus: &Bus,
        decoder: D,
        panel: P,
        clock: C,
        config: &SlideshowConfig,
    ) -> Result<Self, Halt> {
        let root = storage.mount(bus, config.card_select).map_err(Halt::Mount)?;
        let catalog = ImageCatalog::build(&*storage, &root)?;
        log::info!("found {} bitmap(s) in {}", catalog.len(), root.path().display());

        let display = DisplaySurface::init(
            bus,
            config.display_pins,
            config.width,
            config.height,
            panel,
        );
        Self::start(catalog, FrameCache::new(decoder), display, clock, config.interval)
    }

    pub fn start(
        catalog: ImageCatalog,
        mut cache: FrameCache<D>,
        mut display: DisplaySurface<P>,
        clock: C,
        interval: Duration,
    ) -> Result<Self, Halt> {
        let current = cache.load(catalog.get(0)).map_err(Halt::FirstFrame)?;
        display.swap(&current);
        log::info!("showing {} (1/{})", current.file(), catalog.len());

        Ok(Self {
            catalog,
            cache,
            display,
            clock,
            interval,
            current_index: 0,
            current,
            failed_attempts: 0,
        })
    }

    pub fn step(&mut self) -> Step {
        let next_index = self.catalog.next_index(self.current_index);
        let file = self.catalog.get(next_index);

        let next = match self.cache.load(file) {
            Ok(frame) => frame,
            Err(e) => {
                self.failed_attempts = self.failed_attempts.saturating_add(1);
                log::warn!(
                    "failed to cache {}: {} (attempt {})",
                    file,
                    e,
                    self.failed_attempts
                );
                return Step::DecodeFailed {
                    index: next_index,
                    attempts: self.failed_attempts,
                };
            }
        };
        self.failed_attempts = 0;

        self.clock.sleep(self.interval);

        self.display.swap(&next);
        let previous = std::mem::replace(&mut self.current, next);
        drop(previous);

        let from = std::mem::replace(&mut self.current_index, next_index);
        log::info!(
            "showing {} ({}/{})",
            self.current.file(),
            next_index + 1,
            self.catalog.len()
        );
        Step::Swapped { from, to: next_index }
    }

    /// Steps until `keep_going` says stop, pausing `retry_pause` after each
    /// failed pre-cache.
    pub fn run_while(&mut self, mut keep_going: impl FnMut() -> bool, retry_pause: Duration) {
        while keep_going() {
            if let Step::DecodeFailed { .. } = self.step() {
                self.clock.sleep(retry_pause);
            }
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &DecodedFrame {
        &self.current
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &FrameCache<D> {
        &self.cache
    }

    pub fn display(&self) -> &DisplaySurface<P> {
        &self.display
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
