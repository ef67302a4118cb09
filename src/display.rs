//! The round display and the group of visuals attached to it.

use crate::bus::{Bus, DisplayPins};
use crate::catalog::ImageFile;
use crate::frame::DecodedFrame;

/// Where a frame sits on the panel. Offsets centre the bitmap and go
/// negative when it is larger than the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visual {
    pub file: ImageFile,
    pub x: i32,
    pub y: i32,
}

impl Visual {
    pub fn centred(frame: &DecodedFrame, width: u32, height: u32) -> Self {
        Self {
            file: frame.file().clone(),
            x: (width as i32 - frame.width() as i32) / 2,
            y: (height as i32 - frame.height() as i32) / 2,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Group {
    visuals: Vec<Visual>,
}

impl Group {
    pub fn append(&mut self, visual: Visual) {
        self.visuals.push(visual);
    }

    /// Detaches `visual`; false if it was not attached.
    pub fn remove(&mut self, visual: &Visual) -> bool {
        match self.visuals.iter().position(|v| v == visual) {
            Some(index) => {
                self.visuals.remove(index);
                true
            }
            None => false,
        }
    }

    /// Detaches everything.
    pub fn clear(&mut self) {
        self.visuals.clear();
    }

    pub fn visuals(&self) -> &[Visual] {
        &self.visuals
    }
}

pub trait Panel {
    /// Drops whatever a previous owner left on screen.
    fn release(&mut self) {}

    fn present(&mut self, visual: &Visual, frame: &DecodedFrame);
}

/// Panel that only reports what it would show.
#[derive(Debug, Default)]
pub struct LogPanel {
    presented: usize,
}

impl LogPanel {
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Panel for LogPanel {
    fn present(&mut self, visual: &Visual, frame: &DecodedFrame) {
        self.presented += 1;
        log::debug!(
            "showing {} ({}x{} at {},{})",
            visual.file,
            frame.width(),
            frame.height(),
            visual.x,
            visual.y
        );
    }
}

pub struct DisplaySurface<P> {
    panel: P,
    root: Group,
    width: u32,
    height: u32,
}

impl<P: Panel> DisplaySurface<P> {
    pub fn init(bus: &Bus, pins: DisplayPins, width: u32, height: u32, mut panel: P) -> Self {
        panel.release();
        log::info!(
            "display {}x{} on clock {}: cs {} dc {} rst {} backlight {}",
            width,
            height,
            bus.pins().clock,
            pins.chip_select,
            pins.command,
            pins.reset,
            pins.backlight
        );
        Self {
            panel,
            root: Group::default(),
            width,
            height,
        }
    }

    /// Replaces whatever is attached with `frame`.
    pub fn swap(&mut self, frame: &DecodedFrame) {
        let visual = Visual::centred(frame, self.width, self.height);
        self.root.clear();
        self.root.append(visual.clone());
        self.panel.present(&visual, frame);
    }

    /// The visual currently attached, if any.
    pub fn shown(&self) -> Option<&Visual> {
        self.root.visuals().last()
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }
}
