//! A raylib window standing in for the round panel.
//!
//! Frames are pushed through the panel's RGB565 shader before upload, and the
//! corners the round glass cannot show are painted black. The window is
//! shared between [`SimulatorPanel`] and [`SimulatorClock`]: the clock keeps
//! redrawing while the slideshow dwells so the window stays responsive.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use raylib::prelude::*;

use crate::clock::Clock;
use crate::constants::FPS;
use crate::display::{Panel, Visual};
use crate::frame::{DecodedFrame, PixelShader};

// Fields drop in order: the texture must go before the handle closes the window
pub struct Window {
    texture: Option<Texture2D>,
    rl: RaylibHandle,
    thread: RaylibThread,
    offset: Vector2,
    width: u32,
    scale: f32,
    closed: bool,
}

pub type SharedWindow = Rc<RefCell<Window>>;

impl Window {
    pub fn open(width: u32, height: u32, scale: i32) -> SharedWindow {
        let (mut rl, thread) = raylib::init()
            .size(width as i32 * scale, height as i32 * scale)
            .title("Round Frame")
            .vsync()
            .build();
        rl.set_target_fps(FPS);
        rl.set_trace_log(TraceLogLevel::LOG_ERROR);

        Rc::new(RefCell::new(Self {
            texture: None,
            rl,
            thread,
            offset: Vector2::new(0.0, 0.0),
            width,
            scale: scale as f32,
            closed: false,
        }))
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    fn release(&mut self) {
        self.texture = None;
    }

    fn upload(&mut self, visual: &Visual, frame: &DecodedFrame) {
        let mut image = Image::gen_image_color(frame.width() as i32, frame.height() as i32, Color::BLACK);
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let [r, g, b] = PixelShader::expand(frame.pixel(x, y));
                image.draw_pixel(x as i32, y as i32, Color::new(r, g, b, 255));
            }
        }

        match self.rl.load_texture_from_image(&self.thread, &image) {
            Ok(texture) => {
                // Replacing the old texture unloads it
                self.texture = Some(texture);
                self.offset = Vector2::new(visual.x as f32, visual.y as f32);
            }
            Err(e) => log::error!("panel upload failed for {}: {}", visual.file, e),
        }
    }

    /// Draws one frame; returns false once the window was asked to close.
    pub fn redraw(&mut self) -> bool {
        if self.rl.window_should_close() {
            self.closed = true;
            return false;
        }

        let radius = self.width as f32 * self.scale / 2.0;
        let position = Vector2::new(self.offset.x * self.scale, self.offset.y * self.scale);
        let mut d = self.rl.begin_drawing(&self.thread);
        d.clear_background(Color::BLACK);
        if let Some(texture) = &self.texture {
            d.draw_texture_ex(texture, position, 0.0, self.scale, Color::WHITE);
        }
        // Round glass: mask everything outside the inscribed circle
        d.draw_ring(
            Vector2::new(radius, radius),
            radius,
            radius * 1.5,
            0.0,
            360.0,
            128,
            Color::BLACK,
        );
        true
    }

    /// Keeps the window dark until it is closed, naming the fault in the title bar.
    pub fn idle_until_closed(&mut self, fault: &dyn std::fmt::Display) {
        self.release();
        self.rl
            .set_window_title(&self.thread, &format!("Round Frame (halted: {fault})"));
        while self.redraw() {}
    }
}

pub struct SimulatorPanel {
    window: SharedWindow,
}

impl SimulatorPanel {
    pub fn new(window: SharedWindow) -> Self {
        Self { window }
    }
}

impl Panel for SimulatorPanel {
    fn release(&mut self) {
        self.window.borrow_mut().release();
    }

    fn present(&mut self, visual: &Visual, frame: &DecodedFrame) {
        let mut window = self.window.borrow_mut();
        window.upload(visual, frame);
        window.redraw();
    }
}

/// Wall-clock time; sleeping redraws the window at [`FPS`] until the
/// duration passes or the window closes.
pub struct SimulatorClock {
    window: SharedWindow,
    origin: Instant,
}

impl SimulatorClock {
    pub fn new(window: SharedWindow) -> Self {
        Self {
            window,
            origin: Instant::now(),
        }
    }
}

impl Clock for SimulatorClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        let mut window = self.window.borrow_mut();
        while Instant::now() < deadline {
            if !window.redraw() {
                break;
            }
        }
    }
}
