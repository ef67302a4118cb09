//! Picture frame for a 240×240 round display.
//!
//! Bitmaps are read from a storage card, sorted once at startup, and shown in
//! a loop. While one image is on screen the next is already decoded, so the
//! swap at the end of each dwell is immediate.
//!
//! Hardware sits behind small traits: [`storage::Storage`] for the card,
//! [`frame::BitmapDecoder`] for decoding, [`display::Panel`] for the panel and
//! [`clock::Clock`] for waiting. The binary plugs in a host directory, the
//! `image` crate and, with the `simulator` feature, a raylib window.

pub mod bus;
pub mod catalog;
pub mod clock;
pub mod constants;
pub mod display;
pub mod frame;
#[cfg(feature = "simulator")]
pub mod simulator;
pub mod slideshow;
pub mod state;
pub mod storage;

pub use slideshow::{Halt, Slideshow, SlideshowConfig};
pub use state::Step;

#[cfg(test)]
pub(crate) mod test_helpers;
