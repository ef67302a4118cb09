//! Decoding bitmaps into frames the display can show.
//!
//! A [`DecodedFrame`] owns its pixel buffer. The [`FrameCache`] that produced it
//! keeps a count of frames still alive, so the slideshow's two-frame bound
//! (one shown, one pre-staged) can be observed from outside.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{ColorType, ImageFormat, ImageReader, Rgb, RgbImage};
use thiserror::Error;

use crate::catalog::ImageFile;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Maps source pixels to the panel's 16-bit RGB565.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelShader {
    source: ColorType,
}

impl PixelShader {
    pub fn new(source: ColorType) -> Self {
        Self { source }
    }

    /// Color layout of the file before decoding.
    pub fn source(&self) -> ColorType {
        self.source
    }

    pub fn shade(&self, pixel: Rgb<u8>) -> u16 {
        let [r, g, b] = pixel.0;
        ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
    }

    /// Widens an RGB565 value back to 8 bits per channel, replicating high bits.
    pub fn expand(value: u16) -> [u8; 3] {
        let r = ((value >> 11) & 0x1F) as u8;
        let g = ((value >> 5) & 0x3F) as u8;
        let b = (value & 0x1F) as u8;
        [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
    }
}

pub trait BitmapDecoder {
    fn decode(&mut self, path: &Path) -> Result<(RgbImage, PixelShader), DecodeError>;
}

/// Reads `.bmp` files with the `image` crate, whatever their extension case.
#[derive(Debug, Default, Clone, Copy)]
pub struct BmpDecoder;

impl BitmapDecoder for BmpDecoder {
    fn decode(&mut self, path: &Path) -> Result<(RgbImage, PixelShader), DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = ImageReader::with_format(BufReader::new(file), ImageFormat::Bmp)
            .decode()
            .map_err(|source| DecodeError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        let shader = PixelShader::new(image.color());
        Ok((image.into_rgb8(), shader))
    }
}

pub struct DecodedFrame {
    file: ImageFile,
    bitmap: RgbImage,
    shader: PixelShader,
    live: Rc<Cell<usize>>,
}

impl DecodedFrame {
    pub fn file(&self) -> &ImageFile {
        &self.file
    }

    pub fn bitmap(&self) -> &RgbImage {
        &self.bitmap
    }

    pub fn shader(&self) -> PixelShader {
        self.shader
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Shaded RGB565 value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> u16 {
        self.shader.shade(*self.bitmap.get_pixel(x, y))
    }
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("file", &self.file)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("shader", &self.shader)
            .finish()
    }
}

impl Drop for DecodedFrame {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
        log::trace!("released {} ({} frame(s) live)", self.file, self.live.get());
    }
}

pub struct FrameCache<D> {
    decoder: D,
    live: Rc<Cell<usize>>,
    peak: usize,
}

impl<D: BitmapDecoder> FrameCache<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            live: Rc::new(Cell::new(0)),
            peak: 0,
        }
    }

    pub fn load(&mut self, file: &ImageFile) -> Result<DecodedFrame, DecodeError> {
        let (bitmap, shader) = self.decoder.decode(file.path())?;

        let live = self.live.get() + 1;
        self.live.set(live);
        self.peak = self.peak.max(live);
        log::debug!(
            "decoded {} ({}x{}, {:?}), {} frame(s) live",
            file,
            bitmap.width(),
            bitmap.height(),
            shader.source(),
            live
        );

        Ok(DecodedFrame {
            file: file.clone(),
            bitmap,
            shader,
            live: Rc::clone(&self.live),
        })
    }

    /// Frames handed out and not yet dropped.
    pub fn live_frames(&self) -> usize {
        self.live.get()
    }

    /// Highest [`live_frames`](Self::live_frames) ever reached.
    pub fn peak_frames(&self) -> usize {
        self.peak
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}
