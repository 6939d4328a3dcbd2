//! Rasterization of SVG text into RGBA bitmaps.

use resvg::{tiny_skia, usvg};

use crate::error::RasterError;

/// Non-premultiplied RGBA pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaBitmap {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidSize { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RasterError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGBA of the pixel at (x, y), if inside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Draws SVG text onto a bitmap of the requested size.
///
/// The drawing is stretched to fill the target, like drawing an image onto a
/// canvas of a different size.
pub trait Rasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<RgbaBitmap, RasterError>;
}

/// [`Rasterizer`] backed by `resvg`.
#[derive(Default)]
pub struct ResvgRasterizer {
    options: usvg::Options<'static>,
}

impl ResvgRasterizer {
    pub fn new(options: usvg::Options<'static>) -> Self {
        Self { options }
    }

    /// Load the host's fonts so `<text>` elements render.
    pub fn with_system_fonts(mut self) -> Self {
        self.options.fontdb_mut().load_system_fonts();
        self
    }

    /// The document's own size in whole pixels.
    pub fn natural_size(&self, svg: &str) -> Result<(u32, u32), RasterError> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        let size = tree.size().to_int_size();
        Ok((size.width(), size.height()))
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &str, width: u32, height: u32) -> Result<RgbaBitmap, RasterError> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(RasterError::InvalidSize { width, height })?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }

        log::debug!("rasterized {}x{} -> {}x{}", size.width(), size.height(), width, height);
        RgbaBitmap::new(width, height, data)
    }
}
