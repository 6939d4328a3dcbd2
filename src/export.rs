//! Raster export: PNG, JPEG, WebP and ICO.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{EncodeError, ExportError};
use crate::ico::{IcoImage, IcoSize, encode_ico};
use crate::raster::{Rasterizer, RgbaBitmap};

/// Output file formats of the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Ico,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
            ExportFormat::Ico => "ico",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            "ico" => Ok(ExportFormat::Ico),
            other => Err(format!("unknown format '{}', expected png, jpeg, webp or ico", other)),
        }
    }
}

/// Download name for a converted file.
pub fn default_file_name(format: ExportFormat) -> String {
    format!("converted.{}", format.extension())
}

/// Rasterize `svg` at `width`x`height` and encode it as `format`.
///
/// ICO output needs a square size from the supported icon sizes; that is
/// checked before anything is rendered.
pub fn export(
    rasterizer: &impl Rasterizer,
    svg: &str,
    format: ExportFormat,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ExportError> {
    if format == ExportFormat::Ico {
        if width != height {
            return Err(EncodeError::NotSquare { width, height }.into());
        }
        IcoSize::try_from(width)?;
    }

    let bitmap = rasterizer.rasterize(svg, width, height)?;
    Ok(encode_bitmap(bitmap, format)?)
}

/// Encode an already rasterized bitmap.
pub fn encode_bitmap(bitmap: RgbaBitmap, format: ExportFormat) -> Result<Vec<u8>, EncodeError> {
    let image_format = match format {
        ExportFormat::Ico => return Ok(encode_ico(&IcoImage::from_bitmap(&bitmap)?)),
        ExportFormat::Png => ImageFormat::Png,
        ExportFormat::Jpeg => ImageFormat::Jpeg,
        ExportFormat::Webp => ImageFormat::WebP,
    };

    let (width, height) = (bitmap.width(), bitmap.height());
    let actual = bitmap.data().len();
    let rgba = RgbaImage::from_raw(width, height, bitmap.into_data()).ok_or(
        EncodeError::PixelCount {
            expected: width as usize * height as usize * 4,
            actual,
        },
    )?;

    let mut out = Cursor::new(Vec::new());
    match format {
        // No alpha channel in JPEG.
        ExportFormat::Jpeg => DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .write_to(&mut out, image_format)?,
        _ => rgba.write_to(&mut out, image_format)?,
    }
    Ok(out.into_inner())
}
