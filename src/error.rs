use thiserror::Error;

/// The input is not well-formed markup.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid SVG: {0}")]
    InvalidSvg(String),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// The renderer could not produce a bitmap.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("SVG rendering error: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("Invalid target size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Expected {expected} bytes of RGBA data, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

/// A bitmap could not be turned into an output file.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Unsupported icon size {0}, expected one of 16, 32, 48, 64, 128, 256")]
    UnsupportedSize(u32),

    #[error("Icon bitmaps must be square, got {width}x{height}")]
    NotSquare { width: u32, height: u32 },

    #[error("Expected {expected} bytes of RGBA data, got {actual}")]
    PixelCount { expected: usize, actual: usize },

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Conversion failed at either the rendering or the encoding step.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Conversion failed: {0}")]
    Raster(#[from] RasterError),

    #[error("Conversion failed: {0}")]
    Encode(#[from] EncodeError),
}
