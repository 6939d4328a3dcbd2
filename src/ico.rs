//! Single-image ICO container encoding.
//!
//! Layout of the produced file:
//!
//! ```text
//! ICONDIR            6 bytes
//! ICONDIRENTRY      16 bytes
//! BITMAPINFOHEADER  40 bytes   height field is twice the icon height
//! XOR bitmap        w*h*4      BGRA, bottom row first
//! AND mask          ceil(w/8)*h, all zero (alpha carries transparency)
//! ```

use crate::error::EncodeError;
use crate::raster::RgbaBitmap;

const ICONDIR_LEN: usize = 6;
const ICONDIRENTRY_LEN: usize = 16;
const BITMAPINFOHEADER_LEN: usize = 40;

/// Offset of the DIB block in a single-image file.
const IMAGE_OFFSET: usize = ICONDIR_LEN + ICONDIRENTRY_LEN;

/// Icon sizes the exporter supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcoSize {
    S16,
    S32,
    S48,
    S64,
    S128,
    S256,
}

impl IcoSize {
    pub const ALL: [IcoSize; 6] = [
        IcoSize::S16,
        IcoSize::S32,
        IcoSize::S48,
        IcoSize::S64,
        IcoSize::S128,
        IcoSize::S256,
    ];

    /// Edge length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            IcoSize::S16 => 16,
            IcoSize::S32 => 32,
            IcoSize::S48 => 48,
            IcoSize::S64 => 64,
            IcoSize::S128 => 128,
            IcoSize::S256 => 256,
        }
    }

    /// The one-byte directory form, where 0 stands for 256.
    fn dir_byte(self) -> u8 {
        match self.pixels() {
            256 => 0,
            n => n as u8,
        }
    }
}

impl TryFrom<u32> for IcoSize {
    type Error = EncodeError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        IcoSize::ALL
            .into_iter()
            .find(|s| s.pixels() == pixels)
            .ok_or(EncodeError::UnsupportedSize(pixels))
    }
}

/// A square RGBA bitmap ready to become an icon.
#[derive(Debug, Clone)]
pub struct IcoImage {
    size: IcoSize,
    rgba: Vec<u8>,
}

impl IcoImage {
    /// Wrap row-major, top-to-bottom, non-premultiplied RGBA pixels.
    pub fn new(size: IcoSize, rgba: Vec<u8>) -> Result<Self, EncodeError> {
        let n = size.pixels() as usize;
        let expected = n * n * 4;
        if rgba.len() != expected {
            return Err(EncodeError::PixelCount {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self { size, rgba })
    }

    pub fn from_bitmap(bitmap: &RgbaBitmap) -> Result<Self, EncodeError> {
        if bitmap.width() != bitmap.height() {
            return Err(EncodeError::NotSquare {
                width: bitmap.width(),
                height: bitmap.height(),
            });
        }
        let size = IcoSize::try_from(bitmap.width())?;
        Self::new(size, bitmap.data().to_vec())
    }

    pub fn size(&self) -> IcoSize {
        self.size
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Total file length for an icon of the given size.
pub fn encoded_len(size: IcoSize) -> usize {
    IMAGE_OFFSET + dib_len(size)
}

fn pixel_bytes(size: IcoSize) -> usize {
    let n = size.pixels() as usize;
    n * n * 4
}

fn mask_bytes(size: IcoSize) -> usize {
    let n = size.pixels() as usize;
    n.div_ceil(8) * n
}

fn dib_len(size: IcoSize) -> usize {
    BITMAPINFOHEADER_LEN + pixel_bytes(size) + mask_bytes(size)
}

/// Encode one image as a complete `.ico` file.
pub fn encode_ico(image: &IcoImage) -> Vec<u8> {
    IcoFile::from_image(image).to_bytes()
}

/// ICONDIR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDir {
    pub reserved: u16,
    pub resource_type: u16,
    pub count: u16,
}

impl IconDir {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.reserved.to_le_bytes());
        out.extend_from_slice(&self.resource_type.to_le_bytes());
        out.extend_from_slice(&self.count.to_le_bytes());
    }
}

/// ICONDIRENTRY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDirEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub bytes_in_res: u32,
    pub image_offset: u32,
}

impl IconDirEntry {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.width);
        out.push(self.height);
        out.push(self.color_count);
        out.push(self.reserved);
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out.extend_from_slice(&self.bytes_in_res.to_le_bytes());
        out.extend_from_slice(&self.image_offset.to_le_bytes());
    }
}

/// BITMAPINFOHEADER
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapInfoHeader {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: u32,
    pub clr_important: u32,
}

impl BitmapInfoHeader {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.planes.to_le_bytes());
        out.extend_from_slice(&self.bit_count.to_le_bytes());
        out.extend_from_slice(&self.compression.to_le_bytes());
        out.extend_from_slice(&self.size_image.to_le_bytes());
        out.extend_from_slice(&self.x_pels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.y_pels_per_meter.to_le_bytes());
        out.extend_from_slice(&self.clr_used.to_le_bytes());
        out.extend_from_slice(&self.clr_important.to_le_bytes());
    }
}

/// A fully laid out single-image icon file.
#[derive(Debug, Clone)]
pub struct IcoFile {
    pub dir: IconDir,
    pub entry: IconDirEntry,
    pub header: BitmapInfoHeader,
    /// BGRA pixels, bottom row first
    pub pixels: Vec<u8>,
    pub and_mask: Vec<u8>,
}

impl IcoFile {
    pub fn from_image(image: &IcoImage) -> Self {
        let size = image.size();
        let n = size.pixels() as usize;

        let dir = IconDir {
            reserved: 0,
            resource_type: 1,
            count: 1,
        };

        let entry = IconDirEntry {
            width: size.dir_byte(),
            height: size.dir_byte(),
            color_count: 0,
            reserved: 0,
            planes: 1,
            bit_count: 32,
            bytes_in_res: dib_len(size) as u32,
            image_offset: IMAGE_OFFSET as u32,
        };

        let header = BitmapInfoHeader {
            size: BITMAPINFOHEADER_LEN as u32,
            width: n as i32,
            height: (n * 2) as i32,
            planes: 1,
            bit_count: 32,
            compression: 0,
            size_image: pixel_bytes(size) as u32,
            x_pels_per_meter: 0,
            y_pels_per_meter: 0,
            clr_used: 0,
            clr_important: 0,
        };

        let mut pixels = Vec::with_capacity(pixel_bytes(size));
        for row in image.rgba().chunks_exact(n * 4).rev() {
            for px in row.chunks_exact(4) {
                pixels.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }

        Self {
            dir,
            entry,
            header,
            pixels,
            and_mask: vec![0; mask_bytes(size)],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            IMAGE_OFFSET + BITMAPINFOHEADER_LEN + self.pixels.len() + self.and_mask.len(),
        );
        self.dir.write_to(&mut out);
        self.entry.write_to(&mut out);
        debug_assert_eq!(out.len(), self.entry.image_offset as usize);
        self.header.write_to(&mut out);
        out.extend_from_slice(&self.pixels);
        out.extend_from_slice(&self.and_mask);
        debug_assert_eq!(
            out.len(),
            self.entry.image_offset as usize + self.entry.bytes_in_res as usize
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn solid(size: IcoSize, rgba: [u8; 4]) -> IcoImage {
        let n = size.pixels() as usize;
        IcoImage::new(size, rgba.repeat(n * n)).unwrap()
    }

    #[test]
    fn test_encode_16() {
        let bytes = encode_ico(&solid(IcoSize::S16, [255, 0, 0, 255]));
        assert_eq!(bytes.len(), 1118);
        assert_eq!(&bytes[0..6], &[0, 0, 1, 0, 1, 0]);
        assert_eq!(bytes[6], 16);
        assert_eq!(bytes[7], 16);
        assert_eq!(u16_at(&bytes, 10), 1);
        assert_eq!(u16_at(&bytes, 12), 32);
        assert_eq!(u32_at(&bytes, 14), 1118 - 22);
        assert_eq!(u32_at(&bytes, 18), 22);
    }

    #[test]
    fn test_header_fields_every_size() {
        for size in IcoSize::ALL {
            let n = size.pixels() as usize;
            let bytes = encode_ico(&solid(size, [1, 2, 3, 4]));
            assert_eq!(bytes.len(), 22 + 40 + n * n * 4 + n.div_ceil(8) * n);
            assert_eq!(bytes.len(), encoded_len(size));

            let dir_byte = if n == 256 { 0 } else { n as u8 };
            assert_eq!(bytes[6], dir_byte);
            assert_eq!(bytes[7], dir_byte);
            assert_eq!(bytes[8], 0);
            assert_eq!(bytes[9], 0);

            assert_eq!(u32_at(&bytes, 22), 40);
            assert_eq!(u32_at(&bytes, 26), n as u32);
            assert_eq!(u32_at(&bytes, 30), 2 * n as u32);
            assert_eq!(u16_at(&bytes, 34), 1);
            assert_eq!(u16_at(&bytes, 36), 32);
            assert_eq!(u32_at(&bytes, 38), 0);
            assert_eq!(u32_at(&bytes, 42), (n * n * 4) as u32);
            assert!(bytes[46..62].iter().all(|&b| b == 0));

            let pixels = &bytes[62..62 + n * n * 4];
            assert!(pixels.chunks_exact(4).all(|px| px == [3, 2, 1, 4]));
            assert!(bytes[62 + n * n * 4..].iter().all(|&b| b == 0));
        }
    }

    #[test]
    fn test_rows_are_bottom_up_bgra() {
        // Top row red, everything else blue.
        let n = 16;
        let mut rgba = [0, 0, 255, 255].repeat(n * n);
        rgba[..n * 4].copy_from_slice(&[255, 0, 0, 128].repeat(n));
        let bytes = encode_ico(&IcoImage::new(IcoSize::S16, rgba).unwrap());

        let pixels = &bytes[62..62 + n * n * 4];
        let last_row = &pixels[(n - 1) * n * 4..];
        assert_eq!(&last_row[..4], &[0, 0, 255, 128]);
        assert_eq!(&pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_size_validation() {
        assert_eq!(IcoSize::try_from(48).unwrap(), IcoSize::S48);
        assert!(matches!(
            IcoSize::try_from(100),
            Err(EncodeError::UnsupportedSize(100))
        ));
        assert!(matches!(
            IcoImage::new(IcoSize::S16, vec![0; 10]),
            Err(EncodeError::PixelCount { expected: 1024, actual: 10 })
        ));
    }

    #[test]
    fn test_from_bitmap() {
        let bitmap = RgbaBitmap::new(32, 32, vec![0; 32 * 32 * 4]).unwrap();
        assert_eq!(IcoImage::from_bitmap(&bitmap).unwrap().size(), IcoSize::S32);

        let wide = RgbaBitmap::new(32, 16, vec![0; 32 * 16 * 4]).unwrap();
        assert!(matches!(
            IcoImage::from_bitmap(&wide),
            Err(EncodeError::NotSquare { width: 32, height: 16 })
        ));

        let odd = RgbaBitmap::new(20, 20, vec![0; 20 * 20 * 4]).unwrap();
        assert!(matches!(
            IcoImage::from_bitmap(&odd),
            Err(EncodeError::UnsupportedSize(20))
        ));
    }
}
