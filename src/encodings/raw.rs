use std::io::Read;

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{read_exact, RectangleHeader};

/// Reads `width * height` pixels in `format`, row by row, with no compression at all:
/// the simplest and most bandwidth-hungry encoding, but the one every server must
/// support as a fallback.
pub fn decode<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    let bpp = format.bytes_per_pixel();
    let mut row_bytes = vec![0u8; header.width as usize * bpp];
    let mut row_pixels = vec![0u32; header.width as usize];

    for dy in 0..header.height {
        read_exact(reader, &mut row_bytes)?;
        for (x, chunk) in row_bytes.chunks_exact(bpp).enumerate() {
            row_pixels[x] = format.decode_to_bgra(chunk, palette);
        }
        framebuffer.write_row(header.x, header.y + dy, &row_pixels)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encoding;
    use std::io::Cursor;

    #[test]
    fn decodes_a_solid_rectangle() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
            encoding: Encoding::Raw,
        };
        // Four BGRA pixels, all pure red.
        let mut bytes = Vec::new();
        for _ in 0..4 {
            bytes.extend_from_slice(&[0x00, 0x00, 0xFF, 0x00]);
        }
        let mut cursor = Cursor::new(bytes);
        let mut fb = Framebuffer::new(2, 2);
        decode(&mut cursor, &header, &format, &[], &mut fb).unwrap();
        for &pixel in fb.pixels() {
            let [b, g, r, _a] = pixel.to_le_bytes();
            assert_eq!((r, g, b), (255, 0, 0));
        }
    }

    #[test]
    fn short_read_is_an_error() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
            encoding: Encoding::Raw,
        };
        let mut cursor = Cursor::new(vec![0u8; 4]);
        let mut fb = Framebuffer::new(4, 4);
        assert!(decode(&mut cursor, &header, &format, &[], &mut fb).is_err());
    }
}
