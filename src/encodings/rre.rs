use std::io::Read;

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{read_u16, read_u32, RectangleHeader};

/// Rise-and-Run-length Encoding: a background colour filling the whole rectangle,
/// then a list of solid-colour subrectangles painted on top.
pub fn decode<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    let subrect_count = read_u32(reader)?;

    let bpp = format.bytes_per_pixel();
    let mut pixel_buf = vec![0u8; bpp];
    crate::protocol::read_exact(reader, &mut pixel_buf)?;
    let background = format.decode_to_bgra(&pixel_buf, palette);
    framebuffer.fill_rect(header.x, header.y, header.width, header.height, background)?;

    for _ in 0..subrect_count {
        crate::protocol::read_exact(reader, &mut pixel_buf)?;
        let colour = format.decode_to_bgra(&pixel_buf, palette);
        let x = read_u16(reader)?;
        let y = read_u16(reader)?;
        let width = read_u16(reader)?;
        let height = read_u16(reader)?;
        framebuffer.fill_rect(header.x + x, header.y + y, width, height, colour)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encoding;
    use std::io::Cursor;

    #[test]
    fn paints_background_then_one_subrectangle() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 4,
            height: 4,
            encoding: Encoding::Rre,
        };
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_be_bytes()); // subrect count
        bytes.extend_from_slice(&[0x00, 0x00, 0xFF, 0x00]); // background: red
        bytes.extend_from_slice(&[0xFF, 0x00, 0x00, 0x00]); // subrect colour: blue
        bytes.extend_from_slice(&1u16.to_be_bytes()); // x
        bytes.extend_from_slice(&1u16.to_be_bytes()); // y
        bytes.extend_from_slice(&2u16.to_be_bytes()); // width
        bytes.extend_from_slice(&2u16.to_be_bytes()); // height

        let mut cursor = Cursor::new(bytes);
        let mut fb = Framebuffer::new(4, 4);
        decode(&mut cursor, &header, &format, &[], &mut fb).unwrap();

        let [b, g, r, _a] = fb.pixels()[0].to_le_bytes();
        assert_eq!((r, g, b), (255, 0, 0));
        let [b, g, r, _a] = fb.pixels()[1 * 4 + 1].to_le_bytes();
        assert_eq!((r, g, b), (0, 0, 255));
    }
}
