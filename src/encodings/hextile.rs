use std::io::Read;

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{read_exact, read_u8, RectangleHeader};

const RAW: u8 = 1 << 0;
const BACKGROUND_SPECIFIED: u8 = 1 << 1;
const FOREGROUND_SPECIFIED: u8 = 1 << 2;
const ANY_SUBRECTS: u8 = 1 << 3;
const SUBRECTS_COLOURED: u8 = 1 << 4;

const TILE_SIZE: u16 = 16;

/// The rectangle is divided into a grid of (up to) 16x16 tiles; each tile carries its
/// own subencoding byte choosing between a raw dump and a background fill plus a list
/// of solid-colour subrectangles.
///
/// Background and foreground colours persist across tiles within one rectangle: a
/// tile that doesn't specify one reuses whatever the previous tile left behind. The
/// background fill invariant every server relies on: a tile flagged
/// `AnySubrects` with `SubrectsColoured` unset reuses `foreground`, never the tile's
/// own colour.
pub fn decode<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    let bpp = format.bytes_per_pixel();
    let mut pixel_buf = vec![0u8; bpp];

    let mut background = 0xFF00_0000u32;
    let mut foreground = 0xFF00_0000u32;

    let mut ty = 0u16;
    while ty < header.height {
        let tile_h = TILE_SIZE.min(header.height - ty);
        let mut tx = 0u16;
        while tx < header.width {
            let tile_w = TILE_SIZE.min(header.width - tx);
            let subencoding = read_u8(reader)?;

            let abs_x = header.x + tx;
            let abs_y = header.y + ty;

            if subencoding & RAW != 0 {
                let mut row_bytes = vec![0u8; tile_w as usize * bpp];
                let mut row_pixels = vec![0u32; tile_w as usize];
                for dy in 0..tile_h {
                    read_exact(reader, &mut row_bytes)?;
                    for (x, chunk) in row_bytes.chunks_exact(bpp).enumerate() {
                        row_pixels[x] = format.decode_to_bgra(chunk, palette);
                    }
                    framebuffer.write_row(abs_x, abs_y + dy, &row_pixels)?;
                }
            } else {
                if subencoding & BACKGROUND_SPECIFIED != 0 {
                    read_exact(reader, &mut pixel_buf)?;
                    background = format.decode_to_bgra(&pixel_buf, palette);
                }
                framebuffer.fill_rect(abs_x, abs_y, tile_w, tile_h, background)?;

                if subencoding & FOREGROUND_SPECIFIED != 0 {
                    read_exact(reader, &mut pixel_buf)?;
                    foreground = format.decode_to_bgra(&pixel_buf, palette);
                }

                if subencoding & ANY_SUBRECTS != 0 {
                    let count = read_u8(reader)?;
                    let coloured = subencoding & SUBRECTS_COLOURED != 0;
                    for _ in 0..count {
                        let colour = if coloured {
                            read_exact(reader, &mut pixel_buf)?;
                            format.decode_to_bgra(&pixel_buf, palette)
                        } else {
                            foreground
                        };
                        let xy = read_u8(reader)?;
                        let wh = read_u8(reader)?;
                        let sx = abs_x + (xy >> 4) as u16;
                        let sy = abs_y + (xy & 0x0f) as u16;
                        let sw = (wh >> 4) as u16 + 1;
                        let sh = (wh & 0x0f) as u16 + 1;
                        framebuffer.fill_rect(sx, sy, sw, sh, colour)?;
                    }
                }
            }

            tx += tile_w;
        }
        ty += tile_h;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encoding;
    use std::io::Cursor;

    #[test]
    fn decodes_background_only_tile() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 8,
            height: 8,
            encoding: Encoding::Hextile,
        };
        let mut bytes = Vec::new();
        bytes.push(BACKGROUND_SPECIFIED);
        bytes.extend_from_slice(&[0x00, 0x00, 0xFF, 0x00]); // red background
        let mut cursor = Cursor::new(bytes);
        let mut fb = Framebuffer::new(8, 8);
        decode(&mut cursor, &header, &format, &[], &mut fb).unwrap();
        let [b, g, r, _a] = fb.pixels()[0].to_le_bytes();
        assert_eq!((r, g, b), (255, 0, 0));
    }

    #[test]
    fn decodes_foreground_subrect_without_colour_byte() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 8,
            height: 8,
            encoding: Encoding::Hextile,
        };
        let mut bytes = Vec::new();
        bytes.push(BACKGROUND_SPECIFIED | FOREGROUND_SPECIFIED | ANY_SUBRECTS);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // background: black
        bytes.extend_from_slice(&[0xFF, 0x00, 0x00, 0x00]); // foreground: blue
        bytes.push(1); // one subrect
        bytes.push(0x00); // x=0, y=0
        bytes.push(0x00); // w=1, h=1
        let mut cursor = Cursor::new(bytes);
        let mut fb = Framebuffer::new(8, 8);
        decode(&mut cursor, &header, &format, &[], &mut fb).unwrap();
        let [b, g, r, _a] = fb.pixels()[0].to_le_bytes();
        assert_eq!((r, g, b), (0, 0, 255));
    }
}
