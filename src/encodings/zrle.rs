use std::io::Read;

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{read_exact, read_u32, read_u8, RectangleHeader};
use crate::zlib_stream::ZlibStream;

const TILE_SIZE: u16 = 64;

/// Reads one CPIXEL (the compact 3-byte form when the pixel format allows it,
/// otherwise a full pixel) and decodes it through `format`/`palette` into BGRA.
fn read_cpixel<R: Read>(
    reader: &mut R,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
) -> Result<u32> {
    let bytes_per_cpixel = format.bytes_per_cpixel();
    let mut buf = [0u8; 4];
    if bytes_per_cpixel == 3 && format.big_endian {
        // The omitted byte is always the most significant one; for a big-endian
        // sample that's buf[0], so the three wire bytes land in buf[1..4].
        read_exact(reader, &mut buf[1..4])?;
    } else {
        read_exact(reader, &mut buf[..bytes_per_cpixel])?;
    }
    Ok(format.decode_to_bgra(&buf, palette))
}

/// `run-length := 1; repeat { b := read_u8(); run-length += b } until b != 255`, the
/// ZRLE convention for encoding arbitrarily long run lengths in full bytes.
fn read_run_length<R: Read>(reader: &mut R) -> Result<usize> {
    let mut length = 1usize;
    loop {
        let b = read_u8(reader)?;
        length += b as usize;
        if b != 255 {
            break;
        }
    }
    Ok(length)
}

fn packed_bits_per_index(palette_size: usize) -> u32 {
    match palette_size {
        2 => 1,
        3..=4 => 2,
        5..=16 => 4,
        _ => 8,
    }
}

fn decode_tile<R: Read>(
    reader: &mut R,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
    tile_w: u16,
    tile_h: u16,
    out: &mut Vec<u32>,
) -> Result<()> {
    out.clear();
    let subencoding = read_u8(reader)?;

    match subencoding {
        0 => {
            // Raw: one CPIXEL per pixel, row-major.
            for _ in 0..(tile_w as usize * tile_h as usize) {
                out.push(read_cpixel(reader, format, palette)?);
            }
        }
        1 => {
            // Solid color: a single CPIXEL fills the whole tile.
            let colour = read_cpixel(reader, format, palette)?;
            out.resize(tile_w as usize * tile_h as usize, colour);
        }
        2..=16 => {
            let palette_size = subencoding as usize;
            let mut tile_palette = Vec::with_capacity(palette_size);
            for _ in 0..palette_size {
                tile_palette.push(read_cpixel(reader, format, palette)?);
            }
            let bits = packed_bits_per_index(palette_size);
            let per_byte = 8 / bits;
            let row_bytes = ((tile_w as u32 + per_byte - 1) / per_byte) as usize;

            out.resize(tile_w as usize * tile_h as usize, 0);
            let mut row = vec![0u8; row_bytes];
            for y in 0..tile_h as usize {
                read_exact(reader, &mut row)?;
                for x in 0..tile_w as usize {
                    let byte = row[x / per_byte as usize];
                    let shift = 8 - bits * (x as u32 % per_byte + 1);
                    let index = ((byte as u32 >> shift) & ((1 << bits) - 1)) as usize;
                    out[y * tile_w as usize + x] = tile_palette
                        .get(index)
                        .copied()
                        .ok_or(Error::Protocol("ZRLE packed palette index out of range"))?;
                }
            }
        }
        128 => {
            // Plain RLE: (CPIXEL, run-length) pairs until the tile is full.
            let total = tile_w as usize * tile_h as usize;
            while out.len() < total {
                let colour = read_cpixel(reader, format, palette)?;
                let run = read_run_length(reader)?.min(total - out.len());
                out.resize(out.len() + run, colour);
            }
        }
        130..=255 => {
            let palette_size = subencoding as usize - 128;
            let mut tile_palette = Vec::with_capacity(palette_size);
            for _ in 0..palette_size {
                tile_palette.push(read_cpixel(reader, format, palette)?);
            }
            let total = tile_w as usize * tile_h as usize;
            while out.len() < total {
                let byte = read_u8(reader)?;
                let index = (byte & 0x7f) as usize;
                let colour = *tile_palette
                    .get(index)
                    .ok_or(Error::Protocol("ZRLE palette RLE index out of range"))?;
                let run = if byte & 0x80 != 0 {
                    read_run_length(reader)?
                } else {
                    1
                };
                let run = run.min(total - out.len());
                out.resize(out.len() + run, colour);
            }
        }
        _ => return Err(Error::Protocol("unrecognized ZRLE tile subencoding")),
    }
    Ok(())
}

/// ZRLE: a u32-length-prefixed, zlib-compressed stream of 64x64 tiles, each carrying
/// its own subencoding (raw CPIXELs, a solid fill, a packed palette, or one of two
/// run-length variants).
pub fn decode<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    format: &PixelFormat,
    zlib_stream: &mut ZlibStream,
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    let compressed_len = read_u32(reader)? as usize;
    let mut compressed = vec![0u8; compressed_len];
    read_exact(reader, &mut compressed)?;

    // The expected inflated size isn't known up front (it depends on which
    // subencodings the server chose), so inflate into a generously sized scratch
    // buffer via the stream's incremental API instead of a single fixed-size call.
    let raw = zlib_stream.inflate_unbounded(&compressed)?;
    let mut cursor = std::io::Cursor::new(raw);

    let palette: Vec<(u8, u8, u8)> = Vec::new();
    let mut tile = Vec::new();

    let mut ty = 0u16;
    while ty < header.height {
        let tile_h = TILE_SIZE.min(header.height - ty);
        let mut tx = 0u16;
        while tx < header.width {
            let tile_w = TILE_SIZE.min(header.width - tx);
            decode_tile(&mut cursor, format, &palette, tile_w, tile_h, &mut tile)?;
            for dy in 0..tile_h {
                let row_start = dy as usize * tile_w as usize;
                let row = &tile[row_start..row_start + tile_w as usize];
                framebuffer.write_row(header.x + tx, header.y + ty + dy, row)?;
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
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decodes_single_solid_tile() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 8,
            height: 8,
            encoding: Encoding::Zrle,
        };
        let mut tile_bytes = vec![1u8]; // solid color subencoding
        tile_bytes.extend_from_slice(&[0x00, 0xFF, 0x00]); // CPIXEL: green
        let compressed = compress(&tile_bytes);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&compressed);

        let mut cursor = std::io::Cursor::new(bytes);
        let mut fb = Framebuffer::new(8, 8);
        let mut stream = ZlibStream::new();
        decode(&mut cursor, &header, &format, &mut stream, &mut fb).unwrap();

        let [b, g, r, _a] = fb.pixels()[0].to_le_bytes();
        assert_eq!((r, g, b), (0, 255, 0));
    }

    #[test]
    fn run_length_sums_across_255_markers() {
        let bytes = vec![255u8, 10u8];
        let mut cursor = std::io::Cursor::new(bytes);
        // 1 + 255 + 10 = 266
        assert_eq!(read_run_length(&mut cursor).unwrap(), 266);
    }

    #[test]
    fn plain_rle_sum_fills_exact_tile_area() {
        let format = PixelFormat::canonical_bgra();
        // One run covering the entire 4x4 tile (16 pixels): run-length byte 15
        // (1 + 15 = 16).
        let mut tile_bytes = vec![128u8];
        tile_bytes.extend_from_slice(&[0x00, 0x00, 0xFF]); // CPIXEL: red
        tile_bytes.push(15);
        let mut cursor = std::io::Cursor::new(tile_bytes);
        let mut out = Vec::new();
        decode_tile(&mut cursor, &format, &[], 4, 4, &mut out).unwrap();
        assert_eq!(out.len(), 16);
        assert!(out.iter().all(|&p| p == out[0]));
    }
}
