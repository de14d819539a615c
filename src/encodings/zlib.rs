use std::io::Read;

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{read_exact, read_u32, RectangleHeader};
use crate::zlib_stream::ZlibStream;

/// A u32-length-prefixed blob of zlib-compressed raw pixel data, inflated through the
/// connection's persistent stream and then laid out exactly like the `Raw` encoding.
pub fn decode<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
    zlib_stream: &mut ZlibStream,
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    let compressed_len = read_u32(reader)? as usize;
    let mut compressed = vec![0u8; compressed_len];
    read_exact(reader, &mut compressed)?;

    let bpp = format.bytes_per_pixel();
    let expected_len = header.width as usize * header.height as usize * bpp;
    let raw = zlib_stream.inflate(&compressed, expected_len)?;

    let mut row_pixels = vec![0u32; header.width as usize];
    for dy in 0..header.height {
        let row_start = dy as usize * header.width as usize * bpp;
        let row = &raw[row_start..row_start + header.width as usize * bpp];
        for (x, chunk) in row.chunks_exact(bpp).enumerate() {
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
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Cursor;
    use std::io::Write;

    #[test]
    fn decodes_compressed_solid_rectangle() {
        let format = PixelFormat::canonical_bgra();
        let header = RectangleHeader {
            x: 0,
            y: 0,
            width: 2,
            height: 2,
            encoding: Encoding::Zlib,
        };
        let mut plain = Vec::new();
        for _ in 0..4 {
            plain.extend_from_slice(&[0x00, 0xFF, 0x00, 0x00]); // green
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&plain).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&compressed);

        let mut cursor = Cursor::new(bytes);
        let mut fb = Framebuffer::new(2, 2);
        let mut stream = ZlibStream::new();
        decode(&mut cursor, &header, &format, &[], &mut stream, &mut fb).unwrap();

        let [b, g, r, _a] = fb.pixels()[0].to_le_bytes();
        assert_eq!((r, g, b), (0, 255, 0));
    }
}
