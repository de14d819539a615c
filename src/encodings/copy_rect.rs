use std::io::Read;

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::protocol::{read_u16, RectangleHeader};

/// A rectangle that is already on screen, just moved: the payload is only the
/// 4-byte source position, and the framebuffer performs the copy itself.
pub fn decode<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    let src_x = read_u16(reader)?;
    let src_y = read_u16(reader)?;
    framebuffer.copy_rect(src_x, src_y, header.x, header.y, header.width, header.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encoding;
    use std::io::Cursor;

    #[test]
    fn copies_pixels_from_elsewhere_in_the_framebuffer() {
        let mut fb = Framebuffer::new(4, 1);
        fb.write_pixel(0, 0, 1).unwrap();
        fb.write_pixel(1, 0, 2).unwrap();

        let header = RectangleHeader {
            x: 2,
            y: 0,
            width: 2,
            height: 1,
            encoding: Encoding::CopyRect,
        };
        let mut cursor = Cursor::new(vec![0u8, 0u8, 0u8, 0u8]);
        decode(&mut cursor, &header, &mut fb).unwrap();
        assert_eq!(&fb.pixels()[2..4], &[1, 2]);
    }
}
