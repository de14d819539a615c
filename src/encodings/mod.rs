//! One decoder per rectangle encoding, dispatched by `decode_rectangle` on the tag in
//! the rectangle's header.

mod copy_rect;
mod hextile;
mod raw;
mod rre;
mod zlib;
mod zrle;

use std::io::Read;

use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{Encoding, RectangleHeader};
use crate::zlib_stream::ZlibStream;

/// Decodes one rectangle's payload from `reader` directly into `framebuffer`.
///
/// `zlib_stream` is the connection-lifetime inflate context shared by the `Zlib` and
/// `ZRLE` encodings; `palette` is the client's current colour map, consulted only when
/// `format` is not true-color.
pub fn decode_rectangle<R: Read>(
    reader: &mut R,
    header: &RectangleHeader,
    format: &PixelFormat,
    palette: &[(u8, u8, u8)],
    zlib_stream: &mut ZlibStream,
    framebuffer: &mut Framebuffer,
) -> Result<()> {
    match header.encoding {
        Encoding::Raw => raw::decode(reader, header, format, palette, framebuffer),
        Encoding::CopyRect => copy_rect::decode(reader, header, framebuffer),
        Encoding::Rre => rre::decode(reader, header, format, palette, framebuffer),
        Encoding::Hextile => hextile::decode(reader, header, format, palette, framebuffer),
        Encoding::Zlib => zlib::decode(reader, header, format, palette, zlib_stream, framebuffer),
        Encoding::Zrle => zrle::decode(reader, header, format, zlib_stream, framebuffer),
        Encoding::Unknown(_) => Err(Error::Protocol("server used an encoding outside the requested set")),
    }
}
