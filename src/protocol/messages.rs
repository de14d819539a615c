use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::pixel_format::PixelFormat;
use crate::protocol::{
    read_i32, read_string, read_u16, read_u32, read_u8, skip_padding, write_i32, write_padding,
    write_string, write_u16, write_u32, write_u8,
};

/// The `ClientInit` message: the only thing the client sends before `ServerInit`.
#[derive(Debug, Clone, Copy)]
pub struct ClientInit {
    pub shared: bool,
}

impl ClientInit {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u8(writer, self.shared as u8)
    }
}

/// An RGB triple used by `SetColourMapEntries`, each channel left at its wire precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Colour {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Colour> {
        Ok(Colour {
            red: read_u16(reader)?,
            green: read_u16(reader)?,
            blue: read_u16(reader)?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u16(writer, self.red)?;
        write_u16(writer, self.green)?;
        write_u16(writer, self.blue)
    }
}

/// One of the six rectangle encodings this client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Raw,
    CopyRect,
    Rre,
    Hextile,
    Zlib,
    Zrle,
    Unknown(i32),
}

impl Encoding {
    pub fn tag(self) -> i32 {
        match self {
            Encoding::Raw => 0,
            Encoding::CopyRect => 1,
            Encoding::Rre => 2,
            Encoding::Hextile => 5,
            Encoding::Zlib => 6,
            Encoding::Zrle => 16,
            Encoding::Unknown(tag) => tag,
        }
    }

    pub fn from_tag(tag: i32) -> Encoding {
        match tag {
            0 => Encoding::Raw,
            1 => Encoding::CopyRect,
            2 => Encoding::Rre,
            5 => Encoding::Hextile,
            6 => Encoding::Zlib,
            16 => Encoding::Zrle,
            other => Encoding::Unknown(other),
        }
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Encoding> {
        Ok(Encoding::from_tag(read_i32(reader)?))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_i32(writer, self.tag())
    }
}

/// The fixed `(x, y, width, height, encoding)` header preceding each rectangle's payload.
#[derive(Debug, Clone, Copy)]
pub struct RectangleHeader {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub encoding: Encoding,
}

impl RectangleHeader {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<RectangleHeader> {
        Ok(RectangleHeader {
            x: read_u16(reader)?,
            y: read_u16(reader)?,
            width: read_u16(reader)?,
            height: read_u16(reader)?,
            encoding: Encoding::read_from(reader)?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u16(writer, self.x)?;
        write_u16(writer, self.y)?;
        write_u16(writer, self.width)?;
        write_u16(writer, self.height)?;
        self.encoding.write_to(writer)
    }
}

/// The server's reply to `ClientInit`: framebuffer geometry, native pixel format, and
/// the desktop name.
#[derive(Debug, Clone)]
pub struct ServerInit {
    pub framebuffer_width: u16,
    pub framebuffer_height: u16,
    pub pixel_format: PixelFormat,
    pub name: String,
}

impl ServerInit {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<ServerInit> {
        Ok(ServerInit {
            framebuffer_width: read_u16(reader)?,
            framebuffer_height: read_u16(reader)?,
            pixel_format: PixelFormat::read_from(reader)?,
            name: read_string(reader)?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u16(writer, self.framebuffer_width)?;
        write_u16(writer, self.framebuffer_height)?;
        self.pixel_format.write_to(writer)?;
        write_string(writer, &self.name)
    }
}

/// A message the client sends to the server.
#[derive(Debug, Clone)]
pub enum C2S {
    SetPixelFormat(PixelFormat),
    SetEncodings(Vec<Encoding>),
    FramebufferUpdateRequest {
        incremental: bool,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    KeyEvent {
        down: bool,
        key: u32,
    },
    PointerEvent {
        button_mask: u8,
        x: u16,
        y: u16,
    },
    CutText(String),
}

impl C2S {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            C2S::SetPixelFormat(pf) => {
                write_u8(writer, 0)?;
                write_padding(writer, 3)?;
                pf.write_to(writer)
            }
            C2S::SetEncodings(encodings) => {
                write_u8(writer, 2)?;
                write_padding(writer, 1)?;
                write_u16(writer, encodings.len() as u16)?;
                for encoding in encodings {
                    encoding.write_to(writer)?;
                }
                Ok(())
            }
            C2S::FramebufferUpdateRequest {
                incremental,
                x,
                y,
                width,
                height,
            } => {
                write_u8(writer, 3)?;
                write_u8(writer, *incremental as u8)?;
                write_u16(writer, *x)?;
                write_u16(writer, *y)?;
                write_u16(writer, *width)?;
                write_u16(writer, *height)
            }
            C2S::KeyEvent { down, key } => {
                write_u8(writer, 4)?;
                write_u8(writer, *down as u8)?;
                write_padding(writer, 2)?;
                write_u32(writer, *key)
            }
            C2S::PointerEvent { button_mask, x, y } => {
                write_u8(writer, 5)?;
                write_u8(writer, *button_mask)?;
                write_u16(writer, *x)?;
                write_u16(writer, *y)
            }
            C2S::CutText(text) => {
                write_u8(writer, 6)?;
                write_padding(writer, 3)?;
                write_string(writer, text)
            }
        }
    }
}

/// A message the server sends to the client.
#[derive(Debug, Clone)]
pub enum S2C {
    FramebufferUpdate { count: u16 },
    SetColourMapEntries { first_colour: u16, colours: Vec<Colour> },
    Bell,
    CutText(String),
}

impl S2C {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<S2C> {
        match read_u8(reader)? {
            0 => {
                skip_padding(reader, 1)?;
                let count = read_u16(reader)?;
                Ok(S2C::FramebufferUpdate { count })
            }
            1 => {
                skip_padding(reader, 1)?;
                let first_colour = read_u16(reader)?;
                let count = read_u16(reader)? as usize;
                let mut colours = Vec::with_capacity(count);
                for _ in 0..count {
                    colours.push(Colour::read_from(reader)?);
                }
                Ok(S2C::SetColourMapEntries { first_colour, colours })
            }
            2 => Ok(S2C::Bell),
            3 => {
                skip_padding(reader, 3)?;
                let text = read_string(reader)?;
                Ok(S2C::CutText(text))
            }
            _ => Err(Error::Protocol("unknown server-to-client message type")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn encoding_round_trips_known_tags() {
        for encoding in [
            Encoding::Raw,
            Encoding::CopyRect,
            Encoding::Rre,
            Encoding::Hextile,
            Encoding::Zlib,
            Encoding::Zrle,
        ] {
            let mut buf = Vec::new();
            encoding.write_to(&mut buf).unwrap();
            let mut cursor = Cursor::new(buf);
            assert_eq!(Encoding::read_from(&mut cursor).unwrap(), encoding);
        }
    }

    #[test]
    fn unknown_encoding_tag_is_preserved() {
        assert_eq!(Encoding::from_tag(-239), Encoding::Unknown(-239));
    }

    #[test]
    fn rectangle_header_round_trips() {
        let header = RectangleHeader {
            x: 10,
            y: 20,
            width: 640,
            height: 480,
            encoding: Encoding::Hextile,
        };
        let mut buf = Vec::new();
        header.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), 12);
        let mut cursor = Cursor::new(buf);
        let decoded = RectangleHeader::read_from(&mut cursor).unwrap();
        assert_eq!(decoded.x, 10);
        assert_eq!(decoded.height, 480);
        assert_eq!(decoded.encoding, Encoding::Hextile);
    }

    #[test]
    fn server_init_round_trips_with_name() {
        let init = ServerInit {
            framebuffer_width: 1024,
            framebuffer_height: 768,
            pixel_format: PixelFormat::canonical_bgra(),
            name: "test desktop".to_string(),
        };
        let mut buf = Vec::new();
        init.write_to(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let decoded = ServerInit::read_from(&mut cursor).unwrap();
        assert_eq!(decoded.framebuffer_width, 1024);
        assert_eq!(decoded.name, "test desktop");
        assert_eq!(decoded.pixel_format, PixelFormat::canonical_bgra());
    }

    #[test]
    fn set_encodings_wire_layout() {
        let msg = C2S::SetEncodings(vec![Encoding::Raw, Encoding::Hextile, Encoding::Zrle]);
        let mut buf = Vec::new();
        msg.write_to(&mut buf).unwrap();
        assert_eq!(buf[0], 2);
        assert_eq!(&buf[2..4], &[0, 3]);
    }

    #[test]
    fn framebuffer_update_request_wire_layout() {
        let msg = C2S::FramebufferUpdateRequest {
            incremental: true,
            x: 0,
            y: 0,
            width: 100,
            height: 200,
        };
        let mut buf = Vec::new();
        msg.write_to(&mut buf).unwrap();
        assert_eq!(buf[0], 3);
        assert_eq!(buf[1], 1);
    }

    #[test]
    fn reads_framebuffer_update_header() {
        let mut buf = vec![0u8, 0u8];
        buf.extend_from_slice(&3u16.to_be_bytes());
        let mut cursor = Cursor::new(buf);
        match S2C::read_from(&mut cursor).unwrap() {
            S2C::FramebufferUpdate { count } => assert_eq!(count, 3),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn reads_bell() {
        let mut cursor = Cursor::new(vec![2u8]);
        matches!(S2C::read_from(&mut cursor).unwrap(), S2C::Bell);
    }

    #[test]
    fn reads_set_colour_map_entries() {
        let mut buf = vec![1u8, 0u8];
        buf.extend_from_slice(&5u16.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&[0, 0, 0, 0xFF, 0, 0]);
        let mut cursor = Cursor::new(buf);
        match S2C::read_from(&mut cursor).unwrap() {
            S2C::SetColourMapEntries { first_colour, colours } => {
                assert_eq!(first_colour, 5);
                assert_eq!(colours, vec![Colour { red: 0, green: 0xFF, blue: 0 }]);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_server_message_type() {
        let mut cursor = Cursor::new(vec![250u8]);
        assert!(S2C::read_from(&mut cursor).is_err());
    }
}
