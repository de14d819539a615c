//! Binary framing for the RFB wire protocol: big-endian primitives, length-prefixed
//! strings, padding, and the handshake/message types built on top of them.

mod messages;
mod security;
mod version;

pub use messages::{ClientInit, Colour, Encoding, RectangleHeader, ServerInit, C2S, S2C};
pub use security::{SecurityResult, SecurityType, SecurityTypes};
pub use version::Version;

use std::io::{ErrorKind as IoErrorKind, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Reads exactly `buf.len()` bytes, mapping a clean EOF to `Error::ConnectionClosed`
/// rather than the generic `UnexpectedEof` io error.
pub(crate) fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(ref e) if e.kind() == IoErrorKind::UnexpectedEof => Err(Error::ConnectionClosed),
        Err(e) => Err(Error::Network(e)),
    }
}

pub(crate) fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    read_exact(reader, &mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    read_exact(reader, &mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    Ok(read_u32(reader)? as i32)
}

pub(crate) fn skip_padding<R: Read>(reader: &mut R, n: usize) -> Result<()> {
    let mut buf = [0u8; 8];
    debug_assert!(n <= buf.len());
    read_exact(reader, &mut buf[..n])
}

/// Reads a u32-length-prefixed byte string and interprets it as Latin-1/ASCII text,
/// the encoding RFB uses for server reasons, desktop names, and cut-buffer text.
pub(crate) fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let length = read_u32(reader)? as usize;
    let mut bytes = vec![0u8; length];
    read_exact(reader, &mut bytes)?;
    Ok(bytes.iter().map(|&b| b as char).collect())
}

pub(crate) fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<()> {
    writer.write_u8(value).map_err(Error::Network)
}

pub(crate) fn write_u16<W: Write>(writer: &mut W, value: u16) -> Result<()> {
    writer.write_u16::<BigEndian>(value).map_err(Error::Network)
}

pub(crate) fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_u32::<BigEndian>(value).map_err(Error::Network)
}

pub(crate) fn write_i32<W: Write>(writer: &mut W, value: i32) -> Result<()> {
    write_u32(writer, value as u32)
}

pub(crate) fn write_padding<W: Write>(writer: &mut W, n: usize) -> Result<()> {
    let buf = [0u8; 8];
    debug_assert!(n <= buf.len());
    writer.write_all(&buf[..n]).map_err(Error::Network)
}

/// Writes a Latin-1/ASCII string with a u32 big-endian length prefix.
pub(crate) fn write_string<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
    write_u32(writer, bytes.len() as u32)?;
    writer.write_all(&bytes).map_err(Error::Network)
}

pub(crate) fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer.write_all(bytes).map_err(Error::Network)
}
