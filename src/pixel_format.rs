use std::io::{Read, Write};

use crate::error::Result;
use crate::protocol::{read_u16, read_u8, skip_padding, write_padding, write_u16, write_u8};

/// Wire-format pixel descriptor: how a server (or client) lays out one pixel.
///
/// `PixelFormat::canonical_bgra` is the format this client forces via `SetPixelFormat`
/// immediately after init; the general `read_pixel`/`translate` path exists only for
/// the brief window before that request takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub bits_per_pixel: u8,
    pub depth: u8,
    pub big_endian: bool,
    pub true_color: bool,
    pub red_max: u16,
    pub green_max: u16,
    pub blue_max: u16,
    pub red_shift: u8,
    pub green_shift: u8,
    pub blue_shift: u8,
}

impl PixelFormat {
    /// The 32-bpp BGRA layout this client always requests: `shift=(16,8,0)`, max
    /// 255 for every channel, little-endian on the wire.
    pub fn canonical_bgra() -> PixelFormat {
        PixelFormat {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            true_color: true,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 16,
            green_shift: 8,
            blue_shift: 0,
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<PixelFormat> {
        let pf = PixelFormat {
            bits_per_pixel: read_u8(reader)?,
            depth: read_u8(reader)?,
            big_endian: read_u8(reader)? != 0,
            true_color: read_u8(reader)? != 0,
            red_max: read_u16(reader)?,
            green_max: read_u16(reader)?,
            blue_max: read_u16(reader)?,
            red_shift: read_u8(reader)?,
            green_shift: read_u8(reader)?,
            blue_shift: read_u8(reader)?,
        };
        skip_padding(reader, 3)?;
        Ok(pf)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u8(writer, self.bits_per_pixel)?;
        write_u8(writer, self.depth)?;
        write_u8(writer, self.big_endian as u8)?;
        write_u8(writer, self.true_color as u8)?;
        write_u16(writer, self.red_max)?;
        write_u16(writer, self.green_max)?;
        write_u16(writer, self.blue_max)?;
        write_u8(writer, self.red_shift)?;
        write_u8(writer, self.green_shift)?;
        write_u8(writer, self.blue_shift)?;
        write_padding(writer, 3)
    }

    /// Extracts the raw `bits_per_pixel`-sized sample from `bytes` (which must hold at
    /// least `bytes_per_pixel()` bytes), honoring `big_endian`.
    pub fn read_raw_sample(&self, bytes: &[u8]) -> u32 {
        match self.bytes_per_pixel() {
            1 => bytes[0] as u32,
            2 => {
                if self.big_endian {
                    u16::from_be_bytes([bytes[0], bytes[1]]) as u32
                } else {
                    u16::from_le_bytes([bytes[0], bytes[1]]) as u32
                }
            }
            4 => {
                if self.big_endian {
                    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
                } else {
                    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
                }
            }
            other => panic!("unsupported bits_per_pixel (bytes={})", other),
        }
    }

    /// Splits a raw true-color sample into 8-bit-rescaled (r, g, b) channels.
    pub fn split_channels(&self, raw: u32) -> (u8, u8, u8) {
        let extract = |shift: u8, max: u16| -> u8 {
            if max == 0 {
                return 0;
            }
            let value = (raw >> shift) & max as u32;
            ((value * 255 + (max as u32) / 2) / max as u32) as u8
        };
        (
            extract(self.red_shift, self.red_max),
            extract(self.green_shift, self.green_max),
            extract(self.blue_shift, self.blue_max),
        )
    }

    /// Decodes one pixel from `bytes` into canonical 32-bit BGRA (`0x00BBGGRR`
    /// little-endian in memory, i.e. byte order B, G, R, A), consulting `palette` for
    /// indexed (non-true-color) formats.
    pub fn decode_to_bgra(&self, bytes: &[u8], palette: &[(u8, u8, u8)]) -> u32 {
        let raw = self.read_raw_sample(bytes);
        let (r, g, b) = if self.true_color {
            self.split_channels(raw)
        } else {
            let index = raw as usize;
            palette.get(index).copied().unwrap_or((0, 0, 0))
        };
        u32::from_le_bytes([b, g, r, 0xFF])
    }

    /// True if this format qualifies for the compact 3-byte ZRLE "CPIXEL" form:
    /// true-color, 32 bpp, depth <= 24, with every channel confined to the low 3 bytes.
    pub fn is_cpixel_compact(&self) -> bool {
        self.true_color
            && self.bits_per_pixel == 32
            && self.depth <= 24
            && (self.red_max as u32) << self.red_shift < (1 << 24)
            && (self.green_max as u32) << self.green_shift < (1 << 24)
            && (self.blue_max as u32) << self.blue_shift < (1 << 24)
    }

    pub fn bytes_per_cpixel(&self) -> usize {
        if self.is_cpixel_compact() {
            3
        } else {
            self.bytes_per_pixel()
        }
    }
}
