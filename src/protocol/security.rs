use std::io::{Read, Write};

use crate::error::Result;
use crate::protocol::{read_u32, read_u8, write_u32, write_u8};

/// A security type as offered by the server during the security handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityType {
    Invalid,
    None,
    Vnc,
    Unknown(u8),
}

impl SecurityType {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<SecurityType> {
        Ok(match read_u8(reader)? {
            0 => SecurityType::Invalid,
            1 => SecurityType::None,
            2 => SecurityType::Vnc,
            n => SecurityType::Unknown(n),
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let byte = match *self {
            SecurityType::Invalid => 0,
            SecurityType::None => 1,
            SecurityType::Vnc => 2,
            SecurityType::Unknown(n) => n,
        };
        write_u8(writer, byte)
    }
}

/// The list of security types offered in the RFB 3.7+ handshake.
#[derive(Debug)]
pub struct SecurityTypes(pub Vec<SecurityType>);

impl SecurityTypes {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<SecurityTypes> {
        let count = read_u8(reader)?;
        let mut types = Vec::with_capacity(count as usize);
        for _ in 0..count {
            types.push(SecurityType::read_from(reader)?);
        }
        Ok(SecurityTypes(types))
    }
}

/// The outcome of the security handshake: `0` succeeded, `1` failed, `2` failed
/// because the server gave up after too many attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityResult {
    Ok,
    Failed,
    TooMany,
}

impl SecurityResult {
    pub fn read_from<R: Read>(reader: &mut R) -> Result<SecurityResult> {
        Ok(match read_u32(reader)? {
            0 => SecurityResult::Ok,
            2 => SecurityResult::TooMany,
            _ => SecurityResult::Failed,
        })
    }

    #[allow(dead_code)]
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let code = match *self {
            SecurityResult::Ok => 0,
            SecurityResult::Failed => 1,
            SecurityResult::TooMany => 2,
        };
        write_u32(writer, code)
    }
}
