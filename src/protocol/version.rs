use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::protocol::{read_exact, write_bytes};

/// A negotiated RFB protocol version. Only the three versions this client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Rfb33,
    Rfb37,
    Rfb38,
}

impl Version {
    /// Parses the 12-byte `"RFB xxx.yyy\n"` banner and negotiates down to one of the
    /// three versions this client understands.
    ///
    /// UltraVNC servers have been observed reporting `003.006`; treated as 3.3.
    /// Apple Remote Desktop has been observed reporting `003.889`; and more generally
    /// any `3.x` with `x >= 8` is treated as 3.8, the robust generalization of that case.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Version> {
        let mut buf = [0u8; 12];
        read_exact(reader, &mut buf)?;

        if &buf[0..4] != b"RFB " || buf[7] != b'.' || buf[11] != b'\n' {
            return Err(Error::UnsupportedVersion(
                String::from_utf8_lossy(&buf).into_owned(),
            ));
        }
        let major: u32 = std::str::from_utf8(&buf[4..7])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::UnsupportedVersion(String::from_utf8_lossy(&buf).into_owned()))?;
        let minor: u32 = std::str::from_utf8(&buf[8..11])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::UnsupportedVersion(String::from_utf8_lossy(&buf).into_owned()))?;

        if major < 3 || (major == 3 && minor < 3) {
            return Err(Error::UnsupportedVersion(format!("{}.{}", major, minor)));
        }

        Ok(if major > 3 {
            Version::Rfb38
        } else if minor < 7 {
            Version::Rfb33
        } else if minor < 8 {
            Version::Rfb37
        } else {
            // minor >= 8, including the 3.889 Apple Remote Desktop quirk
            Version::Rfb38
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let banner: &[u8; 12] = match self {
            Version::Rfb33 => b"RFB 003.003\n",
            Version::Rfb37 => b"RFB 003.007\n",
            Version::Rfb38 => b"RFB 003.008\n",
        };
        write_bytes(writer, banner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn negotiate(banner: &[u8]) -> Result<Version> {
        let mut cursor = Cursor::new(banner.to_vec());
        Version::read_from(&mut cursor)
    }

    #[test]
    fn negotiates_3_8_directly() {
        assert_eq!(negotiate(b"RFB 003.008\n").unwrap(), Version::Rfb38);
    }

    #[test]
    fn negotiates_3_7() {
        assert_eq!(negotiate(b"RFB 003.007\n").unwrap(), Version::Rfb37);
    }

    #[test]
    fn ultravnc_3_6_quirk_becomes_3_3() {
        assert_eq!(negotiate(b"RFB 003.006\n").unwrap(), Version::Rfb33);
    }

    #[test]
    fn apple_3_889_quirk_becomes_3_8() {
        assert_eq!(negotiate(b"RFB 003.889\n").unwrap(), Version::Rfb38);
    }

    #[test]
    fn rejects_below_3_3() {
        assert!(negotiate(b"RFB 002.002\n").is_err());
    }

    #[test]
    fn round_trips_banner_bytes() {
        let mut buf = Vec::new();
        Version::Rfb38.write_to(&mut buf).unwrap();
        assert_eq!(&buf, b"RFB 003.008\n");
    }
}
