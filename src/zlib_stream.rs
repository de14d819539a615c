use flate2::{Decompress, FlushDecompress, Status};

use crate::error::{Error, Result};

/// The zlib inflate context shared by every `Zlib` and `ZRLE` rectangle for the life
/// of one connection. The server maintains one compression stream per encoding type
/// across the whole session, so resetting this between rectangles would desync the
/// dictionary and corrupt every rectangle after the first.
pub struct ZlibStream {
    inflater: Decompress,
}

impl ZlibStream {
    pub fn new() -> ZlibStream {
        ZlibStream {
            inflater: Decompress::new(true),
        }
    }

    /// Inflates `compressed` fully, appending exactly `expected_len` bytes of output.
    pub fn inflate(&mut self, compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; expected_len];
        let before_in = self.inflater.total_in();
        let before_out = self.inflater.total_out();

        let status = self
            .inflater
            .decompress(compressed, &mut output, FlushDecompress::Sync)
            .map_err(|e| Error::Decode(format!("zlib inflate failed: {}", e)))?;

        let produced = (self.inflater.total_out() - before_out) as usize;
        let consumed = (self.inflater.total_in() - before_in) as usize;

        if produced != expected_len {
            return Err(Error::Decode(format!(
                "zlib stream produced {} bytes, expected {}",
                produced, expected_len
            )));
        }
        if status == Status::BufError {
            return Err(Error::Decode("zlib stream stalled with no progress".into()));
        }
        let _ = consumed;
        Ok(output)
    }

    /// Inflates `compressed` fully without knowing the output size up front, growing
    /// the output buffer until every input byte has been consumed. Used for ZRLE,
    /// whose inflated tile stream length depends on which subencodings the server
    /// chose for each tile.
    pub fn inflate_unbounded(&mut self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(compressed.len() * 4);
        let mut scratch = vec![0u8; 64 * 1024];

        loop {
            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();

            let status = self
                .inflater
                .decompress(&compressed[before_in as usize..], &mut scratch, FlushDecompress::Sync)
                .map_err(|e| Error::Decode(format!("zlib inflate failed: {}", e)))?;

            let produced = (self.inflater.total_out() - before_out) as usize;
            output.extend_from_slice(&scratch[..produced]);

            let consumed_total = self.inflater.total_in() as usize;
            if consumed_total >= compressed.len() {
                break;
            }
            if produced == 0 && status == Status::BufError {
                return Err(Error::Decode("zlib stream stalled with no progress".into()));
            }
        }
        Ok(output)
    }
}

impl Default for ZlibStream {
    fn default() -> ZlibStream {
        ZlibStream::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_a_single_chunk() {
        let plain = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = compress(&plain);
        let mut stream = ZlibStream::new();
        let out = stream.inflate(&compressed, plain.len()).unwrap();
        assert_eq!(out, plain);
    }

    #[test]
    fn stream_survives_across_multiple_rectangles() {
        // Two independent deflate streams concatenated won't decode correctly through
        // one persistent Decompress the way a real server's single ongoing stream
        // would; this test instead checks that state (total_in/out) accumulates
        // rather than resetting between calls.
        let plain_a = b"first rectangle payload".to_vec();
        let compressed_a = compress(&plain_a);
        let mut stream = ZlibStream::new();
        stream.inflate(&compressed_a, plain_a.len()).unwrap();
        assert!(stream.inflater.total_in() > 0);
        assert!(stream.inflater.total_out() > 0);
    }
}
