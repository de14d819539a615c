use std::net::{Shutdown, TcpStream};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::pixel_format::PixelFormat;
use crate::protocol::{Encoding, C2S};

/// The write half of a connection, serialized behind one mutex so the reader and
/// caller threads never interleave partial messages on the wire.
#[derive(Clone)]
pub struct Writer {
    stream: Arc<Mutex<TcpStream>>,
}

impl Writer {
    pub fn new(stream: Arc<Mutex<TcpStream>>) -> Writer {
        Writer { stream }
    }

    fn send(&self, message: &C2S) -> Result<()> {
        let mut stream = self.stream.lock().expect("writer lock poisoned");
        debug!("-> {:?}", message);
        message.write_to(&mut *stream)
    }

    pub fn set_pixel_format(&self, format: PixelFormat) -> Result<()> {
        self.send(&C2S::SetPixelFormat(format))
    }

    pub fn set_encodings(&self, encodings: &[Encoding]) -> Result<()> {
        self.send(&C2S::SetEncodings(encodings.to_vec()))
    }

    pub fn request_update(&self, incremental: bool, x: u16, y: u16, width: u16, height: u16) -> Result<()> {
        self.send(&C2S::FramebufferUpdateRequest {
            incremental,
            x,
            y,
            width,
            height,
        })
    }

    pub fn key_event(&self, down: bool, key: u32) -> Result<()> {
        self.send(&C2S::KeyEvent { down, key })
    }

    pub fn pointer_event(&self, button_mask: u8, x: u16, y: u16) -> Result<()> {
        self.send(&C2S::PointerEvent { button_mask, x, y })
    }

    pub fn cut_text(&self, text: &str) -> Result<()> {
        self.send(&C2S::CutText(text.to_string()))
    }

    /// Shuts down both halves of the underlying socket, unblocking any read the
    /// reader worker is parked in.
    pub fn shutdown(&self) {
        let stream = self.stream.lock().expect("writer lock poisoned");
        let _ = stream.shutdown(Shutdown::Both);
    }
}
