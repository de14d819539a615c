use std::net::TcpStream;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::encodings::decode_rectangle;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::pixel_format::PixelFormat;
use crate::protocol::{RectangleHeader, S2C};
use crate::writer::Writer;
use crate::zlib_stream::ZlibStream;

/// An update delivered to the caller from the background reader thread.
#[derive(Debug, Clone)]
pub enum Event {
    /// A region of the framebuffer changed; the pixels are already applied.
    FramebufferUpdated {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    /// The server replaced some or all of the indexed colour map.
    SetColourMap {
        first_colour: u16,
        colours: Vec<(u16, u16, u16)>,
    },
    ServerCutText(String),
    Bell,
    /// The reader thread exited; `None` means the peer closed the connection cleanly
    /// after the caller asked it to.
    ConnectionLost(Option<String>),
}

/// Shared state the reader thread mutates in place: the framebuffer itself and the
/// indexed-colour palette, both behind one lock so a paint never observes a half
/// updated colour map.
pub struct SharedState {
    pub framebuffer: Mutex<Framebuffer>,
    pub palette: Mutex<Vec<(u8, u8, u8)>>,
}

impl SharedState {
    pub fn new(width: u16, height: u16) -> SharedState {
        SharedState {
            framebuffer: Mutex::new(Framebuffer::new(width, height)),
            palette: Mutex::new(Vec::new()),
        }
    }
}

fn pump_one(
    stream: &mut TcpStream,
    format: &PixelFormat,
    state: &SharedState,
    zlib_stream: &mut ZlibStream,
    writer: &Writer,
    tx: &Sender<Event>,
) -> Result<()> {
    let message = S2C::read_from(stream)?;
    trace!("<- {:?}", message);

    match message {
        S2C::FramebufferUpdate { count } => {
            for _ in 0..count {
                let header = RectangleHeader::read_from(stream)?;
                trace!("<- rectangle {:?}", header);

                let palette = state.palette.lock().expect("palette lock poisoned").clone();
                let mut framebuffer = state.framebuffer.lock().expect("framebuffer lock poisoned");
                decode_rectangle(stream, &header, format, &palette, zlib_stream, &mut framebuffer)?;
                drop(framebuffer);

                let sent = tx.send(Event::FramebufferUpdated {
                    x: header.x,
                    y: header.y,
                    width: header.width,
                    height: header.height,
                });
                if sent.is_err() {
                    return Err(Error::ConnectionClosed);
                }
            }

            // Maintain the request/response cadence: ask for the next incremental
            // update now that this one is fully applied.
            let (width, height) = {
                let framebuffer = state.framebuffer.lock().expect("framebuffer lock poisoned");
                (framebuffer.width(), framebuffer.height())
            };
            writer.request_update(true, 0, 0, width, height)?;
        }
        S2C::SetColourMapEntries { first_colour, colours } => {
            let mut palette = state.palette.lock().expect("palette lock poisoned");
            let needed = first_colour as usize + colours.len();
            if palette.len() < needed {
                palette.resize(needed, (0, 0, 0));
            }
            for (i, colour) in colours.iter().enumerate() {
                let scale = |c: u16| (c >> 8) as u8;
                palette[first_colour as usize + i] = (scale(colour.red), scale(colour.green), scale(colour.blue));
            }
            drop(palette);

            let reported = colours.iter().map(|c| (c.red, c.green, c.blue)).collect();
            if tx
                .send(Event::SetColourMap { first_colour, colours: reported })
                .is_err()
            {
                return Err(Error::ConnectionClosed);
            }
        }
        S2C::Bell => {
            if tx.send(Event::Bell).is_err() {
                return Err(Error::ConnectionClosed);
            }
        }
        S2C::CutText(text) => {
            if tx.send(Event::ServerCutText(text)).is_err() {
                return Err(Error::ConnectionClosed);
            }
        }
    }
    Ok(())
}

/// Spawns the background thread that owns the read half of the connection for the
/// rest of its life, decoding framebuffer updates directly into `state` and
/// forwarding every event to `tx`.
pub fn spawn(
    mut stream: TcpStream,
    format: PixelFormat,
    state: Arc<SharedState>,
    writer: Writer,
    tx: Sender<Event>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut zlib_stream = ZlibStream::new();
        loop {
            match pump_one(&mut stream, &format, &state, &mut zlib_stream, &writer, &tx) {
                Ok(()) => continue,
                Err(Error::ConnectionClosed) => {
                    let _ = tx.send(Event::ConnectionLost(None));
                    break;
                }
                Err(error) => {
                    warn!("reader thread stopping: {}", error);
                    let _ = tx.send(Event::ConnectionLost(Some(error.to_string())));
                    break;
                }
            }
        }
    })
}
