//! A client-side implementation of the RFB (VNC) wire protocol: version and security
//! handshake, DES-VNC authentication, and the Raw/CopyRect/RRE/Hextile/Zlib/ZRLE
//! rectangle decoders, wired together behind a small session API.
//!
//! This crate does not draw anything. It decodes the server's framebuffer into a
//! plain `u32` BGRA grid and hands the caller events; painting that grid to a
//! window, and turning OS input into keysyms, is the host application's job.

#[macro_use]
extern crate log;

mod client;
mod des;
mod encodings;
mod error;
mod framebuffer;
pub mod keysym;
mod pixel_format;
mod protocol;
mod reader;
mod writer;

pub use client::{Client, ConnectionState};
pub use error::{Error, Result};
pub use framebuffer::Framebuffer;
pub use pixel_format::PixelFormat;
pub use protocol::Version;
pub use reader::{Event, SharedState};
