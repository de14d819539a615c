use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::des::encrypt_challenge;
use crate::error::{Error, Result};
use crate::pixel_format::PixelFormat;
use crate::protocol::{
    read_exact, read_string, write_bytes, ClientInit, Encoding, SecurityResult, SecurityType,
    SecurityTypes, ServerInit, Version,
};
use crate::reader::{self, Event, SharedState};
use crate::writer::Writer;

/// Where a connection is in its lifecycle. Transitions run linearly forward;
/// any state can fall to `Disconnecting`/`Disconnected` on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    HandshakingVersion,
    HandshakingSecurity,
    Authenticating,
    Initializing,
    Connected,
    Disconnecting,
}

/// Encodings this client asks the server to use, most to least compact. `Raw` is
/// always last, as the one encoding every server is required to support.
const PREFERRED_ENCODINGS: &[Encoding] = &[
    Encoding::Zrle,
    Encoding::Hextile,
    Encoding::Zlib,
    Encoding::Rre,
    Encoding::CopyRect,
    Encoding::Raw,
];

/// What `connect` learned about the security handshake, carried forward to
/// `authenticate`.
enum PendingAuth {
    None,
    Vnc { challenge: [u8; 16] },
}

/// A single RFB connection: handshake, authenticate, initialize, then consume
/// framebuffer updates from a background reader while the caller sends input events.
///
/// Methods must be called in lifecycle order (`connect`, `authenticate`,
/// `initialize`, `start_updates`); calling one out of order returns
/// `Error::InvalidState` rather than panicking.
pub struct Client {
    state: ConnectionState,
    stream: Option<TcpStream>,
    reader_stream: Option<TcpStream>,
    version: Option<Version>,
    pending_auth: PendingAuth,
    view_only: bool,
    name: String,
    shared_state: Option<Arc<SharedState>>,
    writer: Option<Writer>,
    reader_handle: Option<JoinHandle<()>>,
}

impl Client {
    /// Opens the transport and performs the version and security-type handshake,
    /// stopping once it knows whether a password is needed (and, if so, has the
    /// challenge in hand). `port` is the VNC base port (typically 5900); the actual
    /// port dialed is `port + display`, following the `:display` convention VNC
    /// servers use. Returns the new client plus whether `authenticate` will need a
    /// password.
    pub fn connect<H: AsRef<str>>(host: H, display: u16, port: u16, view_only: bool) -> Result<(Client, bool)> {
        let addr = (host.as_ref(), port + display);
        let stream = TcpStream::connect(
            addr.to_socket_addrs()?
                .next()
                .ok_or(Error::Protocol("could not resolve host"))?,
        )?;

        let mut client = Client {
            state: ConnectionState::HandshakingVersion,
            stream: Some(stream),
            reader_stream: None,
            version: None,
            pending_auth: PendingAuth::None,
            view_only,
            name: String::new(),
            shared_state: None,
            writer: None,
            reader_handle: None,
        };
        let stream = client.stream.as_mut().expect("stream set above");

        let server_version = Version::read_from(stream)?;
        debug!("<- {:?}", server_version);
        server_version.write_to(stream)?;
        debug!("-> {:?}", server_version);
        client.version = Some(server_version);
        client.state = ConnectionState::HandshakingSecurity;

        let stream = client.stream.as_mut().expect("stream set above");
        let chosen_type = match server_version {
            Version::Rfb33 => {
                let security_type = SecurityType::read_from(stream)?;
                debug!("<- SecurityType::{:?}", security_type);
                if security_type == SecurityType::Invalid {
                    let reason = read_string(stream)?;
                    return Err(Error::AuthFailed(reason));
                }
                security_type
            }
            Version::Rfb37 | Version::Rfb38 => {
                let offered = SecurityTypes::read_from(stream)?;
                debug!("<- {:?}", offered);
                if offered.0.is_empty() {
                    let reason = read_string(stream)?;
                    return Err(Error::AuthFailed(reason));
                }
                let chosen = if offered.0.contains(&SecurityType::Vnc) {
                    SecurityType::Vnc
                } else if offered.0.contains(&SecurityType::None) {
                    SecurityType::None
                } else {
                    return Err(Error::InvalidSecurityType);
                };
                debug!("-> SecurityType::{:?}", chosen);
                chosen.write_to(stream)?;
                chosen
            }
        };

        let (pending_auth, needs_password) = match chosen_type {
            SecurityType::Vnc => {
                let mut challenge = [0u8; 16];
                read_exact(stream, &mut challenge)?;
                (PendingAuth::Vnc { challenge }, true)
            }
            _ => (PendingAuth::None, false),
        };

        client.pending_auth = pending_auth;
        client.state = ConnectionState::Authenticating;
        Ok((client, needs_password))
    }

    /// Completes the security handshake: sends the DES-VNC response if one is
    /// needed, then reads the server's verdict. Returns `Err(Error::AuthFailed)`
    /// with the server's reason (3.8 only; empty otherwise), or
    /// `Err(Error::AuthTooMany)`, if the server rejected the credentials.
    pub fn authenticate(&mut self, password: Option<&[u8]>) -> Result<()> {
        if self.state != ConnectionState::Authenticating {
            return Err(Error::InvalidState("authenticate called out of order"));
        }
        let stream = self.stream.as_mut().expect("stream present while authenticating");
        let version = self.version.expect("version set by connect");

        let skip_result = matches!(self.pending_auth, PendingAuth::None) && version != Version::Rfb38;

        if let PendingAuth::Vnc { challenge } = self.pending_auth {
            let password = password.ok_or(Error::AuthAborted)?;
            let response = encrypt_challenge(password, &challenge);
            write_bytes(stream, &response)?;
            debug!("-> (DES-VNC response)");
        }

        if skip_result {
            self.state = ConnectionState::Initializing;
            return Ok(());
        }

        let result = SecurityResult::read_from(stream)?;
        debug!("<- SecurityResult::{:?}", result);
        match result {
            SecurityResult::Ok => {}
            SecurityResult::TooMany => return Err(Error::AuthTooMany),
            SecurityResult::Failed => {
                let reason = if version == Version::Rfb38 {
                    read_string(stream)?
                } else {
                    String::new()
                };
                return Err(Error::AuthFailed(reason));
            }
        }

        self.state = ConnectionState::Initializing;
        Ok(())
    }

    /// Sends `ClientInit`, reads `ServerInit`, requests the canonical pixel format
    /// and the preferred encoding list, and constructs the framebuffer. Must be
    /// called exactly once, after a successful `authenticate`.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != ConnectionState::Initializing {
            return Err(Error::InvalidState("initialize called out of order"));
        }
        let mut stream = self.stream.take().expect("stream present while initializing");

        let client_init = ClientInit { shared: true };
        debug!("-> {:?}", client_init);
        client_init.write_to(&mut stream)?;

        let server_init = ServerInit::read_from(&mut stream)?;
        debug!(
            "<- ServerInit {{ {}x{}, name: {:?} }}",
            server_init.framebuffer_width, server_init.framebuffer_height, server_init.name
        );
        self.name = server_init.name;

        let shared_state = Arc::new(SharedState::new(
            server_init.framebuffer_width,
            server_init.framebuffer_height,
        ));

        let reader_stream = stream.try_clone()?;
        let writer = Writer::new(Arc::new(Mutex::new(stream)));

        let canonical = PixelFormat::canonical_bgra();
        writer.set_pixel_format(canonical)?;
        writer.set_encodings(PREFERRED_ENCODINGS)?;

        self.shared_state = Some(shared_state);
        self.reader_stream = Some(reader_stream);
        self.writer = Some(writer);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Spawns the reader worker and issues the first full-screen
    /// `FramebufferUpdateRequest`. Returns the channel the caller polls for events.
    pub fn start_updates(&mut self) -> Result<Receiver<Event>> {
        if self.state != ConnectionState::Connected {
            return Err(Error::InvalidState("start_updates called before initialize"));
        }
        let reader_stream = self.reader_stream.take().expect("reader_stream set by initialize");
        let shared_state = self.shared_state.clone().expect("shared_state set by initialize");
        let writer = self.writer.clone().expect("writer set by initialize");

        let (width, height) = {
            let framebuffer = shared_state.framebuffer.lock().expect("framebuffer lock poisoned");
            (framebuffer.width(), framebuffer.height())
        };
        writer.request_update(false, 0, 0, width, height)?;

        let (tx, rx) = channel();
        let handle = reader::spawn(reader_stream, PixelFormat::canonical_bgra(), shared_state, writer, tx);
        self.reader_handle = Some(handle);
        Ok(rx)
    }

    /// Enqueues a `FramebufferUpdateRequest` covering the whole screen.
    pub fn request_screen_update(&self, full: bool) -> Result<()> {
        let writer = self.writer.as_ref().ok_or(Error::InvalidState("not connected"))?;
        let shared_state = self.shared_state.as_ref().ok_or(Error::InvalidState("not connected"))?;
        let (width, height) = {
            let framebuffer = shared_state.framebuffer.lock().expect("framebuffer lock poisoned");
            (framebuffer.width(), framebuffer.height())
        };
        writer.request_update(!full, 0, 0, width, height)
    }

    /// Sends a pointer event, unless view-only mode is suppressing input.
    pub fn write_pointer_event(&self, button_mask: u8, x: u16, y: u16) -> Result<()> {
        if self.view_only {
            return Ok(());
        }
        let writer = self.writer.as_ref().ok_or(Error::InvalidState("not connected"))?;
        writer.pointer_event(button_mask, x, y)
    }

    /// Sends a key press/release event, unless view-only mode is suppressing input.
    pub fn write_keyboard_event(&self, down: bool, keysym: u32) -> Result<()> {
        if self.view_only {
            return Ok(());
        }
        let writer = self.writer.as_ref().ok_or(Error::InvalidState("not connected"))?;
        writer.key_event(down, keysym)
    }

    /// Sends clipboard text to the server, unless view-only mode is suppressing input.
    pub fn write_client_cut_text(&self, text: &str) -> Result<()> {
        if self.view_only {
            return Ok(());
        }
        let writer = self.writer.as_ref().ok_or(Error::InvalidState("not connected"))?;
        writer.cut_text(text)
    }

    /// Toggles suppression of outgoing input events.
    pub fn set_input_mode(&mut self, view_only: bool) {
        self.view_only = view_only;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn shared_state(&self) -> Option<Arc<SharedState>> {
        self.shared_state.clone()
    }

    /// Tears the connection down. Idempotent: calling it again once the connection
    /// is already `Disconnected` is a no-op.
    pub fn disconnect(&mut self) -> Result<()> {
        if self.state == ConnectionState::Disconnected {
            return Ok(());
        }
        self.state = ConnectionState::Disconnecting;

        if let Some(stream) = &self.stream {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(reader_stream) = &self.reader_stream {
            let _ = reader_stream.shutdown(Shutdown::Both);
        }
        if let Some(writer) = self.writer.take() {
            writer.shutdown();
        }

        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.join();
        }

        self.state = ConnectionState::Disconnected;
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}
