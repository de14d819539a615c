//! Headless demo: connects, authenticates, logs every event. No GUI; this exists to
//! exercise the public API end to end, not to display anything.

use clap::Parser;

#[derive(Parser)]
#[command(about = "Connect to a VNC server and log the events it sends")]
struct Args {
    /// Host to connect to.
    host: String,

    /// X display number; the actual port dialed is `port + display`.
    #[arg(long, default_value_t = 0)]
    display: u16,

    /// VNC base port.
    #[arg(long, default_value_t = 5900)]
    port: u16,

    /// Don't send any input events.
    #[arg(long)]
    view_only: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(error) = run(&args) {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> vnc::Result<()> {
    let (mut client, needs_password) = vnc::Client::connect(&args.host, args.display, args.port, args.view_only)?;

    let password = if needs_password {
        let prompt = format!("Password for {}: ", args.host);
        rpassword::prompt_password(prompt).ok().map(|s| s.into_bytes())
    } else {
        None
    };

    client.authenticate(password.as_deref())?;

    client.initialize()?;
    println!("connected to {:?}", client.name());

    let events = client.start_updates()?;
    for event in events {
        match event {
            vnc::Event::FramebufferUpdated { x, y, width, height } => {
                println!("framebuffer update: {}x{} at ({}, {})", width, height, x, y);
            }
            vnc::Event::SetColourMap { first_colour, colours } => {
                println!("colour map update: {} entries from {}", colours.len(), first_colour);
            }
            vnc::Event::Bell => println!("bell"),
            vnc::Event::ServerCutText(text) => println!("clipboard: {:?}", text),
            vnc::Event::ConnectionLost(reason) => {
                match reason {
                    Some(reason) => println!("connection lost: {}", reason),
                    None => println!("connection closed"),
                }
                break;
            }
        }
    }

    client.disconnect()
}
