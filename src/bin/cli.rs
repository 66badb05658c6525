use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::Cursor;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use btc_wire::wire::constants::PROTOCOL_VERSION;
use btc_wire::wire::{
    self, AddrList, Command, FrameLimits, MagicCheck, Message, NetAddr, Network, Services,
    VersionMessage, negotiate_version,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "btc-wire", about = "Build and inspect Bitcoin P2P message frames")]
struct Cli {
    /// Default log filter when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Frame a raw payload and print the message as hex.
    Frame {
        #[arg(long, default_value = "mainnet")]
        network: Network,
        #[arg(long)]
        command: String,
        /// Payload as hex; empty when omitted.
        #[arg(long, default_value = "")]
        payload: String,
    },
    /// Parse one or more hex-encoded frames and decode known payloads.
    Inspect {
        hex: String,
        /// Reject frames whose magic does not belong to this network.
        #[arg(long)]
        network: Option<Network>,
        /// Protocol version used for `addr` record layout, lowered to the
        /// peer's once a `version` frame has been seen.
        #[arg(long, default_value_t = PROTOCOL_VERSION)]
        protocol_version: u32,
    },
    /// Build a framed `version` message.
    ///
    /// Both endpoints use the address record layout of --protocol-version,
    /// so from 31402 on (including the default) each carries a 4-byte time
    /// prefix. Bitcoin Core never sends that prefix inside `version` and will
    /// misread such a message; pass --protocol-version 31401 or lower to
    /// produce 26-byte endpoints.
    Version {
        #[arg(long, default_value = "mainnet")]
        network: Network,
        /// Version number written into the payload. At 31402 and above the
        /// endpoints carry a time prefix that Bitcoin Core does not expect.
        #[arg(long, default_value_t = PROTOCOL_VERSION)]
        protocol_version: u32,
        #[arg(long, default_value_t = 0)]
        services: u64,
        #[arg(long, default_value = "127.0.0.1:8333")]
        to: SocketAddr,
        #[arg(long, default_value = "0.0.0.0:0")]
        from: SocketAddr,
        #[arg(long, default_value = "/btc-wire:0.1.0/")]
        user_agent: String,
        #[arg(long, default_value_t = 0)]
        height: u32,
    },
    /// Build a framed `addr` message from endpoints.
    Addr {
        #[arg(long, default_value = "mainnet")]
        network: Network,
        #[arg(long, default_value_t = PROTOCOL_VERSION)]
        protocol_version: u32,
        #[arg(long, default_value_t = 1)]
        services: u64,
        peers: Vec<SocketAddr>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Frame {
            network,
            command,
            payload,
        } => {
            let payload = hex::decode(payload.trim())?;
            let bytes = wire::frame(network.magic(), &command, &payload)?;
            println!("{}", hex::encode(bytes));
        }
        Commands::Inspect {
            hex,
            network,
            protocol_version,
        } => inspect(&hex, network, protocol_version)?,
        Commands::Version {
            network,
            protocol_version,
            services,
            to,
            from,
            user_agent,
            height,
        } => {
            let services = Services::from(services);
            let msg = VersionMessage::new(
                protocol_version,
                services,
                NetAddr::new(to, Services::NONE),
                NetAddr::new(from, services),
                user_agent,
                height,
            );
            debug!(?msg, "built version");

            let bytes = wire::frame(network.magic(), Command::Version.as_str(), &msg.encode()?)?;
            println!("{}", hex::encode(bytes));
        }
        Commands::Addr {
            network,
            protocol_version,
            services,
            peers,
        } => {
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as u32;
            let list: AddrList = peers
                .into_iter()
                .map(|peer| NetAddr::new(peer, Services::from(services)).with_time(now))
                .collect();
            info!(count = list.len(), "built addr list");

            let payload = list.encode(protocol_version)?;
            let bytes = wire::frame(network.magic(), Command::Addr.as_str(), &payload)?;
            println!("{}", hex::encode(bytes));
        }
    }

    Ok(())
}

fn inspect(hex_frames: &str, network: Option<Network>, addr_version: u32) -> Result<(), Box<dyn Error>> {
    let bytes = hex::decode(hex_frames.trim())?;
    let total = bytes.len() as u64;
    let mut cursor = Cursor::new(bytes);

    // Read everything, then report checksum and magic per frame.
    let limits = FrameLimits {
        verify_checksum: false,
        ..FrameLimits::default()
    };
    let magic = network.map_or(MagicCheck::Disabled, MagicCheck::Require);

    // A `version` frame lowers the layout used for the `addr` frames after it.
    let mut addr_version = addr_version;
    while cursor.position() < total {
        let msg = wire::read_message(&mut cursor, &limits)?;
        if let Some(theirs) = report(&msg, magic, addr_version) {
            addr_version = negotiate_version(addr_version, theirs);
            debug!(addr_version, "negotiated version");
        }
    }

    Ok(())
}

/// Prints one frame. Returns the peer's version when the frame is a
/// decodable `version`.
fn report(msg: &Message, magic: MagicCheck, addr_version: u32) -> Option<u32> {
    let header = &msg.header;
    let network = Network::from_magic(header.magic)
        .map(|n| n.name().to_string())
        .unwrap_or_else(|| hex::encode(header.magic));

    println!(
        "{} network={} len={} checksum={}",
        header.command_name(),
        network,
        header.data_len,
        hex::encode(header.checksum)
    );

    if let Err(e) = msg.verify(magic) {
        warn!(error = %e, "frame failed validation");
        println!("  invalid: {e}");
        return None;
    }

    match header.command() {
        Command::Version => match VersionMessage::decode(&msg.payload) {
            Ok(v) => {
                println!("  version={} services={:?}", v.version, v.services);
                println!("  timestamp={} addr_to={}", v.timestamp, v.addr_to.socket_addr());
                if let (Some(sender), Some(sub_version)) = (&v.sender, v.sub_version_lossy()) {
                    println!(
                        "  addr_from={} nonce={:#018x} sub_version={:?}",
                        sender.addr_from.socket_addr(),
                        sender.nonce,
                        sub_version
                    );
                }
                if let Some(height) = v.starting_height {
                    println!("  starting_height={height}");
                }
                return Some(v.version);
            }
            Err(e) => println!("  undecodable version payload: {e}"),
        },
        Command::Addr => match AddrList::decode(addr_version, &msg.payload) {
            Ok(list) => {
                println!("  {} peers", list.len());
                for addr in &list {
                    println!("    {} time={} {:?}", addr.socket_addr(), addr.time, addr.services);
                }
            }
            Err(e) => println!("  undecodable addr payload: {e}"),
        },
        _ if msg.payload.is_empty() => {}
        _ => println!("  payload={}", hex::encode(&msg.payload)),
    }

    None
}
