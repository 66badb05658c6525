//! Bitcoin P2P wire protocol framing and handshake payloads.
//!
//! This module implements:
//! - Parsing of the 24-byte message header
//! - The double-SHA256 payload checksum and frame validation
//! - Building complete outgoing frames
//! - The version-gated `version` payload
//! - The `addr` endpoint list payload
//! - Frame reading and writing over any `Read`/`Write`
//!
//! Choosing which payload codec to run for a given command is left to the
//! caller; [`MessageHeader::command`] is there to help.
//!
//! Protocol reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html
pub mod address;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod constants;
pub mod header;
pub mod message;
pub mod primitives;

pub mod addr;
pub mod version;

pub use addr::{AddrList, encode_addr_list};
pub use address::{NetAddr, Services};
pub use checksum::checksum;
pub use codec::{read_message, send_message};
pub use config::{FrameLimits, MagicCheck, Network};
pub use header::{Command, MessageHeader};
pub use message::{Message, frame, message_valid};
pub use version::{VersionMessage, VersionSender, negotiate_version};

/// Parses the fixed header at the front of `bytes`.
pub fn parse_header(bytes: &[u8]) -> crate::error::Result<MessageHeader> {
    MessageHeader::parse(bytes)
}
