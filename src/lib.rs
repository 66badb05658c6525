//! Message framing and handshake payload codec for the Bitcoin P2P protocol.
//!
//! Raw bytes from a peer go through [`wire::MessageHeader::parse`], are
//! checked with [`wire::Message::is_valid`], and the payload is handed to
//! [`wire::VersionMessage`] or [`wire::AddrList`]. Outgoing payloads are
//! wrapped with [`wire::frame`].
pub mod error;
pub mod wire;

pub use error::{Result, WireError};
