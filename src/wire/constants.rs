/// Size of the fixed message header: magic (4) + command (12) + length (4) +
/// checksum (4).
pub const HEADER_SIZE: usize = 24;

/// Width of the zero-padded ASCII command field.
pub const COMMAND_SIZE: usize = 12;

/// Number of bytes of `SHA256(SHA256(payload))` kept in the header.
pub const CHECKSUM_SIZE: usize = 4;

/// Largest payload accepted when framing or reading a message.
///
/// Matches Bitcoin Core's `MAX_SIZE` (32 MiB) for serialized objects.
pub const MAX_PAYLOAD_SIZE: usize = 0x0200_0000;

/// Maximum number of bytes of the `version` sub-version string kept on read
/// and emitted on write. Longer strings are truncated.
pub const MAX_SUBVERSION_LENGTH: usize = 80;

/// Protocol version this crate advertises when it builds a `version` message.
///
/// The protocol version is defined in Bitcoin Core:
/// https://github.com/bitcoin/bitcoin/blob/707ad466968b947b364cfc25bcb4d6895e799418/src/node/protocol_version.h#L12
pub const PROTOCOL_VERSION: u32 = 70016;

/// Version number sent by a handful of 0.3.x era clients that really meant
/// protocol 300. Always rewritten to [`LEGACY_VERSION_NORMALIZED`] on read.
pub const LEGACY_VERSION_ALIAS: u32 = 10300;

pub const LEGACY_VERSION_NORMALIZED: u32 = 300;

/// From this version on, `version` carries `addr_from`, `nonce` and the
/// sub-version string.
pub const VERSION_SENDER_FIELDS: u32 = 106;

/// From this version on, `version` also carries the sender's starting height.
pub const VERSION_STARTING_HEIGHT: u32 = 209;

/// From this version on, endpoint records carry a 4-byte timestamp in front
/// of the services field (`CADDR_TIME_VERSION` in Bitcoin Core).
pub const ADDR_TIME_VERSION: u32 = 31402;
