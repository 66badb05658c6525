use std::fmt;

use crate::error::{Result, WireError};
use crate::wire::constants::{CHECKSUM_SIZE, COMMAND_SIZE, HEADER_SIZE};

/// The fixed 24-byte header in front of every message.
///
/// ```text
/// +------------+--------------+---------------+------------+
/// | magic (4)  | command (12) | length (4 LE) | checksum(4)|
/// +------------+--------------+---------------+------------+
/// ```
///
/// `data_len` is held in native order. Nothing here checks it against the
/// payload that follows; see [`crate::wire::Message::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub magic: [u8; 4],
    pub command: [u8; COMMAND_SIZE],
    pub data_len: u32,
    pub checksum: [u8; CHECKSUM_SIZE],
}

impl MessageHeader {
    /// Parses the header from the start of `bytes`.
    ///
    /// Only the first 24 bytes are looked at; anything after them is left
    /// for the payload reader.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let header: &[u8; HEADER_SIZE] = bytes
            .get(..HEADER_SIZE)
            .and_then(|h| h.try_into().ok())
            .ok_or(WireError::ShortHeader { len: bytes.len() })?;

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);

        let mut command = [0u8; COMMAND_SIZE];
        command.copy_from_slice(&header[4..16]);

        let mut data_len = [0u8; 4];
        data_len.copy_from_slice(&header[16..20]);

        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&header[20..24]);

        Ok(MessageHeader {
            magic,
            command,
            data_len: u32::from_le_bytes(data_len),
            checksum,
        })
    }

    /// Serializes the header back to its wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.magic);
        out[4..16].copy_from_slice(&self.command);
        out[16..20].copy_from_slice(&self.data_len.to_le_bytes());
        out[20..24].copy_from_slice(&self.checksum);
        out
    }

    /// The command with its zero padding stripped.
    ///
    /// A 12-character command has no terminator at all, so the whole field
    /// is used. A field that is not a well-formed name yields an empty one.
    pub fn command_name(&self) -> &str {
        parse_command(&self.command).unwrap_or("")
    }

    pub fn command(&self) -> Command {
        Command::from(&self.command)
    }
}

/// Reads the name out of a 12-byte command field.
///
/// The name runs up to the first NUL and must be printable ASCII. Every byte
/// after that NUL must be zero as well, so `ping\0xyz` is not `ping`.
fn parse_command(field: &[u8; COMMAND_SIZE]) -> Option<&str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(COMMAND_SIZE);
    let (name, padding) = field.split_at(end);

    if !name.iter().all(|b| (b' '..=b'~').contains(b)) || padding.iter().any(|&b| b != 0) {
        return None;
    }
    std::str::from_utf8(name).ok()
}

/// Pads or truncates a command name into the 12-byte header field.
///
/// Names longer than 12 bytes are cut silently, as peers do.
pub fn command_bytes(name: &str) -> [u8; COMMAND_SIZE] {
    let name = name.as_bytes();
    let len = name.len().min(COMMAND_SIZE);

    let mut padded = [0u8; COMMAND_SIZE];
    padded[..len].copy_from_slice(&name[..len]);
    padded
}

/// Commands whose payloads this crate knows about, plus the keep-alive pair
/// callers need to answer during a handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Version,
    Verack,
    Addr,
    GetAddr,
    Ping,
    Pong,
    Unknown,
}

impl From<&[u8; COMMAND_SIZE]> for Command {
    fn from(bytes: &[u8; COMMAND_SIZE]) -> Self {
        match parse_command(bytes).unwrap_or("") {
            "version" => Command::Version,
            "verack" => Command::Verack,
            "addr" => Command::Addr,
            "getaddr" => Command::GetAddr,
            "ping" => Command::Ping,
            "pong" => Command::Pong,
            _ => Command::Unknown,
        }
    }
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Version => "version",
            Command::Verack => "verack",
            Command::Addr => "addr",
            Command::GetAddr => "getaddr",
            Command::Ping => "ping",
            Command::Pong => "pong",
            Command::Unknown => "",
        }
    }

    /// Returns the 12-byte command field.
    pub fn as_bytes(&self) -> [u8; COMMAND_SIZE] {
        command_bytes(self.as_str())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Unknown => f.write_str("<unknown>"),
            known => f.write_str(known.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(cmd: &[u8], len: u32, checksum: [u8; 4]) -> Vec<u8> {
        let mut bytes = vec![0xF9, 0xBE, 0xB4, 0xD9];
        let mut padded = [0u8; 12];
        padded[..cmd.len()].copy_from_slice(cmd);
        bytes.extend_from_slice(&padded);
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&checksum);
        bytes
    }

    #[test]
    fn parse_reads_all_fields() {
        let bytes = header_bytes(b"version", 0x0102_0304, [1, 2, 3, 4]);
        let header = MessageHeader::parse(&bytes).unwrap();

        assert_eq!(header.magic, [0xF9, 0xBE, 0xB4, 0xD9]);
        assert_eq!(header.command_name(), "version");
        assert_eq!(header.command(), Command::Version);
        assert_eq!(header.data_len, 0x0102_0304);
        assert_eq!(header.checksum, [1, 2, 3, 4]);
    }

    #[test]
    fn parse_ignores_trailing_payload() {
        let mut bytes = header_bytes(b"ping", 8, [0; 4]);
        bytes.extend_from_slice(&[0xAA; 8]);

        let header = MessageHeader::parse(&bytes).unwrap();
        assert_eq!(header.data_len, 8);
        assert_eq!(header.to_bytes().as_slice(), &bytes[..24]);
    }

    #[test]
    fn parse_rejects_short_input() {
        let bytes = header_bytes(b"verack", 0, [0; 4]);
        let err = MessageHeader::parse(&bytes[..23]).unwrap_err();
        assert!(matches!(err, WireError::ShortHeader { len: 23 }));
        assert!(MessageHeader::parse(&[]).is_err());
    }

    #[test]
    fn twelve_character_command_has_no_terminator() {
        let bytes = header_bytes(b"sendaddrv2xx", 0, [0; 4]);
        let header = MessageHeader::parse(&bytes).unwrap();
        assert_eq!(header.command_name(), "sendaddrv2xx");
        assert_eq!(header.command(), Command::Unknown);
    }

    #[test]
    fn bytes_after_the_terminator_must_be_zero() {
        let bytes = header_bytes(b"ping\0xyz", 0, [0; 4]);
        let header = MessageHeader::parse(&bytes).unwrap();

        assert_eq!(header.command_name(), "");
        assert_eq!(header.command(), Command::Unknown);
        assert_eq!(header.command_name(), header.command().as_str());
    }

    #[test]
    fn non_printable_command_is_unknown() {
        let bytes = header_bytes(b"pi\x01g", 0, [0; 4]);
        let header = MessageHeader::parse(&bytes).unwrap();

        assert_eq!(header.command_name(), "");
        assert_eq!(header.command(), Command::Unknown);
    }

    #[test]
    fn command_name_and_command_agree_on_padded_names() {
        let bytes = header_bytes(b"ping", 0, [0; 4]);
        let header = MessageHeader::parse(&bytes).unwrap();

        assert_eq!(header.command_name(), "ping");
        assert_eq!(header.command(), Command::Ping);
    }

    #[test]
    fn command_bytes_pads_and_truncates() {
        assert_eq!(&command_bytes("ping")[..5], b"ping\0");
        assert_eq!(&command_bytes("averyverylongcommand"), b"averyverylon");
        assert_eq!(Command::Addr.as_bytes(), command_bytes("addr"));
    }
}
