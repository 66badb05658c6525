use tracing::trace;

use crate::error::{Result, WireError};
use crate::wire::checksum::checksum;
use crate::wire::config::MagicCheck;
use crate::wire::constants::{HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::wire::header::{MessageHeader, command_bytes};

/// A message frame as transmitted on the wire: header plus payload.
///
/// A `Message` read off a stream has not necessarily been checked yet.
/// Validity is derived on demand through [`Message::is_valid`] or
/// [`Message::verify`]; it is never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

impl Message {
    /// Builds an outgoing message with a correct length and checksum.
    pub fn new(magic: [u8; 4], command: &str, payload: Vec<u8>) -> Result<Self> {
        let data_len = payload_len(&payload)?;

        Ok(Message {
            header: MessageHeader {
                magic,
                command: command_bytes(command),
                data_len,
                checksum: checksum(&payload),
            },
            payload,
        })
    }

    /// Splits a complete frame into header and payload.
    ///
    /// The payload is taken as everything after the header; whether it
    /// agrees with `data_len` is left to [`Message::verify`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = MessageHeader::parse(bytes)?;

        Ok(Message {
            header,
            payload: bytes[HEADER_SIZE..].to_vec(),
        })
    }

    /// True when the payload matches the length and checksum in the header.
    ///
    /// The network magic is not looked at; use [`Message::verify`] with
    /// [`MagicCheck::Require`] for that.
    pub fn is_valid(&self) -> bool {
        self.verify(MagicCheck::Disabled).is_ok()
    }

    /// Like [`Message::is_valid`], but reports which check failed.
    pub fn verify(&self, magic: MagicCheck) -> Result<()> {
        if let Some(expected) = magic.expected() {
            if self.header.magic != expected {
                trace!(found = %hex::encode(self.header.magic), "magic mismatch");
                return Err(WireError::MagicMismatch {
                    expected,
                    found: self.header.magic,
                });
            }
        }

        let declared = self.header.data_len;
        if self.payload.len() != declared as usize {
            return Err(WireError::PayloadLength {
                declared,
                actual: self.payload.len(),
            });
        }

        let actual = checksum(&self.payload);
        if actual != self.header.checksum {
            trace!(command = self.header.command_name(), "checksum mismatch");
            return Err(WireError::ChecksumMismatch {
                expected: self.header.checksum,
                actual,
            });
        }

        Ok(())
    }

    /// Serializes the frame exactly as held, without recomputing anything.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Null-safe form of [`Message::is_valid`]: a missing message is invalid.
pub fn message_valid(msg: Option<&Message>) -> bool {
    msg.is_some_and(Message::is_valid)
}

/// Builds a complete frame ready for the transport.
///
/// ```text
/// magic (4) | command (12, zero padded) | length (4 LE) | checksum (4) | payload
/// ```
///
/// The magic is copied through untouched. A command longer than 12 bytes is
/// truncated. The payload bytes are only appended when there are any, so an
/// empty payload yields a bare 24-byte header.
///
/// # Errors
///
/// Returns [`WireError::PayloadTooLarge`] for payloads above
/// [`MAX_PAYLOAD_SIZE`].
pub fn frame(magic: [u8; 4], command: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let header = MessageHeader {
        magic,
        command: command_bytes(command),
        data_len: payload_len(payload)?,
        checksum: checksum(payload),
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());

    if !payload.is_empty() {
        out.extend_from_slice(payload);
    }

    Ok(out)
}

fn payload_len(payload: &[u8]) -> Result<u32> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(WireError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    // MAX_PAYLOAD_SIZE fits in a u32.
    Ok(payload.len() as u32)
}
