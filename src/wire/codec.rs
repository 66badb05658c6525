use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::error::{Result, WireError};
use crate::wire::config::FrameLimits;
use crate::wire::constants::HEADER_SIZE;
use crate::wire::header::MessageHeader;
use crate::wire::message::{Message, frame};

/// Reads one message frame from any [`Read`] source.
///
/// This function:
/// 1. Reads the 24-byte message header
/// 2. Rejects a declared length above `limits.max_payload` before
///    allocating for it
/// 3. Reads the payload according to the length field
/// 4. Checks magic and checksum as configured in `limits`
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use btc_wire::wire::{self, FrameLimits};
///
/// let bytes = wire::frame([0xF9, 0xBE, 0xB4, 0xD9], "verack", &[]).unwrap();
/// let mut cursor = Cursor::new(bytes);
///
/// let msg = wire::read_message(&mut cursor, &FrameLimits::default()).unwrap();
/// assert_eq!(msg.header.command_name(), "verack");
/// assert!(msg.payload.is_empty());
/// ```
pub fn read_message<R: Read>(reader: &mut R, limits: &FrameLimits) -> Result<Message> {
    let mut raw = [0u8; HEADER_SIZE];
    reader.read_exact(&mut raw)?;

    let header = MessageHeader::parse(&raw)?;
    let len = header.data_len as usize;

    if len > limits.max_payload {
        debug!(
            command = header.command_name(),
            len,
            max = limits.max_payload,
            "rejecting oversized frame"
        );
        return Err(WireError::PayloadTooLarge {
            len,
            max: limits.max_payload,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    let msg = Message { header, payload };

    if limits.verify_checksum {
        msg.verify(limits.magic)?;
    } else if let Some(expected) = limits.magic.expected() {
        if msg.header.magic != expected {
            return Err(WireError::MagicMismatch {
                expected,
                found: msg.header.magic,
            });
        }
    }

    trace!(command = msg.header.command_name(), len, "read frame");
    Ok(msg)
}

/// Frames `payload` and writes it to `writer` in one call.
///
/// # Errors
///
/// Returns an error if the payload is too large or writing to the
/// underlying stream fails.
pub fn send_message<W: Write>(
    writer: &mut W,
    magic: [u8; 4],
    command: &str,
    payload: &[u8],
) -> Result<()> {
    let bytes = frame(magic, command, payload)?;
    writer.write_all(&bytes)?;

    trace!(command, len = payload.len(), "sent frame");
    Ok(())
}
