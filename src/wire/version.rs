//! The `version` handshake payload.
//!
//! Which fields are present depends on the version number carried at the
//! front of the payload itself:
//!
//! ```text
//! u32      version                 always
//! u64      services                always
//! i64      timestamp               always
//! net_addr addr_to                 always
//! net_addr addr_from               version >= 106
//! u64      nonce                   version >= 106
//! var_str  sub_version             version >= 106
//! u32      starting_height         version >= 209
//! ```
//!
//! Both endpoint records use the record format of that same version.

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{LittleEndian, WriteBytesExt};
use rand::Rng;

use crate::error::Result;
use crate::wire::address::{NetAddr, Services};
use crate::wire::constants::{
    LEGACY_VERSION_ALIAS, LEGACY_VERSION_NORMALIZED, MAX_SUBVERSION_LENGTH,
    VERSION_SENDER_FIELDS, VERSION_STARTING_HEIGHT,
};
use crate::wire::primitives::{
    read_bounded_bytes, read_i64, read_u32, read_u64, write_bounded_bytes,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMessage {
    pub version: u32,
    pub services: Services,
    pub timestamp: i64,
    pub addr_to: NetAddr,
    /// Present from version 106.
    pub sender: Option<VersionSender>,
    /// Present from version 209.
    pub starting_height: Option<u32>,
}

/// Fields introduced by protocol 106.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionSender {
    pub addr_from: NetAddr,
    /// Random value used to detect connections to ourselves.
    pub nonce: u64,
    /// Client software identifier, at most [`MAX_SUBVERSION_LENGTH`] bytes.
    ///
    /// Kept as the raw bytes the peer sent. Nothing forces it to be UTF-8,
    /// and the bound can split a multi-byte character.
    pub sub_version: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
enum FieldGroup {
    Sender,
    StartingHeight,
}

/// Optional field groups in wire order, keyed by the first version that
/// carries them. A group is only read when every group before it was.
const FIELD_GROUPS: [(u32, FieldGroup); 2] = [
    (VERSION_SENDER_FIELDS, FieldGroup::Sender),
    (VERSION_STARTING_HEIGHT, FieldGroup::StartingHeight),
];

impl VersionMessage {
    /// Builds an outgoing `version` stamped with the current time and a
    /// fresh random nonce.
    pub fn new(
        version: u32,
        services: Services,
        addr_to: NetAddr,
        addr_from: NetAddr,
        sub_version: impl Into<Vec<u8>>,
        starting_height: u32,
    ) -> Self {
        // A clock before 1970 is reported as 0 rather than refused.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        let nonce: u64 = rand::thread_rng().r#gen();

        VersionMessage {
            version,
            services,
            timestamp: now,
            addr_to,
            sender: Some(VersionSender {
                addr_from,
                nonce,
                sub_version: sub_version.into(),
            }),
            starting_height: Some(starting_height),
        }
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut c = 0;

        let mut version = read_u32(payload, &mut c, "version: version")?;
        if version == LEGACY_VERSION_ALIAS {
            version = LEGACY_VERSION_NORMALIZED;
        }

        let services = Services::from(read_u64(payload, &mut c, "version: services")?);
        let timestamp = read_i64(payload, &mut c, "version: timestamp")?;
        let addr_to = NetAddr::decode(version, payload, &mut c)?;

        let mut msg = VersionMessage {
            version,
            services,
            timestamp,
            addr_to,
            sender: None,
            starting_height: None,
        };

        for (min_version, group) in FIELD_GROUPS {
            if version < min_version {
                break;
            }

            match group {
                FieldGroup::Sender => {
                    let addr_from = NetAddr::decode(version, payload, &mut c)?;
                    let nonce = read_u64(payload, &mut c, "version: nonce")?;
                    let sub_version = read_bounded_bytes(
                        payload,
                        &mut c,
                        MAX_SUBVERSION_LENGTH,
                        "version: sub_version",
                    )?;

                    msg.sender = Some(VersionSender {
                        addr_from,
                        nonce,
                        sub_version,
                    });
                }
                FieldGroup::StartingHeight => {
                    msg.starting_height =
                        Some(read_u32(payload, &mut c, "version: starting_height")?);
                }
            }
        }

        // Later additions (the BIP37 relay flag) are left unread.
        Ok(msg)
    }

    /// Serializes every field regardless of `version`.
    ///
    /// Groups that are absent are written as zero values, so a message
    /// decoded from a pre-106 peer re-encodes longer than it arrived.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::with_capacity(128);

        payload.write_u32::<LittleEndian>(self.version)?;
        payload.write_u64::<LittleEndian>(self.services.bits())?;
        payload.write_i64::<LittleEndian>(self.timestamp)?;
        self.addr_to.encode(self.version, &mut payload)?;

        let default_sender = VersionSender::default();
        let sender = self.sender.as_ref().unwrap_or(&default_sender);

        sender.addr_from.encode(self.version, &mut payload)?;
        payload.write_u64::<LittleEndian>(sender.nonce)?;
        write_bounded_bytes(&sender.sub_version, MAX_SUBVERSION_LENGTH, &mut payload);
        payload.write_u32::<LittleEndian>(self.starting_height.unwrap_or(0))?;

        Ok(payload)
    }

    pub fn addr_from(&self) -> Option<&NetAddr> {
        self.sender.as_ref().map(|s| &s.addr_from)
    }

    pub fn nonce(&self) -> Option<u64> {
        self.sender.as_ref().map(|s| s.nonce)
    }

    pub fn sub_version(&self) -> Option<&[u8]> {
        self.sender.as_ref().map(|s| s.sub_version.as_slice())
    }

    /// Sub-version for display, with invalid UTF-8 replaced by U+FFFD.
    pub fn sub_version_lossy(&self) -> Option<Cow<'_, str>> {
        self.sub_version().map(String::from_utf8_lossy)
    }
}

pub fn deserialize_version(payload: &[u8]) -> Result<VersionMessage> {
    VersionMessage::decode(payload)
}

pub fn serialize_version(msg: &VersionMessage) -> Result<Vec<u8>> {
    msg.encode()
}

/// The version both sides speak: the lower of the two.
pub fn negotiate_version(ours: u32, theirs: u32) -> u32 {
    ours.min(theirs)
}
