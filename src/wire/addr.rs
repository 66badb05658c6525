//! The `addr` payload: a CompactSize count followed by that many endpoint
//! records.

use crate::error::Result;
use crate::wire::address::NetAddr;
use crate::wire::primitives::{read_varint, write_varint};

/// Owned list of endpoint records, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddrList {
    addrs: Vec<NetAddr>,
}

impl AddrList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, addr: NetAddr) {
        self.addrs.push(addr);
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NetAddr> {
        self.addrs.iter()
    }

    pub fn as_slice(&self) -> &[NetAddr] {
        &self.addrs
    }

    pub fn into_vec(self) -> Vec<NetAddr> {
        self.addrs
    }

    /// Drops every record and the backing storage. Calling it again, or on
    /// a list that never held anything, is a no-op.
    pub fn release(&mut self) {
        self.addrs = Vec::new();
    }

    /// Decodes an `addr` payload using the record layout of
    /// `protocol_version`.
    ///
    /// Either every declared record decodes or the whole call fails; records
    /// read before the failure are dropped with the error.
    pub fn decode(protocol_version: u32, payload: &[u8]) -> Result<Self> {
        let mut c = 0;
        let count = read_varint(payload, &mut c, "addr: count")?;

        // Never reserve more than the remaining bytes could hold.
        let fits = (payload.len() - c) / NetAddr::encoded_len(protocol_version);
        let capacity = usize::try_from(count).map_or(fits, |n| n.min(fits));
        let mut addrs = Vec::with_capacity(capacity);

        for _ in 0..count {
            addrs.push(NetAddr::decode(protocol_version, payload, &mut c)?);
        }

        Ok(AddrList { addrs })
    }

    pub fn encode(&self, protocol_version: u32) -> Result<Vec<u8>> {
        let mut payload =
            Vec::with_capacity(9 + self.addrs.len() * NetAddr::encoded_len(protocol_version));

        write_varint(self.addrs.len() as u64, &mut payload);
        for addr in &self.addrs {
            addr.encode(protocol_version, &mut payload)?;
        }

        Ok(payload)
    }
}

impl From<Vec<NetAddr>> for AddrList {
    fn from(addrs: Vec<NetAddr>) -> Self {
        AddrList { addrs }
    }
}

impl FromIterator<NetAddr> for AddrList {
    fn from_iter<I: IntoIterator<Item = NetAddr>>(iter: I) -> Self {
        AddrList {
            addrs: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AddrList {
    type Item = &'a NetAddr;
    type IntoIter = std::slice::Iter<'a, NetAddr>;

    fn into_iter(self) -> Self::IntoIter {
        self.addrs.iter()
    }
}

/// Encodes an optional list; `None` is written as an empty list.
pub fn encode_addr_list(protocol_version: u32, list: Option<&AddrList>) -> Result<Vec<u8>> {
    match list {
        Some(list) => list.encode(protocol_version),
        None => {
            let mut payload = Vec::with_capacity(1);
            write_varint(0, &mut payload);
            Ok(payload)
        }
    }
}

pub fn deserialize_addr_list(protocol_version: u32, payload: &[u8]) -> Result<AddrList> {
    AddrList::decode(protocol_version, payload)
}

pub fn serialize_addr_list(protocol_version: u32, list: Option<&AddrList>) -> Result<Vec<u8>> {
    encode_addr_list(protocol_version, list)
}
