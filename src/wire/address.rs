//! The endpoint record shared by `version` and `addr` payloads.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

use crate::error::Result;
use crate::wire::constants::ADDR_TIME_VERSION;
use crate::wire::primitives::{read_array, read_u16_be, read_u32, read_u64};

/// A peer endpoint as carried inside payloads.
///
/// Layout, for protocol version `v`:
///
/// ```text
/// u32      time      only when v >= 31402
/// u64      services
/// [u8; 16] ip        IPv6, or IPv4 mapped as ::ffff:a.b.c.d
/// u16 BE   port
/// ```
///
/// The address is kept as the raw 16-byte field so records survive a
/// decode/encode pass unchanged; [`NetAddr::socket_addr`] gives the
/// friendlier view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetAddr {
    /// Last-seen time. Not on the wire below [`ADDR_TIME_VERSION`], where it
    /// stays zero.
    pub time: u32,
    pub services: Services,
    pub ip: Ipv6Addr,
    pub port: u16,
}

impl Default for NetAddr {
    fn default() -> Self {
        NetAddr {
            time: 0,
            services: Services::NONE,
            ip: Ipv6Addr::UNSPECIFIED,
            port: 0,
        }
    }
}

impl NetAddr {
    pub fn new(addr: SocketAddr, services: Services) -> Self {
        let ip = match addr.ip() {
            IpAddr::V4(v4) => v4.to_ipv6_mapped(),
            IpAddr::V6(v6) => v6,
        };

        NetAddr {
            time: 0,
            services,
            ip,
            port: addr.port(),
        }
    }

    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    /// The endpoint as a socket address, unwrapping IPv4-mapped addresses.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = match self.ip.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(self.ip),
        };
        SocketAddr::new(ip, self.port)
    }

    /// Size of one record on the wire for `protocol_version`.
    pub const fn encoded_len(protocol_version: u32) -> usize {
        if protocol_version >= ADDR_TIME_VERSION {
            30
        } else {
            26
        }
    }

    pub fn decode(protocol_version: u32, p: &[u8], c: &mut usize) -> Result<Self> {
        let mut cursor = *c;

        let time = if protocol_version >= ADDR_TIME_VERSION {
            read_u32(p, &mut cursor, "net_addr: time")?
        } else {
            0
        };
        let services = Services::from(read_u64(p, &mut cursor, "net_addr: services")?);
        let ip = Ipv6Addr::from(read_array::<16>(p, &mut cursor, "net_addr: ip")?);
        let port = read_u16_be(p, &mut cursor, "net_addr: port")?;

        *c = cursor;
        Ok(NetAddr {
            time,
            services,
            ip,
            port,
        })
    }

    pub fn encode(&self, protocol_version: u32, out: &mut Vec<u8>) -> Result<()> {
        if protocol_version >= ADDR_TIME_VERSION {
            out.write_u32::<LittleEndian>(self.time)?;
        }
        out.write_u64::<LittleEndian>(self.services.bits())?;
        out.extend_from_slice(&self.ip.octets());
        out.write_u16::<BigEndian>(self.port)?;
        Ok(())
    }
}

/// Service flags advertised by a node.
///
/// This is a bitfield (`u64`) transmitted in `version` and in every
/// endpoint record. Unknown bits are preserved.
///
/// Official reference:
/// https://developer.bitcoin.org/reference/p2p_networking.html#version
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Services(u64);

impl Services {
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns true if all bits in `other` are set.
    pub const fn contains(self, other: Services) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Services) -> Services {
        Services(self.0 | other.0)
    }

    pub const NONE: Services = Services(0x00);

    /// Full node, can serve complete blocks.
    pub const NODE_NETWORK: Services = Services(0x01);

    /// Answers `getutxo` requests (BIP64).
    pub const NODE_GETUTXO: Services = Services(0x02);

    /// Supports bloom-filtered connections (BIP111).
    pub const NODE_BLOOM: Services = Services(0x04);

    /// Serves witness data (BIP144).
    pub const NODE_WITNESS: Services = Services(0x08);

    /// Serves at least the last 288 blocks (BIP159).
    pub const NODE_NETWORK_LIMITED: Services = Services(0x0400);

    const NAMED: [(Services, &'static str); 5] = [
        (Self::NODE_NETWORK, "NODE_NETWORK"),
        (Self::NODE_GETUTXO, "NODE_GETUTXO"),
        (Self::NODE_BLOOM, "NODE_BLOOM"),
        (Self::NODE_WITNESS, "NODE_WITNESS"),
        (Self::NODE_NETWORK_LIMITED, "NODE_NETWORK_LIMITED"),
    ];

    pub fn names(self) -> Vec<&'static str> {
        if self.is_empty() {
            return vec!["NONE"];
        }

        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl From<u64> for Services {
    fn from(value: u64) -> Self {
        Services::new(value)
    }
}

impl Debug for Services {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            return write!(f, "Services(NONE)");
        }

        write!(f, "Services({}) [0x{:016x}]", self.names().join(" | "), self.bits())
    }
}
