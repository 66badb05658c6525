//! Network selection and the knobs applied when frames come off a stream.

use std::fmt;
use std::str::FromStr;

use crate::wire::constants::MAX_PAYLOAD_SIZE;

/// Networks that share this wire format, identified by their magic value.
///
/// The first 4 bytes of every message identify the network and act as a
/// message boundary marker in the stream. You can see how Bitcoin Core maps
/// magic values to networks in `GetNetworkForMagic`:
/// https://github.com/bitcoin/bitcoin/blob/master/src/kernel/chainparams.cpp#L703-L723
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet3,
    Regtest,
    Signet,
}

impl Network {
    /// Magic bytes in wire order.
    pub const fn magic(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0xF9, 0xBE, 0xB4, 0xD9],
            Network::Testnet3 => [0x0B, 0x11, 0x09, 0x07],
            Network::Regtest => [0xFA, 0xBF, 0xB5, 0xDA],
            Network::Signet => [0x0A, 0x03, 0xCF, 0x40],
        }
    }

    pub fn from_magic(magic: [u8; 4]) -> Option<Self> {
        [
            Network::Mainnet,
            Network::Testnet3,
            Network::Regtest,
            Network::Signet,
        ]
        .into_iter()
        .find(|n| n.magic() == magic)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet3 => "testnet3",
            Network::Regtest => "regtest",
            Network::Signet => "signet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet3" | "testnet" | "test" => Ok(Network::Testnet3),
            "regtest" => Ok(Network::Regtest),
            "signet" => Ok(Network::Signet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Whether the header's magic has to match a specific network.
///
/// Disabled by default: frames from any network are accepted and the magic
/// is passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagicCheck {
    #[default]
    Disabled,
    Require(Network),
}

impl MagicCheck {
    pub fn expected(self) -> Option<[u8; 4]> {
        match self {
            MagicCheck::Disabled => None,
            MagicCheck::Require(network) => Some(network.magic()),
        }
    }
}

/// Limits applied by [`crate::wire::codec::read_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLimits {
    /// Frames declaring a longer payload are rejected before any allocation.
    pub max_payload: usize,
    pub magic: MagicCheck,
    pub verify_checksum: bool,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_payload: MAX_PAYLOAD_SIZE,
            magic: MagicCheck::Disabled,
            verify_checksum: true,
        }
    }
}

impl FrameLimits {
    pub fn for_network(network: Network) -> Self {
        Self {
            magic: MagicCheck::Require(network),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_round_trips_through_network() {
        for network in [
            Network::Mainnet,
            Network::Testnet3,
            Network::Regtest,
            Network::Signet,
        ] {
            assert_eq!(Network::from_magic(network.magic()), Some(network));
            assert_eq!(network.name().parse::<Network>(), Ok(network));
        }
        assert_eq!(Network::from_magic([0, 0, 0, 0]), None);
    }

    #[test]
    fn network_parsing_accepts_aliases() {
        assert_eq!("MAIN".parse::<Network>(), Ok(Network::Mainnet));
        assert_eq!("testnet".parse::<Network>(), Ok(Network::Testnet3));
        assert!("litecoin".parse::<Network>().is_err());
    }

    #[test]
    fn default_limits_skip_magic_but_verify_checksum() {
        let limits = FrameLimits::default();
        assert_eq!(limits.magic, MagicCheck::Disabled);
        assert_eq!(limits.magic.expected(), None);
        assert!(limits.verify_checksum);
        assert_eq!(limits.max_payload, MAX_PAYLOAD_SIZE);

        let strict = FrameLimits::for_network(Network::Regtest);
        assert_eq!(strict.magic.expected(), Some([0xFA, 0xBF, 0xB5, 0xDA]));
    }
}
