//! End-to-end checks across header parsing, checksums and payload codecs.

#![allow(clippy::unwrap_used)]

use std::io::Cursor;

use btc_wire::WireError;
use btc_wire::wire::constants::{HEADER_SIZE, PROTOCOL_VERSION};
use btc_wire::wire::{
    self, AddrList, Command, FrameLimits, Message, NetAddr, Network, Services, VersionMessage,
    checksum, parse_header,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_frame_parses_back_valid(
        magic in any::<[u8; 4]>(),
        command in "[a-z]{1,12}",
        payload in prop::collection::vec(any::<u8>(), 0..4096),
    ) {
        let bytes = wire::frame(magic, &command, &payload).unwrap();
        let header = parse_header(&bytes).unwrap();

        prop_assert_eq!(header.magic, magic);
        prop_assert_eq!(header.command_name(), command.as_str());
        prop_assert_eq!(header.data_len as usize, payload.len());
        prop_assert_eq!(bytes.len(), HEADER_SIZE + payload.len());

        let msg = Message { header, payload: bytes[HEADER_SIZE..].to_vec() };
        prop_assert!(msg.is_valid());
    }
}

proptest! {
    #[test]
    fn prop_checksum_deterministic_and_distinguishing(
        a in prop::collection::vec(any::<u8>(), 0..512),
        b in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        prop_assert_eq!(checksum(&a), checksum(&a));
        if a != b {
            prop_assert_ne!(checksum(&a), checksum(&b));
        }
    }
}

proptest! {
    #[test]
    fn prop_long_commands_never_spill_into_length(
        command in "[a-z]{13,40}",
        payload in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let bytes = wire::frame(Network::Mainnet.magic(), &command, &payload).unwrap();
        let header = parse_header(&bytes).unwrap();

        prop_assert_eq!(&header.command[..], &command.as_bytes()[..12]);
        prop_assert_eq!(header.data_len as usize, payload.len());
    }
}

proptest! {
    #[test]
    fn prop_addr_list_failure_is_all_or_nothing(count in 1usize..20, cut in 1usize..30) {
        let list: AddrList = (0..count)
            .map(|i| NetAddr::new(format!("10.0.0.{i}:8333").parse().unwrap(), Services::NODE_NETWORK))
            .collect();
        let mut payload = list.encode(PROTOCOL_VERSION).unwrap();
        payload.truncate(payload.len() - cut);

        prop_assert!(AddrList::decode(PROTOCOL_VERSION, &payload).is_err());
    }
}

#[test]
fn empty_ping_frame() {
    let bytes = wire::frame(Network::Mainnet.magic(), "ping", &[]).unwrap();

    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[20..24], &checksum(b""));
    assert_eq!(hex::encode(&bytes[20..24]), "5df6e0e2");
}

#[test]
fn version_exchange_over_a_stream() {
    let to = NetAddr::new("198.51.100.4:8333".parse().unwrap(), Services::NODE_NETWORK);
    let from = NetAddr::new("0.0.0.0:0".parse().unwrap(), Services::NONE);
    let ours = VersionMessage::new(PROTOCOL_VERSION, Services::NONE, to, from, "/btc-wire/", 0);

    let mut stream = Vec::new();
    wire::send_message(
        &mut stream,
        Network::Regtest.magic(),
        Command::Version.as_str(),
        &ours.encode().unwrap(),
    )
    .unwrap();
    wire::send_message(&mut stream, Network::Regtest.magic(), "verack", &[]).unwrap();

    let limits = FrameLimits::for_network(Network::Regtest);
    let mut cursor = Cursor::new(stream);

    let version = wire::read_message(&mut cursor, &limits).unwrap();
    assert_eq!(version.header.command(), Command::Version);
    let theirs = VersionMessage::decode(&version.payload).unwrap();
    assert_eq!(theirs, ours);

    let verack = wire::read_message(&mut cursor, &limits).unwrap();
    assert_eq!(verack.header.command(), Command::Verack);
    assert!(verack.payload.is_empty());
}

#[test]
fn addr_message_from_mainnet_bytes() {
    let mut payload = vec![1u8];
    payload.extend_from_slice(&1_700_000_100u32.to_le_bytes());
    payload.extend_from_slice(&1033u64.to_le_bytes());
    payload.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 93, 184, 216, 34]);
    payload.extend_from_slice(&8333u16.to_be_bytes());

    let bytes = wire::frame(Network::Mainnet.magic(), "addr", &payload).unwrap();
    let msg = Message::from_bytes(&bytes).unwrap();
    assert!(msg.is_valid());
    assert_eq!(msg.header.command(), Command::Addr);

    let list = AddrList::decode(PROTOCOL_VERSION, &msg.payload).unwrap();
    assert_eq!(list.len(), 1);
    let peer = &list.as_slice()[0];
    assert_eq!(peer.socket_addr(), "93.184.216.34:8333".parse().unwrap());
    assert!(peer.services.contains(Services::NODE_WITNESS));
}

#[test]
fn tampered_frame_is_reported_as_integrity_failure() {
    let mut bytes = wire::frame(Network::Mainnet.magic(), "pong", &[9; 8]).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    let err = wire::read_message(&mut Cursor::new(bytes), &FrameLimits::default()).unwrap_err();
    assert!(err.is_integrity_failure());
    assert!(matches!(err, WireError::ChecksumMismatch { .. }));
}
