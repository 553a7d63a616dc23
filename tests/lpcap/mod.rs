use std::fs;

use lpcap_file::lpcap::{Container, FileHeader, LpcapParser, Packet};
use lpcap_file::{ErrorCode, LinkType, LpcapError, PacketClass, ValidationError};
use proptest::prelude::*;

/// Valid header followed by one Unicast frame of 3 octets, timestamp 1000.
static CAPTURE: &str = "3e4f01000100ff3f0000020000000104e803000003000000aabbcc";


fn open_bytes(bytes: &[u8]) -> Result<Container, LpcapError> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.lpcap");
    fs::write(&path, bytes).unwrap();

    Container::open(&path)
}

#[test]
fn read_fixture() {
    let data = hex::decode(CAPTURE).unwrap();
    let container = open_bytes(&data).unwrap();

    assert_eq!(container.header(), Some(FileHeader::default()));
    assert_eq!(container.size(), data.len() as u64);

    let packet = container.read_packet().unwrap();
    assert_eq!(packet, Packet::new(1, PacketClass::Unicast, 1000, &[0xaa, 0xbb, 0xcc]));
    assert!(!container.has_next());
    assert!(container.next_packet().is_none());
}

#[test]
fn write_matches_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.lpcap");

    let container = Container::create(&path).unwrap();
    container.write_packet(&Packet::new(1, PacketClass::Unicast, 1000, &[0xaa, 0xbb, 0xcc])).unwrap();
    container.close().unwrap();

    assert_eq!(hex::encode(fs::read(&path).unwrap()), CAPTURE);
}

#[test]
fn iteration_stops_after_k_packets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("k.lpcap");
    const K: usize = 25;

    let container = Container::create(&path).unwrap();
    for i in 0..K {
        let data = vec![i as u8; i * 7];
        let class = [PacketClass::Broadcast, PacketClass::Unicast, PacketClass::Multicast][i % 3];
        container.write_packet(&Packet::new(i as u8, class, 1 + i as u32, &data)).unwrap();
    }
    container.close().unwrap();

    let container = Container::open(&path).unwrap();
    let mut trues = 0;
    while container.has_next() {
        trues += 1;
        let packet = container.read_packet().unwrap();
        assert_eq!(packet.length() as usize, (trues - 1) * 7);
    }

    assert_eq!(trues, K);
    assert!(!container.has_next());
    assert_eq!(container.len(), K);
    assert_eq!(container.last_error(), ErrorCode::Ok);
}

#[test]
fn header_rejections_are_positioned() {
    let valid = hex::decode(CAPTURE).unwrap();

    let mut bad_magic = valid.clone();
    bad_magic[0..2].copy_from_slice(&[0xd4, 0xc3]);
    let err = open_bytes(&bad_magic).unwrap_err();
    assert_eq!(err.offset(), Some(0));
    assert!(matches!(err, LpcapError::Parse { source: ValidationError::InvalidMagicNumber(0xc3d4), .. }));

    let mut bad_major = valid.clone();
    bad_major[2..4].fill(0);
    assert_eq!(open_bytes(&bad_major).unwrap_err().offset(), Some(2));

    let mut bad_minor = valid.clone();
    bad_minor[4..6].fill(0);
    assert_eq!(open_bytes(&bad_minor).unwrap_err().offset(), Some(4));

    let mut bad_link = valid.clone();
    bad_link[10] = u32::from(LinkType::Fddi) as u8;
    assert_eq!(open_bytes(&bad_link).unwrap_err().offset(), Some(10));

    assert!(matches!(open_bytes(&valid[..13]), Err(LpcapError::HeaderTooSmall(13))));
}

#[test]
fn frame_rejections_are_positioned_after_the_header() {
    let mut bad_class = hex::decode(CAPTURE).unwrap();
    bad_class[15] = 0x03;
    let container = open_bytes(&bad_class).unwrap();

    let err = container.read_packet().unwrap_err();
    assert_eq!(err.offset(), Some(24));
    assert_eq!(container.last_error(), ErrorCode::InvalidHeader);

    let mut zero_ts = hex::decode(CAPTURE).unwrap();
    zero_ts[16..20].fill(0);
    let container = open_bytes(&zero_ts).unwrap();
    assert_eq!(container.read_packet().unwrap_err().offset(), Some(26));
}

#[test]
fn open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(Container::open(dir.path().join("missing")), Err(LpcapError::OpenFailed(_))));
}

#[test]
fn read_only_container_refuses_writes() {
    let container = open_bytes(&hex::decode(CAPTURE).unwrap()).unwrap();

    let err = container.write_packet(&Packet::new(1, PacketClass::Unicast, 1, &[1])).unwrap_err();
    assert!(matches!(err, LpcapError::WriteFailed(_)));
    assert_eq!(container.last_error(), ErrorCode::Write);
    assert_eq!(container.size(), 27);

    // Reads are still possible and clear the error
    container.read_packet().unwrap();
    assert_eq!(container.last_error(), ErrorCode::Ok);
}

#[test]
fn double_close() {
    let dir = tempfile::tempdir().unwrap();
    let container = Container::create(dir.path().join("c.lpcap")).unwrap();

    container.close().unwrap();
    assert!(matches!(container.close(), Err(LpcapError::AlreadyClosed)));
    assert_eq!(container.header(), None);
    assert_eq!((container.offset(), container.size(), container.len()), (0, 0, 0));
}

#[test]
fn parser_and_container_agree() {
    let container = Container::with_store(Vec::new()).unwrap();
    for i in 1..=5_u32 {
        container.write_packet(&Packet::new(0, PacketClass::Multicast, i, &i.to_le_bytes())).unwrap();
    }
    let bytes = container.into_inner().unwrap();

    let (mut src, parser) = LpcapParser::new(&bytes).unwrap();
    let container = Container::from_store(bytes.clone()).unwrap();

    for packet in container.packets() {
        let (rem, parsed) = parser.next_packet(src).unwrap();
        assert_eq!(parsed, packet.unwrap());
        src = rem;
    }
    assert!(src.is_empty());
}

proptest! {
    #[test]
    fn write_read_round_trip(
        index in any::<u8>(),
        class in prop::sample::select(vec![PacketClass::Broadcast, PacketClass::Unicast, PacketClass::Multicast]),
        timestamp in 1..=u32::MAX,
        data in prop::collection::vec(any::<u8>(), 0..=1024),
    ) {
        let container = Container::with_store(Vec::new()).unwrap();
        let packet = Packet::new(index, class, timestamp, &data);

        prop_assert_eq!(container.write_packet(&packet).unwrap(), 10 + data.len());
        prop_assert_eq!(container.read_packet().unwrap(), packet);
    }
}
