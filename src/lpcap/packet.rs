use std::borrow::Cow;
use std::io::Write;

use byteorder_slice::{ByteOrder, LittleEndian};
use derive_into_owned::IntoOwned;

use crate::common::*;
use crate::errors::*;

const NANOS_PER_SEC: u32 = 1_000_000_000;


/// Lpcap packet with its header fields and data.
///
/// The payload can be owned or borrowed.
#[derive(Clone, Debug, IntoOwned, Eq, PartialEq)]
pub struct Packet<'a> {
    /// Interface index where the frame was received
    pub index: u8,
    /// Broadcast, Unicast or Multicast
    pub class: PacketClass,
    /// Nanoseconds elapsed since the Unix epoch, wrapped to 32 bits
    pub timestamp: u32,
    /// Payload, owned or borrowed, of the packet
    pub data: Cow<'a, [u8]>,
}

impl<'a> Packet<'a> {
    /// Create a new borrowed `Packet` with the given parameters.
    pub fn new(index: u8, class: PacketClass, timestamp: u32, data: &'a [u8]) -> Packet<'a> {
        Packet {
            index,
            class,
            timestamp,
            data: Cow::Borrowed(data),
        }
    }

    /// Create a new owned `Packet` with the given parameters.
    pub fn new_owned(index: u8, class: PacketClass, timestamp: u32, data: Vec<u8>) -> Packet<'static> {
        Packet {
            index,
            class,
            timestamp,
            data: Cow::Owned(data),
        }
    }

    /// Number of octets of payload.
    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }

    /// Whole seconds part of the timestamp.
    pub fn timestamp_secs(&self) -> u32 {
        self.timestamp / NANOS_PER_SEC
    }

    /// Length of the frame once encoded, header included.
    pub fn frame_len(&self) -> usize {
        FRAME_HEADER_LEN + self.data.len()
    }

    /// Parse a new borrowed `Packet` from a slice.
    ///
    /// Offsets of parse errors are taken from the end of the packet header,
    /// i.e. `FRAME_HEADER_LEN` plus the offset of the field inside the header.
    pub fn from_slice(slice: &'a [u8], snaplen: u32) -> LpcapResult<(&'a [u8], Packet<'a>)> {
        let (slice, header) = PacketHeader::from_slice(slice, snaplen)?;
        let len = header.incl_len as usize;

        if slice.len() < len {
            return Err(LpcapError::IncompleteBuffer(len, slice.len()));
        }

        let packet = Packet {
            index: header.ifindex,
            class: header.class,
            timestamp: header.timestamp,
            data: Cow::Borrowed(&slice[..len]),
        };

        Ok((&slice[len..], packet))
    }

    /// Checks that the packet fits in `snaplen` and can be read back.
    pub(crate) fn check(&self, snaplen: u32) -> LpcapResult<()> {
        let len = self.frame_len();
        if len > snaplen as usize {
            return Err(LpcapError::SizeOverflow { len, snap_len: snaplen });
        }

        if self.timestamp == 0 {
            return Err(LpcapError::InvalidField(ValidationError::ZeroTimestamp));
        }

        Ok(())
    }

    /// Appends the encoded frame to `buf`.
    ///
    /// Does no bounds checking, the caller must make sure the frame fits in the snap length.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        let header = PacketHeader {
            ifindex: self.index,
            class: self.class,
            timestamp: self.timestamp,
            incl_len: self.length(),
        };

        buf.extend_from_slice(&header.encode());
        buf.extend_from_slice(&self.data);
    }

    /// Write a `Packet` to a writer.
    ///
    /// Returns the number of bytes written on success.
    pub fn write_to<W: Write>(&self, writer: &mut W, snaplen: u32) -> LpcapResult<usize> {
        self.check(snaplen)?;

        let mut buf = Vec::with_capacity(self.frame_len());
        self.encode_into(&mut buf);
        writer.write_all(&buf).map_err(LpcapError::WriteFailed)?;

        Ok(buf.len())
    }
}


//   0               1               2               3
//   0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |    IfIndex    |     Class     |   Timestamp ...
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//       ... Timestamp              |   Captured Length ...
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//       ... Captured Length        |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// Lpcap packet header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PacketHeader {
    /// Interface index
    pub ifindex: u8,
    /// Packet class
    pub class: PacketClass,
    /// Timestamp in nanoseconds
    pub timestamp: u32,
    /// Number of octets of payload saved in the file
    pub incl_len: u32,
}

impl PacketHeader {
    /// Decodes a packet header from its 10 octets.
    ///
    /// `max_len` bounds the captured length.
    pub fn decode(bytes: &[u8; FRAME_HEADER_LEN], max_len: u32) -> Result<PacketHeader, ValidationError> {
        let ifindex = bytes[0];
        let class = PacketClass::try_from(bytes[1]).map_err(ValidationError::UnknownPacketClass)?;

        let timestamp = LittleEndian::read_u32(&bytes[2..6]);
        if timestamp == 0 {
            return Err(ValidationError::ZeroTimestamp);
        }

        let incl_len = LittleEndian::read_u32(&bytes[6..10]);
        if incl_len > max_len {
            return Err(ValidationError::CapturedLenTooBig(incl_len, max_len));
        }

        Ok(PacketHeader { ifindex, class, timestamp, incl_len })
    }

    pub fn encode(&self) -> [u8; FRAME_HEADER_LEN] {
        let mut bytes = [0_u8; FRAME_HEADER_LEN];

        bytes[0] = self.ifindex;
        bytes[1] = self.class.into();
        LittleEndian::write_u32(&mut bytes[2..6], self.timestamp);
        LittleEndian::write_u32(&mut bytes[6..10], self.incl_len);

        bytes
    }

    /// Creates a new `PacketHeader` from a slice.
    ///
    /// Parse errors are positioned after the header, like a container positions them after its cursor moved.
    pub(crate) fn from_slice(slice: &[u8], snaplen: u32) -> LpcapResult<(&[u8], PacketHeader)> {
        if slice.len() < FRAME_HEADER_LEN {
            return Err(LpcapError::IncompleteBuffer(FRAME_HEADER_LEN, slice.len()));
        }

        let (head, rem) = slice.split_at(FRAME_HEADER_LEN);
        let mut bytes = [0_u8; FRAME_HEADER_LEN];
        bytes.copy_from_slice(head);

        let header = PacketHeader::decode(&bytes, snaplen).map_err(|e| LpcapError::parse_at(FRAME_HEADER_LEN as u64, e))?;

        Ok((rem, header))
    }
}
