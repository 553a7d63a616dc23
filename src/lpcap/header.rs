use std::io::Write;

use byteorder_slice::{ByteOrder, LittleEndian};

use crate::common::*;
use crate::errors::*;


//   0               1               2               3
//   0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |         Magic Number          |         Major Version         |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//  |         Minor Version         |   Snap Length ...
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//       ... Snap Length            |   Link Type ...
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//       ... Link Type              |
//  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// Lpcap file header.
///
/// All the fields are little endian.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FileHeader {
    /// Major version number
    pub version_major: u16,
    /// Minor version number
    pub version_minor: u16,
    /// Max length of a captured frame, header included
    pub snaplen: u32,
    /// Link layer of the captured frames
    pub linktype: LinkType,
}

impl FileHeader {
    /// Decodes a header from its 14 octets.
    ///
    /// Fields are validated in order and the first invalid one is reported.
    /// [`ValidationError::field_offset`] gives its position in the header.
    pub fn decode(bytes: &[u8; FILE_HEADER_LEN]) -> Result<FileHeader, ValidationError> {
        let magic = LittleEndian::read_u16(&bytes[0..2]);
        if magic != MAGIC_NUMBER {
            return Err(ValidationError::InvalidMagicNumber(magic));
        }

        let version_major = LittleEndian::read_u16(&bytes[2..4]);
        if version_major == 0 {
            return Err(ValidationError::MajorVersionZero);
        }

        let version_minor = LittleEndian::read_u16(&bytes[4..6]);
        if version_minor == 0 {
            return Err(ValidationError::MinorVersionZero);
        }

        // The snap length is taken as is, even 0
        let snaplen = LittleEndian::read_u32(&bytes[6..10]);

        let raw_link = LittleEndian::read_u32(&bytes[10..14]);
        let linktype = match LinkType::try_from(raw_link) {
            Ok(link) if link.is_supported() => link,
            _ => return Err(ValidationError::UnsupportedLinkType(raw_link)),
        };

        Ok(FileHeader { version_major, version_minor, snaplen, linktype })
    }

    /// Encodes the header. The header is written as is, see [`FileHeader::validate`].
    pub fn encode(&self) -> [u8; FILE_HEADER_LEN] {
        let mut bytes = [0_u8; FILE_HEADER_LEN];

        LittleEndian::write_u16(&mut bytes[0..2], MAGIC_NUMBER);
        LittleEndian::write_u16(&mut bytes[2..4], self.version_major);
        LittleEndian::write_u16(&mut bytes[4..6], self.version_minor);
        LittleEndian::write_u32(&mut bytes[6..10], self.snaplen);
        LittleEndian::write_u32(&mut bytes[10..14], self.linktype.into());

        bytes
    }

    /// Creates a new `FileHeader` from a slice of bytes.
    ///
    /// Returns the header and the remainder of the slice.
    ///
    /// `LpcapError::IncompleteBuffer` indicates that there is not enough data in the buffer.
    pub fn from_slice(slice: &[u8]) -> LpcapResult<(&[u8], FileHeader)> {
        if slice.len() < FILE_HEADER_LEN {
            return Err(LpcapError::IncompleteBuffer(FILE_HEADER_LEN, slice.len()));
        }

        let (head, rem) = slice.split_at(FILE_HEADER_LEN);
        let mut bytes = [0_u8; FILE_HEADER_LEN];
        bytes.copy_from_slice(head);

        let header = FileHeader::decode(&bytes).map_err(|e| LpcapError::parse_at(0, e))?;

        Ok((rem, header))
    }

    /// Checks a header before it gets written.
    ///
    /// Stricter than [`FileHeader::decode`]: the snap length must also be in `1..=MAX_SNAP_LENGTH`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version_major == 0 {
            return Err(ValidationError::MajorVersionZero);
        }

        if self.version_minor == 0 {
            return Err(ValidationError::MinorVersionZero);
        }

        if self.snaplen == 0 || self.snaplen > MAX_SNAP_LENGTH {
            return Err(ValidationError::SnapLenOutOfRange(self.snaplen));
        }

        if !self.linktype.is_supported() {
            return Err(ValidationError::UnsupportedLinkType(self.linktype.into()));
        }

        Ok(())
    }

    /// Writes the header to a writer.
    ///
    /// Writes 14B in the writer on success.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_all(&self.encode())?;
        Ok(FILE_HEADER_LEN)
    }
}

/// Creates a new `FileHeader` with the default parameters:
///
/// ```rust,ignore
/// FileHeader {
///     version_major: 1,
///     version_minor: 1,
///     snaplen: MAX_SNAP_LENGTH,
///     linktype: LinkType::Ethernet2,
/// };
/// ```
impl Default for FileHeader {
    fn default() -> Self {
        FileHeader {
            version_major: MAJOR_VERSION,
            version_minor: MINOR_VERSION,
            snaplen: MAX_SNAP_LENGTH,
            linktype: LinkType::Ethernet2,
        }
    }
}
