use std::fmt;

use thiserror::Error;

/// Result type used throughout the crate.
pub type LpcapResult<T> = Result<T, LpcapError>;


/* ----- enum LpcapError ----- */

/// Errors that can occur while creating, opening, reading or writing an lpcap container.
#[derive(Debug, Error)]
pub enum LpcapError {
    /// The backing store could not be opened or created.
    #[error("Failed to open the backing store")]
    OpenFailed(#[source] std::io::Error),
    /// An I/O error, other than end of stream, occurred while reading the store.
    #[error("I/O error while reading the store")]
    ReadFailed(#[source] std::io::Error),
    /// An I/O error occurred while appending to the store.
    #[error("I/O error while writing the store")]
    WriteFailed(#[source] std::io::Error),
    /// The backing store failed to close.
    #[error("Failed to close the backing store")]
    CloseFailed(#[source] std::io::Error),
    /// The store is smaller than a file header.
    #[error("File length too small, cannot read file header: {0}B")]
    HeaderTooSmall(u64),
    /// A new container needs an empty store, this one already holds data.
    #[error("Store is not empty: {0}B")]
    StoreNotEmpty(u64),
    /// The buffer is too small to parse the expected data.
    /// # Fields
    /// - 0: needed size to parse the data
    /// - 1: actual size of the buffer
    #[error("The buffer too small: need {0}B, got {1}B")]
    IncompleteBuffer(usize, usize),
    /// A header field failed validation while decoding.
    #[error("at: {offset} pos, err: {source}")]
    Parse {
        /// Absolute offset of the first invalid field
        offset: u64,
        /// What was wrong with the field
        #[source]
        source: ValidationError,
    },
    /// A field was refused before being encoded.
    #[error(transparent)]
    InvalidField(ValidationError),
    /// The frame does not fit in the snap length of the container.
    #[error("Cannot write packet, frame length greater than snap length: {len} > {snap_len}")]
    SizeOverflow {
        /// Frame length, header included
        len: usize,
        /// Snap length of the container
        snap_len: u32,
    },
    /// End of stream reached while reading a frame.
    #[error("No more packets")]
    NoMorePackets,
    /// The container has been closed.
    #[error("Container is closed")]
    Closed,
    /// `close` was called on an already closed container.
    #[error("File is already closed")]
    AlreadyClosed,
}

impl LpcapError {
    /// Returns the classification recorded by a container for this error.
    ///
    /// Lifecycle errors (open, closed) have no classification.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            LpcapError::ReadFailed(_) | LpcapError::IncompleteBuffer(..) => Some(ErrorCode::Read),
            LpcapError::WriteFailed(_) => Some(ErrorCode::Write),
            LpcapError::Parse { .. } | LpcapError::InvalidField(_) => Some(ErrorCode::InvalidHeader),
            LpcapError::SizeOverflow { .. } => Some(ErrorCode::SizeOverflow),
            LpcapError::NoMorePackets => Some(ErrorCode::NoMorePacket),
            LpcapError::OpenFailed(_) | LpcapError::CloseFailed(_) | LpcapError::HeaderTooSmall(_) | LpcapError::StoreNotEmpty(_) | LpcapError::Closed | LpcapError::AlreadyClosed => None,
        }
    }

    /// Offset of the invalid field if this is a positioned parse error.
    pub fn offset(&self) -> Option<u64> {
        match self {
            LpcapError::Parse { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub(crate) fn parse_at(base: u64, source: ValidationError) -> Self {
        LpcapError::Parse { offset: base + source.field_offset() as u64, source }
    }
}

impl From<ValidationError> for LpcapError {
    fn from(err: ValidationError) -> Self {
        LpcapError::InvalidField(err)
    }
}


/* ----- enum ValidationError ----- */

/// Errors that can occur while validating a file header or a packet header.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum ValidationError {
    /// The magic number of the file header is invalid.
    #[error("Invalid magic number: {0:#X}")]
    InvalidMagicNumber(u16),
    /// The major version of the file header is 0.
    #[error("Invalid major version (is nil)")]
    MajorVersionZero,
    /// The minor version of the file header is 0.
    #[error("Invalid minor version (is nil)")]
    MinorVersionZero,
    /// The snap length is outside `1..=MAX_SNAP_LENGTH`.
    #[error("Snap length out of range: {0}")]
    SnapLenOutOfRange(u32),
    /// The link type is undefined or not supported.
    #[error("Link type is undefined: {0}")]
    UnsupportedLinkType(u32),
    /// The packet class is not Broadcast, Unicast or Multicast.
    #[error("Undefined packet type: {0}")]
    UnknownPacketClass(u8),
    /// The packet timestamp is 0.
    #[error("Invalid timestamp value: 0")]
    ZeroTimestamp,
    /// The captured length of the packet is bigger than the snap length.
    #[error("Snap length of packet is overflow: {0} > {1}")]
    CapturedLenTooBig(u32, u32),
}

impl ValidationError {
    /// Offset of the offending field inside its header.
    ///
    /// A packet class error reports 0, the start of the frame header fields.
    pub fn field_offset(&self) -> usize {
        match self {
            ValidationError::InvalidMagicNumber(_) => 0,
            ValidationError::MajorVersionZero => 2,
            ValidationError::MinorVersionZero => 4,
            ValidationError::SnapLenOutOfRange(_) => 6,
            ValidationError::UnsupportedLinkType(_) => 10,
            ValidationError::UnknownPacketClass(_) => 0,
            ValidationError::ZeroTimestamp => 2,
            ValidationError::CapturedLenTooBig(..) => 6,
        }
    }
}


/* ----- enum ErrorCode ----- */

/// Classification of the last read or write outcome of a container.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    /// The last operation succeeded
    #[default]
    Ok = 0,
    /// I/O error, other than end of stream, while reading
    Read = 1 << 1,
    /// I/O error while appending
    Write = 1 << 2,
    /// A file or packet header failed validation
    InvalidHeader = 1 << 3,
    /// A frame does not fit in the snap length
    SizeOverflow = 1 << 4,
    /// End of stream reached while reading a frame
    NoMorePacket = 1 << 5,
}

impl ErrorCode {
    /// Flag value of the classification.
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Returns true if no error was recorded.
    pub fn is_ok(self) -> bool {
        self == ErrorCode::Ok
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorCode::Ok => "Ok",
            ErrorCode::Read => "Read Error",
            ErrorCode::Write => "Write Error",
            ErrorCode::InvalidHeader => "Invalid Packet Header",
            ErrorCode::SizeOverflow => "Size Overflow",
            ErrorCode::NoMorePacket => "No More Packets",
        };

        f.write_str(msg)
    }
}
