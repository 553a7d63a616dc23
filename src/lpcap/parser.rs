use crate::errors::*;
use crate::lpcap::{FileHeader, Packet};


/// Parses an lpcap from a slice of bytes.
///
/// You can match on [LpcapError::IncompleteBuffer](crate::LpcapError) to know if the parser needs more data.
///
/// # Examples
///
/// ```no_run
/// use lpcap_file::lpcap::LpcapParser;
/// use lpcap_file::LpcapError;
///
/// let lpcap = vec![0_u8; 0];
/// let mut src = &lpcap[..];
///
/// // Creates a new parser and parse the file header
/// let (rem, lpcap_parser) = LpcapParser::new(&lpcap[..]).unwrap();
/// src = rem;
///
/// while !src.is_empty() {
///     match lpcap_parser.next_packet(src) {
///         Ok((rem, packet)) => {
///             // Do something
///
///             // Don't forget to update src
///             src = rem;
///         },
///         Err(LpcapError::IncompleteBuffer(needed, available)) => break,// Load more data into src
///         Err(_) => break,// Parsing error
///     }
/// }
/// ```
#[derive(Debug)]
pub struct LpcapParser {
    header: FileHeader,
}

impl LpcapParser {
    /// Creates a new `LpcapParser`.
    /// Returns the remainder and the parser.
    pub fn new(slice: &[u8]) -> LpcapResult<(&[u8], LpcapParser)> {
        let (slice, header) = FileHeader::from_slice(slice)?;

        let parser = LpcapParser { header };

        Ok((slice, parser))
    }

    /// Returns the remainder and the next packet.
    ///
    /// Parse errors are positioned relative to the start of `slice`, counted from the end of the packet header.
    pub fn next_packet<'a>(&self, slice: &'a [u8]) -> LpcapResult<(&'a [u8], Packet<'a>)> {
        Packet::from_slice(slice, self.header.snaplen)
    }

    /// Returns the file header.
    pub fn header(&self) -> FileHeader {
        self.header
    }
}
