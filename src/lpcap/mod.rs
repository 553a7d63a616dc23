//! Contains the lpcap header and packet codecs, the slice parser and the container

mod container;
mod header;
mod packet;
mod parser;

pub use container::*;
pub use header::*;
pub use packet::*;
pub use parser::*;
