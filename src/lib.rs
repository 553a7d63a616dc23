//! Create, read and write lpcap, a lightweight container for captured network packets.
//!
//! The format is close to Pcap in spirit but not compatible with it:
//! a 14 octets little endian file header followed by frames made of a
//! 10 octets packet header and the packet payload.
//!
//! The [`lpcap::Container`] walks a [`ByteStore`] frame by frame and can append new frames to it,
//! the [`lpcap::LpcapParser`] parses a capture already in memory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use lpcap_file::lpcap::{Container, Packet};
//! use lpcap_file::PacketClass;
//!
//! let container = Container::create("out.lpcap").expect("Error creating file");
//!
//! let data = [0u8; 64];
//! container.write_packet(&Packet::new(0, PacketClass::Unicast, 1, &data)).unwrap();
//! container.close().unwrap();
//!
//! let container = Container::open("out.lpcap").expect("Error opening file");
//!
//! for packet in container.packets() {
//!     //Check if there is no error
//!     let packet = packet.unwrap();
//!
//!     //Do something
//! }
//! ```

#![deny(unsafe_code)]

mod common;
mod errors;
pub mod lpcap;
pub mod pool;
pub mod store;

pub use common::*;
pub use errors::*;
pub use pool::BufferPool;
pub use store::ByteStore;
