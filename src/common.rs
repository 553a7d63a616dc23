/// Magic number opening every lpcap file.
pub const MAGIC_NUMBER: u16 = 0x4F3E;

/// Major version written by this crate.
pub const MAJOR_VERSION: u16 = 1;

/// Minor version written by this crate.
///
/// Readers refuse a zero minor version, so the first release is 1.1.
pub const MINOR_VERSION: u16 = 1;

/// Maximum frame length that can be captured.
pub const MAX_SNAP_LENGTH: u32 = (1 << 14) - 1;

/// Size of the file header in octets.
pub const FILE_HEADER_LEN: usize = 14;

/// Size of a packet header in octets.
pub const FRAME_HEADER_LEN: usize = 10;


/// Link layer of the packets stored in a container.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum LinkType {
    /// Reserved link type
    Null = 0,
    /// Ethernet 802.3 frames
    #[default]
    Ethernet2 = 2,
    /// Ethernet 802.11 frames
    Ethernet80211 = 4,
    /// FDDI
    Fddi = 8,
}

impl LinkType {
    /// Returns true if a file header carrying this link type passes validation.
    pub fn is_supported(self) -> bool {
        matches!(self, LinkType::Ethernet2 | LinkType::Ethernet80211)
    }
}

impl TryFrom<u32> for LinkType {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LinkType::Null),
            2 => Ok(LinkType::Ethernet2),
            4 => Ok(LinkType::Ethernet80211),
            8 => Ok(LinkType::Fddi),
            _ => Err(value),
        }
    }
}

impl From<LinkType> for u32 {
    fn from(link: LinkType) -> Self {
        link as u32
    }
}


/// How a packet was addressed on the wire.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum PacketClass {
    Broadcast = 2,
    Unicast = 4,
    Multicast = 8,
}

impl TryFrom<u8> for PacketClass {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(PacketClass::Broadcast),
            4 => Ok(PacketClass::Unicast),
            8 => Ok(PacketClass::Multicast),
            _ => Err(value),
        }
    }
}

impl From<PacketClass> for u8 {
    fn from(class: PacketClass) -> Self {
        class as u8
    }
}
