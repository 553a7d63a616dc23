use std::fs::{File, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::common::*;
use crate::errors::*;
use crate::lpcap::{FileHeader, Packet, PacketHeader};
use crate::pool::BufferPool;
use crate::store::ByteStore;


/// An lpcap container over a [`ByteStore`].
///
/// Reads walk the store frame by frame from a cursor starting right after the file header,
/// writes append frames at the end of the store.
/// Every method takes `&self`, so a container can be shared between threads behind an `Arc`.
///
/// # Examples
///
/// ```rust,no_run
/// use lpcap_file::lpcap::{Container, Packet};
/// use lpcap_file::PacketClass;
///
/// let container = Container::create("out.lpcap").expect("Error creating file");
///
/// let data = [0u8; 128];
/// let packet = Packet::new(4, PacketClass::Broadcast, 1, &data);
/// container.write_packet(&packet).unwrap();
///
/// while container.has_next() {
///     let packet = container.read_packet().unwrap();
///
///     //Do something
/// }
///
/// container.close().unwrap();
/// ```
#[derive(Debug)]
pub struct Container<S: ByteStore = File> {
    state: RwLock<State<S>>,
    pool: Arc<BufferPool>,
}

#[derive(Debug)]
struct State<S> {
    header: Option<FileHeader>,
    store: Option<S>,
    /// Absolute offset of the next unread frame
    offset: u64,
    /// Total size of the store
    size: u64,
    /// Packets successfully read
    count: usize,
    last_error: ErrorCode,
    closed: bool,
}

impl Container<File> {
    /// Creates, or truncates, the file at `path` and writes a default [`FileHeader`] in it.
    pub fn create<P: AsRef<Path>>(path: P) -> LpcapResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(LpcapError::OpenFailed)?;

        Container::with_store(file)
    }

    /// Opens the file at `path` read-only and validates its header.
    pub fn open<P: AsRef<Path>>(path: P) -> LpcapResult<Self> {
        let file = File::open(path).map_err(LpcapError::OpenFailed)?;

        Container::from_store(file)
    }
}

impl<S: ByteStore> Container<S> {
    /// Creates a new container in an empty store with this default header:
    ///
    /// ```rust, ignore
    /// FileHeader {
    ///     version_major: 1,
    ///     version_minor: 1,
    ///     snaplen: MAX_SNAP_LENGTH,
    ///     linktype: LinkType::Ethernet2,
    /// };
    /// ```
    pub fn with_store(store: S) -> LpcapResult<Self> {
        Container::with_header(store, FileHeader::default())
    }

    /// Creates a new container in an empty store with a user defined header.
    ///
    /// # Errors
    ///
    /// Return an error if the header is invalid, if the store already holds data
    /// or if the store can't be written to.
    pub fn with_header(mut store: S, header: FileHeader) -> LpcapResult<Self> {
        header.validate()?;

        let size = store.size().map_err(LpcapError::ReadFailed)?;
        if size != 0 {
            return Err(LpcapError::StoreNotEmpty(size));
        }

        let n = store.append(&header.encode()).map_err(LpcapError::WriteFailed)?;
        if n != FILE_HEADER_LEN {
            return Err(LpcapError::WriteFailed(Error::from(ErrorKind::WriteZero)));
        }

        debug!(
            version_major = header.version_major,
            version_minor = header.version_minor,
            snaplen = header.snaplen,
            linktype = ?header.linktype,
            "created lpcap container"
        );

        Ok(Container::from_parts(store, header, FILE_HEADER_LEN as u64))
    }

    /// Opens an existing container from a store and validates its header.
    ///
    /// # Errors
    ///
    /// Return an error if the store is smaller than a file header,
    /// if the header is invalid (positioned at the first invalid field)
    /// or if the store can't be read.
    pub fn from_store(mut store: S) -> LpcapResult<Self> {
        let size = store.size().map_err(LpcapError::ReadFailed)?;
        if size < FILE_HEADER_LEN as u64 {
            return Err(LpcapError::HeaderTooSmall(size));
        }

        let mut bytes = [0_u8; FILE_HEADER_LEN];
        store.read_exact_at(&mut bytes, 0).map_err(LpcapError::ReadFailed)?;

        let header = FileHeader::decode(&bytes).map_err(|e| LpcapError::parse_at(0, e))?;

        debug!(
            version_major = header.version_major,
            version_minor = header.version_minor,
            snaplen = header.snaplen,
            linktype = ?header.linktype,
            size,
            "opened lpcap container"
        );

        Ok(Container::from_parts(store, header, size))
    }

    fn from_parts(store: S, header: FileHeader, size: u64) -> Self {
        let state = State {
            header: Some(header),
            store: Some(store),
            offset: FILE_HEADER_LEN as u64,
            size,
            count: 0,
            last_error: ErrorCode::Ok,
            closed: false,
        };

        Container { state: RwLock::new(state), pool: Arc::default() }
    }

    /// Uses a shared buffer pool instead of the private one.
    pub fn with_pool(mut self, pool: Arc<BufferPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Reads the frame at the cursor and advances the cursor past it.
    ///
    /// The returned packet owns its payload. The number of bytes consumed, header included,
    /// is [`Packet::frame_len`] of the returned packet: the cursor moves by exactly that much.
    ///
    /// # Errors
    ///
    /// - [`LpcapError::NoMorePackets`] if the store ends inside the frame
    /// - [`LpcapError::Parse`] if the packet header is invalid. The offset is the cursor once the
    ///   10 header octets are consumed, plus [`ValidationError::field_offset`]
    /// - [`LpcapError::ReadFailed`] on any other I/O error
    pub fn read_packet(&self) -> LpcapResult<Packet<'static>> {
        let mut state = self.state.write();
        if state.closed {
            return Err(LpcapError::Closed);
        }

        let res = state.read_frame();
        state.record(&res);
        res
    }

    /// Appends a packet to the store and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - [`LpcapError::SizeOverflow`] if the frame is bigger than the snap length
    /// - [`LpcapError::InvalidField`] if the timestamp is 0
    /// - [`LpcapError::WriteFailed`] if the store can't be written to
    pub fn write_packet(&self, packet: &Packet) -> LpcapResult<usize> {
        let mut state = self.state.write();
        if state.closed {
            return Err(LpcapError::Closed);
        }

        let res = state.write_frame(packet, &self.pool);
        state.record(&res);
        res
    }

    /// Returns true while the cursor is before the end of the store.
    pub fn has_next(&self) -> bool {
        let state = self.state.read();
        state.offset < state.size
    }

    /// Returns the next packet, or `None` once the cursor reached the end of the store.
    pub fn next_packet(&self) -> Option<LpcapResult<Packet<'static>>> {
        if self.has_next() {
            Some(self.read_packet())
        }
        else {
            None
        }
    }

    /// Iterates over the remaining packets.
    ///
    /// The iterator ends after the first error.
    pub fn packets(&self) -> Packets<'_, S> {
        Packets { container: self, done: false }
    }

    /// Number of packets read so far.
    pub fn len(&self) -> usize {
        self.state.read().count
    }

    /// Returns true if no packet was read yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Classification of the most recent read or write.
    pub fn last_error(&self) -> ErrorCode {
        self.state.read().last_error
    }

    /// Returns the file header, `None` once closed.
    pub fn header(&self) -> Option<FileHeader> {
        self.state.read().header
    }

    /// Returns the link type of the container, `None` once closed.
    pub fn link_type(&self) -> Option<LinkType> {
        self.state.read().header.map(|h| h.linktype)
    }

    /// Changes the link type held by the container.
    ///
    /// Only the in-memory header is updated, the header already in the store is left as is.
    pub fn set_link_type(&self, linktype: LinkType) -> LpcapResult<()> {
        let mut state = self.state.write();
        let header = state.header.as_mut().ok_or(LpcapError::Closed)?;
        header.linktype = linktype;

        Ok(())
    }

    /// Absolute offset of the next unread frame.
    pub fn offset(&self) -> u64 {
        self.state.read().offset
    }

    /// Total size of the store as tracked by the container.
    pub fn size(&self) -> u64 {
        self.state.read().size
    }

    /// Returns true once [`Container::close`] succeeded or failed on the store.
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Resets the container and closes the store.
    ///
    /// # Errors
    ///
    /// Return [`LpcapError::AlreadyClosed`] on a second call,
    /// or [`LpcapError::CloseFailed`] if the store fails to close.
    pub fn close(&self) -> LpcapResult<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(LpcapError::AlreadyClosed);
        }

        debug!(packets = state.count, size = state.size, "closing lpcap container");

        state.header = None;
        state.offset = 0;
        state.size = 0;
        state.count = 0;
        state.last_error = ErrorCode::Ok;
        state.closed = true;

        match state.store.take() {
            Some(mut store) => store.close().map_err(LpcapError::CloseFailed),
            None => Ok(()),
        }
    }

    /// Consumes the container, returning the store without closing it.
    ///
    /// Returns `None` if the container was closed.
    pub fn into_inner(self) -> Option<S> {
        self.state.into_inner().store
    }
}

impl<S: ByteStore> State<S> {
    fn read_frame(&mut self) -> LpcapResult<Packet<'static>> {
        let snaplen = self.header.map(|h| h.snaplen).ok_or(LpcapError::Closed)?;
        let store = self.store.as_mut().ok_or(LpcapError::Closed)?;

        let start = self.offset;
        let mut bytes = [0_u8; FRAME_HEADER_LEN];
        let n = store.read_exact_at(&mut bytes, start).map_err(read_error)?;
        self.offset += n as u64;

        let header = match PacketHeader::decode(&bytes, snaplen) {
            Ok(header) => header,
            Err(e) => {
                let err = LpcapError::parse_at(self.offset, e);
                warn!(offset = ?err.offset(), error = %e, "invalid packet header");
                return Err(err);
            },
        };

        // Don't allocate for a payload the store can't hold
        if self.offset + u64::from(header.incl_len) > self.size {
            return Err(LpcapError::NoMorePackets);
        }

        // The payload goes straight into memory owned by the returned packet
        let mut data = vec![0_u8; header.incl_len as usize];
        let n = store.read_exact_at(&mut data, self.offset).map_err(read_error)?;
        self.offset += n as u64;
        self.count += 1;

        trace!(offset = start, len = header.incl_len, "read packet");

        Ok(Packet::new_owned(header.ifindex, header.class, header.timestamp, data))
    }

    fn write_frame(&mut self, packet: &Packet, pool: &BufferPool) -> LpcapResult<usize> {
        let snaplen = self.header.map(|h| h.snaplen).ok_or(LpcapError::Closed)?;
        packet.check(snaplen)?;

        let store = self.store.as_mut().ok_or(LpcapError::Closed)?;

        let mut buf = pool.acquire();
        packet.encode_into(&mut buf);

        let n = store.append(&buf).map_err(LpcapError::WriteFailed)?;
        if n != buf.len() {
            return Err(LpcapError::WriteFailed(Error::from(ErrorKind::WriteZero)));
        }
        self.size += n as u64;

        trace!(offset = self.size - n as u64, len = packet.length(), "wrote packet");

        Ok(n)
    }

    fn record<T>(&mut self, res: &LpcapResult<T>) {
        self.last_error = match res {
            Ok(_) => ErrorCode::Ok,
            Err(e) => e.code().unwrap_or(self.last_error),
        };
    }
}

fn read_error(err: Error) -> LpcapError {
    if err.kind() == ErrorKind::UnexpectedEof {
        LpcapError::NoMorePackets
    }
    else {
        LpcapError::ReadFailed(err)
    }
}


/// Iterator over the remaining packets of a [`Container`].
#[derive(Debug)]
pub struct Packets<'c, S: ByteStore> {
    container: &'c Container<S>,
    done: bool,
}

impl<S: ByteStore> Iterator for Packets<'_, S> {
    type Item = LpcapResult<Packet<'static>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let res = self.container.next_packet();
        if !matches!(res, Some(Ok(_))) {
            self.done = true;
        }

        res
    }
}
