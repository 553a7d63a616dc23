//! The random-access byte store a [`Container`](crate::lpcap::Container) runs on.

use std::fs::File;
use std::io::{Error, ErrorKind, Read, Result as IoResult, Seek, SeekFrom, Write};


/// Random-access resource backing a container.
///
/// Reads are positional, writes always append at the current end of the store.
/// The container serializes every call, so implementations don't need interior locking.
pub trait ByteStore {
    /// Reads up to `buf.len()` bytes at the absolute `offset`.
    ///
    /// Returns 0 at or past the end of the store.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> IoResult<usize>;

    /// Appends the whole buffer at the end of the store and returns the number of bytes written.
    fn append(&mut self, buf: &[u8]) -> IoResult<usize>;

    /// Total size of the store in bytes.
    fn size(&mut self) -> IoResult<u64>;

    /// Releases the store. Called at most once by the container.
    fn close(&mut self) -> IoResult<()> {
        Ok(())
    }

    /// Fills `buf` from `offset`.
    ///
    /// Fails with [`ErrorKind::UnexpectedEof`] if the store ends before `buf` is full.
    fn read_exact_at(&mut self, mut buf: &mut [u8], mut offset: u64) -> IoResult<usize> {
        let len = buf.len();

        while !buf.is_empty() {
            match self.read_at(buf, offset) {
                Ok(0) => return Err(Error::from(ErrorKind::UnexpectedEof)),
                Ok(n) => {
                    let tmp = buf;
                    buf = &mut tmp[n..];
                    offset += n as u64;
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => return Err(e),
            }
        }

        Ok(len)
    }
}

impl ByteStore for File {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> IoResult<usize> {
        self.seek(SeekFrom::Start(offset))?;
        self.read(buf)
    }

    fn append(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.seek(SeekFrom::End(0))?;
        self.write_all(buf)?;

        Ok(buf.len())
    }

    fn size(&mut self) -> IoResult<u64> {
        Ok(self.metadata()?.len())
    }

    fn close(&mut self) -> IoResult<()> {
        self.flush()
    }
}

/// In-memory store, mostly useful for tests and for building a capture before persisting it.
impl ByteStore for Vec<u8> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> IoResult<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };

        let src = &self[start..];
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);

        Ok(n)
    }

    fn append(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn size(&mut self) -> IoResult<u64> {
        Ok(self.len() as u64)
    }
}
