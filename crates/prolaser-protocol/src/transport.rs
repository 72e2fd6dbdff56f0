//! Byte transport seam.
//!
//! The protocol layer never opens devices. Anything that can read with a
//! bounded timeout and write bytes can carry frames.

use std::io;

/// A blocking-with-timeout byte stream.
pub trait Transport {
    /// Read at most `max_bytes`.
    ///
    /// An empty vector means the read timed out with nothing available. That
    /// is distinct from an `Err`, which means the transport itself failed.
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>>;

    /// Write all bytes.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        (**self).read(max_bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        (**self).read(max_bytes)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write(bytes)
    }
}
