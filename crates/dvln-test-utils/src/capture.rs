//! [`CaptureBuffer`], a cloneable in-memory writer.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Writer whose clones all append to the same buffer.
///
/// Hand one clone to the code under test and keep another to read back
/// what was written.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Drop everything written so far.
    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_buffer() {
        let buffer = CaptureBuffer::new();
        let mut writer = buffer.clone();
        writer.write_all(b"hello").unwrap();
        assert_eq!(buffer.contents(), "hello");
        buffer.clear();
        assert_eq!(buffer.contents(), "");
    }
}
