use crate::error::{Error, Needed, Result};
use crate::ReadBytesExt;
use bytes::Bytes;

/// reading from `Bytes` splits off the front,
/// so the returned bytes share the same buffer
impl ReadBytesExt for Bytes {
    #[inline]
    fn chunk(&self) -> &[u8] {
        &self[..]
    }

    fn read_len(&mut self, len: usize) -> Result<Bytes> {
        if self.len() < len {
            return Err(Error::InputIncomplete(Needed::Size(len - self.len())));
        }
        Ok(self.split_to(len))
    }
}
