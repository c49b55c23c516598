use crate::error::{Error, Needed, Result};
use crate::ReadBytesExt;
use bytes::Bytes;

/// cursor over an immutable byte buffer
///
/// unlike reading directly from `Bytes`, the cursor remembers
/// how many bytes have been consumed and can step back.
#[derive(Debug, Clone)]
pub struct ByteCursor {
    input: Bytes,
    offset: usize,
}

impl ByteCursor {
    pub fn new(input: impl Into<Bytes>) -> Self {
        ByteCursor {
            input: input.into(),
            offset: 0,
        }
    }

    /// number of bytes consumed since creation
    #[inline]
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// step back `n` bytes
    pub fn rewind(&mut self, n: usize) -> Result<()> {
        if n > self.offset {
            return Err(Error::InvalidRewind {
                requested: n,
                consumed: self.offset,
            });
        }
        self.offset -= n;
        Ok(())
    }

    /// the bytes not yet consumed, sharing the buffer
    pub fn remaining(&self) -> Bytes {
        self.input.slice(self.offset..)
    }
}

impl ReadBytesExt for ByteCursor {
    #[inline]
    fn chunk(&self) -> &[u8] {
        &self.input[self.offset..]
    }

    fn read_len(&mut self, len: usize) -> Result<Bytes> {
        let remaining = self.input.len() - self.offset;
        if len > remaining {
            return Err(Error::InputIncomplete(Needed::Size(len - remaining)));
        }
        let end = self.offset + len;
        let bs = self.input.slice(self.offset..end);
        self.offset = end;
        Ok(bs)
    }
}

impl From<Bytes> for ByteCursor {
    fn from(src: Bytes) -> Self {
        ByteCursor::new(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_consumed() -> Result<()> {
        let mut cur = ByteCursor::new(vec![1u8, 2, 3, 4, 5, 6, 7]);
        assert_eq!(0, cur.consumed());
        assert_eq!(1, cur.read_u8()?);
        assert_eq!(0x0302, cur.read_le_u16()?);
        assert_eq!(3, cur.consumed());
        assert_eq!(4, cur.remaining_len());
        let fail = cur.read_le_u64();
        dbg!(fail.unwrap_err());
        assert_eq!(3, cur.consumed());
        Ok(())
    }

    #[test]
    fn test_cursor_rewind() -> Result<()> {
        let mut cur = ByteCursor::new(Bytes::from_static(b"\x01\x02\x03\x04"));
        cur.skip(3)?;
        cur.rewind(2)?;
        assert_eq!(1, cur.consumed());
        assert_eq!(2, cur.read_u8()?);
        match cur.rewind(5) {
            Err(Error::InvalidRewind {
                requested,
                consumed,
            }) => {
                assert_eq!(5, requested);
                assert_eq!(2, consumed);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(&b"\x03\x04"[..], cur.remaining());
        Ok(())
    }

    #[test]
    fn test_cursor_rewind_to_start() -> Result<()> {
        let mut cur = ByteCursor::new(Bytes::from_static(b"abc"));
        let first = cur.read_len(3)?;
        cur.rewind(3)?;
        assert_eq!(first, cur.read_len(3)?);
        Ok(())
    }

    #[test]
    fn test_cursor_huge_length() -> Result<()> {
        let mut bs = vec![0xaau8];
        bs.extend_from_slice(&u64::MAX.to_le_bytes());
        let mut cur = ByteCursor::new(bs);
        cur.skip(1)?;
        let fail = cur.read_len_prefixed(8);
        assert!(matches!(fail, Err(Error::InputIncomplete(Needed::Size(_)))));
        // length prefix is consumed, nothing after it
        assert_eq!(9, cur.consumed());
        cur.rewind(8)?;
        let fail = cur.read_len(usize::MAX);
        assert!(matches!(
            fail,
            Err(Error::InputIncomplete(Needed::Size(n))) if n == usize::MAX - 8
        ));
        assert_eq!(1, cur.consumed());
        assert!(cur.skip(usize::MAX).is_err());
        assert!(cur.read_cstr(usize::MAX).is_err());
        assert_eq!(1, cur.consumed());
        Ok(())
    }
}
