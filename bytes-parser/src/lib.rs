//! essential parsing of bytes
//!
//! inspired by nom parser combinator (https://github.com/Geal/nom)
pub mod bytes;
pub mod cursor;
pub mod error;
pub mod my;
pub mod number;

pub use crate::cursor::ByteCursor;
pub use crate::error::*;
pub use crate::my::LenEncInt;
pub use crate::number::WriteNumber;

use ::bytes::Bytes;

/// forward-only reads over a byte source
///
/// implementors provide access to the unread part and
/// a way to split off a prefix, everything else is
/// derived from these two methods.
/// all multi-byte integers are little endian unless the
/// method name says otherwise.
pub trait ReadBytesExt {
    /// the bytes not yet consumed
    fn chunk(&self) -> &[u8];

    /// take `len` bytes and advance
    ///
    /// fails without consuming anything if less than `len` bytes remain
    fn read_len(&mut self, len: usize) -> Result<Bytes>;

    #[inline]
    fn remaining_len(&self) -> usize {
        self.chunk().len()
    }

    #[inline]
    fn has_remaining_bytes(&self) -> bool {
        !self.chunk().is_empty()
    }

    #[inline]
    fn skip(&mut self, len: usize) -> Result<()> {
        self.read_len(len).map(|_| ())
    }

    /// take all remaining bytes
    #[inline]
    fn read_remaining(&mut self) -> Bytes {
        let len = self.remaining_len();
        // never fails as exactly the remaining length is requested
        self.read_len(len).unwrap_or_else(|_| Bytes::new())
    }

    /// take bytes until encountering given byte
    ///
    /// the end byte is always consumed, and will be
    /// included in the returned bytes if inclusive flag is set.
    fn read_until(&mut self, b: u8, inclusive: bool) -> Result<Bytes> {
        let pos = self
            .chunk()
            .iter()
            .position(|&x| x == b)
            .ok_or(Error::InputIncomplete(Needed::Unknown))?;
        let mut bs = self.read_len(pos + 1)?;
        if !inclusive {
            bs.truncate(pos);
        }
        Ok(bs)
    }

    /// take a null-terminated string of at most `max` bytes
    ///
    /// if a null byte is found within `max` bytes, it is consumed
    /// but not returned. otherwise `max` bytes are taken.
    fn read_cstr(&mut self, max: usize) -> Result<Bytes> {
        let scan = max.min(self.remaining_len());
        match self.chunk()[..scan].iter().position(|&x| x == 0) {
            Some(pos) => {
                let mut bs = self.read_len(pos + 1)?;
                bs.truncate(pos);
                Ok(bs)
            }
            None => self.read_len(max),
        }
    }

    /// take bytes prefixed by a little endian length of `width` bytes
    fn read_len_prefixed(&mut self, width: usize) -> Result<Bytes> {
        let len = match width {
            1 => self.read_u8()? as usize,
            2 => self.read_le_u16()? as usize,
            3 => self.read_le_u24()? as usize,
            4 => self.read_le_u32()? as usize,
            8 => self.read_le_u64()? as usize,
            _ => {
                return Err(Error::ConstraintError(format!(
                    "invalid length prefix width {}",
                    width
                )))
            }
        };
        self.read_len(len)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bs = self.read_len(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(&bs);
        Ok(arr)
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    #[inline]
    fn read_le_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    #[inline]
    fn read_le_u24(&mut self) -> Result<u32> {
        let [b0, b1, b2] = self.read_array::<3>()?;
        Ok(u32::from_le_bytes([b0, b1, b2, 0]))
    }

    #[inline]
    fn read_le_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// 6-byte truncated integer
    #[inline]
    fn read_le_u48(&mut self) -> Result<u64> {
        let [b0, b1, b2, b3, b4, b5] = self.read_array::<6>()?;
        Ok(u64::from_le_bytes([b0, b1, b2, b3, b4, b5, 0, 0]))
    }

    /// 7-byte truncated integer
    #[inline]
    fn read_le_u56(&mut self) -> Result<u64> {
        let [b0, b1, b2, b3, b4, b5, b6] = self.read_array::<7>()?;
        Ok(u64::from_le_bytes([b0, b1, b2, b3, b4, b5, b6, 0]))
    }

    #[inline]
    fn read_le_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    #[inline]
    fn read_le_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    #[inline]
    fn read_le_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_le_u64()?))
    }

    #[inline]
    fn read_be_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    #[inline]
    fn read_be_u24(&mut self) -> Result<u32> {
        let [b0, b1, b2] = self.read_array::<3>()?;
        Ok(u32::from_be_bytes([0, b0, b1, b2]))
    }

    #[inline]
    fn read_be_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// read a MySQL length encoded integer
    fn read_len_enc_int(&mut self) -> Result<LenEncInt> {
        let len = self.read_u8()?;
        let lei = match len {
            0xfb => LenEncInt::Null,
            0xfc => LenEncInt::Len3(self.read_le_u16()?),
            0xfd => LenEncInt::Len4(self.read_le_u24()?),
            0xfe => LenEncInt::Len9(self.read_le_u64()?),
            0xff => LenEncInt::Err,
            _ => LenEncInt::Len1(len),
        };
        Ok(lei)
    }
}
