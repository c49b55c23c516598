use crate::my::LenEncInt;

/// append fixed-width integers to a buffer
///
/// each method returns the number of bytes written.
pub trait WriteNumber {
    /// write single byte
    fn write_u8(&mut self, n: u8) -> usize;

    /// write u16 as 2 bytes in little endian byte order
    fn write_le_u16(&mut self, n: u16) -> usize;

    /// write u24 as 3 bytes in little endian byte order
    fn write_le_u24(&mut self, n: u32) -> usize;

    /// write u32 as 4 bytes in little endian byte order
    fn write_le_u32(&mut self, n: u32) -> usize;

    /// write u48 as 6 bytes in little endian byte order
    fn write_le_u48(&mut self, n: u64) -> usize;

    /// write u56 as 7 bytes in little endian byte order
    fn write_le_u56(&mut self, n: u64) -> usize;

    /// write u64 as 8 bytes in little endian byte order
    fn write_le_u64(&mut self, n: u64) -> usize;

    fn write_be_u16(&mut self, n: u16) -> usize;

    fn write_be_u24(&mut self, n: u32) -> usize;

    fn write_be_u32(&mut self, n: u32) -> usize;

    fn write_len_enc_int(&mut self, n: LenEncInt) -> usize;
}

impl WriteNumber for Vec<u8> {
    fn write_u8(&mut self, n: u8) -> usize {
        self.push(n);
        1
    }

    fn write_le_u16(&mut self, n: u16) -> usize {
        self.extend(&n.to_le_bytes());
        2
    }

    fn write_le_u24(&mut self, n: u32) -> usize {
        debug_assert!(n <= 0xff_ffff);
        self.extend(&n.to_le_bytes()[..3]);
        3
    }

    fn write_le_u32(&mut self, n: u32) -> usize {
        self.extend(&n.to_le_bytes());
        4
    }

    fn write_le_u48(&mut self, n: u64) -> usize {
        debug_assert!(n <= 0xffff_ffff_ffffu64);
        self.extend(&n.to_le_bytes()[..6]);
        6
    }

    fn write_le_u56(&mut self, n: u64) -> usize {
        debug_assert!(n <= 0xff_ffff_ffff_ffffu64);
        self.extend(&n.to_le_bytes()[..7]);
        7
    }

    fn write_le_u64(&mut self, n: u64) -> usize {
        self.extend(&n.to_le_bytes());
        8
    }

    fn write_be_u16(&mut self, n: u16) -> usize {
        self.extend(&n.to_be_bytes());
        2
    }

    fn write_be_u24(&mut self, n: u32) -> usize {
        debug_assert!(n <= 0xff_ffff);
        self.extend(&n.to_be_bytes()[1..]);
        3
    }

    fn write_be_u32(&mut self, n: u32) -> usize {
        self.extend(&n.to_be_bytes());
        4
    }

    fn write_len_enc_int(&mut self, n: LenEncInt) -> usize {
        match n {
            LenEncInt::Null => self.write_u8(0xfb),
            LenEncInt::Err => self.write_u8(0xff),
            LenEncInt::Len1(n) => self.write_u8(n),
            LenEncInt::Len3(n) => self.write_u8(0xfc) + self.write_le_u16(n),
            LenEncInt::Len4(n) => self.write_u8(0xfd) + self.write_le_u24(n),
            LenEncInt::Len9(n) => self.write_u8(0xfe) + self.write_le_u64(n),
        }
    }
}
