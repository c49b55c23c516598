use crate::error::Result;
use crate::util::lossy_string;
use crate::ReadFromBytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;
use std::fmt;

/// Data of XidEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/xid-event.html
#[derive(Debug, Clone, Serialize)]
pub struct XidData {
    pub xid: u64,
}

impl ReadFromBytes for XidData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let xid = input.read_le_u64()?;
        Ok(XidData { xid })
    }
}

/// XA transaction identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XaXid {
    pub format_id: u32,
    pub gtrid: String,
    pub bqual: String,
}

/// logical xid is gtrid followed by bqual
impl fmt::Display for XaXid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.gtrid, self.bqual)
    }
}

impl XaXid {
    /// read gtrid and bqual data given their lengths
    pub(crate) fn read_data(
        input: &mut ByteCursor,
        format_id: u32,
        gtrid_len: usize,
        bqual_len: usize,
    ) -> Result<Self> {
        let gtrid = lossy_string(&input.read_len(gtrid_len)?);
        let bqual = lossy_string(&input.read_len(bqual_len)?);
        Ok(XaXid {
            format_id,
            gtrid,
            bqual,
        })
    }
}

/// Data of XaPrepareLogEvent
///
/// reference: https://github.com/mysql/mysql-server/blob/8.0/libbinlogevents/include/control_events.h
#[derive(Debug, Clone, Serialize)]
pub struct XaPrepareData {
    pub one_phase: bool,
    pub xid: XaXid,
}

impl ReadFromBytes for XaPrepareData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let one_phase = input.read_u8()? != 0;
        let format_id = input.read_le_u32()?;
        let gtrid_len = input.read_le_u32()?;
        let bqual_len = input.read_le_u32()?;
        let xid = XaXid::read_data(input, format_id, gtrid_len as usize, bqual_len as usize)?;
        Ok(XaPrepareData { one_phase, xid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_parser::WriteNumber;

    #[test]
    fn test_xid() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u64(0x1234);
        let mut input = ByteCursor::new(bs);
        assert_eq!(0x1234, XidData::read_from(&mut input)?.xid);
        assert_eq!(8, input.consumed());
        Ok(())
    }

    #[test]
    fn test_xa_prepare() -> Result<()> {
        let mut bs = vec![];
        bs.write_u8(1);
        bs.write_le_u32(1);
        bs.write_le_u32(3);
        bs.write_le_u32(2);
        bs.extend_from_slice(b"abcde");
        let size = bs.len();
        let mut input = ByteCursor::new(bs);
        let data = XaPrepareData::read_from(&mut input)?;
        assert!(data.one_phase);
        assert_eq!(1, data.xid.format_id);
        assert_eq!("abc", data.xid.gtrid);
        assert_eq!("de", data.xid.bqual);
        assert_eq!("abcde", data.xid.to_string());
        assert_eq!(size, input.consumed());
        Ok(())
    }
}
