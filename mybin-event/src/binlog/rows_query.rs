use crate::error::Result;
use crate::util::lossy_string;
use crate::ReadFromBytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;

/// Data of RowsQueryLogEvent
///
/// the length byte is truncated at 255 by server,
/// so the query always extends to end of the event
#[derive(Debug, Clone, Serialize)]
pub struct RowsQueryData {
    pub query_len: u8,
    pub query: String,
}

impl ReadFromBytes for RowsQueryData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let query_len = input.read_u8()?;
        let query = lossy_string(&input.read_remaining());
        Ok(RowsQueryData { query_len, query })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_query() -> Result<()> {
        let mut input = ByteCursor::new(&b"\x1cinsert into t1 values (1, 2)"[..]);
        let data = RowsQueryData::read_from(&mut input)?;
        assert_eq!(28, data.query_len);
        assert_eq!("insert into t1 values (1, 2)", data.query);
        assert_eq!(29, input.consumed());
        Ok(())
    }

    #[test]
    fn test_rows_query_truncated_len() -> Result<()> {
        let mut bs = vec![255u8];
        bs.extend(std::iter::repeat(b'x').take(300));
        let mut input = ByteCursor::new(bs);
        let data = RowsQueryData::read_from(&mut input)?;
        assert_eq!(300, data.query.len());
        assert_eq!(301, input.consumed());
        Ok(())
    }
}
