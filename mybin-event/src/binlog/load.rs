//! events of LOAD DATA INFILE statement
use super::query::{read_query_body, QueryStatusVars};
use crate::error::Result;
use crate::util::base64_bytes;
use crate::ReadFromBytes;
use bytes::Bytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;

/// Data of BeginLoadQueryEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/begin-load-query-event.html
#[derive(Debug, Clone, Serialize)]
pub struct BeginLoadQueryData {
    pub file_id: u32,
    #[serde(serialize_with = "base64_bytes::serialize")]
    pub block_data: Bytes,
}

impl ReadFromBytes for BeginLoadQueryData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let file_id = input.read_le_u32()?;
        let block_data = input.read_remaining();
        Ok(BeginLoadQueryData {
            file_id,
            block_data,
        })
    }
}

/// Data of ExecuteLoadQueryEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/execute-load-query-event.html
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteLoadQueryData {
    pub slave_proxy_id: u32,
    pub exec_time: u32,
    pub schema_len: u8,
    pub error_code: u16,
    pub status_vars_len: u16,
    pub file_id: u32,
    pub start_pos: u32,
    pub end_pos: u32,
    pub dup_handling_flags: u8,
    // below is variable part
    pub status_vars: QueryStatusVars,
    pub schema: String,
    pub query: String,
}

impl ReadFromBytes for ExecuteLoadQueryData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let slave_proxy_id = input.read_le_u32()?;
        let exec_time = input.read_le_u32()?;
        let schema_len = input.read_u8()?;
        let error_code = input.read_le_u16()?;
        let status_vars_len = input.read_le_u16()?;
        let file_id = input.read_le_u32()?;
        let start_pos = input.read_le_u32()?;
        let end_pos = input.read_le_u32()?;
        let dup_handling_flags = input.read_u8()?;
        // 26 bytes consumed
        let (status_vars, schema, query) = read_query_body(input, status_vars_len, schema_len)?;
        Ok(ExecuteLoadQueryData {
            slave_proxy_id,
            exec_time,
            schema_len,
            error_code,
            status_vars_len,
            file_id,
            start_pos,
            end_pos,
            dup_handling_flags,
            status_vars,
            schema,
            query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_parser::WriteNumber;

    #[test]
    fn test_begin_load_query() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u32(5);
        bs.extend_from_slice(b"1,a\n2,b\n");
        let mut input = ByteCursor::new(bs);
        let data = BeginLoadQueryData::read_from(&mut input)?;
        assert_eq!(5, data.file_id);
        assert_eq!(&b"1,a\n2,b\n"[..], data.block_data);
        assert_eq!(12, input.consumed());
        Ok(())
    }

    #[test]
    fn test_execute_load_query() -> Result<()> {
        let query = b"LOAD DATA INFILE '/tmp/SQL_LOAD-1-2-5.data' INTO TABLE t1";
        let mut bs = vec![];
        bs.write_le_u32(9);
        bs.write_le_u32(0);
        bs.write_u8(4);
        bs.write_le_u16(0);
        bs.write_le_u16(5);
        bs.write_le_u32(5);
        bs.write_le_u32(17);
        bs.write_le_u32(45);
        bs.write_u8(1);
        bs.write_u8(0x00);
        bs.write_le_u32(0);
        bs.extend_from_slice(b"test");
        bs.write_u8(0);
        bs.extend_from_slice(query);
        let size = bs.len();
        let mut input = ByteCursor::new(bs);
        let data = ExecuteLoadQueryData::read_from(&mut input)?;
        dbg!(&data);
        assert_eq!(9, data.slave_proxy_id);
        assert_eq!(5, data.status_vars_len);
        assert_eq!(5, data.file_id);
        assert_eq!(17, data.start_pos);
        assert_eq!(45, data.end_pos);
        assert_eq!(1, data.dup_handling_flags);
        assert_eq!(Some(0), data.status_vars.flags2);
        assert_eq!("test", data.schema);
        assert_eq!(String::from_utf8_lossy(query), data.query);
        assert_eq!(size, input.consumed());
        Ok(())
    }
}
