//! meaningful data structures and parsing logic of QueryEvent
use crate::error::{Error, Result};
use crate::util::{lossy_string, read_opt_string, strict_string};
use crate::ReadFromBytes;
use bitflags::bitflags;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;
use std::convert::TryFrom;

/// Data of QueryEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/query-event.html
/// only support binlog v4 (with status_vars_length at end of post header)
#[derive(Debug, Clone, Serialize)]
pub struct QueryData {
    pub slave_proxy_id: u32,
    pub exec_time: u32,
    pub schema_len: u8,
    pub error_code: u16,
    pub status_vars_len: u16,
    // below is variable part
    pub status_vars: QueryStatusVars,
    pub schema: String,
    pub query: String,
}

impl ReadFromBytes for QueryData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let slave_proxy_id = input.read_le_u32()?;
        let exec_time = input.read_le_u32()?;
        let schema_len = input.read_u8()?;
        let error_code = input.read_le_u16()?;
        let status_vars_len = input.read_le_u16()?;
        // 13(4+4+1+2+2) bytes consumed
        let (status_vars, schema, query) = read_query_body(input, status_vars_len, schema_len)?;
        Ok(QueryData {
            slave_proxy_id,
            exec_time,
            schema_len,
            error_code,
            status_vars_len,
            status_vars,
            schema,
            query,
        })
    }
}

/// read variable part shared by QueryEvent and ExecuteLoadQueryEvent:
/// status vars, schema, a null byte and the query text till end of event
pub(crate) fn read_query_body(
    input: &mut ByteCursor,
    status_vars_len: u16,
    schema_len: u8,
) -> Result<(QueryStatusVars, String, String)> {
    let mut block = ByteCursor::new(input.read_len(status_vars_len as usize)?);
    let status_vars = QueryStatusVars::read_from(&mut block)?;
    let schema = strict_string(input.read_len(schema_len as usize)?)?;
    input.skip(1)?;
    let query = lossy_string(&input.read_remaining());
    Ok((status_vars, schema, query))
}

/// keys of query status variables
///
/// reference: https://github.com/mysql/mysql-server/blob/8.0/libbinlogevents/include/statement_events.h
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusVarKey {
    Flags2,
    SqlMode,
    Catalog,
    AutoIncrement,
    Charset,
    TimeZone,
    CatalogNz,
    LcTimeNames,
    CharsetDatabase,
    TableMapForUpdate,
    MasterDataWritten,
    Invoker,
    UpdatedDbNames,
    Microseconds,
    CommitTs,
    CommitTs2,
    ExplicitDefaultsForTimestamp,
    DdlLoggedWithXid,
    DefaultCollationForUtf8mb4,
    SqlRequirePrimaryKey,
    DefaultTableEncryption,
    // below two are MariaDB only
    Hrnow,
    Xid,
}

impl TryFrom<u8> for StatusVarKey {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        let key = match code {
            0x00 => StatusVarKey::Flags2,
            0x01 => StatusVarKey::SqlMode,
            0x02 => StatusVarKey::Catalog,
            0x03 => StatusVarKey::AutoIncrement,
            0x04 => StatusVarKey::Charset,
            0x05 => StatusVarKey::TimeZone,
            0x06 => StatusVarKey::CatalogNz,
            0x07 => StatusVarKey::LcTimeNames,
            0x08 => StatusVarKey::CharsetDatabase,
            0x09 => StatusVarKey::TableMapForUpdate,
            0x0a => StatusVarKey::MasterDataWritten,
            0x0b => StatusVarKey::Invoker,
            0x0c => StatusVarKey::UpdatedDbNames,
            0x0d => StatusVarKey::Microseconds,
            0x0e => StatusVarKey::CommitTs,
            0x0f => StatusVarKey::CommitTs2,
            0x10 => StatusVarKey::ExplicitDefaultsForTimestamp,
            0x11 => StatusVarKey::DdlLoggedWithXid,
            0x12 => StatusVarKey::DefaultCollationForUtf8mb4,
            0x13 => StatusVarKey::SqlRequirePrimaryKey,
            0x14 => StatusVarKey::DefaultTableEncryption,
            0x80 => StatusVarKey::Hrnow,
            0x81 => StatusVarKey::Xid,
            _ => return Err(Error::UnknownStatusVariable(code)),
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoIncrement {
    pub increment: u16,
    pub offset: u16,
}

// https://dev.mysql.com/doc/refman/8.0/en/charset-connection.html
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Charset {
    pub client: u16,
    pub connection: u16,
    pub server: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoker {
    pub user: Option<String>,
    pub host: Option<String>,
}

/// status variables of query event
///
/// each field is present only if its key appears in the block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryStatusVars {
    pub flags2: Option<u32>,
    pub sql_mode: Option<u64>,
    pub auto_increment: Option<AutoIncrement>,
    pub charset: Option<Charset>,
    pub time_zone: Option<String>,
    pub catalog_nz: Option<String>,
    pub lc_time_names: Option<u16>,
    pub charset_database: Option<u16>,
    pub table_map_for_update: Option<u64>,
    pub invoker: Option<Invoker>,
    pub updated_db_names: Option<Vec<String>>,
    // actually is 3-byte int
    pub microseconds: Option<u32>,
    pub explicit_defaults_for_timestamp: Option<bool>,
    pub ddl_xid: Option<u64>,
    pub default_collation_for_utf8mb4: Option<u16>,
    pub sql_require_primary_key: Option<u8>,
    pub default_table_encryption: Option<u8>,
    pub hrnow: Option<u32>,
    pub xid: Option<u64>,
}

impl QueryStatusVars {
    pub fn flags2_code(&self) -> Option<Flags2Code> {
        self.flags2.map(Flags2Code::from_bits_truncate)
    }

    pub fn sql_mode_code(&self) -> Option<SqlModeCode> {
        self.sql_mode.map(SqlModeCode::from_bits_truncate)
    }
}

/// input must be exactly the status vars block
impl ReadFromBytes for QueryStatusVars {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let mut vars = QueryStatusVars::default();
        while input.has_remaining_bytes() {
            let key = StatusVarKey::try_from(input.read_u8()?)?;
            match key {
                StatusVarKey::Flags2 => vars.flags2 = Some(input.read_le_u32()?),
                StatusVarKey::SqlMode => vars.sql_mode = Some(input.read_le_u64()?),
                // legacy catalog of 5.0.x, carries no value
                StatusVarKey::Catalog => (),
                StatusVarKey::AutoIncrement => {
                    let increment = input.read_le_u16()?;
                    let offset = input.read_le_u16()?;
                    vars.auto_increment = Some(AutoIncrement { increment, offset });
                }
                StatusVarKey::Charset => {
                    let client = input.read_le_u16()?;
                    let connection = input.read_le_u16()?;
                    let server = input.read_le_u16()?;
                    vars.charset = Some(Charset {
                        client,
                        connection,
                        server,
                    });
                }
                StatusVarKey::TimeZone => vars.time_zone = read_opt_string(input)?,
                StatusVarKey::CatalogNz => vars.catalog_nz = read_opt_string(input)?,
                StatusVarKey::LcTimeNames => vars.lc_time_names = Some(input.read_le_u16()?),
                StatusVarKey::CharsetDatabase => {
                    vars.charset_database = Some(input.read_le_u16()?)
                }
                StatusVarKey::TableMapForUpdate => {
                    vars.table_map_for_update = Some(input.read_le_u64()?)
                }
                StatusVarKey::MasterDataWritten => (),
                StatusVarKey::Invoker => {
                    let user = read_opt_string(input)?;
                    let host = read_opt_string(input)?;
                    vars.invoker = Some(Invoker { user, host });
                }
                StatusVarKey::UpdatedDbNames => {
                    let cnt = input.read_u8()?;
                    // 254 means a single db with empty name, nothing follows
                    let mut names = Vec::new();
                    if cnt != 254 {
                        for _ in 0..cnt {
                            names.push(strict_string(input.read_until(0, false)?)?);
                        }
                    }
                    vars.updated_db_names = Some(names);
                }
                StatusVarKey::Microseconds => vars.microseconds = Some(input.read_le_u24()?),
                StatusVarKey::CommitTs | StatusVarKey::CommitTs2 => (),
                StatusVarKey::ExplicitDefaultsForTimestamp => {
                    vars.explicit_defaults_for_timestamp = Some(input.read_u8()? != 0)
                }
                StatusVarKey::DdlLoggedWithXid => vars.ddl_xid = Some(input.read_le_u64()?),
                StatusVarKey::DefaultCollationForUtf8mb4 => {
                    vars.default_collation_for_utf8mb4 = Some(input.read_le_u16()?)
                }
                StatusVarKey::SqlRequirePrimaryKey => {
                    vars.sql_require_primary_key = Some(input.read_u8()?)
                }
                StatusVarKey::DefaultTableEncryption => {
                    vars.default_table_encryption = Some(input.read_u8()?)
                }
                StatusVarKey::Hrnow => vars.hrnow = Some(input.read_le_u24()?),
                StatusVarKey::Xid => vars.xid = Some(input.read_le_u64()?),
            }
        }
        Ok(vars)
    }
}

bitflags! {
    pub struct Flags2Code: u32 {
        const AUTO_IS_NULL      = 0x0000_4000;
        const NOT_AUTOCOMMIT    = 0x0008_0000;
        const NO_FOREIGN_KEY_CHECKS = 0x0400_0000;
        const RELAXED_UNIQUE_CHECKS = 0x0800_0000;
    }
}

bitflags! {
    pub struct SqlModeCode: u64 {
        const REAL_AS_FLOAT     = 0x0000_0001;
        const PIPES_AS_CONCAT   = 0x0000_0002;
        const ANSI_QUOTES       = 0x0000_0004;
        const IGNORE_SPACE      = 0x0000_0008;
        const NOT_USED          = 0x0000_0010;
        const ONLY_FULL_GROUP_BY    = 0x0000_0020;
        const NO_UNSIGNED_SUBTRACTION   = 0x0000_0040;
        const NO_DIR_IN_CREATE  = 0x0000_0080;
        const POSTGRESQL        = 0x0000_0100;
        const ORACLE            = 0x0000_0200;
        const MSSQL             = 0x0000_0400;
        const DB2               = 0x0000_0800;
        const MAXDB             = 0x0000_1000;
        const NO_KEY_OPTIONS    = 0x0000_2000;
        const NO_TABLE_OPTIONS  = 0x0000_4000;
        const NO_FIELD_OPTIONS  = 0x0000_8000;
        const MYSQL323          = 0x0001_0000;
        const MYSQL40           = 0x0002_0000;
        const ANSI              = 0x0004_0000;
        const NO_AUTO_VALUE_ON_ZERO = 0x0008_0000;
        const NO_BACKSLASH_ESCAPES  = 0x0010_0000;
        const STRICT_TRANS_TABLES   = 0x0020_0000;
        const STRICT_ALL_TABLES = 0x0040_0000;
        const NO_ZERO_IN_DATE   = 0x0080_0000;
        const NO_ZERO_DATE      = 0x0100_0000;
        const INVALID_DATES     = 0x0200_0000;
        const ERROR_FOR_DIVISION_BY_ZERO    = 0x0400_0000;
        const TRADITIONAL       = 0x0800_0000;
        const NO_AUTO_CREATE_USER   = 0x1000_0000;
        const HIGH_NOT_PRECEDENCE   = 0x2000_0000;
        const NO_ENGINE_SUBSTITUTION    = 0x4000_0000;
        const PAD_CHAR_TO_FULL_LENGTH   = 0x8000_0000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_parser::WriteNumber;

    fn query_body(status_vars: &[u8], schema: &[u8], query: &[u8]) -> Vec<u8> {
        let mut bs = vec![];
        bs.write_le_u32(42);
        bs.write_le_u32(3);
        bs.write_u8(schema.len() as u8);
        bs.write_le_u16(0);
        bs.write_le_u16(status_vars.len() as u16);
        bs.extend_from_slice(status_vars);
        bs.extend_from_slice(schema);
        bs.write_u8(0);
        bs.extend_from_slice(query);
        bs
    }

    #[test]
    fn test_query_without_status_vars() -> Result<()> {
        let bs = query_body(&[], b"db1", b"BEGIN");
        let size = bs.len();
        let mut input = ByteCursor::new(bs);
        let data = QueryData::read_from(&mut input)?;
        dbg!(&data);
        assert_eq!(42, data.slave_proxy_id);
        assert_eq!(3, data.exec_time);
        assert_eq!(0, data.status_vars_len);
        assert_eq!(QueryStatusVars::default(), data.status_vars);
        assert_eq!("db1", data.schema);
        assert_eq!("BEGIN", data.query);
        assert_eq!(size, input.consumed());
        Ok(())
    }

    #[test]
    fn test_query_lossy_text() -> Result<()> {
        let bs = query_body(&[], b"db1", b"SELECT '\xff'");
        let data = QueryData::read_from(&mut ByteCursor::new(bs))?;
        assert_eq!("SELECT '\u{fffd}'", data.query);
        // schema must be valid utf8
        let bs = query_body(&[], b"d\xff", b"BEGIN");
        let err = QueryData::read_from(&mut ByteCursor::new(bs)).unwrap_err();
        assert!(matches!(err, Error::Utf8StringError(_)));
        Ok(())
    }

    #[test]
    fn test_status_vars_selected() -> Result<()> {
        let mut block = vec![];
        block.write_u8(0x03);
        block.write_le_u16(2);
        block.write_le_u16(1);
        block.write_u8(0x04);
        block.write_le_u16(33);
        block.write_le_u16(33);
        block.write_le_u16(8);
        block.write_u8(0x05);
        block.write_u8(6);
        block.extend_from_slice(b"SYSTEM");
        let vars = QueryStatusVars::read_from(&mut ByteCursor::new(block))?;
        let expected = QueryStatusVars {
            auto_increment: Some(AutoIncrement {
                increment: 2,
                offset: 1,
            }),
            charset: Some(Charset {
                client: 33,
                connection: 33,
                server: 8,
            }),
            time_zone: Some("SYSTEM".to_owned()),
            ..Default::default()
        };
        assert_eq!(expected, vars);
        Ok(())
    }

    #[test]
    fn test_status_vars_common() -> Result<()> {
        let mut block = vec![];
        block.write_u8(0x00);
        block.write_le_u32(0x0008_0000);
        block.write_u8(0x01);
        block.write_le_u64(0x0020_0000 | 0x4000_0000);
        block.write_u8(0x02);
        block.write_u8(0x06);
        block.write_u8(3);
        block.extend_from_slice(b"std");
        block.write_u8(0x0b);
        block.write_u8(4);
        block.extend_from_slice(b"root");
        block.write_u8(0);
        block.write_u8(0x0c);
        block.write_u8(2);
        block.extend_from_slice(b"db1\0db2\0");
        block.write_u8(0x0d);
        block.write_le_u24(123_456);
        block.write_u8(0x10);
        block.write_u8(1);
        block.write_u8(0x12);
        block.write_le_u16(255);
        block.write_u8(0x80);
        block.write_le_u24(7);
        block.write_u8(0x81);
        block.write_le_u64(99);
        let vars = QueryStatusVars::read_from(&mut ByteCursor::new(block))?;
        dbg!(&vars);
        assert!(vars
            .flags2_code()
            .unwrap()
            .contains(Flags2Code::NOT_AUTOCOMMIT));
        let sql_mode = vars.sql_mode_code().unwrap();
        assert!(sql_mode.contains(SqlModeCode::STRICT_TRANS_TABLES));
        assert!(sql_mode.contains(SqlModeCode::NO_ENGINE_SUBSTITUTION));
        assert_eq!(Some("std"), vars.catalog_nz.as_deref());
        assert_eq!(
            Some(Invoker {
                user: Some("root".to_owned()),
                host: None
            }),
            vars.invoker
        );
        assert_eq!(
            Some(vec!["db1".to_owned(), "db2".to_owned()]),
            vars.updated_db_names
        );
        assert_eq!(Some(123_456), vars.microseconds);
        assert_eq!(Some(true), vars.explicit_defaults_for_timestamp);
        assert_eq!(Some(255), vars.default_collation_for_utf8mb4);
        assert_eq!(Some(7), vars.hrnow);
        assert_eq!(Some(99), vars.xid);
        assert!(vars.time_zone.is_none());
        Ok(())
    }

    #[test]
    fn test_status_vars_fixed_width_keys() -> Result<()> {
        let mut block = vec![];
        block.write_u8(0x09);
        block.write_le_u64(0x0102_0304_0506_0708);
        // master data written and commit ts carry no value
        block.write_u8(0x0a);
        block.write_u8(0x08);
        block.write_le_u16(45);
        block.write_u8(0x0e);
        block.write_u8(0x0f);
        block.write_u8(0x11);
        block.write_le_u64(77);
        block.write_u8(0x13);
        block.write_u8(1);
        block.write_u8(0x14);
        block.write_u8(0);
        assert_eq!(28, block.len());
        let mut input = ByteCursor::new(block.clone());
        let vars = QueryStatusVars::read_from(&mut input)?;
        dbg!(&vars);
        let expected = QueryStatusVars {
            table_map_for_update: Some(0x0102_0304_0506_0708),
            charset_database: Some(45),
            ddl_xid: Some(77),
            sql_require_primary_key: Some(1),
            default_table_encryption: Some(0),
            ..Default::default()
        };
        assert_eq!(expected, vars);
        assert_eq!(28, input.consumed());

        // text after the block stays aligned
        let bs = query_body(&block, b"db1", b"COMMIT");
        let size = bs.len();
        let mut input = ByteCursor::new(bs);
        let data = QueryData::read_from(&mut input)?;
        assert_eq!(expected, data.status_vars);
        assert_eq!("db1", data.schema);
        assert_eq!("COMMIT", data.query);
        assert_eq!(size, input.consumed());
        Ok(())
    }

    #[test]
    fn test_status_vars_updated_db_names_254() -> Result<()> {
        // nothing follows the count, next key is read right after
        let block = vec![0x0c, 254, 0x07, 0x01, 0x00];
        let mut input = ByteCursor::new(block);
        let vars = QueryStatusVars::read_from(&mut input)?;
        assert_eq!(Some(vec![]), vars.updated_db_names);
        assert_eq!(Some(1), vars.lc_time_names);
        assert_eq!(5, input.consumed());
        Ok(())
    }

    #[test]
    fn test_status_vars_unknown_key() {
        let block = vec![0x03, 0x01, 0x00, 0x01, 0x00, 0x42, 0x00];
        let err = QueryStatusVars::read_from(&mut ByteCursor::new(block)).unwrap_err();
        assert!(matches!(err, Error::UnknownStatusVariable(0x42)));
    }

    #[test]
    fn test_status_vars_overrun_block() {
        // sql mode needs 8 bytes but block only has 4
        let mut bs = query_body(&[0x01, 0, 0, 0], b"db1", b"BEGIN");
        bs.extend_from_slice(b"padding");
        let err = QueryData::read_from(&mut ByteCursor::new(bs)).unwrap_err();
        assert!(err.is_underrun());
    }
}
