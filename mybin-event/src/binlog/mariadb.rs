//! MariaDB specific events
//!
//! reference: https://mariadb.com/kb/en/replication-protocol/
use super::xid::XaXid;
use crate::error::Result;
use crate::util::{base64_bytes, strict_string};
use crate::{ReadFromBytes, ReadFromBytesWithContext};
use bitflags::bitflags;
use bytes::Bytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde::{Serialize, Serializer};
use serde_derive::Serialize;
use std::fmt;

/// MariaDB gtid: domain, server and sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MariadbGtid {
    pub domain_id: u32,
    pub server_id: u32,
    pub seq_no: u64,
}

impl fmt::Display for MariadbGtid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.domain_id, self.server_id, self.seq_no)
    }
}

impl Serialize for MariadbGtid {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

bitflags! {
    pub struct MariadbGtidFlags: u8 {
        const STANDALONE        = 0x01;
        const GROUP_COMMIT_ID   = 0x02;
        const TRANSACTIONAL     = 0x04;
        const ALLOW_PARALLEL    = 0x08;
        const WAITED            = 0x10;
        const DDL               = 0x20;
        const PREPARED_XA       = 0x40;
        const COMPLETED_XA      = 0x80;
    }
}

/// Data of MariadbGtidEvent
///
/// reference: https://mariadb.com/kb/en/gtid_event/
#[derive(Debug, Clone, Serialize)]
pub struct MariadbGtidData {
    pub gtid: MariadbGtid,
    #[serde(serialize_with = "serialize_gtid_flags")]
    pub flags: MariadbGtidFlags,
    pub commit_id: Option<u64>,
    pub xid: Option<XaXid>,
}

fn serialize_gtid_flags<S: Serializer>(
    flags: &MariadbGtidFlags,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u8(flags.bits())
}

/// server id is not in the payload, so is taken from event header
impl<'c> ReadFromBytesWithContext<'c> for MariadbGtidData {
    type Context = u32;

    fn read_with_ctx(input: &mut ByteCursor, server_id: u32) -> Result<Self> {
        let seq_no = input.read_le_u64()?;
        let domain_id = input.read_le_u32()?;
        let flags = MariadbGtidFlags::from_bits_truncate(input.read_u8()?);
        let commit_id = if flags.contains(MariadbGtidFlags::GROUP_COMMIT_ID) {
            Some(input.read_le_u64()?)
        } else {
            None
        };
        let xid = if flags.intersects(MariadbGtidFlags::PREPARED_XA | MariadbGtidFlags::COMPLETED_XA)
        {
            let format_id = input.read_le_u32()?;
            let gtrid_len = input.read_u8()?;
            let bqual_len = input.read_u8()?;
            Some(XaXid::read_data(
                input,
                format_id,
                gtrid_len as usize,
                bqual_len as usize,
            )?)
        } else {
            None
        };
        // remaining bytes are zero padding
        input.read_remaining();
        Ok(MariadbGtidData {
            gtid: MariadbGtid {
                domain_id,
                server_id,
                seq_no,
            },
            flags,
            commit_id,
            xid,
        })
    }
}

/// Data of MariadbGtidListEvent
///
/// reference: https://mariadb.com/kb/en/gtid_list_event/
#[derive(Debug, Clone, Serialize)]
pub struct MariadbGtidListData {
    // top 4 bits of the count field
    pub flags: u8,
    pub gtids: Vec<MariadbGtid>,
}

impl ReadFromBytes for MariadbGtidListData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let raw = input.read_le_u32()?;
        let count = raw & 0x0fff_ffff;
        let flags = (raw >> 28) as u8;
        let mut gtids = Vec::new();
        for _ in 0..count {
            let domain_id = input.read_le_u32()?;
            let server_id = input.read_le_u32()?;
            let seq_no = input.read_le_u64()?;
            gtids.push(MariadbGtid {
                domain_id,
                server_id,
                seq_no,
            });
        }
        Ok(MariadbGtidListData { flags, gtids })
    }
}

/// Data of MariadbBinlogCheckpointEvent
#[derive(Debug, Clone, Serialize)]
pub struct MariadbBinlogCheckpointData {
    pub filename: String,
}

impl ReadFromBytes for MariadbBinlogCheckpointData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let filename = strict_string(input.read_len_prefixed(4)?)?;
        Ok(MariadbBinlogCheckpointData { filename })
    }
}

/// Data of MariadbAnnotateRowsEvent
///
/// statement is kept as raw bytes, which is not guaranteed to be valid text
#[derive(Debug, Clone, Serialize)]
pub struct MariadbAnnotateRowsData {
    #[serde(serialize_with = "base64_bytes::serialize")]
    pub sql_statement: Bytes,
}

impl ReadFromBytes for MariadbAnnotateRowsData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let sql_statement = input.read_remaining();
        Ok(MariadbAnnotateRowsData { sql_statement })
    }
}

/// Data of MariadbStartEncryptionEvent
///
/// reference: https://mariadb.com/kb/en/start_encryption_event/
#[derive(Debug, Clone, Serialize)]
pub struct MariadbStartEncryptionData {
    pub scheme: u8,
    pub key_version: u32,
    #[serde(serialize_with = "base64_bytes::serialize")]
    pub nonce: Bytes,
}

impl ReadFromBytes for MariadbStartEncryptionData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let scheme = input.read_u8()?;
        let key_version = input.read_le_u32()?;
        let nonce = input.read_len(12)?;
        Ok(MariadbStartEncryptionData {
            scheme,
            key_version,
            nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_parser::WriteNumber;

    #[test]
    fn test_mariadb_gtid() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u64(100);
        bs.write_le_u32(0);
        bs.write_u8(0x0c);
        bs.extend_from_slice(&[0u8; 6]);
        let mut input = ByteCursor::new(bs);
        let data = MariadbGtidData::read_with_ctx(&mut input, 1)?;
        assert_eq!("0-1-100", data.gtid.to_string());
        assert!(data.flags.contains(MariadbGtidFlags::TRANSACTIONAL));
        assert_eq!(None, data.commit_id);
        assert!(data.xid.is_none());
        assert_eq!(19, input.consumed());
        Ok(())
    }

    #[test]
    fn test_mariadb_gtid_commit_id_and_xa() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u64(7);
        bs.write_le_u32(2);
        bs.write_u8(0x02 | 0x40);
        bs.write_le_u64(55);
        bs.write_le_u32(1);
        bs.write_u8(2);
        bs.write_u8(1);
        bs.extend_from_slice(b"gtb");
        let size = bs.len();
        let mut input = ByteCursor::new(bs);
        let data = MariadbGtidData::read_with_ctx(&mut input, 3)?;
        assert_eq!("2-3-7", data.gtid.to_string());
        assert_eq!(Some(55), data.commit_id);
        let xid = data.xid.unwrap();
        assert_eq!("gt", xid.gtrid);
        assert_eq!("b", xid.bqual);
        assert_eq!(size, input.consumed());
        Ok(())
    }

    #[test]
    fn test_mariadb_gtid_list() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u32(2 | (1 << 28));
        for (d, s, q) in &[(0u32, 1u32, 100u64), (1, 2, 3)] {
            bs.write_le_u32(*d);
            bs.write_le_u32(*s);
            bs.write_le_u64(*q);
        }
        let mut input = ByteCursor::new(bs);
        let data = MariadbGtidListData::read_from(&mut input)?;
        assert_eq!(1, data.flags);
        let gtids: Vec<String> = data.gtids.iter().map(|g| g.to_string()).collect();
        assert_eq!(vec!["0-1-100", "1-2-3"], gtids);
        assert_eq!(36, input.consumed());
        Ok(())
    }

    #[test]
    fn test_mariadb_checkpoint() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u32(16);
        bs.extend_from_slice(b"mysql-bin.000001");
        let mut input = ByteCursor::new(bs);
        let data = MariadbBinlogCheckpointData::read_from(&mut input)?;
        assert_eq!("mysql-bin.000001", data.filename);
        assert_eq!(20, input.consumed());
        Ok(())
    }

    #[test]
    fn test_mariadb_annotate_rows() -> Result<()> {
        let mut input = ByteCursor::new(&b"insert into t values ('\xff')"[..]);
        let data = MariadbAnnotateRowsData::read_from(&mut input)?;
        assert_eq!(&b"insert into t values ('\xff')"[..], data.sql_statement);
        Ok(())
    }

    #[test]
    fn test_mariadb_start_encryption() -> Result<()> {
        let mut bs = vec![1u8];
        bs.write_le_u32(3);
        bs.extend_from_slice(&[0xaa; 12]);
        let mut input = ByteCursor::new(bs);
        let data = MariadbStartEncryptionData::read_from(&mut input)?;
        assert_eq!(1, data.scheme);
        assert_eq!(3, data.key_version);
        assert_eq!(&[0xaa; 12][..], data.nonce);
        assert_eq!(17, input.consumed());
        Ok(())
    }
}
