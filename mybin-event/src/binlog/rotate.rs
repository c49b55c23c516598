use crate::error::Result;
use crate::util::strict_string;
use crate::ReadFromBytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;

/// Data of RotateEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/rotate-event.html
#[derive(Debug, Clone, Serialize)]
pub struct RotateData {
    pub position: u64,
    // below is variable part
    pub next_binlog_filename: String,
}

impl ReadFromBytes for RotateData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let position = input.read_le_u64()?;
        let next_binlog_filename = strict_string(input.read_remaining())?;
        Ok(RotateData {
            position,
            next_binlog_filename,
        })
    }
}

/// Data of HeartbeatLogEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/heartbeat-event.html
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatData {
    pub ident: String,
}

impl ReadFromBytes for HeartbeatData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let ident = strict_string(input.read_remaining())?;
        Ok(HeartbeatData { ident })
    }
}
