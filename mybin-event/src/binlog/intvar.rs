use crate::error::Result;
use crate::ReadFromBytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;

/// Data of IntvarEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/intvar-event.html
#[derive(Debug, Clone, Serialize)]
pub struct IntvarData {
    pub key: IntvarKey,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum IntvarKey {
    Invalid,
    LastInsertId,
    InsertId,
    Unknown(u8),
}

impl From<u8> for IntvarKey {
    fn from(code: u8) -> Self {
        match code {
            0x00 => IntvarKey::Invalid,
            0x01 => IntvarKey::LastInsertId,
            0x02 => IntvarKey::InsertId,
            _ => IntvarKey::Unknown(code),
        }
    }
}

impl ReadFromBytes for IntvarData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let key = IntvarKey::from(input.read_u8()?);
        let low = input.read_le_u32()? as u64;
        // mysql writes 8-byte value, the high part follows if present
        let value = if input.remaining_len() >= 4 {
            low | (input.read_le_u32()? as u64) << 32
        } else {
            low
        };
        Ok(IntvarData { key, value })
    }
}
