use crate::error::Result;
use crate::ReadFromBytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;

/// Data of RandEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/rand-event.html
#[derive(Debug, Clone, Serialize)]
pub struct RandData {
    pub seed1: u64,
    pub seed2: u64,
}

impl ReadFromBytes for RandData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let seed1 = input.read_le_u64()?;
        let seed2 = input.read_le_u64()?;
        Ok(RandData { seed1, seed2 })
    }
}
