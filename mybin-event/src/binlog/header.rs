use super::{LogEventType, LogEventTypeCode};
use crate::error::Result;
use crate::ReadFromBytes;
use bitflags::bitflags;
use bytes_parser::{ByteCursor, ReadBytesExt, WriteNumber};
use serde_derive::Serialize;

/// length of v4 common header
pub const EVENT_HEADER_LEN: usize = 19;

bitflags! {
    pub struct EventHeaderFlags: u16 {
        const BINLOG_IN_USE         = 0x0001;
        const FORCED_ROTATE         = 0x0002;
        const THREAD_SPECIFIC       = 0x0004;
        const SUPRESS_USE           = 0x0008;
        const UPDATE_TABLE_MAP_VERSION  = 0x0010;
        const ARTIFICIAL            = 0x0020;
        const RELAY_LOG             = 0x0040;
        const IGNORABLE             = 0x0080;
        const NO_FILTER             = 0x0100;
        const MTS_ISOLATE           = 0x0200;
    }
}

/// common header of v4 events
///
/// reference: https://dev.mysql.com/doc/internals/en/binlog-event-header.html
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventHeader {
    pub timestamp: u32,
    pub type_code: LogEventTypeCode,
    pub server_id: u32,
    pub event_len: u32,
    pub next_pos: u32,
    // kept raw so that unknown bits survive re-serialization
    pub flags: u16,
}

impl EventHeader {
    /// length of data after the header, including the checksum footer
    pub fn data_len(&self) -> usize {
        (self.event_len as usize).saturating_sub(EVENT_HEADER_LEN)
    }

    pub fn header_flags(&self) -> EventHeaderFlags {
        EventHeaderFlags::from_bits_truncate(self.flags)
    }

    pub fn event_type(&self) -> LogEventType {
        LogEventType::from(self.type_code)
    }

    /// serialize header into its wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bs = Vec::with_capacity(EVENT_HEADER_LEN);
        bs.write_le_u32(self.timestamp);
        bs.write_u8(self.type_code.0);
        bs.write_le_u32(self.server_id);
        bs.write_le_u32(self.event_len);
        bs.write_le_u32(self.next_pos);
        bs.write_le_u16(self.flags);
        bs
    }
}

/// parse common header of v4 events
///
/// the header includes 6 fields:
/// timestamp 0:4, type_code 4:1, server_id: 5:4,
/// event_length: 9:4, next_position: 13:4, flags 17:2
impl ReadFromBytes for EventHeader {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let timestamp = input.read_le_u32()?;
        let type_code = input.read_u8()?;
        let server_id = input.read_le_u32()?;
        let event_len = input.read_le_u32()?;
        let next_pos = input.read_le_u32()?;
        let flags = input.read_le_u16()?;
        Ok(EventHeader {
            timestamp,
            type_code: LogEventTypeCode(type_code),
            server_id,
            event_len,
            next_pos,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_header() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u32(1_600_000_000);
        bs.write_u8(2);
        bs.write_le_u32(1);
        bs.write_le_u32(100);
        bs.write_le_u32(4_100);
        bs.write_le_u16(0x0008);
        let mut input = ByteCursor::new(bs.clone());
        let header = EventHeader::read_from(&mut input)?;
        dbg!(&header);
        assert_eq!(EVENT_HEADER_LEN, input.consumed());
        assert_eq!(LogEventType::QueryEvent, header.event_type());
        assert_eq!(1, header.server_id);
        assert_eq!(81, header.data_len());
        assert_eq!(4_100, header.next_pos);
        assert!(header.header_flags().contains(EventHeaderFlags::SUPRESS_USE));
        assert_eq!(bs, header.to_bytes());
        Ok(())
    }

    #[test]
    fn test_event_header_incomplete() {
        let mut input = ByteCursor::new(vec![0u8; 10]);
        let err = EventHeader::read_from(&mut input).unwrap_err();
        assert!(err.is_underrun());
    }
}
