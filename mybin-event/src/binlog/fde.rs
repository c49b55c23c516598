//! format description event
use crate::error::{Error, Result};
use crate::util::strict_string;
use crate::ReadFromBytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde_derive::Serialize;
use std::fmt;

/// bytes before post header lengths: 2+50+4+1
const FDE_FIXED_LEN: usize = 57;
/// index of FDE itself in post header lengths
const FDE_TYPE_INDEX: usize = 14;
const SERVER_VERSION_LEN: usize = 50;

pub const BINLOG_CHECKSUM_ALG_OFF: u8 = 0;
pub const BINLOG_CHECKSUM_ALG_CRC32: u8 = 1;
pub const BINLOG_CHECKSUM_ALG_UNDEF: u8 = 255;

/// Data of FormatDescriptionEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/format-description-event.html
#[derive(Debug, Clone, Serialize)]
pub struct FormatDescriptionData {
    pub binlog_version: u16,
    pub server_version: String,
    pub version: ServerVersion,
    pub create_timestamp: u32,
    pub header_length: u8,
    pub post_header_lengths: Vec<u8>,
    // exists since mysql 5.6.1
    pub checksum_alg: Option<u8>,
}

impl FormatDescriptionData {
    /// whether following events carry crc32 footer
    pub fn checksum_enabled(&self) -> bool {
        self.checksum_alg == Some(BINLOG_CHECKSUM_ALG_CRC32)
    }
}

/// the input must not contain the checksum footer
impl ReadFromBytes for FormatDescriptionData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let binlog_version = input.read_le_u16()?;
        let raw = input.read_len(SERVER_VERSION_LEN)?;
        // remove tail \x00
        let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        let server_version = strict_string(raw.slice(..end))?;
        let version = ServerVersion::parse(&server_version)?;
        let create_timestamp = input.read_le_u32()?;
        let header_length = input.read_u8()?;
        // 57 bytes consumed
        // we use self contained FDE post header len to determine number of events,
        // as checksum algorithm byte may follow the post header lengths
        let remaining = input.remaining_len();
        let n = match input.chunk().get(FDE_TYPE_INDEX) {
            Some(&len)
                if len as usize >= FDE_FIXED_LEN && len as usize - FDE_FIXED_LEN <= remaining =>
            {
                len as usize - FDE_FIXED_LEN
            }
            _ => remaining,
        };
        let post_header_lengths = Vec::from(input.read_len(n)?.as_ref());
        let checksum_alg = if input.has_remaining_bytes() {
            Some(input.read_u8()?)
        } else {
            None
        };
        Ok(FormatDescriptionData {
            binlog_version,
            server_version,
            version,
            create_timestamp,
            header_length,
            post_header_lengths,
            checksum_alg,
        })
    }
}

/// find checksum algorithm in FDE data which still has the footer
///
/// returns None if the server does not support checksum
pub(crate) fn peek_checksum_alg(data: &[u8]) -> Option<u8> {
    let fde_len = *data.get(FDE_FIXED_LEN + FDE_TYPE_INDEX)? as usize;
    let n = fde_len.checked_sub(FDE_FIXED_LEN)?;
    let alg_pos = FDE_FIXED_LEN + n;
    if data.len() == alg_pos + 1 + 4 {
        Some(data[alg_pos])
    } else {
        None
    }
}

/// numeric server version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    /// parse version string like "8.0.23-log"
    ///
    /// missing segments are treated as 0
    pub fn parse(s: &str) -> Result<Self> {
        let main = s.split('-').next().unwrap_or_default();
        let mut nums = [0u32; 3];
        for (i, seg) in main.split('.').take(3).enumerate() {
            nums[i] = seg
                .trim()
                .parse()
                .map_err(|_| Error::InvalidServerVersion(s.to_owned()))?;
        }
        Ok(ServerVersion {
            major: nums[0],
            minor: nums[1],
            patch: nums[2],
        })
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
