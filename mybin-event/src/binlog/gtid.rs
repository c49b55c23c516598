//! gtid related events and parsing logic
use super::fde::ServerVersion;
use crate::error::{Error, Result};
use crate::{ReadFromBytes, ReadFromBytesWithContext};
use bytes_parser::{ByteCursor, ReadBytesExt};
use linked_hash_map::LinkedHashMap;
use serde::{Serialize, Serializer};
use serde_derive::Serialize;
use std::fmt;
use uuid::Uuid;

/// first version writing logical clock into gtid event
const LOGICAL_CLOCK_VERSION: ServerVersion = ServerVersion {
    major: 5,
    minor: 7,
    patch: 0,
};

/// MySQL gtid: source uuid and group number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gtid {
    pub sid: Uuid,
    pub gno: u64,
}

impl fmt::Display for Gtid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sid.to_hyphenated(), self.gno)
    }
}

impl Serialize for Gtid {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Data of GtidEvent
///
/// reference: https://github.com/mysql/mysql-server/blob/5.7/libbinlogevents/include/control_events.h#L933
#[derive(Debug, Clone, Serialize)]
pub struct GtidLogData {
    pub commit_flag: bool,
    pub gtid: Gtid,
    // below fields do not exist
    // in versions earlier than 5.7
    pub logical_clock: Option<LogicalClock>,
    // since 8.0
    pub commit_info: Option<CommitInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalClock {
    pub lt_type: u8,
    pub last_committed: u64,
    pub sequence_number: u64,
}

/// trailing fields written by MySQL 8.0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitInfo {
    pub immediate_commit_ts: u64,
    pub original_commit_ts: u64,
    pub transaction_length: Option<u64>,
    pub immediate_server_version: Option<u32>,
    pub original_server_version: Option<u32>,
    pub commit_group_ticket: Option<u64>,
}

/// the context is the negotiated server version,
/// without which presence of logical clock is guessed from length
impl<'c> ReadFromBytesWithContext<'c> for GtidLogData {
    type Context = Option<&'c ServerVersion>;

    fn read_with_ctx(input: &mut ByteCursor, server_version: Self::Context) -> Result<Self> {
        let commit_flag = input.read_u8()? == 1;
        let sid = Uuid::from_bytes(input.read_array::<16>()?);
        let gno = input.read_le_u64()?;
        // consumed 25 bytes now
        let has_logical_clock = match server_version {
            Some(v) => *v >= LOGICAL_CLOCK_VERSION,
            None => input.remaining_len() >= 17,
        };
        let logical_clock = if has_logical_clock {
            let lt_type = input.read_u8()?;
            let last_committed = input.read_le_u64()?;
            let sequence_number = input.read_le_u64()?;
            Some(LogicalClock {
                lt_type,
                last_committed,
                sequence_number,
            })
        } else {
            None
        };
        let commit_info = if logical_clock.is_some() && input.remaining_len() >= 7 {
            Some(CommitInfo::read_from(input)?)
        } else {
            None
        };
        Ok(GtidLogData {
            commit_flag,
            gtid: Gtid { sid, gno },
            logical_clock,
            commit_info,
        })
    }
}

impl ReadFromBytes for CommitInfo {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        // highest bit of 7-byte timestamp indicates original timestamp follows
        let immediate_commit_ts = input.read_le_u56()?;
        let original_commit_ts = if immediate_commit_ts & (1 << 55) != 0 {
            input.read_le_u56()?
        } else {
            immediate_commit_ts
        };
        let immediate_commit_ts = immediate_commit_ts & !(1 << 55);
        let transaction_length = if input.has_remaining_bytes() {
            input.read_len_enc_int()?.to_u64()
        } else {
            None
        };
        let (immediate_server_version, original_server_version) = if input.remaining_len() >= 4
        {
            let immediate = input.read_le_u32()?;
            if immediate & (1 << 31) != 0 {
                let immediate = immediate & !(1 << 31);
                (Some(immediate), Some(input.read_le_u32()?))
            } else {
                (Some(immediate), Some(immediate))
            }
        } else {
            (None, None)
        };
        let commit_group_ticket = if input.remaining_len() >= 8 {
            Some(input.read_le_u64()?)
        } else {
            None
        };
        Ok(CommitInfo {
            immediate_commit_ts,
            original_commit_ts,
            transaction_length,
            immediate_server_version,
            original_server_version,
            commit_group_ticket,
        })
    }
}

/// Data of PreviousGtidsEvent
///
/// reference: https://github.com/mysql/mysql-server/blob/5.7/libbinlogevents/include/control_events.h#L1074
#[derive(Debug, Clone, Serialize)]
pub struct PreviousGtidsLogData {
    pub gtid_set: GtidSet,
}

impl ReadFromBytes for PreviousGtidsLogData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let gtid_set = GtidSet::read_from(input)?;
        Ok(PreviousGtidsLogData { gtid_set })
    }
}

/// ordered map from source id to its intervals
///
/// the server writes each source id once. if a source id repeats,
/// its intervals are appended to the first group, which keeps the
/// position of its first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GtidSet {
    pub sids: LinkedHashMap<Uuid, Vec<GtidInterval>>,
}

/// interval as written on the wire, end is exclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GtidInterval {
    pub start: i64,
    pub end: u64,
}

/// seems layout introduction on mysql dev website is wrong,
/// so follow source code: https://github.com/mysql/mysql-server/blob/5.7/sql/rpl_gtid_set.cc#L1469
impl ReadFromBytes for GtidSet {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let n_sids = input.read_le_i64()?;
        if n_sids < 0 {
            return Err(Error::BinlogEventError(format!(
                "invalid number of sids in gtid set: {}",
                n_sids
            )));
        }
        let mut sids = LinkedHashMap::new();
        for _ in 0..n_sids {
            let sid = Uuid::from_bytes(input.read_array::<16>()?);
            let n_intervals = input.read_le_u64()?;
            let mut intervals = Vec::new();
            for _ in 0..n_intervals {
                let start = input.read_le_i64()?;
                let end = input.read_le_u64()?;
                intervals.push(GtidInterval { start, end });
            }
            sids.entry(sid).or_insert_with(Vec::new).extend(intervals);
        }
        Ok(GtidSet { sids })
    }
}

impl fmt::Display for GtidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (sid, intervals)) in self.sids.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", sid.to_hyphenated())?;
            for itv in intervals {
                write!(f, ":{}-{}", itv.start, itv.end)?;
            }
        }
        Ok(())
    }
}

impl Serialize for GtidSet {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}
