//! human readable dump of events
use super::*;
use crate::util::lossy_string;
use chrono::NaiveDateTime;
use std::fmt::{self, Write};
use super::user_var::UserVarValue;

impl Event {
    /// multi-line text of header summary and body fields
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        writeln!(f, "=== {} ===", self.name())?;
        match NaiveDateTime::from_timestamp_opt(header.timestamp as i64, 0) {
            Some(dt) => writeln!(f, "Date: {}", dt.format("%Y-%m-%dT%H:%M:%S"))?,
            None => writeln!(f, "Date: {}", header.timestamp)?,
        }
        writeln!(f, "Log position: {}", header.next_pos)?;
        writeln!(f, "Event size: {}", self.event_size())?;
        writeln!(f, "Read bytes: {}", self.bytes_consumed())?;
        if self.checksum() != ChecksumState::NotChecked {
            writeln!(f, "Checksum: {:?}", self.checksum())?;
        }
        dump_data(self, f)?;
        writeln!(f)
    }
}

fn dump_data(event: &Event, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match event {
        Event::QueryEvent(e) => {
            writeln!(f, "Schema: {}", e.data.schema)?;
            writeln!(f, "Execution time: {}", e.data.exec_time)?;
            writeln!(f, "Query: {}", e.data.query)
        }
        Event::StopEvent(_) | Event::NotImplementedEvent(_) => Ok(()),
        Event::RotateEvent(e) => {
            writeln!(f, "Position: {}", e.data.position)?;
            writeln!(f, "Next binlog file: {}", e.data.next_binlog_filename)
        }
        Event::IntvarEvent(e) => {
            writeln!(f, "Type: {:?}", e.data.key)?;
            writeln!(f, "Value: {}", e.data.value)
        }
        Event::RandEvent(e) => {
            writeln!(f, "seed1: {}", e.data.seed1)?;
            writeln!(f, "seed2: {}", e.data.seed2)
        }
        Event::UserVarEvent(e) => {
            writeln!(f, "User variable name: {}", e.data.name)?;
            match &e.data.value {
                UserVarValue::Null => writeln!(f, "Value: NULL"),
                UserVarValue::Value(v) => writeln!(f, "Value: {:?}", v.value),
            }
        }
        Event::FormatDescriptionEvent(e) => {
            writeln!(f, "Binlog version: {}", e.data.binlog_version)?;
            writeln!(f, "MySQL version: {}", e.data.server_version)
        }
        Event::XidEvent(e) => writeln!(f, "Transaction ID: {}", e.data.xid),
        Event::BeginLoadQueryEvent(e) => {
            writeln!(f, "File id: {}", e.data.file_id)?;
            writeln!(f, "Block data: {}", lossy_string(&e.data.block_data))
        }
        Event::ExecuteLoadQueryEvent(e) => {
            let d = &e.data;
            writeln!(f, "Slave proxy id: {}", d.slave_proxy_id)?;
            writeln!(f, "Execution time: {}", d.exec_time)?;
            writeln!(f, "Schema length: {}", d.schema_len)?;
            writeln!(f, "Error code: {}", d.error_code)?;
            writeln!(f, "Status vars length: {}", d.status_vars_len)?;
            writeln!(f, "File id: {}", d.file_id)?;
            writeln!(f, "Start pos: {}", d.start_pos)?;
            writeln!(f, "End pos: {}", d.end_pos)?;
            writeln!(f, "Dup handling flags: {}", d.dup_handling_flags)
        }
        Event::HeartbeatLogEvent(e) => writeln!(f, "Current binlog: {}", e.data.ident),
        Event::RowsQueryLogEvent(e) => {
            writeln!(f, "Query length: {}", e.data.query_len)?;
            writeln!(f, "Query: {}", e.data.query)
        }
        Event::GtidLogEvent(e) | Event::AnonymousGtidLogEvent(e) => {
            writeln!(f, "Commit: {}", e.data.commit_flag)?;
            writeln!(f, "GTID_NEXT: {}", e.data.gtid)?;
            if let Some(lc) = &e.data.logical_clock {
                writeln!(f, "last_committed: {}", lc.last_committed)?;
                writeln!(f, "sequence_number: {}", lc.sequence_number)?;
            }
            Ok(())
        }
        Event::PreviousGtidsLogEvent(e) => writeln!(f, "GTID set: {}", e.data.gtid_set),
        Event::XaPrepareLogEvent(e) => {
            writeln!(f, "One phase: {}", e.data.one_phase)?;
            writeln!(f, "XID formatID: {}", e.data.xid.format_id)?;
            writeln!(f, "XID: {}", e.data.xid)
        }
        Event::MariadbAnnotateRowsEvent(e) => writeln!(
            f,
            "SQL statement: {}",
            lossy_string(&e.data.sql_statement)
        ),
        Event::MariadbBinlogCheckpointEvent(e) => writeln!(f, "Filename: {}", e.data.filename),
        Event::MariadbGtidEvent(e) => {
            writeln!(f, "Flags: {}", e.data.flags.bits())?;
            writeln!(f, "GTID: {}", e.data.gtid)
        }
        Event::MariadbGtidListEvent(e) => {
            let mut list = String::new();
            for (i, gtid) in e.data.gtids.iter().enumerate() {
                if i > 0 {
                    list.push(',');
                }
                write!(list, "{}", gtid)?;
            }
            writeln!(f, "GTID list: {}", list)
        }
        Event::MariadbStartEncryptionEvent(e) => {
            writeln!(f, "Scheme: {}", e.data.scheme)?;
            writeln!(f, "Key version: {}", e.data.key_version)?;
            writeln!(f, "Nonce: {}", hex::encode(&e.data.nonce))
        }
    }
}
