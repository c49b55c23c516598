//! binlog events of MySQL and MariaDB
//!
//! reference: https://dev.mysql.com/doc/internals/en/binlog-event.html
pub mod fde;
pub mod gtid;
pub mod header;
pub mod intvar;
pub mod load;
pub mod mariadb;
pub mod parser;
pub mod query;
pub mod rand;
pub mod rotate;
pub mod rows_query;
pub mod user_var;
pub mod xid;
mod dump;
mod util;

use crate::error::Result;
use crate::try_from_event;
use serde_derive::Serialize;

pub use fde::{FormatDescriptionData, ServerVersion};
pub use gtid::{GtidLogData, PreviousGtidsLogData};
pub use header::{EventHeader, EventHeaderFlags, EVENT_HEADER_LEN};
pub use intvar::IntvarData;
pub use load::{BeginLoadQueryData, ExecuteLoadQueryData};
pub use mariadb::{
    MariadbAnnotateRowsData, MariadbBinlogCheckpointData, MariadbGtidData, MariadbGtidListData,
    MariadbStartEncryptionData,
};
pub use parser::EventParser;
pub use query::QueryData;
pub use rand::RandData;
pub use rotate::{HeartbeatData, RotateData};
pub use rows_query::RowsQueryData;
pub use user_var::UserVarData;
pub use xid::{XaPrepareData, XidData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogEventType {
    Unknown,
    StartEventV3,
    QueryEvent,
    StopEvent,
    RotateEvent,
    IntvarEvent,
    LoadEvent,
    SlaveEvent,
    CreateFileEvent,
    AppendBlockEvent,
    ExecLoadEvent,
    DeleteFileEvent,
    NewLoadEvent,
    RandEvent,
    UserVarEvent,
    FormatDescriptionEvent,
    XidEvent,
    BeginLoadQueryEvent,
    ExecuteLoadQueryEvent,
    TableMapEvent,
    WriteRowsEventV0,
    UpdateRowsEventV0,
    DeleteRowsEventV0,
    WriteRowsEventV1,
    UpdateRowsEventV1,
    DeleteRowsEventV1,
    IncidentEvent,
    HeartbeatLogEvent,
    IgnorableLogEvent,
    RowsQueryLogEvent,
    WriteRowsEventV2,
    UpdateRowsEventV2,
    DeleteRowsEventV2,
    GtidLogEvent,
    AnonymousGtidLogEvent,
    PreviousGtidsLogEvent,
    TransactionContextEvent,
    ViewChangeEvent,
    XaPrepareLogEvent,
    MariadbAnnotateRowsEvent,
    MariadbBinlogCheckpointEvent,
    MariadbGtidEvent,
    MariadbGtidListEvent,
    MariadbStartEncryptionEvent,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogEventTypeCode(pub u8);

impl From<u8> for LogEventType {
    fn from(code: u8) -> LogEventType {
        match code {
            0 => LogEventType::Unknown,
            1 => LogEventType::StartEventV3,
            2 => LogEventType::QueryEvent,
            3 => LogEventType::StopEvent,
            4 => LogEventType::RotateEvent,
            5 => LogEventType::IntvarEvent,
            6 => LogEventType::LoadEvent,
            7 => LogEventType::SlaveEvent,
            8 => LogEventType::CreateFileEvent,
            9 => LogEventType::AppendBlockEvent,
            10 => LogEventType::ExecLoadEvent,
            11 => LogEventType::DeleteFileEvent,
            12 => LogEventType::NewLoadEvent,
            13 => LogEventType::RandEvent,
            14 => LogEventType::UserVarEvent,
            15 => LogEventType::FormatDescriptionEvent,
            16 => LogEventType::XidEvent,
            17 => LogEventType::BeginLoadQueryEvent,
            18 => LogEventType::ExecuteLoadQueryEvent,
            19 => LogEventType::TableMapEvent,
            // below three are also called PreGa(Write|Update|Delete)RowsEvent
            // used in 5.1.0 ~ 5.1.17
            20 => LogEventType::WriteRowsEventV0,
            21 => LogEventType::UpdateRowsEventV0,
            22 => LogEventType::DeleteRowsEventV0,
            // below three used in 5.1.18 ~ 5.6.x
            23 => LogEventType::WriteRowsEventV1,
            24 => LogEventType::UpdateRowsEventV1,
            25 => LogEventType::DeleteRowsEventV1,
            26 => LogEventType::IncidentEvent,
            27 => LogEventType::HeartbeatLogEvent,
            28 => LogEventType::IgnorableLogEvent,
            29 => LogEventType::RowsQueryLogEvent,
            // below three used after 5.6.x
            30 => LogEventType::WriteRowsEventV2,
            31 => LogEventType::UpdateRowsEventV2,
            32 => LogEventType::DeleteRowsEventV2,
            33 => LogEventType::GtidLogEvent,
            34 => LogEventType::AnonymousGtidLogEvent,
            35 => LogEventType::PreviousGtidsLogEvent,
            // https://github.com/mysql/mysql-server/blob/5.7/libbinlogevents/include/binlog_event.h
            36 => LogEventType::TransactionContextEvent,
            37 => LogEventType::ViewChangeEvent,
            38 => LogEventType::XaPrepareLogEvent,
            // MariaDB allocates codes from 160
            160 => LogEventType::MariadbAnnotateRowsEvent,
            161 => LogEventType::MariadbBinlogCheckpointEvent,
            162 => LogEventType::MariadbGtidEvent,
            163 => LogEventType::MariadbGtidListEvent,
            164 => LogEventType::MariadbStartEncryptionEvent,
            _ => LogEventType::Invalid,
        }
    }
}

impl From<LogEventTypeCode> for LogEventType {
    fn from(type_code: LogEventTypeCode) -> LogEventType {
        LogEventType::from(type_code.0)
    }
}

/// result of checksum verification on a single event
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumState {
    /// no footer, or verification disabled
    NotChecked,
    Valid,
    Invalid,
}

/// v4 event with payload
///
/// event_size is the length of the body, excluding header and checksum footer.
/// a successfully decoded event always has bytes_consumed equal to event_size.
#[derive(Debug, Clone, Serialize)]
pub struct RawEvent<D> {
    pub header: EventHeader,
    pub data: D,
    pub crc32: Option<u32>,
    pub checksum: ChecksumState,
    pub event_size: usize,
    pub bytes_consumed: usize,
}

/// Data of StopEvent, which has no payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopData;

/// placeholder of events without decoder
///
/// the body is skipped entirely
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotImplementedData;

pub type QueryEvent = RawEvent<QueryData>;
pub type StopEvent = RawEvent<StopData>;
pub type RotateEvent = RawEvent<RotateData>;
pub type IntvarEvent = RawEvent<IntvarData>;
pub type RandEvent = RawEvent<RandData>;
pub type UserVarEvent = RawEvent<UserVarData>;
pub type FormatDescriptionEvent = RawEvent<FormatDescriptionData>;
pub type XidEvent = RawEvent<XidData>;
pub type BeginLoadQueryEvent = RawEvent<BeginLoadQueryData>;
pub type ExecuteLoadQueryEvent = RawEvent<ExecuteLoadQueryData>;
pub type HeartbeatLogEvent = RawEvent<HeartbeatData>;
pub type RowsQueryLogEvent = RawEvent<RowsQueryData>;
pub type GtidLogEvent = RawEvent<GtidLogData>;
pub type PreviousGtidsLogEvent = RawEvent<PreviousGtidsLogData>;
pub type XaPrepareLogEvent = RawEvent<XaPrepareData>;
pub type MariadbAnnotateRowsEvent = RawEvent<MariadbAnnotateRowsData>;
pub type MariadbBinlogCheckpointEvent = RawEvent<MariadbBinlogCheckpointData>;
pub type MariadbGtidEvent = RawEvent<MariadbGtidData>;
pub type MariadbGtidListEvent = RawEvent<MariadbGtidListData>;
pub type MariadbStartEncryptionEvent = RawEvent<MariadbStartEncryptionData>;
pub type NotImplementedEvent = RawEvent<NotImplementedData>;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    // 2
    QueryEvent(QueryEvent),
    // 3
    StopEvent(StopEvent),
    // 4
    RotateEvent(RotateEvent),
    // 5
    IntvarEvent(IntvarEvent),
    // 13
    RandEvent(RandEvent),
    // 14
    UserVarEvent(UserVarEvent),
    // 15
    FormatDescriptionEvent(FormatDescriptionEvent),
    // 16
    XidEvent(XidEvent),
    // 17
    BeginLoadQueryEvent(BeginLoadQueryEvent),
    // 18
    ExecuteLoadQueryEvent(ExecuteLoadQueryEvent),
    // 27
    HeartbeatLogEvent(HeartbeatLogEvent),
    // 29
    RowsQueryLogEvent(RowsQueryLogEvent),
    // 33
    GtidLogEvent(GtidLogEvent),
    // 34, same layout as 33
    AnonymousGtidLogEvent(GtidLogEvent),
    // 35
    PreviousGtidsLogEvent(PreviousGtidsLogEvent),
    // 38
    XaPrepareLogEvent(XaPrepareLogEvent),
    // 160
    MariadbAnnotateRowsEvent(MariadbAnnotateRowsEvent),
    // 161
    MariadbBinlogCheckpointEvent(MariadbBinlogCheckpointEvent),
    // 162
    MariadbGtidEvent(MariadbGtidEvent),
    // 163
    MariadbGtidListEvent(MariadbGtidListEvent),
    // 164
    MariadbStartEncryptionEvent(MariadbStartEncryptionEvent),
    // all other codes
    NotImplementedEvent(NotImplementedEvent),
}

/// apply an expression to the inner raw event of any variant
macro_rules! with_raw_event {
    ($event:expr, $e:ident => $body:expr) => {
        match $event {
            Event::QueryEvent($e) => $body,
            Event::StopEvent($e) => $body,
            Event::RotateEvent($e) => $body,
            Event::IntvarEvent($e) => $body,
            Event::RandEvent($e) => $body,
            Event::UserVarEvent($e) => $body,
            Event::FormatDescriptionEvent($e) => $body,
            Event::XidEvent($e) => $body,
            Event::BeginLoadQueryEvent($e) => $body,
            Event::ExecuteLoadQueryEvent($e) => $body,
            Event::HeartbeatLogEvent($e) => $body,
            Event::RowsQueryLogEvent($e) => $body,
            Event::GtidLogEvent($e) => $body,
            Event::AnonymousGtidLogEvent($e) => $body,
            Event::PreviousGtidsLogEvent($e) => $body,
            Event::XaPrepareLogEvent($e) => $body,
            Event::MariadbAnnotateRowsEvent($e) => $body,
            Event::MariadbBinlogCheckpointEvent($e) => $body,
            Event::MariadbGtidEvent($e) => $body,
            Event::MariadbGtidListEvent($e) => $body,
            Event::MariadbStartEncryptionEvent($e) => $body,
            Event::NotImplementedEvent($e) => $body,
        }
    };
}

impl Event {
    pub fn header(&self) -> &EventHeader {
        with_raw_event!(self, e => &e.header)
    }

    /// event type from header, unimplemented events keep their own type
    pub fn event_type(&self) -> LogEventType {
        self.header().event_type()
    }

    pub fn checksum(&self) -> ChecksumState {
        with_raw_event!(self, e => e.checksum)
    }

    pub fn crc32(&self) -> Option<u32> {
        with_raw_event!(self, e => e.crc32)
    }

    pub fn event_size(&self) -> usize {
        with_raw_event!(self, e => e.event_size)
    }

    pub fn bytes_consumed(&self) -> usize {
        with_raw_event!(self, e => e.bytes_consumed)
    }

    /// name of the decoded variant
    pub fn name(&self) -> &'static str {
        match self {
            Event::QueryEvent(_) => "QueryEvent",
            Event::StopEvent(_) => "StopEvent",
            Event::RotateEvent(_) => "RotateEvent",
            Event::IntvarEvent(_) => "IntvarEvent",
            Event::RandEvent(_) => "RandEvent",
            Event::UserVarEvent(_) => "UserVarEvent",
            Event::FormatDescriptionEvent(_) => "FormatDescriptionEvent",
            Event::XidEvent(_) => "XidEvent",
            Event::BeginLoadQueryEvent(_) => "BeginLoadQueryEvent",
            Event::ExecuteLoadQueryEvent(_) => "ExecuteLoadQueryEvent",
            Event::HeartbeatLogEvent(_) => "HeartbeatLogEvent",
            Event::RowsQueryLogEvent(_) => "RowsQueryLogEvent",
            Event::GtidLogEvent(_) => "GtidLogEvent",
            Event::AnonymousGtidLogEvent(_) => "AnonymousGtidLogEvent",
            Event::PreviousGtidsLogEvent(_) => "PreviousGtidsLogEvent",
            Event::XaPrepareLogEvent(_) => "XaPrepareLogEvent",
            Event::MariadbAnnotateRowsEvent(_) => "MariadbAnnotateRowsEvent",
            Event::MariadbBinlogCheckpointEvent(_) => "MariadbBinlogCheckpointEvent",
            Event::MariadbGtidEvent(_) => "MariadbGtidEvent",
            Event::MariadbGtidListEvent(_) => "MariadbGtidListEvent",
            Event::MariadbStartEncryptionEvent(_) => "MariadbStartEncryptionEvent",
            Event::NotImplementedEvent(_) => "NotImplementedEvent",
        }
    }

    /// structured export of header, body and checksum state
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

try_from_event!(QueryEvent, QueryData);
try_from_event!(StopEvent, StopData);
try_from_event!(RotateEvent, RotateData);
try_from_event!(IntvarEvent, IntvarData);
try_from_event!(RandEvent, RandData);
try_from_event!(UserVarEvent, UserVarData);
try_from_event!(FormatDescriptionEvent, FormatDescriptionData);
try_from_event!(XidEvent, XidData);
try_from_event!(BeginLoadQueryEvent, BeginLoadQueryData);
try_from_event!(ExecuteLoadQueryEvent, ExecuteLoadQueryData);
try_from_event!(HeartbeatLogEvent, HeartbeatData);
try_from_event!(RowsQueryLogEvent, RowsQueryData);
try_from_event!(GtidLogEvent | AnonymousGtidLogEvent, GtidLogData);
try_from_event!(PreviousGtidsLogEvent, PreviousGtidsLogData);
try_from_event!(XaPrepareLogEvent, XaPrepareData);
try_from_event!(MariadbAnnotateRowsEvent, MariadbAnnotateRowsData);
try_from_event!(MariadbBinlogCheckpointEvent, MariadbBinlogCheckpointData);
try_from_event!(MariadbGtidEvent, MariadbGtidData);
try_from_event!(MariadbGtidListEvent, MariadbGtidListData);
try_from_event!(MariadbStartEncryptionEvent, MariadbStartEncryptionData);
try_from_event!(NotImplementedEvent, NotImplementedData);
