use super::fde::{
    peek_checksum_alg, ServerVersion, BINLOG_CHECKSUM_ALG_CRC32, BINLOG_CHECKSUM_ALG_UNDEF,
};
use super::*;
use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::util::checksum_crc32;
use crate::{ReadFromBytes, ReadFromBytesWithContext};
use bytes::Bytes;
use bytes_parser::{ByteCursor, ReadBytesExt};

const CHECKSUM_LEN: usize = 4;

/// parser of v4 events
///
/// holds no state between events, so a single parser
/// can be shared by threads decoding different events.
#[derive(Debug, Clone)]
pub struct EventParser {
    // whether events carry the 4-byte crc32 footer
    checksum: bool,
    // whether the footer is verified
    validate_checksum: bool,
    // affects layout of gtid event, inferred from data if absent
    server_version: Option<ServerVersion>,
}

/// shared fields of the event being decoded
struct EventMeta {
    header: EventHeader,
    crc32: Option<u32>,
    checksum: ChecksumState,
    event_size: usize,
}

impl EventMeta {
    /// run decoder on the body and ensure it is fully consumed
    fn read<D, F>(&self, input: &mut ByteCursor, f: F) -> Result<RawEvent<D>>
    where
        F: FnOnce(&mut ByteCursor) -> Result<D>,
    {
        let data = f(input)?;
        let consumed = input.consumed();
        if consumed != self.event_size {
            return Err(Error::EventSizeMismatch {
                expected: self.event_size,
                consumed,
            });
        }
        Ok(RawEvent {
            header: self.header.clone(),
            data,
            crc32: self.crc32,
            checksum: self.checksum,
            event_size: self.event_size,
            bytes_consumed: consumed,
        })
    }
}

impl EventParser {
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let server_version = match config.server_version.as_deref() {
            Some(s) => Some(ServerVersion::parse(s)?),
            None => None,
        };
        Ok(EventParser {
            checksum: config.checksum,
            validate_checksum: config.validate_checksum,
            server_version,
        })
    }

    /// create parser from given format description event
    pub fn from_fde(fde: &FormatDescriptionEvent, validate_checksum: bool) -> Self {
        EventParser {
            checksum: fde.data.checksum_enabled(),
            validate_checksum,
            server_version: Some(fde.data.version),
        }
    }

    pub fn checksum(&self) -> bool {
        self.checksum
    }

    pub fn server_version(&self) -> Option<ServerVersion> {
        self.server_version
    }

    /// parse a complete event, starting with the 19-byte header
    ///
    /// bytes after the declared event length are ignored
    pub fn parse_event(&self, input: impl Into<Bytes>) -> Result<Event> {
        let mut input = ByteCursor::new(input);
        let header = EventHeader::read_from(&mut input)?;
        self.decode(header, input.remaining())
    }

    /// decode the payload of an event whose header is already parsed
    ///
    /// payload is the body, followed by checksum footer if enabled
    pub fn decode(&self, header: EventHeader, payload: Bytes) -> Result<Event> {
        if (header.event_len as usize) < EVENT_HEADER_LEN {
            return Err(Error::InvalidEventLength(header.event_len));
        }
        let event_type = header.event_type();
        let mut input = ByteCursor::new(payload);
        let data = input.read_len(header.data_len())?;
        // FDE tells whether itself has checksum
        let (has_footer, verifiable) = match event_type {
            LogEventType::FormatDescriptionEvent => match peek_checksum_alg(&data) {
                Some(alg) if alg != BINLOG_CHECKSUM_ALG_UNDEF => {
                    (true, alg == BINLOG_CHECKSUM_ALG_CRC32)
                }
                _ => (false, false),
            },
            _ => (self.checksum, self.checksum),
        };
        let footer_len = if has_footer { CHECKSUM_LEN } else { 0 };
        if data.len() < footer_len {
            return Err(Error::InvalidEventLength(header.event_len));
        }
        let event_size = data.len() - footer_len;
        let mut data = ByteCursor::new(data);
        let body = data.read_len(event_size)?;
        let crc32 = if has_footer {
            Some(data.read_le_u32()?)
        } else {
            None
        };
        let checksum = match crc32 {
            Some(expected) if verifiable && self.validate_checksum => {
                let mut bs = header.to_bytes();
                bs.extend_from_slice(&body);
                let actual = checksum_crc32(&bs);
                if actual == expected {
                    ChecksumState::Valid
                } else {
                    log::warn!(
                        "checksum mismatch on {:?} at {}: expected={:#010x}, actual={:#010x}",
                        event_type,
                        header.next_pos,
                        expected,
                        actual
                    );
                    ChecksumState::Invalid
                }
            }
            _ => ChecksumState::NotChecked,
        };
        log::trace!(
            "decode {:?}: event_size={}, checksum={:?}",
            event_type,
            event_size,
            checksum
        );

        let server_id = header.server_id;
        let meta = EventMeta {
            header,
            crc32,
            checksum,
            event_size,
        };
        let mut input = ByteCursor::new(body);
        let input = &mut input;
        let event = match event_type {
            LogEventType::QueryEvent => Event::QueryEvent(meta.read(input, QueryData::read_from)?),
            LogEventType::StopEvent => Event::StopEvent(meta.read(input, |_| Ok(StopData))?),
            LogEventType::RotateEvent => {
                Event::RotateEvent(meta.read(input, RotateData::read_from)?)
            }
            LogEventType::IntvarEvent => {
                Event::IntvarEvent(meta.read(input, IntvarData::read_from)?)
            }
            LogEventType::RandEvent => Event::RandEvent(meta.read(input, RandData::read_from)?),
            LogEventType::UserVarEvent => {
                Event::UserVarEvent(meta.read(input, UserVarData::read_from)?)
            }
            LogEventType::FormatDescriptionEvent => Event::FormatDescriptionEvent(
                meta.read(input, FormatDescriptionData::read_from)?,
            ),
            LogEventType::XidEvent => Event::XidEvent(meta.read(input, XidData::read_from)?),
            LogEventType::BeginLoadQueryEvent => {
                Event::BeginLoadQueryEvent(meta.read(input, BeginLoadQueryData::read_from)?)
            }
            LogEventType::ExecuteLoadQueryEvent => {
                Event::ExecuteLoadQueryEvent(meta.read(input, ExecuteLoadQueryData::read_from)?)
            }
            LogEventType::HeartbeatLogEvent => {
                Event::HeartbeatLogEvent(meta.read(input, HeartbeatData::read_from)?)
            }
            LogEventType::RowsQueryLogEvent => {
                Event::RowsQueryLogEvent(meta.read(input, RowsQueryData::read_from)?)
            }
            LogEventType::GtidLogEvent => Event::GtidLogEvent(meta.read(input, |i| {
                GtidLogData::read_with_ctx(i, self.server_version.as_ref())
            })?),
            LogEventType::AnonymousGtidLogEvent => {
                Event::AnonymousGtidLogEvent(meta.read(input, |i| {
                    GtidLogData::read_with_ctx(i, self.server_version.as_ref())
                })?)
            }
            LogEventType::PreviousGtidsLogEvent => {
                Event::PreviousGtidsLogEvent(meta.read(input, PreviousGtidsLogData::read_from)?)
            }
            LogEventType::XaPrepareLogEvent => {
                Event::XaPrepareLogEvent(meta.read(input, XaPrepareData::read_from)?)
            }
            LogEventType::MariadbAnnotateRowsEvent => Event::MariadbAnnotateRowsEvent(
                meta.read(input, MariadbAnnotateRowsData::read_from)?,
            ),
            LogEventType::MariadbBinlogCheckpointEvent => Event::MariadbBinlogCheckpointEvent(
                meta.read(input, MariadbBinlogCheckpointData::read_from)?,
            ),
            LogEventType::MariadbGtidEvent => Event::MariadbGtidEvent(
                meta.read(input, |i| MariadbGtidData::read_with_ctx(i, server_id))?,
            ),
            LogEventType::MariadbGtidListEvent => {
                Event::MariadbGtidListEvent(meta.read(input, MariadbGtidListData::read_from)?)
            }
            LogEventType::MariadbStartEncryptionEvent => Event::MariadbStartEncryptionEvent(
                meta.read(input, MariadbStartEncryptionData::read_from)?,
            ),
            // row events, table map, legacy load events and
            // unknown codes are skipped
            other => {
                log::debug!("skip event {:?} of {} bytes", other, event_size);
                Event::NotImplementedEvent(meta.read(input, |i| {
                    i.skip(event_size)?;
                    Ok(NotImplementedData)
                })?)
            }
        };
        Ok(event)
    }
}
