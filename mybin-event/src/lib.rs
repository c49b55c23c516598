//! typed decoding of MySQL and MariaDB binlog events
pub mod binlog;
pub mod config;
pub mod decimal;
pub mod error;
mod util;

pub use crate::binlog::{Event, EventParser};
pub use crate::config::ParserConfig;
pub use crate::error::{Error, Result};
pub use bytes_parser::ByteCursor;

/// decode a value from the cursor
pub trait ReadFromBytes: Sized {
    fn read_from(input: &mut ByteCursor) -> Result<Self>;
}

/// decode a value that depends on information outside the input
pub trait ReadFromBytesWithContext<'c>: Sized {
    type Context: 'c;

    fn read_with_ctx(input: &mut ByteCursor, ctx: Self::Context) -> Result<Self>;
}
