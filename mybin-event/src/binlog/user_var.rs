use crate::decimal::MyDecimal;
use crate::error::Result;
use crate::util::{base64_bytes, lossy_string, strict_string};
use crate::ReadFromBytes;
use bitflags::bitflags;
use bytes::Bytes;
use bytes_parser::{ByteCursor, ReadBytesExt};
use serde::Serializer;
use serde_derive::Serialize;

/// Data of UserVarEvent
///
/// reference: https://dev.mysql.com/doc/internals/en/user-var-event.html
#[derive(Debug, Clone, Serialize)]
pub struct UserVarData {
    pub name: String,
    pub value: UserVarValue,
}

impl ReadFromBytes for UserVarData {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let name = strict_string(input.read_len_prefixed(4)?)?;
        let is_null = input.read_u8()?;
        if is_null != 0 {
            return Ok(UserVarData {
                name,
                value: UserVarValue::Null,
            });
        }
        let value = TypedUserVar::read_from(input)?;
        Ok(UserVarData {
            name,
            value: UserVarValue::Value(value),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum UserVarValue {
    Null,
    Value(TypedUserVar),
}

/// value part of UserVarEvent
///
/// reference: https://github.com/mysql/mysql-server/blob/5.7/libbinlogevents/include/statement_events.h#L824
#[derive(Debug, Clone, Serialize)]
pub struct TypedUserVar {
    pub value_type: u8,
    pub charset: u32,
    #[serde(serialize_with = "serialize_flags")]
    pub flags: UserVarFlags,
    pub value: UserVarKind,
}

#[derive(Debug, Clone, Serialize)]
pub enum UserVarKind {
    String(String),
    Real(f64),
    Int(i64),
    UInt(u64),
    Decimal(MyDecimal),
    RowResult(#[serde(serialize_with = "base64_bytes::serialize")] Bytes),
    Unknown(#[serde(serialize_with = "base64_bytes::serialize")] Bytes),
}

bitflags! {
    pub struct UserVarFlags: u8 {
        const UNSIGNED = 0x01;
    }
}

fn serialize_flags<S: Serializer>(flags: &UserVarFlags, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u8(flags.bits())
}

impl ReadFromBytes for TypedUserVar {
    fn read_from(input: &mut ByteCursor) -> Result<Self> {
        let value_type = input.read_u8()?;
        let charset = input.read_le_u32()?;
        let mut raw = input.read_len_prefixed(4)?;
        // servers before 5.5 do not write flags
        let flags = if input.has_remaining_bytes() {
            UserVarFlags::from_bits_truncate(input.read_u8()?)
        } else {
            UserVarFlags::empty()
        };
        let value = match value_type {
            0x00 => UserVarKind::String(lossy_string(&raw)),
            0x01 => UserVarKind::Real(raw.read_le_f64()?),
            0x02 => {
                if flags.contains(UserVarFlags::UNSIGNED) {
                    UserVarKind::UInt(raw.read_le_u64()?)
                } else {
                    UserVarKind::Int(raw.read_le_i64()?)
                }
            }
            0x03 => UserVarKind::RowResult(raw),
            0x04 => {
                let precision = raw.read_u8()?;
                let scale = raw.read_u8()?;
                UserVarKind::Decimal(MyDecimal::read_from(&mut raw, precision, scale)?)
            }
            _ => {
                log::debug!("unknown user var type {}", value_type);
                UserVarKind::Unknown(raw)
            }
        };
        Ok(TypedUserVar {
            value_type,
            charset,
            flags,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes_parser::WriteNumber;

    fn user_var_body(name: &[u8], value_type: u8, value: &[u8], flags: Option<u8>) -> Vec<u8> {
        let mut bs = vec![];
        bs.write_le_u32(name.len() as u32);
        bs.extend_from_slice(name);
        bs.write_u8(0);
        bs.write_u8(value_type);
        bs.write_le_u32(33);
        bs.write_le_u32(value.len() as u32);
        bs.extend_from_slice(value);
        if let Some(flags) = flags {
            bs.write_u8(flags);
        }
        bs
    }

    fn decode(bs: Vec<u8>) -> Result<UserVarData> {
        let size = bs.len();
        let mut input = ByteCursor::new(bs);
        let data = UserVarData::read_from(&mut input)?;
        assert_eq!(size, input.consumed());
        Ok(data)
    }

    fn typed(data: UserVarData) -> TypedUserVar {
        match data.value {
            UserVarValue::Value(v) => v,
            UserVarValue::Null => panic!("unexpected null"),
        }
    }

    #[test]
    fn test_user_var_null() -> Result<()> {
        let mut bs = vec![];
        bs.write_le_u32(1);
        bs.extend_from_slice(b"a");
        bs.write_u8(1);
        let data = decode(bs)?;
        assert_eq!("a", data.name);
        assert!(matches!(data.value, UserVarValue::Null));
        Ok(())
    }

    #[test]
    fn test_user_var_string() -> Result<()> {
        let data = decode(user_var_body(b"foo", 0, b"bar", Some(0)))?;
        assert_eq!("foo", data.name);
        let v = typed(data);
        assert_eq!(33, v.charset);
        assert!(matches!(v.value, UserVarKind::String(ref s) if s == "bar"));
        Ok(())
    }

    #[test]
    fn test_user_var_int() -> Result<()> {
        let v = typed(decode(user_var_body(b"i", 2, &(-5i64).to_le_bytes(), Some(0)))?);
        assert!(matches!(v.value, UserVarKind::Int(-5)));
        let v = typed(decode(user_var_body(b"u", 2, &u64::MAX.to_le_bytes(), Some(1)))?);
        assert!(v.flags.contains(UserVarFlags::UNSIGNED));
        assert!(matches!(v.value, UserVarKind::UInt(u64::MAX)));
        Ok(())
    }

    #[test]
    fn test_user_var_real_without_flags() -> Result<()> {
        let v = typed(decode(user_var_body(b"r", 1, &2.5f64.to_le_bytes(), None))?);
        assert!(v.flags.is_empty());
        assert!(matches!(v.value, UserVarKind::Real(r) if (r - 2.5).abs() < f64::EPSILON));
        Ok(())
    }

    #[test]
    fn test_user_var_decimal() -> Result<()> {
        let v = typed(decode(user_var_body(b"d", 4, &[5, 2, 0x80, 0x7b, 0x2d], Some(0)))?);
        match v.value {
            UserVarKind::Decimal(d) => assert_eq!("123.45", d.to_string()),
            other => panic!("unexpected {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_user_var_row_result_and_unknown() -> Result<()> {
        let v = typed(decode(user_var_body(b"x", 3, b"\x01\x02", Some(0)))?);
        assert!(matches!(v.value, UserVarKind::RowResult(ref bs) if bs.as_ref() == b"\x01\x02"));
        let v = typed(decode(user_var_body(b"x", 9, b"\x03", Some(0)))?);
        assert!(matches!(v.value, UserVarKind::Unknown(ref bs) if bs.as_ref() == b"\x03"));
        Ok(())
    }
}
