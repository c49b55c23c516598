use crate::error::Result;
use bytes::Bytes;
use bytes_parser::ReadBytesExt;
use crc_any::CRCu32;

pub(crate) fn checksum_crc32(bytes: &[u8]) -> u32 {
    let mut hasher = CRCu32::crc32();
    hasher.digest(bytes);
    hasher.get_crc()
}

/// decode identifier bytes, invalid utf8 is an error
#[inline]
pub(crate) fn strict_string(bs: Bytes) -> Result<String> {
    Ok(String::from_utf8(Vec::from(bs.as_ref()))?)
}

/// decode free-form text, invalid sequences are replaced
#[inline]
pub(crate) fn lossy_string(bs: &[u8]) -> String {
    String::from_utf8_lossy(bs).into_owned()
}

/// read a u8-length-prefixed string, absent if the length is 0
pub(crate) fn read_opt_string<R: ReadBytesExt>(input: &mut R) -> Result<Option<String>> {
    let bs = input.read_len_prefixed(1)?;
    if bs.is_empty() {
        return Ok(None);
    }
    strict_string(bs).map(Some)
}

/// serialize bytes as base64 string in json export
pub(crate) mod base64_bytes {
    use bytes::Bytes;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bs: &Bytes, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&base64::encode(bs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_iso_3309() {
        assert_eq!(907060870, checksum_crc32(b"hello"));
        assert_eq!(980881731, checksum_crc32(b"world"));
    }

    #[test]
    fn test_string_policy() {
        let invalid = Bytes::from_static(b"ab\xffc");
        assert!(strict_string(invalid.clone()).is_err());
        assert_eq!("ab\u{fffd}c", lossy_string(&invalid));
        assert_eq!("abc", strict_string(Bytes::from_static(b"abc")).unwrap());
    }

    #[test]
    fn test_read_opt_string() -> Result<()> {
        let mut input = Bytes::from_static(b"\x00\x03UTC");
        assert_eq!(None, read_opt_string(&mut input)?);
        assert_eq!(Some("UTC".to_owned()), read_opt_string(&mut input)?);
        assert!(read_opt_string(&mut input).unwrap_err().is_underrun());
        Ok(())
    }
}
