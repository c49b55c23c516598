//! MySQL packed decimal
//!
//! reference: https://github.com/mysql/mysql-server/blob/5.7/strings/decimal.c#L1280
use crate::error::{Error, Result};
use bigdecimal::BigDecimal;
use bytes::Bytes;
use bytes_parser::ReadBytesExt;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const DIG_PER_DEC1: u8 = 9;
const DIG_TO_BYTES: [usize; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];
const MAX_PRECISION: u8 = 65;
const MAX_SCALE: u8 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct MyDecimal {
    // total number of decimal digits
    pub precision: u8,
    // number of decimal digits after the point
    pub scale: u8,
    pub negative: bool,
    // integral groups, the leading partial group comes first
    pub intg: Vec<u32>,
    // fractional groups, the trailing partial group comes last
    // and keeps its own digit count
    pub frac: Vec<u32>,
}

/// byte length of packed decimal with given precision and scale
///
/// scale must not exceed precision
fn bin_size(precision: u8, scale: u8) -> usize {
    let intg = precision - scale;
    let intg0 = (intg / DIG_PER_DEC1) as usize;
    let frac0 = (scale / DIG_PER_DEC1) as usize;
    intg0 * 4
        + DIG_TO_BYTES[(intg % DIG_PER_DEC1) as usize]
        + frac0 * 4
        + DIG_TO_BYTES[(scale % DIG_PER_DEC1) as usize]
}

impl MyDecimal {
    pub fn read_from(input: &mut Bytes, precision: u8, scale: u8) -> Result<Self> {
        if precision == 0 || precision > MAX_PRECISION || scale > MAX_SCALE || scale > precision
        {
            return Err(Error::MalformedDecimal(format!(
                "invalid precision and scale: precision={}, scale={}",
                precision, scale
            )));
        }
        let size = bin_size(precision, scale);
        if input.remaining_len() < size {
            return Err(Error::MalformedDecimal(format!(
                "insufficient bytes: precision={}, scale={}, bin_len={}, actual_len={}",
                precision,
                scale,
                size,
                input.remaining_len()
            )));
        }
        if input.remaining_len() > size {
            log::debug!(
                "decimal length mismatch: precision={}, scale={}, bin_len={}, actual_len={}",
                precision,
                scale,
                size,
                input.remaining_len()
            );
        }
        let mut buf = Vec::from(input.read_len(size)?.as_ref());
        // positive number will have first bit 1, this is MySQL decimal encoding
        let negative = buf[0] & 0x80 != 0x80;
        buf[0] ^= 0x80;
        if negative {
            buf.iter_mut().for_each(|b| *b ^= 0xff);
        }
        let mut buf = Bytes::from(buf);
        let intg_digits = precision - scale;
        let mut intg = vec![];
        let intg0x = intg_digits % DIG_PER_DEC1;
        if intg0x > 0 {
            intg.push(read_group(&mut buf, DIG_TO_BYTES[intg0x as usize])?);
        }
        for _ in 0..intg_digits / DIG_PER_DEC1 {
            intg.push(read_group(&mut buf, 4)?);
        }
        let mut frac = vec![];
        for _ in 0..scale / DIG_PER_DEC1 {
            frac.push(read_group(&mut buf, 4)?);
        }
        let frac0x = scale % DIG_PER_DEC1;
        if frac0x > 0 {
            frac.push(read_group(&mut buf, DIG_TO_BYTES[frac0x as usize])?);
        }
        Ok(MyDecimal {
            precision,
            scale,
            negative,
            intg,
            frac,
        })
    }

    pub fn to_big_decimal(&self) -> Result<BigDecimal> {
        BigDecimal::from_str(&self.to_string())
            .map_err(|e| Error::MalformedDecimal(format!("{}", e)))
    }
}

/// read a big endian group of 1 to 4 bytes
fn read_group(input: &mut Bytes, len: usize) -> Result<u32> {
    let n = match len {
        1 => input.read_u8()? as u32,
        2 => input.read_be_u16()? as u32,
        3 => input.read_be_u24()?,
        _ => input.read_be_u32()?,
    };
    Ok(n)
}

impl fmt::Display for MyDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut intg = String::with_capacity(self.intg.len() * 9);
        let intg0x = (self.precision - self.scale) % DIG_PER_DEC1;
        for (i, g) in self.intg.iter().enumerate() {
            if i == 0 && intg0x > 0 {
                intg.push_str(&g.to_string());
            } else {
                intg.push_str(&format!("{:09}", g));
            }
        }
        let intg = intg.trim_start_matches('0');
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(if intg.is_empty() { "0" } else { intg })?;
        if self.scale == 0 {
            return Ok(());
        }
        f.write_str(".")?;
        let frac0 = (self.scale / DIG_PER_DEC1) as usize;
        let frac0x = (self.scale % DIG_PER_DEC1) as usize;
        for (i, g) in self.frac.iter().enumerate() {
            if i < frac0 {
                write!(f, "{:09}", g)?;
            } else {
                write!(f, "{:0width$}", g, width = frac0x)?;
            }
        }
        Ok(())
    }
}

/// exported as canonical string to keep all digits
impl Serialize for MyDecimal {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}
