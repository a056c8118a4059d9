//! Byte primitives: fixed-width scalars and fixed-length strings.
//!
//! Every named primitive (`i8`/`u8`/`i16`/`u16`/`i32`/`u32`/`i64`/`u64`/
//! `f32`/`f64` and fixed strings of length 1, 2, 8, 20, 32) implements
//! [`BytePrimitive`]: endian-aware `pack`/`unpack`, a compile-time byte
//! length, and a `byte_sum` used by the file checksum.

use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, WfmError};

/// Runtime byte order selector, independent of the WFM-file-specific
/// endian marker bytes (see [`crate::wfm::enums::ByteOrderFormat`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// A fixed-width scalar or fixed-length string that can be packed to and
/// unpacked from a byte stream, with a length known at compile time and a
/// `tek_meta` type indicator when the primitive doubles as a tekmeta value.
pub trait BytePrimitive: Sized {
    /// The number of bytes this primitive always occupies on the wire.
    const LEN: usize;

    /// The tekmeta wire-format `type_indicator` this primitive serializes
    /// as when used as a metadata value, if any:
    /// `1`=bytes, `2`=i32, `3`=f64, `4`=u32.
    const TEK_META: Option<u8> = None;

    fn pack<W: Write>(&self, endian: Endian, sink: &mut W) -> Result<()>;
    fn unpack<R: Read>(endian: Endian, source: &mut R) -> Result<Self>;

    /// Sum of the raw bytes this value packs to, used by the file checksum.
    fn byte_sum(&self, endian: Endian) -> Result<u64> {
        let mut buf = Vec::with_capacity(Self::LEN);
        self.pack(endian, &mut buf)?;
        Ok(buf.iter().map(|&b| b as u64).sum())
    }
}

macro_rules! impl_numeric_primitive {
    ($ty:ty, $len:expr, $read_method:ident, $write_method:ident, $tek_meta:expr) => {
        impl BytePrimitive for $ty {
            const LEN: usize = $len;
            const TEK_META: Option<u8> = $tek_meta;

            fn pack<W: Write>(&self, endian: Endian, sink: &mut W) -> Result<()> {
                match endian {
                    Endian::Big => sink.$write_method::<BigEndian>(*self)?,
                    Endian::Little => sink.$write_method::<LittleEndian>(*self)?,
                }
                Ok(())
            }

            fn unpack<R: Read>(endian: Endian, source: &mut R) -> Result<Self> {
                let value = match endian {
                    Endian::Big => source.$read_method::<BigEndian>()?,
                    Endian::Little => source.$read_method::<LittleEndian>()?,
                };
                Ok(value)
            }
        }
    };
}

impl_numeric_primitive!(i16, 2, read_i16, write_i16, None);
impl_numeric_primitive!(u16, 2, read_u16, write_u16, None);
impl_numeric_primitive!(i32, 4, read_i32, write_i32, Some(2));
impl_numeric_primitive!(u32, 4, read_u32, write_u32, Some(4));
impl_numeric_primitive!(i64, 8, read_i64, write_i64, None);
impl_numeric_primitive!(u64, 8, read_u64, write_u64, None);
impl_numeric_primitive!(f32, 4, read_f32, write_f32, None);
impl_numeric_primitive!(f64, 8, read_f64, write_f64, Some(3));

impl BytePrimitive for i8 {
    const LEN: usize = 1;

    fn pack<W: Write>(&self, _endian: Endian, sink: &mut W) -> Result<()> {
        sink.write_i8(*self)?;
        Ok(())
    }

    fn unpack<R: Read>(_endian: Endian, source: &mut R) -> Result<Self> {
        Ok(source.read_i8()?)
    }
}

impl BytePrimitive for u8 {
    const LEN: usize = 1;

    fn pack<W: Write>(&self, _endian: Endian, sink: &mut W) -> Result<()> {
        sink.write_u8(*self)?;
        Ok(())
    }

    fn unpack<R: Read>(_endian: Endian, source: &mut R) -> Result<Self> {
        Ok(source.read_u8()?)
    }
}

/// A fixed-length, NUL-padded ASCII/UTF-8 string, as used for WFM's
/// `label`/`units` fields and the version marker.
///
/// On write, the string is encoded as UTF-8 and padded with `\0` to `N`
/// bytes (truncated if longer). On read, the raw bytes are decoded as
/// UTF-8 and trimmed at the first NUL. Bytes that are not valid UTF-8 are
/// preserved losslessly via [`FixedString::raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedString<const N: usize> {
    raw: [u8; N],
}

impl<const N: usize> FixedString<N> {
    pub const TEK_META: Option<u8> = Some(1);

    pub fn new(text: &str) -> Self {
        let mut raw = [0u8; N];
        let bytes = text.as_bytes();
        let take = bytes.len().min(N);
        raw[..take].copy_from_slice(&bytes[..take]);
        Self { raw }
    }

    pub fn from_raw(raw: [u8; N]) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &[u8; N] {
        &self.raw
    }

    /// Decode as UTF-8 up to the first NUL; lossy-replace invalid bytes
    /// rather than fail, matching the "best-effort" read contract.
    pub fn as_str(&self) -> String {
        let end = self.raw.iter().position(|&b| b == 0).unwrap_or(N);
        String::from_utf8_lossy(&self.raw[..end]).into_owned()
    }

    /// Truncate at the first non-alphabetic byte, the legacy metadata-key
    /// coercion heuristic required by some file-format round-trips
    /// (`helpers/byte_data_class.py::convert_to_type`).
    pub fn leading_alpha(&self) -> String {
        let mut out = String::new();
        for &b in self.raw.iter() {
            let c = b as char;
            if c.is_ascii_alphabetic() {
                out.push(c);
            } else {
                break;
            }
        }
        out
    }
}

impl<const N: usize> BytePrimitive for FixedString<N> {
    const LEN: usize = N;
    const TEK_META: Option<u8> = Some(1);

    fn pack<W: Write>(&self, _endian: Endian, sink: &mut W) -> Result<()> {
        sink.write_all(&self.raw)?;
        Ok(())
    }

    fn unpack<R: Read>(_endian: Endian, source: &mut R) -> Result<Self> {
        let mut raw = [0u8; N];
        source
            .read_exact(&mut raw)
            .map_err(|_| WfmError::UnexpectedEof {
                context: "fixed string",
            })?;
        Ok(Self { raw })
    }

    fn byte_sum(&self, _endian: Endian) -> Result<u64> {
        Ok(self.raw.iter().map(|&b| b as u64).sum())
    }
}

pub type String2 = FixedString<2>;
pub type String8 = FixedString<8>;
pub type String20 = FixedString<20>;
pub type String32 = FixedString<32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_i32_both_endians() {
        for endian in [Endian::Big, Endian::Little] {
            let mut buf = Vec::new();
            42i32.pack(endian, &mut buf).unwrap();
            let mut cursor = std::io::Cursor::new(buf);
            assert_eq!(i32::unpack(endian, &mut cursor).unwrap(), 42);
        }
    }

    #[test]
    fn fixed_string_pads_and_trims() {
        let s = String32::new("Signal A");
        assert_eq!(s.as_str(), "Signal A");
        assert_eq!(s.raw().len(), 32);
    }

    #[test]
    fn leading_alpha_stops_at_first_non_alpha() {
        let mut raw = [0u8; 8];
        raw[..5].copy_from_slice(b"tek!?");
        let s = String8::from_raw(raw);
        assert_eq!(s.leading_alpha(), "tek");
    }

    #[test]
    fn byte_sum_matches_manual_sum() {
        let v: u32 = 0x0102_0304;
        let sum = v.byte_sum(Endian::Big).unwrap();
        assert_eq!(sum, 1 + 2 + 3 + 4);
    }
}
