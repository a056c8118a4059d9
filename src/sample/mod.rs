//! The numeric transform engine behind every waveform's vertical axis.
//!
//! A waveform's samples move between four representations as they are
//! read, displayed, or written back out:
//!
//! - [`Domain::Raw`] — the digitizer's native integer/float codes, as
//!   they sit in a curve buffer on disk.
//! - [`Domain::FeatureScaled`] — raw values divided down to `[-1.0, 1.0]`.
//! - [`Domain::Normalized`] — raw values mapped through a spacing/offset
//!   pair onto real-world units (volts, for an analog channel).
//! - [`Domain::Digitized`] — a digital channel's bit planes, packed eight
//!   to a byte.
//!
//! Grounded in `datum/data_types.py`'s `RawSample`/`FeatureScaled`/
//! `Normalized`/`Digitized` classes. Conversions use `f64` arithmetic
//! rather than arbitrary-precision decimals; values near the extremes of
//! `i64`/`u64` can lose a handful of bits of precision in the ratio
//! computation as a result.

use crate::bytes::BytePrimitive;
use log::warn;

/// Which on-disk numeric type a raw sample buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ElementType {
    pub fn is_unsigned(self) -> bool {
        matches!(self, ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, ElementType::F32 | ElementType::F64)
    }

    /// The byte width of one element, matching [`BytePrimitive::LEN`] for
    /// the corresponding Rust scalar.
    pub fn byte_len(self) -> usize {
        match self {
            ElementType::I8 | ElementType::U8 => u8::LEN,
            ElementType::I16 | ElementType::U16 => i16::LEN,
            ElementType::I32 | ElementType::U32 => i32::LEN,
            ElementType::I64 | ElementType::U64 => i64::LEN,
            ElementType::F32 => f32::LEN,
            ElementType::F64 => f64::LEN,
        }
    }

    /// The largest value representable by this type.
    pub fn type_max(self) -> f64 {
        match self {
            ElementType::I8 => i8::MAX as f64,
            ElementType::U8 => u8::MAX as f64,
            ElementType::I16 => i16::MAX as f64,
            ElementType::U16 => u16::MAX as f64,
            ElementType::I32 => i32::MAX as f64,
            ElementType::U32 => u32::MAX as f64,
            ElementType::I64 => i64::MAX as f64,
            ElementType::U64 => u64::MAX as f64,
            ElementType::F32 => f32::MAX as f64,
            ElementType::F64 => f64::MAX,
        }
    }

    /// The smallest value representable by this type.
    pub fn type_min(self) -> f64 {
        match self {
            ElementType::I8 => i8::MIN as f64,
            ElementType::U8 => u8::MIN as f64,
            ElementType::I16 => i16::MIN as f64,
            ElementType::U16 => u16::MIN as f64,
            ElementType::I32 => i32::MIN as f64,
            ElementType::U32 => u32::MIN as f64,
            ElementType::I64 => i64::MIN as f64,
            ElementType::U64 => u64::MIN as f64,
            ElementType::F32 => f32::MIN as f64,
            ElementType::F64 => f64::MIN,
        }
    }

    fn clamp_round(self, value: f64) -> f64 {
        if self.is_float() {
            value
        } else {
            value.round().clamp(self.type_min(), self.type_max())
        }
    }
}

/// Ratio of the numeric ranges of two types (e.g. `i16 -> i8` is `1/256`).
pub fn type_ratio(from: ElementType, to: ElementType) -> f64 {
    let old_range = from.type_max() - from.type_min();
    let new_range = to.type_max() - to.type_min();
    new_range / old_range
}

/// Which representation a sample buffer's values are currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Raw,
    FeatureScaled,
    Normalized,
    Digitized,
}

/// A buffer of vertical-axis sample values, tagged with the on-disk type
/// they were (or will be) digitized to.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub dtype: ElementType,
    pub values: Vec<f64>,
}

impl Default for SampleBuffer {
    /// An empty 16-bit integer buffer — the same dtype every waveform's
    /// own `Default` impl seeds its vertical axis with.
    fn default() -> Self {
        Self::new(ElementType::I16, Vec::new())
    }
}

impl SampleBuffer {
    pub fn new(dtype: ElementType, values: Vec<f64>) -> Self {
        Self { dtype, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The spacing a raw buffer of this dtype implies, `1 / (max - min)`
    /// (`RawSample.calculate_spacing`).
    pub fn calculate_spacing(&self) -> f64 {
        1.0 / (self.dtype.type_max() - self.dtype.type_min())
    }

    /// Convert this raw-domain buffer to another raw dtype, applying the
    /// signed/unsigned crossing correction `RawSample._this_format_to_raw_sample_format`
    /// uses so the midpoint of the range doesn't shift.
    pub fn to_raw(&self, to: ElementType) -> SampleBuffer {
        if to == self.dtype {
            return self.clone();
        }
        let ratio = type_ratio(self.dtype, to);
        let offset = if !self.dtype.is_unsigned() && to.is_unsigned() {
            self.dtype.type_min() * ratio
        } else if self.dtype.is_unsigned() && !to.is_unsigned() {
            -to.type_min()
        } else {
            0.0
        };
        let values = self
            .values
            .iter()
            .map(|&v| to.clamp_round(v * ratio - offset))
            .collect();
        SampleBuffer::new(to, values)
    }

    /// Raw -> feature-scaled: divide by the dtype's maximum magnitude.
    pub fn to_feature_scaled(&self) -> Vec<f64> {
        self.values.iter().map(|&v| v / self.dtype.type_max()).collect()
    }

    /// Feature-scaled -> raw: multiply back up and cast to `to`.
    pub fn feature_scaled_to_raw(values: &[f64], to: ElementType) -> SampleBuffer {
        let raw = values
            .iter()
            .map(|&v| to.clamp_round(v * to.type_max()))
            .collect();
        SampleBuffer::new(to, raw)
    }

    /// Raw -> normalized, given a known spacing/offset pair.
    pub fn to_normalized(&self, spacing: f64, offset: f64) -> Vec<f64> {
        self.values.iter().map(|&v| v * spacing + offset).collect()
    }

    /// Normalized -> raw. When `spacing`/`offset` aren't already known
    /// (e.g. the dimension record hasn't been populated yet), they're
    /// derived from the data's own min/max the same way
    /// `Normalized.__new__` seeds its class-level defaults.
    ///
    /// Note the offset formula here intentionally differs from the one
    /// `Normalized.__new__` uses to seed its own defaults (that one also
    /// divides by the type range) — this mirrors an inconsistency present
    /// in the reference implementation's conversion path, not a typo.
    pub fn normalized_to_raw(
        values: &[f64],
        to: ElementType,
        spacing: Option<f64>,
        offset: Option<f64>,
    ) -> SampleBuffer {
        let (min, max) = min_max(values);
        let spacing = spacing.unwrap_or_else(|| (max - min) / (to.type_max() - to.type_min()));
        let offset = offset.unwrap_or((max + min) / 2.0);
        let raw = values
            .iter()
            .map(|&v| to.clamp_round((v - offset) / spacing))
            .collect();
        SampleBuffer::new(to, raw)
    }

    /// The spacing/offset pair `Normalized.__new__` seeds itself with when
    /// neither is given explicitly.
    pub fn normalized_defaults(values: &[f64], dtype: ElementType) -> (f64, f64) {
        let (min, max) = min_max(values);
        let range = dtype.type_max() - dtype.type_min();
        let spacing = (max - min) / range;
        let offset = (max + min) / 2.0 / range;
        (spacing, offset)
    }

    /// Pack a digital channel's per-bit values (0/1) eight to a byte,
    /// matching `np.packbits`.
    pub fn digitize(bits: &[u8]) -> Vec<u8> {
        if bits.iter().any(|&b| b > 1) {
            warn!("digitize() received a value outside {{0, 1}}; treating nonzero as 1");
        }
        bits.chunks(8)
            .map(|chunk| {
                let mut byte = 0u8;
                for (i, &bit) in chunk.iter().enumerate() {
                    if bit != 0 {
                        byte |= 0x80 >> i;
                    }
                }
                byte
            })
            .collect()
    }

    /// Inverse of [`SampleBuffer::digitize`], matching `np.unpackbits`.
    pub fn undigitize(bytes: &[u8]) -> Vec<u8> {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for &byte in bytes {
            for i in 0..8 {
                bits.push((byte >> (7 - i)) & 1);
            }
        }
        bits
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_i16_to_i8_is_one_over_256() {
        let ratio = type_ratio(ElementType::I16, ElementType::I8);
        assert!((ratio - 1.0 / 256.0).abs() < 1e-12);
    }

    #[test]
    fn feature_scaled_round_trips_through_raw() {
        let raw = SampleBuffer::new(ElementType::I16, vec![16384.0, -16384.0, 0.0]);
        let scaled = raw.to_feature_scaled();
        let back = SampleBuffer::feature_scaled_to_raw(&scaled, ElementType::I16);
        for (a, b) in raw.values.iter().zip(back.values.iter()) {
            assert!((a - b).abs() <= 1.0);
        }
    }

    #[test]
    fn digitize_packs_eight_bits_per_byte() {
        let bits = [1u8, 0, 1, 1, 0, 0, 0, 0];
        let packed = SampleBuffer::digitize(&bits);
        assert_eq!(packed, vec![0b1011_0000]);
        assert_eq!(SampleBuffer::undigitize(&packed), bits.to_vec());
    }

    #[test]
    fn unsigned_to_signed_crossing_applies_offset() {
        let raw = SampleBuffer::new(ElementType::U8, vec![0.0, 255.0]);
        let signed = raw.to_raw(ElementType::I8);
        assert_eq!(signed.values, vec![-128.0, 127.0]);
    }
}
