//! Multi-probe digital waveforms: one byte per sample, one bit per probe.
//!
//! Grounded in `datum/waveforms/digital_waveform.py`'s `DigitalWaveform`/
//! `DigitalWaveformMetaInfo`.

use serde::{Deserialize, Serialize};

use crate::sample::{ElementType, SampleBuffer};
use crate::wfm::enums::SiBaseUnit;

use super::{VersionedCache, Waveform, WaveformCore, WaveformMetaInfo};

/// Reinterpret a sample value's bit pattern as `u8`. For `I8` this is a
/// two's-complement reinterpretation (`-1 -> 255`), not a saturating cast —
/// `v as u8` would clamp every negative value to `0` instead.
fn byte_value_to_u8(value: f64, dtype: ElementType) -> u8 {
    match dtype {
        ElementType::I8 => (value as i64) as i8 as u8,
        _ => value as u8,
    }
}

/// Per-probe state/threshold/name/unit metadata, eight probes per byte
/// sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigitalWaveformMetaInfo {
    pub base: WaveformMetaInfo,
    pub digital_probe_state: [Vec<u8>; 8],
}

/// A digital acquisition: one byte per sample, bit `n` holding probe `n`'s
/// state.
#[derive(Debug, Clone)]
pub struct DigitalWaveform {
    pub core: WaveformCore,
    pub y_axis_byte_values: SampleBuffer,
    pub y_axis_units: SiBaseUnit,
    cache: VersionedCache<Vec<Vec<u8>>>,
}

impl Default for DigitalWaveform {
    fn default() -> Self {
        Self {
            core: WaveformCore::default(),
            y_axis_byte_values: SampleBuffer::new(ElementType::U8, Vec::new()),
            y_axis_units: SiBaseUnit::None,
            cache: VersionedCache::default(),
        }
    }
}

impl DigitalWaveform {
    pub fn set_y_axis_byte_values(&mut self, values: SampleBuffer) {
        self.y_axis_byte_values = values;
        self.cache.bump();
    }

    /// One row per sample, eight bits (probes) per row, bit 0 first.
    pub fn normalized_vertical_values(&self) -> Vec<Vec<u8>> {
        let buffer = &self.y_axis_byte_values;
        self.cache.get_or_compute(|| {
            let bytes: Vec<u8> = buffer
                .values
                .iter()
                .map(|&v| byte_value_to_u8(v, buffer.dtype))
                .collect();
            SampleBuffer::undigitize(&bytes)
                .chunks(8)
                .map(|chunk| chunk.to_vec())
                .collect()
        })
    }

    /// The full time series for a single probe (0-7).
    pub fn get_nth_bitstream(&self, probe: usize) -> Vec<u8> {
        self.normalized_vertical_values()
            .iter()
            .map(|row| row[probe])
            .collect()
    }
}

impl Waveform for DigitalWaveform {
    fn core(&self) -> &WaveformCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WaveformCore {
        &mut self.core
    }

    fn record_length(&self) -> usize {
        self.y_axis_byte_values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_bitstream_extracts_one_probe_per_sample() {
        let mut wfm = DigitalWaveform::default();
        wfm.set_y_axis_byte_values(SampleBuffer::new(ElementType::U8, vec![0b0000_0001 as f64, 0b0000_0000 as f64]));
        let stream = wfm.get_nth_bitstream(7);
        assert_eq!(stream, vec![1, 0]);
    }
}
