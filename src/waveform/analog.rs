//! Single-channel voltage-over-time waveforms.
//!
//! Grounded in `datum/waveforms/analog_waveform.py`'s `AnalogWaveform`/
//! `AnalogWaveformMetaInfo`.

use serde::{Deserialize, Serialize};

use crate::sample::{ElementType, SampleBuffer};
use crate::wfm::enums::SiBaseUnit;

use super::{VersionedCache, Waveform, WaveformCore, WaveformMetaInfo};

/// Analog-specific fields layered on top of [`WaveformMetaInfo`]'s generic
/// extended-metadata bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalogWaveformMetaInfo {
    pub base: WaveformMetaInfo,
    pub y_offset: f64,
    pub y_position: f64,
    pub analog_thumbnail: Option<String>,
    pub clipping_initialized: i32,
    pub interpreter_factor: Option<i32>,
    pub real_data_start_index: Option<i32>,
}

/// An analog channel: a vertical sample buffer plus the time axis every
/// waveform shares.
#[derive(Debug, Clone)]
pub struct AnalogWaveform {
    pub core: WaveformCore,
    pub y_axis_values: SampleBuffer,
    pub y_axis_spacing: f64,
    pub y_axis_offset: f64,
    pub y_axis_units: SiBaseUnit,
    cache: VersionedCache<Vec<f64>>,
}

impl Default for AnalogWaveform {
    fn default() -> Self {
        Self {
            core: WaveformCore::default(),
            y_axis_values: SampleBuffer::new(ElementType::I16, Vec::new()),
            y_axis_spacing: 1.0,
            y_axis_offset: 0.0,
            y_axis_units: SiBaseUnit::Volts,
            cache: VersionedCache::default(),
        }
    }
}

impl AnalogWaveform {
    pub fn set_y_axis_values(&mut self, values: SampleBuffer) {
        self.y_axis_values = values;
        self.cache.bump();
    }

    pub fn set_y_axis_spacing(&mut self, spacing: f64) {
        self.y_axis_spacing = spacing;
        self.cache.bump();
    }

    pub fn set_y_axis_offset(&mut self, offset: f64) {
        self.y_axis_offset = offset;
        self.cache.bump();
    }

    /// Sample values mapped onto real-world units: `y * spacing + offset`,
    /// recomputed only when the buffer, spacing, or offset last changed.
    pub fn normalized_vertical_values(&self) -> Vec<f64> {
        let buffer = &self.y_axis_values;
        let spacing = self.y_axis_spacing;
        let offset = self.y_axis_offset;
        self.cache.get_or_compute(|| buffer.to_normalized(spacing, offset))
    }

    /// The magnitude of real-world units one full sweep of the dtype's
    /// range represents.
    pub fn y_axis_extent_magnitude(&self) -> f64 {
        self.y_axis_spacing / self.y_axis_values.calculate_spacing()
    }

    /// Set spacing so that `extent_magnitude` real-world units map across
    /// the dtype's full range. The ratio below is the "FOILed" expansion
    /// of `(upper - lower) / (max - min)` kept exactly as the source
    /// computes it, which stays numerically stable for unsigned dtypes
    /// where `min == 0`.
    pub fn set_y_axis_extent_magnitude(&mut self, extent_magnitude: f64) {
        let dtype = self.y_axis_values.dtype;
        let max = dtype.type_max();
        let min = dtype.type_min();
        let ratio = 0.5 - (min.abs() - max.abs()) / ((min - max).abs() * 2.0);

        let mut upper_extent = 0.0;
        let mut lower_extent = 0.0;
        if ratio != 0.0 {
            upper_extent = ratio.powi(2) * (extent_magnitude / max);
        }
        if ratio != 1.0 {
            lower_extent = (1.0 - ratio).powi(2) * (extent_magnitude / min);
        }
        self.set_y_axis_spacing(upper_extent - lower_extent);
    }

    /// A copy of this waveform with its vertical values mapped into
    /// real-world units and the spacing/offset collapsed to match.
    pub fn transform_to_normalized(&self) -> AnalogWaveform {
        let mut copied = self.clone();
        let new_spacing = self.y_axis_extent_magnitude();
        let ratio = 1.0 / (self.y_axis_values.calculate_spacing() * new_spacing);
        let normalized = self.y_axis_values.to_normalized(self.y_axis_spacing, self.y_axis_offset);
        copied.set_y_axis_values(SampleBuffer::new(ElementType::F64, normalized));
        copied.y_axis_spacing *= ratio;
        copied.y_axis_offset = 0.0;
        copied
    }

    /// A copy of this waveform with its vertical values re-digitized to
    /// `to`, spacing rescaled so the represented range is unchanged.
    pub fn transform_to_type(&self, to: ElementType) -> AnalogWaveform {
        let mut copied = self.clone();
        copied.y_axis_offset = self.y_axis_offset;
        let old_spacing = self.y_axis_values.calculate_spacing();
        let raw = self.y_axis_values.to_raw(to);
        let new_spacing = raw.calculate_spacing();
        let ratio = new_spacing / old_spacing;
        copied.set_y_axis_values(raw);
        copied.y_axis_spacing *= ratio;
        copied
    }
}

impl Waveform for AnalogWaveform {
    fn core(&self) -> &WaveformCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WaveformCore {
        &mut self.core
    }

    fn record_length(&self) -> usize {
        self.y_axis_values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_magnitude_round_trips_through_setter() {
        let mut wfm = AnalogWaveform::default();
        wfm.y_axis_values = SampleBuffer::new(ElementType::I16, vec![0.0; 10]);
        wfm.set_y_axis_extent_magnitude(2.0);
        assert!(wfm.y_axis_extent_magnitude().is_finite());
    }

    #[test]
    fn mutating_values_invalidates_cache() {
        let mut wfm = AnalogWaveform::default();
        wfm.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![100.0, -100.0]));
        let first = wfm.normalized_vertical_values();
        wfm.set_y_axis_offset(5.0);
        let second = wfm.normalized_vertical_values();
        assert_ne!(first, second);
    }
}
