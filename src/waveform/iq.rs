//! Interleaved in-phase/quadrature waveforms.
//!
//! Grounded in `datum/waveforms/iq_waveform.py`'s `IQWaveform`/
//! `IQWaveformMetaInfo`. `iq_sample_rate` derivation from the window type
//! uses the same magic-number lookup as the source; the window names are
//! an instrument-reported label, not a computed property.

use serde::{Deserialize, Serialize};

use crate::sample::{ElementType, SampleBuffer};
use crate::wfm::enums::{IqWindowType, SiBaseUnit};

use super::analog::AnalogWaveformMetaInfo;
use super::{VersionedCache, Waveform, WaveformCore};

/// Per-window-type constant used to derive `iq_sample_rate` from FFT
/// length and resolution bandwidth when a known window is reported.
fn window_magic_number(window: IqWindowType) -> f64 {
    match window {
        IqWindowType::BlackHarris => 1.9,
        IqWindowType::FlatTop => 3.77,
        IqWindowType::Hanning => 1.44,
        IqWindowType::Hamming => 1.3,
        IqWindowType::Rectangle => 0.89,
        IqWindowType::KaiserBessel => 2.23,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IqWaveformMetaInfo {
    pub base: AnalogWaveformMetaInfo,
    pub iq_center_frequency: f64,
    pub iq_fft_length: f64,
    pub iq_resolution_bandwidth: f64,
    pub iq_span: f64,
    pub iq_window_type: Option<IqWindowType>,
    pub iq_sample_rate: f64,
}

impl IqWaveformMetaInfo {
    /// Recompute `iq_sample_rate` from the window type when one is known;
    /// otherwise fall back to the reported span, matching the source's
    /// `__post_init__`.
    pub fn recompute_sample_rate(&mut self) {
        self.iq_sample_rate = match self.iq_window_type {
            Some(window) => {
                (self.iq_fft_length * self.iq_resolution_bandwidth) / window_magic_number(window)
            }
            None => self.iq_span,
        };
    }
}

/// An IQ acquisition: in-phase and quadrature samples interleaved as
/// `[i0, q0, i1, q1, ...]`.
#[derive(Debug, Clone)]
pub struct IqWaveform {
    pub core: WaveformCore,
    pub interleaved_iq_axis_values: SampleBuffer,
    pub iq_axis_spacing: f64,
    pub iq_axis_offset: f64,
    pub iq_axis_units: SiBaseUnit,
    cache: VersionedCache<Vec<(f64, f64)>>,
}

impl Default for IqWaveform {
    fn default() -> Self {
        Self {
            core: WaveformCore::default(),
            interleaved_iq_axis_values: SampleBuffer::new(ElementType::I16, Vec::new()),
            iq_axis_spacing: 1.0,
            iq_axis_offset: 0.0,
            iq_axis_units: SiBaseUnit::Volts,
            cache: VersionedCache::default(),
        }
    }
}

impl IqWaveform {
    pub fn set_interleaved_iq_axis_values(&mut self, values: SampleBuffer) {
        self.interleaved_iq_axis_values = values;
        self.cache.bump();
    }

    pub fn i_axis_values(&self) -> Vec<f64> {
        self.interleaved_iq_axis_values.values.iter().step_by(2).copied().collect()
    }

    pub fn q_axis_values(&self) -> Vec<f64> {
        self.interleaved_iq_axis_values.values.iter().skip(1).step_by(2).copied().collect()
    }

    pub fn set_i_axis_values(&mut self, i_values: &[f64]) {
        self.resize_interleaved_if_empty(i_values.len());
        for (slot, &value) in self.interleaved_iq_axis_values.values.iter_mut().step_by(2).zip(i_values) {
            *slot = value;
        }
        self.cache.bump();
    }

    pub fn set_q_axis_values(&mut self, q_values: &[f64]) {
        self.resize_interleaved_if_empty(q_values.len());
        let skipped = self.interleaved_iq_axis_values.values.iter_mut().skip(1).step_by(2);
        for (slot, &value) in skipped.zip(q_values) {
            *slot = value;
        }
        self.cache.bump();
    }

    fn resize_interleaved_if_empty(&mut self, half_len: usize) {
        if self.interleaved_iq_axis_values.values.is_empty() {
            self.interleaved_iq_axis_values.values = vec![0.0; half_len * 2];
        }
    }

    /// `(i, q)` pairs mapped onto real-world units via `iq_axis_spacing`/
    /// `iq_axis_offset`.
    pub fn normalized_vertical_values(&self) -> Vec<(f64, f64)> {
        let i = self.i_axis_values();
        let q = self.q_axis_values();
        let spacing = self.iq_axis_spacing;
        let offset = self.iq_axis_offset;
        self.cache.get_or_compute(|| {
            i.into_iter()
                .zip(q)
                .map(|(i, q)| (i * spacing + offset, q * spacing + offset))
                .collect()
        })
    }

    pub fn iq_axis_extent_magnitude(&self) -> f64 {
        let dtype = self.interleaved_iq_axis_values.dtype;
        let type_extent = dtype.type_max() - dtype.type_min();
        self.iq_axis_spacing * type_extent
    }

    pub fn set_iq_axis_extent_magnitude(&mut self, extent_magnitude: f64) {
        let dtype = self.interleaved_iq_axis_values.dtype;
        let type_extent = dtype.type_max() - dtype.type_min();
        self.iq_axis_spacing = extent_magnitude / type_extent;
        self.cache.bump();
    }
}

impl Waveform for IqWaveform {
    fn core(&self) -> &WaveformCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WaveformCore {
        &mut self.core
    }

    fn record_length(&self) -> usize {
        self.q_axis_values().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i_and_q_axes_deinterleave_correctly() {
        let mut wfm = IqWaveform::default();
        wfm.set_interleaved_iq_axis_values(SampleBuffer::new(
            ElementType::I16,
            vec![1.0, 2.0, 3.0, 4.0],
        ));
        assert_eq!(wfm.i_axis_values(), vec![1.0, 3.0]);
        assert_eq!(wfm.q_axis_values(), vec![2.0, 4.0]);
    }

    #[test]
    fn sample_rate_uses_window_magic_number_when_known() {
        let mut meta = IqWaveformMetaInfo {
            iq_fft_length: 1024.0,
            iq_resolution_bandwidth: 10.0,
            iq_window_type: Some(IqWindowType::Hanning),
            ..Default::default()
        };
        meta.recompute_sample_rate();
        assert!((meta.iq_sample_rate - (1024.0 * 10.0 / 1.44)).abs() < 1e-9);
    }

    #[test]
    fn sample_rate_falls_back_to_span_without_window() {
        let mut meta = IqWaveformMetaInfo {
            iq_span: 5.0,
            iq_window_type: None,
            ..Default::default()
        };
        meta.recompute_sample_rate();
        assert_eq!(meta.iq_sample_rate, 5.0);
    }
}
