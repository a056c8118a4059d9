//! The waveform model shared by analog, digital, and IQ acquisitions.
//!
//! Grounded in `datum/waveforms/waveform.py`'s `Waveform`/`WaveformMetaInfo`
//! base classes. Each mutating setter on a concrete waveform bumps a
//! version counter; derived views (`normalized_horizontal_values`,
//! `normalized_vertical_values`) are recomputed lazily the next time
//! they're read rather than eagerly on every mutation.

pub mod analog;
pub mod digital;
pub mod iq;

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::wfm::enums::SiBaseUnit;

/// A metadata value as it travels between a waveform's `extended_metadata`
/// map and the tekmeta wire format's four typed slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    Bytes(Vec<u8>),
    Int(i32),
    Double(f64),
    UInt(u32),
}

/// Lazily recomputed, version-stamped cache for a derived view.
///
/// `bump()` invalidates the cache without recomputing it; the next
/// `get_or_compute` call pays for the recomputation, not the setter that
/// triggered it.
#[derive(Debug, Default)]
pub struct VersionedCache<T> {
    version: u64,
    cached: RefCell<Option<(u64, T)>>,
}

impl<T: Clone> VersionedCache<T> {
    pub fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> T {
        if let Some((version, value)) = self.cached.borrow().as_ref() {
            if *version == self.version {
                return value.clone();
            }
        }
        let value = compute();
        *self.cached.borrow_mut() = Some((self.version, value.clone()));
        value
    }
}

/// Arbitrary key/value data carried alongside a waveform's typed fields,
/// plus the subset of those fields the tekmeta wire format knows how to
/// (de)serialize on its own.
///
/// `waveform_label` is the one metadata field common to every waveform kind
/// (`waveform_label` is its own tekmeta key, unchanged across analog,
/// digital, and IQ) — everything else recognized is per-type and lives on
/// the concrete `*WaveformMetaInfo` struct instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveformMetaInfo {
    pub waveform_label: Option<String>,
    pub extended_metadata: HashMap<String, MetaValue>,
}

impl WaveformMetaInfo {
    pub fn set_custom_metadata(&mut self, key: &str, value: MetaValue) {
        self.extended_metadata.insert(key.to_string(), value);
    }

    pub fn get_custom_metadata(&self, key: &str) -> Option<&MetaValue> {
        self.extended_metadata.get(key)
    }

    /// Serialize this metadata to a JSON string, for callers (the CSV
    /// bridge's header remap, downstream tooling) that want a
    /// self-describing interchange format rather than the raw
    /// `HashMap<String, MetaValue>`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Rename every key in `data` through `lookup` (internal field name ->
    /// wire key, or the reverse when reading). Keys absent from `lookup`
    /// are passed through unchanged unless `drop_non_existent` is set, in
    /// which case they're dropped with a warning.
    pub fn remap(
        lookup: &HashMap<&str, &str>,
        data: HashMap<String, MetaValue>,
        drop_non_existent: bool,
    ) -> HashMap<String, MetaValue> {
        let mut out = HashMap::with_capacity(data.len());
        for (key, value) in data {
            match lookup.get(key.as_str()) {
                Some(&mapped) => {
                    out.insert(mapped.to_string(), value);
                }
                None if drop_non_existent => {
                    warn!("dropping unmapped metadata key '{key}'");
                }
                None => {
                    out.insert(key, value);
                }
            }
        }
        out
    }
}

/// The sample axis every waveform shares: spacing between points, an
/// optional trigger index, and the SI unit the spacing is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub spacing: f64,
    pub trigger_index: Option<f64>,
    pub units: SiBaseUnit,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            trigger_index: None,
            units: SiBaseUnit::Seconds,
        }
    }
}

/// Fields and bookkeeping every waveform variant embeds.
#[derive(Debug, Clone, Default)]
pub struct WaveformCore {
    pub source_name: Option<String>,
    pub time_axis: TimeAxis,
    pub meta_info: Option<WaveformMetaInfo>,
}

/// Behavior common to every acquisition kind: a time axis, a record
/// length, and a normalized view of the horizontal axis derived from them.
pub trait Waveform {
    fn core(&self) -> &WaveformCore;
    fn core_mut(&mut self) -> &mut WaveformCore;
    fn record_length(&self) -> usize;

    /// Sample times relative to the trigger, one per sample.
    ///
    /// `x[i] = i * spacing - trigger_index * spacing`, matching
    /// `Waveform.normalized_horizontal_values`'s `np.arange` call.
    fn normalized_horizontal_values(&self) -> Vec<f64> {
        let axis = self.core().time_axis;
        let trigger_location = axis.trigger_index.unwrap_or(0.0) * axis.spacing;
        (0..self.record_length())
            .map(|i| i as f64 * axis.spacing - trigger_location)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_values_center_on_trigger() {
        struct Toy(WaveformCore);
        impl Waveform for Toy {
            fn core(&self) -> &WaveformCore {
                &self.0
            }
            fn core_mut(&mut self) -> &mut WaveformCore {
                &mut self.0
            }
            fn record_length(&self) -> usize {
                4
            }
        }
        let mut core = WaveformCore::default();
        core.time_axis.spacing = 0.5;
        core.time_axis.trigger_index = Some(2.0);
        let toy = Toy(core);
        assert_eq!(toy.normalized_horizontal_values(), vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn versioned_cache_recomputes_only_after_bump() {
        let mut cache: VersionedCache<i32> = VersionedCache::default();
        let mut calls = 0;
        let mut compute = || {
            calls += 1;
            42
        };
        assert_eq!(cache.get_or_compute(&mut compute), 42);
        assert_eq!(cache.get_or_compute(&mut compute), 42);
        assert_eq!(calls, 1);
        cache.bump();
        assert_eq!(cache.get_or_compute(&mut compute), 42);
        assert_eq!(calls, 2);
    }

    #[test]
    fn remap_passes_through_unknown_keys_unless_dropped() {
        let lookup: HashMap<&str, &str> = [("y_offset", "yOffset")].into_iter().collect();
        let mut data = HashMap::new();
        data.insert("y_offset".to_string(), MetaValue::Double(1.0));
        data.insert("custom_key".to_string(), MetaValue::Int(7));

        let kept = WaveformMetaInfo::remap(&lookup, data.clone(), false);
        assert!(kept.contains_key("yOffset"));
        assert!(kept.contains_key("custom_key"));

        let dropped = WaveformMetaInfo::remap(&lookup, data, true);
        assert!(dropped.contains_key("yOffset"));
        assert!(!dropped.contains_key("custom_key"));
    }

    #[test]
    fn meta_info_round_trips_through_json() {
        let mut meta = WaveformMetaInfo {
            waveform_label: Some("Signal A".to_string()),
            ..Default::default()
        };
        meta.set_custom_metadata("note", MetaValue::Int(7));

        let json = meta.to_json().unwrap();
        let back = WaveformMetaInfo::from_json(&json).unwrap();
        assert_eq!(back.waveform_label, meta.waveform_label);
        assert_eq!(back.extended_metadata, meta.extended_metadata);
    }
}
