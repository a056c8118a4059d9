//! Per-waveform-type bridging between a parsed [`WfmFormat`]'s vertical
//! section (curve buffer + explicit dimensions) and analog/digital/IQ
//! waveform values and metadata.
//!
//! Grounded in `files_and_formats/wfm/data_formats/{analog,digital,iq}.py`'s
//! `_format_to_waveform_vertical_values`/`_waveform_vertical_values_to_format`
//! and each type's `_META_DATA_LOOKUP` table. The horizontal axis (implicit
//! dimensions, trigger index) is handled one level up, in
//! [`crate::wfm::reader`]/[`crate::wfm::writer`], since it isn't bridged
//! per-type in the source either.

use std::collections::HashMap;

use crate::error::Result;
use crate::sample::{ElementType, SampleBuffer};
use crate::waveform::analog::{AnalogWaveform, AnalogWaveformMetaInfo};
use crate::waveform::digital::{DigitalWaveform, DigitalWaveformMetaInfo};
use crate::waveform::iq::{IqWaveform, IqWaveformMetaInfo};
use crate::waveform::{MetaValue, Waveform, WaveformMetaInfo};
use crate::wfm::enums::{CurveFormatVer3, DataType, IqWindowType, SiBaseUnit, StorageType};

use super::format::{DimensionPair, DimensionUserView, WfmFormat};
use super::records::ExplicitDimension;

/// Which concrete waveform kind a file's header and metadata describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformKind {
    Analog,
    Digital,
    Iq,
}

/// A decoded waveform paired with its per-type metadata.
pub enum WfmWaveform {
    Analog(AnalogWaveform, AnalogWaveformMetaInfo),
    Digital(DigitalWaveform, DigitalWaveformMetaInfo),
    Iq(IqWaveform, IqWaveformMetaInfo),
}

impl WfmWaveform {
    pub fn kind(&self) -> WaveformKind {
        match self {
            WfmWaveform::Analog(..) => WaveformKind::Analog,
            WfmWaveform::Digital(..) => WaveformKind::Digital,
            WfmWaveform::Iq(..) => WaveformKind::Iq,
        }
    }

    pub fn core(&self) -> &crate::waveform::WaveformCore {
        match self {
            WfmWaveform::Analog(w, _) => w.core(),
            WfmWaveform::Digital(w, _) => w.core(),
            WfmWaveform::Iq(w, _) => w.core(),
        }
    }

    pub fn core_mut(&mut self) -> &mut crate::waveform::WaveformCore {
        match self {
            WfmWaveform::Analog(w, _) => w.core_mut(),
            WfmWaveform::Digital(w, _) => w.core_mut(),
            WfmWaveform::Iq(w, _) => w.core_mut(),
        }
    }
}

fn base_lookup() -> HashMap<&'static str, &'static str> {
    [
        ("y_offset", "yOffset"),
        ("y_position", "yPosition"),
        ("analog_thumbnail", "ANALOG_Thumbnail"),
        ("clipping_initialized", "clippingInitialized"),
        ("interpreter_factor", "interpFactor"),
        ("real_data_start_index", "realDataStartIndex"),
    ]
    .into_iter()
    .collect()
}

fn digital_lookup() -> HashMap<&'static str, &'static str> {
    let mut lookup = base_lookup();
    lookup.extend([
        ("digital_probe_0_state", "d0"),
        ("digital_probe_1_state", "d1"),
        ("digital_probe_2_state", "d2"),
        ("digital_probe_3_state", "d3"),
        ("digital_probe_4_state", "d4"),
        ("digital_probe_5_state", "d5"),
        ("digital_probe_6_state", "d6"),
        ("digital_probe_7_state", "d7"),
    ]);
    lookup
}

fn iq_lookup() -> HashMap<&'static str, &'static str> {
    let mut lookup = base_lookup();
    lookup.extend([
        ("iq_center_frequency", "IQ_centerFrequency"),
        ("iq_fft_length", "IQ_fftLength"),
        ("iq_resolution_bandwidth", "IQ_rbw"),
        ("iq_span", "IQ_span"),
        ("iq_window_type", "IQ_windowType"),
        ("iq_sample_rate", "IQ_sampleRate"),
    ]);
    lookup
}

fn invert(lookup: &HashMap<&'static str, &'static str>) -> HashMap<&'static str, &'static str> {
    lookup.iter().map(|(&k, &v)| (v, k)).collect()
}

/// Decide which waveform kind a file holds by the same fingerprint the
/// source's per-type `_check_metadata` overrides use: presence of digital
/// probe keys, then IQ keys, then a data-type fallback for an otherwise
/// empty metadata block, defaulting to analog.
pub fn classify(meta_data: &HashMap<String, MetaValue>, header_data_type: i32) -> WaveformKind {
    let has_probe_key = (0..8).any(|i| meta_data.contains_key(&format!("d{i}")));
    if has_probe_key {
        return WaveformKind::Digital;
    }
    const IQ_KEYS: [&str; 6] = [
        "IQ_centerFrequency",
        "IQ_fftLength",
        "IQ_rbw",
        "IQ_span",
        "IQ_windowType",
        "IQ_sampleRate",
    ];
    if IQ_KEYS.iter().any(|k| meta_data.contains_key(*k)) {
        return WaveformKind::Iq;
    }
    if meta_data.is_empty() && header_data_type == DataType::Digital as i32 {
        return WaveformKind::Digital;
    }
    WaveformKind::Analog
}

fn take_f64(map: &mut HashMap<String, MetaValue>, key: &str) -> Option<f64> {
    match map.remove(key) {
        Some(MetaValue::Double(v)) => Some(v),
        Some(MetaValue::Int(v)) => Some(v as f64),
        Some(MetaValue::UInt(v)) => Some(v as f64),
        _ => None,
    }
}

fn take_i32(map: &mut HashMap<String, MetaValue>, key: &str) -> Option<i32> {
    match map.remove(key) {
        Some(MetaValue::Int(v)) => Some(v),
        Some(MetaValue::UInt(v)) => Some(v as i32),
        Some(MetaValue::Double(v)) => Some(v as i32),
        _ => None,
    }
}

fn take_string(map: &mut HashMap<String, MetaValue>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(MetaValue::Bytes(bytes)) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        _ => None,
    }
}

fn insert_f64(map: &mut HashMap<String, MetaValue>, key: &str, value: f64) {
    map.insert(key.to_string(), MetaValue::Double(value));
}

fn insert_i32(map: &mut HashMap<String, MetaValue>, key: &str, value: i32) {
    map.insert(key.to_string(), MetaValue::Int(value));
}

fn element_type_to_curve_format(dtype: ElementType) -> Result<CurveFormatVer3> {
    use crate::error::WfmError;
    Ok(match dtype {
        ElementType::I16 => CurveFormatVer3::ExplicitInt16,
        ElementType::I32 => CurveFormatVer3::ExplicitInt32,
        ElementType::U32 => CurveFormatVer3::ExplicitUint32,
        ElementType::U64 => CurveFormatVer3::ExplicitUint64,
        ElementType::F32 => CurveFormatVer3::ExplicitFp32,
        ElementType::F64 => CurveFormatVer3::ExplicitFp64,
        ElementType::U8 => CurveFormatVer3::ExplicitUint8,
        ElementType::I8 => CurveFormatVer3::ExplicitInt8,
        ElementType::I64 | ElementType::U16 => {
            return Err(WfmError::ConversionError(format!(
                "{dtype:?} has no curve format"
            )))
        }
    })
}

fn set_explicit_dimensions(
    fmt: &mut WfmFormat,
    units: SiBaseUnit,
    scale: f64,
    offset: f64,
    size: u32,
    curve_format: CurveFormatVer3,
    storage_type: StorageType,
) {
    let label = crate::bytes::String20::new(units.as_str());
    let dim = ExplicitDimension {
        scale,
        offset,
        size,
        units: label,
        extent_min: 0.0,
        extent_max: 0.0,
        resolution: 0.0,
        reference_point: 0.0,
        format: curve_format as i32,
        storage_type: storage_type as i32,
        null_value: 0,
        over_range: 0,
        under_range: 0,
        high_range: 0,
        low_range: 0,
    };
    fmt.explicit_dimensions = Some(DimensionPair { first: dim, second: dim });

    let view = DimensionUserView {
        scale,
        units: label,
        offset,
        point_density: 1.0,
        horizontal_reference: 50.0,
        trigger_delay: 0.0,
    };
    fmt.explicit_user_view = Some(DimensionPair { first: view, second: view });
}

// --- analog ---------------------------------------------------------------

pub fn analog_from_format(fmt: &WfmFormat) -> (AnalogWaveform, AnalogWaveformMetaInfo) {
    let mut waveform = AnalogWaveform::default();
    waveform.set_y_axis_values(fmt.curve_buffer.clone());
    if let Some(dims) = &fmt.explicit_dimensions {
        waveform.y_axis_offset = dims.first.offset;
        waveform.y_axis_spacing = dims.first.scale;
        waveform.y_axis_units = SiBaseUnit::from_label(&dims.first.units.as_str());
    }

    let inverse = invert(&base_lookup());
    let mut remapped = WaveformMetaInfo::remap(&inverse, fmt.meta_data.clone(), false);
    let waveform_label = take_string(&mut remapped, "waveform_label");
    let info = AnalogWaveformMetaInfo {
        y_offset: take_f64(&mut remapped, "y_offset").unwrap_or(0.0),
        y_position: take_f64(&mut remapped, "y_position").unwrap_or(0.0),
        analog_thumbnail: take_string(&mut remapped, "analog_thumbnail"),
        clipping_initialized: take_i32(&mut remapped, "clipping_initialized").unwrap_or(0),
        interpreter_factor: take_i32(&mut remapped, "interpreter_factor"),
        real_data_start_index: take_i32(&mut remapped, "real_data_start_index"),
        base: WaveformMetaInfo { waveform_label, extended_metadata: remapped },
    };
    (waveform, info)
}

pub fn analog_to_format(
    waveform: &AnalogWaveform,
    meta: &AnalogWaveformMetaInfo,
    fmt: &mut WfmFormat,
) -> Result<()> {
    // The curve format supports every dtype a raw sample buffer can carry
    // (including fp32/fp64), so the buffer is written as-is rather than
    // forced through a re-digitize step.
    let buffer = waveform.y_axis_values.clone();
    let curve_format = element_type_to_curve_format(buffer.dtype)?;
    set_explicit_dimensions(
        fmt,
        waveform.y_axis_units,
        waveform.y_axis_spacing,
        waveform.y_axis_offset,
        buffer.len() as u32,
        curve_format,
        StorageType::ExplicitSample,
    );
    fmt.curve_buffer = buffer;

    let mut data = meta.base.extended_metadata.clone();
    if let Some(label) = &meta.base.waveform_label {
        data.insert("waveform_label".to_string(), MetaValue::Bytes(label.clone().into_bytes()));
    }
    insert_f64(&mut data, "y_offset", meta.y_offset);
    insert_f64(&mut data, "y_position", meta.y_position);
    if let Some(thumbnail) = &meta.analog_thumbnail {
        data.insert(
            "analog_thumbnail".to_string(),
            MetaValue::Bytes(thumbnail.clone().into_bytes()),
        );
    }
    insert_i32(&mut data, "clipping_initialized", meta.clipping_initialized);
    if let Some(v) = meta.interpreter_factor {
        insert_i32(&mut data, "interpreter_factor", v);
    }
    if let Some(v) = meta.real_data_start_index {
        insert_i32(&mut data, "real_data_start_index", v);
    }
    fmt.meta_data = WaveformMetaInfo::remap(&base_lookup(), data, false);
    Ok(())
}

// --- digital ---------------------------------------------------------------

/// Digital samples are stored on disk as signed char; `u8 as i8` is a
/// bit-preserving reinterpretation, not a saturating numeric cast.
fn signed_byte_to_probe_state(value: f64) -> f64 {
    ((value as i64) as i8 as u8) as f64
}

fn probe_state_to_signed_byte(value: f64) -> f64 {
    ((value as i64) as u8 as i8) as f64
}

pub fn digital_from_format(fmt: &WfmFormat) -> (DigitalWaveform, DigitalWaveformMetaInfo) {
    let mut waveform = DigitalWaveform::default();
    let values = fmt
        .curve_buffer
        .values
        .iter()
        .map(|&v| signed_byte_to_probe_state(v))
        .collect();
    waveform.set_y_axis_byte_values(SampleBuffer::new(ElementType::U8, values));
    if let Some(dims) = &fmt.explicit_dimensions {
        waveform.y_axis_units = SiBaseUnit::from_label(&dims.first.units.as_str());
    }

    let inverse = invert(&digital_lookup());
    let mut remapped = WaveformMetaInfo::remap(&inverse, fmt.meta_data.clone(), false);
    let waveform_label = take_string(&mut remapped, "waveform_label");
    let mut digital_probe_state: [Vec<u8>; 8] = Default::default();
    for (i, slot) in digital_probe_state.iter_mut().enumerate() {
        let key = format!("digital_probe_{i}_state");
        if let Some(MetaValue::Bytes(bytes)) = remapped.remove(&key) {
            *slot = bytes;
        }
    }
    let info = DigitalWaveformMetaInfo {
        base: WaveformMetaInfo { waveform_label, extended_metadata: remapped },
        digital_probe_state,
    };
    (waveform, info)
}

pub fn digital_to_format(waveform: &DigitalWaveform, meta: &DigitalWaveformMetaInfo, fmt: &mut WfmFormat) {
    let values = waveform
        .y_axis_byte_values
        .values
        .iter()
        .map(|&v| probe_state_to_signed_byte(v))
        .collect();
    let buffer = SampleBuffer::new(ElementType::I8, values);
    set_explicit_dimensions(
        fmt,
        waveform.y_axis_units,
        1.0,
        0.0,
        buffer.len() as u32,
        CurveFormatVer3::ExplicitInt8,
        StorageType::ExplicitSample,
    );
    fmt.curve_buffer = buffer;

    let mut data = meta.base.extended_metadata.clone();
    if let Some(label) = &meta.base.waveform_label {
        data.insert("waveform_label".to_string(), MetaValue::Bytes(label.clone().into_bytes()));
    }
    for (i, bytes) in meta.digital_probe_state.iter().enumerate() {
        if !bytes.is_empty() {
            data.insert(format!("digital_probe_{i}_state"), MetaValue::Bytes(bytes.clone()));
        }
    }
    fmt.meta_data = WaveformMetaInfo::remap(&digital_lookup(), data, false);
}

// --- iq ----------------------------------------------------------------

pub fn iq_from_format(fmt: &WfmFormat) -> (IqWaveform, IqWaveformMetaInfo) {
    let mut waveform = IqWaveform::default();
    waveform.set_interleaved_iq_axis_values(fmt.curve_buffer.clone());
    if let Some(dims) = &fmt.explicit_dimensions {
        waveform.iq_axis_offset = dims.first.offset;
        waveform.iq_axis_spacing = dims.first.scale;
        waveform.iq_axis_units = SiBaseUnit::from_label(&dims.first.units.as_str());
    }

    let inverse = invert(&iq_lookup());
    let mut remapped = WaveformMetaInfo::remap(&inverse, fmt.meta_data.clone(), false);
    let waveform_label = take_string(&mut remapped, "waveform_label");

    let iq_center_frequency = take_f64(&mut remapped, "iq_center_frequency").unwrap_or(0.0);
    let iq_fft_length = take_f64(&mut remapped, "iq_fft_length").unwrap_or(0.0);
    let iq_resolution_bandwidth = take_f64(&mut remapped, "iq_resolution_bandwidth").unwrap_or(0.0);
    let iq_span = take_f64(&mut remapped, "iq_span").unwrap_or(0.0);
    let iq_window_type = take_string(&mut remapped, "iq_window_type").and_then(|s| IqWindowType::from_str(&s).ok());
    take_f64(&mut remapped, "iq_sample_rate"); // recomputed below, not carried forward

    let analog_base = AnalogWaveformMetaInfo {
        y_offset: take_f64(&mut remapped, "y_offset").unwrap_or(0.0),
        y_position: take_f64(&mut remapped, "y_position").unwrap_or(0.0),
        analog_thumbnail: take_string(&mut remapped, "analog_thumbnail"),
        clipping_initialized: take_i32(&mut remapped, "clipping_initialized").unwrap_or(0),
        interpreter_factor: take_i32(&mut remapped, "interpreter_factor"),
        real_data_start_index: take_i32(&mut remapped, "real_data_start_index"),
        base: WaveformMetaInfo { waveform_label, extended_metadata: remapped },
    };

    let mut info = IqWaveformMetaInfo {
        base: analog_base,
        iq_center_frequency,
        iq_fft_length,
        iq_resolution_bandwidth,
        iq_span,
        iq_window_type,
        iq_sample_rate: 0.0,
    };
    info.recompute_sample_rate();
    (waveform, info)
}

pub fn iq_to_format(waveform: &IqWaveform, meta: &IqWaveformMetaInfo, fmt: &mut WfmFormat) -> Result<()> {
    let buffer = waveform.interleaved_iq_axis_values.clone();
    let curve_format = element_type_to_curve_format(buffer.dtype)?;
    set_explicit_dimensions(
        fmt,
        waveform.iq_axis_units,
        waveform.iq_axis_spacing,
        // the offset the waveform itself tracks, not its spacing
        waveform.iq_axis_offset,
        buffer.len() as u32,
        curve_format,
        StorageType::ExplicitMinMax,
    );
    fmt.curve_buffer = buffer;

    let mut data = meta.base.base.extended_metadata.clone();
    if let Some(label) = &meta.base.base.waveform_label {
        data.insert("waveform_label".to_string(), MetaValue::Bytes(label.clone().into_bytes()));
    }
    insert_f64(&mut data, "y_offset", meta.base.y_offset);
    insert_f64(&mut data, "y_position", meta.base.y_position);
    if let Some(thumbnail) = &meta.base.analog_thumbnail {
        data.insert(
            "analog_thumbnail".to_string(),
            MetaValue::Bytes(thumbnail.clone().into_bytes()),
        );
    }
    insert_i32(&mut data, "clipping_initialized", meta.base.clipping_initialized);
    if let Some(v) = meta.base.interpreter_factor {
        insert_i32(&mut data, "interpreter_factor", v);
    }
    if let Some(v) = meta.base.real_data_start_index {
        insert_i32(&mut data, "real_data_start_index", v);
    }
    insert_f64(&mut data, "iq_center_frequency", meta.iq_center_frequency);
    insert_f64(&mut data, "iq_fft_length", meta.iq_fft_length);
    insert_f64(&mut data, "iq_resolution_bandwidth", meta.iq_resolution_bandwidth);
    insert_f64(&mut data, "iq_span", meta.iq_span);
    if let Some(window) = meta.iq_window_type {
        data.insert(
            "iq_window_type".to_string(),
            MetaValue::Bytes(window.as_str().as_bytes().to_vec()),
        );
    }
    insert_f64(&mut data, "iq_sample_rate", meta.iq_sample_rate);
    fmt.meta_data = WaveformMetaInfo::remap(&iq_lookup(), data, false);
    Ok(())
}

// --- dispatch ---------------------------------------------------------------

/// Decode the waveform a parsed section layout describes, choosing the
/// kind by [`classify`].
pub fn waveform_from_format(fmt: &WfmFormat, header_data_type: i32) -> WfmWaveform {
    match classify(&fmt.meta_data, header_data_type) {
        WaveformKind::Digital => {
            let (w, m) = digital_from_format(fmt);
            WfmWaveform::Digital(w, m)
        }
        WaveformKind::Iq => {
            let (w, m) = iq_from_format(fmt);
            WfmWaveform::Iq(w, m)
        }
        WaveformKind::Analog => {
            let (w, m) = analog_from_format(fmt);
            WfmWaveform::Analog(w, m)
        }
    }
}

/// Bridge a waveform's vertical values and per-type metadata into a
/// section layout's curve buffer, explicit dimensions, and metadata map.
pub fn waveform_to_format(waveform: &WfmWaveform, fmt: &mut WfmFormat) -> Result<()> {
    match waveform {
        WfmWaveform::Analog(w, m) => analog_to_format(w, m, fmt),
        WfmWaveform::Digital(w, m) => {
            digital_to_format(w, m, fmt);
            Ok(())
        }
        WfmWaveform::Iq(w, m) => iq_to_format(w, m, fmt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_detects_digital_probe_keys() {
        let mut meta = HashMap::new();
        meta.insert("d3".to_string(), MetaValue::Bytes(vec![1]));
        assert_eq!(classify(&meta, DataType::Vector as i32), WaveformKind::Digital);
    }

    #[test]
    fn classify_detects_iq_keys() {
        let mut meta = HashMap::new();
        meta.insert("IQ_span".to_string(), MetaValue::Double(1.0));
        assert_eq!(classify(&meta, DataType::Vector as i32), WaveformKind::Iq);
    }

    #[test]
    fn classify_falls_back_to_digital_header_when_metadata_empty() {
        let meta = HashMap::new();
        assert_eq!(classify(&meta, DataType::Digital as i32), WaveformKind::Digital);
    }

    #[test]
    fn classify_defaults_to_analog() {
        let meta = HashMap::new();
        assert_eq!(classify(&meta, DataType::Vector as i32), WaveformKind::Analog);
    }

    #[test]
    fn digital_byte_round_trips_through_signed_char() {
        for value in [0.0, 127.0, 128.0, 200.0, 255.0] {
            let signed = probe_state_to_signed_byte(value);
            let back = signed_byte_to_probe_state(signed);
            assert_eq!(back, value);
        }
    }

    #[test]
    fn analog_bridge_round_trips_vertical_values() {
        let mut waveform = AnalogWaveform::default();
        waveform.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![10.0, -10.0, 0.0]));
        waveform.y_axis_spacing = 0.5;
        waveform.y_axis_offset = 1.0;
        let meta = AnalogWaveformMetaInfo { y_offset: 2.0, ..Default::default() };

        let mut fmt = WfmFormat::default();
        analog_to_format(&waveform, &meta, &mut fmt).unwrap();
        let (back, back_meta) = analog_from_format(&fmt);

        assert_eq!(back.y_axis_values.values, waveform.y_axis_values.values);
        assert_eq!(back.y_axis_spacing, 0.5);
        assert_eq!(back.y_axis_offset, 1.0);
        assert_eq!(back_meta.y_offset, 2.0);
    }
}
