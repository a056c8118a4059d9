//! Thin CSV bridge: waveform <-> a flat, human-readable time/value text
//! table with a small header. Grounded in `files_and_formats/csv/csv.py`'s
//! `CSVFile`; a contract-level converter, not a lossless round trip —
//! extended per-type metadata that doesn't map to a header row is dropped.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::Result;
use crate::sample::{ElementType, SampleBuffer};
use crate::waveform::{MetaValue, Waveform, WaveformMetaInfo};
use crate::wfm::bridge::{WaveformKind, WfmWaveform};
use crate::wfm::enums::SiBaseUnit;

fn header_lookup() -> HashMap<&'static str, &'static str> {
    [
        ("trigger_index", "Zero Index"),
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

fn waveform_label(waveform: &WfmWaveform) -> Option<&String> {
    match waveform {
        WfmWaveform::Analog(_, m) => m.base.waveform_label.as_ref(),
        WfmWaveform::Digital(_, m) => m.base.waveform_label.as_ref(),
        WfmWaveform::Iq(_, m) => m.base.base.waveform_label.as_ref(),
    }
}

fn kind_label(kind: WaveformKind) -> &'static str {
    match kind {
        WaveformKind::Analog => "AnalogWaveform",
        WaveformKind::Digital => "DigitalWaveform",
        WaveformKind::Iq => "IQWaveform",
    }
}

fn kind_from_label(label: &str) -> WaveformKind {
    match label {
        "DigitalWaveform" => WaveformKind::Digital,
        "IQWaveform" => WaveformKind::Iq,
        _ => WaveformKind::Analog,
    }
}

fn format_meta(value: &MetaValue) -> String {
    match value {
        MetaValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        MetaValue::Int(v) => v.to_string(),
        MetaValue::Double(v) => v.to_string(),
        MetaValue::UInt(v) => v.to_string(),
    }
}

fn extended_metadata(waveform: &WfmWaveform) -> HashMap<String, MetaValue> {
    match waveform {
        WfmWaveform::Analog(_, m) => m.base.extended_metadata.clone(),
        WfmWaveform::Digital(_, m) => m.base.extended_metadata.clone(),
        WfmWaveform::Iq(_, m) => m.base.base.extended_metadata.clone(),
    }
}

/// One row per sample, one column per vertical channel (analog: 1,
/// digital: 8 probe bits, IQ: [i, q]).
fn vertical_rows(waveform: &WfmWaveform) -> Vec<Vec<f64>> {
    match waveform {
        WfmWaveform::Analog(w, _) => w.normalized_vertical_values().into_iter().map(|v| vec![v]).collect(),
        WfmWaveform::Digital(w, _) => w
            .normalized_vertical_values()
            .into_iter()
            .map(|bits| bits.into_iter().map(|b| b as f64).collect())
            .collect(),
        WfmWaveform::Iq(w, _) => w.normalized_vertical_values().into_iter().map(|(i, q)| vec![i, q]).collect(),
    }
}

fn channel_labels(kind: WaveformKind) -> &'static str {
    match kind {
        WaveformKind::Analog => "CH1",
        WaveformKind::Digital => "D0,D1,D2,D3,D4,D5,D6,D7",
        WaveformKind::Iq => "I,Q",
    }
}

/// Serialize a waveform as a csv text table: a handful of header rows
/// mirroring the source's generic header, then one row per sample of
/// `time,value[,value...]`.
pub fn write_csv(waveform: &WfmWaveform) -> String {
    let kind = waveform.kind();
    let core = waveform.core();
    let time = core.time_axis;
    let rows = vertical_rows(waveform);

    let mut out = String::new();
    let _ = writeln!(out, "Model,MSO54");
    let _ = writeln!(out, "Waveform Type,{}", kind_label(kind));
    let _ = writeln!(out, "Zero Index,{}", time.trigger_index.unwrap_or(0.0));
    let _ = writeln!(out, "Sample Interval,{}", time.spacing);
    let _ = writeln!(out, "Record Length,{}", rows.len());
    let _ = writeln!(out, "Horizontal Units,{}", time.units.as_str());
    if let Some(label) = waveform_label(waveform) {
        let _ = writeln!(out, "Label,{label}");
    }

    let remapped = WaveformMetaInfo::remap(&header_lookup(), extended_metadata(waveform), true);
    for (key, value) in remapped {
        let _ = writeln!(out, "{key},{}", format_meta(&value));
    }

    out.push_str("Labels,\n");
    let _ = writeln!(out, "TIME,{}", channel_labels(kind));

    let horizontal = match waveform {
        WfmWaveform::Analog(w, _) => w.normalized_horizontal_values(),
        WfmWaveform::Digital(w, _) => w.normalized_horizontal_values(),
        WfmWaveform::Iq(w, _) => w.normalized_horizontal_values(),
    };
    for (t, row) in horizontal.iter().zip(rows.iter()) {
        let _ = write!(out, "{t}");
        for v in row {
            let _ = write!(out, ",{v}");
        }
        out.push('\n');
    }
    out
}

/// Parse text written by [`write_csv`] back into a waveform. The waveform
/// kind is read back from the `Waveform Type` header row rather than
/// supplied by the caller, the same header [`write_csv`] stamps it with.
pub fn read_csv(text: &str) -> Result<WfmWaveform> {
    let mut header: HashMap<String, String> = HashMap::new();
    let mut rows = Vec::new();
    let mut in_data = false;

    for line in text.lines() {
        if in_data {
            if !line.is_empty() {
                let mut parts = line.split(',');
                parts.next(); // the time column; the horizontal axis is rebuilt from spacing/trigger
                rows.push(parts.map(|p| p.parse().unwrap_or(0.0)).collect::<Vec<f64>>());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("TIME,") {
            let _ = rest;
            in_data = true;
            continue;
        }
        if let Some((key, value)) = line.split_once(',') {
            header.insert(key.to_string(), value.to_string());
        }
    }

    let spacing: f64 = header.get("Sample Interval").and_then(|v| v.parse().ok()).unwrap_or(1.0);
    let trigger_index: f64 = header.get("Zero Index").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let units = header
        .get("Horizontal Units")
        .map(|v| SiBaseUnit::from_label(v))
        .unwrap_or(SiBaseUnit::Seconds);
    let kind = header.get("Waveform Type").map(|v| kind_from_label(v)).unwrap_or(WaveformKind::Analog);
    let label = header.get("Label").cloned();

    let mut waveform = build_waveform(kind, rows, label)?;
    let core = waveform.core_mut();
    core.time_axis.spacing = spacing;
    core.time_axis.trigger_index = Some(trigger_index);
    core.time_axis.units = units;
    Ok(waveform)
}

fn build_waveform(kind: WaveformKind, rows: Vec<Vec<f64>>, label: Option<String>) -> Result<WfmWaveform> {
    match kind {
        WaveformKind::Analog => {
            let values: Vec<f64> = rows.iter().map(|r| r.first().copied().unwrap_or(0.0)).collect();
            let mut w = crate::waveform::analog::AnalogWaveform::default();
            w.set_y_axis_values(SampleBuffer::normalized_to_raw(&values, ElementType::I16, None, None));
            let mut meta = crate::waveform::analog::AnalogWaveformMetaInfo::default();
            meta.base.waveform_label = label;
            Ok(WfmWaveform::Analog(w, meta))
        }
        WaveformKind::Digital => {
            let mut w = crate::waveform::digital::DigitalWaveform::default();
            let bytes: Vec<f64> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .take(8)
                        .fold(0u32, |acc, (i, &bit)| if bit != 0.0 { acc | (1 << i) } else { acc }) as f64
                })
                .collect();
            w.set_y_axis_byte_values(SampleBuffer::new(ElementType::U8, bytes));
            let mut meta = crate::waveform::digital::DigitalWaveformMetaInfo::default();
            meta.base.waveform_label = label;
            Ok(WfmWaveform::Digital(w, meta))
        }
        WaveformKind::Iq => {
            let mut w = crate::waveform::iq::IqWaveform::default();
            let interleaved: Vec<f64> = rows
                .iter()
                .flat_map(|row| [row.first().copied().unwrap_or(0.0), row.get(1).copied().unwrap_or(0.0)])
                .collect();
            w.set_interleaved_iq_axis_values(SampleBuffer::normalized_to_raw(&interleaved, ElementType::I16, None, None));
            let mut meta = crate::waveform::iq::IqWaveformMetaInfo::default();
            meta.base.base.waveform_label = label;
            Ok(WfmWaveform::Iq(w, meta))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::analog::{AnalogWaveform, AnalogWaveformMetaInfo};

    #[test]
    fn round_trips_record_length_and_spacing_through_text() {
        let mut w = AnalogWaveform::default();
        w.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![10.0, 20.0, -10.0]));
        w.core.time_axis.spacing = 2.0;
        w.core.time_axis.trigger_index = Some(1.0);
        let waveform = WfmWaveform::Analog(w, AnalogWaveformMetaInfo::default());

        let text = write_csv(&waveform);
        assert!(text.contains("Record Length,3"));

        let back = read_csv(&text).unwrap();
        assert_eq!(back.core().time_axis.spacing, 2.0);
        assert_eq!(back.core().time_axis.trigger_index, Some(1.0));
    }
}
