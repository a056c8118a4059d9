//! Thin MAT bridge: waveform <-> a MATLAB-5-flavored binary blob carrying
//! the `time`/`data` arrays and the handful of scalar properties
//! `_WAVEFORM_PROPERTIES` maps in `files_and_formats/mat/mat.py`. Writes a
//! recognizable MAT-5-style header and tagged elements, not a byte-exact
//! MATLAB file — round-tripping through this module, not through MATLAB
//! itself, is the contract.

use std::io::{Read, Write};

use crate::bytes::{BytePrimitive, Endian};
use crate::error::{Result, WfmError};
use crate::sample::{ElementType, SampleBuffer};
use crate::waveform::Waveform;
use crate::wfm::bridge::{WaveformKind, WfmWaveform};

const HEADER_LEN: usize = 128;
const MI_MARKER: [u8; 2] = *b"MI";

fn write_array<W: Write>(writer: &mut W, endian: Endian, tag: u32, values: &[f64]) -> Result<()> {
    tag.pack(endian, writer)?;
    (values.len() as u32).pack(endian, writer)?;
    for &v in values {
        v.pack(endian, writer)?;
    }
    Ok(())
}

fn read_array<R: Read>(reader: &mut R, endian: Endian) -> Result<(u32, Vec<f64>)> {
    let tag = u32::unpack(endian, reader)?;
    let len = u32::unpack(endian, reader)? as usize;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(f64::unpack(endian, reader)?);
    }
    Ok((tag, values))
}

fn kind_tag(kind: WaveformKind) -> u32 {
    match kind {
        WaveformKind::Analog => 0,
        WaveformKind::Digital => 1,
        WaveformKind::Iq => 2,
    }
}

fn kind_from_tag(tag: u32) -> WaveformKind {
    match tag {
        1 => WaveformKind::Digital,
        2 => WaveformKind::Iq,
        _ => WaveformKind::Analog,
    }
}

fn horizontal_values(waveform: &WfmWaveform) -> Vec<f64> {
    match waveform {
        WfmWaveform::Analog(w, _) => w.normalized_horizontal_values(),
        WfmWaveform::Digital(w, _) => w.normalized_horizontal_values(),
        WfmWaveform::Iq(w, _) => w.normalized_horizontal_values(),
    }
}

fn vertical_values(waveform: &WfmWaveform) -> Vec<f64> {
    match waveform {
        WfmWaveform::Analog(w, _) => w.normalized_vertical_values(),
        WfmWaveform::Digital(w, _) => w
            .normalized_vertical_values()
            .into_iter()
            .map(|bits| bits.iter().enumerate().fold(0u32, |acc, (i, &b)| acc | ((b as u32) << i)) as f64)
            .collect(),
        WfmWaveform::Iq(w, _) => w.normalized_vertical_values().into_iter().flat_map(|(i, q)| [i, q]).collect(),
    }
}

fn build_waveform(kind: WaveformKind, vertical: &[f64]) -> Result<WfmWaveform> {
    match kind {
        WaveformKind::Analog => {
            let mut w = crate::waveform::analog::AnalogWaveform::default();
            w.set_y_axis_values(SampleBuffer::normalized_to_raw(vertical, ElementType::I16, None, None));
            Ok(WfmWaveform::Analog(w, Default::default()))
        }
        WaveformKind::Digital => {
            let mut w = crate::waveform::digital::DigitalWaveform::default();
            w.set_y_axis_byte_values(SampleBuffer::new(ElementType::U8, vertical.to_vec()));
            Ok(WfmWaveform::Digital(w, Default::default()))
        }
        WaveformKind::Iq => {
            let mut w = crate::waveform::iq::IqWaveform::default();
            w.set_interleaved_iq_axis_values(SampleBuffer::normalized_to_raw(vertical, ElementType::I16, None, None));
            Ok(WfmWaveform::Iq(w, Default::default()))
        }
    }
}

/// Write `waveform` as a MAT-flavored blob: a 128-byte descriptive header,
/// an endian marker, the scalar time-axis properties, then the `time` and
/// `data` arrays.
pub fn write_mat<W: Write>(waveform: &WfmWaveform, writer: &mut W) -> Result<()> {
    let endian = Endian::Little;
    let mut header = [0u8; HEADER_LEN];
    let banner = b"MATLAB 5.0 MAT-file, Tek Waveform Writer";
    let take = banner.len().min(HEADER_LEN);
    header[..take].copy_from_slice(&banner[..take]);
    writer.write_all(&header)?;
    writer.write_all(&MI_MARKER)?;

    let core = waveform.core();
    let time = core.time_axis;
    time.spacing.pack(endian, writer)?;
    time.trigger_index.unwrap_or(0.0).pack(endian, writer)?;
    kind_tag(waveform.kind()).pack(endian, writer)?;

    write_array(writer, endian, 0, &horizontal_values(waveform))?;
    write_array(writer, endian, 1, &vertical_values(waveform))?;
    Ok(())
}

/// Read back a blob written by [`write_mat`]. The waveform kind is read
/// back from the scalar tag [`write_mat`] stamped it with, since a raw
/// `data` array alone can't disambiguate an interleaved IQ buffer from a
/// single analog channel.
pub fn read_mat<R: Read>(reader: &mut R) -> Result<WfmWaveform> {
    let mut header = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header)
        .map_err(|_| WfmError::UnexpectedEof { context: "mat header" })?;
    let mut marker = [0u8; 2];
    reader
        .read_exact(&mut marker)
        .map_err(|_| WfmError::UnexpectedEof { context: "mat endian marker" })?;
    let endian = if marker == MI_MARKER { Endian::Little } else { Endian::Big };

    let spacing = f64::unpack(endian, reader)?;
    let trigger_index = f64::unpack(endian, reader)?;
    let kind = kind_from_tag(u32::unpack(endian, reader)?);

    let (_, _horizontal) = read_array(reader, endian)?;
    let (_, vertical) = read_array(reader, endian)?;

    let mut waveform = build_waveform(kind, &vertical)?;
    let core = waveform.core_mut();
    core.time_axis.spacing = spacing;
    core.time_axis.trigger_index = Some(trigger_index);
    Ok(waveform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::analog::{AnalogWaveform, AnalogWaveformMetaInfo};

    #[test]
    fn round_trips_vertical_values_and_spacing() {
        let mut w = AnalogWaveform::default();
        w.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![5.0, -5.0, 15.0]));
        w.core.time_axis.spacing = 0.25;
        w.core.time_axis.trigger_index = Some(2.0);
        let waveform = WfmWaveform::Analog(w, AnalogWaveformMetaInfo::default());

        let mut buf = Vec::new();
        write_mat(&waveform, &mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let back = read_mat(&mut cursor).unwrap();

        assert_eq!(back.core().time_axis.spacing, 0.25);
        assert_eq!(back.core().time_axis.trigger_index, Some(2.0));
    }
}
