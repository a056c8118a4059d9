//! Top-level `.wfm` encode: bridge a waveform's vertical axis into a
//! section layout, derive the shared horizontal (time) axis and header
//! from the waveform and a [`ProductProfile`], then serialize.
//!
//! Grounded in `files_and_formats/wfm/wfm.py`'s `WFMFile.write_datum`.

use std::io::Write;

use crate::bytes::String20;
use crate::config::ProductProfile;
use crate::error::Result;

use super::bridge::{waveform_to_format, WaveformKind, WfmWaveform};
use super::enums::{BaseType, DataType, SweepType, WaveformType};
use super::format::{DimensionPair, WfmFormat};
use super::records::{TimeBaseInformation, WaveformHeader};

fn data_type_for_kind(kind: WaveformKind) -> DataType {
    match kind {
        WaveformKind::Digital => DataType::Digital,
        WaveformKind::Analog | WaveformKind::Iq => DataType::Vector,
    }
}

/// Encode `waveform` as a complete `.wfm` file, using `profile` for the
/// endian, version, and header defaults a real instrument would write.
pub fn write_wfm<W: Write>(waveform: &WfmWaveform, profile: &ProductProfile, writer: &mut W) -> Result<()> {
    let mut format = WfmFormat::default();
    waveform_to_format(waveform, &mut format)?;

    let core = waveform.core();
    let time = core.time_axis;
    let trigger_index = time.trigger_index.unwrap_or(format.curve_buffer.len() as f64 / 2.0);
    let implicit_offset = -trigger_index * time.spacing;

    let dim = super::records::ImplicitDimension {
        scale: time.spacing,
        offset: implicit_offset,
        size: format.curve_buffer.len() as u32,
        units: String20::new(time.units.as_str()),
        extent_min: 0.0,
        extent_max: 0.0,
        resolution: 0.0,
        reference_point: 0.0,
        spacing: 0,
    };
    format.implicit_dimensions = Some(DimensionPair { first: dim, second: dim });
    let view = super::format::DimensionUserView {
        scale: time.spacing,
        units: String20::new(time.units.as_str()),
        offset: implicit_offset,
        point_density: 1.0,
        horizontal_reference: 50.0,
        trigger_delay: 0.0,
    };
    format.implicit_user_view = Some(DimensionPair { first: view, second: view });

    let requested = format.update_specs.len() as u32;
    format.header = Some(WaveformHeader {
        waveform_type: WaveformType::Single as i32,
        wfm_count: 1,
        acquisition_counter: 0,
        transaction_stamp: 0,
        slot_id: profile.slot_id,
        is_static: 0,
        update_spec_cnt: format.update_specs.len() as u32 + 1,
        imp_dim_ref_cnt: 1,
        exp_dim_ref_cnt: 1,
        data_type: data_type_for_kind(waveform.kind()) as i32,
        gen_purpose_counter: profile.gen_purpose_default as u64,
        accumulate_wfm_cnt: 1,
        target_accumulation_cnt: 1,
        curve_ref_cnt: 1,
        num_requested_fast_frames: requested,
        num_acquired_fast_frames: format.update_specs.len() as u32,
    });
    format.time_info = Some(DimensionPair {
        first: TimeBaseInformation {
            real_point_spacing: 1,
            sweep: SweepType::Sample as i32,
            type_of_base: BaseType::Time as i32,
        },
        second: TimeBaseInformation {
            real_point_spacing: 1,
            sweep: SweepType::Sample as i32,
            type_of_base: BaseType::Time as i32,
        },
    });

    format.write(profile.byte_order, profile.version, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{ElementType, SampleBuffer};
    use crate::waveform::analog::{AnalogWaveform, AnalogWaveformMetaInfo};

    #[test]
    fn write_produces_endian_and_version_markers() {
        let mut waveform = AnalogWaveform::default();
        waveform.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![1.0, -1.0]));
        let wfm = WfmWaveform::Analog(waveform, AnalogWaveformMetaInfo::default());

        let mut buf = Vec::new();
        write_wfm(&wfm, &ProductProfile::tekscope(), &mut buf).unwrap();

        assert_eq!(&buf[0..2], &[0x0f, 0x0f]);
        assert_eq!(&buf[2..10], b":WFM#003");
    }
}
