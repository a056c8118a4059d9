//! The fixed-layout records that make up a `.wfm` file, grounded field for
//! field in `wfm_data_classes.py`. Field order is the on-disk order — do
//! not reorder without updating the byte layout in lockstep.

use crate::bytes::{String20, String32};
use crate::record::define_record;

define_record! {
    /// File-level metadata that precedes the waveform header.
    WaveformStaticFileInfo {
        digits_in_byte_count: u8,
        bytes_till_eof: u32,
        bytes_per_point: u8,
        byte_offset: i32,
        horizontal_zoom_scale_factor: i32,
        horizontal_zoom_position: f32,
        vertical_zoom_scale_factor: f64,
        vertical_zoom_position: f32,
        waveform_label: String32,
        number_of_frames: u32,
        header_size: u16,
    }
}

define_record! {
    /// Acquisition bookkeeping and dimension/curve reference counts.
    WaveformHeader {
        waveform_type: i32,
        wfm_count: u32,
        acquisition_counter: u64,
        transaction_stamp: u64,
        slot_id: i32,
        is_static: i32,
        update_spec_cnt: u32,
        imp_dim_ref_cnt: u32,
        exp_dim_ref_cnt: u32,
        data_type: i32,
        gen_purpose_counter: u64,
        accumulate_wfm_cnt: u32,
        target_accumulation_cnt: u32,
        curve_ref_cnt: u32,
        num_requested_fast_frames: u32,
        num_acquired_fast_frames: u32,
    }
}

define_record! {
    /// Present only when `version != VersionNumber::One`.
    PixMap {
        pix_map_displ_format: i32,
        pix_map_max_value: u64,
    }
}

define_record! {
    /// The waveform's value axis (typically voltage).
    ExplicitDimension {
        scale: f64,
        offset: f64,
        size: u32,
        units: String20,
        extent_min: f64,
        extent_max: f64,
        resolution: f64,
        reference_point: f64,
        format: i32,
        storage_type: i32,
        null_value: i32,
        over_range: i32,
        under_range: i32,
        high_range: i32,
        low_range: i32,
    }
}

define_record! {
    /// The waveform's sample axis (typically time).
    ImplicitDimension {
        scale: f64,
        offset: f64,
        size: u32,
        units: String20,
        extent_min: f64,
        extent_max: f64,
        resolution: f64,
        reference_point: f64,
        spacing: u32,
    }
}

// The dimension/user-view pairing's `point_density` field widens from a
// `u32` to an `f64` in version-three files, so its record is defined by
// hand in `wfm::format::DimensionUserView` instead of through
// `define_record!`, which assumes a fixed layout per version.

define_record! {
    TimeBaseInformation {
        real_point_spacing: u32,
        sweep: i32,
        type_of_base: i32,
    }
}

define_record! {
    UpdateSpecifications {
        real_point_offset: u32,
        trigger_time_offset: f64,
        fractional_second: f64,
        gmt_second: i32,
    }
}

define_record! {
    CurveInformation {
        state_flags: u32,
        check_sum_type: i32,
        check_sum: i16,
        precharge_start_offset: u32,
        data_start_offset: u32,
        postcharge_start_offset: u32,
        postcharge_stop_offset: u32,
        end_of_curve_buffer_offset: u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::Endian;
    use crate::record::Record;

    #[test]
    fn waveform_header_round_trips() {
        let header = WaveformHeader {
            waveform_type: 0,
            wfm_count: 1,
            acquisition_counter: 42,
            transaction_stamp: 0,
            slot_id: 5,
            is_static: 0,
            update_spec_cnt: 1,
            imp_dim_ref_cnt: 1,
            exp_dim_ref_cnt: 1,
            data_type: 2,
            gen_purpose_counter: 0,
            accumulate_wfm_cnt: 0,
            target_accumulation_cnt: 0,
            curve_ref_cnt: 1,
            num_requested_fast_frames: 0,
            num_acquired_fast_frames: 0,
        };
        let mut buf = Vec::new();
        header.pack(Endian::Big, &mut buf).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let back = WaveformHeader::unpack(Endian::Big, &mut cursor).unwrap();
        assert_eq!(header, back);
    }
}
