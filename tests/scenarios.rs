//! End-to-end scenarios exercised through the public read/write API only,
//! matching how a consuming application would use the crate.

use tekwfm::config::ProductProfile;
use tekwfm::sample::{ElementType, SampleBuffer};
use tekwfm::waveform::analog::{AnalogWaveform, AnalogWaveformMetaInfo};
use tekwfm::waveform::digital::DigitalWaveform;
use tekwfm::waveform::iq::IqWaveform;
use tekwfm::waveform::{MetaValue, Waveform};
use tekwfm::wfm::bridge::WfmWaveform;
use tekwfm::wfm::reader::read_wfm;
use tekwfm::wfm::writer::write_wfm;

fn roundtrip(waveform: &WfmWaveform) -> WfmWaveform {
    let mut buf = Vec::new();
    write_wfm(waveform, &ProductProfile::tekscope(), &mut buf).unwrap();
    let mut cursor = std::io::Cursor::new(buf);
    let (back, _, _) = read_wfm(&mut cursor).unwrap();
    back
}

#[test]
fn s1_analog_i16_round_trip_preserves_spacing_and_zero_offset() {
    let mut w = AnalogWaveform::default();
    w.set_y_axis_values(SampleBuffer::new(
        ElementType::I16,
        vec![10.0, 11.0, 12.0, 32222.0, 32223.0, 32224.0],
    ));
    w.y_axis_spacing = 1.0 / (i16::MAX as f64);
    w.core.time_axis.trigger_index = Some(3.0);
    let waveform = WfmWaveform::Analog(w, AnalogWaveformMetaInfo::default());

    let back = roundtrip(&waveform);
    match back {
        WfmWaveform::Analog(w, _) => {
            assert_eq!(w.y_axis_values.values, vec![10.0, 11.0, 12.0, 32222.0, 32223.0, 32224.0]);
            assert_eq!(w.y_axis_spacing, 1.0 / 32767.0);
            assert_eq!(w.y_axis_offset, 0.0);
        }
        _ => panic!("expected an analog waveform"),
    }
}

#[test]
fn s2_waveform_label_and_y_offset_round_trip_through_tekmeta() {
    let mut w = AnalogWaveform::default();
    w.set_y_axis_values(SampleBuffer::new(
        ElementType::I16,
        vec![10.0, 11.0, 12.0, 32222.0, 32223.0, 32224.0],
    ));
    w.y_axis_spacing = 1.0 / (i16::MAX as f64);
    w.core.time_axis.trigger_index = Some(3.0);
    let meta = AnalogWaveformMetaInfo {
        y_offset: 0.25,
        base: tekwfm::waveform::WaveformMetaInfo {
            waveform_label: Some("Signal A".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let waveform = WfmWaveform::Analog(w, meta);

    let back = roundtrip(&waveform);
    match back {
        WfmWaveform::Analog(_, meta) => {
            assert_eq!(meta.base.waveform_label.as_deref(), Some("Signal A"));
            assert_eq!(meta.y_offset, 0.25);
            assert!(meta.base.extended_metadata.is_empty());
        }
        _ => panic!("expected an analog waveform"),
    }
}

#[test]
fn s3_digital_probe_bits_unpack_in_bit0_first_order() {
    let scale = (i8::MAX as f64) / 3.0;
    let mut w = DigitalWaveform::default();
    w.set_y_axis_byte_values(SampleBuffer::new(
        ElementType::I8,
        vec![-1.0 * scale, 0.0 * scale, 1.0 * scale, 2.0 * scale],
    ));

    let expected = vec![
        vec![1, 1, 0, 1, 0, 1, 1, 0],
        vec![0, 0, 0, 0, 0, 0, 0, 0],
        vec![0, 0, 1, 0, 1, 0, 1, 0],
        vec![0, 1, 0, 1, 0, 1, 0, 0],
    ];
    assert_eq!(w.normalized_vertical_values(), expected);
    assert_eq!(w.get_nth_bitstream(0), vec![1, 0, 0, 0]);
}

#[test]
fn s4_iq_horizontal_and_vertical_axes_match_expected_values() {
    let max = i16::MAX as f64;
    let i_values: Vec<f64> = [0.0, 1.0, 2.0, 3.0].iter().map(|v| v * max / 3.0).collect();
    let q_values: Vec<f64> = [-3.0, -2.0, -1.0, 0.0].iter().map(|v| v * max / 3.0).collect();

    let mut w = IqWaveform::default();
    w.set_i_axis_values(&i_values);
    w.set_q_axis_values(&q_values);
    w.set_iq_axis_extent_magnitude(0.1);
    w.iq_axis_offset = 0.1;
    w.core.time_axis.spacing = w.iq_axis_spacing;
    w.core.time_axis.trigger_index = Some(2.5);

    let spacing = w.iq_axis_spacing;
    let horizontal = w.normalized_horizontal_values();
    let expected_horizontal: Vec<f64> = [-2.5, -1.5, -0.5, 0.5].iter().map(|v| v * spacing).collect();
    for (a, b) in horizontal.iter().zip(expected_horizontal.iter()) {
        assert!((a - b).abs() < 1e-9);
    }

    let vertical = w.normalized_vertical_values();
    let rounded: Vec<(f64, f64)> = vertical
        .iter()
        .map(|(i, q)| ((i * 1000.0).round() / 1000.0, (q * 1000.0).round() / 1000.0))
        .collect();
    assert_eq!(
        rounded,
        vec![
            (0.100, 0.050),
            (0.117, 0.067),
            (0.133, 0.083),
            (0.150, 0.100),
        ]
    );
}

#[test]
fn s5_parallel_round_trip_of_many_analog_waveforms() {
    use tekwfm::parallel::{read_files_in_parallel, write_files_in_parallel};

    let dir = std::env::temp_dir().join(format!("tekwfm-s5-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let count = 1000;
    let waveforms: Vec<WfmWaveform> = (0..count)
        .map(|i| {
            let mut w = AnalogWaveform::default();
            w.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![i as f64, -(i as f64)]));
            WfmWaveform::Analog(w, AnalogWaveformMetaInfo::default())
        })
        .collect();
    let paths: Vec<_> = (0..count).map(|i| dir.join(format!("trace-{i}.wfm"))).collect();

    let write_results = write_files_in_parallel(&paths, &waveforms, &ProductProfile::tekscope());
    assert!(write_results.iter().all(Result::is_ok));

    let read_results = read_files_in_parallel(&paths);
    assert_eq!(read_results.len(), count);
    for (i, result) in read_results.into_iter().enumerate() {
        match result.unwrap() {
            WfmWaveform::Analog(w, _) => {
                assert_eq!(w.y_axis_values.values, vec![i as f64, -(i as f64)]);
            }
            _ => panic!("expected an analog waveform"),
        }
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn s6_csv_round_trip_preserves_values_up_to_proportionality_but_drops_extended_metadata() {
    use tekwfm::bridges::csv::{read_csv, write_csv};

    let mut w = AnalogWaveform::default();
    w.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![100.0, -200.0, 300.0]));
    w.y_axis_spacing = 0.5;
    let mut meta = AnalogWaveformMetaInfo::default();
    meta.base.set_custom_metadata("custom_note", MetaValue::Int(7));
    let waveform = WfmWaveform::Analog(w, meta);

    let text = write_csv(&waveform);
    let back = read_csv(&text).unwrap();

    match (&waveform, &back) {
        (WfmWaveform::Analog(original, _), WfmWaveform::Analog(decoded, decoded_meta)) => {
            let a = original.normalized_vertical_values();
            let b = decoded.normalized_vertical_values();
            // Dot-product identity: b is a scalar multiple of a (both pass
            // through the same samples, just re-digitized through text).
            let dot_ab: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
            let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
            let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((dot_ab / (norm_a * norm_b) - 1.0).abs() < 1e-6);
            assert!(decoded_meta.base.extended_metadata.is_empty());
        }
        _ => panic!("expected analog waveforms on both sides"),
    }
}
