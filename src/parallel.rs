//! Batch read/write across many files at once.
//!
//! Grounded in `io_factory_methods.py`'s `read_files_in_parallel`/
//! `write_files_in_parallel`, which chunk a file list across a
//! `multiprocessing.Pool` and surface any worker's exception as a
//! `ChildProcessError` naming which process failed. Rayon's work-stealing
//! pool replaces the process pool and per-chunk manual indexing; each file
//! is still one independent unit of work, so a failure on one doesn't stop
//! the others, and is reported as a [`WorkerError`] naming its path.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::ProductProfile;
use crate::dispatch::{read_file, write_file};
use crate::error::WorkerError;
use crate::wfm::bridge::WfmWaveform;

/// Read every file in `paths` concurrently. Each file either succeeds or
/// contributes a [`WorkerError`] naming its own path; one bad file doesn't
/// abort the rest of the batch.
pub fn read_files_in_parallel(paths: &[impl AsRef<Path> + Sync]) -> Vec<Result<WfmWaveform, WorkerError>> {
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            read_file(path).map_err(|source| WorkerError {
                path: path.display().to_string(),
                source,
            })
        })
        .collect()
}

/// Write `waveforms[i]` to `paths[i]` concurrently, using `profile` for
/// every `.wfm` output. Panics if the two slices differ in length, matching
/// the source's `IndexError` on a mismatched batch.
pub fn write_files_in_parallel(
    paths: &[impl AsRef<Path> + Sync],
    waveforms: &[WfmWaveform],
    profile: &ProductProfile,
) -> Vec<Result<PathBuf, WorkerError>>
where
    WfmWaveform: Sync,
{
    assert_eq!(
        paths.len(),
        waveforms.len(),
        "the number of file paths must equal the number of waveforms to write"
    );
    paths
        .par_iter()
        .zip(waveforms.par_iter())
        .map(|(path, waveform)| {
            let path = path.as_ref();
            write_file(path, waveform, profile)
                .map(|()| path.to_path_buf())
                .map_err(|source| WorkerError {
                    path: path.display().to_string(),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{ElementType, SampleBuffer};
    use crate::waveform::analog::{AnalogWaveform, AnalogWaveformMetaInfo};

    fn sample_waveform(value: f64) -> WfmWaveform {
        let mut w = AnalogWaveform::default();
        w.set_y_axis_values(SampleBuffer::new(ElementType::I16, vec![value]));
        WfmWaveform::Analog(w, AnalogWaveformMetaInfo::default())
    }

    #[test]
    fn writes_and_reads_back_a_batch() {
        let dir = std::env::temp_dir().join(format!("wfm-parallel-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let paths: Vec<PathBuf> = (0..4).map(|i| dir.join(format!("trace-{i}.wfm"))).collect();
        let waveforms: Vec<WfmWaveform> = (0..4).map(|i| sample_waveform(i as f64)).collect();

        let write_results = write_files_in_parallel(&paths, &waveforms, &ProductProfile::tekscope());
        assert!(write_results.iter().all(Result::is_ok));

        let read_results = read_files_in_parallel(&paths);
        assert_eq!(read_results.len(), 4);
        assert!(read_results.iter().all(Result::is_ok));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[should_panic(expected = "must equal")]
    fn mismatched_batch_lengths_panics() {
        let paths: Vec<PathBuf> = vec![PathBuf::from("a.wfm")];
        let waveforms = vec![];
        let _ = write_files_in_parallel(&paths, &waveforms, &ProductProfile::tekscope());
    }
}
