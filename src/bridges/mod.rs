//! Thin, contract-level converters between the waveform model and two
//! foreign interchange formats. Both are deliberately lossy: only the
//! handful of header/metadata fields the source formats actually name are
//! carried across, matching the crate's "deep fidelity is out of scope"
//! boundary for these two collaborators.

pub mod csv;
pub mod mat;
