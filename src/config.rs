//! Write-side product profile: which endian and version a writer targets.
//!
//! `original_source/helpers/instrument_series.py` threads a single
//! `InstrumentSeriesDataStyle` through every real instrument series it
//! enumerates (`TEKSCOPE` and all `MSO*` aliases resolve to the same
//! style: big-endian, version three, five data slots). We keep that single
//! default profile rather than modeling a whole instrument database.

use crate::wfm::enums::{ByteOrderFormat, VersionNumber};

/// The write-time configuration a [`crate::wfm::writer`] pulls endian,
/// version, and a couple of header defaults from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductProfile {
    pub byte_order: ByteOrderFormat,
    pub version: VersionNumber,
    pub slot_id: i32,
    pub gen_purpose_default: i64,
}

impl ProductProfile {
    /// The profile shared by every real Tektronix series in the source
    /// (`TEKSCOPE`, `MSO64`, `MSO64B`, `MSO54`, `MSO54B`, `MSO44`, `MSO44B`,
    /// `MSO24`): big-endian on disk, version three records.
    pub fn tekscope() -> Self {
        Self {
            byte_order: ByteOrderFormat::Ppc,
            version: VersionNumber::Three,
            slot_id: 5,
            gen_purpose_default: 0,
        }
    }

    pub fn custom(
        byte_order: ByteOrderFormat,
        version: VersionNumber,
        slot_id: i32,
        gen_purpose_default: i64,
    ) -> Self {
        Self {
            byte_order,
            version,
            slot_id,
            gen_purpose_default,
        }
    }
}

impl Default for ProductProfile {
    fn default() -> Self {
        Self::tekscope()
    }
}
