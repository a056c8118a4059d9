//! Enumerated fields used throughout the `.wfm` binary layout.
//!
//! Numeric values match the on-disk encoding exactly
//! (`original_source/helpers/enums.py`); do not renumber variants.

use serde::{Deserialize, Serialize};

use crate::bytes::Endian;
use crate::error::{Result, WfmError};

/// SI unit tag stored alongside axis values (`x_axis_units`, `y_axis_units`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiBaseUnit {
    Seconds,
    Samples,
    Volts,
    Amperes,
    Hertz,
    Db,
    Watts,
    None,
}

impl SiBaseUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            SiBaseUnit::Seconds => "s",
            SiBaseUnit::Samples => "S",
            SiBaseUnit::Volts => "V",
            SiBaseUnit::Amperes => "A",
            SiBaseUnit::Hertz => "Hz",
            SiBaseUnit::Db => "dB",
            SiBaseUnit::Watts => "W",
            SiBaseUnit::None => "",
        }
    }

    /// Best-effort decode of a dimension record's unit label; an
    /// unrecognized label (or an empty one) maps to `None` rather than
    /// erroring, since a unit string is advisory, not load-bearing.
    pub fn from_label(label: &str) -> Self {
        match label {
            "s" => SiBaseUnit::Seconds,
            "S" => SiBaseUnit::Samples,
            "V" => SiBaseUnit::Volts,
            "A" => SiBaseUnit::Amperes,
            "Hz" => SiBaseUnit::Hertz,
            "dB" => SiBaseUnit::Db,
            "W" => SiBaseUnit::Watts,
            _ => SiBaseUnit::None,
        }
    }
}

/// Whether a file holds one record, many fast frames, or a mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformType {
    Single = 0,
    FastFrame = 1,
    Mixed = 2,
    Invalid = 3,
}

/// Curve element format for version one/two files (no 8-bit variants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFormat {
    ExplicitInt16 = 0,
    ExplicitInt32 = 1,
    ExplicitUint32 = 2,
    ExplicitUint64 = 3,
    ExplicitFp32 = 4,
    ExplicitFp64 = 5,
    ExplicitInvalidFormat = 6,
}

/// Curve element format for version three files, which add 8-bit variants
/// and a "no dimension" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveFormatVer3 {
    ExplicitInt16 = 0,
    ExplicitInt32 = 1,
    ExplicitUint32 = 2,
    ExplicitUint64 = 3,
    ExplicitFp32 = 4,
    ExplicitFp64 = 5,
    ExplicitUint8 = 6,
    ExplicitInt8 = 7,
    ExplicitInvalidFormat = 8,
    ExplicitNoDimension = 9,
}

impl CurveFormatVer3 {
    pub fn from_i16(value: i16) -> Result<Self> {
        Ok(match value {
            0 => CurveFormatVer3::ExplicitInt16,
            1 => CurveFormatVer3::ExplicitInt32,
            2 => CurveFormatVer3::ExplicitUint32,
            3 => CurveFormatVer3::ExplicitUint64,
            4 => CurveFormatVer3::ExplicitFp32,
            5 => CurveFormatVer3::ExplicitFp64,
            6 => CurveFormatVer3::ExplicitUint8,
            7 => CurveFormatVer3::ExplicitInt8,
            9 => CurveFormatVer3::ExplicitNoDimension,
            _ => CurveFormatVer3::ExplicitInvalidFormat,
        })
    }

    /// The sample element type a curve buffer of this format decodes to.
    pub fn to_element_type(self) -> Result<crate::sample::ElementType> {
        use crate::sample::ElementType;
        Ok(match self {
            CurveFormatVer3::ExplicitInt16 => ElementType::I16,
            CurveFormatVer3::ExplicitInt32 => ElementType::I32,
            CurveFormatVer3::ExplicitUint32 => ElementType::U32,
            CurveFormatVer3::ExplicitUint64 => ElementType::U64,
            CurveFormatVer3::ExplicitFp32 => ElementType::F32,
            CurveFormatVer3::ExplicitFp64 => ElementType::F64,
            CurveFormatVer3::ExplicitUint8 => ElementType::U8,
            CurveFormatVer3::ExplicitInt8 => ElementType::I8,
            CurveFormatVer3::ExplicitInvalidFormat | CurveFormatVer3::ExplicitNoDimension => {
                return Err(WfmError::BadFormat("no curve element type for this dimension format".into()))
            }
        })
    }

    pub fn element_byte_len(self) -> usize {
        match self {
            CurveFormatVer3::ExplicitInt16 => 2,
            CurveFormatVer3::ExplicitInt32 => 4,
            CurveFormatVer3::ExplicitUint32 => 4,
            CurveFormatVer3::ExplicitUint64 => 8,
            CurveFormatVer3::ExplicitFp32 => 4,
            CurveFormatVer3::ExplicitFp64 => 8,
            CurveFormatVer3::ExplicitUint8 => 1,
            CurveFormatVer3::ExplicitInt8 => 1,
            CurveFormatVer3::ExplicitInvalidFormat => 0,
            CurveFormatVer3::ExplicitNoDimension => 0,
        }
    }
}

/// How curve samples are laid out (plain samples, min/max pairs, histograms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    ExplicitSample = 0,
    ExplicitMinMax = 1,
    ExplicitVertHist = 2,
    ExplicitHorHist = 3,
    ExplicitRowOrder = 4,
    ExplicitColumnOrder = 5,
    ExplicitInvalidStorage = 6,
}

/// What kind of record the waveform header describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    ScalarMeas = 0,
    ScalarConst = 1,
    Vector = 2,
    PixMap = 3,
    Invalid = 4,
    WfmDb = 5,
    Digital = 6,
}

/// Pixel map display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsyFormat {
    Invalid = 0,
    Yt = 1,
    Xy = 2,
    Xyz = 3,
}

/// Type of acquisition sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepType {
    Roll = 0,
    Sample = 1,
    Et = 2,
    Invalid = 3,
}

/// What kind of base is used for acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Time = 0,
    SpectralMag = 1,
    SpectralPhase = 2,
    Invalid = 3,
}

/// Per-fast-frame checksum algorithm; unused by any writer in this crate but
/// still decoded so the field round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    NoChecksum = 0,
    Crc16 = 1,
    Sum16 = 2,
    Crc32 = 3,
    Sum32 = 4,
}

/// Whether/how a version-three file precedes its curve data with a summary
/// frame (average or envelope of the acquisition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFrameType {
    Off = 0,
    Average = 1,
    Envelope = 2,
}

/// The `:WFM#00N` version marker read from byte offset 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionNumber {
    One,
    Two,
    Three,
}

impl VersionNumber {
    pub const ONE_MARKER: &'static [u8; 8] = b":WFM#001";
    pub const TWO_MARKER: &'static [u8; 8] = b":WFM#002";
    pub const THREE_MARKER: &'static [u8; 8] = b":WFM#003";

    pub fn marker(self) -> &'static [u8; 8] {
        match self {
            VersionNumber::One => Self::ONE_MARKER,
            VersionNumber::Two => Self::TWO_MARKER,
            VersionNumber::Three => Self::THREE_MARKER,
        }
    }

    pub fn from_marker(marker: &[u8; 8]) -> Result<Self> {
        match marker {
            m if m == Self::ONE_MARKER => Ok(VersionNumber::One),
            m if m == Self::TWO_MARKER => Ok(VersionNumber::Two),
            m if m == Self::THREE_MARKER => Ok(VersionNumber::Three),
            other => Err(WfmError::BadVersion(*other)),
        }
    }
}

/// The two-byte endian marker at the start of a `.wfm` file.
///
/// `Intel` marks little-endian data, `Ppc` marks big-endian data — the
/// marker names the CPU family that originally wrote the file, not the
/// byte order directly, so callers should go through [`ByteOrderFormat::endian`]
/// rather than pattern-matching the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrderFormat {
    Intel,
    Ppc,
}

impl ByteOrderFormat {
    pub const INTEL_MARKER: [u8; 2] = [0xf0, 0xf0];
    pub const PPC_MARKER: [u8; 2] = [0x0f, 0x0f];

    pub fn marker(self) -> [u8; 2] {
        match self {
            ByteOrderFormat::Intel => Self::INTEL_MARKER,
            ByteOrderFormat::Ppc => Self::PPC_MARKER,
        }
    }

    pub fn from_marker(marker: [u8; 2]) -> Result<Self> {
        match marker {
            m if m == Self::INTEL_MARKER => Ok(ByteOrderFormat::Intel),
            m if m == Self::PPC_MARKER => Ok(ByteOrderFormat::Ppc),
            other => Err(WfmError::BadEndian(other)),
        }
    }

    /// The runtime byte order this marker implies: Intel is little-endian,
    /// PPC is big-endian.
    pub fn endian(self) -> Endian {
        match self {
            ByteOrderFormat::Intel => Endian::Little,
            ByteOrderFormat::Ppc => Endian::Big,
        }
    }
}

/// Which of the two (explicit, implicit) dimension/view slots a record
/// occupies — the horizontal axis of the curve or its vertical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformDimension {
    First,
    Second,
}

impl WaveformDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            WaveformDimension::First => "first",
            WaveformDimension::Second => "second",
        }
    }
}

/// The windowing function used when computing an IQ waveform's sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IqWindowType {
    BlackHarris,
    FlatTop,
    Hanning,
    Hamming,
    Rectangle,
    KaiserBessel,
}

impl IqWindowType {
    pub fn as_str(self) -> &'static str {
        match self {
            IqWindowType::BlackHarris => "BlackHarris",
            IqWindowType::FlatTop => "Flattop2",
            IqWindowType::Hanning => "Hanning",
            IqWindowType::Hamming => "Hamming",
            IqWindowType::Rectangle => "Rectangle",
            IqWindowType::KaiserBessel => "Kaiserbessel",
        }
    }

    pub fn from_str(value: &str) -> Result<Self> {
        Ok(match value {
            "BlackHarris" => IqWindowType::BlackHarris,
            "Flattop2" => IqWindowType::FlatTop,
            "Hanning" => IqWindowType::Hanning,
            "Hamming" => IqWindowType::Hamming,
            "Rectangle" => IqWindowType::Rectangle,
            "Kaiserbessel" => IqWindowType::KaiserBessel,
            other => return Err(WfmError::BadFormat(format!("unknown IQ window type: {other}"))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_marker_is_little_endian() {
        let fmt = ByteOrderFormat::from_marker([0xf0, 0xf0]).unwrap();
        assert_eq!(fmt, ByteOrderFormat::Intel);
        assert_eq!(fmt.endian(), Endian::Little);
    }

    #[test]
    fn ppc_marker_is_big_endian() {
        let fmt = ByteOrderFormat::from_marker([0x0f, 0x0f]).unwrap();
        assert_eq!(fmt, ByteOrderFormat::Ppc);
        assert_eq!(fmt.endian(), Endian::Big);
    }

    #[test]
    fn unknown_marker_errors() {
        assert!(ByteOrderFormat::from_marker([0x01, 0x02]).is_err());
    }

    #[test]
    fn version_marker_round_trips() {
        let v = VersionNumber::from_marker(b":WFM#003").unwrap();
        assert_eq!(v, VersionNumber::Three);
        assert_eq!(v.marker(), b":WFM#003");
    }

    #[test]
    fn curve_format_ver3_decodes_eight_bit_variants() {
        assert_eq!(
            CurveFormatVer3::from_i16(6).unwrap(),
            CurveFormatVer3::ExplicitUint8
        );
        assert_eq!(
            CurveFormatVer3::from_i16(7).unwrap(),
            CurveFormatVer3::ExplicitInt8
        );
    }
}
