//! Scan record and symbology types

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Store-assigned record identifier
pub type RecordId = u64;

/// Type tag used when a decoder reports no symbology at all
pub const UNKNOWN_TYPE_TAG: &str = "unknown";

/// Barcode symbologies the scanner reports
///
/// Type tags are kept as strings on the record so that a symbology this
/// list does not know about is still stored verbatim.
#[derive(EnumIter, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbology {
    Qr,
    Code128,
    DataMatrix,
    Aztec,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code39,
    Code93,
    Itf14,
    Codabar,
    Pdf417,
}

impl Symbology {
    /// Canonical type tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Code128 => "code128",
            Self::DataMatrix => "datamatrix",
            Self::Aztec => "aztec",
            Self::Ean13 => "ean13",
            Self::Ean8 => "ean8",
            Self::UpcA => "upc_a",
            Self::UpcE => "upc_e",
            Self::Code39 => "code39",
            Self::Code93 => "code93",
            Self::Itf14 => "itf14",
            Self::Codabar => "codabar",
            Self::Pdf417 => "pdf417",
        }
    }

    /// Alternative spellings emitted by platform decoders (compared case-insensitively)
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Qr => &["qrcode", "qr_code", "org.iso.qrcode"],
            Self::Code128 => &["code_128", "org.iso.code128"],
            Self::DataMatrix => &["data_matrix", "org.iso.datamatrix"],
            Self::Aztec => &["org.iso.aztec"],
            Self::Ean13 => &["ean_13", "ean-13", "org.gs1.ean-13"],
            Self::Ean8 => &["ean_8", "ean-8", "org.gs1.ean-8"],
            Self::UpcA => &["upca", "upc-a"],
            Self::UpcE => &["upce", "upc-e", "org.gs1.upc-e"],
            Self::Code39 => &["code_39", "org.iso.code39", "org.iso.code39mod43"],
            Self::Code93 => &["code_93", "com.intermec.code93"],
            Self::Itf14 => &["itf", "itf_14", "org.gs1.itf14", "org.ansi.interleaved2of5"],
            Self::Codabar => &["org.iso.codabar"],
            Self::Pdf417 => &["pdf_417", "org.iso.pdf417"],
        }
    }

    /// Look up a symbology by canonical name or alias
    pub fn from_tag(tag: &str) -> Option<Self> {
        let needle = tag.trim().to_ascii_lowercase();
        Self::iter().find(|s| s.name() == needle || s.aliases().contains(&needle.as_str()))
    }

    /// Canonical names of every known symbology
    pub fn known_tags() -> impl Iterator<Item = &'static str> {
        Self::iter().map(|s| s.name())
    }
}

/// Normalise a decoder-reported type tag
///
/// Known symbologies map to their canonical name, unknown tags are kept
/// lower-cased and trimmed, and an empty tag becomes [`UNKNOWN_TYPE_TAG`].
pub fn normalize_type_tag(tag: &str) -> String {
    if let Some(known) = Symbology::from_tag(tag) {
        return known.name().to_string();
    }
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        UNKNOWN_TYPE_TAG.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// A persisted scan
///
/// Records are immutable once created; the only lifecycle transition after
/// insertion is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: RecordId,
    /// Raw decoded payload
    pub data: String,
    /// Normalised symbology tag
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Milliseconds since the Unix epoch, set once at insertion
    pub created_at: i64,
}

impl ScanRecord {
    pub fn symbology(&self) -> Option<Symbology> {
        Symbology::from_tag(&self.type_tag)
    }
}
