//! ICC Profile Tag Parsing
//!
//! Tags contain the actual profile data. Each tag has:
//! - A 4-byte signature identifying the tag
//! - A 4-byte type signature identifying the data format
//! - Reserved bytes
//! - Type-specific data
//!
//! See ICC.1:2022 Section 9.

mod curves;
mod mab;
mod text;
mod xyz;

pub use curves::{CurveData, ParametricCurveData};
pub use mab::{CurveSegment, LutAToBData, LutClut, LutMatrix};
pub use text::TextData;
pub use xyz::XyzTagData;

use super::error::IccError;
use super::types::TypeSignature;

/// Parsed tag data
#[derive(Debug, Clone)]
pub enum TagData {
    /// XYZ type data (colorants, white point)
    Xyz(XyzTagData),
    /// Curve type (TRC)
    Curve(CurveData),
    /// Parametric curve type
    ParametricCurve(ParametricCurveData),
    /// Text description
    Text(TextData),
    /// Multi-localized Unicode text
    MultiLocalizedUnicode(TextData),
    /// LUT A to B (mAB), the only LUT family this crate evaluates
    LutAToB(LutAToBData),
    /// Chromatic adaptation matrix (sf32)
    ChromaticAdaptation([[f64; 3]; 3]),
    /// Unknown/unsupported tag type (includes mft1, mft2, mBA, named color, etc.)
    Unknown { type_sig: u32, data: Vec<u8> },
}

impl TagData {
    /// Parse tag data from bytes
    ///
    /// # Arguments
    /// * `data` - The tag data bytes (starting at offset in profile)
    /// * `tag_sig` - The tag signature (for context-specific parsing)
    pub fn parse(data: &[u8], _tag_sig: u32) -> Result<Self, IccError> {
        if data.len() < 8 {
            return Err(IccError::CorruptedData(
                "Tag data too small for header".to_string(),
            ));
        }

        let type_sig = TypeSignature(u32::from_be_bytes([data[0], data[1], data[2], data[3]]));
        // Bytes 4-7 are reserved (should be 0)

        let type_data = &data[8..];

        match type_sig {
            TypeSignature::XYZ => {
                let xyz = XyzTagData::parse(type_data)?;
                Ok(TagData::Xyz(xyz))
            }
            TypeSignature::CURVE => {
                let curve = CurveData::parse(type_data)?;
                Ok(TagData::Curve(curve))
            }
            TypeSignature::PARA => {
                let curve = ParametricCurveData::parse(type_data)?;
                Ok(TagData::ParametricCurve(curve))
            }
            TypeSignature::TEXT => {
                let text = TextData::parse_text(type_data)?;
                Ok(TagData::Text(text))
            }
            TypeSignature::DESC => {
                let text = TextData::parse_desc(type_data)?;
                Ok(TagData::Text(text))
            }
            TypeSignature::MLUC => {
                let text = TextData::parse_mluc(type_data)?;
                Ok(TagData::MultiLocalizedUnicode(text))
            }
            TypeSignature::LUTA2B => {
                let lut = LutAToBData::parse(type_data)?;
                Ok(TagData::LutAToB(lut))
            }
            TypeSignature::SF32 => {
                // sf32 is used for chromatic adaptation matrix
                let matrix = parse_sf32_matrix(type_data)?;
                Ok(TagData::ChromaticAdaptation(matrix))
            }
            _ => {
                // Unknown or out-of-scope type (mft1, mft2, mBA, ...) - store raw data
                Ok(TagData::Unknown {
                    type_sig: type_sig.0,
                    data: data.to_vec(),
                })
            }
        }
    }

    /// Check if this is an XYZ tag
    pub fn as_xyz(&self) -> Option<&XyzTagData> {
        match self {
            TagData::Xyz(xyz) => Some(xyz),
            _ => None,
        }
    }

    /// Check if this is a curve tag
    pub fn as_curve(&self) -> Option<&CurveData> {
        match self {
            TagData::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    /// Check if this is a parametric curve tag
    pub fn as_parametric_curve(&self) -> Option<&ParametricCurveData> {
        match self {
            TagData::ParametricCurve(curve) => Some(curve),
            _ => None,
        }
    }

    /// Check if this is a text tag
    pub fn as_text(&self) -> Option<&TextData> {
        match self {
            TagData::Text(text) | TagData::MultiLocalizedUnicode(text) => Some(text),
            _ => None,
        }
    }

    /// Get as LutAToB data
    pub fn as_lut_a2b(&self) -> Option<&LutAToBData> {
        match self {
            TagData::LutAToB(lut) => Some(lut),
            _ => None,
        }
    }
}

/// Parse sf32 type as 3x3 matrix
fn parse_sf32_matrix(data: &[u8]) -> Result<[[f64; 3]; 3], IccError> {
    if data.len() < 36 {
        return Err(IccError::CorruptedData("sf32 matrix too small".to_string()));
    }

    let mut matrix = [[0.0f64; 3]; 3];
    for row in 0..3 {
        for col in 0..3 {
            let offset = (row * 3 + col) * 4;
            let raw = i32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            matrix[row][col] = raw as f64 / 65536.0;
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unknown_type() {
        // Unknown type signature
        let data = [
            b'u', b'n', b'k', b'n', // type sig "unkn"
            0, 0, 0, 0, // reserved
            1, 2, 3, 4, // payload
        ];

        let tag = TagData::parse(&data, 0).unwrap();
        match tag {
            TagData::Unknown { type_sig, .. } => {
                assert_eq!(type_sig, u32::from_be_bytes(*b"unkn"));
            }
            _ => panic!("Expected Unknown tag type"),
        }
    }

    #[test]
    fn test_parse_mft1_falls_back_to_unknown() {
        // mft1/mft2/mBA are out of scope; they must not error, just fall through.
        let mut data = vec![0u8; 16];
        data[0..4].copy_from_slice(b"mft1");
        let tag = TagData::parse(&data, 0).unwrap();
        assert!(matches!(tag, TagData::Unknown { .. }));
    }
}
