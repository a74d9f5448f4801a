//! `mAB ` (lutAToBType) tag parsing.
//!
//! v4 profiles carrying an `A2B0` tag of this subtype describe a pipeline:
//! A-curves -> optional 3D CLUT -> M-curves -> optional matrix -> B-curves.
//! Only the A-curves/CLUT/M-curves stages are evaluated by this crate; the
//! matrix and B-curves are parsed for completeness but not applied (there is
//! no matrix-shaper fallback path for mAB profiles).
//!
//! See ICC.1:2022 Section 10.13.

use crate::icc::error::IccError;

/// LUT A to B data (mAB / lutAToBType) - v4 profiles
#[derive(Debug, Clone)]
pub struct LutAToBData {
    /// Number of input channels
    pub input_channels: u8,
    /// Number of output channels
    pub output_channels: u8,
    /// B curves (output side, applied last, not evaluated by this crate)
    pub b_curves: Option<Vec<CurveSegment>>,
    /// Matrix (optional, not evaluated by this crate)
    pub matrix: Option<LutMatrix>,
    /// M curves (after the CLUT)
    pub m_curves: Option<Vec<CurveSegment>>,
    /// CLUT (optional)
    pub clut: Option<LutClut>,
    /// A curves (input side, before the CLUT)
    pub a_curves: Option<Vec<CurveSegment>>,
}

impl LutAToBData {
    /// Parse lutAToB data from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 32 {
            return Err(IccError::CorruptedData("lutAToB tag too small".to_string()));
        }

        let input_channels = data[0];
        let output_channels = data[1];
        // data[2..4] reserved

        // Offsets (0 means not present)
        let b_offset = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let matrix_offset = u32::from_be_bytes([data[8], data[9], data[10], data[11]]) as usize;
        let m_offset = u32::from_be_bytes([data[12], data[13], data[14], data[15]]) as usize;
        let clut_offset = u32::from_be_bytes([data[16], data[17], data[18], data[19]]) as usize;
        let a_offset = u32::from_be_bytes([data[20], data[21], data[22], data[23]]) as usize;

        let b_curves = if b_offset != 0 {
            Some(parse_curve_set(data, b_offset, output_channels as usize)?)
        } else {
            None
        };

        let matrix = if matrix_offset != 0 {
            Some(LutMatrix::parse(&data[matrix_offset..])?)
        } else {
            None
        };

        let m_curves = if m_offset != 0 {
            Some(parse_curve_set(data, m_offset, output_channels as usize)?)
        } else {
            None
        };

        let clut = if clut_offset != 0 {
            Some(LutClut::parse(
                &data[clut_offset..],
                input_channels,
                output_channels,
            )?)
        } else {
            None
        };

        let a_curves = if a_offset != 0 {
            Some(parse_curve_set(data, a_offset, input_channels as usize)?)
        } else {
            None
        };

        Ok(Self {
            input_channels,
            output_channels,
            b_curves,
            matrix,
            m_curves,
            clut,
            a_curves,
        })
    }
}

/// Matrix element in LUT (3x3 + 3 offset)
#[derive(Debug, Clone)]
pub struct LutMatrix {
    /// 3x3 matrix
    pub matrix: [[f64; 3]; 3],
    /// 3 offset values
    pub offset: [f64; 3],
}

impl LutMatrix {
    /// Parse matrix from bytes
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < 48 {
            return Err(IccError::CorruptedData("LUT matrix too small".to_string()));
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

        let mut offs = [0.0f64; 3];
        for i in 0..3 {
            let offset = 36 + i * 4;
            let raw = i32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            offs[i] = raw as f64 / 65536.0;
        }

        Ok(Self {
            matrix,
            offset: offs,
        })
    }
}

/// 3D (or N-D) CLUT embedded in an mAB tag.
#[derive(Debug, Clone)]
pub struct LutClut {
    /// Grid points per dimension (one entry per input channel)
    pub grid_points: Vec<u8>,
    /// Precision: 1 for u8, 2 for u16
    pub precision: u8,
    /// CLUT data, normalized to 0.0-1.0 by the table's own precision (255 or 65535)
    pub data: Vec<f64>,
    /// Number of output channels
    pub output_channels: u8,
}

impl LutClut {
    /// Parse CLUT from bytes
    pub fn parse(data: &[u8], input_channels: u8, output_channels: u8) -> Result<Self, IccError> {
        if data.len() < 20 {
            return Err(IccError::CorruptedData("LUT CLUT too small".to_string()));
        }

        let mut grid_points = Vec::with_capacity(input_channels as usize);
        for i in 0..input_channels as usize {
            grid_points.push(data[i]);
        }

        let precision = data[16];
        // data[17..20] reserved

        let mut total_entries = 1usize;
        for &g in &grid_points {
            total_entries *= g as usize;
        }
        total_entries *= output_channels as usize;

        let data_offset = 20;
        let bytes_per_entry = precision as usize;
        let required_bytes = total_entries * bytes_per_entry;

        if data.len() < data_offset + required_bytes {
            return Err(IccError::CorruptedData(
                "LUT CLUT data truncated".to_string(),
            ));
        }

        let mut clut_data = Vec::with_capacity(total_entries);
        for i in 0..total_entries {
            let offset = data_offset + i * bytes_per_entry;
            let value = if precision == 1 {
                data[offset] as f64 / 255.0
            } else {
                let v = u16::from_be_bytes([data[offset], data[offset + 1]]);
                v as f64 / 65535.0
            };
            clut_data.push(value);
        }

        Ok(Self {
            grid_points,
            precision,
            data: clut_data,
            output_channels,
        })
    }
}

/// Curve segment inside an mAB curve set (can be curv or para type)
#[derive(Debug, Clone)]
pub enum CurveSegment {
    /// Identity curve (curv with count == 0)
    Identity,
    /// Sampled table, normalized by the table's own maximum entry
    Table(Vec<f64>),
    /// Parametric curve (para, or curv with a single gamma entry)
    Parametric { curve_type: u16, params: Vec<f64> },
}

impl CurveSegment {
    /// Evaluate this segment at `x`, extrapolating linearly for sampled
    /// tables outside `[0, 1]` (parametric curves extrapolate naturally
    /// through their own formula).
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            CurveSegment::Identity => x,
            CurveSegment::Table(table) => crate::math::interpolation::lut1d_interp(table, x),
            CurveSegment::Parametric { curve_type, params } => {
                crate::math::gamma::parametric_curve_eval_raw(*curve_type, params, x)
            }
        }
    }
}

/// Parse a set of curves from data
fn parse_curve_set(
    data: &[u8],
    offset: usize,
    count: usize,
) -> Result<Vec<CurveSegment>, IccError> {
    let mut curves = Vec::with_capacity(count);
    let mut pos = offset;

    for _ in 0..count {
        if pos + 8 > data.len() {
            return Err(IccError::CorruptedData("Curve set truncated".to_string()));
        }

        let type_sig = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]);
        // Bytes 4-7 are reserved

        pos += 8;

        match &type_sig.to_be_bytes() {
            b"curv" => {
                if pos + 4 > data.len() {
                    return Err(IccError::CorruptedData("curv header truncated".to_string()));
                }

                let count =
                    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
                        as usize;
                pos += 4;

                let curve = if count == 0 {
                    CurveSegment::Identity
                } else if count == 1 {
                    if pos + 2 > data.len() {
                        return Err(IccError::CorruptedData("curv gamma truncated".to_string()));
                    }
                    let gamma_raw = u16::from_be_bytes([data[pos], data[pos + 1]]);
                    let gamma = gamma_raw as f64 / 256.0;
                    pos += 2;
                    CurveSegment::Parametric {
                        curve_type: 0,
                        params: vec![gamma],
                    }
                } else {
                    let required = count * 2;
                    if pos + required > data.len() {
                        return Err(IccError::CorruptedData("curv table truncated".to_string()));
                    }

                    let mut raw = Vec::with_capacity(count);
                    for i in 0..count {
                        raw.push(u16::from_be_bytes([data[pos + i * 2], data[pos + i * 2 + 1]]));
                    }
                    pos += required;

                    let max = raw.iter().copied().max().unwrap_or(1).max(1) as f64;
                    let table = raw.iter().map(|&v| v as f64 / max).collect();
                    CurveSegment::Table(table)
                };

                curves.push(curve);
            }
            b"para" => {
                if pos + 4 > data.len() {
                    return Err(IccError::CorruptedData("para header truncated".to_string()));
                }

                let func_type = u16::from_be_bytes([data[pos], data[pos + 1]]);
                // Bytes 2-3 reserved
                pos += 4;

                let param_count = match func_type {
                    0 => 1, // g
                    1 => 3, // g, a, b
                    2 => 4, // g, a, b, c
                    3 => 5, // g, a, b, c, d
                    4 => 7, // g, a, b, c, d, e, f
                    other => {
                        return Err(IccError::UnsupportedCurveMode(other));
                    }
                };

                let required = param_count * 4;
                if pos + required > data.len() {
                    return Err(IccError::CorruptedData("para params truncated".to_string()));
                }

                let mut params = Vec::with_capacity(param_count);
                for i in 0..param_count {
                    let raw = i32::from_be_bytes([
                        data[pos + i * 4],
                        data[pos + i * 4 + 1],
                        data[pos + i * 4 + 2],
                        data[pos + i * 4 + 3],
                    ]);
                    params.push(raw as f64 / 65536.0);
                }
                pos += required;

                curves.push(CurveSegment::Parametric {
                    curve_type: func_type,
                    params,
                });
            }
            _ => {
                return Err(IccError::CorruptedData(format!(
                    "Unknown curve type in set: {:08X}",
                    type_sig
                )));
            }
        }

        // Align to 4-byte boundary
        pos = (pos + 3) & !3;
    }

    Ok(curves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lut_a2b_identity_curves_only() {
        // 3-in/3-out with only A-curves (3x identity curv), no CLUT, no M/B/matrix.
        let mut data = vec![0u8; 32];
        data[0] = 3;
        data[1] = 3;
        // a_offset at byte 20..24 -> 32
        data[20..24].copy_from_slice(&32u32.to_be_bytes());

        for _ in 0..3 {
            data.extend_from_slice(b"curv");
            data.extend_from_slice(&[0u8; 4]); // reserved
            data.extend_from_slice(&0u32.to_be_bytes()); // count == 0 -> identity
        }

        let lut = LutAToBData::parse(&data).unwrap();
        assert_eq!(lut.input_channels, 3);
        assert!(lut.clut.is_none());
        let a_curves = lut.a_curves.unwrap();
        assert_eq!(a_curves.len(), 3);
        assert!(matches!(a_curves[0], CurveSegment::Identity));
    }

    #[test]
    fn test_curve_segment_table_normalizes_by_own_max() {
        let table = CurveSegment::Table(vec![0.0, 0.5, 1.0]);
        assert!((table.eval(0.0) - 0.0).abs() < 1e-9);
        assert!((table.eval(1.0) - 1.0).abs() < 1e-9);
    }
}
