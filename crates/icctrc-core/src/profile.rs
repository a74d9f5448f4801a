//! Public façade: [`Profile`], [`Colourspace`] and the construction
//! pipeline that turns a parsed [`crate::icc::IccProfile`] into either a
//! Matrix/TRC or mAB decoder.

use crate::color::{Xyz, D50};
use crate::icc::tags::{CurveData, CurveSegment, LutAToBData, LutClut, LutMatrix, ParametricCurveData, TagData};
use crate::icc::types::TagSignature;
use crate::icc::{IccError, IccProfile};
use crate::math::{adapt_xyz, bradford_matrix, ChromaticAdaptationMethod, Matrix3x3};
use crate::{Error, Result};

/// Tunables for curve rasterisation and LUT normalisation, threaded through
/// [`Profile::open_with_options`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Number of equally spaced points used when rasterising a `para` curve
    /// into a sampled LUT.
    pub lut_size: usize,
    /// Normalise `curv` sampled tables by the fixed ICC full-scale divisor
    /// `65535` instead of the table's own maximum entry.
    pub strict_lut_normalisation: bool,
    /// Rasterise parametric (`para`) curves into a sampled LUT at
    /// construction time, trading reference accuracy for faster
    /// evaluation. Off by default: the closed-form evaluation is exact and
    /// cheap enough that callers must opt in to the lossy fast path.
    pub rasterize_parametric: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            lut_size: 8192,
            strict_lut_normalisation: false,
            rasterize_parametric: false,
        }
    }
}

/// A single-channel transfer curve, unified across `curv` and `para` tag
/// encodings so the pixel decoder can evaluate either uniformly.
#[derive(Debug, Clone)]
pub enum Curve {
    /// A `curv` tag: identity, single gamma, or a sampled table. The `bool`
    /// is [`RasterOptions::strict_lut_normalisation`], fixed at
    /// construction time so callers never need to thread it through `eval`.
    Curv(CurveData, bool),
    /// A `para` tag, evaluated in closed form.
    Para(ParametricCurveData),
    /// A `para` tag rasterised into an `N`-point LUT at construction time
    /// (see [`RasterOptions::rasterize_parametric`]). The closed-form
    /// curve is retained so [`Profile::colourspace`]-adjacent callers that
    /// need reference accuracy can still reach it.
    RasterizedPara {
        lut: Vec<f64>,
        closed_form: ParametricCurveData,
    },
}

impl Curve {
    fn from_tag(data: &TagData, opts: &RasterOptions) -> Option<Self> {
        match data {
            TagData::Curve(c) => Some(Curve::Curv(c.clone(), opts.strict_lut_normalisation)),
            TagData::ParametricCurve(p) => {
                if opts.rasterize_parametric && !is_identity_parametric(p) {
                    let lut = rasterize(|x| p.eval(x), opts.lut_size);
                    Some(Curve::RasterizedPara {
                        lut,
                        closed_form: p.clone(),
                    })
                } else {
                    Some(Curve::Para(p.clone()))
                }
            }
            _ => None,
        }
    }

    /// Evaluate the curve at `x`. `x` outside `[0, 1]` extrapolates linearly
    /// rather than clamping, so HDR inputs decode to finite values.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Curve::Curv(c, strict) => c.eval_with(x, *strict),
            Curve::Para(p) => p.eval(x),
            Curve::RasterizedPara { lut, .. } => crate::math::lut1d_interp(lut, x),
        }
    }
}

fn is_identity_parametric(p: &ParametricCurveData) -> bool {
    use crate::math::gamma::ParametricCurveType;
    p.curve.curve_type == ParametricCurveType::Gamma && (p.curve.g - 1.0).abs() < 1e-9
}

fn rasterize(f: impl Fn(f64) -> f64, n: usize) -> Vec<f64> {
    let n = n.max(2);
    (0..n).map(|i| f(i as f64 / (n - 1) as f64)).collect()
}

/// The three per-channel TRC curves of a Matrix/TRC profile.
#[derive(Debug, Clone)]
pub struct ChannelTrc {
    pub r: Curve,
    pub g: Curve,
    pub b: Curve,
    /// True iff the three `*TRC` tags point at the same offset, or their
    /// raw payload byte ranges are identical. When true, the pixel decoder
    /// evaluates the red curve once per pixel instead of dispatching three
    /// independent channel tasks.
    pub uniform: bool,
}

/// The A-curve -> CLUT -> M-curve stage of an `mAB` pipeline. The matrix
/// and B-curves are parsed and retained but never applied: this crate's
/// output is linear RGB, not XYZ, so the stages that would produce XYZ are
/// inert here (a caller that wants true XYZ can still reach them).
#[derive(Debug, Clone)]
pub struct MabPipeline {
    pub a_curves: [Curve; 3],
    pub clut: Option<Clut3D>,
    pub m_curves: [Curve; 3],
    pub matrix: Option<LutMatrix>,
    pub b_curves: Option<[Curve; 3]>,
}

/// A 3D colour lookup table embedded in an `mAB` tag.
#[derive(Debug, Clone)]
pub struct Clut3D {
    pub dims: [usize; 3],
    pub precision: u8,
    pub table: Vec<f64>,
    pub output_channels: usize,
}

impl From<&LutClut> for Clut3D {
    fn from(clut: &LutClut) -> Self {
        let mut dims = [1usize; 3];
        for (i, &g) in clut.grid_points.iter().take(3).enumerate() {
            dims[i] = g as usize;
        }
        Self {
            dims,
            precision: clut.precision,
            table: clut.data.clone(),
            output_channels: clut.output_channels as usize,
        }
    }
}

/// The discriminated profile classification: either a Matrix/TRC ("sdr")
/// profile built from colorant + TRC tags, or an `mAB` A-to-B ("hdr")
/// profile.
#[derive(Debug, Clone)]
enum ProfileKind {
    Matrix {
        primaries: [Xyz; 3],
        wtpt: Xyz,
        chad: Option<Matrix3x3>,
        trc: ChannelTrc,
    },
    Mab {
        primaries: [Xyz; 3],
        wtpt: Xyz,
        chad: Option<Matrix3x3>,
        pipe: MabPipeline,
    },
}

/// A parsed ICC display profile: its header, classification, and the
/// curves/pipeline needed to decode pixels and produce a colourspace
/// descriptor. Immutable once constructed; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Profile {
    kind: ProfileKind,
    name: String,
    version: (u8, u8, u8),
    pcs_is_d50: bool,
}

/// A colourspace descriptor: primaries and whitepoint as xy chromaticity
/// pairs, adapted to the profile's own (recovered) native whitepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Colourspace {
    pub name: String,
    pub primaries_xy: [(f64, f64); 3],
    pub whitepoint_xy: (f64, f64),
}

/// The canonical D50 PCS illuminant as written in an ICC header, bytes
/// `68..80`. A one-LSB variant ending `D3 2C` is also accepted.
const D50_ILLUMINANT_BYTES: [u8; 12] = [
    0x00, 0x00, 0xF6, 0xD6, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0xD3, 0x2D,
];

fn is_pcs_d50(buf: &[u8]) -> bool {
    if buf.len() < 80 {
        return false;
    }
    let illum = &buf[68..80];
    if illum == D50_ILLUMINANT_BYTES {
        return true;
    }
    let mut lsb_variant = D50_ILLUMINANT_BYTES;
    lsb_variant[11] = 0x2C;
    illum == lsb_variant
}

fn xyz_tag(icc: &IccProfile, sig: TagSignature) -> Result<Xyz> {
    match icc.get_tag(sig) {
        Some(TagData::Xyz(data)) => data
            .to_xyz()
            .ok_or_else(|| Error::Parse(IccError::CorruptedData(format!("{:?} has no value", sig)))),
        Some(_) => Err(Error::Parse(IccError::InvalidTagType {
            tag: sig.0,
            type_sig: 0,
        })),
        None => Err(Error::Parse(IccError::MissingTag(sig.0))),
    }
}

/// Like [`xyz_tag`], but a missing tag falls back to `default` instead of
/// erroring. `mAB` classification never requires `rXYZ`/`gXYZ`/`bXYZ`/`wtpt`
/// the way Matrix/TRC classification does, so an `mAB` profile built purely
/// from a CLUT is legal and these colorant tags may simply be absent.
fn xyz_tag_or(icc: &IccProfile, sig: TagSignature, default: Xyz) -> Result<Xyz> {
    match icc.get_tag(sig) {
        Some(TagData::Xyz(data)) => data
            .to_xyz()
            .ok_or_else(|| Error::Parse(IccError::CorruptedData(format!("{:?} has no value", sig)))),
        Some(_) => Err(Error::Parse(IccError::InvalidTagType {
            tag: sig.0,
            type_sig: 0,
        })),
        None => Ok(default),
    }
}

fn curve_tag(icc: &IccProfile, sig: TagSignature, opts: &RasterOptions) -> Result<Curve> {
    match icc.get_tag(sig) {
        Some(data @ (TagData::Curve(_) | TagData::ParametricCurve(_))) => {
            Curve::from_tag(data, opts).ok_or_else(|| {
                Error::Parse(IccError::InvalidTagType {
                    tag: sig.0,
                    type_sig: 0,
                })
            })
        }
        Some(_) => Err(Error::Parse(IccError::InvalidTagType {
            tag: sig.0,
            type_sig: 0,
        })),
        None => Err(Error::Parse(IccError::MissingTag(sig.0))),
    }
}

/// A `*TRC` tag set is uniform if all three entries share an offset, or
/// their raw payload byte ranges (offset + length, as written in the tag
/// table) are byte-for-byte identical. Compared at the raw-byte level per
/// the distilled spec, rather than on the decoded [`Curve`] values.
fn trc_uniform(icc: &IccProfile) -> bool {
    let entries = [
        icc.tag_entry(TagSignature::RED_TRC),
        icc.tag_entry(TagSignature::GREEN_TRC),
        icc.tag_entry(TagSignature::BLUE_TRC),
    ];
    let (r, g, b) = match (entries[0], entries[1], entries[2]) {
        (Some(r), Some(g), Some(b)) => (r, g, b),
        _ => return false,
    };
    if r.0 == g.0 && r.0 == b.0 {
        return true;
    }
    let raw = icc.raw_data();
    let slice = |(offset, len): (u32, u32)| -> &[u8] {
        let start = offset as usize;
        let end = start + len as usize;
        &raw[start..end]
    };
    slice(r) == slice(g) && slice(r) == slice(b)
}

fn build_matrix_trc(icc: &IccProfile, opts: &RasterOptions) -> Result<ProfileKind> {
    let primaries = [
        xyz_tag(icc, TagSignature::RED_COLORANT)?,
        xyz_tag(icc, TagSignature::GREEN_COLORANT)?,
        xyz_tag(icc, TagSignature::BLUE_COLORANT)?,
    ];
    let wtpt = xyz_tag(icc, TagSignature::MEDIA_WHITE)?;
    let chad = icc.chromatic_adaptation_matrix().map(Matrix3x3::new);

    let r = curve_tag(icc, TagSignature::RED_TRC, opts)?;
    let g = curve_tag(icc, TagSignature::GREEN_TRC, opts)?;
    let b = curve_tag(icc, TagSignature::BLUE_TRC, opts)?;
    let uniform = trc_uniform(icc);

    Ok(ProfileKind::Matrix {
        primaries,
        wtpt,
        chad,
        trc: ChannelTrc { r, g, b, uniform },
    })
}

fn curve_segment_to_curve(seg: &CurveSegment) -> Curve {
    match seg {
        CurveSegment::Identity => Curve::Curv(CurveData::Identity, false),
        CurveSegment::Table(table) => {
            // CurveSegment tables are already normalised fractions in
            // [0, 1]; round-trip them through a u16 LUT representation so
            // they can share CurveData::eval's interpolation path.
            let table16: Vec<u16> = table
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * 65535.0).round() as u16)
                .collect();
            Curve::Curv(CurveData::Table(table16), false)
        }
        CurveSegment::Parametric { curve_type, params } => {
            use crate::math::gamma::{ParametricCurve, ParametricCurveType};
            let curve_type = ParametricCurveType::from_icc(*curve_type).unwrap_or(ParametricCurveType::Gamma);
            let curve = ParametricCurve::from_params(curve_type, params)
                .unwrap_or_else(|| ParametricCurve::gamma(params.first().copied().unwrap_or(1.0)));
            Curve::Para(ParametricCurveData { curve })
        }
    }
}

fn build_mab(icc: &IccProfile, lut: &LutAToBData, opts: &RasterOptions) -> Result<ProfileKind> {
    let d50 = D50.xyz;
    let primaries = [
        xyz_tag_or(icc, TagSignature::RED_COLORANT, d50)?,
        xyz_tag_or(icc, TagSignature::GREEN_COLORANT, d50)?,
        xyz_tag_or(icc, TagSignature::BLUE_COLORANT, d50)?,
    ];
    let wtpt = xyz_tag_or(icc, TagSignature::MEDIA_WHITE, d50)?;
    let chad = icc.chromatic_adaptation_matrix().map(Matrix3x3::new);

    let identity3 = || {
        [
            Curve::Curv(CurveData::Identity, false),
            Curve::Curv(CurveData::Identity, false),
            Curve::Curv(CurveData::Identity, false),
        ]
    };

    let curve_array = |segs: &Option<Vec<CurveSegment>>| -> [Curve; 3] {
        match segs {
            Some(v) if v.len() == 3 => [
                curve_segment_to_curve(&v[0]),
                curve_segment_to_curve(&v[1]),
                curve_segment_to_curve(&v[2]),
            ],
            _ => identity3(),
        }
    };

    let a_curves = curve_array(&lut.a_curves);
    let m_curves = curve_array(&lut.m_curves);
    let b_curves = lut.b_curves.as_ref().map(|_| curve_array(&lut.b_curves));
    let clut = lut.clut.as_ref().map(Clut3D::from);

    let _ = opts; // rasterisation of mAB curve segments is not supported; closed-form only
    let pipe = MabPipeline {
        a_curves,
        clut,
        m_curves,
        matrix: lut.matrix.clone(),
        b_curves,
    };

    Ok(ProfileKind::Mab {
        primaries,
        wtpt,
        chad,
        pipe,
    })
}

fn extract_name(icc: &IccProfile) -> String {
    let raw = icc
        .description()
        .unwrap_or_default();
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let stripped = if lower.ends_with(".icc") || lower.ends_with(".icm") {
        &trimmed[..trimmed.len() - 4]
    } else {
        trimmed
    };
    stripped.to_string()
}

fn xy_to_unit_xyz(xy: (f64, f64)) -> Xyz {
    Xyz::from_xyy(xy.0, xy.1, 1.0)
}

fn xyz_to_xy(xyz: Xyz) -> (f64, f64) {
    let (x, y, _) = xyz.to_xyy();
    (x, y)
}

/// Recover the profile's native whitepoint as an xy chromaticity pair, per
/// §4.5: invert `chad` against the `wtpt` tag's XYZ value when `chad` is
/// present and not the identity; otherwise use `wtpt` directly. A singular
/// `chad` falls back to the direct `wtpt` reading with a warning, since
/// there is nothing else to invert it against.
fn recover_whitepoint(chad: Option<&Matrix3x3>, wtpt: Xyz) -> (f64, f64) {
    if let Some(m) = chad {
        if !m.is_identity(1e-6) {
            if let Some(inv) = m.inverse() {
                let xyz = Xyz::from_array(inv.multiply_vec(wtpt.to_array()));
                return xyz_to_xy(xyz);
            }
            log::warn!("chad matrix is singular; falling back to wtpt tag for native whitepoint");
        }
    }
    xyz_to_xy(wtpt)
}

/// Chromatically adapt the (always D50-referred) `rXYZ`/`gXYZ`/`bXYZ`
/// primaries to the recovered native whitepoint using Bradford. Falls back
/// to the unadapted D50-referred primaries, with a warning, if the
/// adaptation produces a non-finite result (degenerate/collinear
/// primaries).
fn adapt_primaries(primaries: [Xyz; 3], wt_prf_xy: (f64, f64)) -> [(f64, f64); 3] {
    let d50 = crate::color::WhitePoint::new("pcs-d50", D50.xyz.x, D50.xyz.y, D50.xyz.z);
    let native = crate::color::WhitePoint::new("native", xy_to_unit_xyz(wt_prf_xy).x, 1.0, xy_to_unit_xyz(wt_prf_xy).z);

    let mut out = [(0.0, 0.0); 3];
    for (i, &p) in primaries.iter().enumerate() {
        let src = xyz_to_xy(p);
        let adapted = adapt_xyz(xy_to_unit_xyz(src), &d50, &native, ChromaticAdaptationMethod::Bradford);
        let (ax, ay) = xyz_to_xy(adapted);
        if ax.is_finite() && ay.is_finite() {
            out[i] = (ax, ay);
        } else {
            log::warn!("Bradford adaptation produced a non-finite primary; falling back to D50-referred value");
            out[i] = src;
        }
    }
    out
}

/// The canonical, never-applied Bradford matrix used when a caller wants
/// to adapt a primary manually outside [`Profile::colourspace`].
pub fn bradford(src_xy: (f64, f64), dst_xy: (f64, f64)) -> Matrix3x3 {
    let src = crate::color::WhitePoint::new("src", xy_to_unit_xyz(src_xy).x, 1.0, xy_to_unit_xyz(src_xy).z);
    let dst = crate::color::WhitePoint::new("dst", xy_to_unit_xyz(dst_xy).x, 1.0, xy_to_unit_xyz(dst_xy).z);
    bradford_matrix(&src, &dst)
}

impl Profile {
    /// Parse and classify an ICC profile from raw bytes, using the default
    /// [`RasterOptions`] (closed-form parametric evaluation, own-maximum
    /// `curv` normalisation).
    pub fn open(buf: &[u8]) -> Result<Self> {
        Self::open_with_options(buf, &RasterOptions::default())
    }

    /// Like [`open`](Self::open), with explicit rasterisation/normalisation
    /// tunables.
    pub fn open_with_options(buf: &[u8], opts: &RasterOptions) -> Result<Self> {
        let icc = IccProfile::parse(buf).map_err(Error::Parse)?;

        let kind = if icc.is_matrix_shaper() {
            build_matrix_trc(&icc, opts)?
        } else if let Some(mab) = icc.mab() {
            build_mab(&icc, mab, opts)?
        } else if let Some((found_in, found_out)) = icc.mab_channel_mismatch() {
            return Err(Error::Parse(IccError::ChannelCountMismatch {
                expected: 3,
                found: if found_in != 3 { found_in } else { found_out },
            }));
        } else {
            return Err(Error::Parse(IccError::UnsupportedProfile(
                "profile classifies as neither Matrix/TRC nor mAB".to_string(),
            )));
        };

        let pcs_d50 = is_pcs_d50(buf);
        if !pcs_d50 {
            log::warn!("profile PCS illuminant is not D50; continuing per documented fallback");
        }

        Ok(Self {
            kind,
            name: extract_name(&icc),
            version: icc.header.version_tuple(),
            pcs_is_d50: pcs_d50,
        })
    }

    /// Whitepoint-adapted colourspace descriptor: primaries and whitepoint
    /// as xy chromaticity pairs. `name_override` replaces the profile's own
    /// `desc`/`mluc`-derived name when given.
    pub fn colourspace(&self, name_override: Option<&str>) -> Colourspace {
        let (primaries, wtpt, chad) = match &self.kind {
            ProfileKind::Matrix { primaries, wtpt, chad, .. } => (*primaries, *wtpt, chad.as_ref()),
            ProfileKind::Mab { primaries, wtpt, chad, .. } => (*primaries, *wtpt, chad.as_ref()),
        };

        let wt_prf_xy = recover_whitepoint(chad, wtpt);
        let primaries_xy = adapt_primaries(primaries, wt_prf_xy);

        Colourspace {
            name: name_override.map(str::to_string).unwrap_or_else(|| self.name.clone()),
            primaries_xy,
            whitepoint_xy: wt_prf_xy,
        }
    }

    /// Decode an encoded RGB pixel buffer into linear RGB, preserving
    /// shape. Values outside `[0, 1]` are permitted (HDR) and extrapolate
    /// rather than error; `decode` is infallible for any input once `open`
    /// has succeeded.
    pub fn decode(&self, pixels: &[[f32; 3]]) -> Vec<[f32; 3]> {
        crate::pixel::decode_pixels(self, pixels)
    }

    /// Like [`decode`](Self::decode), overwriting `pixels` in place.
    pub fn decode_in_place(&self, pixels: &mut [[f32; 3]]) {
        crate::pixel::decode_pixels_in_place(self, pixels)
    }

    pub fn version(&self) -> (u8, u8, u8) {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_pcs_d50(&self) -> bool {
        self.pcs_is_d50
    }

    /// True iff this profile classified as Matrix/TRC rather than `mAB`.
    pub fn is_matrix_trc(&self) -> bool {
        matches!(self.kind, ProfileKind::Matrix { .. })
    }

    pub(crate) fn matrix_trc(&self) -> Option<&ChannelTrc> {
        match &self.kind {
            ProfileKind::Matrix { trc, .. } => Some(trc),
            _ => None,
        }
    }

    pub(crate) fn mab_pipeline(&self) -> Option<&MabPipeline> {
        match &self.kind {
            ProfileKind::Mab { pipe, .. } => Some(pipe),
            _ => None,
        }
    }
}
