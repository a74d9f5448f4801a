//! Color space types and conversions
//!
//! This module provides:
//! - CIE XYZ color space
//! - White point definitions
//!
//! Lab/RGB primitives are out of scope: the core hands back XYZ/xy pairs
//! and never touches CMYK/Lab PCS (see crate-level Non-goals).

pub mod white_point;
pub mod xyz;

pub use white_point::{WhitePoint, D50, D55, D60, D65, D75, DCI_P3};
pub use xyz::Xyz;
