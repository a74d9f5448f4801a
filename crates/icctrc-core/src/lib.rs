//! # icctrc-core
//!
//! An ICC display-profile parser and tone-reproduction-curve (TRC) decoder.
//!
//! Given an embedded ICC v2/v4 profile as a raw byte buffer, this crate
//! parses the header and tag table, extracts the RGB primaries, whitepoint,
//! chromatic-adaptation matrix and per-channel transfer curves, constructs
//! a linear-RGB colourspace descriptor adapted to the profile's own
//! whitepoint, and decodes encoded RGB pixel arrays into linear RGB.
//!
//! Two profile classes are handled: Matrix/TRC ("sdr") profiles built from
//! `rXYZ`/`gXYZ`/`bXYZ` colorants and `rTRC`/`gTRC`/`bTRC` curves, and
//! A-to-B ("hdr") profiles carrying an `A2B0` tag of subtype `mAB`.
//!
//! This crate does not perform gamut mapping, rendering-intent-aware
//! colorimetry, or profile serialisation; it hands back primaries and a
//! whitepoint for a caller's own colour-science layer to consume.

#![forbid(unsafe_code)]

pub mod color;
pub mod error;
pub mod icc;
pub mod math;
pub mod pixel;
pub mod profile;

pub use error::{Error, Result};
pub use pixel::decode_pixels;
pub use profile::{Colourspace, Profile};
