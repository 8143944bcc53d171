//! # WaveKit Core
//!
//! Core types shared across the WaveKit crates: the error taxonomy and
//! planar geometry.

pub mod error;
pub mod geometry;

pub use error::{Error, GcodeError, ParameterError, Result};
pub use geometry::Point2D;
