//! Brushwork - stroke geometry for 3D painting
//!
//! This crate turns a live stream of brush poses into renderable meshes:
//! - [`types::ControlPoint`] - One sampled pose (position, orientation, pressure)
//! - [`brush`] - Brush descriptors and the built-in catalog
//! - [`smoothing`] - Pressure and position smoothing
//! - [`frame`] - Twist-free cross-section frames (parallel transport)
//! - [`generators`] - Ribbon, tube, hull, particle, spray and slice meshes
//! - [`pool`] - Reusable geometry buffers
//! - [`stroke`] - A stroke and its generated mesh
//! - [`mirror`] - Reflected and radial copies of finished strokes
//! - [`record`] - Saved-scene JSON format
//! - [`session`] - Complete painting session

pub mod brush;
pub mod constants;
pub mod frame;
pub mod generators;
pub mod mirror;
pub mod pool;
pub mod record;
pub mod session;
pub mod smoothing;
pub mod stroke;
pub mod types;

pub use brush::*;
pub use constants::*;
pub use frame::*;
pub use generators::*;
pub use mirror::*;
pub use pool::*;
pub use record::*;
pub use session::*;
pub use smoothing::*;
pub use stroke::*;
pub use types::*;
