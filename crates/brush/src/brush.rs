//! Brush descriptors and the brush catalog
//!
//! A [`BrushDescriptor`] is immutable while in use: strokes share it through
//! an `Arc` handed out by the [`BrushCatalog`] and never modify it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::constants::{DEFAULT_MIN_SEGMENT_LENGTH, MAX_TUBE_SIDES, MIN_TUBE_SIDES};
use crate::types::GeometryKind;

/// Audio-driven modulation applied to incoming pressure
#[derive(Debug, Clone, PartialEq)]
pub struct AudioReactiveParams {
    /// Scale pressure by the audio level
    pub modulate_size: bool,
    /// Multiplier at level 0 and level 1
    pub size_multiplier_range: [f32; 2],
}

impl Default for AudioReactiveParams {
    fn default() -> Self {
        Self {
            modulate_size: false,
            size_multiplier_range: [0.5, 2.0],
        }
    }
}

impl AudioReactiveParams {
    /// Pressure multiplier for an audio level in 0.0-1.0
    pub fn size_multiplier(&self, level: f32) -> f32 {
        if !self.modulate_size {
            return 1.0;
        }
        lerp(
            self.size_multiplier_range[0],
            self.size_multiplier_range[1],
            level.clamp(0.0, 1.0),
        )
    }
}

/// Brush configuration shared by every stroke drawn with it
#[derive(Debug, Clone, PartialEq)]
pub struct BrushDescriptor {
    /// Unique id, used as the key in saved scenes
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// How geometry is generated
    pub kind: GeometryKind,
    /// Allowed stroke size (min, max) in meters
    pub size_range: [f32; 2],
    /// Size used when none is requested
    pub default_size: f32,
    /// Per-particle size jitter (0.0-1.0) for particle/spray brushes
    pub size_variance: f32,
    /// Size multiplier at pressure 0 and pressure 1
    pub pressure_range: [f32; 2],
    /// Opacity at pressure 0 and pressure 1
    pub opacity_range: [f32; 2],
    /// Opacity multiplier applied on top of the pressure mapping
    pub base_opacity: f32,
    /// Points closer than this to the previous point are rejected
    pub min_segment_length: f32,
    /// Emit a second, reversed triangle set
    pub render_backfaces: bool,
    /// Tube ring resolution (clamped to 3-32 on use)
    pub tube_sides: u32,
    /// Spray particles per meter of path
    pub particle_rate: f32,
    /// Maximum random in-plane particle rotation in degrees
    pub particle_rotation_range: f32,
    /// Audio-reactive behavior, if any
    pub audio: Option<AudioReactiveParams>,
}

impl Default for BrushDescriptor {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            display_name: "Default".to_string(),
            kind: GeometryKind::Ribbon,
            size_range: [0.001, 0.1],
            default_size: 0.02,
            size_variance: 0.0,
            pressure_range: [0.1, 1.0],
            opacity_range: [0.5, 1.0],
            base_opacity: 1.0,
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
            render_backfaces: false,
            tube_sides: 8,
            particle_rate: 100.0,
            particle_rotation_range: 360.0,
            audio: None,
        }
    }
}

impl BrushDescriptor {
    /// Create a descriptor with default parameters for the given geometry kind
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, kind: GeometryKind) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            ..Default::default()
        }
    }

    /// Clamp a requested stroke size into the brush size range
    pub fn clamp_size(&self, size: f32) -> f32 {
        size.clamp(self.size_range[0], self.size_range[1])
    }

    /// Stroke width for a base size and pressure
    pub fn pressured_size(&self, base_size: f32, pressure: f32) -> f32 {
        lerp(self.pressure_range[0], self.pressure_range[1], pressure) * base_size
    }

    /// Stroke opacity for a pressure
    pub fn pressured_opacity(&self, pressure: f32) -> f32 {
        lerp(self.opacity_range[0], self.opacity_range[1], pressure) * self.base_opacity
    }

    /// Tube side count clamped to the supported range
    pub fn sides(&self) -> usize {
        self.tube_sides.clamp(MIN_TUBE_SIDES, MAX_TUBE_SIDES) as usize
    }

    /// Whether incoming pressure should follow the audio level
    pub fn modulates_size(&self) -> bool {
        self.audio.as_ref().is_some_and(|a| a.modulate_size)
    }

    /// Stable seed for this brush's pseudo-random streams (FNV-1a of the id)
    pub fn seed(&self) -> u64 {
        self.id
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
            })
    }
}

/// Lookup of brushes by id
#[derive(Debug, Clone, Default)]
pub struct BrushCatalog {
    brushes: HashMap<String, Arc<BrushDescriptor>>,
    /// Registration order, for stable listing
    order: Vec<String>,
}

impl BrushCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// One preset per geometry kind plus an audio-reactive ribbon
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.register(BrushDescriptor {
            size_range: [0.001, 0.1],
            default_size: 0.02,
            render_backfaces: true,
            ..BrushDescriptor::new("flat", "Flat", GeometryKind::Ribbon)
        });
        catalog.register(BrushDescriptor {
            size_range: [0.002, 0.05],
            default_size: 0.015,
            tube_sides: 12,
            ..BrushDescriptor::new("tube", "Tube", GeometryKind::Tube)
        });
        catalog.register(BrushDescriptor {
            size_range: [0.01, 0.1],
            default_size: 0.03,
            ..BrushDescriptor::new("diamond", "Diamond", GeometryKind::Hull)
        });
        catalog.register(BrushDescriptor {
            size_range: [0.002, 0.025],
            default_size: 0.008,
            size_variance: 0.8,
            particle_rate: 40.0,
            ..BrushDescriptor::new("stars", "Stars", GeometryKind::Particle)
        });
        catalog.register(BrushDescriptor {
            size_range: [0.003, 0.05],
            default_size: 0.015,
            size_variance: 0.7,
            particle_rate: 80.0,
            ..BrushDescriptor::new("splatter", "Splatter", GeometryKind::Spray)
        });
        catalog.register(BrushDescriptor {
            size_range: [0.005, 0.08],
            default_size: 0.02,
            render_backfaces: true,
            ..BrushDescriptor::new("slice", "Slice", GeometryKind::Slice)
        });
        catalog.register(BrushDescriptor {
            size_range: [0.005, 0.08],
            default_size: 0.02,
            audio: Some(AudioReactiveParams {
                modulate_size: true,
                size_multiplier_range: [0.5, 3.0],
            }),
            ..BrushDescriptor::new("waveform", "Waveform", GeometryKind::Ribbon)
        });

        catalog
    }

    /// Add or replace a brush, returning the shared handle
    pub fn register(&mut self, brush: BrushDescriptor) -> Arc<BrushDescriptor> {
        let id = brush.id.clone();
        let brush = Arc::new(brush);
        if self.brushes.insert(id.clone(), Arc::clone(&brush)).is_none() {
            self.order.push(id.clone());
        }
        debug!("BrushCatalog::register: {} ({:?})", id, brush.kind);
        brush
    }

    /// Look up a brush by id
    pub fn get(&self, id: &str) -> Option<Arc<BrushDescriptor>> {
        self.brushes.get(id).cloned()
    }

    /// Brush ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// First registered brush of a geometry kind
    pub fn first_of_kind(&self, kind: GeometryKind) -> Option<Arc<BrushDescriptor>> {
        self.order
            .iter()
            .filter_map(|id| self.brushes.get(id))
            .find(|b| b.kind == kind)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
