/// Default minimum distance between consecutive control points (meters).
pub const DEFAULT_MIN_SEGMENT_LENGTH: f32 = 0.002;

/// Base of the distance-keyed pressure decay (`k = base ^ (d / window)`).
pub const PRESSURE_DECAY_BASE: f32 = 0.1;

/// Squared-length threshold below which a cross product is treated as degenerate.
pub const FRAME_EPSILON: f32 = 0.0001;

/// Squared-length threshold below which a tangent falls back to world forward.
pub const TANGENT_EPSILON: f32 = 0.001;

/// Tube side count limits.
pub const MIN_TUBE_SIDES: u32 = 3;
pub const MAX_TUBE_SIDES: u32 = 32;

/// Hull cross-sections are always hexagonal.
pub const HULL_SIDES: usize = 6;

/// Radial symmetry copy count limits (including the source stroke).
pub const MIN_RADIAL_COUNT: u32 = 2;
pub const MAX_RADIAL_COUNT: u32 = 12;

/// Spray particles scatter within this multiple of the stroke's base size.
pub const SPRAY_RADIUS_SCALE: f32 = 2.0;

/// Lowest opacity multiplier a spray particle can roll.
pub const SPRAY_MIN_OPACITY: f32 = 0.5;

/// Scene record schema version written by the encoder.
pub const SCENE_FORMAT_VERSION: &str = "1.1";

/// Name given to the layer created when a scene has none.
pub const DEFAULT_LAYER_NAME: &str = "Layer 1";
