use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// One sampled pose along a drawn path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    /// World-space position in meters
    pub position: Vec3,
    /// Controller/hand orientation at the sample
    pub orientation: Quat,
    /// Smoothed pressure, always within 0.0-1.0
    pub pressure: f32,
    /// Seconds since the stroke started
    pub timestamp: f32,
}

impl ControlPoint {
    pub fn new(position: Vec3, orientation: Quat, pressure: f32) -> Self {
        Self {
            position,
            orientation,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp: 0.0,
        }
    }

    /// Up axis of the sample orientation
    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Forward axis of the sample orientation
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

/// Cross-section/topology strategy used to turn a path into a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// Flat two-vertex-wide strip
    #[default]
    Ribbon,
    /// Smooth N-sided tube
    Tube,
    /// Faceted hexagonal hull with flat shading and end caps
    Hull,
    /// One billboard quad per control point
    Particle,
    /// Quads scattered around the path
    Spray,
    /// Quads facing along the direction of motion
    Slice,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 6] = [
        GeometryKind::Ribbon,
        GeometryKind::Tube,
        GeometryKind::Hull,
        GeometryKind::Particle,
        GeometryKind::Spray,
        GeometryKind::Slice,
    ];

    /// Fewest control points that produce any geometry
    pub fn min_points(self) -> usize {
        match self {
            GeometryKind::Particle => 1,
            GeometryKind::Hull => 3,
            GeometryKind::Ribbon
            | GeometryKind::Tube
            | GeometryKind::Spray
            | GeometryKind::Slice => 2,
        }
    }
}

/// 8-bit vertex color
///
/// Laid out for direct upload to a vertex buffer with bytemuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Quantize an RGBA float color, replacing alpha with `opacity * color.a`
    pub fn with_opacity(color: [f32; 4], opacity: f32) -> Self {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: quantize(color[0]),
            g: quantize(color[1]),
            b: quantize(color[2]),
            a: ((opacity * color[3]).clamp(0.0, 1.0) * 255.0) as u8,
        }
    }

    /// Convert back to floats (0.0-1.0)
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_point_clamps_pressure() {
        let cp = ControlPoint::new(Vec3::ZERO, Quat::IDENTITY, 1.7);
        assert_eq!(cp.pressure, 1.0);
        let cp = ControlPoint::new(Vec3::ZERO, Quat::IDENTITY, -0.2);
        assert_eq!(cp.pressure, 0.0);
    }

    #[test]
    fn test_min_points() {
        assert_eq!(GeometryKind::Particle.min_points(), 1);
        assert_eq!(GeometryKind::Ribbon.min_points(), 2);
        assert_eq!(GeometryKind::Hull.min_points(), 3);
    }

    #[test]
    fn test_geometry_kind_serializes_lowercase() {
        let json = serde_json::to_string(&GeometryKind::Spray).unwrap();
        assert_eq!(json, "\"spray\"");
        let kind: GeometryKind = serde_json::from_str("\"hull\"").unwrap();
        assert_eq!(kind, GeometryKind::Hull);
    }

    #[test]
    fn test_rgba8_opacity() {
        let c = Rgba8::with_opacity([1.0, 0.5, 0.0, 1.0], 0.5);
        assert_eq!(c.r, 255);
        assert_eq!(c.g, 128);
        assert_eq!(c.b, 0);
        assert_eq!(c.a, 127);
        assert_eq!(std::mem::size_of::<Rgba8>(), 4);
    }
}
