//! Pooled geometry buffers
//!
//! Strokes regenerate their mesh every frame while being drawn. Rather than
//! allocating fresh vertex/index storage each time, every stroke borrows one
//! [`GeometryBuffer`] from a [`GeometryBufferPool`] and hands it back when the
//! stroke is discarded. Buffers keep their capacity across loans.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use brushwork_config::PoolConfig;
use glam::{Vec2, Vec3};
use tracing::{debug, info};

use crate::types::Rgba8;

/// Buffer ids are unique across every pool in the process
static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Id of a buffer that no pool lent
const DETACHED_ID: u64 = 0;

/// Vertex and index streams for one stroke mesh
///
/// Not clonable: a buffer is on loan to exactly one stroke at a time.
#[derive(Debug)]
pub struct GeometryBuffer {
    /// Process-unique identity, used to catch foreign or repeated releases
    id: u64,
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub colors: Vec<Rgba8>,
    pub indices: Vec<u32>,
}

impl GeometryBuffer {
    fn with_capacity(id: u64, vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            id,
            vertices: Vec::with_capacity(vertex_capacity),
            normals: Vec::with_capacity(vertex_capacity),
            uvs: Vec::with_capacity(vertex_capacity),
            colors: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
        }
    }

    /// Empty placeholder left behind when a buffer goes back to its pool
    pub(crate) fn detached() -> Self {
        Self::with_capacity(DETACHED_ID, 0, 0)
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.id == DETACHED_ID
    }

    /// Pool-assigned identity
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Empty all streams, keeping their capacity
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smallest capacity across the per-vertex streams
    pub fn vertex_capacity(&self) -> usize {
        self.vertices
            .capacity()
            .min(self.normals.capacity())
            .min(self.uvs.capacity())
            .min(self.colors.capacity())
    }

    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Grow storage to the next power of two at or above the requested counts.
    ///
    /// Never shrinks; a no-op when the current capacity already suffices.
    pub fn ensure_capacity(&mut self, vertex_count: usize, index_count: usize) {
        if self.vertex_capacity() < vertex_count {
            let target = vertex_count.next_power_of_two();
            grow_to(&mut self.vertices, target);
            grow_to(&mut self.normals, target);
            grow_to(&mut self.uvs, target);
            grow_to(&mut self.colors, target);
            debug!(
                "GeometryBuffer::ensure_capacity: buffer {} vertices -> {}",
                self.id, target
            );
        }

        if self.indices.capacity() < index_count {
            let target = index_count.next_power_of_two();
            grow_to(&mut self.indices, target);
            debug!(
                "GeometryBuffer::ensure_capacity: buffer {} indices -> {}",
                self.id, target
            );
        }
    }

    /// Append one vertex and return its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2, color: Rgba8) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        self.uvs.push(uv);
        self.colors.push(color);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append a quad `v0 v1 v2 v3` (counter-clockwise) as two triangles,
    /// optionally followed by the reversed pair
    pub fn push_quad(&mut self, v: [u32; 4], backfaces: bool) {
        self.push_triangle(v[0], v[1], v[2]);
        self.push_triangle(v[0], v[2], v[3]);
        if backfaces {
            self.push_triangle(v[0], v[2], v[1]);
            self.push_triangle(v[0], v[3], v[2]);
        }
    }

    /// Convert to a Bevy mesh
    #[cfg(feature = "bevy")]
    pub fn to_bevy_mesh(&self) -> bevy::prelude::Mesh {
        use bevy::asset::RenderAssetUsages;
        use bevy::mesh::{Indices, PrimitiveTopology};
        use bevy::prelude::Mesh;

        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.to_array()).collect();
        let normals: Vec<[f32; 3]> = self.normals.iter().map(|n| n.to_array()).collect();
        let uvs: Vec<[f32; 2]> = self.uvs.iter().map(|uv| uv.to_array()).collect();
        let colors: Vec<[f32; 4]> = self.colors.iter().map(|c| c.to_f32_array()).collect();

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        mesh
    }
}

fn grow_to<T>(v: &mut Vec<T>, capacity: usize) {
    if v.capacity() < capacity {
        v.reserve_exact(capacity - v.len());
    }
}

/// Pool usage counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Buffers created and not yet trimmed
    pub total_allocated: usize,
    /// Buffers idle in the free-list
    pub unused: usize,
    /// Buffers currently on loan
    pub in_use: usize,
    /// Highest number of simultaneous loans seen
    pub peak_usage: usize,
}

/// Free-list allocator for [`GeometryBuffer`]s
///
/// Passed explicitly to whatever creates strokes; there is no global pool.
#[derive(Debug)]
pub struct GeometryBufferPool {
    /// Idle buffers, most recently released last
    free: Vec<GeometryBuffer>,
    /// Ids of buffers currently on loan
    on_loan: HashSet<u64>,
    total_allocated: usize,
    peak_usage: usize,
    config: PoolConfig,
}

impl Default for GeometryBufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl GeometryBufferPool {
    /// Create an empty pool
    pub fn new(config: PoolConfig) -> Self {
        Self {
            free: Vec::new(),
            on_loan: HashSet::new(),
            total_allocated: 0,
            peak_usage: 0,
            config,
        }
    }

    /// Take a buffer from the free-list, allocating only when it is empty
    pub fn acquire(&mut self) -> GeometryBuffer {
        let mut buffer = match self.free.pop() {
            Some(buffer) => buffer,
            None => {
                let id = NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed);
                self.total_allocated += 1;
                debug!(
                    "GeometryBufferPool::acquire: allocated buffer {} ({} total)",
                    id, self.total_allocated
                );
                GeometryBuffer::with_capacity(
                    id,
                    self.config.initial_vertex_capacity,
                    self.config.initial_index_capacity,
                )
            }
        };

        buffer.clear();
        self.on_loan.insert(buffer.id);
        self.peak_usage = self.peak_usage.max(self.on_loan.len());
        buffer
    }

    /// Return a buffer to the free-list.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is not currently on loan from this pool.
    pub fn release(&mut self, mut buffer: GeometryBuffer) {
        assert!(
            self.on_loan.remove(&buffer.id),
            "geometry buffer {} released to a pool that did not lend it",
            buffer.id
        );
        buffer.clear();
        self.free.push(buffer);
    }

    /// Drop idle buffers until at most `max_cached` remain
    pub fn trim(&mut self, max_cached: usize) {
        let excess = self.free.len().saturating_sub(max_cached);
        if excess == 0 {
            return;
        }
        self.free.truncate(max_cached);
        self.total_allocated -= excess;
        info!(
            "GeometryBufferPool::trim: dropped {} idle buffers ({} remain allocated)",
            excess, self.total_allocated
        );
    }

    /// Trim down to the configured cache size
    pub fn trim_to_config(&mut self) {
        self.trim(self.config.max_cached);
    }

    /// Whether a buffer id is currently on loan
    pub fn is_on_loan(&self, id: u64) -> bool {
        self.on_loan.contains(&id)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_allocated: self.total_allocated,
            unused: self.free.len(),
            in_use: self.on_loan.len(),
            peak_usage: self.peak_usage,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}
