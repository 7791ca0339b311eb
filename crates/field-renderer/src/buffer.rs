//! Reusable fixed-capacity vertex/index storage

use bytemuck::Pod;

/// Outcome of [`IndexedVertexBuffer::reserve_exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// Capacity unchanged, storage overwritten in place
    Reused,
    /// Capacity changed, storage replaced. The GPU-side buffer must be recreated.
    Reallocated,
}

/// Indexed vertex data with a fixed capacity and write cursors.
///
/// Capacity is chosen up front and never grows while writing: pushes past the
/// end are refused. Retracing calls [`begin`](Self::begin) (or
/// [`reserve_exact`](Self::reserve_exact) when the budget changed) and writes
/// from the start again.
#[derive(Debug, Clone)]
pub struct IndexedVertexBuffer<V> {
    vertices: Vec<V>,
    indices: Vec<u32>,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl<V: Pod> Default for IndexedVertexBuffer<V> {
    fn default() -> Self {
        Self::with_capacity(0, 0)
    }
}

impl<V: Pod> IndexedVertexBuffer<V> {
    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
            vertex_capacity,
            index_capacity,
        }
    }

    /// Reset the write cursors, keeping storage.
    pub fn begin(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Reset for a new trace with exactly these capacities.
    pub fn reserve_exact(&mut self, vertex_capacity: usize, index_capacity: usize) -> Allocation {
        if vertex_capacity == self.vertex_capacity && index_capacity == self.index_capacity {
            self.begin();
            return Allocation::Reused;
        }

        log::debug!(
            "Reallocating vertex buffer: {}/{} -> {}/{} (vertices/indices)",
            self.vertex_capacity,
            self.index_capacity,
            vertex_capacity,
            index_capacity
        );
        *self = Self::with_capacity(vertex_capacity, index_capacity);
        Allocation::Reallocated
    }

    pub fn vertex_capacity(&self) -> usize {
        self.vertex_capacity
    }

    pub fn index_capacity(&self) -> usize {
        self.index_capacity
    }

    /// True when `vertices` more vertices and `indices` more indices fit.
    pub fn has_room(&self, vertices: usize, indices: usize) -> bool {
        self.vertices.len() + vertices <= self.vertex_capacity
            && self.indices.len() + indices <= self.index_capacity
    }

    /// Append a vertex, returning its index, or `None` when full.
    pub fn push_vertex(&mut self, vertex: V) -> Option<u32> {
        if self.vertices.len() >= self.vertex_capacity {
            return None;
        }
        let index = u32::try_from(self.vertices.len()).ok()?;
        self.vertices.push(vertex);
        Some(index)
    }

    /// Append indices. All or nothing: refused when they don't all fit.
    pub fn push_indices(&mut self, indices: &[u32]) -> bool {
        if self.indices.len() + indices.len() > self.index_capacity {
            return false;
        }
        self.indices.extend_from_slice(indices);
        true
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Sizes in bytes of GPU buffers able to hold the full capacity.
    pub fn capacity_bytes(&self) -> (u64, u64) {
        (
            (self.vertex_capacity * std::mem::size_of::<V>()) as u64,
            (self.index_capacity * std::mem::size_of::<u32>()) as u64,
        )
    }
}
