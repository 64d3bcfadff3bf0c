//! wgpu buffers backing the terrain and the queue of edits waiting to reach them.

use std::ops::Range;

use tessera_mesh::TerrainMesh;
use tessera_splat::SplatPaintStore;
use thiserror::Error;
use wgpu::util::DeviceExt;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("{label} buffer needs {size} bytes, device limit is {limit}")]
    TooLarge {
        label: &'static str,
        size: u64,
        limit: u64,
    },
}

/// CPU-side edits not yet written to GPU buffers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingUploads {
    /// Vertex index ranges to rewrite.
    pub vertex_ranges: Vec<Range<usize>>,
    /// Row-major indices of splat patches to rewrite whole.
    pub splat_patches: Vec<usize>,
}

impl PendingUploads {
    pub fn is_empty(&self) -> bool {
        self.vertex_ranges.is_empty() && self.splat_patches.is_empty()
    }

    /// Queue a vertex range, merging it into an existing one it overlaps or touches.
    pub fn push_vertex_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        for existing in &mut self.vertex_ranges {
            if range.start <= existing.end && existing.start <= range.end {
                existing.start = existing.start.min(range.start);
                existing.end = existing.end.max(range.end);
                return;
            }
        }
        self.vertex_ranges.push(range);
    }

    pub fn push_splat_patches(&mut self, patches: impl IntoIterator<Item = usize>) {
        for patch in patches {
            if !self.splat_patches.contains(&patch) {
                self.splat_patches.push(patch);
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_ranges.iter().map(|r| r.len()).sum()
    }
}

/// Vertex, index and splat storage buffers for one terrain.
pub struct TerrainGpuBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    /// Per patch: index grid then weight grid, see
    /// [`SplatPaintStore::patch_byte_offset`].
    pub splat_buffer: wgpu::Buffer,
}

impl TerrainGpuBuffers {
    /// Create and fill every buffer from the current CPU state.
    pub fn create(
        device: &wgpu::Device,
        mesh: &TerrainMesh,
        splat: &SplatPaintStore,
    ) -> Result<Self, BufferError> {
        let limits = device.limits();
        let splat_size = (splat.patch_byte_len() * splat.patch_count()) as u64;
        check_size("splat", splat_size, limits.max_storage_buffer_binding_size as u64)?;
        let vertex_bytes: &[u8] = bytemuck::cast_slice(mesh.vertices());
        check_size("vertex", vertex_bytes.len() as u64, limits.max_buffer_size)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-vertices"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-indices"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let splat_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("terrain-splat"),
            size: splat_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!(
            "Terrain GPU buffers: {} vertices, {} indices, {} splat bytes",
            mesh.vertices().len(),
            mesh.indices().len(),
            splat_size
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            splat_buffer,
        })
    }

    /// Write every pending range and patch. Fire-and-forget: the queue
    /// orders these writes before later submissions.
    pub fn flush(
        &self,
        queue: &wgpu::Queue,
        mesh: &TerrainMesh,
        splat: &SplatPaintStore,
        uploads: &PendingUploads,
    ) {
        let stride = std::mem::size_of::<tessera_mesh::TerrainVertex>();
        for range in &uploads.vertex_ranges {
            let Some(vertices) = mesh.vertices().get(range.clone()) else {
                log::warn!("Skipping out-of-range vertex upload {range:?}");
                continue;
            };
            queue.write_buffer(
                &self.vertex_buffer,
                (range.start * stride) as u64,
                bytemuck::cast_slice(vertices),
            );
        }

        for &patch in &uploads.splat_patches {
            if patch >= splat.patch_count() {
                log::warn!("Skipping upload of unknown splat patch {patch}");
                continue;
            }
            let data = splat.patch_at(patch);
            queue.write_buffer(
                &self.splat_buffer,
                splat.patch_byte_offset(patch) as u64,
                data.index_bytes(),
            );
            queue.write_buffer(
                &self.splat_buffer,
                splat.patch_weight_offset(patch) as u64,
                data.weight_bytes(),
            );
        }

        if !uploads.is_empty() {
            log::debug!(
                "Flushed {} vertices in {} ranges, {} splat patches",
                uploads.vertex_count(),
                uploads.vertex_ranges.len(),
                uploads.splat_patches.len()
            );
        }
    }

    /// Bind vertex and index buffers for per-patch draws.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }
}

fn check_size(label: &'static str, size: u64, limit: u64) -> Result<(), BufferError> {
    if size > limit {
        return Err(BufferError::TooLarge { label, size, limit });
    }
    Ok(())
}
