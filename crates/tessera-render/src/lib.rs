//! GPU-facing side of the terrain: frustum culling of patches, the draw-call
//! sink abstraction, wgpu buffers for vertices, indices and splat storage, a
//! headless device and a minimal camera.

pub mod buffers;
pub mod camera;
pub mod draw;
pub mod frustum;
pub mod gpu;

pub use buffers::{BufferError, PendingUploads, TerrainGpuBuffers};
pub use camera::{Camera, CameraView};
pub use draw::{PatchDrawCall, PatchDrawSink};
pub use frustum::{CullSettings, CullTest, DepthRange, Frustum, FrustumCuller};
pub use gpu::{GpuError, HeadlessGpu};
