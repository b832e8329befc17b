//! GPU compute backend using WebGPU (wgpu).
//!
//! Hosts the ping-pong Stockham FFT and the discrete Game of Life
//! compute shader. Both paths exist purely for throughput; they are
//! numerically interchangeable with the host-side implementations.

mod fft;
mod game_of_life;

pub use fft::GpuFft;
pub use game_of_life::GpuGameOfLife;

/// Error type for GPU operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),
}

/// Shared device/queue handle for the compute paths.
pub(crate) struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire a high-performance adapter and a default device.
    pub async fn acquire() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        log::info!("using GPU adapter: {}", adapter.get_info().name);

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("SmoothLife GPU"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;

        Ok(Self { device, queue })
    }

    /// Blocking readback of a mapped staging buffer into a float vector.
    ///
    /// A step is atomic: this waits for all queued work, so callers never
    /// observe a half-computed result. A stalled device is fatal.
    pub fn read_staging(&self, staging: &wgpu::Buffer, floats: usize) -> Vec<f32> {
        let buffer_slice = staging.slice(..);

        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });

        self.device.poll(wgpu::PollType::wait_indefinitely()).ok();
        rx.recv().unwrap().unwrap();

        let result = {
            let data = buffer_slice.get_mapped_range();
            let slice: &[f32] = bytemuck::cast_slice(&data);
            slice[..floats].to_vec()
        };

        staging.unmap();
        result
    }
}
