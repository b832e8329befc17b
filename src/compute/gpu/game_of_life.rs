//! GPU-stepped discrete Game of Life.
//!
//! Same B3/S23 toroidal rule as the CPU
//! [`GameOfLife`](crate::compute::GameOfLife), dispatched as one compute
//! pass per generation over a ping-pong pair of cell buffers.

use rand::thread_rng;

use super::{GpuContext, GpuError};
use crate::compute::matrix::RealMatrix;
use crate::schema::uniform_cells;

const GOL_SHADER: &str = include_str!("shaders/game_of_life.wgsl");

/// Uniform buffer struct for the life shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GolParams {
    width: u32,
    height: u32,
    _pad0: u32,
    _pad1: u32,
}

/// Game of Life stepped by a compute shader.
pub struct GpuGameOfLife {
    context: GpuContext,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    cell_buffers: [wgpu::Buffer; 2],
    staging: wgpu::Buffer,
    height: usize,
    width: usize,
    generation: u64,
}

impl GpuGameOfLife {
    /// Acquire a device, build the pipeline and seed a random field.
    pub async fn new(height: usize, width: usize) -> Result<Self, GpuError> {
        let context = GpuContext::acquire().await?;
        let device = &context.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Game of Life Shader"),
            source: wgpu::ShaderSource::Wgsl(GOL_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Game of Life Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Game of Life Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            ..Default::default()
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Game of Life Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Game of Life Params"),
            size: std::mem::size_of::<GolParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let params = GolParams {
            width: width as u32,
            height: height as u32,
            _pad0: 0,
            _pad1: 0,
        };
        context
            .queue
            .write_buffer(&params_buffer, 0, bytemuck::bytes_of(&params));

        let buffer_size = (height * width * std::mem::size_of::<f32>()) as u64;
        let make_cells = |label| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: buffer_size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        };
        let cell_buffers = [make_cells("Cell Buffer A"), make_cells("Cell Buffer B")];
        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Staging Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut life = Self {
            context,
            pipeline,
            bind_group_layout,
            params_buffer,
            cell_buffers,
            staging,
            height,
            width,
            generation: 0,
        };
        life.restart(true);
        Ok(life)
    }

    /// Monotonic generation counter; parity selects the current buffer.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reset the generation counter and reseed the current buffer:
    /// `floor(n^0.8)` random live cells when `randomize`, all dead
    /// otherwise.
    pub fn restart(&mut self, randomize: bool) {
        self.generation = 0;
        let field = if randomize {
            uniform_cells(self.height, self.width, &mut thread_rng())
        } else {
            RealMatrix::zeros(self.height, self.width)
        };
        self.upload_field(&field);
    }

    /// Replace the current buffer with an explicit field and reset the
    /// generation counter.
    pub fn set_field(&mut self, field: &RealMatrix) {
        assert_eq!(
            field.shape(),
            (self.height, self.width),
            "field shape does not match automaton shape"
        );
        self.generation = 0;
        self.upload_field(field);
    }

    fn upload_field(&self, field: &RealMatrix) {
        let current = &self.cell_buffers[(self.generation % 2) as usize];
        self.context
            .queue
            .write_buffer(current, 0, bytemuck::cast_slice(field.as_slice()));
    }

    /// Advance one generation. Blocks until the dispatch completed, so the
    /// next readback never observes a partial generation.
    pub fn step(&mut self) {
        let cur = (self.generation % 2) as usize;
        let (src, dst) = (&self.cell_buffers[cur], &self.cell_buffers[1 - cur]);

        let bind_group = self
            .context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Game of Life Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.params_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: src.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: dst.as_entire_binding(),
                    },
                ],
            });

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Step Encoder"),
                });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Game of Life Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(
                (self.width as u32).div_ceil(16),
                (self.height as u32).div_ceil(16),
                1,
            );
        }
        self.context.queue.submit(std::iter::once(encoder.finish()));
        self.generation += 1;
    }

    /// Read the current field back to the host.
    pub fn current_field(&self) -> RealMatrix {
        let n = self.height * self.width;
        let current = &self.cell_buffers[(self.generation % 2) as usize];

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Readback Encoder"),
                });
        encoder.copy_buffer_to_buffer(current, 0, &self.staging, 0, (n * 4) as u64);
        self.context.queue.submit(std::iter::once(encoder.finish()));

        let data = self.context.read_staging(&self.staging, n);
        RealMatrix::from_flat(self.height, self.width, data)
    }
}
