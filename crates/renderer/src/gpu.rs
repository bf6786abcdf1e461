//! wgpu backend: synthesized programs become render pipelines.
//!
//! Each [`GpuProgram`] owns its pipeline together with a uniform buffer sized
//! for its `FilterParams` block. The block grows with the chain, so buffers
//! are not shared across rebuilds.

use std::borrow::Cow;

use anyhow::{anyhow, Context, Result};
use bytemuck::{Pod, Zeroable};
use huechain::{SpectrumAxis, Vec3};
use wgpu::naga::ShaderStage;

use crate::program::ProgramBackend;
use crate::synth::{SynthError, SynthesizedProgram, VERTEX_GLSL};
use crate::types::SynthesizerConfig;
use crate::uniforms::FilterUniforms;

/// Vertex of a preview quad. `hsl` is normalized, hue included.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpectrumVertex {
    pub position: [f32; 2],
    pub hsl: [f32; 3],
}

impl SpectrumVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles over clip space sweeping `base` (normalized HSL) the way
/// [`huechain::render_spectrum`] does: `x_axis` runs left to right and
/// `y_axis` top to bottom, each reversed when inverted. Components are
/// linear in position, so interpolation reproduces the host sweep at every
/// pixel center.
pub fn spectrum_quad(
    base: Vec3,
    x_axis: SpectrumAxis,
    invert_x: bool,
    y_axis: SpectrumAxis,
    invert_y: bool,
) -> [SpectrumVertex; 6] {
    let along = |t: f32, invert: bool| if invert { 1.0 - t } else { t };
    let corner = |x: f32, y: f32| {
        let row = y_axis.sweep(base, along((1.0 - y) * 0.5, invert_y));
        let hsl = x_axis.sweep(row, along((x + 1.0) * 0.5, invert_x));
        SpectrumVertex {
            position: [x, y],
            hsl: [hsl.x, hsl.y, hsl.z],
        }
    };
    [
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, -1.0),
        corner(1.0, 1.0),
        corner(-1.0, 1.0),
    ]
}

pub struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    byte_size: usize,
}

impl GpuProgram {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Writes this frame's slots and visibility.
    pub fn upload(&self, queue: &wgpu::Queue, uniforms: &FilterUniforms) -> Result<(), SynthError> {
        let bytes = uniforms.as_bytes();
        if bytes.len() != self.byte_size {
            return Err(SynthError::UniformMismatch {
                what: "bytes",
                expected: self.byte_size,
                found: bytes.len(),
            });
        }
        queue.write_buffer(&self.uniform_buffer, 0, bytes);
        Ok(())
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, vertices: &wgpu::Buffer, vertex_count: u32) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, vertices.slice(..));
        pass.draw(0..vertex_count, 0..1);
    }
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    vertex_module: wgpu::ShaderModule,
    label: String,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
        config: &SynthesizerConfig,
    ) -> Result<Self> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("filter params layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("filter pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spectrum vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(VERTEX_GLSL),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow!("failed to compile spectrum vertex shader: {err}"));
        }

        Ok(Self {
            device,
            queue,
            target_format,
            uniform_layout,
            pipeline_layout,
            vertex_module,
            label: config.label.clone(),
        })
    }

    /// Creates its own device on the default adapter, without a surface.
    pub fn headless(target_format: wgpu::TextureFormat, config: &SynthesizerConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;
        tracing::debug!(adapter = ?adapter.get_info(), "selected GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("huechain device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_hints: wgpu::MemoryHints::default(),
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        Self::new(device, queue, target_format, config)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }
}

impl ProgramBackend for WgpuBackend {
    type Program = GpuProgram;

    fn compile(&mut self, program: &SynthesizedProgram) -> Result<GpuProgram, String> {
        let label = self.label.as_str();
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let fragment_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(program.fragment.as_str()),
                stage: ShaderStage::Fragment,
                defines: &[],
            },
        });
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.vertex_module,
                    entry_point: Some("main"),
                    buffers: &[SpectrumVertex::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some("main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.target_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview: None,
                cache: None,
            });
        // The failed module and pipeline are dropped here along with the error.
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(err.to_string());
        }

        let byte_size = program.layout.byte_size();
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("filter params"),
            size: byte_size as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("filter params bind group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Ok(GpuProgram {
            pipeline,
            uniform_buffer,
            bind_group,
            byte_size,
        })
    }

    fn release(&mut self, program: GpuProgram) {
        program.uniform_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_quad_sweeps_hue_left_to_right() {
        let base = Vec3::new(0.25, 1.0, 0.5);
        let quad = spectrum_quad(base, SpectrumAxis::Hue, false, SpectrumAxis::None, false);
        assert_eq!(quad[0].hsl, [0.0, 1.0, 0.5]);
        assert_eq!(quad[2].hsl, [1.0, 1.0, 0.5]);
        assert_eq!(std::mem::size_of::<SpectrumVertex>(), 20);
        assert_eq!(SpectrumVertex::layout().array_stride, 20);

        let still = spectrum_quad(base, SpectrumAxis::None, true, SpectrumAxis::None, true);
        assert!(still.iter().all(|vertex| vertex.hsl == [0.25, 1.0, 0.5]));
    }

    #[test]
    fn spectrum_quad_y_axis_starts_at_the_top() {
        let base = Vec3::new(0.5, 0.5, 0.5);
        let quad = spectrum_quad(base, SpectrumAxis::None, false, SpectrumAxis::Lightness, false);
        // quad[2] is the top right corner, quad[1] the bottom right.
        assert_eq!(quad[2].hsl, [0.5, 0.5, 0.0]);
        assert_eq!(quad[1].hsl, [0.5, 0.5, 1.0]);

        let inverted = spectrum_quad(base, SpectrumAxis::None, false, SpectrumAxis::Lightness, true);
        assert_eq!(inverted[2].hsl, [0.5, 0.5, 1.0]);
        assert_eq!(inverted[1].hsl, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn spectrum_quad_combines_inverted_axes() {
        let base = Vec3::new(0.1, 0.2, 0.3);
        let quad = spectrum_quad(base, SpectrumAxis::Saturation, true, SpectrumAxis::Hue, true);
        // Bottom left: inverted x starts at 1, inverted y ends at 0.
        assert_eq!(quad[0].hsl, [0.0, 1.0, 0.3]);
        // Top right.
        assert_eq!(quad[2].hsl, [1.0, 0.0, 0.3]);
    }
}
