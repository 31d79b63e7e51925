use bytemuck::{Pod, Zeroable};
use quadlife::constants::{BACKGROUND_COLOR, GRID_OVERLAY_COLOR, PARTICLE_DRAW_RADIUS};
use quadlife::{Rect, RenderParticle};
use std::sync::Arc;
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

/// Failures while bringing up the drawable surface. All are fatal.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create GPU surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

// --- GPU Data Structures ---

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GlobalUniforms {
    screen_resolution: [f32; 2],
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

// Layout must match `vs_particle` locations 1..=3.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ParticleGpuData {
    position: [f32; 2],
    radius: f32,
    _padding: f32,
    color: [f32; 4],
}

impl ParticleGpuData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: 8,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32,
        },
        wgpu::VertexAttribute {
            offset: 16,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];

    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleGpuData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl LineVertex {
    fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

const QUAD_CORNERS: [QuadVertex; 6] = [
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
];

const INITIAL_PARTICLE_CAPACITY: usize = 4096;
const INITIAL_LINE_CAPACITY: usize = 8192;

// --- Renderer ---
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    particle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    quad_vertex_buffer: wgpu::Buffer,
    particle_buffer: wgpu::Buffer,
    particle_capacity: usize,
    line_buffer: wgpu::Buffer,
    line_capacity: usize,
    global_uniform_buffer: wgpu::Buffer,
    bind_group_globals: wgpu::BindGroup,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    (vs, fs): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(vs),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            compilation_options: Default::default(),
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn vertex_buffer(device: &wgpu::Device, label: &str, bytes: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: bytes as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

// Grows by powers of two; never shrinks.
fn grown_capacity(current: usize, needed: usize) -> usize {
    (needed * 3 / 2).max(current + 1).max(16).next_power_of_two()
}

fn rect_outline(rect: &Rect, color: [f32; 4], out: &mut Vec<LineVertex>) {
    let corners = [
        [rect.x, rect.y],
        [rect.right(), rect.y],
        [rect.right(), rect.bottom()],
        [rect.x, rect.bottom()],
    ];
    for i in 0..4 {
        out.push(LineVertex {
            position: corners[i],
            color,
        });
        out.push(LineVertex {
            position: corners[(i + 1) % 4],
            color,
        });
    }
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let size = PhysicalSize::new(size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader Module"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // --- Create Buffers ---
        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let global_uniforms = GlobalUniforms {
            screen_resolution: [size.width as f32, size.height as f32],
            _padding: [0.0; 2],
        };
        let global_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global Uniform Buffer"),
            contents: bytemuck::cast_slice(&[global_uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let particle_buffer = vertex_buffer(
            &device,
            "Particle Instance Buffer",
            INITIAL_PARTICLE_CAPACITY * std::mem::size_of::<ParticleGpuData>(),
        );
        let line_buffer = vertex_buffer(
            &device,
            "Overlay Line Buffer",
            INITIAL_LINE_CAPACITY * std::mem::size_of::<LineVertex>(),
        );

        // --- Bind Groups ---
        let bind_group_layout_globals =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Globals Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<GlobalUniforms>() as _,
                        ),
                    },
                    count: None,
                }],
            });

        let bind_group_globals = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &bind_group_layout_globals,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: global_uniform_buffer.as_entire_binding(),
            }],
        });

        // --- Render Pipelines ---
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout_globals],
            push_constant_ranges: &[],
        });

        let particle_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            ("vs_particle", "fs_particle"),
            &[QuadVertex::desc(), ParticleGpuData::desc()],
            wgpu::PrimitiveTopology::TriangleList,
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            ("vs_line", "fs_line"),
            &[LineVertex::desc()],
            wgpu::PrimitiveTopology::LineList,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            particle_pipeline,
            line_pipeline,
            quad_vertex_buffer,
            particle_buffer,
            particle_capacity: INITIAL_PARTICLE_CAPACITY,
            line_buffer,
            line_capacity: INITIAL_LINE_CAPACITY,
            global_uniform_buffer,
            bind_group_globals,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 && new_size != self.size {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let screen_res_data = [new_size.width as f32, new_size.height as f32];
            self.queue.write_buffer(
                &self.global_uniform_buffer,
                0,
                bytemuck::cast_slice(&screen_res_data),
            );
            log::info!("Renderer resized to {}x{}", new_size.width, new_size.height);
        }
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Draws one frame: optional quadtree boundaries underneath, particles on top.
    pub fn render(
        &mut self,
        particles: &[RenderParticle],
        overlay: Option<&[Rect]>,
    ) -> Result<(), wgpu::SurfaceError> {
        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Render Encoder"),
            });

        let instances: Vec<ParticleGpuData> = particles
            .iter()
            .map(|p| ParticleGpuData {
                position: p.position.into(),
                radius: PARTICLE_DRAW_RADIUS,
                _padding: 0.0,
                color: p.color.into(),
            })
            .collect();

        let mut lines = Vec::new();
        for rect in overlay.unwrap_or(&[]) {
            rect_outline(rect, GRID_OVERLAY_COLOR, &mut lines);
        }

        // --- Resize Buffers if Needed ---
        if instances.len() > self.particle_capacity {
            self.particle_capacity = grown_capacity(self.particle_capacity, instances.len());
            log::debug!("Growing particle buffer to {} instances", self.particle_capacity);
            self.particle_buffer = vertex_buffer(
                &self.device,
                "Particle Instance Buffer (Resized)",
                self.particle_capacity * std::mem::size_of::<ParticleGpuData>(),
            );
        }
        if lines.len() > self.line_capacity {
            self.line_capacity = grown_capacity(self.line_capacity, lines.len());
            log::debug!("Growing overlay buffer to {} vertices", self.line_capacity);
            self.line_buffer = vertex_buffer(
                &self.device,
                "Overlay Line Buffer (Resized)",
                self.line_capacity * std::mem::size_of::<LineVertex>(),
            );
        }

        if !instances.is_empty() {
            self.queue
                .write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(&instances));
        }
        if !lines.is_empty() {
            self.queue
                .write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&lines));
        }

        // --- Render Pass ---
        {
            let [r, g, b, a] = BACKGROUND_COLOR;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group_globals, &[]);

            if !lines.is_empty() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                render_pass.draw(0..lines.len() as u32, 0..1);
            }

            if !instances.is_empty() {
                render_pass.set_pipeline(&self.particle_pipeline);
                render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.particle_buffer.slice(..));
                render_pass.draw(0..QUAD_CORNERS.len() as u32, 0..instances.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();

        Ok(())
    }
}
