//! WebGPU render pipeline setup
//!
//! One render pass per frame: the background fills the screen, then the lit
//! logo is drawn with depth testing and back-face culling, then the bolt (if
//! any) as an unlit line strip.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::background_pipeline::BackgroundPipeline;
use super::vertex::{BoltVertex, LogoVertex};
use crate::background::BackgroundEffect;
use crate::consts::*;
use crate::error::InitError;
use crate::geometry::{bolt_point_count, generate_logo_mesh};
use crate::math::Matrix4;
use crate::scene::Scene;

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ============================================================================
// GPU DATA STRUCTURES (must match shaders)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LogoUniforms {
    model: Matrix4,           // offset 0
    view: Matrix4,            // offset 64
    projection: Matrix4,      // offset 128
    normal: Matrix4,          // offset 192
    color: [f32; 4],          // offset 256
    light_position: [f32; 4], // offset 272
    view_position: [f32; 4],  // offset 288
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BoltUniforms {
    model: Matrix4,      // offset 0
    view: Matrix4,       // offset 64
    projection: Matrix4, // offset 128
    color: [f32; 4],     // offset 192
}

fn rgba(rgb: [f32; 3]) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

/// Shader colors are authored for direct display, so skip sRGB encoding when
/// the surface allows it
fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Create a shader module and fail if the compiler reported any error
pub(super) async fn create_checked_shader(
    device: &wgpu::Device,
    label: &'static str,
    source: &'static str,
) -> Result<wgpu::ShaderModule, InitError> {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = module.get_compilation_info().await;
    for message in &info.messages {
        if matches!(message.message_type, wgpu::CompilationMessageType::Error) {
            return Err(InitError::ShaderCompile {
                label,
                message: message.message.clone(),
            });
        }
        log::warn!("Shader {}: {}", label, message.message);
    }

    log::info!("Shader module {} created", label);
    Ok(module)
}

/// Layout for a single uniform buffer at binding 0
pub(super) fn uniform_layout(
    device: &wgpu::Device,
    label: &'static str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// A pipeline with one uniform buffer and its bind group
struct UniformPipeline {
    pipeline: wgpu::RenderPipeline,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformPipeline {
    fn new<U: Pod>(
        device: &wgpu::Device,
        label: &'static str,
        shader: &wgpu::ShaderModule,
        initial: &U,
        vertex_layout: wgpu::VertexBufferLayout<'static>,
        primitive: wgpu::PrimitiveState,
        format: wgpu::TextureFormat,
    ) -> Self {
        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = uniform_layout(
            device,
            label,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive,
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            uniforms,
            bind_group,
        }
    }
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    background: BackgroundPipeline,

    logo: UniformPipeline,
    logo_vertices: wgpu::Buffer,
    logo_vertex_count: u32,

    bolt: UniformPipeline,
    bolt_vertices: wgpu::Buffer,
    bolt_vertex_count: u32,
    /// Id of the bolt currently uploaded (0 = none)
    bolt_id: u64,

    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, InitError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("neon-v-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format =
            choose_surface_format(&surface_caps.formats).ok_or(InitError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let width = width.max(1);
        let height = height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, width, height);

        let background =
            BackgroundPipeline::new(&device, config.format, width, height).await?;

        // Logo: static mesh, culled, lit
        let logo_shader =
            create_checked_shader(&device, "logo_shader", include_str!("logo.wgsl")).await?;
        let logo = UniformPipeline::new(
            &device,
            "logo",
            &logo_shader,
            &LogoUniforms::zeroed(),
            LogoVertex::desc(),
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            config.format,
        );

        let mesh = generate_logo_mesh();
        let logo_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("logo_vertices"),
            contents: bytemuck::cast_slice(&mesh),
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::info!("Logo mesh: {} vertices", mesh.len());

        // Bolt: line strip, buffer sized for the largest bolt
        let bolt_shader =
            create_checked_shader(&device, "lightning_shader", include_str!("lightning.wgsl"))
                .await?;
        let bolt = UniformPipeline::new(
            &device,
            "lightning",
            &bolt_shader,
            &BoltUniforms::zeroed(),
            BoltVertex::desc(),
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
                ..Default::default()
            },
            config.format,
        );

        let bolt_vertices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("bolt_vertices"),
            size: (std::mem::size_of::<BoltVertex>() * bolt_point_count(MAX_BOLT_ITERATIONS))
                as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            background,
            logo,
            logo_vertices,
            logo_vertex_count: mesh.len() as u32,
            bolt,
            bolt_vertices,
            bolt_vertex_count: 0,
            bolt_id: 0,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, new_width, new_height);
        }
    }

    pub fn aspect(&self) -> f32 {
        self.size.0 as f32 / self.size.1 as f32
    }

    /// Upload this frame's uniforms and draw
    pub fn render(
        &mut self,
        scene: &Scene,
        background: &BackgroundEffect,
    ) -> Result<(), wgpu::SurfaceError> {
        let transforms = scene.transforms(self.aspect());

        self.background.update(&self.queue, &background.globals());

        let logo = LogoUniforms {
            model: transforms.model,
            view: transforms.view,
            projection: transforms.projection,
            normal: transforms.normal,
            color: rgba(LOGO_COLOR),
            light_position: rgba(LIGHT_POSITION),
            view_position: rgba(VIEW_POSITION),
        };
        self.queue
            .write_buffer(&self.logo.uniforms, 0, bytemuck::bytes_of(&logo));

        let bolt = scene.state().active_bolt();
        if let Some(bolt) = bolt {
            if bolt.id != self.bolt_id {
                let vertices: Vec<BoltVertex> =
                    bolt.points.iter().copied().map(BoltVertex::from).collect();
                self.queue
                    .write_buffer(&self.bolt_vertices, 0, bytemuck::cast_slice(&vertices));
                self.bolt_vertex_count = vertices.len() as u32;
                self.bolt_id = bolt.id;
            }

            let uniforms = BoltUniforms {
                model: transforms.bolt_model,
                view: transforms.view,
                projection: transforms.projection,
                color: rgba(bolt.color),
            };
            self.queue
                .write_buffer(&self.bolt.uniforms, 0, bytemuck::bytes_of(&uniforms));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.background.draw(&mut render_pass);

            render_pass.set_pipeline(&self.logo.pipeline);
            render_pass.set_bind_group(0, &self.logo.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.logo_vertices.slice(..));
            render_pass.draw(0..self.logo_vertex_count, 0..1);

            if bolt.is_some() {
                render_pass.set_pipeline(&self.bolt.pipeline);
                render_pass.set_bind_group(0, &self.bolt.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.bolt_vertices.slice(..));
                render_pass.draw(0..self.bolt_vertex_count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
