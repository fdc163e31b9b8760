pub mod arcball;
pub mod camera;
pub mod fps;
pub mod input;
pub mod interleave;
pub mod mesh;
pub mod object;
pub mod optimizer;
mod pipeline;
pub mod session;
mod shaders;
mod texture;
pub mod vertex;
pub mod wireframe;

use crate::common::{importer::ImporterManager, ViewerConfig, ViewerError};
use anyhow::{anyhow, Context};
use mesh::{DrawMesh, IndexedMesh, IndexedMeshBuilder, PreparedMesh};
use optimizer::Tipsify;
use session::ViewerSession;
use std::path::Path;
use vertex::{Vertex, VertexPos, VertexPosNorm};
use wgpu::util::DeviceExt;
use winit::window::Window;
use wireframe::{DrawWireFrame, WireFrame};

lazy_static::lazy_static! {
    #[rustfmt::skip]
    static ref OPENGL_TO_WGPU_MATRIX: glm::Mat4 = glm::mat4(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    );
}

#[repr(C)] // We need this for Rust to store our data correctly for the shaders
#[derive(Debug, Copy, Clone)] // This is so we can store this in a buffer
struct Uniforms {
    view_proj: glm::Mat4,
    model: glm::Mat4,
}

unsafe impl bytemuck::Zeroable for Uniforms {}

unsafe impl bytemuck::Pod for Uniforms {}

impl Uniforms {
    fn new() -> Self {
        Self {
            view_proj: glm::Mat4::identity(),
            model: glm::Mat4::identity(),
        }
    }

    fn update(&mut self, session: &ViewerSession) {
        self.view_proj = *OPENGL_TO_WGPU_MATRIX * session.view_proj();
        self.model = session.model();
    }

    fn create_bind_group_layout_entry() -> wgpu::BindGroupLayoutEntry {
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }
    }
}

/// Opens `path` with the matching importer and prepares its first mesh for
/// upload. Every failure carries the exit code the viewer terminates with.
pub fn load_mesh(
    log: &slog::Logger,
    manager: &ImporterManager,
    path: &Path,
    config: &ViewerConfig,
) -> Result<PreparedMesh, ViewerError> {
    let mut importer = manager.open(path)?;
    if importer.mesh_count() == 0 {
        importer.close();
        return Err(ViewerError::NoMesh);
    }

    let data = importer.mesh(0).map_err(|source| ViewerError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    importer.close();

    info!(
        log,
        "loaded mesh {}", data.name.as_deref().unwrap_or("<unnamed>");
        "vertices" => data.vertex_count()
    );
    Ok(mesh::prepare_mesh::<VertexPosNorm, _>(
        log,
        &data,
        &Tipsify,
        config.cache_size,
    )?)
}

/// Owns the GPU side of the viewer: surface, device, the uploaded mesh and
/// the two pipelines drawing it.
pub struct Viewer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    mesh: IndexedMesh<wgpu::Buffer>,
    wire_frame: WireFrame<wgpu::Buffer>,
    mesh_pipeline: wgpu::RenderPipeline,
    wire_frame_pipeline: wgpu::RenderPipeline,
    uniforms: Uniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: texture::Texture,
    log: slog::Logger,
}

impl Viewer {
    pub async fn new(
        log: &slog::Logger,
        window: &Window,
        prepared: &PreparedMesh,
    ) -> anyhow::Result<Self> {
        let log = log.new(o!("module" => "viewer"));

        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = unsafe { instance.create_surface(window) }
            .context("failed to create a rendering surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("no graphics adapter can present to the window"))?;

        debug!(log, "{:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to open a graphics device")?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.describe().srgb)
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let uniforms = Uniforms::new();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[Uniforms::create_bind_group_layout_entry()],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let mesh = IndexedMeshBuilder::new(&prepared.vertices, &prepared.indices)
            .bind_vertex::<VertexPosNorm>()
            .build(&device)?;
        let wire_frame = WireFrame::new(&device, &prepared.vertices, &prepared.indices);
        info!(
            log,
            "uploaded mesh";
            "vertices" => mesh.num_vertices,
            "indices" => mesh.num_elements,
            "edges" => wire_frame.num_elements / 2
        );

        let attributes = mesh.layout.wgpu_attributes();
        // faces are pushed back slightly so coplanar wire edges win the depth test
        let mesh_pipeline = pipeline::create_render_pipeline(
            &device,
            &render_pipeline_layout,
            &shaders::phong::create_shader(&device),
            mesh.layout.desc(&attributes),
            config.format,
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 2.0,
                clamp: 0.0,
            },
        );
        let wire_frame_pipeline = pipeline::create_render_pipeline(
            &device,
            &render_pipeline_layout,
            &shaders::flat::create_shader(&device),
            VertexPos::desc(),
            config.format,
            wgpu::PrimitiveTopology::LineList,
            wgpu::DepthBiasState::default(),
        );

        let depth_texture = texture::Texture::create_depth_texture(&device, &config, "depth_texture");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            mesh,
            wire_frame,
            mesh_pipeline,
            wire_frame_pipeline,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            log,
        })
    }

    pub fn size(&self) -> na::Vector2<u32> {
        na::Vector2::new(self.config.width, self.config.height)
    }

    pub fn resize(&mut self, new_size: &na::Vector2<u32>) {
        if new_size.x == 0 || new_size.y == 0 {
            return;
        }
        self.config.width = new_size.x;
        self.config.height = new_size.y;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            texture::Texture::create_depth_texture(&self.device, &self.config, "depth_texture");
        trace!(self.log, "surface resized to {}x{}", new_size.x, new_size.y);
    }

    pub fn render(&mut self, session: &ViewerSession) -> Result<(), wgpu::SurfaceError> {
        self.uniforms.update(session);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniforms]));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.5,
                            g: 0.5,
                            b: 0.5,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.draw_mesh(&self.mesh);
            if session.wireframe() {
                render_pass.set_pipeline(&self.wire_frame_pipeline);
                render_pass.draw_wire_frame(&self.wire_frame);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
