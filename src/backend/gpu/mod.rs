//! wgpu/winit rendering backend
//!
//! Every draw command is a quad instance: pixel-space destination, source
//! UVs, a color, and a rotation. During a frame the backend queues
//! instances, then `present_target` records two render passes: one onto
//! the fixed-resolution offscreen texture (cleared, then all queued quads
//! in call order) and one onto the surface (cleared to black, then the
//! offscreen texture sampled with nearest filtering into the letterbox
//! rectangle). `flip` submits the encoder and presents.

mod text;

use std::path::Path;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::{Fullscreen, Window};

use super::{BackendError, Color, FontId, FontStyle, Rect, RenderBackend, TextBitmap, TextureId};
use text::LoadedFont;

/// Per-quad instance data, matching the vertex layout in `quad.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct QuadInstance {
    dst: [f32; 4],
    uv: [f32; 4],
    color: [f32; 4],
    rotation: f32,
    _padding: [f32; 3],
}

impl QuadInstance {
    fn new(dst: Rect, uv: [f32; 4], color: [f32; 4], rotation_degrees: f64) -> Self {
        Self {
            dst: [dst.x as f32, dst.y as f32, dst.w as f32, dst.h as f32],
            uv,
            color,
            rotation: rotation_degrees.to_radians() as f32,
            _padding: [0.0; 3],
        }
    }
}

const FULL_UV: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const WHITE_RGBA: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// A queued draw: `None` texture binds the built-in 1x1 white texture.
struct QuadDraw {
    texture: Option<TextureId>,
    instance: QuadInstance,
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

struct OffscreenTarget {
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// Surface frame recorded by `present_target`, submitted by `flip`.
struct FrameInFlight {
    output: wgpu::SurfaceTexture,
    encoder: wgpu::CommandEncoder,
}

/// The real backend: winit window, wgpu device/queue/surface, and one
/// instanced-quad pipeline per target format.
pub struct WgpuBackend {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    offscreen_pipeline: wgpu::RenderPipeline,
    surface_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    target_size_buffer: wgpu::Buffer,
    target_size_bind_group: wgpu::BindGroup,
    window_size_buffer: wgpu::Buffer,
    window_size_bind_group: wgpu::BindGroup,
    white: GpuTexture,
    offscreen: Option<OffscreenTarget>,
    textures: FxHashMap<TextureId, GpuTexture>,
    fonts: FxHashMap<FontId, LoadedFont>,
    next_id: u64,
    clear_color: wgpu::Color,
    queued: Vec<QuadDraw>,
    frame: Option<FrameInFlight>,
}

impl WgpuBackend {
    /// Create the backend for a window.
    ///
    /// Panics on adapter/device failure; nothing can render without them.
    pub async fn new(window: Arc<Window>, vsync: bool) -> Self {
        let size = window.inner_size();
        let size = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&window))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to find GPU adapter");

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Engine Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Quad Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("quad.wgsl").into()),
        });

        let size_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Target Size Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Quad Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let target_size_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Offscreen Size Buffer"),
            contents: bytemuck::cast_slice(&[1.0f32, 1.0, 0.0, 0.0]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let target_size_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Offscreen Size Bind Group"),
            layout: &size_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: target_size_buffer.as_entire_binding(),
            }],
        });

        let window_size_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Window Size Buffer"),
            contents: bytemuck::cast_slice(&[size.0 as f32, size.1 as f32, 0.0, 0.0]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let window_size_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Window Size Bind Group"),
            layout: &size_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: window_size_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Quad Pipeline Layout"),
            bind_group_layouts: &[&size_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, format: wgpu::TextureFormat| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<QuadInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x4, // dst
                            1 => Float32x4, // uv
                            2 => Float32x4, // color
                            3 => Float32,   // rotation
                        ],
                    }],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let offscreen_pipeline = make_pipeline("Offscreen Quad Pipeline", OFFSCREEN_FORMAT);
        let surface_pipeline = make_pipeline("Surface Quad Pipeline", surface_format);

        // Nearest filtering keeps integer-scaled pixels crisp.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Quad Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &[255, 255, 255, 255],
            1,
            1,
            Some("White Texture"),
        );

        Self {
            window,
            surface,
            device,
            queue,
            config,
            offscreen_pipeline,
            surface_pipeline,
            texture_layout,
            sampler,
            target_size_buffer,
            target_size_bind_group,
            window_size_buffer,
            window_size_bind_group,
            white,
            offscreen: None,
            textures: FxHashMap::default(),
            fonts: FxHashMap::default(),
            next_id: 1,
            clear_color: wgpu::Color::BLACK,
            queued: Vec::new(),
            frame: None,
        }
    }

    /// Adopt a new surface size (platform resize events and
    /// [`RenderBackend::set_window_size`] both land here).
    pub fn handle_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.queue.write_buffer(
            &self.window_size_buffer,
            0,
            bytemuck::cast_slice(&[width as f32, height as f32, 0.0, 0.0]),
        );
        log::debug!("surface resized to {width}x{height}");
    }

    /// Show or hide the platform cursor.
    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    fn mint(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_quad(&mut self, texture: Option<TextureId>, instance: QuadInstance) {
        self.queued.push(QuadDraw { texture, instance });
    }

    fn region_uv(&self, texture: TextureId, src: Option<Rect>) -> [f32; 4] {
        let Some(entry) = self.textures.get(&texture) else {
            return FULL_UV;
        };
        match src {
            Some(rect) => {
                let w = entry.width as f32;
                let h = entry.height as f32;
                [
                    rect.x as f32 / w,
                    rect.y as f32 / h,
                    rect.right() as f32 / w,
                    rect.bottom() as f32 / h,
                ]
            }
            None => FULL_UV,
        }
    }

    fn acquire_surface(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(output) => Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                match self.surface.get_current_texture() {
                    Ok(output) => Some(output),
                    Err(err) => {
                        log::error!("surface unavailable after reconfigure: {err:?}");
                        None
                    }
                }
            }
            Err(err) => {
                log::error!("failed to acquire surface frame: {err:?}");
                None
            }
        }
    }
}

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    pixels: &[u8],
    width: u32,
    height: u32,
    label: Option<&str>,
) -> GpuTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        pixels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label,
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    GpuTexture {
        texture,
        bind_group,
        width,
        height,
    }
}

/// Map an sRGB byte to the linear value wgpu clears with.
fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl RenderBackend for WgpuBackend {
    fn create_texture(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureId, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Texture(format!(
                "zero-sized texture ({width}x{height})"
            )));
        }
        if pixels.len() != (width * height * 4) as usize {
            return Err(BackendError::Texture(format!(
                "pixel buffer is {} bytes, expected {}",
                pixels.len(),
                width * height * 4
            )));
        }
        let entry = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            pixels,
            width,
            height,
            None,
        );
        let id = TextureId(self.mint());
        self.textures.insert(id, entry);
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        match self.textures.remove(&texture) {
            Some(entry) => entry.texture.destroy(),
            None => log::debug!("destroy of unknown texture id {}", texture.0),
        }
    }

    fn load_font(&mut self, path: &Path, point_size: u16) -> Result<FontId, BackendError> {
        let font = LoadedFont::load(path, point_size)?;
        let id = FontId(self.mint());
        self.fonts.insert(id, font);
        Ok(id)
    }

    fn destroy_font(&mut self, font: FontId) {
        if self.fonts.remove(&font).is_none() {
            log::debug!("destroy of unknown font id {}", font.0);
        }
    }

    fn set_font_style(&mut self, font: FontId, style: FontStyle) {
        if let Some(entry) = self.fonts.get_mut(&font) {
            entry.style = style;
        }
    }

    fn set_font_outline(&mut self, font: FontId, width: u32) {
        if let Some(entry) = self.fonts.get_mut(&font) {
            entry.outline = width;
        }
    }

    fn rasterize_text(
        &mut self,
        font: FontId,
        text: &str,
        color: Color,
    ) -> Result<TextBitmap, BackendError> {
        let entry = self
            .fonts
            .get(&font)
            .ok_or_else(|| BackendError::Font(format!("unknown font id {}", font.0)))?;
        entry.rasterize(text, color)
    }

    fn create_target(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Texture(format!(
                "zero-sized render target ({width}x{height})"
            )));
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Offscreen Target Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.queue.write_buffer(
            &self.target_size_buffer,
            0,
            bytemuck::cast_slice(&[width as f32, height as f32, 0.0, 0.0]),
        );
        self.offscreen = Some(OffscreenTarget { view, bind_group });
        Ok(())
    }

    fn clear_target(&mut self, color: Color) {
        self.clear_color = wgpu::Color {
            r: srgb_to_linear(color.r),
            g: srgb_to_linear(color.g),
            b: srgb_to_linear(color.b),
            a: f64::from(color.a) / 255.0,
        };
        self.queued.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push_quad(None, QuadInstance::new(rect, FULL_UV, color.to_f32_array(), 0.0));
    }

    fn outline_rect(&mut self, rect: Rect, color: Color) {
        let rgba = color.to_f32_array();
        let edges = [
            Rect::new(rect.x, rect.y, rect.w, 1),
            Rect::new(rect.x, rect.bottom() - 1, rect.w, 1),
            Rect::new(rect.x, rect.y, 1, rect.h),
            Rect::new(rect.right() - 1, rect.y, 1, rect.h),
        ];
        for edge in edges {
            self.push_quad(None, QuadInstance::new(edge, FULL_UV, rgba, 0.0));
        }
    }

    fn blit(&mut self, texture: TextureId, src: Option<Rect>, dst: Rect) {
        let uv = self.region_uv(texture, src);
        self.push_quad(Some(texture), QuadInstance::new(dst, uv, WHITE_RGBA, 0.0));
    }

    fn blit_rotated(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle_degrees: f64,
    ) {
        let uv = self.region_uv(texture, src);
        self.push_quad(
            Some(texture),
            QuadInstance::new(dst, uv, WHITE_RGBA, angle_degrees),
        );
    }

    fn present_target(&mut self, dst: Rect) {
        let Some(offscreen) = self.offscreen.as_ref() else {
            log::error!("present without an offscreen target");
            self.queued.clear();
            return;
        };
        let Some(output) = self.acquire_surface() else {
            self.queued.clear();
            return;
        };
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // One temporary instance buffer per run of draws sharing a texture
        // binding; painter's order is preserved across runs.
        let queued = std::mem::take(&mut self.queued);
        let mut runs: Vec<(Option<TextureId>, wgpu::Buffer, u32)> = Vec::new();
        let mut start = 0;
        while start < queued.len() {
            let texture = queued[start].texture;
            let mut end = start + 1;
            while end < queued.len() && queued[end].texture == texture {
                end += 1;
            }
            let instances: Vec<QuadInstance> =
                queued[start..end].iter().map(|draw| draw.instance).collect();
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Quad Instance Buffer"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            runs.push((texture, buffer, instances.len() as u32));
            start = end;
        }

        let present_instance = QuadInstance::new(dst, FULL_UV, WHITE_RGBA, 0.0);
        let present_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Present Instance Buffer"),
                contents: bytemuck::cast_slice(&[present_instance]),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Offscreen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &offscreen.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.offscreen_pipeline);
            pass.set_bind_group(0, &self.target_size_bind_group, &[]);
            for (texture, buffer, count) in &runs {
                let bind_group = match texture {
                    Some(id) => match self.textures.get(id) {
                        Some(entry) => &entry.bind_group,
                        None => {
                            log::warn!("draw references destroyed texture id {}", id.0);
                            continue;
                        }
                    },
                    None => &self.white.bind_group,
                };
                pass.set_bind_group(1, bind_group, &[]);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..6, 0..*count);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.surface_pipeline);
            pass.set_bind_group(0, &self.window_size_bind_group, &[]);
            pass.set_bind_group(1, &offscreen.bind_group, &[]);
            pass.set_vertex_buffer(0, present_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }

        self.frame = Some(FrameInFlight { output, encoder });
    }

    fn flip(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.queue.submit(std::iter::once(frame.encoder.finish()));
            frame.output.present();
        }
    }

    fn window_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        let _ = self
            .window
            .request_inner_size(PhysicalSize::new(width, height));
        self.handle_resize(width, height);
    }

    fn set_window_position(&mut self, x: i32, y: i32) {
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn center_window(&mut self) {
        let Some(monitor) = self.window.current_monitor() else {
            return;
        };
        let screen = monitor.size();
        let origin = monitor.position();
        let outer = self.window.outer_size();
        self.window.set_outer_position(PhysicalPosition::new(
            origin.x + (screen.width.saturating_sub(outer.width) / 2) as i32,
            origin.y + (screen.height.saturating_sub(outer.height) / 2) as i32,
        ));
    }

    fn set_window_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_fullscreen(&mut self, enabled: bool, use_desktop_resolution: bool) {
        if enabled {
            let monitor = if use_desktop_resolution {
                None
            } else {
                self.window.current_monitor()
            };
            self.window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else {
            self.window.set_fullscreen(None);
        }
        let size = self.window.inner_size();
        self.handle_resize(size.width, size.height);
    }
}
