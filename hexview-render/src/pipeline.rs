//! Grid render pipeline — instanced rendering of textured quads.
//!
//! Every cell, blank and scrollbar rectangle of the grid is one instance of
//! a shared unit quad.  One draw call renders the whole frame.

use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Buffer, BufferAddress, BufferBindingType, BufferDescriptor, BufferUsages, ColorTargetState,
    ColorWrites, Device, Extent3d, FilterMode, FragmentState, FrontFace, MultisampleState,
    PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode, PrimitiveState,
    PrimitiveTopology, Queue, RenderPass, RenderPipeline, RenderPipelineDescriptor,
    SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderStages, Texture,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureViewDimension, VertexState,
};

use hexview_text::GlyphAtlas;

use crate::vertex::{GridInstance, QuadVertex, ViewportUniform};

/// Instance capacity allocated up front.
const INITIAL_INSTANCE_CAPACITY: usize = 4_096;

/// Atlas texels are linear coverage, not colour.
const ATLAS_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Owns the wgpu pipeline, buffers, atlas texture and bind groups.
pub struct GridPipeline {
    pipeline: RenderPipeline,

    // Geometry (shared unit quad, non-indexed).
    vertex_buffer: Buffer,

    // Instancing.
    instance_buffer: Buffer,
    instance_capacity: usize,
    instance_count: u32,

    // Viewport.
    viewport_buffer: Buffer,
    viewport_bind_group: BindGroup,

    // Atlas texture.
    atlas_texture: Texture,
    atlas_bind_group: BindGroup,
    atlas_bgl: BindGroupLayout,
    atlas_size: (u32, u32),
}

impl GridPipeline {
    /// Create the pipeline for `target_format` and upload the initial atlas.
    pub fn new(device: &Device, queue: &Queue, target_format: TextureFormat, atlas: &GlyphAtlas) -> Self {
        // ── Shader ──────────────────────────────────────────────
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("grid_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/grid.wgsl").into()),
        });

        // ── Viewport bind group layout (group 0) ────────────────
        let viewport_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("grid_viewport_bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // ── Atlas bind group layout (group 1) ───────────────────
        let atlas_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("grid_atlas_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // ── Pipeline layout ─────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("grid_pipeline_layout"),
            bind_group_layouts: &[&viewport_bgl, &atlas_bgl],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("grid_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[QuadVertex::layout(), GridInstance::layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ── Vertex buffer (unit quad) ───────────────────────────
        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("grid_quad_vb"),
            size: std::mem::size_of::<[QuadVertex; 6]>() as BufferAddress,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(&QuadVertex::VERTICES));

        // ── Instance buffer ─────────────────────────────────────
        let instance_buffer = create_instance_buffer(device, INITIAL_INSTANCE_CAPACITY);

        // ── Viewport uniform buffer ─────────────────────────────
        let viewport_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("grid_viewport_ub"),
            size: std::mem::size_of::<ViewportUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("grid_viewport_bg"),
            layout: &viewport_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
        });

        // ── Atlas texture ───────────────────────────────────────
        let atlas_size = (atlas.width.max(1), atlas.height.max(1));
        let atlas_texture = create_atlas_texture(device, atlas_size);
        let atlas_bind_group = create_atlas_bind_group(device, &atlas_bgl, &atlas_texture);

        let mut pipeline = Self {
            pipeline,
            vertex_buffer,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
            instance_count: 0,
            viewport_buffer,
            viewport_bind_group,
            atlas_texture,
            atlas_bind_group,
            atlas_bgl,
            atlas_size,
        };
        pipeline.upload_atlas(device, queue, atlas);
        pipeline
    }

    // ───────────────────── Upload ─────────────────────────────────

    /// Upload instance data for this frame, growing the buffer if needed.
    pub fn upload_instances(&mut self, device: &Device, queue: &Queue, instances: &[GridInstance]) -> u32 {
        if instances.is_empty() {
            self.instance_count = 0;
            return 0;
        }

        let needed = grown_capacity(self.instance_capacity, instances.len());
        if needed != self.instance_capacity {
            log::debug!(
                "instance buffer grown: {} -> {} instances",
                self.instance_capacity,
                needed
            );
            self.instance_buffer = create_instance_buffer(device, needed);
            self.instance_capacity = needed;
        }

        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        self.instance_count = instances.len() as u32;
        self.instance_count
    }

    /// Upload the viewport uniform for this frame.
    pub fn upload_viewport(&self, queue: &Queue, viewport: &ViewportUniform) {
        queue.write_buffer(&self.viewport_buffer, 0, bytemuck::bytes_of(viewport));
    }

    /// Upload the full atlas bitmap, recreating the texture and its bind
    /// group when the atlas dimensions changed.
    pub fn upload_atlas(&mut self, device: &Device, queue: &Queue, atlas: &GlyphAtlas) {
        let size = (atlas.width.max(1), atlas.height.max(1));
        if size != self.atlas_size {
            self.atlas_size = size;
            self.atlas_texture = create_atlas_texture(device, size);
            self.atlas_bind_group = create_atlas_bind_group(device, &self.atlas_bgl, &self.atlas_texture);
        }
        if atlas.data.is_empty() {
            return;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.atlas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.0 * 4), // RGBA = 4 bytes per pixel
                rows_per_image: Some(size.1),
            },
            Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
        );
    }

    // ───────────────────── Draw ───────────────────────────────────

    /// Record the frame's single draw call into the render pass.
    pub fn draw<'a>(&'a self, pass: &mut RenderPass<'a>) {
        if self.instance_count == 0 {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.viewport_bind_group, &[]);
        pass.set_bind_group(1, &self.atlas_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw(0..QuadVertex::VERTICES.len() as u32, 0..self.instance_count);
    }

    /// Number of instances that will be drawn.
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn instance_capacity(&self) -> usize {
        self.instance_capacity
    }

    pub fn atlas_size(&self) -> (u32, u32) {
        self.atlas_size
    }
}

/// Capacity after fitting `needed` instances: unchanged when it fits,
/// otherwise the next power of two.  Never shrinks.
pub(crate) fn grown_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        current
    } else {
        needed.next_power_of_two()
    }
}

fn create_instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some("grid_instances"),
        size: (capacity * std::mem::size_of::<GridInstance>()) as BufferAddress,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_atlas_texture(device: &Device, (width, height): (u32, u32)) -> Texture {
    device.create_texture(&TextureDescriptor {
        label: Some("glyph_atlas"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: ATLAS_FORMAT,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn create_atlas_bind_group(device: &Device, layout: &BindGroupLayout, texture: &Texture) -> BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    // Cells are drawn at their native size; nearest keeps glyph edges crisp.
    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("glyph_atlas_sampler"),
        address_mode_u: AddressMode::ClampToEdge,
        address_mode_v: AddressMode::ClampToEdge,
        mag_filter: FilterMode::Nearest,
        min_filter: FilterMode::Nearest,
        ..Default::default()
    });

    device.create_bind_group(&BindGroupDescriptor {
        label: Some("grid_atlas_bg"),
        layout,
        entries: &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::Sampler(&sampler),
            },
        ],
    })
}

// ===================================================================
// Tests
// ===================================================================
