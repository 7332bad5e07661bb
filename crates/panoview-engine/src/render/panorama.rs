use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use panoview_stereo::{Eye, EyeView, FramePlan, ProjectionMode};
use wgpu::util::DeviceExt;

use super::ctx::{RenderCtx, RenderTarget};
use super::quad::{QuadVertex, QUAD_INDICES, QUAD_VERTICES};
use super::texture::{PanoramaImage, PanoramaTexture};

/// Fragment-stage uniform for one eye.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct EyeUniform {
    inv_view_proj: [[f32; 4]; 4],
    eye: f32,
    projection: f32,
    _pad: [f32; 2], // 16-byte alignment
}

impl EyeUniform {
    fn new(view: &EyeView, mode: ProjectionMode) -> Self {
        Self {
            inv_view_proj: view.inverse_view_projection.to_cols_array_2d(),
            eye: view.eye.selector(),
            projection: mode.selector(),
            _pad: [0.0; 2],
        }
    }
}

fn eye_ubo_min_binding_size() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<EyeUniform>() as u64)
        .expect("EyeUniform has non-zero size by construction")
}

/// Draws an equirectangular panorama into each eye's half of the surface.
///
/// Both eyes share the static quad and the panorama texture; each eye has
/// its own uniform buffer so the two draws in one pass see their own matrix.
#[derive(Default)]
pub struct PanoramaRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    eye_bgl: Option<wgpu::BindGroupLayout>,
    texture_bgl: Option<wgpu::BindGroupLayout>,

    eye_ubos: Vec<wgpu::Buffer>,
    eye_bind_groups: Vec<wgpu::BindGroup>,

    sampler: Option<wgpu::Sampler>,
    texture: Option<PanoramaTexture>,
    texture_bind_group: Option<wgpu::BindGroup>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    warned_no_texture: bool,
}

impl PanoramaRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `image` and binds it for subsequent frames.
    ///
    /// Runs between frames, so a frame sees either the old texture or the
    /// new one. On failure the previous texture stays bound.
    pub fn replace_texture(&mut self, ctx: &RenderCtx<'_>, image: &PanoramaImage) -> Result<()> {
        self.ensure_layouts(ctx);
        self.ensure_sampler(ctx);

        let texture = PanoramaTexture::upload(ctx, image)?;

        let (Some(bgl), Some(sampler)) = (self.texture_bgl.as_ref(), self.sampler.as_ref()) else {
            anyhow::bail!("panorama texture layout unavailable");
        };

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("panoview panorama texture bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.texture = Some(texture);
        self.texture_bind_group = Some(bind_group);
        self.warned_no_texture = false;
        Ok(())
    }

    /// Drops the bound panorama; frames draw nothing until the next upload.
    pub fn clear_texture(&mut self) {
        self.texture = None;
        self.texture_bind_group = None;
    }

    /// Renders both eyes of `plan` into `target`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, plan: &FramePlan) {
        self.ensure_layouts(ctx);
        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_eye_bindings(ctx);

        if self.texture_bind_group.is_none() {
            if !self.warned_no_texture {
                log::debug!("PanoramaRenderer: no texture bound; frame left clear");
                self.warned_no_texture = true;
            }
            return;
        }

        for view in &plan.eyes {
            let u = EyeUniform::new(view, plan.projection_mode);
            ctx.queue
                .write_buffer(&self.eye_ubos[view.eye.index()], 0, bytemuck::bytes_of(&u));
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(texture_bg) = self.texture_bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("panoview panorama pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(1, texture_bg, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for eye in Eye::BOTH {
            let view = plan.eye(eye);
            if view.viewport.is_empty() {
                continue;
            }
            self.draw_eye(&mut rpass, view);
        }
    }

    /// One eye: restrict to its viewport, bind its uniform, draw the quad.
    fn draw_eye(&self, rpass: &mut wgpu::RenderPass<'_>, view: &EyeView) {
        let vp = view.viewport;
        rpass.set_viewport(
            vp.x as f32,
            vp.y as f32,
            vp.width as f32,
            vp.height as f32,
            0.0,
            1.0,
        );
        rpass.set_bind_group(0, &self.eye_bind_groups[view.eye.index()], &[]);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_layouts(&mut self, ctx: &RenderCtx<'_>) {
        if self.eye_bgl.is_some() && self.texture_bgl.is_some() {
            return;
        }

        self.eye_bgl = Some(ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("panoview eye bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(eye_ubo_min_binding_size()),
                },
                count: None,
            }],
        }));

        self.texture_bgl = Some(ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("panoview panorama texture bgl"),
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
        }));

        self.pipeline = None;
        self.eye_bind_groups.clear();
        self.texture_bind_group = None;
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }
        let (Some(eye_bgl), Some(texture_bgl)) = (self.eye_bgl.as_ref(), self.texture_bgl.as_ref())
        else {
            return;
        };

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("panoview panorama shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/panorama.wgsl").into()),
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("panoview panorama pipeline layout"),
            bind_group_layouts: &[eye_bgl, texture_bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("panoview panorama pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

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
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }

    fn ensure_eye_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.eye_bind_groups.len() == Eye::BOTH.len() {
            return;
        }
        let Some(bgl) = self.eye_bgl.as_ref() else { return };

        self.eye_ubos.clear();
        self.eye_bind_groups.clear();

        for eye in Eye::BOTH {
            let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(match eye {
                    Eye::Left => "panoview left eye ubo",
                    Eye::Right => "panoview right eye ubo",
                }),
                size: std::mem::size_of::<EyeUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("panoview eye bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            });

            self.eye_ubos.push(ubo);
            self.eye_bind_groups.push(bind_group);
        }
    }

    fn ensure_sampler(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_some() {
            return;
        }
        // Longitude wraps around the seam; latitude stops at the poles.
        self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("panoview panorama sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        }));
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("panoview quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("panoview quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Quat};
    use panoview_stereo::SurfaceSize;

    use super::*;

    #[test]
    fn eye_uniform_matches_wgsl_layout() {
        // mat4x4<f32> + f32 + f32 + vec2<f32>
        assert_eq!(std::mem::size_of::<EyeUniform>(), 80);
        assert_eq!(std::mem::size_of::<EyeUniform>() % 16, 0);
    }

    #[test]
    fn eye_uniform_carries_plan() {
        let rotation = Mat4::from_quat(Quat::from_rotation_y(0.3));
        let plan = FramePlan::build(rotation, ProjectionMode::Stereo, SurfaceSize::new(800, 600), None);

        let right = EyeUniform::new(plan.eye(Eye::Right), plan.projection_mode);
        assert_eq!(right.eye, 1.0);
        assert_eq!(right.projection, 1.0);
        assert_eq!(
            right.inv_view_proj,
            plan.eye(Eye::Right).inverse_view_projection.to_cols_array_2d()
        );

        let left = EyeUniform::new(plan.eye(Eye::Left), ProjectionMode::Mono);
        assert_eq!(left.eye, 0.0);
        assert_eq!(left.projection, 0.0);
    }
}
