//! GPU vertex and instance data types for the grid renderer.
//!
//! All types derive `bytemuck::Pod` + `Zeroable` for zero-copy upload
//! to GPU buffers.

use bytemuck::{Pod, Zeroable};
use hexview_core::Rgba;
use hexview_text::AtlasRegion;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

// ───────────────────────────────────────────────────────────────────
// Vertex (unit quad)
// ───────────────────────────────────────────────────────────────────

/// A single vertex of the unit quad (0,0)→(1,1).
///
/// The quad is shared across all grid instances; `uv` interpolates between
/// the instance's `uv_min` and `uv_max`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl QuadVertex {
    /// Two triangles, drawn non-indexed.
    pub const VERTICES: [QuadVertex; 6] = [
        QuadVertex { position: [0.0, 0.0], uv: [0.0, 0.0] },
        QuadVertex { position: [1.0, 0.0], uv: [1.0, 0.0] },
        QuadVertex { position: [0.0, 1.0], uv: [0.0, 1.0] },
        QuadVertex { position: [0.0, 1.0], uv: [0.0, 1.0] },
        QuadVertex { position: [1.0, 0.0], uv: [1.0, 0.0] },
        QuadVertex { position: [1.0, 1.0], uv: [1.0, 1.0] },
    ];

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(0) = position
            VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x2,
            },
            // location(1) = uv
            VertexAttribute {
                offset: 8,
                shader_location: 1,
                format: VertexFormat::Float32x2,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Instance data
// ───────────────────────────────────────────────────────────────────

/// One textured quad: a glyph cell or a solid rectangle.
///
/// 16 floats = 64 bytes per instance.  The fragment shader outputs
/// `bg × (1 − a) + fg × a` with `a` the atlas alpha at `uv`, so a quad
/// sampling the transparent blank cell is a solid `bg` rectangle.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GridInstance {
    /// Top-left corner in surface pixels.
    pub position: [f32; 2],
    /// Width and height in pixels.
    pub size: [f32; 2],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    pub fg: Rgba,
    pub bg: Rgba,
}

impl GridInstance {
    pub fn glyph(x: f32, y: f32, w: f32, h: f32, region: AtlasRegion, fg: Rgba, bg: Rgba) -> Self {
        Self {
            position: [x, y],
            size: [w, h],
            uv_min: [region.u_min, region.v_min],
            uv_max: [region.u_max, region.v_max],
            fg,
            bg,
        }
    }

    /// Solid rectangle.  `blank` must be a fully transparent atlas region.
    pub fn solid(x: f32, y: f32, w: f32, h: f32, blank: AtlasRegion, color: Rgba) -> Self {
        Self::glyph(x, y, w, h, blank, color, color)
    }

    pub fn layout() -> VertexBufferLayout<'static> {
        static ATTRS: &[VertexAttribute] = &[
            // location(2) = position
            VertexAttribute {
                offset: 0,
                shader_location: 2,
                format: VertexFormat::Float32x2,
            },
            // location(3) = size
            VertexAttribute {
                offset: 8,
                shader_location: 3,
                format: VertexFormat::Float32x2,
            },
            // location(4) = uv_min
            VertexAttribute {
                offset: 16,
                shader_location: 4,
                format: VertexFormat::Float32x2,
            },
            // location(5) = uv_max
            VertexAttribute {
                offset: 24,
                shader_location: 5,
                format: VertexFormat::Float32x2,
            },
            // location(6) = fg
            VertexAttribute {
                offset: 32,
                shader_location: 6,
                format: VertexFormat::Float32x4,
            },
            // location(7) = bg
            VertexAttribute {
                offset: 48,
                shader_location: 7,
                format: VertexFormat::Float32x4,
            },
        ];
        VertexBufferLayout {
            array_stride: std::mem::size_of::<GridInstance>() as BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: ATTRS,
        }
    }
}

// ───────────────────────────────────────────────────────────────────
// Uniforms
// ───────────────────────────────────────────────────────────────────

/// Surface size in pixels; the vertex shader maps pixels to clip space
/// with a top-left origin.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub size: [f32; 2],
    /// Padding to the 16-byte uniform alignment.
    pub _pad: [f32; 2],
}

impl ViewportUniform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: [width.max(1) as f32, height.max(1) as f32],
            _pad: [0.0; 2],
        }
    }

    /// CPU mirror of the shader's pixel → clip-space mapping.
    pub fn to_clip(&self, x: f32, y: f32) -> [f32; 2] {
        [x / self.size[0] * 2.0 - 1.0, 1.0 - y / self.size[1] * 2.0]
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> AtlasRegion {
        AtlasRegion {
            u_min: 0.25,
            v_min: 0.5,
            u_max: 0.375,
            v_max: 0.75,
        }
    }

    #[test]
    fn test_sizes() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 16);
        assert_eq!(std::mem::size_of::<GridInstance>(), 64);
        assert_eq!(std::mem::size_of::<GridInstance>(), 16 * 4);
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
    }

    #[test]
    fn test_quad_covers_unit_square() {
        let v = QuadVertex::VERTICES;
        assert_eq!(v.len(), 6);
        for vert in v {
            assert_eq!(vert.position, vert.uv);
        }
        // Both triangles share the (1,0)–(0,1) diagonal.
        assert!(v[..3].iter().any(|q| q.position == [0.0, 0.0]));
        assert!(v[3..].iter().any(|q| q.position == [1.0, 1.0]));
    }

    #[test]
    fn test_instance_layout_offsets_match_struct() {
        let layout = GridInstance::layout();
        assert_eq!(layout.array_stride, 64);
        assert_eq!(layout.step_mode, VertexStepMode::Instance);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 24, 32, 48]);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_glyph_and_solid_instances() {
        let g = GridInstance::glyph(8.0, 16.0, 8.0, 16.0, region(), [1.0; 4], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.uv_min, [0.25, 0.5]);
        assert_eq!(g.uv_max, [0.375, 0.75]);

        let s = GridInstance::solid(0.0, 0.0, 20.0, 600.0, region(), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(s.fg, s.bg);

        let bytes: &[u8] = bytemuck::bytes_of(&g);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn test_viewport_clip_mapping() {
        let u = ViewportUniform::new(800, 600);
        assert_eq!(u.to_clip(0.0, 0.0), [-1.0, 1.0]);
        assert_eq!(u.to_clip(800.0, 600.0), [1.0, -1.0]);
        assert_eq!(u.to_clip(400.0, 300.0), [0.0, 0.0]);
    }
}
