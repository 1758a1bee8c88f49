/// Built-in meshes: the fullscreen quad and the inside-out room cube
///
/// Both use one interleaved layout of 8 floats per vertex:
/// - location 0: position (vec3)
/// - location 1: normal (vec3)
/// - location 2: texture coordinates (vec2)

use fennec_3d_engine::fennec3d::device::BuiltinMesh;
use fennec_3d_engine::fennec3d::Result;
use fennec_3d_engine::glam::Vec3;
use glow::HasContext;

/// Floats per interleaved vertex
pub const VERTEX_FLOATS: usize = 8;

const FLOAT_SIZE: i32 = std::mem::size_of::<f32>() as i32;
const STRIDE: i32 = VERTEX_FLOATS as i32 * FLOAT_SIZE;

/// Quad covering clip space, drawn as a triangle strip
pub fn screen_quad_vertices() -> Vec<f32> {
    #[rustfmt::skip]
    let vertices = vec![
        // position         normal           uv
        -1.0,  1.0, 0.0,    0.0, 0.0, 1.0,   0.0, 1.0,
        -1.0, -1.0, 0.0,    0.0, 0.0, 1.0,   0.0, 0.0,
         1.0,  1.0, 0.0,    0.0, 0.0, 1.0,   1.0, 1.0,
         1.0, -1.0, 0.0,    0.0, 0.0, 1.0,   1.0, 0.0,
    ];
    vertices
}

/// Cube spanning [-1, 1] with inward normals and inward-facing winding
///
/// Seen from inside, every triangle is front facing, so the cube survives
/// back-face culling when the camera sits at its center.
pub fn room_vertices() -> Vec<f32> {
    // (outward normal, u axis, v axis) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
    // Reversed winding of (0, 1, 2), (0, 2, 3)
    let order = [0, 2, 1, 0, 3, 2];

    let mut vertices = Vec::with_capacity(faces.len() * order.len() * VERTEX_FLOATS);
    for (normal, u, v) in faces {
        for index in order {
            let (cu, cv) = corners[index];
            let position = normal + u * cu + v * cv;
            let inward = -normal;
            vertices.extend_from_slice(&position.to_array());
            vertices.extend_from_slice(&inward.to_array());
            vertices.extend_from_slice(&[(cu + 1.0) * 0.5, (cv + 1.0) * 0.5]);
        }
    }
    vertices
}

// ============================================================================
// GPU side
// ============================================================================

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    mode: u32,
    count: i32,
}

impl GpuMesh {
    unsafe fn upload(gl: &glow::Context, vertices: &[f32], mode: u32) -> Result<Self> {
        let vao = gl.create_vertex_array().map_err(|e| {
            fennec_3d_engine::engine_err!("fennec3d::GlMesh", "Vertex array creation failed: {}", e)
        })?;
        let vbo = gl.create_buffer().map_err(|e| {
            fennec_3d_engine::engine_err!("fennec3d::GlMesh", "Vertex buffer creation failed: {}", e)
        })?;

        gl.bind_vertex_array(Some(vao));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck::cast_slice(vertices), glow::STATIC_DRAW);

        let attributes = [(0, 3, 0), (1, 3, 3), (2, 2, 6)];
        for (location, size, offset) in attributes {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_f32(location, size, glow::FLOAT, false, STRIDE, offset * FLOAT_SIZE);
        }

        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);

        Ok(Self { vao, vbo, mode, count: (vertices.len() / VERTEX_FLOATS) as i32 })
    }

    unsafe fn draw(&self, gl: &glow::Context) {
        gl.bind_vertex_array(Some(self.vao));
        gl.draw_arrays(self.mode, 0, self.count);
        gl.bind_vertex_array(None);
    }

    unsafe fn destroy(&self, gl: &glow::Context) {
        gl.delete_vertex_array(self.vao);
        gl.delete_buffer(self.vbo);
    }
}

/// Vertex arrays of every built-in mesh, created once per context
pub(crate) struct BuiltinMeshes {
    screen_quad: GpuMesh,
    room: GpuMesh,
}

impl BuiltinMeshes {
    /// # Safety
    /// `gl` must be current on this thread.
    pub(crate) unsafe fn new(gl: &glow::Context) -> Result<Self> {
        Ok(Self {
            screen_quad: GpuMesh::upload(gl, &screen_quad_vertices(), glow::TRIANGLE_STRIP)?,
            room: GpuMesh::upload(gl, &room_vertices(), glow::TRIANGLES)?,
        })
    }

    /// # Safety
    /// `gl` must be current on this thread.
    pub(crate) unsafe fn draw(&self, gl: &glow::Context, mesh: BuiltinMesh) {
        match mesh {
            BuiltinMesh::ScreenQuad => self.screen_quad.draw(gl),
            BuiltinMesh::Room => self.room.draw(gl),
        }
    }

    /// # Safety
    /// `gl` must be current on this thread.
    pub(crate) unsafe fn destroy(&self, gl: &glow::Context) {
        self.screen_quad.destroy(gl);
        self.room.destroy(gl);
    }
}

#[cfg(test)]
#[path = "gl_mesh_tests.rs"]
mod tests;
