use fennec_3d_engine::glam::{Vec2, Vec3};

use super::*;

fn positions(vertices: &[f32]) -> Vec<Vec3> {
    vertices.chunks(VERTEX_FLOATS).map(|v| Vec3::new(v[0], v[1], v[2])).collect()
}

#[test]
fn test_screen_quad_covers_clip_space() {
    let vertices = screen_quad_vertices();
    assert_eq!(vertices.len(), 4 * VERTEX_FLOATS);

    for vertex in vertices.chunks(VERTEX_FLOATS) {
        let position = Vec2::new(vertex[0], vertex[1]);
        let uv = Vec2::new(vertex[6], vertex[7]);
        assert_eq!(position.abs(), Vec2::ONE);
        // uv maps clip space [-1, 1] onto [0, 1]
        assert_eq!(uv, (position + Vec2::ONE) * 0.5);
    }
}

#[test]
fn test_room_is_a_closed_cube() {
    let vertices = room_vertices();
    assert_eq!(vertices.len(), 36 * VERTEX_FLOATS);
    for position in positions(&vertices) {
        assert_eq!(position.abs(), Vec3::ONE);
    }
}

#[test]
fn test_room_faces_inward() {
    let vertices = room_vertices();
    for triangle in vertices.chunks(3 * VERTEX_FLOATS) {
        let corners = positions(triangle);
        let normal = Vec3::new(triangle[3], triangle[4], triangle[5]);
        let center = (corners[0] + corners[1] + corners[2]) / 3.0;
        // Normals point toward the cube center
        assert!(normal.dot(center) < 0.0);
        // Counter-clockwise seen from inside
        let winding = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        assert!(winding.dot(normal) > 0.0);
    }
}
