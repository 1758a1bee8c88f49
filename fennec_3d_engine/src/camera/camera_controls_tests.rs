use glam::{Vec2, Vec3};

use super::*;
use crate::camera::DEFAULT_FOV;

fn assert_vec3_near(actual: Vec3, expected: Vec3) {
    assert!(actual.abs_diff_eq(expected, 1e-3), "{:?} != {:?}", actual, expected);
}

// ============================================================================
// ControlState
// ============================================================================

#[test]
fn test_first_mouse_delta_is_zero_and_y_grows_upwards() {
    let mut state = ControlState::default();
    assert_eq!(state.mouse_delta(100.0, 100.0), Vec2::ZERO);
    assert_eq!(state.mouse_delta(110.0, 90.0), Vec2::new(10.0, 10.0));
}

#[test]
fn test_left_press_restarts_delta_tracking() {
    let mut state = ControlState::default();
    state.mouse_delta(0.0, 0.0);
    state.handle_drag_start_end(MouseButton::Left, ButtonAction::Press);
    assert!(state.is_dragging());
    assert_eq!(state.mouse_delta(500.0, 500.0), Vec2::ZERO);

    state.handle_drag_start_end(MouseButton::Right, ButtonAction::Release);
    assert!(state.is_dragging());
    state.handle_drag_start_end(MouseButton::Left, ButtonAction::Release);
    assert!(!state.is_dragging());
}

// ============================================================================
// Fly
// ============================================================================

#[test]
fn test_fly_ignores_mouse_unless_dragging_or_captured() {
    let mut camera = Camera::default();
    let mut controls = FlyCameraControls::new();
    controls.mouse_move(&mut camera, 0.0, 0.0, false);
    controls.mouse_move(&mut camera, 100.0, 0.0, false);
    assert_eq!(camera.yaw(), 270.0);

    controls.mouse_move(&mut camera, 0.0, 0.0, true);
    controls.mouse_move(&mut camera, 100.0, 0.0, true);
    assert!((camera.yaw() - 280.0).abs() < 1e-4);
}

#[test]
fn test_fly_drag_rotates_camera() {
    let mut camera = Camera::default();
    let mut controls = FlyCameraControls::new();
    controls.mouse_button(&mut camera, MouseButton::Left, ButtonAction::Press, false);
    controls.mouse_move(&mut camera, 10.0, 10.0, false);
    controls.mouse_move(&mut camera, 10.0, -40.0, false);
    assert!((camera.pitch() - 5.0).abs() < 1e-4);
}

#[test]
fn test_fly_keys_move_with_speed_and_delta_time() {
    let mut camera = Camera::default();
    let mut controls = FlyCameraControls::new();
    controls.process_input(&mut camera, MovementKeys::FORWARD | MovementKeys::UP, 0.5);
    assert_vec3_near(camera.position(), Vec3::new(0.0, 2.5, -2.5));

    controls.process_input(&mut camera, MovementKeys::FORWARD | MovementKeys::BACKWARD, 1.0);
    assert_vec3_near(camera.position(), Vec3::new(0.0, 2.5, -2.5));
}

#[test]
fn test_fly_scroll_zooms() {
    let mut camera = Camera::default();
    let mut controls = FlyCameraControls::new();
    controls.scroll(&mut camera, 0.0, 10.0, false);
    assert!((camera.fov() - (DEFAULT_FOV - 1.0)).abs() < 1e-4);
}

// ============================================================================
// Orbit
// ============================================================================

#[test]
fn test_orbit_starts_from_camera_position() {
    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
    let controls = OrbitCameraControls::new(&mut camera, Vec3::ZERO);
    assert!((controls.radius() - 5.0).abs() < 1e-5);
    assert!((controls.azimuth() - 90.0).abs() < 1e-3);
    assert!(controls.altitude().abs() < 1e-3);
    assert_vec3_near(camera.position(), Vec3::new(0.0, 0.0, 5.0));
    assert_vec3_near(camera.front(), Vec3::NEG_Z);
}

#[test]
fn test_orbit_scroll_changes_radius_within_bounds() {
    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
    let mut controls = OrbitCameraControls::new(&mut camera, Vec3::ZERO);
    controls.scroll(&mut camera, 0.0, 10.0, false);
    assert!((controls.radius() - 4.0).abs() < 1e-5);
    assert_vec3_near(camera.position(), Vec3::new(0.0, 0.0, 4.0));

    controls.scroll(&mut camera, 0.0, 1000.0, false);
    assert_eq!(controls.radius(), MIN_ORBIT_RADIUS);
    controls.scroll(&mut camera, 0.0, -5000.0, false);
    assert_eq!(controls.radius(), MAX_ORBIT_RADIUS);
}

#[test]
fn test_orbit_mouse_turns_around_center() {
    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
    let mut controls = OrbitCameraControls::new(&mut camera, Vec3::ZERO);
    controls.mouse_move(&mut camera, 0.0, 0.0, true);
    controls.mouse_move(&mut camera, 100.0, 0.0, true);
    assert!((controls.azimuth() - 100.0).abs() < 1e-3);

    controls.mouse_move(&mut camera, 100.0, 1000.0, true);
    assert_eq!(controls.altitude(), POLAR_CAP);
    assert!((camera.position().length() - 5.0).abs() < 1e-3);
}
