//! Integration tests for the render core through its public API
//!
//! These tests cover the parts that work without a GPU device: logging,
//! error reporting, configuration defaults, the texture unit protocol and
//! light change tracking.
//!
//! Run with: cargo test --test render_core_integration_tests

use std::sync::{Arc, Mutex};

use fennec_3d_engine::fennec3d::config::{GBufferVis, RenderOptions, RendererConfig};
use fennec_3d_engine::fennec3d::light::{DirectionalLight, LightRegistry, LightType, PointLight, SpotLight};
use fennec_3d_engine::fennec3d::log::{LogEntry, LogSeverity, Logger};
use fennec_3d_engine::fennec3d::render::TextureRegistry;
use fennec_3d_engine::fennec3d::{Engine, Error};
use fennec_3d_engine::glam::{Mat4, Vec3};
use serial_test::serial;

// ============================================================================
// TEST LOGGER
// ============================================================================

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

// ============================================================================
// LOGGING / ERRORS
// ============================================================================

#[test]
#[serial]
fn test_integration_errors_are_logged_with_location() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);

    let err = fennec_3d_engine::engine_err!(InvalidState, "fennec3d::Test", "face {} out of range", 7);
    assert!(matches!(err, Error::InvalidState(ref msg) if msg == "face 7 out of range"));

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].severity, LogSeverity::Error);
        assert_eq!(captured[0].source, "fennec3d::Test");
        assert!(captured[0].file.is_some());
        assert!(captured[0].line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_min_severity_filters() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);
    Engine::set_min_severity(LogSeverity::Warn);

    Engine::log(LogSeverity::Info, "fennec3d::Test", "hidden".to_string());
    Engine::log(LogSeverity::Warn, "fennec3d::Test", "shown".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].message, "shown");
    }

    Engine::set_min_severity(LogSeverity::Debug);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_light_state_errors_are_logged() {
    let (logger, entries) = CaptureLogger::new();
    Engine::set_logger(logger);

    let mut registry = LightRegistry::new();
    registry.add_light(PointLight::default());
    let err = registry.check_state().unwrap_err();
    assert!(err.to_string().contains("Light state changed without re-applying view transform."));

    {
        let captured = entries.lock().unwrap();
        assert!(captured
            .iter()
            .any(|e| e.severity == LogSeverity::Error && e.source == "fennec3d::Light"));
    }

    Engine::reset_logger();
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_integration_default_configuration() {
    let config = RendererConfig::default();
    assert_eq!(config.shadow_map_size, 2048);
    assert_eq!(config.irradiance_map_size, 16);
    assert_eq!(config.ssao_kernel_size, 64);
    assert_eq!(config.ssao_noise_size, 4);

    let options = RenderOptions::default();
    assert!(options.shadow_mapping);
    assert!(options.ssao);
    assert!(options.bloom);
    assert!(options.fxaa);
    assert_eq!(options.gamma, 2.2);
    assert_eq!(options.g_buffer_vis, GBufferVis::Disabled);
    assert!(!options.wireframe);
}

// ============================================================================
// TEXTURE UNITS
// ============================================================================

#[test]
#[serial]
fn test_integration_usage_blocks_restore_the_cursor() {
    let mut registry = TextureRegistry::new();
    registry.next_texture_unit();
    registry.next_texture_unit();

    registry.push_usage_block();
    assert_eq!(registry.next_texture_unit(), 2);
    assert_eq!(registry.next_texture_unit(), 3);
    registry.pop_usage_block().unwrap();

    assert_eq!(registry.current_unit(), 2);
    assert!(registry.pop_usage_block().is_err());
}

// ============================================================================
// LIGHTS
// ============================================================================

#[test]
#[serial]
fn test_integration_light_tracking_cycle() {
    let mut registry = LightRegistry::new();
    registry.add_light(DirectionalLight::new(Vec3::NEG_Y));
    let point = registry.add_light(PointLight::new(Vec3::X));
    registry.add_light(SpotLight::new(Vec3::Y, Vec3::NEG_Y));
    let second_point = registry.add_light(PointLight::new(Vec3::Z));

    assert_eq!(registry.count(LightType::Point), 2);
    assert_eq!(registry.light(second_point).unwrap().index(), 1);

    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
    registry.apply_view_transform(&view);
    registry.check_state().unwrap();
    registry.reset_change_detection();

    // Moving a light after the frame ended needs a new view transform
    registry.light_mut(point).unwrap().set_position(Vec3::splat(2.0));
    assert!(registry.check_state().is_err());
    registry.apply_view_transform(&view);
    registry.check_state().unwrap();
}
