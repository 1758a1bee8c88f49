use super::*;
use crate::error::Error;
use crate::graphics_device::ShaderStage;

fn loader() -> InMemoryShaderLoader {
    InMemoryShaderLoader::new()
        .with_source("content/shaders/builtin/screen_quad.vert", "#version 460 core\nvoid main() {}")
        .with_source(
            "content/shaders/lighting_pass.frag",
            "#version 460 core\n#pragma fnk_include <common/math.glsl>\n#pragma fnk_include \"local.glsl\"\nvoid main() {}",
        )
        .with_source("content/shaders/common/math.glsl", "#pragma once\nconst float PI = 3.14159;")
        .with_source("content/shaders/local.glsl", "#pragma fnk_include <common/math.glsl>\nfloat local;")
}

// ============================================================================
// Tests: loading
// ============================================================================

#[test]
fn test_plain_source_loaded_unchanged() {
    let stage = load_stage(
        &loader(),
        ShaderCode::Path("content/shaders/builtin/screen_quad.vert"),
        ShaderStage::Vertex,
    )
    .unwrap();
    assert_eq!(stage.stage, ShaderStage::Vertex);
    assert_eq!(stage.path, "content/shaders/builtin/screen_quad.vert");
    assert_eq!(stage.source, "#version 460 core\nvoid main() {}\n");
}

#[test]
fn test_includes_expanded_once() {
    let stage = load_stage(
        &loader(),
        ShaderCode::Path("content/shaders/lighting_pass.frag"),
        ShaderStage::Fragment,
    )
    .unwrap();
    assert_eq!(stage.source.matches("const float PI").count(), 1);
    assert!(stage.source.contains("float local;"));
    assert!(!stage.source.contains("fnk_include"));
}

#[test]
fn test_inline_source_reported_as_inline() {
    let stage = load_stage(&loader(), ShaderCode::Inline("void main() {}"), ShaderStage::Fragment).unwrap();
    assert_eq!(stage.path, INLINE_SHADER_PATH);
    assert_eq!(stage.source, "void main() {}\n");
}

// ============================================================================
// Tests: errors
// ============================================================================

#[test]
fn test_extension_must_match_stage() {
    let result = load_stage(
        &loader(),
        ShaderCode::Path("content/shaders/builtin/screen_quad.vert"),
        ShaderStage::Fragment,
    );
    assert!(matches!(result, Err(Error::ShaderError(_))));
}

#[test]
fn test_missing_file_reported() {
    let result = load_stage(&loader(), ShaderCode::Path("content/shaders/missing.frag"), ShaderStage::Fragment);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_missing_include_has_traceback() {
    let loader = InMemoryShaderLoader::new().with_source("a.frag", "#pragma fnk_include \"b.glsl\"");
    match load_stage(&loader, ShaderCode::Path("a.frag"), ShaderStage::Fragment) {
        Err(Error::ShaderError(message)) => assert!(message.contains("> a.frag")),
        other => panic!("expected ShaderError, got {:?}", other),
    }
}

#[test]
fn test_circular_include_rejected() {
    let loader = InMemoryShaderLoader::new()
        .with_source("a.frag", "#pragma fnk_include \"b.glsl\"")
        .with_source("b.glsl", "#pragma fnk_include \"c.glsl\"")
        .with_source("c.glsl", "#pragma fnk_include \"b.glsl\"");
    match load_stage(&loader, ShaderCode::Path("a.frag"), ShaderStage::Fragment) {
        Err(Error::ShaderError(message)) => {
            assert!(message.contains("Circular include of 'b.glsl'"));
            assert!(message.contains("> c.glsl"));
        }
        other => panic!("expected ShaderError, got {:?}", other),
    }
}

#[test]
fn test_directory_loader_reads_files() {
    let root = std::env::temp_dir().join(format!("fennec3d_shader_loader_{}", std::process::id()));
    std::fs::create_dir_all(root.join("content/shaders")).unwrap();
    std::fs::write(root.join("content/shaders/test.frag"), "void main() {}").unwrap();

    let loader = DirectoryShaderLoader::new(&root);
    let stage = load_stage(&loader, ShaderCode::Path("content/shaders/test.frag"), ShaderStage::Fragment).unwrap();
    assert_eq!(stage.source, "void main() {}\n");
    assert!(loader.read("content/shaders/nope.frag").is_err());

    std::fs::remove_dir_all(&root).unwrap();
}
