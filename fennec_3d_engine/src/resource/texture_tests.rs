use std::rc::Rc;

use glam::Vec3;

use super::*;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{GraphicsDevice, TextureFiltering, TextureWrap};

fn setup() -> (Rc<MockGraphicsDevice>, Rc<dyn GraphicsDevice>) {
    let mock = Rc::new(MockGraphicsDevice::new());
    let device: Rc<dyn GraphicsDevice> = mock.clone();
    (mock, device)
}

fn hdr_desc(width: u32, height: u32, mips: u32) -> TextureDesc {
    TextureDesc {
        kind: TextureKind::Tex2D,
        width,
        height,
        mip_levels: mips,
        samples: 0,
        internal_format: InternalFormat::RGBA16F,
        pixel_format: PixelFormat::RGBA,
        data_type: DataType::FLOAT,
    }
}

// ============================================================================
// Tests: lifetime
// ============================================================================

#[test]
fn test_texture_released_on_drop() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, hdr_desc(16, 16, 1), TextureParams::attachment_default()).unwrap();
    assert_eq!(mock.live_textures(), 1);
    drop(texture);
    assert_eq!(mock.live_textures(), 0);
}

#[test]
fn test_renderbuffer_released_on_drop() {
    let (mock, device) = setup();
    let rb = Renderbuffer::new(
        &device,
        RenderbufferDesc {
            width: 8,
            height: 8,
            samples: 0,
            internal_format: InternalFormat::DEPTH24_STENCIL8,
        },
    )
    .unwrap();
    assert_eq!(rb.internal_format(), InternalFormat::DEPTH24_STENCIL8);
    assert_eq!(mock.live_renderbuffers(), 1);
    drop(rb);
    assert_eq!(mock.live_renderbuffers(), 0);
}

// ============================================================================
// Tests: parameters
// ============================================================================

#[test]
fn test_params_applied_at_creation_and_update() {
    let (mock, device) = setup();
    let mut texture = Texture::new(&device, hdr_desc(16, 16, 1), TextureParams::attachment_default()).unwrap();
    assert_eq!(mock.texture(texture.id()).unwrap().params, Some(TextureParams::attachment_default()));

    let nearest = TextureParams::attachment_default()
        .with_filtering(TextureFiltering::Nearest)
        .with_wrap(TextureWrap::Repeat);
    texture.set_params(nearest).unwrap();
    assert_eq!(mock.texture(texture.id()).unwrap().params, Some(nearest));
    assert_eq!(*texture.params(), nearest);
}

#[test]
fn test_sampler_mip_range_validated() {
    let (mock, device) = setup();
    let texture = Texture::new(&device, hdr_desc(64, 64, 7), TextureParams::attachment_default()).unwrap();

    texture.set_sampler_mip_range(2, 2).unwrap();
    assert_eq!(mock.texture(texture.id()).unwrap().mip_range, Some((2, 2)));

    assert!(matches!(texture.set_sampler_mip_range(7, 7), Err(Error::InvalidState(_))));
    assert!(matches!(texture.set_sampler_mip_range(3, 2), Err(Error::InvalidState(_))));

    texture.unset_sampler_mip_range().unwrap();
    assert_eq!(mock.texture(texture.id()).unwrap().mip_range, Some((0, UNBOUNDED_MAX_MIP)));
}

// ============================================================================
// Tests: data upload
// ============================================================================

#[test]
fn test_from_rgb_f32_uploads_packed_floats() {
    let (mock, device) = setup();
    let data = vec![Vec3::new(1.0, -1.0, 0.0); 16];
    let params = TextureParams::attachment_default()
        .with_filtering(TextureFiltering::Nearest)
        .with_wrap(TextureWrap::Repeat);
    let texture = Texture::from_rgb_f32(&device, 4, 4, &data, params).unwrap();

    let record = mock.texture(texture.id()).unwrap();
    assert_eq!(record.desc.internal_format, InternalFormat::RGB16F);
    assert_eq!(record.bytes_written, 16 * 3 * 4);
    assert_eq!(record.mips_generated, 0);
}

#[test]
fn test_from_rgb_f32_generates_mips_on_load() {
    let (mock, device) = setup();
    let data = vec![Vec3::ONE; 64];
    let params = TextureParams::attachment_default().with_mips(MipGeneration::OnLoad);
    let texture = Texture::from_rgb_f32(&device, 8, 8, &data, params).unwrap();
    assert_eq!(texture.num_mips(), 4);
    assert_eq!(mock.texture(texture.id()).unwrap().mips_generated, 1);
}

#[test]
fn test_from_rgb_f32_rejects_wrong_length() {
    let (_mock, device) = setup();
    let data = vec![Vec3::ZERO; 3];
    let result = Texture::from_rgb_f32(&device, 2, 2, &data, TextureParams::attachment_default());
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_from_rgb_f32_large_size_does_not_overflow() {
    let (_mock, device) = setup();
    // 65536 * 65536 wraps to 0 in 32 bits
    let result = Texture::from_rgb_f32(&device, 65536, 65536, &[], TextureParams::attachment_default());
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}
