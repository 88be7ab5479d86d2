// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;
use std::sync::Arc;

use tessel_core::math::{Extent3D, IPoint, IRect};
use tessel_core::renderer::{
    BlitPass, BlitPassError, BufferDescriptor, BufferUsage, BufferView, CommandBuffer,
    ResourceError, TextureDescriptor, TextureDimension, TextureFormat, TextureUsage,
};
use tessel_infra::graphics::wgpu::{WgpuDevice, WgpuTexture};

// Creates a headless device for testing purposes.
// Returns None if a suitable adapter cannot be found.
fn create_test_device() -> Option<WgpuDevice> {
    let _ = env_logger::builder().is_test(true).try_init();
    WgpuDevice::new_headless_blocking(Some("Tessel Test Device")).ok()
}

macro_rules! test_device_or_skip {
    ($name:literal) => {
        match create_test_device() {
            Some(device) => device,
            None => {
                println!("Skipping {}: could not create test device.", $name);
                return;
            }
        }
    };
}

fn rgba8_texture(
    device: &WgpuDevice,
    label: &'static str,
    size: u32,
    mip_level_count: u32,
    usage: TextureUsage,
) -> Arc<WgpuTexture> {
    device
        .create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(label)),
            size: Extent3D::new_2d(size, size),
            mip_level_count,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8Unorm,
            usage,
        })
        .expect("Texture creation should succeed")
}

/// A recognizable RGBA8 pattern for a `size` x `size` image.
fn pattern(size: u32) -> Vec<u8> {
    (0..size * size * 4).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_upload_then_readback_round_trips() {
    let device = test_device_or_skip!("round trip test");

    // --- 1. ARRANGE ---
    const SIZE: u32 = 64; // 64 RGBA8 texels make a 256-byte row.
    let data = pattern(SIZE);
    let upload = device
        .create_buffer_with_data(Some("Upload"), &data, BufferUsage::COPY_SRC)
        .unwrap();
    let readback = device
        .create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed("Readback")),
            size: data.len() as u64,
            usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
        })
        .unwrap();
    let texture = rgba8_texture(
        &device,
        "Round Trip",
        SIZE,
        1,
        TextureUsage::COPY_SRC | TextureUsage::COPY_DST,
    );
    let region = IRect::new(0, 0, SIZE as i32, SIZE as i32);

    let command_buffer = device.create_command_buffer(Some("Round Trip Commands"));
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.set_label("Round Trip");
    pass.add_copy_buffer_to_texture(
        BufferView::whole(upload),
        texture.clone(),
        region,
        Some("Upload"),
        0,
    )
    .unwrap();
    pass.add_copy_texture_to_buffer(texture, readback.clone(), region, 0, Some("Readback"))
        .unwrap();

    // --- 2. ACT ---
    pass.encode_commands().expect("Encoding should succeed");
    device.submit(&command_buffer).unwrap();
    let bytes = device
        .read_buffer_blocking(&readback, 0..data.len() as u64)
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(bytes, data, "Read-back bytes should match the upload");
}

#[test]
fn test_texture_copy_moves_region() {
    let device = test_device_or_skip!("texture copy test");

    const SIZE: u32 = 64;
    let source = rgba8_texture(
        &device,
        "Copy Source",
        SIZE,
        1,
        TextureUsage::COPY_SRC | TextureUsage::COPY_DST,
    );
    let destination = rgba8_texture(
        &device,
        "Copy Destination",
        SIZE,
        1,
        TextureUsage::COPY_SRC | TextureUsage::COPY_DST,
    );
    let full = IRect::new(0, 0, SIZE as i32, SIZE as i32);
    device
        .write_texture(&source, &pattern(SIZE), full, 0)
        .unwrap();

    let readback = device
        .create_buffer(&BufferDescriptor {
            label: Some(Cow::Borrowed("Readback")),
            size: u64::from(SIZE * SIZE * 4),
            usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
        })
        .unwrap();

    let command_buffer = device.create_command_buffer(Some("Copy Commands"));
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.add_copy_texture_to_texture(source, destination.clone(), full, IPoint::ZERO, None)
        .unwrap();
    pass.add_copy_texture_to_buffer(destination, readback.clone(), full, 0, None)
        .unwrap();
    pass.encode_commands().unwrap();
    device.submit(&command_buffer).unwrap();

    let bytes = device
        .read_buffer_blocking(&readback, 0..u64::from(SIZE * SIZE * 4))
        .unwrap();
    assert_eq!(bytes, pattern(SIZE));
}

#[test]
fn test_mipmap_generation_on_two_levels() {
    let device = test_device_or_skip!("mipmap test");

    let texture = rgba8_texture(
        &device,
        "Mipmapped",
        64,
        2,
        TextureUsage::COPY_DST | TextureUsage::TEXTURE_BINDING | TextureUsage::RENDER_ATTACHMENT,
    );
    device
        .write_texture(&texture, &pattern(64), IRect::new(0, 0, 64, 64), 0)
        .unwrap();

    let command_buffer = device.create_command_buffer(Some("Mipmap Commands"));
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.add_generate_mipmap(texture, Some("Generate Mips"))
        .unwrap();

    assert!(pass.encode_commands().is_ok());
    assert!(device.submit(&command_buffer).is_ok());
    device.poll_device_blocking();
}

#[test]
fn test_mipmap_requires_render_attachment() {
    let device = test_device_or_skip!("mipmap usage test");

    let texture = rgba8_texture(&device, "Not Renderable", 64, 2, TextureUsage::TEXTURE_BINDING);
    let command_buffer = device.create_command_buffer(None);
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.add_generate_mipmap(texture, None).unwrap();

    assert_eq!(
        pass.encode_commands(),
        Err(BlitPassError::CommandEncodeFailed {
            index: 0,
            label: None,
            source: ResourceError::MissingUsage {
                resource: "mipmapped texture",
                usage: "RENDER_ATTACHMENT",
            },
        })
    );
}

#[test]
fn test_unaddressable_slice_is_rejected() {
    let device = test_device_or_skip!("slice test");

    let texture = rgba8_texture(&device, "Single Layer", 64, 1, TextureUsage::COPY_DST);
    let upload = device
        .create_buffer_with_data(Some("Upload"), &pattern(64), BufferUsage::COPY_SRC)
        .unwrap();

    let command_buffer = device.create_command_buffer(Some("Slice Commands"));
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.add_copy_buffer_to_texture(
        BufferView::whole(upload),
        texture.clone(),
        IRect::new(0, 0, 64, 64),
        Some("Slice 2"),
        2,
    )
    .unwrap();
    pass.add_generate_mipmap(texture, None).unwrap();

    let result = pass.encode_commands();

    assert_eq!(
        result,
        Err(BlitPassError::CommandEncodeFailed {
            index: 0,
            label: Some("Slice 2".to_string()),
            source: ResourceError::InvalidSlice {
                slice: 2,
                layer_count: 1
            },
        })
    );
}

#[test]
fn test_unaligned_rows_are_rejected() {
    let device = test_device_or_skip!("alignment test");

    let texture = rgba8_texture(&device, "Small", 16, 1, TextureUsage::COPY_SRC);
    let readback = device
        .create_buffer(&BufferDescriptor {
            label: None,
            size: 4096,
            usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
        })
        .unwrap();

    let command_buffer = device.create_command_buffer(None);
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    // 10 RGBA8 texels per row is 40 bytes.
    pass.add_copy_texture_to_buffer(texture, readback, IRect::new(0, 0, 10, 10), 0, None)
        .unwrap();

    assert!(matches!(
        pass.encode_commands(),
        Err(BlitPassError::CommandEncodeFailed {
            source: ResourceError::UnalignedCopy { .. },
            ..
        })
    ));
}

#[test]
fn test_submitted_buffer_has_no_encoder() {
    let device = test_device_or_skip!("submission test");

    let command_buffer = device.create_command_buffer(Some("Submitted"));
    assert!(command_buffer.is_recordable());
    device.submit(&command_buffer).unwrap();
    assert!(!command_buffer.is_recordable());
    assert!(command_buffer.encoder().is_none());

    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    assert_eq!(pass.encode_commands(), Err(BlitPassError::EncoderUnavailable));
    assert!(device.submit(&command_buffer).is_err());
}

#[test]
fn test_foreign_resources_are_invalid_handles() {
    let device = test_device_or_skip!("foreign resource test");
    let other = test_device_or_skip!("foreign resource test");

    let foreign = rgba8_texture(
        &other,
        "Foreign",
        16,
        2,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    );
    let command_buffer = device.create_command_buffer(None);
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.add_generate_mipmap(foreign, None).unwrap();

    assert!(matches!(
        pass.encode_commands(),
        Err(BlitPassError::CommandEncodeFailed {
            source: ResourceError::InvalidHandle,
            ..
        })
    ));
}

#[test]
fn test_copy_onto_same_texture_is_rejected_and_submits() {
    let device = test_device_or_skip!("self copy test");

    // --- 1. ARRANGE ---
    let atlas = rgba8_texture(
        &device,
        "Atlas",
        16,
        1,
        TextureUsage::COPY_SRC | TextureUsage::COPY_DST,
    );
    let command_buffer = device.create_command_buffer(Some("Self Copy Commands"));
    let mut pass = BlitPass::for_command_buffer(&command_buffer);
    pass.add_copy_texture_to_texture(
        atlas.clone(),
        atlas,
        IRect::new(0, 0, 4, 4),
        IPoint::new(8, 8),
        Some("Self Copy"),
    )
    .unwrap();

    // --- 2. ACT ---
    let result = pass.encode_commands();

    // --- 3. ASSERT ---
    assert_eq!(
        result,
        Err(BlitPassError::CommandEncodeFailed {
            index: 0,
            label: Some("Self Copy".to_string()),
            source: ResourceError::OverlappingCopy,
        })
    );
    // Nothing invalid reached wgpu, so the buffer still finishes cleanly.
    assert!(device.submit(&command_buffer).is_ok());
}

#[test]
fn test_depth_texture_copies_are_restricted() {
    let device = test_device_or_skip!("depth copy test");

    // --- 1. ARRANGE ---
    let depth = device
        .create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("Depth")),
            size: Extent3D::new_2d(64, 64),
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage::COPY_SRC | TextureUsage::COPY_DST,
        })
        .expect("Depth texture creation should succeed");
    let upload = device
        .create_buffer_with_data(Some("Upload"), &pattern(64), BufferUsage::COPY_SRC)
        .unwrap();
    let readback = device
        .create_buffer(&BufferDescriptor {
            label: None,
            size: 64 * 64 * 4,
            usage: BufferUsage::MAP_READ | BufferUsage::COPY_DST,
        })
        .unwrap();

    // --- 2. ACT ---
    let command_buffer = device.create_command_buffer(Some("Depth Commands"));
    let mut partial = BlitPass::for_command_buffer(&command_buffer);
    partial
        .add_copy_texture_to_buffer(
            depth.clone(),
            readback.clone(),
            IRect::new(0, 0, 64, 32),
            0,
            None,
        )
        .unwrap();
    let partial_result = partial.encode_commands();

    let mut upload_pass = BlitPass::for_command_buffer(&command_buffer);
    upload_pass
        .add_copy_buffer_to_texture(
            BufferView::whole(upload),
            depth.clone(),
            IRect::new(0, 0, 64, 64),
            None,
            0,
        )
        .unwrap();
    let upload_result = upload_pass.encode_commands();

    let mut whole = BlitPass::for_command_buffer(&command_buffer);
    whole
        .add_copy_texture_to_buffer(depth, readback, IRect::new(0, 0, 64, 64), 0, None)
        .unwrap();
    let whole_result = whole.encode_commands();

    // --- 3. ASSERT ---
    for result in [partial_result, upload_result] {
        assert!(matches!(
            result,
            Err(BlitPassError::CommandEncodeFailed {
                source: ResourceError::UnsupportedFormat(_),
                ..
            })
        ));
    }
    assert_eq!(whole_result, Ok(()));
    assert!(device.submit(&command_buffer).is_ok());
}
