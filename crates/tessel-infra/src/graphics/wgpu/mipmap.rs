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

//! Render-based mip chain generation.
//!
//! wgpu has no native "generate mipmaps" command. Each level is rendered from
//! the level above it by drawing a full-screen triangle that samples the
//! previous level through a filtering sampler.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tessel_core::renderer::api::texture::{Texture, TextureDimension, TextureUsage};
use tessel_core::renderer::ResourceError;

use super::conversions::IntoWgpu;
use super::resources::WgpuTexture;

const MIPMAP_SHADER: &str = include_str!("shaders/mipmap.wgsl");

/// The filter used when downsampling one level into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MipmapFilter {
    /// Averages neighbouring texels (box filter).
    #[default]
    Linear,
    /// Picks a single texel.
    Nearest,
}

impl IntoWgpu<wgpu::FilterMode> for MipmapFilter {
    fn into_wgpu(self) -> wgpu::FilterMode {
        match self {
            MipmapFilter::Linear => wgpu::FilterMode::Linear,
            MipmapFilter::Nearest => wgpu::FilterMode::Nearest,
        }
    }
}

/// Settings for the [`MipmapGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MipmapSettings {
    /// The downsampling filter.
    pub filter: MipmapFilter,
}

/// Generates mip chains by rendering, caching one pipeline per texture format.
#[derive(Debug)]
pub struct MipmapGenerator {
    shader: wgpu::ShaderModule,
    sampler: wgpu::Sampler,
    pipelines: Mutex<HashMap<wgpu::TextureFormat, Arc<wgpu::RenderPipeline>>>,
}

impl MipmapGenerator {
    /// Compiles the downsampling shader and creates the sampler.
    pub fn new(device: &wgpu::Device, settings: MipmapSettings) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mipmap Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MIPMAP_SHADER)),
        });

        let filter = settings.filter.into_wgpu();
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Mipmap Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: filter,
            min_filter: filter,
            ..Default::default()
        });

        log::debug!("MipmapGenerator: created with {:?} filtering.", settings.filter);

        Self {
            shader,
            sampler,
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Checks that `texture` can have its mip chain rendered.
    ///
    /// The texture needs more than one level, both `TEXTURE_BINDING` and
    /// `RENDER_ATTACHMENT` usages, a 2D single-sampled layout, and a format that is
    /// both renderable and filterable.
    pub fn check_texture(
        device: &wgpu::Device,
        texture: &WgpuTexture,
    ) -> Result<(), ResourceError> {
        let descriptor = texture.descriptor();

        if descriptor.mip_level_count <= 1 {
            return Err(ResourceError::InvalidMipChain {
                mip_level_count: descriptor.mip_level_count,
            });
        }
        if !descriptor.usage.contains(TextureUsage::TEXTURE_BINDING) {
            return Err(ResourceError::MissingUsage {
                resource: "mipmapped texture",
                usage: "TEXTURE_BINDING",
            });
        }
        if !descriptor.usage.contains(TextureUsage::RENDER_ATTACHMENT) {
            return Err(ResourceError::MissingUsage {
                resource: "mipmapped texture",
                usage: "RENDER_ATTACHMENT",
            });
        }
        if descriptor.dimension != TextureDimension::D2 || descriptor.sample_count != 1 {
            return Err(ResourceError::UnsupportedFormat(format!(
                "mipmap generation needs a single-sampled 2D texture, got {:?} with {} sample(s)",
                descriptor.dimension, descriptor.sample_count
            )));
        }
        if descriptor.format.is_depth() {
            return Err(ResourceError::UnsupportedFormat(format!(
                "{:?} is a depth format",
                descriptor.format
            )));
        }

        let format: wgpu::TextureFormat = descriptor.format.into_wgpu();
        let features = format.guaranteed_format_features(device.features());
        if !features
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
            || !features
                .flags
                .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE)
        {
            return Err(ResourceError::UnsupportedFormat(format!(
                "{:?} is not both renderable and filterable",
                descriptor.format
            )));
        }
        Ok(())
    }

    /// Records the passes that fill levels `1..mip_level_count` of every array
    /// layer of `texture`.
    pub fn generate(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &WgpuTexture,
    ) -> Result<(), ResourceError> {
        Self::check_texture(device, texture)?;

        let pipeline = self.pipeline_for(device, texture.descriptor().format.into_wgpu())?;
        let bind_group_layout = pipeline.get_bind_group_layout(0);
        let mip_level_count = texture.descriptor().mip_level_count;

        for layer in 0..texture.array_layer_count() {
            for target_level in 1..mip_level_count {
                let source_view = Self::level_view(texture, target_level - 1, layer);
                let target_view = Self::level_view(texture, target_level, layer);

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Mipmap Bind Group"),
                    layout: &bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&source_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });

                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Mipmap Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target_view,
                        depth_slice: None,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });
                pass.set_pipeline(&pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        let smallest = texture.size().mip_level_size(mip_level_count - 1);
        log::trace!(
            "MipmapGenerator: generated {} level(s) down to {}x{} for {} layer(s) of '{}'.",
            mip_level_count - 1,
            smallest.width,
            smallest.height,
            texture.array_layer_count(),
            texture.label().unwrap_or_default()
        );
        Ok(())
    }

    fn level_view(texture: &WgpuTexture, level: u32, layer: u32) -> wgpu::TextureView {
        texture.wgpu_texture().create_view(&wgpu::TextureViewDescriptor {
            label: Some("Mipmap Level View"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: level,
            mip_level_count: Some(1),
            base_array_layer: layer,
            array_layer_count: Some(1),
            ..Default::default()
        })
    }

    fn pipeline_for(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Result<Arc<wgpu::RenderPipeline>, ResourceError> {
        let mut pipelines = self.pipelines.lock().map_err(|e| {
            ResourceError::BackendError(format!("Mipmap pipeline cache poisoned: {e}"))
        })?;

        if let Some(pipeline) = pipelines.get(&format) {
            return Ok(Arc::clone(pipeline));
        }

        let pipeline = Arc::new(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mipmap Pipeline"),
            layout: None,
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(format.into())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }));
        log::debug!("MipmapGenerator: created pipeline for {format:?}.");

        pipelines.insert(format, Arc::clone(&pipeline));
        Ok(pipeline)
    }

    /// The number of formats with a cached pipeline.
    pub fn cached_pipeline_count(&self) -> usize {
        self.pipelines.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_linear() {
        assert_eq!(MipmapSettings::default().filter, MipmapFilter::Linear);
    }

    #[test]
    fn filter_maps_to_wgpu() {
        let linear: wgpu::FilterMode = MipmapFilter::Linear.into_wgpu();
        let nearest: wgpu::FilterMode = MipmapFilter::Nearest.into_wgpu();
        assert_eq!(linear, wgpu::FilterMode::Linear);
        assert_eq!(nearest, wgpu::FilterMode::Nearest);
    }
}
