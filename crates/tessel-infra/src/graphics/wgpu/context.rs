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

use anyhow::anyhow;
use anyhow::Result;

/// Holds the core wgpu state objects required for transfers.
///
/// The context is headless: it owns an adapter, a logical device and its queue,
/// but no surface.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Store info for easy access
    pub adapter_name: String,
    pub adapter_backend: wgpu::Backend,
    pub active_device_features: wgpu::Features,
}

impl WgpuGraphicsContext {
    /// Asynchronously initializes a headless graphics context.
    ///
    /// ## Arguments
    /// * `label` - An optional debug label for the logical device.
    ///
    /// ## Returns
    /// * `Result<Self>` - The initialized context, or an error when no adapter or
    ///   device is available.
    pub async fn new_headless(label: Option<&str>) -> Result<Self> {
        log::info!("Initializing headless wgpu graphics context...");

        // --- 1. Select an Adapter ---
        let instance =
            wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No compatible graphics adapter: {}", e))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 2. Create Logical Device and Command Queue from Adapter ---
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some(label.unwrap_or("Tessel Logical Device")),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        let active_device_features = device.features();
        log::debug!("Active device features: {active_device_features:?}");

        Ok(WgpuGraphicsContext {
            adapter,
            device,
            queue,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            active_device_features,
        })
    }

    /// Blocking wrapper around [`new_headless`](Self::new_headless).
    pub fn new_headless_blocking(label: Option<&str>) -> Result<Self> {
        pollster::block_on(Self::new_headless(label))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
