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

// Lumen Sandbox
// Drives the forward technique over a headless device for a few frames.

mod headless;

use anyhow::{Context, Result};
use headless::{HeadlessDevice, HeadlessMaterials};
use lumen_core::math::{LinearRgba, Mat4, Sphere, Vec2, Vec3};
use lumen_core::renderer::{
    Background, BufferId, DirectionalLight, GraphicsDevice, IndexBinding, IndexFormat,
    MaterialId, PipelineId, PointLight, PrimitiveTopology, SceneData, SpriteVertex, TextureId,
    VertexLayout, Viewer,
};
use lumen_data::render_queue::{MaterialRef, MeshData};
use lumen_lanes::{ForwardRenderTechnique, ForwardSettings, RenderTechnique, TechniqueResources};
use std::path::PathBuf;
use std::rc::Rc;

const FRAME_COUNT: u32 = 4;

const LIT_PIPELINE: PipelineId = PipelineId(1);
const SPRITE_PIPELINE: PipelineId = PipelineId(2);

/// A camera circling the origin.
struct OrbitCamera {
    angle: f32,
    distance: f32,
}

impl Viewer for OrbitCamera {
    fn eye_position(&self) -> Vec3 {
        Vec3::new(self.angle.sin(), 0.3, self.angle.cos()) * self.distance
    }

    fn forward(&self) -> Vec3 {
        (-self.eye_position()).normalize_or_zero()
    }
}

struct Sky;

impl Background for Sky {
    fn draw(&self, device: &mut dyn GraphicsDevice, viewer: &dyn Viewer) {
        log::trace!("Sky: Drawn from {}", viewer.eye_position());
        device.draw(PrimitiveTopology::TriangleStrip, 0, 4);
    }
}

fn crate_mesh() -> MeshData {
    MeshData {
        vertex_buffer: BufferId(10_000),
        vertex_layout: VertexLayout::Custom(0),
        vertex_count: 24,
        index: Some(IndexBinding {
            buffer: BufferId(10_001),
            format: IndexFormat::Uint16,
            count: 36,
        }),
        topology: PrimitiveTopology::TriangleList,
    }
}

fn label_quads(text: &str, origin: Vec3) -> Vec<SpriteVertex> {
    let mut vertices = Vec::with_capacity(text.len() * 4);
    for (i, _) in text.char_indices() {
        let x = origin.x + i as f32 * 0.5;
        for (dx, dy, u, v) in [
            (0.0, 0.0, 0.0, 1.0),
            (0.5, 0.0, 1.0, 1.0),
            (0.0, 0.5, 0.0, 0.0),
            (0.5, 0.5, 1.0, 0.0),
        ] {
            vertices.push(SpriteVertex {
                position: [x + dx, origin.y + dy, origin.z],
                color: [255; 4],
                uv: [u, v],
            });
        }
    }
    vertices
}

/// Queues the demo scene for frame `frame`.
fn populate(technique: &mut ForwardRenderTechnique, frame: u32) {
    let queue = technique.render_queue_mut();
    queue.clear(false);

    let time = frame as f32 * 0.25;
    let crates = MaterialRef::batched(MaterialId(1), LIT_PIPELINE);
    let glass = MaterialRef::sorted(MaterialId(2), LIT_PIPELINE);
    let particles = MaterialRef::batched(MaterialId(3), SPRITE_PIPELINE);
    let labels = MaterialRef::sorted(MaterialId(4), SPRITE_PIPELINE);
    let bounds = Sphere::new(Vec3::ZERO, 0.87);

    // A field of crates, instanced when the device allows it.
    for x in -4..4 {
        for z in -4..4 {
            let position = Vec3::new(x as f32 * 2.0, 0.0, z as f32 * 2.0);
            queue.add_mesh(0, &crates, crate_mesh(), bounds, Mat4::from_translation(position));
        }
    }

    // Glass panes, drawn back to front.
    for i in 0..4 {
        let transform = Mat4::from_rotation_y(time + i as f32)
            * Mat4::from_translation(Vec3::new(0.0, 1.5, 3.0));
        queue.add_mesh(0, &glass, crate_mesh(), bounds, transform);
    }

    queue.add_directional_light(0, DirectionalLight::default());
    for i in 0..6 {
        let angle = time + i as f32;
        queue.add_point_light(
            0,
            PointLight {
                position: Vec3::new(angle.cos() * 5.0, 1.0, angle.sin() * 5.0),
                color: LinearRgba::rgb(1.0, 0.8, 0.6),
                radius: 6.0,
                ..Default::default()
            },
        );
    }

    for i in 0..32 {
        let height = (time + i as f32 * 0.1).fract() * 4.0;
        queue.add_billboard(
            0,
            &particles,
            Vec3::new((i % 8) as f32 - 4.0, height, (i / 8) as f32 - 2.0),
            Vec2::splat(0.25),
            time,
            [255, 200, 120, 180],
        );
    }

    // The overlay layer is drawn after the world.
    let title = label_quads("lumen", Vec3::new(-1.0, 3.0, 0.0));
    queue.add_sprites(1, &labels, &title, Some(TextureId(20_000)));
    let subtitle = label_quads("forward", Vec3::new(-1.5, 2.0, 1.0));
    queue.add_sprites(1, &labels, &subtitle, None);
}

fn settings_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/forward.ron"))
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = settings_path();
    let settings = ForwardSettings::load(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    log::info!("Sandbox: Loaded settings from {}", path.display());

    let mut device = HeadlessDevice::new(true);
    let mut materials = HeadlessMaterials::new();
    let resources = Rc::new(TechniqueResources::initialize(&mut device, settings.max_quads)?);
    let mut technique = ForwardRenderTechnique::new(Rc::clone(&resources), &mut device, settings)?;

    let sky = Sky;
    for frame in 0..FRAME_COUNT {
        // Instancing goes away halfway through, as on a device that lost it.
        technique.set_instancing_enabled(frame < FRAME_COUNT / 2);
        populate(&mut technique, frame);

        let camera = OrbitCamera {
            angle: frame as f32 * 0.5,
            distance: 12.0,
        };
        let scene = SceneData::new(&camera)
            .with_ambient(LinearRgba::rgb(0.1, 0.1, 0.15))
            .with_background(&sky);

        log::info!(
            "Sandbox: Frame {} estimated cost {:.2}",
            frame,
            technique.estimate_cost()
        );
        technique.clear(&scene, &mut device);
        technique.draw(&scene, &mut device, &mut materials)?;
        log::info!("Sandbox: Frame {}: {}", frame, technique.last_frame_stats());
    }

    technique.destroy(&mut device);
    resources.destroy(&mut device);

    let counters = device.counters();
    log::info!(
        "Sandbox: {} device draws, {} bytes uploaded, {} buffers leaked",
        counters.draws,
        counters.bytes_written,
        counters.buffers_alive
    );
    Ok(())
}
