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

//! The forward render queue.
//!
//! The scene producer clears the queue, pushes every visible renderable and light
//! into the layer of its render order, then calls [`ForwardRenderQueue::sort`]
//! once the viewer is known. The forward technique reads the layers in ascending
//! render order.
//!
//! Renderables whose material is [`MaterialRef::depth_sorted`] are kept as
//! individual entries; everything else is grouped into pipeline → material
//! batches.

mod batch;
mod layer;

pub use self::batch::{
    BatchContents, BatchTree, BillboardBatches, MaterialBatch, MaterialRef, MeshBatches,
    MeshData, MeshInstanceEntry, PipelineBatch, SpriteBatches, SpriteChain, SpriteChainList,
};
pub use self::layer::{DepthSortedMesh, DepthSortedSprites, RenderQueueLayer};

use self::batch::{enable, record_instances};
use lumen_core::math::{Mat4, Sphere, Vec2, Vec3};
use lumen_core::renderer::api::{BillboardData, SpriteVertex, TextureId};
use lumen_core::renderer::light::{DirectionalLight, PointLight, SpotLight};
use lumen_core::renderer::scene::{Drawable, Viewer};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Number of consecutive partial clears after which an unused layer is dropped.
pub const MAX_IDLE_CLEARS: u32 = 100;

/// Renderables and lights of one frame, organized by render order.
#[derive(Debug, Default)]
pub struct ForwardRenderQueue {
    layers: BTreeMap<i32, RenderQueueLayer>,
}

impl ForwardRenderQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the layer for `render_order`, creating it if needed, and marks it as used.
    pub fn layer_mut(&mut self, render_order: i32) -> &mut RenderQueueLayer {
        let layer = self.layers.entry(render_order).or_default();
        layer.clear_count = 0;
        layer
    }

    /// Returns the layer for `render_order`, if it exists.
    pub fn layer(&self, render_order: i32) -> Option<&RenderQueueLayer> {
        self.layers.get(&render_order)
    }

    /// Iterates the layers in ascending render order.
    pub fn layers(&self) -> impl Iterator<Item = (i32, &RenderQueueLayer)> {
        self.layers.iter().map(|(order, layer)| (*order, layer))
    }

    /// Number of layers, including the ones kept empty between frames.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Queues one instance of `mesh` with world matrix `transform`.
    ///
    /// `bounding_sphere` is expressed in object space.
    pub fn add_mesh(
        &mut self,
        render_order: i32,
        material: &MaterialRef,
        mesh: MeshData,
        bounding_sphere: Sphere,
        transform: Mat4,
    ) {
        let layer = self.layer_mut(render_order);
        if material.depth_sorted {
            layer
                .depth_sorted_meshes
                .push(layer.depth_sorted_mesh_data.len());
            layer.depth_sorted_mesh_data.push(DepthSortedMesh {
                material: *material,
                mesh,
                sphere: bounding_sphere.transformed(&transform),
                transform,
            });
            return;
        }

        let batch = enable(&mut layer.opaque_models, material);
        let entry = batch.contents.entry(mesh).or_default();
        entry.bounding_sphere = bounding_sphere;
        entry.instances.push(transform);
        let count = entry.instances.len();
        record_instances(&mut layer.opaque_models, material, count);
    }

    /// Queues a chain of sprite quads (4 vertices per quad) sharing one overlay.
    ///
    /// Trailing vertices that do not form a whole quad are ignored, and chains
    /// without any quad are not queued.
    pub fn add_sprites(
        &mut self,
        render_order: i32,
        material: &MaterialRef,
        vertices: &[SpriteVertex],
        overlay: Option<TextureId>,
    ) {
        let quad_count = vertices.len() / 4;
        if quad_count == 0 {
            return;
        }
        let vertices = &vertices[..quad_count * 4];
        let layer = self.layer_mut(render_order);

        if material.depth_sorted {
            let chain = SpriteChain {
                first_vertex: layer.depth_sorted_sprite_vertices.len(),
                quad_count,
            };
            layer.depth_sorted_sprite_vertices.extend_from_slice(vertices);
            layer
                .depth_sorted_sprites
                .push(layer.depth_sorted_sprite_data.len());
            layer.depth_sorted_sprite_data.push(DepthSortedSprites {
                material: *material,
                overlay,
                chain,
            });
            return;
        }

        let batch = enable(&mut layer.opaque_sprites, material);
        batch
            .contents
            .entry(overlay)
            .or_default()
            .push(vertices);
    }

    /// Queues billboards.
    pub fn add_billboards(
        &mut self,
        render_order: i32,
        material: &MaterialRef,
        billboards: &[BillboardData],
    ) {
        if billboards.is_empty() {
            return;
        }
        let layer = self.layer_mut(render_order);
        let batch = enable(&mut layer.billboards, material);
        batch.contents.extend_from_slice(billboards);
        let count = batch.contents.len();
        record_instances(&mut layer.billboards, material, count);
    }

    /// Queues a single billboard rotated by `rotation` radians.
    pub fn add_billboard(
        &mut self,
        render_order: i32,
        material: &MaterialRef,
        center: Vec3,
        size: Vec2,
        rotation: f32,
        color: [u8; 4],
    ) {
        let billboard = BillboardData::new(center, size, rotation, color);
        self.add_billboards(render_order, material, std::slice::from_ref(&billboard));
    }

    /// Queues an object that issues its own draw calls.
    pub fn add_drawable(&mut self, render_order: i32, drawable: Rc<dyn Drawable>) {
        self.layer_mut(render_order).other_drawables.push(drawable);
    }

    /// Adds a directional light to the layer of `render_order`.
    pub fn add_directional_light(&mut self, render_order: i32, light: DirectionalLight) {
        self.layer_mut(render_order).lights.directional.push(light);
    }

    /// Adds a point light to the layer of `render_order`.
    pub fn add_point_light(&mut self, render_order: i32, light: PointLight) {
        self.layer_mut(render_order).lights.point.push(light);
    }

    /// Adds a spot light to the layer of `render_order`.
    pub fn add_spot_light(&mut self, render_order: i32, light: SpotLight) {
        self.layer_mut(render_order).lights.spot.push(light);
    }

    /// Orders every depth-sorted entry back to front for `viewer`.
    pub fn sort(&mut self, viewer: &dyn Viewer) {
        for layer in self.layers.values_mut() {
            layer.sort(viewer);
        }
    }

    /// Resets the queue before a new population.
    ///
    /// With `fully`, every layer and batch is dropped. Otherwise batch keys and
    /// allocations are kept and disabled, and layers idle for more than
    /// [`MAX_IDLE_CLEARS`] consecutive clears are dropped.
    pub fn clear(&mut self, fully: bool) {
        if fully {
            self.layers.clear();
            return;
        }

        self.layers.retain(|order, layer| {
            if layer.clear_count >= MAX_IDLE_CLEARS {
                log::trace!("ForwardRenderQueue: Dropping idle layer {}", order);
                return false;
            }
            layer.clear_count += 1;
            layer.reset();
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lumen_core::renderer::api::{
        BufferId, MaterialId, PipelineId, PrimitiveTopology, VertexLayout,
    };

    struct LookDownZ;

    impl Viewer for LookDownZ {
        fn eye_position(&self) -> Vec3 {
            Vec3::ZERO
        }

        fn forward(&self) -> Vec3 {
            Vec3::NEG_Z
        }
    }

    fn mesh(buffer: usize) -> MeshData {
        MeshData {
            vertex_buffer: BufferId(buffer),
            vertex_layout: VertexLayout::Custom(0),
            vertex_count: 3,
            index: None,
            topology: PrimitiveTopology::TriangleList,
        }
    }

    fn quads_at(z: f32, count: usize) -> Vec<SpriteVertex> {
        vec![
            SpriteVertex {
                position: [0.0, 0.0, z],
                ..Default::default()
            };
            count * 4
        ]
    }

    #[test]
    fn test_meshes_are_batched_by_pipeline_and_material() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::batched(MaterialId(1), PipelineId(1));
        for _ in 0..3 {
            queue.add_mesh(0, &material, mesh(7), Sphere::default(), Mat4::IDENTITY);
        }
        queue.add_mesh(0, &material, mesh(8), Sphere::default(), Mat4::IDENTITY);

        let layer = queue.layer(0).unwrap();
        let pipeline = &layer.opaque_models[&PipelineId(1)];
        assert!(pipeline.enabled);
        assert_eq!(pipeline.max_instance_count, 3);
        let batch = &pipeline.materials[&MaterialId(1)];
        assert_eq!(batch.contents.len(), 2);
        assert_eq!(batch.contents[&mesh(7)].instances.len(), 3);
    }

    #[test]
    fn test_depth_sorted_meshes_are_sorted_back_to_front() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::sorted(MaterialId(1), PipelineId(1));
        for z in [-2.0, -10.0, -5.0] {
            queue.add_mesh(
                0,
                &material,
                mesh(1),
                Sphere::new(Vec3::ZERO, 1.0),
                Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
            );
        }
        queue.sort(&LookDownZ);

        let layer = queue.layer(0).unwrap();
        assert_eq!(layer.depth_sorted_meshes, vec![1, 2, 0]);
        assert!(layer.opaque_models.is_empty());
    }

    #[test]
    fn test_depth_sorted_bounds_are_kept_in_world_space() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::sorted(MaterialId(1), PipelineId(1));
        let transform =
            Mat4::from_translation(Vec3::new(1.0, 0.0, -4.0)) * Mat4::from_scale(Vec3::splat(2.0));
        queue.add_mesh(0, &material, mesh(1), Sphere::new(Vec3::X, 0.5), transform);

        let entry = &queue.layer(0).unwrap().depth_sorted_mesh_data[0];
        assert_relative_eq!(entry.sphere.center.x, 3.0);
        assert_relative_eq!(entry.sphere.center.z, -4.0);
        assert_relative_eq!(entry.sphere.radius, 1.0);
    }

    #[test]
    fn test_sorting_is_stable_for_equal_depths() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::sorted(MaterialId(1), PipelineId(1));
        for _ in 0..4 {
            queue.add_sprites(0, &material, &quads_at(-3.0, 1), None);
        }
        queue.sort(&LookDownZ);
        assert_eq!(queue.layer(0).unwrap().depth_sorted_sprites, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_depth_sorted_sprites_use_first_vertex() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::sorted(MaterialId(1), PipelineId(1));
        queue.add_sprites(0, &material, &quads_at(-1.0, 2), None);
        queue.add_sprites(0, &material, &quads_at(-4.0, 1), Some(TextureId(3)));
        queue.sort(&LookDownZ);

        let layer = queue.layer(0).unwrap();
        assert_eq!(layer.depth_sorted_sprites, vec![1, 0]);
        let far = &layer.depth_sorted_sprite_data[1];
        assert_eq!(far.overlay, Some(TextureId(3)));
        assert_eq!(layer.sorted_sprite_vertices(far).len(), 4);
    }

    #[test]
    fn test_sprites_are_grouped_by_overlay() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::batched(MaterialId(2), PipelineId(1));
        queue.add_sprites(0, &material, &quads_at(0.0, 2), None);
        queue.add_sprites(0, &material, &quads_at(0.0, 1), None);
        queue.add_sprites(0, &material, &quads_at(0.0, 1), Some(TextureId(9)));
        queue.add_sprites(0, &material, &[], Some(TextureId(10)));

        let layer = queue.layer(0).unwrap();
        let batch = &layer.opaque_sprites[&PipelineId(1)].materials[&MaterialId(2)];
        assert_eq!(batch.contents.len(), 2);
        assert_eq!(batch.contents[&None].len(), 2);
        assert_eq!(batch.contents[&None].quad_count(), 3);
    }

    #[test]
    fn test_partial_clear_keeps_keys_and_disables_batches() {
        let mut queue = ForwardRenderQueue::new();
        let material = MaterialRef::batched(MaterialId(1), PipelineId(1));
        queue.add_mesh(0, &material, mesh(1), Sphere::default(), Mat4::IDENTITY);
        queue.add_billboard(0, &material, Vec3::ZERO, Vec2::ONE, 0.0, [255; 4]);
        queue.add_point_light(0, PointLight::default());

        queue.clear(false);

        let layer = queue.layer(0).unwrap();
        let pipeline = &layer.opaque_models[&PipelineId(1)];
        assert!(!pipeline.enabled);
        assert!(pipeline.materials[&MaterialId(1)].contents[&mesh(1)]
            .instances
            .is_empty());
        assert!(layer.lights.is_empty());
        assert!(layer.is_empty());
    }

    #[test]
    fn test_full_clear_drops_everything() {
        let mut queue = ForwardRenderQueue::new();
        queue.add_directional_light(3, DirectionalLight::default());
        queue.clear(true);
        assert_eq!(queue.layer_count(), 0);
    }

    #[test]
    fn test_idle_layers_are_dropped() {
        let mut queue = ForwardRenderQueue::new();
        queue.add_point_light(1, PointLight::default());
        queue.add_point_light(2, PointLight::default());

        for _ in 0..MAX_IDLE_CLEARS {
            queue.clear(false);
            // Layer 2 stays in use.
            queue.add_point_light(2, PointLight::default());
        }
        assert_eq!(queue.layer_count(), 2);

        queue.clear(false);
        assert!(queue.layer(1).is_none());
        assert!(queue.layer(2).is_some());
    }

    #[test]
    fn test_layers_iterate_in_ascending_order() {
        let mut queue = ForwardRenderQueue::new();
        queue.add_point_light(5, PointLight::default());
        queue.add_point_light(-1, PointLight::default());
        queue.add_point_light(2, PointLight::default());
        let orders: Vec<i32> = queue.layers().map(|(order, _)| order).collect();
        assert_eq!(orders, vec![-1, 2, 5]);
    }
}
