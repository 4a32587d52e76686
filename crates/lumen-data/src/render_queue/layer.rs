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

//! One ordering layer of the forward render queue.

use super::batch::{
    disable_all, BillboardBatches, MaterialRef, MeshBatches, MeshData, SpriteBatches,
    SpriteChain,
};
use lumen_core::math::{Mat4, Sphere, Vec3};
use lumen_core::renderer::api::{SpriteVertex, TextureId};
use lumen_core::renderer::light::LightLists;
use lumen_core::renderer::scene::{Drawable, Viewer};
use std::rc::Rc;

/// A mesh drawn back to front.
#[derive(Debug, Clone)]
pub struct DepthSortedMesh {
    /// The material of the mesh.
    pub material: MaterialRef,
    /// The geometry.
    pub mesh: MeshData,
    /// World-space bounding sphere.
    pub sphere: Sphere,
    /// World matrix.
    pub transform: Mat4,
}

/// A sprite chain drawn back to front.
#[derive(Debug, Clone, Copy)]
pub struct DepthSortedSprites {
    /// The material of the sprites.
    pub material: MaterialRef,
    /// The overlay texture, if any.
    pub overlay: Option<TextureId>,
    /// The quads, stored in the layer's depth-sorted vertex arena.
    pub chain: SpriteChain,
}

/// Everything queued for one render order.
#[derive(Default)]
pub struct RenderQueueLayer {
    /// Opaque meshes batched by pipeline and material.
    pub opaque_models: MeshBatches,
    /// Indices into `depth_sorted_mesh_data`, back to front once sorted.
    pub depth_sorted_meshes: Vec<usize>,
    /// Meshes whose material requires depth sorting, in insertion order.
    pub depth_sorted_mesh_data: Vec<DepthSortedMesh>,
    /// Opaque sprites batched by pipeline, material and overlay.
    pub opaque_sprites: SpriteBatches,
    /// Indices into `depth_sorted_sprite_data`, back to front once sorted.
    pub depth_sorted_sprites: Vec<usize>,
    /// Sprite chains whose material requires depth sorting, in insertion order.
    pub depth_sorted_sprite_data: Vec<DepthSortedSprites>,
    /// Vertex arena of `depth_sorted_sprite_data`.
    pub depth_sorted_sprite_vertices: Vec<SpriteVertex>,
    /// Billboards batched by pipeline and material.
    pub billboards: BillboardBatches,
    /// Objects drawing themselves, in insertion order.
    pub other_drawables: Vec<Rc<dyn Drawable>>,
    /// Lights affecting this layer.
    pub lights: LightLists,
    /// Consecutive partial clears without any object queued.
    pub(crate) clear_count: u32,
}

impl RenderQueueLayer {
    /// The vertices of a depth-sorted sprite entry.
    pub fn sorted_sprite_vertices(&self, entry: &DepthSortedSprites) -> &[SpriteVertex] {
        let start = entry.chain.first_vertex;
        &self.depth_sorted_sprite_vertices[start..start + entry.chain.quad_count * 4]
    }

    /// Returns `true` if no renderable is queued. Lights alone do not count.
    pub fn is_empty(&self) -> bool {
        self.opaque_models.values().all(|p| !p.enabled)
            && self.depth_sorted_meshes.is_empty()
            && self.opaque_sprites.values().all(|p| !p.enabled)
            && self.depth_sorted_sprites.is_empty()
            && self.billboards.values().all(|p| !p.enabled)
            && self.other_drawables.is_empty()
    }

    /// Orders the depth-sorted meshes and sprites back to front for `viewer`.
    ///
    /// The sort is stable: entries at equal depth keep their insertion order.
    pub fn sort(&mut self, viewer: &dyn Viewer) {
        let meshes = &self.depth_sorted_mesh_data;
        self.depth_sorted_meshes.sort_by(|&a, &b| {
            let depth_a = viewer.depth_of(meshes[a].sphere.center);
            let depth_b = viewer.depth_of(meshes[b].sphere.center);
            depth_b.total_cmp(&depth_a)
        });

        let sprites = &self.depth_sorted_sprite_data;
        let vertices = &self.depth_sorted_sprite_vertices;
        let anchor = |index: usize| -> Vec3 {
            Vec3::from_array(vertices[sprites[index].chain.first_vertex].position)
        };
        self.depth_sorted_sprites.sort_by(|&a, &b| {
            viewer
                .depth_of(anchor(b))
                .total_cmp(&viewer.depth_of(anchor(a)))
        });
    }

    /// Empties the layer for the next frame, keeping batch keys and allocations.
    pub(crate) fn reset(&mut self) {
        disable_all(&mut self.opaque_models);
        disable_all(&mut self.opaque_sprites);
        disable_all(&mut self.billboards);
        self.depth_sorted_meshes.clear();
        self.depth_sorted_mesh_data.clear();
        self.depth_sorted_sprites.clear();
        self.depth_sorted_sprite_data.clear();
        self.depth_sorted_sprite_vertices.clear();
        self.other_drawables.clear();
        self.lights.clear();
    }
}

impl std::fmt::Debug for RenderQueueLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderQueueLayer")
            .field("opaque_pipelines", &self.opaque_models.len())
            .field("depth_sorted_meshes", &self.depth_sorted_meshes.len())
            .field("sprite_pipelines", &self.opaque_sprites.len())
            .field("depth_sorted_sprites", &self.depth_sorted_sprites.len())
            .field("billboard_pipelines", &self.billboards.len())
            .field("other_drawables", &self.other_drawables.len())
            .field("lights", &self.lights.len())
            .finish()
    }
}
