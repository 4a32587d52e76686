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

//! Picks the lights relevant to one object.

use lumen_core::math::{Sphere, Vec3};
use lumen_core::renderer::light::{LightKind, LightLists};

/// A selected light: its kind, its index in the matching [`LightLists`] vector, and its score.
///
/// Lower scores are more relevant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightIndex {
    /// The kind of light, selecting the list `index` points into.
    pub kind: LightKind,
    /// Relevance score. Lower is better.
    pub score: f32,
    /// Index into the list of `kind`.
    pub index: usize,
}

/// Selects and orders lights by relevance.
///
/// The selector owns its result buffer, so selections reuse the same allocation
/// from one object to the next. Each call overwrites the previous result.
#[derive(Debug, Default)]
pub struct LightSelector {
    selected: Vec<LightIndex>,
}

/// Score of a positional light of range `radius` at `position`, or `None` if it
/// cannot reach `sphere`.
#[inline]
fn positional_score(position: Vec3, radius: f32, sphere: &Sphere) -> Option<f32> {
    let distance = sphere.squared_distance_to(position);
    (distance <= radius * radius).then_some(distance)
}

impl LightSelector {
    /// Creates a selector with an empty result buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the lights that can affect `sphere`, most relevant first.
    ///
    /// Directional lights always qualify with a score of `0.0` and are skipped
    /// entirely when `include_directional` is `false`. Point and spot lights
    /// qualify when the squared distance from the light to the sphere surface is
    /// within their squared radius; that distance is their score.
    pub fn select(
        &mut self,
        lights: &LightLists,
        sphere: &Sphere,
        include_directional: bool,
    ) -> &[LightIndex] {
        self.selected.clear();

        if include_directional {
            self.push_directional(lights);
        }

        for (index, light) in lights.point.iter().enumerate() {
            if let Some(score) = positional_score(light.position, light.radius, sphere) {
                self.selected.push(LightIndex {
                    kind: LightKind::Point,
                    score,
                    index,
                });
            }
        }

        for (index, light) in lights.spot.iter().enumerate() {
            if let Some(score) = positional_score(light.position, light.radius, sphere) {
                self.selected.push(LightIndex {
                    kind: LightKind::Spot,
                    score,
                    index,
                });
            }
        }

        self.selected.sort_by(|a, b| a.score.total_cmp(&b.score));
        &self.selected
    }

    /// Selects every directional light, in insertion order.
    ///
    /// Used where per-object selection is impossible, such as instanced batches.
    pub fn select_directional(&mut self, lights: &LightLists) -> &[LightIndex] {
        self.selected.clear();
        self.push_directional(lights);
        &self.selected
    }

    fn push_directional(&mut self, lights: &LightLists) {
        self.selected
            .extend((0..lights.directional.len()).map(|index| LightIndex {
                kind: LightKind::Directional,
                score: 0.0,
                index,
            }));
    }

    /// The result of the last selection.
    pub fn selected(&self) -> &[LightIndex] {
        &self.selected
    }
}
