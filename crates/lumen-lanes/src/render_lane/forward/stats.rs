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

/// Counters of one [`draw`](super::ForwardRenderTechnique::draw) call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionStats {
    /// Every draw call issued, instanced or not.
    pub draw_calls: u32,
    /// The subset of `draw_calls` that were instanced.
    pub instanced_draw_calls: u32,
    /// Pipelines applied through the material binder.
    pub pipeline_applications: u32,
    /// Materials applied through the material binder.
    pub material_applications: u32,
    /// Uploads to the streaming or instance buffer.
    pub buffer_fills: u32,
    /// Additive passes drawn after the first one.
    pub extra_light_passes: u32,
}

impl SubmissionStats {
    /// Records a non-instanced draw.
    #[inline]
    pub(crate) fn record_draw(&mut self) {
        self.draw_calls += 1;
    }

    /// Records an instanced draw.
    #[inline]
    pub(crate) fn record_instanced_draw(&mut self) {
        self.draw_calls += 1;
        self.instanced_draw_calls += 1;
    }
}

impl std::fmt::Display for SubmissionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} draws ({} instanced), {} pipelines, {} materials, {} fills, {} extra passes",
            self.draw_calls,
            self.instanced_draw_calls,
            self.pipeline_applications,
            self.material_applications,
            self.buffer_fills,
            self.extra_light_passes
        )
    }
}
