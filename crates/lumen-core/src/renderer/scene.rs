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

//! The per-frame scene context handed to a rendering technique.

use crate::math::{LinearRgba, Vec3};
use crate::renderer::traits::GraphicsDevice;

/// The point of view a frame is rendered from.
pub trait Viewer {
    /// World-space position of the eye.
    fn eye_position(&self) -> Vec3;

    /// World-space viewing direction (normalized).
    fn forward(&self) -> Vec3;

    /// Signed distance of `point` from the eye along the viewing direction.
    ///
    /// Used to order transparent geometry back to front.
    fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.eye_position()).dot(self.forward())
    }
}

/// Something drawn behind the scene once depth has been cleared (a skybox, a color fill).
pub trait Background {
    /// Draws the background for `viewer`.
    fn draw(&self, device: &mut dyn GraphicsDevice, viewer: &dyn Viewer);
}

/// A renderable that submits its own draw calls.
pub trait Drawable {
    /// Issues the draw calls for this object.
    fn draw(&self, device: &mut dyn GraphicsDevice);
}

/// Everything a technique needs to know about the frame besides its render queue.
#[derive(Clone, Copy)]
pub struct SceneData<'a> {
    /// The viewer the frame is rendered for.
    pub viewer: &'a dyn Viewer,
    /// The ambient color sent to every shader.
    pub ambient_color: LinearRgba,
    /// The background drawn by `clear`, if any.
    pub background: Option<&'a dyn Background>,
}

impl<'a> SceneData<'a> {
    /// Creates scene data with a black ambient and no background.
    pub fn new(viewer: &'a dyn Viewer) -> Self {
        Self {
            viewer,
            ambient_color: LinearRgba::BLACK,
            background: None,
        }
    }

    /// Sets the ambient color.
    pub fn with_ambient(mut self, ambient_color: LinearRgba) -> Self {
        self.ambient_color = ambient_color;
        self
    }

    /// Sets the background.
    pub fn with_background(mut self, background: &'a dyn Background) -> Self {
        self.background = Some(background);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Eye;

    impl Viewer for Eye {
        fn eye_position(&self) -> Vec3 {
            Vec3::new(0.0, 0.0, 5.0)
        }

        fn forward(&self) -> Vec3 {
            Vec3::NEG_Z
        }
    }

    #[test]
    fn test_depth_is_measured_along_forward() {
        let eye = Eye;
        assert_eq!(eye.depth_of(Vec3::new(0.0, 0.0, 0.0)), 5.0);
        assert_eq!(eye.depth_of(Vec3::new(3.0, 2.0, -5.0)), 10.0);
        assert!(eye.depth_of(Vec3::new(0.0, 0.0, 6.0)) < 0.0);
    }
}
