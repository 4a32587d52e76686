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

//! The shader uniform contract and the shader lifecycle signals.
//!
//! A [`Shader`] is owned by the material system. Consumers that cache data derived
//! from a shader (resolved uniform locations, for instance) subscribe a
//! [`ShaderObserver`] to its [`ShaderSignals`]; the owner emits
//! [`ShaderEvent::Released`] before the shader goes away and
//! [`ShaderEvent::UniformsInvalidated`] whenever previously resolved locations
//! become stale. Delivery is synchronous, on the emitting thread.

use crate::math::{LinearRgba, Mat4, Vec2, Vec3, Vec4};
use crate::renderer::api::ShaderId;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// The location of a uniform inside a shader, as resolved by [`Shader::uniform_location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// Returns the location `delta` slots after this one.
    ///
    /// Used to address element `n` of a uniform array as `base + stride * n`.
    #[inline]
    pub const fn offset(self, delta: i32) -> Self {
        Self(self.0 + delta)
    }
}

/// A value sent to a shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// A signed integer.
    Int(i32),
    /// A boolean.
    Bool(bool),
    /// A single float.
    Float(f32),
    /// A 2-component vector.
    Vec2(Vec2),
    /// A 3-component vector.
    Vec3(Vec3),
    /// A 4-component vector.
    Vec4(Vec4),
    /// A linear color.
    Color(LinearRgba),
    /// A 4x4 matrix.
    Mat4(Mat4),
}

/// A lifecycle notification emitted by a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderEvent {
    /// The shader is about to be destroyed.
    Released(ShaderId),
    /// The shader's uniform locations changed and must be resolved again.
    UniformsInvalidated(ShaderId),
}

/// Receives [`ShaderEvent`]s.
pub trait ShaderObserver {
    /// Called synchronously by the emitting shader.
    fn on_shader_event(&self, event: ShaderEvent);
}

/// The list of observers attached to one shader.
///
/// Observers are held weakly: a dropped observer is skipped and pruned, and the
/// shader never keeps its consumers alive.
#[derive(Default)]
pub struct ShaderSignals {
    observers: RefCell<Vec<Weak<dyn ShaderObserver>>>,
}

impl ShaderSignals {
    /// Creates an empty signal list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `observer`. Attaching the same observer twice has no effect.
    pub fn subscribe(&self, observer: Weak<dyn ShaderObserver>) {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|o| o.strong_count() > 0);
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Delivers `event` to every live observer.
    pub fn emit(&self, event: ShaderEvent) {
        // Observers may subscribe again from inside the callback.
        let live: Vec<Rc<dyn ShaderObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.on_shader_event(event);
        }
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for ShaderSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderSignals")
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// A compiled shader as seen by the technique.
pub trait Shader {
    /// The unique id of this shader.
    fn id(&self) -> ShaderId;

    /// Resolves the location of the uniform called `name`, or `None` if the shader does not use it.
    fn uniform_location(&self, name: &str) -> Option<UniformLocation>;

    /// Sets the uniform at `location`. The value persists until overwritten.
    fn send_uniform(&self, location: UniformLocation, value: UniformValue);

    /// The lifecycle signals of this shader.
    fn signals(&self) -> &ShaderSignals;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter {
        hits: Cell<u32>,
    }

    impl ShaderObserver for Counter {
        fn on_shader_event(&self, _event: ShaderEvent) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let signals = ShaderSignals::new();
        let counter = Rc::new(Counter::default());
        let weak: Weak<dyn ShaderObserver> = Rc::downgrade(&counter) as Weak<dyn ShaderObserver>;

        signals.subscribe(weak.clone());
        signals.subscribe(weak);
        assert_eq!(signals.observer_count(), 1);

        signals.emit(ShaderEvent::Released(ShaderId(1)));
        assert_eq!(counter.hits.get(), 1);
    }

    #[test]
    fn test_dropped_observers_are_skipped() {
        let signals = ShaderSignals::new();
        {
            let counter = Rc::new(Counter::default());
            signals.subscribe(Rc::downgrade(&counter) as Weak<dyn ShaderObserver>);
            assert_eq!(signals.observer_count(), 1);
        }
        assert_eq!(signals.observer_count(), 0);
        signals.emit(ShaderEvent::UniformsInvalidated(ShaderId(3)));
    }

    #[test]
    fn test_location_offset() {
        assert_eq!(UniformLocation(4).offset(6), UniformLocation(10));
    }
}
