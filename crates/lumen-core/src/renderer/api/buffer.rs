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

//! Defines data structures related to GPU buffer resources.

use bitflags::bitflags;
use std::borrow::Cow;

bitflags! {
    /// A set of flags describing the allowed usages of a [`BufferId`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// The buffer can be used as the destination of a write operation.
        const COPY_DST = 1 << 0;
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 1;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 2;
        /// The buffer can be bound as a per-instance data buffer.
        const INSTANCE = 1 << 3;
        /// The buffer is rewritten many times per frame.
        const DYNAMIC = 1 << 4;
    }
}

/// A descriptor used to create a [`BufferId`].
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// A bitmask of [`BufferUsage`] flags describing how the buffer will be used.
    pub usage: BufferUsage,
}

/// An opaque handle to a GPU buffer resource.
///
/// This ID is returned by [`GraphicsDevice::create_buffer`](crate::renderer::GraphicsDevice::create_buffer)
/// and is used to reference the buffer in all subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// The integer type of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexFormat {
    /// 16-bit unsigned indices.
    Uint16,
    /// 32-bit unsigned indices.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u64 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// An index buffer together with the format and number of its indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexBinding {
    /// The buffer holding the indices.
    pub buffer: BufferId,
    /// The format of each index.
    pub format: IndexFormat,
    /// The number of indices stored in the buffer.
    pub count: u32,
}
