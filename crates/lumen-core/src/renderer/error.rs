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

//! Defines the hierarchy of error types for the rendering subsystem.

use std::fmt;

/// An error related to the creation or use of a GPU resource (buffers, textures, etc.).
#[derive(Debug)]
pub enum ResourceError {
    /// A generic resource could not be found.
    NotFound,
    /// The handle or ID used to reference a resource is invalid.
    InvalidHandle,
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds (e.g., in a buffer).
    OutOfBounds,
    /// The device cannot honor the requested descriptor.
    Unsupported(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound => write!(f, "Resource not found with ID."),
            ResourceError::InvalidHandle => write!(f, "Invalid resource handle or ID."),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
            ResourceError::Unsupported(msg) => {
                write!(f, "Unsupported resource request: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// A high-level error raised by a rendering technique.
#[derive(Debug)]
pub enum RenderError {
    /// A failure occurred while creating the technique's GPU resources.
    InitializationFailed(String),
    /// A rendering operation failed while submitting a frame.
    RenderingFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// An unexpected or internal error occurred.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize rendering resources: {msg}")
            }
            RenderError::RenderingFailed(msg) => {
                write!(f, "A rendering operation failed: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::Internal(msg) => {
                write!(f, "An internal or unexpected error occurred: {msg}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_resource_error_display() {
        let err = ResourceError::BackendError("out of memory".to_string());
        assert_eq!(
            format!("{err}"),
            "Backend-specific resource error: out of memory"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_render_error_display_wrapping_resource_error() {
        let render_err: RenderError = ResourceError::OutOfBounds.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Resource access out of bounds."
        );
        assert!(render_err.source().is_some());
    }

    #[test]
    fn test_render_error_without_source() {
        let err = RenderError::InitializationFailed("no quad buffer".to_string());
        assert_eq!(
            format!("{err}"),
            "Failed to initialize rendering resources: no quad buffer"
        );
        assert!(err.source().is_none());
    }
}
