// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for model loading, configuration and report output.
//!
//! Geometric anomalies (degenerate triangles, open meshes) are not errors;
//! they are repaired and counted in [`crate::engine::MeshInfo`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine's outer layers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying file-system failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },

    /// Model file is not valid JSON for the expected schema.
    #[error("failed to parse model file {path}: {source}")]
    ModelParse {
        /// Model file.
        path: PathBuf,
        /// Source error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        /// Config file.
        path: PathBuf,
        /// Source error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// An STL file could not be decoded.
    #[error("failed to read STL file {path}: {reason}")]
    Stl {
        /// STL file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// A component description is inconsistent.
    #[error("invalid component '{component}': {reason}")]
    InvalidComponent {
        /// Component name.
        component: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_component(component: &str, reason: impl Into<String>) -> Self {
        Self::InvalidComponent {
            component: component.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::invalid_component("wing", "radius must be positive");
        assert_eq!(
            err.to_string(),
            "invalid component 'wing': radius must be positive"
        );

        let err = EngineError::io(
            "missing.stl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("missing.stl"));
    }
}
