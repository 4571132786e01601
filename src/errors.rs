//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`UmbraError`] covers the failure modes of the
//! construction paths:
//! - Stale or mismatched node handles passed to hierarchy operations
//! - Graphics collaborator failures (buffer, program, texture creation)
//! - Text shaping and asset import failures
//! - Invalid skin bindings and settings documents
//!
//! Per-frame rendering never fails: a missing active camera, overlay camera
//! or fog node simply turns the corresponding step into a no-op, and lookups
//! such as [`World::find_node`](crate::World::find_node) return `Option`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use umbra::errors::{UmbraError, Result};
//!
//! fn build() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the engine.
#[derive(Error, Debug)]
pub enum UmbraError {
    // ========================================================================
    // Scene Graph Errors
    // ========================================================================
    /// The handle does not refer to a live node (removed, or never inserted).
    #[error("Node handle is stale or invalid: {0}")]
    InvalidNode(String),

    /// The node exists but is not of the kind the operation requires.
    #[error("Node type mismatch: expected {expected}, found {found}")]
    NodeTypeMismatch {
        /// Kind required by the operation
        expected: &'static str,
        /// Kind actually stored in the node
        found: &'static str,
    },

    /// Re-parenting would create a cycle in the tree.
    #[error("Cannot attach node: {0}")]
    InvalidHierarchy(String),

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// The graphics collaborator failed to create or update a resource.
    #[error("Graphics resource error: {0}")]
    Graphics(String),

    /// The text shaper failed to lay out a string.
    #[error("Text shaping error: {0}")]
    TextShaping(String),

    // ========================================================================
    // Controller Errors
    // ========================================================================
    /// Bone lists, inverse bind transforms and weights disagree.
    #[error("Invalid skin binding: {0}")]
    InvalidSkin(String),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecodeError(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings document could not be parsed.
    #[error("Settings parse error: {0}")]
    SettingsError(#[from] serde_json::Error),
}

impl From<image::ImageError> for UmbraError {
    fn from(err: image::ImageError) -> Self {
        UmbraError::ImageDecodeError(err.to_string())
    }
}

/// Alias for `Result<T, UmbraError>`.
pub type Result<T> = std::result::Result<T, UmbraError>;
