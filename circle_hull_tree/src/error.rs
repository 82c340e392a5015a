// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by tree mutators and geometry reads.

use circle_hull::HullError;
use thiserror::Error;

use crate::types::NodeId;

/// Errors reported by [`Tree`](crate::Tree).
///
/// Every mutator validates its input before touching the tree, so an error
/// never leaves a partial change behind.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TreeError {
    /// The handle refers to a removed node (or was never issued by this tree).
    #[error("node {0:?} is not alive")]
    DanglingNode(NodeId),

    /// Attaching would make `node` its own ancestor.
    #[error("cannot attach {node:?} under its own descendant {parent:?}")]
    Cycle {
        /// The node being moved.
        node: NodeId,
        /// The requested parent.
        parent: NodeId,
    },

    /// A hull was read before it was refreshed. This is an internal consistency
    /// fault, never a caller mistake.
    #[error("hull of {0:?} was used while stale")]
    StaleHull(NodeId),

    /// Invalid geometry input, or (in strict mode) inconsistent hull geometry.
    #[error(transparent)]
    Geometry(#[from] HullError),
}
