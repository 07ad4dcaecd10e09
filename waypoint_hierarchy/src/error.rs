// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by structural hierarchy updates.

use crate::types::ScreenId;

/// A structural update was rejected; the hierarchy is unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// The identifier no longer refers to a live screen.
    #[error("screen {0} is no longer alive")]
    StaleScreen(ScreenId),
    /// The screen already has a parent, a presenter, or is the root.
    #[error("screen {0} is already attached to the hierarchy")]
    AlreadyAttached(ScreenId),
    /// The screen does not hold children.
    #[error("screen {0} is not a container")]
    NotAContainer(ScreenId),
    /// The screen is not a child of the given container.
    #[error("screen {child} is not a child of {container}")]
    NotAChild {
        /// Expected child.
        child: ScreenId,
        /// Container that was searched.
        container: ScreenId,
    },
    /// The same child was listed more than once.
    #[error("screen {0} is listed more than once")]
    DuplicateChild(ScreenId),
    /// The screen already presents another screen.
    #[error("screen {presenter} is already presenting {presented}")]
    AlreadyPresenting {
        /// Screen that was asked to present.
        presenter: ScreenId,
        /// Screen it currently presents.
        presented: ScreenId,
    },
    /// Linking would make a screen its own ancestor.
    #[error("attaching {screen} under {anchor} would create a cycle")]
    WouldCycle {
        /// Screen being attached.
        screen: ScreenId,
        /// Attachment point.
        anchor: ScreenId,
    },
}
