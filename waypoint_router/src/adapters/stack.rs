// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use waypoint_hierarchy::{Hierarchy, ScreenId};

use super::{ContainerAdapter, commit_children, finish, position_of};
use crate::types::Completion;
use crate::window::Window;

/// Navigation stack: the last child is on top.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackAdapter;

impl ContainerAdapter for StackAdapter {
    fn visible_children(&self, hierarchy: &Hierarchy, container: ScreenId) -> Vec<ScreenId> {
        hierarchy.children(container).last().copied().into_iter().collect()
    }

    fn is_visible(&self, hierarchy: &Hierarchy, container: ScreenId, child: ScreenId) -> bool {
        hierarchy.children(container).last() == Some(&child)
    }

    fn removed_by_make_visible(
        &self,
        hierarchy: &Hierarchy,
        container: ScreenId,
        child: ScreenId,
    ) -> Vec<ScreenId> {
        let children = hierarchy.children(container);
        match children.iter().position(|&c| c == child) {
            Some(i) => children[i + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Pops every screen above `child`.
    fn make_visible(
        &self,
        window: &Window,
        container: ScreenId,
        child: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        let kept = {
            let h = window.hierarchy();
            let children = h.children(container);
            position_of(&h, children, container, child).map(|i| children[..=i].to_vec())
        };
        let result = kept.and_then(|kept| commit_children(window, container, kept));
        finish(window, animated, completion, result);
    }
}
