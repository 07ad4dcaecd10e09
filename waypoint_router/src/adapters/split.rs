// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use waypoint_hierarchy::{Hierarchy, ScreenId};

use super::{ContainerAdapter, commit_children, finish, position_of};
use crate::types::Completion;
use crate::window::Window;

/// Split view: the first child is the primary pane, the last child is the shown detail.
#[derive(Clone, Copy, Debug, Default)]
pub struct SplitAdapter;

impl ContainerAdapter for SplitAdapter {
    fn visible_children(&self, hierarchy: &Hierarchy, container: ScreenId) -> Vec<ScreenId> {
        match hierarchy.children(container) {
            [] => Vec::new(),
            [only] => alloc::vec![*only],
            [primary, .., detail] => alloc::vec![*primary, *detail],
        }
    }

    /// Moves a hidden detail to the end so it becomes the shown detail.
    fn make_visible(
        &self,
        window: &Window,
        container: ScreenId,
        child: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        let reordered = {
            let h = window.hierarchy();
            let children = h.children(container);
            position_of(&h, children, container, child).map(|i| {
                let mut order = children.to_vec();
                if i != 0 {
                    let moved = order.remove(i);
                    order.push(moved);
                }
                order
            })
        };
        let result = reordered.and_then(|order| commit_children(window, container, order));
        finish(window, animated, completion, result);
    }
}
