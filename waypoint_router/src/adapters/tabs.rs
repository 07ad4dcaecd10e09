// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use waypoint_hierarchy::{Hierarchy, ScreenId};

use super::{ContainerAdapter, finish, position_of};
use crate::types::Completion;
use crate::window::Window;

/// Tab switcher: the selected child is visible; with no selection, the first one is.
#[derive(Clone, Copy, Debug, Default)]
pub struct TabsAdapter;

impl TabsAdapter {
    fn shown(hierarchy: &Hierarchy, container: ScreenId) -> Option<ScreenId> {
        hierarchy
            .selected(container)
            .or_else(|| hierarchy.children(container).first().copied())
    }
}

impl ContainerAdapter for TabsAdapter {
    fn visible_children(&self, hierarchy: &Hierarchy, container: ScreenId) -> Vec<ScreenId> {
        Self::shown(hierarchy, container).into_iter().collect()
    }

    fn is_visible(&self, hierarchy: &Hierarchy, container: ScreenId, child: ScreenId) -> bool {
        Self::shown(hierarchy, container) == Some(child)
    }

    fn make_visible(
        &self,
        window: &Window,
        container: ScreenId,
        child: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        let result = {
            let mut h = window.hierarchy_mut();
            let children = h.children(container);
            position_of(&h, children, container, child)
                .and_then(|_| h.select(container, child).map_err(Into::into))
        };
        finish(window, animated, completion, result);
    }
}
