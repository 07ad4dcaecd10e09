// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core hierarchy implementation: structure, updates, queries.

use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::error::HierarchyError;
use crate::types::{ContainerKind, Screen, ScreenFlags, ScreenId};

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

/// The live screen hierarchy of one window.
///
/// Screens are stored in generational slots. A screen is either the window root, a child of a
/// container screen, a presentation hanging off another screen, or detached (freshly built and
/// not yet attached).
pub struct Hierarchy {
    nodes: Vec<Option<Node>>, // slots
    generations: Vec<u32>,    // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: Option<ScreenId>,
    revision: u64,
}

impl core::fmt::Debug for Hierarchy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Hierarchy")
            .field("screens_total", &total)
            .field("screens_alive", &alive)
            .field("free_list", &free)
            .field("root", &self.root)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

struct Node {
    generation: u32,
    parent: Option<ScreenId>,
    children: Vec<ScreenId>,
    selected: Option<ScreenId>,
    presented: Option<ScreenId>,
    presenting: Option<ScreenId>,
    flags: ScreenFlags,
    screen: Screen,
}

impl Node {
    fn new(generation: u32, screen: Screen) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            selected: None,
            presented: None,
            presenting: None,
            flags: ScreenFlags::empty(),
            screen,
        }
    }
}

/// Display adapter naming a screen by label (or model type) and identifier.
#[derive(Clone, Copy, Debug)]
pub struct Described<'a> {
    id: ScreenId,
    name: Option<&'a str>,
}

impl core::fmt::Display for Described<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.name {
            Some(name) => write!(f, "{name}{}", self.id),
            None => write!(f, "<stale>{}", self.id),
        }
    }
}

/// Pre-order iterator over a screen and its container descendants.
///
/// Children are visited in stored order. Presentations are not followed.
#[derive(Debug)]
pub struct Descendants<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<ScreenId>,
}

impl Iterator for Descendants<'_> {
    type Item = ScreenId;

    fn next(&mut self) -> Option<ScreenId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.hierarchy.children(id).iter().rev().copied());
        Some(id)
    }
}

impl Hierarchy {
    /// Create a new empty hierarchy.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: None,
            revision: 0,
        }
    }

    /// Insert a new detached screen.
    pub fn insert(&mut self, screen: Screen) -> ScreenId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, screen));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ScreenId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, screen)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ScreenId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        self.revision += 1;
        ScreenId::new(idx, generation)
    }

    /// Remove a screen together with its children and presentations.
    pub fn remove(&mut self, id: ScreenId) {
        if !self.is_alive(id) {
            return;
        }
        let (parent, presenting) = {
            let n = self.node(id);
            (n.parent, n.presenting)
        };
        if let Some(parent) = parent {
            self.unlink_parent(id, parent);
        }
        if let Some(presenter) = presenting {
            self.node_mut(presenter).presented = None;
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.drop_subtree(id);
        self.revision += 1;
    }

    /// Returns true if `id` refers to a live screen.
    ///
    /// See [`ScreenId`] docs for the generational semantics.
    pub fn is_alive(&self, id: ScreenId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Number of live screens, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if no screen is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter bumped by every structural or flag mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Root screen of the window.
    pub fn root(&self) -> Option<ScreenId> {
        self.root
    }

    /// Install `screen` as the window root and return the displaced root.
    ///
    /// The displaced root stays alive and detached; callers decide whether to remove it.
    pub fn set_root(&mut self, screen: ScreenId) -> Result<Option<ScreenId>, HierarchyError> {
        self.ensure_alive(screen)?;
        if self.root == Some(screen) {
            return Ok(None);
        }
        self.ensure_detached(screen)?;
        let previous = self.root.replace(screen);
        self.revision += 1;
        Ok(previous)
    }

    /// Clear the window root and return it, detached.
    pub fn take_root(&mut self) -> Option<ScreenId> {
        let previous = self.root.take();
        if previous.is_some() {
            self.revision += 1;
        }
        previous
    }

    /// Returns true if the screen is alive and not linked anywhere.
    pub fn is_detached(&self, id: ScreenId) -> bool {
        self.node_opt(id)
            .is_some_and(|n| n.parent.is_none() && n.presenting.is_none())
            && self.root != Some(id)
    }

    /// Replace the children of a container and return the children that were displaced.
    ///
    /// Every new child must be detached or already a child of `container`.
    /// Displaced children stay alive and detached.
    pub fn set_children(
        &mut self,
        container: ScreenId,
        children: Vec<ScreenId>,
    ) -> Result<Vec<ScreenId>, HierarchyError> {
        self.ensure_alive(container)?;
        if self.node(container).screen.container.is_none() {
            return Err(HierarchyError::NotAContainer(container));
        }
        for (i, &child) in children.iter().enumerate() {
            self.ensure_alive(child)?;
            if children[..i].contains(&child) {
                return Err(HierarchyError::DuplicateChild(child));
            }
            if self.node(child).parent != Some(container) {
                self.ensure_detached(child)?;
                self.ensure_not_above(child, container)?;
            }
        }
        let old = core::mem::take(&mut self.node_mut(container).children);
        let displaced: Vec<ScreenId> = old
            .iter()
            .copied()
            .filter(|c| !children.contains(c))
            .collect();
        for &d in &displaced {
            self.node_mut(d).parent = None;
        }
        for &c in &children {
            self.node_mut(c).parent = Some(container);
        }
        let node = self.node_mut(container);
        node.children = children;
        if let Some(selected) = node.selected
            && !node.children.contains(&selected)
        {
            node.selected = None;
        }
        self.revision += 1;
        Ok(displaced)
    }

    /// Children of a container in stored order; empty for leaves and stale ids.
    pub fn children(&self, id: ScreenId) -> &[ScreenId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Container holding `id`, if any.
    pub fn parent(&self, id: ScreenId) -> Option<ScreenId> {
        self.node_opt(id)?.parent
    }

    /// Container ancestors of `id`, nearest first. Presentation links are not followed.
    pub fn ancestors(&self, id: ScreenId) -> impl Iterator<Item = ScreenId> + '_ {
        core::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// Pre-order traversal of `id` and its container descendants.
    pub fn descendants(&self, id: ScreenId) -> Descendants<'_> {
        let stack = if self.is_alive(id) {
            alloc::vec![id]
        } else {
            Vec::new()
        };
        Descendants {
            hierarchy: self,
            stack,
        }
    }

    /// Mark `child` as the selected child of `container`.
    pub fn select(&mut self, container: ScreenId, child: ScreenId) -> Result<(), HierarchyError> {
        self.ensure_alive(container)?;
        self.ensure_alive(child)?;
        if self.node(child).parent != Some(container) {
            return Err(HierarchyError::NotAChild { child, container });
        }
        self.node_mut(container).selected = Some(child);
        self.revision += 1;
        Ok(())
    }

    /// Selected child of a container, if any.
    pub fn selected(&self, container: ScreenId) -> Option<ScreenId> {
        self.node_opt(container)?.selected
    }

    /// Attach `screen` as a presentation on top of `presenter`.
    pub fn present(&mut self, presenter: ScreenId, screen: ScreenId) -> Result<(), HierarchyError> {
        self.ensure_alive(presenter)?;
        self.ensure_alive(screen)?;
        if let Some(presented) = self.node(presenter).presented {
            return Err(HierarchyError::AlreadyPresenting {
                presenter,
                presented,
            });
        }
        self.ensure_detached(screen)?;
        self.ensure_not_above(screen, presenter)?;
        self.node_mut(presenter).presented = Some(screen);
        self.node_mut(screen).presenting = Some(presenter);
        self.revision += 1;
        Ok(())
    }

    /// Remove whatever `presenter` presents, including nested presentations.
    ///
    /// Returns the (now stale) identifier of the removed presentation.
    pub fn dismiss(&mut self, presenter: ScreenId) -> Option<ScreenId> {
        let presented = self.node_opt_mut(presenter)?.presented.take()?;
        self.node_mut(presented).presenting = None;
        self.drop_subtree(presented);
        self.revision += 1;
        Some(presented)
    }

    /// Screen presented by `id`, if any.
    pub fn presented(&self, id: ScreenId) -> Option<ScreenId> {
        self.node_opt(id)?.presented
    }

    /// Screen that presents `id`, if `id` is a presentation.
    pub fn presenting(&self, id: ScreenId) -> Option<ScreenId> {
        self.node_opt(id)?.presenting
    }

    /// Top of the container chain holding `id` (the root, a presentation, or a detached screen).
    pub fn presentation_root(&self, id: ScreenId) -> Option<ScreenId> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.ancestors(id).last().unwrap_or(id))
    }

    /// First presentation found in the container subtree of `context` that is not being dismissed.
    pub fn active_presentation(&self, context: ScreenId) -> Option<ScreenId> {
        self.descendants(context).find_map(|id| {
            self.presented(id)
                .filter(|&p| !self.flags(p).contains(ScreenFlags::BEING_DISMISSED))
        })
    }

    /// Topmost presentation context of the window: the root, or the last active presentation above it.
    pub fn topmost(&self) -> Option<ScreenId> {
        let mut current = self.root?;
        while let Some(next) = self.active_presentation(current) {
            current = next;
        }
        Some(current)
    }

    /// Transition flags of a screen; empty for stale ids.
    pub fn flags(&self, id: ScreenId) -> ScreenFlags {
        self.node_opt(id).map(|n| n.flags).unwrap_or_default()
    }

    /// Set transition flags.
    pub fn insert_flags(&mut self, id: ScreenId, flags: ScreenFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags.insert(flags);
            self.revision += 1;
        }
    }

    /// Clear transition flags.
    pub fn remove_flags(&mut self, id: ScreenId, flags: ScreenFlags) {
        if let Some(n) = self.node_opt_mut(id) {
            n.flags.remove(flags);
            self.revision += 1;
        }
    }

    /// Container kind of a screen, if it is a container.
    pub fn container_kind(&self, id: ScreenId) -> Option<ContainerKind> {
        self.node_opt(id)?.screen.container
    }

    /// Typed access to a screen's model.
    pub fn model<M: Any>(&self, id: ScreenId) -> Option<&M> {
        self.node_opt(id)?.screen.model.downcast_ref()
    }

    /// Typed mutable access to a screen's model.
    pub fn model_mut<M: Any>(&mut self, id: ScreenId) -> Option<&mut M> {
        self.node_opt_mut(id)?.screen.model.downcast_mut()
    }

    /// [`TypeId`] of a screen's model.
    pub fn model_type(&self, id: ScreenId) -> Option<TypeId> {
        Some(self.node_opt(id)?.screen.model_type)
    }

    /// Type name of a screen's model, for diagnostics.
    pub fn model_type_name(&self, id: ScreenId) -> Option<&'static str> {
        Some(self.node_opt(id)?.screen.model_type_name)
    }

    /// Returns false if the screen was inserted with [`Screen::guarded`] and its model refuses to
    /// go. Unguarded and stale screens can always be dismissed.
    ///
    /// [`Screen::guarded`]: crate::Screen::guarded
    pub fn can_be_dismissed(&self, id: ScreenId) -> bool {
        self.node_opt(id).is_none_or(|n| {
            n.screen
                .guard
                .is_none_or(|guard| guard(&*n.screen.model))
        })
    }

    /// Diagnostic label of a screen.
    pub fn label(&self, id: ScreenId) -> Option<&str> {
        self.node_opt(id)?.screen.label.as_deref()
    }

    /// Display adapter naming the screen for logs.
    pub fn describe(&self, id: ScreenId) -> Described<'_> {
        let name = self
            .node_opt(id)
            .map(|n| n.screen.label.as_deref().unwrap_or(n.screen.model_type_name));
        Described { id, name }
    }

    // --- internals ---

    fn node(&self, id: ScreenId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling ScreenId")
    }

    fn node_mut(&mut self, id: ScreenId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling ScreenId")
    }

    fn node_opt(&self, id: ScreenId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: ScreenId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn ensure_alive(&self, id: ScreenId) -> Result<(), HierarchyError> {
        if self.is_alive(id) {
            Ok(())
        } else {
            Err(HierarchyError::StaleScreen(id))
        }
    }

    fn ensure_detached(&self, id: ScreenId) -> Result<(), HierarchyError> {
        if self.is_detached(id) {
            Ok(())
        } else {
            Err(HierarchyError::AlreadyAttached(id))
        }
    }

    /// Rejects linking `screen` below `anchor` when `screen` is `anchor` or sits above it.
    fn ensure_not_above(&self, screen: ScreenId, anchor: ScreenId) -> Result<(), HierarchyError> {
        let mut cur = Some(anchor);
        while let Some(id) = cur {
            if id == screen {
                return Err(HierarchyError::WouldCycle { screen, anchor });
            }
            let n = self.node(id);
            cur = n.parent.or(n.presenting);
        }
        Ok(())
    }

    fn unlink_parent(&mut self, id: ScreenId, parent: ScreenId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        if p.selected == Some(id) {
            p.selected = None;
        }
        self.node_mut(id).parent = None;
    }

    fn drop_subtree(&mut self, id: ScreenId) {
        let (children, presented) = {
            let n = self.node(id);
            (n.children.clone(), n.presented)
        };
        for child in children {
            self.drop_subtree(child);
        }
        if let Some(presented) = presented {
            self.drop_subtree(presented);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }
}
