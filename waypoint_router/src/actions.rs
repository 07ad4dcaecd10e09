// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Actions: how a newly built screen is attached to the one before it.
//!
//! ## Overview
//!
//! An [`Action`] receives the new screen and the existing screen of the previous step and
//! mutates the hierarchy on the main queue. It reports exactly once through its
//! [`Completion`]; animated actions report after their scheduled transition finishes.
//!
//! Embedding actions ([`Action::is_embedding`]) place the screen inside a container. The router
//! hands them the nearest container (the previous screen or one of its ancestors) whose kind
//! they accept. While a container is still being built, they append to its pending child list
//! through [`Action::embed`] instead.
//!
//! Provided actions:
//! - [`ReplaceRoot`]: make the screen the new window root.
//! - [`PresentModally`]: present the screen on top of another.
//! - [`Embed`]: insert the screen into a container with a [`Placement`].
//! - [`NoOp`]: do nothing.

use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::time::Duration;

use waypoint_hierarchy::{ContainerKind, Hierarchy, ScreenFlags, ScreenId};

use crate::adapters::{ContainerAdapterLocator, finish};
use crate::config::Defaults;
use crate::types::{Completion, RoutingError, RoutingResult};
use crate::window::Window;

/// Attaches a new screen.
pub trait Action {
    /// Attach `screen` relative to `existing` and complete once.
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        existing: ScreenId,
        animated: bool,
        completion: Completion,
    );

    /// Returns true if this action places the screen inside a container.
    fn is_embedding(&self) -> bool {
        false
    }

    /// Returns true if this action can place a screen inside a `kind` container.
    fn is_embeddable(&self, kind: ContainerKind) -> bool {
        let _ = kind;
        false
    }

    /// Add `screen` to the pending children of a container being built.
    fn embed(
        &self,
        hierarchy: &mut Hierarchy,
        screen: ScreenId,
        children: &mut Vec<ScreenId>,
    ) -> RoutingResult {
        let _ = children;
        Err(RoutingError::composition(format!(
            "{} cannot be embedded by a non-embedding action",
            hierarchy.describe(screen)
        )))
    }
}

/// Visual style of a root replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionStyle {
    /// Fade from the old root to the new one.
    CrossDissolve,
    /// Flip around the vertical axis from the left edge.
    FlipFromLeft,
    /// Flip around the vertical axis from the right edge.
    FlipFromRight,
}

/// Animation of a root replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Visual style.
    pub style: TransitionStyle,
    /// Length of the animation.
    pub duration: Duration,
}

impl Transition {
    /// A cross dissolve of `duration`.
    pub const fn cross_dissolve(duration: Duration) -> Self {
        Self {
            style: TransitionStyle::CrossDissolve,
            duration,
        }
    }
}

/// Replace the window root with the new screen and remove the old root.
///
/// The previous step must resolve to the current root.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplaceRoot {
    transition: Option<Transition>,
}

impl ReplaceRoot {
    /// Replace without animation.
    pub const fn new() -> Self {
        Self { transition: None }
    }

    /// Replace with `transition` when the navigation is animated.
    pub const fn with_transition(transition: Transition) -> Self {
        Self {
            transition: Some(transition),
        }
    }
}

impl Action for ReplaceRoot {
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        existing: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        let result = {
            let mut h = window.hierarchy_mut();
            if h.root() == Some(existing) {
                h.set_root(screen)
                    .map(|previous| {
                        if let Some(previous) = previous {
                            h.remove(previous);
                        }
                    })
                    .map_err(RoutingError::from)
            } else {
                Err(RoutingError::composition(format!(
                    "root replacement must start from the root screen, got {} instead",
                    h.describe(existing)
                )))
            }
        };
        let animate = animated && self.transition.is_some_and(|t| !t.duration.is_zero());
        finish(window, animate, completion, result);
    }
}

/// Where a modal presentation starts.
#[derive(Clone, Default)]
pub enum PresentationStart {
    /// Present from the previous step's screen.
    #[default]
    Current,
    /// Present from the top of the container chain holding the previous step's screen.
    TopmostParent,
    /// Present from a screen chosen by the closure.
    Custom(Rc<dyn Fn(&Hierarchy) -> Option<ScreenId>>),
}

impl core::fmt::Debug for PresentationStart {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Current => f.write_str("Current"),
            Self::TopmostParent => f.write_str("TopmostParent"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Present the new screen modally.
///
/// Fails if the presentation point already presents a screen.
#[derive(Clone, Debug, Default)]
pub struct PresentModally {
    start: PresentationStart,
}

impl PresentModally {
    /// Present from the previous step's screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Present from `start`.
    pub fn starting_at(start: PresentationStart) -> Self {
        Self { start }
    }

    fn presenter(
        &self,
        hierarchy: &Hierarchy,
        existing: ScreenId,
    ) -> Result<ScreenId, RoutingError> {
        match &self.start {
            PresentationStart::Current => Ok(existing),
            PresentationStart::TopmostParent => {
                Ok(hierarchy.presentation_root(existing).unwrap_or(existing))
            }
            PresentationStart::Custom(resolve) => resolve(hierarchy)
                .filter(|&id| hierarchy.is_alive(id))
                .ok_or_else(|| {
                    RoutingError::composition(
                        "screen to start the modal presentation from was not found",
                    )
                }),
        }
    }
}

impl Action for PresentModally {
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        existing: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        let result = {
            let mut h = window.hierarchy_mut();
            self.presenter(&h, existing).and_then(|presenter| {
                if let Some(presented) = h.presented(presenter) {
                    return Err(RoutingError::composition(format!(
                        "{} is already presenting {}",
                        h.describe(presenter),
                        h.describe(presented)
                    )));
                }
                h.present(presenter, screen)?;
                if animated {
                    h.insert_flags(screen, ScreenFlags::BEING_PRESENTED);
                }
                Ok(())
            })
        };
        match result {
            Ok(()) if animated => {
                let w = window.clone();
                window.schedule(move || {
                    w.hierarchy_mut()
                        .remove_flags(screen, ScreenFlags::BEING_PRESENTED);
                    completion.succeed();
                });
            }
            result => completion.complete(result),
        }
    }
}

/// Position of an embedded screen among a container's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Append.
    Push,
    /// Replace the last child, or append if there is none.
    PushReplacingLast,
    /// Replace every child.
    AsRoot,
    /// Insert at an index; appends when the index is past the end.
    Insert(usize),
    /// Replace the child at an index; appends when the index is past the end.
    Replace(usize),
}

impl Placement {
    /// Apply to a child list.
    pub fn apply(self, screen: ScreenId, children: &mut Vec<ScreenId>) {
        children.retain(|&c| c != screen);
        match self {
            Self::Push => children.push(screen),
            Self::PushReplacingLast => {
                children.pop();
                children.push(screen);
            }
            Self::AsRoot => {
                children.clear();
                children.push(screen);
            }
            Self::Insert(i) if i < children.len() => children.insert(i, screen),
            Self::Replace(i) if i < children.len() => children[i] = screen,
            Self::Insert(_) | Self::Replace(_) => children.push(screen),
        }
    }
}

/// Embed the new screen into a container of a given kind.
pub struct Embed {
    kind: ContainerKind,
    placement: Placement,
    locator: Rc<dyn ContainerAdapterLocator>,
}

impl Embed {
    /// Embed into containers of `kind` (or kinds derived from it).
    pub fn new(kind: ContainerKind, placement: Placement, defaults: &Defaults) -> Self {
        Self {
            kind,
            placement,
            locator: defaults.locator().clone(),
        }
    }

    /// Push onto a navigation stack.
    pub fn push(defaults: &Defaults) -> Self {
        Self::new(ContainerKind::STACK, Placement::Push, defaults)
    }

    /// Push onto a navigation stack, replacing its top.
    pub fn push_replacing_last(defaults: &Defaults) -> Self {
        Self::new(ContainerKind::STACK, Placement::PushReplacingLast, defaults)
    }

    /// Make the screen the only screen of a navigation stack.
    pub fn push_as_root(defaults: &Defaults) -> Self {
        Self::new(ContainerKind::STACK, Placement::AsRoot, defaults)
    }

    /// Add a tab.
    pub fn add_tab(defaults: &Defaults) -> Self {
        Self::new(ContainerKind::TABS, Placement::Push, defaults)
    }

    /// Set the primary pane of a split view.
    pub fn set_primary(defaults: &Defaults) -> Self {
        Self::new(ContainerKind::SPLIT, Placement::Replace(0), defaults)
    }

    /// Set the detail pane of a split view.
    pub fn show_detail(defaults: &Defaults) -> Self {
        Self::new(ContainerKind::SPLIT, Placement::Replace(1), defaults)
    }

    /// Container kind this action targets.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Placement among the children.
    pub fn placement(&self) -> Placement {
        self.placement
    }
}

impl core::fmt::Debug for Embed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Embed")
            .field("kind", &self.kind.name())
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl Action for Embed {
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        existing: ScreenId,
        animated: bool,
        completion: Completion,
    ) {
        let planned = {
            let mut h = window.hierarchy_mut();
            match h.container_kind(existing) {
                Some(kind) if self.is_embeddable(kind) => {
                    self.locator.get_adapter(kind).and_then(|adapter| {
                        let mut children = adapter.children(&h, existing);
                        self.embed(&mut h, screen, &mut children)?;
                        Ok((adapter, children))
                    })
                }
                _ => Err(RoutingError::composition(format!(
                    "{} is not a `{}` container",
                    h.describe(existing),
                    self.kind.name()
                ))),
            }
        };
        match planned {
            Ok((adapter, children)) => {
                adapter.set_children(window, existing, children, animated, completion);
            }
            Err(err) => completion.fail(err),
        }
    }

    fn is_embedding(&self) -> bool {
        true
    }

    fn is_embeddable(&self, kind: ContainerKind) -> bool {
        kind.is_kind_of(self.kind)
    }

    fn embed(
        &self,
        _hierarchy: &mut Hierarchy,
        screen: ScreenId,
        children: &mut Vec<ScreenId>,
    ) -> RoutingResult {
        self.placement.apply(screen, children);
        Ok(())
    }
}

/// Leave the screen where it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOp;

impl Action for NoOp {
    fn perform(&self, _: &Window, _: ScreenId, _: ScreenId, _: bool, completion: Completion) {
        completion.succeed();
    }
}
