// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the hierarchy: screen identifiers, flags, container kinds, and screen payloads.

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};

/// Identifier for a screen in the hierarchy.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `ScreenId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `ScreenId`.
///
/// ### Liveness
///
/// Use [`Hierarchy::is_alive`](crate::Hierarchy::is_alive) to check whether a `ScreenId` still refers to a live screen.
/// Stale `ScreenId`s never alias a different live screen because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub(crate) u32, pub(crate) u32);

impl ScreenId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Slot index of this identifier.
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Generation of this identifier.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

impl core::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}v{}", self.0, self.1)
    }
}

bitflags::bitflags! {
    /// Transition flags carried by a screen while an animated change is in flight.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ScreenFlags: u8 {
        /// The screen has been attached as a presentation whose animation has not finished.
        const BEING_PRESENTED = 0b0000_0001;
        /// The screen is the target of a dismissal whose animation has not finished.
        const BEING_DISMISSED = 0b0000_0010;
    }
}

/// Kind of a container screen.
///
/// Kinds form a single-inheritance lineage so that a strategy registered for a base kind
/// also serves kinds derived from it, while a more specific registration wins.
///
/// ```
/// use waypoint_hierarchy::ContainerKind;
///
/// static WIZARD: ContainerKind = ContainerKind::derived("wizard", &ContainerKind::STACK);
///
/// assert!(WIZARD.is_kind_of(ContainerKind::STACK));
/// assert!(!ContainerKind::STACK.is_kind_of(WIZARD));
/// let names: Vec<_> = WIZARD.lineage().map(|k| k.name()).collect();
/// assert_eq!(names, ["wizard", "stack"]);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ContainerKind {
    name: &'static str,
    base: Option<&'static ContainerKind>,
}

impl ContainerKind {
    /// Ordered stack of children; the last child is on screen.
    pub const STACK: Self = Self::root("stack");
    /// Switcher over children; the selected child is on screen.
    pub const TABS: Self = Self::root("tabs");
    /// Primary child plus a detail child, both on screen.
    pub const SPLIT: Self = Self::root("split");

    /// A kind without a base.
    pub const fn root(name: &'static str) -> Self {
        Self { name, base: None }
    }

    /// A kind refining `base`.
    pub const fn derived(name: &'static str, base: &'static Self) -> Self {
        Self {
            name,
            base: Some(base),
        }
    }

    /// Name of this kind.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Base kind, if any.
    pub const fn base(&self) -> Option<&'static Self> {
        self.base
    }

    /// Iterate this kind followed by its bases, most specific first.
    pub fn lineage(&self) -> impl Iterator<Item = Self> {
        core::iter::successors(Some(*self), |k| k.base.copied())
    }

    /// Returns true if `self` is `other` or derives from it.
    pub fn is_kind_of(&self, other: Self) -> bool {
        self.lineage().any(|k| k == other)
    }
}

/// A screen model that may refuse to be popped or dismissed by a navigation.
///
/// Install it with [`Screen::guarded`]; [`Hierarchy::can_be_dismissed`](crate::Hierarchy::can_be_dismissed)
/// asks the model.
pub trait CanBeDismissed: Any {
    /// Returns false while the screen must stay, for example with unsaved input.
    fn can_be_dismissed(&self) -> bool;
}

pub(crate) type DismissGuard = fn(&(dyn Any + 'static)) -> bool;

/// Description of a screen to insert into a [`Hierarchy`](crate::Hierarchy).
///
/// The model is owned by the application layer and is the screen's own state; the hierarchy
/// only stores it and hands it back through typed accessors.
pub struct Screen {
    pub(crate) model: Box<dyn Any>,
    pub(crate) model_type: TypeId,
    pub(crate) model_type_name: &'static str,
    pub(crate) container: Option<ContainerKind>,
    pub(crate) label: Option<String>,
    pub(crate) guard: Option<DismissGuard>,
}

impl Screen {
    /// A plain (non-container) screen holding `model`.
    pub fn new<M: Any>(model: M) -> Self {
        Self {
            model: Box::new(model),
            model_type: TypeId::of::<M>(),
            model_type_name: core::any::type_name::<M>(),
            container: None,
            label: None,
            guard: None,
        }
    }

    /// A plain screen whose model is asked before a navigation pops or dismisses it.
    pub fn guarded<M: CanBeDismissed>(model: M) -> Self {
        let guard: DismissGuard = |model| model.downcast_ref::<M>().is_none_or(M::can_be_dismissed);
        Self {
            guard: Some(guard),
            ..Self::new(model)
        }
    }

    /// A container screen of `kind` holding `model`.
    pub fn container<M: Any>(kind: ContainerKind, model: M) -> Self {
        Self {
            container: Some(kind),
            ..Self::new(model)
        }
    }

    /// Attach a human-readable label used in diagnostics.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Container kind, if this is a container screen.
    pub fn container_kind(&self) -> Option<ContainerKind> {
        self.container
    }
}

impl core::fmt::Debug for Screen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Screen")
            .field("model", &self.model_type_name)
            .field("container", &self.container.map(|k| k.name()))
            .field("label", &self.label)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}
