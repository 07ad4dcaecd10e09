// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the router: results, errors, erased contexts, and completion handles.
//!
//! ## Overview
//!
//! These types describe the protocol every stage speaks.
//! Asynchronous stages report exactly one [`RoutingResult`] through a [`Completion`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use core::any::{Any, TypeId};

use waypoint_hierarchy::HierarchyError;

/// Why a navigation (or one of its stages) failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// Structural problem: nothing to start from, wrong container, already presenting, no factory.
    #[error("composition failed: {0}")]
    CompositionFailed(String),
    /// Interceptor- or task-level failure.
    #[error("{0}")]
    Generic(String),
    /// A context or screen model did not have the type a step expects.
    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        /// Type the step was composed with.
        expected: &'static str,
        /// Type that was supplied.
        found: &'static str,
    },
}

impl RoutingError {
    /// Shorthand for [`RoutingError::CompositionFailed`].
    pub fn composition(reason: impl Into<String>) -> Self {
        Self::CompositionFailed(reason.into())
    }

    /// Shorthand for [`RoutingError::Generic`].
    pub fn generic(reason: impl Into<String>) -> Self {
        Self::Generic(reason.into())
    }

    /// Returns true for [`RoutingError::CompositionFailed`].
    pub fn is_composition_failed(&self) -> bool {
        matches!(self, Self::CompositionFailed(_))
    }
}

impl From<HierarchyError> for RoutingError {
    fn from(err: HierarchyError) -> Self {
        Self::CompositionFailed(err.to_string())
    }
}

/// Outcome of a navigation or of one asynchronous stage.
pub type RoutingResult = Result<(), RoutingError>;

/// Misuse of the one-shot [`Configuration`](crate::config::Configuration).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Defaults were already installed.
    #[error("defaults were already configured; configure once before first use")]
    AlreadyConfigured,
    /// Defaults were requested before being installed.
    #[error("defaults have not been configured")]
    NotConfigured,
}

/// A navigation context with its static type erased.
///
/// One context value is shared by every step of a chain for the duration of a navigation.
#[derive(Clone)]
pub struct AnyContext {
    value: Rc<dyn Any>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnyContext {
    /// Erase `context`.
    pub fn new<C: Any>(context: C) -> Self {
        Self {
            value: Rc::new(context),
            type_id: TypeId::of::<C>(),
            type_name: core::any::type_name::<C>(),
        }
    }

    pub(crate) fn from_rc<C: Any>(context: Rc<C>) -> Self {
        Self {
            value: context,
            type_id: TypeId::of::<C>(),
            type_name: core::any::type_name::<C>(),
        }
    }

    /// Typed access; fails with [`RoutingError::TypeMismatch`] for any other type.
    pub fn downcast<C: Any>(&self) -> Result<&C, RoutingError> {
        self.value
            .downcast_ref::<C>()
            .ok_or(RoutingError::TypeMismatch {
                expected: core::any::type_name::<C>(),
                found: self.type_name,
            })
    }

    /// Returns true if the erased value is a `C`.
    pub fn is<C: Any>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }

    /// Name of the erased type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl core::fmt::Debug for AnyContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AnyContext").field(&self.type_name).finish()
    }
}

/// Static type a step was composed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ContextType {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
}

impl ContextType {
    pub(crate) fn of<C: Any>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: core::any::type_name::<C>(),
        }
    }

    pub(crate) fn check(&self, context: &AnyContext) -> RoutingResult {
        if self.id == context.type_id() {
            Ok(())
        } else {
            Err(RoutingError::TypeMismatch {
                expected: self.name,
                found: context.type_name(),
            })
        }
    }
}

/// Callback that receives the result of an asynchronous stage.
///
/// Consumed by [`Completion::complete`], so it can run at most once. Dropping a completion
/// without calling it leaves whoever waits on it stalled; that is logged as a warning.
pub struct Completion {
    callback: Option<Box<dyn FnOnce(RoutingResult)>>,
}

impl Completion {
    /// Wrap a callback.
    pub fn new(callback: impl FnOnce(RoutingResult) + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// A completion that discards the result.
    pub fn ignore() -> Self {
        Self::new(|_| {})
    }

    /// Deliver the result.
    pub fn complete(mut self, result: RoutingResult) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }

    /// Deliver success.
    pub fn succeed(self) {
        self.complete(Ok(()));
    }

    /// Deliver a failure.
    pub fn fail(self, error: RoutingError) {
        self.complete(Err(error));
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.callback.is_some() {
            log::warn!(
                target: "waypoint::router",
                "completion dropped without a result; the waiting navigation will never finish"
            );
        }
    }
}

impl core::fmt::Debug for Completion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}
