// Copyright 2025 the Waypoint Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interceptors, context tasks, and post tasks attached to steps.
//!
//! ## Overview
//!
//! - [`RoutingInterceptor`]: gates a navigation before anything is touched. All interceptors of a
//!   chain are prepared first, then performed one after another; the first failure aborts.
//! - [`ContextTask`]: configures a screen's model with the context as soon as the screen is
//!   found or built.
//! - [`PostTask`]: runs after the destination is visible, with every screen of the navigation.
//!
//! Each has a closure-backed variant: [`InlineInterceptor`], [`InlineContextTask`],
//! [`InlinePostTask`].

use alloc::boxed::Box;

use waypoint_hierarchy::ScreenId;

use crate::types::{Completion, RoutingResult};
use crate::window::Window;

/// Gate that may allow, delay, or veto a navigation.
pub trait RoutingInterceptor {
    /// Context type of the navigation.
    type Context: 'static;

    /// Synchronous check run before any interceptor performs.
    fn prepare(&self, context: &Self::Context) -> RoutingResult {
        let _ = context;
        Ok(())
    }

    /// Decide, possibly asynchronously, and complete once.
    fn perform(&self, context: &Self::Context, completion: Completion);
}

/// Configures a found or built screen's model with the context.
pub trait ContextTask {
    /// Model type of the screens this task configures.
    type Model: 'static;
    /// Context type of the navigation.
    type Context: 'static;

    /// Synchronous check run before the navigation starts.
    fn prepare(&self, context: &Self::Context) -> RoutingResult {
        let _ = context;
        Ok(())
    }

    /// Apply the context to `model`.
    fn perform(&self, model: &mut Self::Model, context: &Self::Context) -> RoutingResult;
}

/// Work that runs once the navigation has finished attaching and revealing screens.
pub trait PostTask {
    /// Context type of the navigation.
    type Context: 'static;

    /// Run for `screen`, the screen of the step this task belongs to.
    ///
    /// `navigation` lists every screen of the chain, anchor first.
    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        context: &Self::Context,
        navigation: &[ScreenId],
    ) -> RoutingResult;
}

type PrepareFn<C> = Box<dyn Fn(&C) -> RoutingResult>;

/// Interceptor backed by closures.
pub struct InlineInterceptor<C> {
    prepare: Option<PrepareFn<C>>,
    perform: Box<dyn Fn(&C, Completion)>,
}

impl<C: 'static> InlineInterceptor<C> {
    /// Asynchronous interceptor.
    pub fn new(perform: impl Fn(&C, Completion) + 'static) -> Self {
        Self {
            prepare: None,
            perform: Box::new(perform),
        }
    }

    /// Interceptor that decides synchronously.
    pub fn sync(decide: impl Fn(&C) -> RoutingResult + 'static) -> Self {
        Self::new(move |context, completion| completion.complete(decide(context)))
    }

    /// Add a synchronous preparation check.
    pub fn with_prepare(mut self, prepare: impl Fn(&C) -> RoutingResult + 'static) -> Self {
        self.prepare = Some(Box::new(prepare));
        self
    }
}

impl<C> core::fmt::Debug for InlineInterceptor<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlineInterceptor")
            .field("prepare", &self.prepare.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: 'static> RoutingInterceptor for InlineInterceptor<C> {
    type Context = C;

    fn prepare(&self, context: &C) -> RoutingResult {
        self.prepare.as_ref().map_or(Ok(()), |prepare| prepare(context))
    }

    fn perform(&self, context: &C, completion: Completion) {
        (self.perform)(context, completion);
    }
}

/// Context task backed by a closure.
pub struct InlineContextTask<M, C> {
    perform: Box<dyn Fn(&mut M, &C)>,
}

impl<M: 'static, C: 'static> InlineContextTask<M, C> {
    /// Wrap `perform`.
    pub fn new(perform: impl Fn(&mut M, &C) + 'static) -> Self {
        Self {
            perform: Box::new(perform),
        }
    }
}

impl<M, C> core::fmt::Debug for InlineContextTask<M, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlineContextTask")
            .field("model", &core::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}

impl<M: 'static, C: 'static> ContextTask for InlineContextTask<M, C> {
    type Model = M;
    type Context = C;

    fn perform(&self, model: &mut M, context: &C) -> RoutingResult {
        (self.perform)(model, context);
        Ok(())
    }
}

/// Post task backed by a closure.
pub struct InlinePostTask<C> {
    perform: Box<dyn Fn(&Window, ScreenId, &C, &[ScreenId])>,
}

impl<C: 'static> InlinePostTask<C> {
    /// Wrap `perform`.
    pub fn new(perform: impl Fn(&Window, ScreenId, &C, &[ScreenId]) + 'static) -> Self {
        Self {
            perform: Box::new(perform),
        }
    }
}

impl<C> core::fmt::Debug for InlinePostTask<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlinePostTask").finish_non_exhaustive()
    }
}

impl<C: 'static> PostTask for InlinePostTask<C> {
    type Context = C;

    fn perform(
        &self,
        window: &Window,
        screen: ScreenId,
        context: &C,
        navigation: &[ScreenId],
    ) -> RoutingResult {
        (self.perform)(window, screen, context, navigation);
        Ok(())
    }
}
