//! Call context and the type-erased navigation request.
//!
//! - [`RoutingContext`] — the one context value of a navigation call, boxed so
//!   that it can travel through the object-safe [`Router`](crate::Router)
//!   chain. Finders and factories unbox it with a checked downcast.
//! - [`NavigationRequest`] — what every router in a decorator chain receives:
//!   the destination, the context, the animation flag, and the interceptor
//!   chain that decorators extend on the way in.

use crate::destination::{Destination, DestinationStep};
use crate::error::RoutingError;
use crate::hierarchy::Screen;
use crate::interceptor::InterceptorChain;
use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// RoutingContext
// ============================================================================

/// Type-erased context value shared by every step of one navigation.
///
/// Steps whose context type is `()` are context-agnostic: they accept any call
/// context. Every other mismatch is reported as
/// [`RoutingError::ContextMismatch`].
///
/// # Example
///
/// ```
/// use screen_navigator::RoutingContext;
///
/// let context = RoutingContext::new(String::from("#FFAA00"));
/// assert_eq!(context.downcast_ref::<String>().unwrap(), "#FFAA00");
/// assert!(context.downcast_ref::<u32>().is_none());
/// ```
#[derive(Clone)]
pub struct RoutingContext {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl RoutingContext {
    pub fn new<C: Any + Send + Sync>(value: C) -> Self {
        Self {
            value: Arc::new(value),
            type_name: any::type_name::<C>(),
        }
    }

    /// The `()` context.
    pub fn void() -> Self {
        Self::new(())
    }

    /// Type name of the boxed value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<C: Any>(&self) -> bool {
        (*self.value).is::<C>()
    }

    pub fn downcast_ref<C: Any>(&self) -> Option<&C> {
        (*self.value).downcast_ref::<C>()
    }

    /// Unbox the context for the step labelled `step`.
    pub(crate) fn resolve<C: Any>(&self, step: &str) -> Result<&C, RoutingError> {
        if let Some(value) = self.downcast_ref::<C>() {
            return Ok(value);
        }
        // context-agnostic step
        if let Some(unit) = (&() as &dyn Any).downcast_ref::<C>() {
            return Ok(unit);
        }
        Err(RoutingError::ContextMismatch {
            step: step.to_string(),
            expected: any::type_name::<C>(),
            found: self.type_name,
        })
    }
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self::void()
    }
}

impl fmt::Debug for RoutingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingContext")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// NavigationRequest
// ============================================================================

/// One navigation call as seen by the router chain.
///
/// Built by [`RouterExt`](crate::RouterExt) from a typed
/// [`Destination`] and its context. Decorators may extend
/// [`interceptors`](Self::interceptors) before delegating inward.
pub struct NavigationRequest {
    /// The erased destination.
    pub destination: DestinationStep,
    /// The call's single context value.
    pub context: RoutingContext,
    /// Whether the transition should be animated where possible.
    pub animated: bool,
    /// Interceptors to run before the hierarchy is touched.
    pub interceptors: InterceptorChain,
}

impl NavigationRequest {
    /// Create a request for a typed destination.
    ///
    /// The destination's own interceptors seed the local tier of the chain.
    pub fn new<S, C>(destination: &Destination<S, C>, context: C, animated: bool) -> Self
    where
        S: Screen,
        C: Any + Send + Sync,
    {
        Self {
            destination: destination.as_step().clone(),
            context: RoutingContext::new(context),
            animated,
            interceptors: InterceptorChain::with_local(destination.interceptors().to_vec()),
        }
    }

    /// Create a request from already-erased parts.
    pub fn from_parts(
        destination: DestinationStep,
        context: RoutingContext,
        animated: bool,
    ) -> Self {
        Self {
            destination,
            context,
            animated,
            interceptors: InterceptorChain::new(),
        }
    }

    /// Label of the destination's target screen.
    pub fn target(&self) -> &'static str {
        self.destination.label()
    }
}

impl fmt::Debug for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationRequest")
            .field("destination", &self.destination)
            .field("context", &self.context)
            .field("animated", &self.animated)
            .field("interceptors", &self.interceptors.names())
            .finish()
    }
}
