//! Router decorators.
//!
//! Each decorator implements [`Router`], owns exactly one inner router and
//! forwards exactly one result. They compose in any order:
//!
//! ```
//! use screen_navigator::decorators::{FailingRouter, GlobalInterceptorRouter};
//! use screen_navigator::stack::ScreenStack;
//! use screen_navigator::{DefaultRouter, LoggingInterceptor, Router};
//! use std::sync::Arc;
//!
//! let stack = Arc::new(ScreenStack::new());
//! let mut router = GlobalInterceptorRouter::new(FailingRouter::new(DefaultRouter::over(stack)));
//! router.add_global(LoggingInterceptor::new("navigating"));
//!
//! // Registration needs `&mut`; once shared the interceptor lists are frozen.
//! let shared: Arc<dyn Router> = Arc::new(router);
//! # let _ = shared;
//! ```

use crate::context::NavigationRequest;
use crate::error::RoutingError;
use crate::interceptor::Interceptor;
use crate::router::Router;
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// GlobalInterceptorRouter
// ============================================================================

/// Injects router-wide interceptors into every request.
///
/// Global interceptors (`add_global`) run ahead of every router-local and
/// destination interceptor. Router-local interceptors (`add`) run after all
/// global ones but ahead of the destination's own interceptors. When routers
/// are nested, the outer router's interceptors run first within each tier.
pub struct GlobalInterceptorRouter<R> {
    inner: R,
    global: Vec<Arc<dyn Interceptor>>,
    local: Vec<Arc<dyn Interceptor>>,
}

impl<R: Router> GlobalInterceptorRouter<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            global: Vec::new(),
            local: Vec::new(),
        }
    }

    /// Register a global interceptor.
    pub fn add_global(&mut self, interceptor: impl Interceptor) -> &mut Self {
        self.global.push(Arc::new(interceptor));
        self
    }

    /// Register a router-local interceptor.
    pub fn add(&mut self, interceptor: impl Interceptor) -> &mut Self {
        self.local.push(Arc::new(interceptor));
        self
    }

    /// Register already-shared global interceptors, in order.
    pub fn extend_global(&mut self, interceptors: impl IntoIterator<Item = Arc<dyn Interceptor>>) {
        self.global.extend(interceptors);
    }

    /// Register already-shared router-local interceptors, in order.
    pub fn extend_local(&mut self, interceptors: impl IntoIterator<Item = Arc<dyn Interceptor>>) {
        self.local.extend(interceptors);
    }

    #[must_use]
    pub fn with_global(mut self, interceptor: impl Interceptor) -> Self {
        self.add_global(interceptor);
        self
    }

    #[must_use]
    pub fn with_local(mut self, interceptor: impl Interceptor) -> Self {
        self.add(interceptor);
        self
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R: Router> Router for GlobalInterceptorRouter<R> {
    async fn navigate(&self, mut request: NavigationRequest) -> Result<(), RoutingError> {
        request.interceptors.extend_global(&self.global);
        request.interceptors.extend_router(&self.local);
        trace_log!(
            "Injected {} global and {} local interceptor(s) for '{}'",
            self.global.len(),
            self.local.len(),
            request.target()
        );
        self.inner.navigate(request).await
    }
}

impl<R: fmt::Debug> fmt::Debug for GlobalInterceptorRouter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |list: &[Arc<dyn Interceptor>]| -> Vec<&'static str> {
            list.iter().map(|interceptor| interceptor.name()).collect()
        };
        f.debug_struct("GlobalInterceptorRouter")
            .field("global", &names(&self.global))
            .field("local", &names(&self.local))
            .field("inner", &self.inner)
            .finish()
    }
}

// ============================================================================
// FailingRouter
// ============================================================================

/// Folds low-level failures into the public error taxonomy.
///
/// Successful results and already-normalized errors pass through untouched;
/// see [`RoutingError::normalize`].
#[derive(Debug)]
pub struct FailingRouter<R> {
    inner: R,
}

impl<R: Router> FailingRouter<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[async_trait]
impl<R: Router> Router for FailingRouter<R> {
    async fn navigate(&self, request: NavigationRequest) -> Result<(), RoutingError> {
        self.inner.navigate(request).await.map_err(|error| {
            if !error.is_normalized() {
                debug_log!("Normalizing routing error: {}", error);
            }
            error.normalize()
        })
    }
}
