//! Router configuration and the standard pipeline builder.
//!
//! [`RouterBuilder`] assembles the decorator chain every application wants:
//!
//! ```text
//! AnalyticsRouterDecorator        (only when a sink is configured)
//!   └─ GlobalInterceptorRouter
//!        └─ FailingRouter
//!             └─ DefaultRouter
//! ```
//!
//! Analytics sits outermost so it observes normalized errors and the time
//! spent in interceptors. The result is an `Arc<dyn Router>`; interceptor
//! lists can no longer change once it is built.
//!
//! # Example
//!
//! ```
//! use screen_navigator::stack::ScreenStack;
//! use screen_navigator::{ConcurrencyPolicy, LoggingAnalyticsSink, LoggingInterceptor};
//! use screen_navigator::RouterBuilder;
//! use std::sync::Arc;
//!
//! let stack = Arc::new(ScreenStack::new());
//! let router = RouterBuilder::over(stack)
//!     .policy(ConcurrencyPolicy::Reject)
//!     .global_interceptor(LoggingInterceptor::new("navigating"))
//!     .analytics(Arc::new(LoggingAnalyticsSink::new()))
//!     .build();
//! # let _ = router;
//! ```

use crate::analytics::{AnalyticsRouterDecorator, AnalyticsSink};
use crate::decorators::{FailingRouter, GlobalInterceptorRouter};
use crate::hierarchy::ScreenHierarchy;
use crate::interceptor::Interceptor;
use crate::logging::{Logger, SharedLogger};
use crate::router::{DefaultRouter, Router};
use crate::transition::TransitionExecutor;
use crate::debug_log;
use std::fmt;
use std::sync::Arc;

/// How a router treats a call that arrives while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConcurrencyPolicy {
    /// Wait behind the in-flight call, first come first served.
    #[default]
    Queue,
    /// Fail immediately with [`RoutingError::Busy`](crate::RoutingError::Busy).
    Reject,
}

/// Runtime settings of a [`DefaultRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub policy: ConcurrencyPolicy,
    /// When `false`, every transition runs unanimated regardless of the
    /// per-call flag.
    pub animations: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            policy: ConcurrencyPolicy::Queue,
            animations: true,
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn animations(mut self, enabled: bool) -> Self {
        self.animations = enabled;
        self
    }
}

/// Fluent builder for the standard router pipeline.
pub struct RouterBuilder {
    hierarchy: Arc<dyn ScreenHierarchy>,
    executor: Arc<dyn TransitionExecutor>,
    config: RouterConfig,
    logger: SharedLogger,
    global: Vec<Arc<dyn Interceptor>>,
    local: Vec<Arc<dyn Interceptor>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl RouterBuilder {
    pub fn new(
        hierarchy: Arc<dyn ScreenHierarchy>,
        executor: Arc<dyn TransitionExecutor>,
    ) -> Self {
        Self {
            hierarchy,
            executor,
            config: RouterConfig::default(),
            logger: None,
            global: Vec::new(),
            local: Vec::new(),
            analytics: None,
        }
    }

    /// Builder over something that is both the hierarchy and its executor.
    pub fn over<T>(stack: Arc<T>) -> Self
    where
        T: ScreenHierarchy + TransitionExecutor + 'static,
    {
        let hierarchy: Arc<dyn ScreenHierarchy> = stack.clone();
        let executor: Arc<dyn TransitionExecutor> = stack;
        Self::new(hierarchy, executor)
    }

    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    #[must_use]
    pub fn animations(mut self, enabled: bool) -> Self {
        self.config.animations = enabled;
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Add an interceptor that runs before every other one.
    #[must_use]
    pub fn global_interceptor(mut self, interceptor: impl Interceptor) -> Self {
        self.global.push(Arc::new(interceptor));
        self
    }

    /// Add a router-local interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: impl Interceptor) -> Self {
        self.local.push(Arc::new(interceptor));
        self
    }

    #[must_use]
    pub fn analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// Assemble the pipeline.
    pub fn build(self) -> Arc<dyn Router> {
        debug_log!(
            "Building router ({:?}, {} global / {} local interceptor(s), analytics: {})",
            self.config.policy,
            self.global.len(),
            self.local.len(),
            self.analytics.is_some()
        );

        let mut base = DefaultRouter::new(self.hierarchy, self.executor).with_config(self.config);
        if let Some(logger) = self.logger {
            base = base.with_logger(logger);
        }

        let mut intercepted = GlobalInterceptorRouter::new(FailingRouter::new(base));
        intercepted.extend_global(self.global);
        intercepted.extend_local(self.local);

        match self.analytics {
            Some(sink) => Arc::new(AnalyticsRouterDecorator::new(intercepted, sink)),
            None => Arc::new(intercepted),
        }
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("config", &self.config)
            .field("global", &self.global.len())
            .field("local", &self.local.len())
            .field("analytics", &self.analytics.is_some())
            .finish_non_exhaustive()
    }
}
