//! Interceptors: cross-cutting policies that run before the hierarchy changes.
//!
//! An interceptor sees the call's [`RoutingContext`] and either lets the
//! navigation proceed, vetoes it, or keeps it pending until some precondition
//! holds. Interceptors run **sequentially**: global ones first, then
//! router-local ones, then the destination's own, each tier in registration
//! order. The first failure short-circuits the chain and the router never
//! builds or presents anything.
//!
//! # Creating interceptors
//!
//! | Approach | When to use |
//! |----------|-------------|
//! | Implement [`Interceptor`] | Async policy with injected dependencies |
//! | [`interceptor_fn`] | Synchronous check from a closure |
//! | [`callback_interceptor`] / [`callback_fn`] | Completion-sink style APIs |
//!
//! # Built-in interceptors
//!
//! | Interceptor | Purpose |
//! |-------------|---------|
//! | [`NavigationDelayingInterceptor`] | Wait for (or abort without) a [`ReadinessSignal`] |
//! | [`LoggingInterceptor`] | Emit a message through a [`Logger`](crate::Logger) |
//!
//! # Example
//!
//! ```
//! use screen_navigator::error::{InterceptorError, RoutingError};
//! use screen_navigator::{interceptor_fn, InterceptorChain, RoutingContext};
//! use std::sync::Arc;
//!
//! let mut chain = InterceptorChain::new();
//! chain.push_global(Arc::new(interceptor_fn(|context: &RoutingContext| {
//!     if context.is::<()>() {
//!         Ok(())
//!     } else {
//!         Err(InterceptorError::new("only void navigations allowed").into())
//!     }
//! })));
//!
//! let result = pollster::block_on(chain.run(&RoutingContext::new(5_u8)));
//! assert!(matches!(result, Err(RoutingError::Interceptor(_))));
//! ```

use crate::context::RoutingContext;
use crate::error::{InterceptorError, RoutingError};
use crate::hierarchy::short_type_name;
use crate::logging::{emit, LogLevel, Logger, SharedLogger};
use crate::router::NavigationPhase;
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use futures::channel::oneshot;
use std::any;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

// ============================================================================
// Interceptor trait
// ============================================================================

/// A policy consulted before every navigation it is registered for.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use screen_navigator::error::{InterceptorError, RoutingError};
/// use screen_navigator::{Interceptor, RoutingContext};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct SignedIn(AtomicBool);
///
/// #[async_trait]
/// impl Interceptor for SignedIn {
///     async fn perform(&self, _context: &RoutingContext) -> Result<(), RoutingError> {
///         if self.0.load(Ordering::SeqCst) {
///             Ok(())
///         } else {
///             Err(InterceptorError::new("not signed in").into())
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "SignedIn"
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Resolve once: `Ok` to proceed, `Err` to abort the navigation.
    ///
    /// Staying pending delays the navigation; timeouts are up to the
    /// interceptor.
    async fn perform(&self, context: &RoutingContext) -> Result<(), RoutingError>;

    /// Interceptor name for debugging.
    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }
}

#[async_trait]
impl<I: Interceptor + ?Sized> Interceptor for Arc<I> {
    async fn perform(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        (**self).perform(context).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// ============================================================================
// interceptor_fn helper
// ============================================================================

/// Create an interceptor from a synchronous closure.
pub const fn interceptor_fn<F>(f: F) -> FnInterceptor<F>
where
    F: Fn(&RoutingContext) -> Result<(), RoutingError> + Send + Sync + 'static,
{
    FnInterceptor { f }
}

/// Interceptor created from a closure via [`interceptor_fn`].
pub struct FnInterceptor<F> {
    f: F,
}

#[async_trait]
impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&RoutingContext) -> Result<(), RoutingError> + Send + Sync + 'static,
{
    async fn perform(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        (self.f)(context)
    }
}

// ============================================================================
// Completion-sink interceptors
// ============================================================================

/// One-shot sink an interceptor resolves exactly once.
///
/// Every resolving method consumes the sink. Dropping it unresolved cancels
/// the navigation with [`RoutingError::Cancelled`].
#[must_use = "an unresolved Completion cancels the navigation"]
pub struct Completion {
    sender: oneshot::Sender<Result<(), RoutingError>>,
}

impl Completion {
    fn channel() -> (Self, oneshot::Receiver<Result<(), RoutingError>>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Let the navigation proceed.
    pub fn success(self) {
        self.complete(Ok(()));
    }

    /// Abort the navigation with `error`.
    pub fn fail(self, error: impl Into<RoutingError>) {
        self.complete(Err(error.into()));
    }

    pub fn complete(self, result: Result<(), RoutingError>) {
        // The navigation may already have been dropped by its caller.
        let _ = self.sender.send(result);
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &!self.sender.is_canceled())
            .finish()
    }
}

/// Interceptor written against a [`Completion`] sink instead of a future.
///
/// The sink may be resolved synchronously or handed off and resolved later
/// from another thread.
pub trait CallbackInterceptor: Send + Sync + 'static {
    fn perform(&self, context: &RoutingContext, completion: Completion);

    fn name(&self) -> &'static str {
        short_type_name(any::type_name::<Self>())
    }
}

/// Adapt a [`CallbackInterceptor`] to [`Interceptor`].
pub const fn callback_interceptor<I: CallbackInterceptor>(interceptor: I) -> CallbackAdapter<I> {
    CallbackAdapter { interceptor }
}

/// Create a completion-sink interceptor from a closure.
///
/// ```
/// use screen_navigator::{callback_fn, Interceptor, RoutingContext};
///
/// let interceptor = callback_fn(|_context: &RoutingContext, completion| completion.success());
/// assert!(pollster::block_on(interceptor.perform(&RoutingContext::void())).is_ok());
/// ```
pub const fn callback_fn<F>(f: F) -> CallbackAdapter<FnCallback<F>>
where
    F: Fn(&RoutingContext, Completion) + Send + Sync + 'static,
{
    callback_interceptor(FnCallback { f })
}

/// Closure-backed [`CallbackInterceptor`] created via [`callback_fn`].
pub struct FnCallback<F> {
    f: F,
}

impl<F> CallbackInterceptor for FnCallback<F>
where
    F: Fn(&RoutingContext, Completion) + Send + Sync + 'static,
{
    fn perform(&self, context: &RoutingContext, completion: Completion) {
        (self.f)(context, completion);
    }
}

/// [`Interceptor`] view of a [`CallbackInterceptor`].
pub struct CallbackAdapter<I> {
    interceptor: I,
}

#[async_trait]
impl<I: CallbackInterceptor> Interceptor for CallbackAdapter<I> {
    async fn perform(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        let (completion, receiver) = Completion::channel();
        self.interceptor.perform(context, completion);
        receiver.await.unwrap_or(Err(RoutingError::Cancelled {
            phase: NavigationPhase::Intercepting,
        }))
    }

    fn name(&self) -> &'static str {
        self.interceptor.name()
    }
}

// ============================================================================
// NavigationDelayingInterceptor
// ============================================================================

/// What to do when the application is not ready yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayStrategy {
    /// Hold the navigation until the signal reports ready.
    #[default]
    Wait,
    /// Fail the navigation immediately.
    Abort,
}

/// Application-controlled readiness flag.
///
/// Clones share the same flag.
#[derive(Clone)]
pub struct ReadinessSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ReadinessSignal {
    pub fn new(ready: bool) -> Self {
        let (sender, _) = watch::channel(ready);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Update the flag and wake every waiting navigation.
    pub fn set_ready(&self, ready: bool) {
        self.sender.send_replace(ready);
    }

    pub fn is_ready(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ReadinessSignal {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for ReadinessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadinessSignal")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Delays or aborts navigation until the application reports it is ready.
///
/// ```
/// use screen_navigator::{DelayStrategy, Interceptor, NavigationDelayingInterceptor};
/// use screen_navigator::{ReadinessSignal, RoutingContext};
///
/// let signal = ReadinessSignal::new(false);
/// let interceptor = NavigationDelayingInterceptor::new(signal.clone(), DelayStrategy::Abort);
/// assert!(pollster::block_on(interceptor.perform(&RoutingContext::void())).is_err());
///
/// signal.set_ready(true);
/// assert!(pollster::block_on(interceptor.perform(&RoutingContext::void())).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct NavigationDelayingInterceptor {
    signal: ReadinessSignal,
    strategy: DelayStrategy,
}

impl NavigationDelayingInterceptor {
    pub fn new(signal: ReadinessSignal, strategy: DelayStrategy) -> Self {
        Self { signal, strategy }
    }

    pub fn strategy(&self) -> DelayStrategy {
        self.strategy
    }

    pub fn signal(&self) -> &ReadinessSignal {
        &self.signal
    }
}

#[async_trait]
impl Interceptor for NavigationDelayingInterceptor {
    async fn perform(&self, _context: &RoutingContext) -> Result<(), RoutingError> {
        let mut receiver = self.signal.subscribe();
        let ready = *receiver.borrow();
        if ready {
            return Ok(());
        }
        match self.strategy {
            DelayStrategy::Abort => {
                debug_log!("Application not ready, aborting navigation");
                Err(InterceptorError::new("application is not ready").into())
            }
            DelayStrategy::Wait => {
                trace_log!("Application not ready, holding navigation");
                receiver
                    .wait_for(|ready| *ready)
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        InterceptorError::new("readiness signal closed")
                            .with_cause(error)
                            .into()
                    })
            }
        }
    }
}

// ============================================================================
// LoggingInterceptor
// ============================================================================

/// Logs a message for every navigation it sees. Never blocks.
pub struct LoggingInterceptor {
    logger: SharedLogger,
    message: String,
    level: LogLevel,
}

impl LoggingInterceptor {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            logger: None,
            message: message.into(),
            level: LogLevel::Info,
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

#[async_trait]
impl Interceptor for LoggingInterceptor {
    async fn perform(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        emit(&self.logger, self.level, || {
            format!("{} (context: {})", self.message, context.type_name())
        });
        Ok(())
    }
}

// ============================================================================
// InterceptorChain
// ============================================================================

/// The ordered interceptors of one navigation.
///
/// Three tiers run in order: global, router-local, then the destination's
/// own. Within a tier, interceptors run in the order they were added, so an
/// outer decorator's interceptors run before an inner one's.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    global: Vec<Arc<dyn Interceptor>>,
    router: Vec<Arc<dyn Interceptor>>,
    local: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain holding only destination interceptors.
    pub fn with_local(local: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            local,
            ..Self::default()
        }
    }

    pub fn push_global(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.global.push(interceptor);
    }

    /// Add a router-local interceptor, run after every global one.
    pub fn push_router(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.router.push(interceptor);
    }

    /// Add a destination interceptor, run last.
    pub fn push_local(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.local.push(interceptor);
    }

    pub fn extend_global(&mut self, interceptors: &[Arc<dyn Interceptor>]) {
        self.global.extend_from_slice(interceptors);
    }

    pub fn extend_router(&mut self, interceptors: &[Arc<dyn Interceptor>]) {
        self.router.extend_from_slice(interceptors);
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.router.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|interceptor| interceptor.name()).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &Arc<dyn Interceptor>> {
        self.global
            .iter()
            .chain(self.router.iter())
            .chain(self.local.iter())
    }

    /// Run every interceptor in order, stopping at the first failure.
    pub async fn run(&self, context: &RoutingContext) -> Result<(), RoutingError> {
        debug_log!(
            "Running {} interceptor(s) ({} global, {} router, {} destination)",
            self.len(),
            self.global.len(),
            self.router.len(),
            self.local.len()
        );
        for interceptor in self.iter() {
            let result = interceptor.perform(context).await;
            trace_log!("Interceptor '{}' → {:?}", interceptor.name(), result);
            if let Err(error) = result {
                debug_log!(
                    "Interceptor '{}' blocked navigation: {}",
                    interceptor.name(),
                    error
                );
                return Err(error);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
