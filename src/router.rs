//! The router boundary and the base resolution pipeline.
//!
//! Every navigation through a [`DefaultRouter`] walks the same phases:
//!
//! 1. **Resolving**: finders scan a hierarchy snapshot from the leaf step
//!    outward. A leaf match is reused as-is; otherwise every step after the
//!    deepest match is scheduled for construction and its factory's `prepare`
//!    runs, ancestors first.
//! 2. **Intercepting**: the request's [`InterceptorChain`], global tier
//!    first.
//! 3. **Transitioning**: scheduled screens are built ancestor-to-leaf and the
//!    resulting [`TransitionPlan`] goes to the [`TransitionExecutor`].
//! 4. **Completed**: exactly one result is returned.
//!
//! A failure in any phase ends the call with nothing presented.
//!
//! Calls on one router never overlap. Depending on the
//! [`ConcurrencyPolicy`], a second call either waits its turn (FIFO) or fails
//! with [`RoutingError::Busy`].

use crate::config::{ConcurrencyPolicy, RouterConfig};
use crate::context::{NavigationRequest, RoutingContext};
use crate::destination::{Destination, DestinationStep, Step};
use crate::error::{BuildError, RoutingError, RoutingResult};
use crate::hierarchy::{Screen, ScreenHandle, ScreenHierarchy, StackSnapshot};
use crate::logging::{emit, LogLevel, Logger, SharedLogger};
use crate::transition::{PlannedScreen, TransitionExecutor, TransitionPlan};
use crate::{debug_log, info_log, trace_log, warn_log};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

// ============================================================================
// NavigationPhase
// ============================================================================

/// Where a router is in its pipeline.
///
/// Phases are ordered: a later phase compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum NavigationPhase {
    #[default]
    Idle = 0,
    Resolving = 1,
    Intercepting = 2,
    Transitioning = 3,
    Completed = 4,
}

impl NavigationPhase {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Resolving,
            2 => Self::Intercepting,
            3 => Self::Transitioning,
            4 => Self::Completed,
            _ => Self::Idle,
        }
    }

    /// Check if a navigation is running in this phase.
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::Resolving | Self::Intercepting | Self::Transitioning
        )
    }
}

impl fmt::Display for NavigationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Intercepting => "intercepting",
            Self::Transitioning => "transitioning",
            Self::Completed => "completed",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Router trait
// ============================================================================

/// One link of a router chain.
///
/// Object safe, so decorated pipelines are shared as `Arc<dyn Router>`. Use
/// the typed entry points on [`RouterExt`] at call sites.
#[async_trait]
pub trait Router: Send + Sync {
    /// Run one navigation to completion.
    async fn navigate(&self, request: NavigationRequest) -> Result<(), RoutingError>;
}

#[async_trait]
impl<R: Router + ?Sized> Router for Arc<R> {
    async fn navigate(&self, request: NavigationRequest) -> Result<(), RoutingError> {
        (**self).navigate(request).await
    }
}

#[async_trait]
impl<R: Router + ?Sized> Router for Box<R> {
    async fn navigate(&self, request: NavigationRequest) -> Result<(), RoutingError> {
        (**self).navigate(request).await
    }
}

// ============================================================================
// RouterExt
// ============================================================================

/// Typed navigation entry points, available on every [`Router`].
///
/// Two conventions are offered:
///
/// - **raising**: the `navigate*` methods return `Err` on any failure;
/// - **commit**: the `commit*` methods never fail. The outcome is returned as
///   a [`RoutingResult`], or delivered once to a completion callback by
///   [`commit_navigation`](Self::commit_navigation).
#[async_trait]
pub trait RouterExt: Router {
    /// Navigate to `destination` with `context`.
    async fn navigate_to<S, C>(
        &self,
        destination: &Destination<S, C>,
        context: C,
        animated: bool,
    ) -> Result<(), RoutingError>
    where
        S: Screen,
        C: Any + Send + Sync,
    {
        self.navigate(NavigationRequest::new(destination, context, animated))
            .await
    }

    /// Navigate with animation.
    async fn navigate_animated<S, C>(
        &self,
        destination: &Destination<S, C>,
        context: C,
    ) -> Result<(), RoutingError>
    where
        S: Screen,
        C: Any + Send + Sync,
    {
        self.navigate_to(destination, context, true).await
    }

    /// Navigate to a destination that takes no context.
    async fn navigate_void<S>(
        &self,
        destination: &Destination<S, ()>,
        animated: bool,
    ) -> Result<(), RoutingError>
    where
        S: Screen,
    {
        self.navigate_to(destination, (), animated).await
    }

    /// Navigate to a destination with an optional context, passing `None`.
    async fn navigate_empty<S, T>(
        &self,
        destination: &Destination<S, Option<T>>,
        animated: bool,
    ) -> Result<(), RoutingError>
    where
        S: Screen,
        T: Any + Send + Sync,
    {
        self.navigate_to(destination, None, animated).await
    }

    /// Navigate and return the outcome as a [`RoutingResult`].
    async fn commit<S, C>(
        &self,
        destination: &Destination<S, C>,
        context: C,
        animated: bool,
    ) -> RoutingResult
    where
        S: Screen,
        C: Any + Send + Sync,
    {
        self.navigate_to(destination, context, animated).await.into()
    }

    /// Navigate and hand the outcome to `completion`, exactly once.
    async fn commit_navigation<S, C, F>(
        &self,
        destination: &Destination<S, C>,
        context: C,
        animated: bool,
        completion: F,
    ) where
        S: Screen,
        C: Any + Send + Sync,
        F: FnOnce(RoutingResult) + Send + 'static,
    {
        completion(self.commit(destination, context, animated).await);
    }

    async fn commit_void<S>(&self, destination: &Destination<S, ()>, animated: bool) -> RoutingResult
    where
        S: Screen,
    {
        self.commit(destination, (), animated).await
    }

    async fn commit_empty<S, T>(
        &self,
        destination: &Destination<S, Option<T>>,
        animated: bool,
    ) -> RoutingResult
    where
        S: Screen,
        T: Any + Send + Sync,
    {
        self.commit(destination, None, animated).await
    }
}

impl<R: Router + ?Sized> RouterExt for R {}

// ============================================================================
// DefaultRouter
// ============================================================================

/// The base router: runs the resolution pipeline against a hierarchy.
///
/// # Example
///
/// ```
/// use screen_navigator::stack::ScreenStack;
/// use screen_navigator::{factory_fn, DefaultRouter, Destination, RouterExt, Screen, ScreenStep};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct Home;
/// impl Screen for Home {}
///
/// #[derive(Debug)]
/// struct Settings;
/// impl Screen for Settings {}
///
/// let stack = Arc::new(ScreenStack::with_root(Arc::new(Home)));
/// let router = DefaultRouter::over(stack.clone());
/// let settings = Destination::new(ScreenStep::new(factory_fn(|_: &()| Ok(Settings))));
///
/// pollster::block_on(router.navigate_void(&settings, false)).unwrap();
/// assert_eq!(stack.len(), 2);
/// ```
pub struct DefaultRouter {
    hierarchy: Arc<dyn ScreenHierarchy>,
    executor: Arc<dyn TransitionExecutor>,
    config: RouterConfig,
    /// Serializes navigations; FIFO under [`ConcurrencyPolicy::Queue`]
    gate: Mutex<()>,
    phase: AtomicU8,
    /// Monotonic navigation counter, used as the invocation id in logs
    invocations: AtomicUsize,
    logger: SharedLogger,
}

impl DefaultRouter {
    pub fn new(
        hierarchy: Arc<dyn ScreenHierarchy>,
        executor: Arc<dyn TransitionExecutor>,
    ) -> Self {
        Self {
            hierarchy,
            executor,
            config: RouterConfig::default(),
            gate: Mutex::new(()),
            phase: AtomicU8::new(NavigationPhase::Idle as u8),
            invocations: AtomicUsize::new(0),
            logger: None,
        }
    }

    /// Router over something that is both the hierarchy and its executor,
    /// such as a [`ScreenStack`](crate::stack::ScreenStack).
    pub fn over<T>(stack: Arc<T>) -> Self
    where
        T: ScreenHierarchy + TransitionExecutor + 'static,
    {
        let hierarchy: Arc<dyn ScreenHierarchy> = stack.clone();
        let executor: Arc<dyn TransitionExecutor> = stack;
        Self::new(hierarchy, executor)
    }

    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn phase(&self) -> NavigationPhase {
        NavigationPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.config.policy
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Number of navigations that got past the gate.
    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    async fn run(
        &self,
        invocation: &Invocation<'_>,
        request: NavigationRequest,
    ) -> Result<(), RoutingError> {
        let NavigationRequest {
            destination,
            context,
            animated,
            interceptors,
        } = request;

        invocation.enter(NavigationPhase::Resolving);
        let snapshot = self.hierarchy.snapshot();
        let resolution = resolve(&destination, &snapshot, &context)?;

        invocation.enter(NavigationPhase::Intercepting);
        interceptors.run(&context).await?;

        invocation.enter(NavigationPhase::Transitioning);
        let plan = resolution.into_plan(&destination, &context)?;
        let animated = animated && self.config.animations;
        self.executor
            .execute(&plan, animated, &snapshot)
            .await?;

        invocation.enter(NavigationPhase::Completed);
        Ok(())
    }
}

#[async_trait]
impl Router for DefaultRouter {
    async fn navigate(&self, request: NavigationRequest) -> Result<(), RoutingError> {
        request.destination.validate()?;
        let target = request.target();

        let _turn = match self.config.policy {
            ConcurrencyPolicy::Queue => self.gate.lock().await,
            ConcurrencyPolicy::Reject => self.gate.try_lock().map_err(|_| {
                debug_log!("Rejecting navigation to '{}': router busy", target);
                RoutingError::Busy
            })?,
        };

        let id = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        debug_log!(
            "Navigation #{} to '{}' (animated: {}, interceptors: {})",
            id,
            target,
            request.animated,
            request.interceptors.len()
        );
        let invocation = Invocation {
            id,
            phase: &self.phase,
        };

        let result = self.run(&invocation, request).await;
        match &result {
            Ok(()) => {
                info_log!("Navigation #{} to '{}' completed", id, target);
                emit(&self.logger, LogLevel::Info, || {
                    format!("navigation #{id} to '{target}' completed")
                });
            }
            Err(error) => {
                warn_log!(
                    "Navigation #{} to '{}' failed while {}: {}",
                    id,
                    target,
                    self.phase(),
                    error
                );
                emit(&self.logger, LogLevel::Warn, || {
                    format!("navigation #{id} to '{target}' failed: {error}")
                });
            }
        }
        result
    }
}

impl fmt::Debug for DefaultRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRouter")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("invocations", &self.invocation_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Invocation record
// ============================================================================

/// Call-scoped state of one navigation. Returns the router to idle on drop,
/// including when the caller drops the navigation future.
struct Invocation<'a> {
    id: usize,
    phase: &'a AtomicU8,
}

impl Invocation<'_> {
    fn enter(&self, phase: NavigationPhase) {
        trace_log!("Navigation #{} → {}", self.id, phase);
        self.phase.store(phase as u8, Ordering::SeqCst);
    }
}

impl Drop for Invocation<'_> {
    fn drop(&mut self) {
        self.phase.store(NavigationPhase::Idle as u8, Ordering::SeqCst);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Outcome of the Resolving phase.
#[derive(Debug)]
enum Resolution {
    /// The target already exists.
    Reuse(ScreenHandle),
    /// Build `steps[from..]` above `anchor`.
    Build {
        anchor: Option<ScreenHandle>,
        from: usize,
    },
}

/// Scan finders leaf-to-root, then validate every factory that will run.
fn resolve(
    destination: &DestinationStep,
    hierarchy: &StackSnapshot,
    context: &RoutingContext,
) -> Result<Resolution, RoutingError> {
    let steps = destination.steps();
    let leaf = steps.len() - 1;

    let mut anchor = None;
    let mut from = 0;
    for (index, step) in steps.iter().enumerate().rev() {
        let Some(finder) = step.finder() else {
            continue;
        };
        if let Some(found) = finder.find(hierarchy, context)? {
            if index == leaf {
                debug_log!("Reusing existing '{}'", step.label());
                return Ok(Resolution::Reuse(found));
            }
            trace_log!("Anchoring at existing '{}'", step.label());
            anchor = Some(found);
            from = index + 1;
            break;
        }
    }

    for step in &steps[from..] {
        require_factory(step)?.prepare(context)?;
    }
    debug_log!(
        "Scheduled {} screen(s) for construction",
        steps.len() - from
    );
    Ok(Resolution::Build { anchor, from })
}

fn require_factory(step: &Step) -> Result<&dyn crate::factory::ErasedFactory, BuildError> {
    step.factory().ok_or_else(|| {
        BuildError::new(
            step.label(),
            "no existing screen matched and the step has no factory",
        )
    })
}

impl Resolution {
    /// Build the scheduled screens and describe the mutation.
    fn into_plan(
        self,
        destination: &DestinationStep,
        context: &RoutingContext,
    ) -> Result<TransitionPlan, RoutingError> {
        match self {
            Self::Reuse(screen) => Ok(TransitionPlan::reuse(screen)),
            Self::Build { anchor, from } => {
                let steps = &destination.steps()[from..];
                let mut screens = Vec::with_capacity(steps.len());
                for step in steps {
                    let screen = require_factory(step)?.build(context)?;
                    trace_log!("Built '{}'", step.label());
                    screens.push(PlannedScreen::new(screen, step.action()));
                }
                TransitionPlan::attach(anchor, screens)
                    .ok_or_else(|| RoutingError::invalid_destination("nothing to present"))
            }
        }
    }
}
