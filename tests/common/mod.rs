//! Shared fixtures for router integration tests
//!
//! Screens, destinations, recording interceptors and an executor wrapper that
//! counts how often the hierarchy was asked to change.

#![allow(dead_code)]

use async_trait::async_trait;
use screen_navigator::stack::ScreenStack;
use screen_navigator::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

// ---- screens ----

#[derive(Debug)]
pub struct HomeScreen;
impl Screen for HomeScreen {}

#[derive(Debug)]
pub struct NavigationContainer;
impl Screen for NavigationContainer {}

#[derive(Debug)]
pub struct ColorScreen {
    pub hex: RwLock<String>,
}
impl Screen for ColorScreen {}

impl ColorScreen {
    pub fn hex(&self) -> String {
        self.hex.read().unwrap().clone()
    }
}

#[derive(Debug)]
pub struct ProfileScreen {
    pub user_id: Option<u64>,
}
impl Screen for ProfileScreen {}

// ---- destinations ----

/// Counts factory invocations.
#[derive(Default)]
pub struct BuildCounter(AtomicUsize);

impl BuildCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Color destination: any `ColorScreen` on the stack is refreshed in place.
pub fn color_destination(builds: &Arc<BuildCounter>) -> Destination<ColorScreen, String> {
    let builds = builds.clone();
    Destination::new(
        ScreenStep::new(factory_fn(move |hex: &String| {
            builds.0.fetch_add(1, Ordering::SeqCst);
            Ok(ColorScreen {
                hex: RwLock::new(hex.clone()),
            })
        }))
        .with_finder(finder_fn(|screen: &ColorScreen, hex: &String| {
            *screen.hex.write().unwrap() = hex.clone();
            true
        })),
    )
}

/// Color destination presented inside a fresh navigation container.
pub fn modal_color_destination(builds: &Arc<BuildCounter>) -> Destination<ColorScreen, String> {
    color_destination(builds).within(
        Step::new(factory_fn(|_: &()| Ok(NavigationContainer))).with_action(Action::Present),
    )
}

pub fn home_stack() -> Arc<ScreenStack> {
    Arc::new(ScreenStack::with_root(Arc::new(HomeScreen)))
}

pub fn top_color(stack: &ScreenStack) -> Option<String> {
    stack
        .top()
        .and_then(|screen| downcast_screen::<ColorScreen>(&screen))
        .map(|color| color.hex())
}

// ---- interceptors ----

/// Shared log of interceptor names in the order they ran.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Appends its name to a [`CallLog`] and lets the navigation through.
pub struct RecordingInterceptor {
    pub name: &'static str,
    pub log: CallLog,
}

impl RecordingInterceptor {
    pub fn new(name: &'static str, log: &CallLog) -> Self {
        Self {
            name,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl Interceptor for RecordingInterceptor {
    async fn perform(&self, _context: &RoutingContext) -> Result<(), RoutingError> {
        self.log.lock().unwrap().push(self.name);
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Always vetoes with `InterceptorError("blocked")`.
pub struct BlockingInterceptor;

#[async_trait]
impl Interceptor for BlockingInterceptor {
    async fn perform(&self, _context: &RoutingContext) -> Result<(), RoutingError> {
        Err(InterceptorError::new("blocked").into())
    }
}

// ---- executor ----

/// Forwards to a [`ScreenStack`] and counts executions.
///
/// Also records the depth of the snapshot each plan was handed with.
pub struct CountingExecutor {
    pub stack: Arc<ScreenStack>,
    pub calls: AtomicUsize,
    pub animated: Mutex<Vec<bool>>,
    pub depths: Mutex<Vec<usize>>,
}

impl CountingExecutor {
    pub fn new(stack: Arc<ScreenStack>) -> Arc<Self> {
        Arc::new(Self {
            stack,
            calls: AtomicUsize::new(0),
            animated: Mutex::new(Vec::new()),
            depths: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransitionExecutor for CountingExecutor {
    async fn execute(
        &self,
        plan: &TransitionPlan,
        animated: bool,
        hierarchy: &StackSnapshot,
    ) -> Result<(), TransitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.animated.lock().unwrap().push(animated);
        self.depths.lock().unwrap().push(hierarchy.len());
        self.stack.execute(plan, animated, hierarchy).await
    }
}

/// Builder over a counting executor wrapping `stack`.
pub fn counted_builder(stack: &Arc<ScreenStack>) -> (RouterBuilder, Arc<CountingExecutor>) {
    let executor = CountingExecutor::new(stack.clone());
    let builder = RouterBuilder::new(stack.clone(), executor.clone());
    (builder, executor)
}

// ---- analytics ----

#[derive(Default)]
pub struct CollectingSink(pub Mutex<Vec<RoutingEvent>>);

impl AnalyticsSink for CollectingSink {
    fn record(&self, event: &RoutingEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

impl CollectingSink {
    pub fn terminal_events(&self) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.is_terminal())
            .count()
    }
}
