//! Color Navigation Demo
//!
//! Drives a headless screen stack through the standard router pipeline:
//! a modal color screen is built once and then refreshed in place, a
//! readiness-gated destination waits until the app reports ready, and an
//! analytics sink logs every outcome.
//!
//! Run with `RUST_LOG=debug cargo run --example color_navigation`.

use std::sync::{Arc, RwLock};

use screen_navigator::stack::ScreenStack;
use screen_navigator::{
    factory_fn, finder_fn, Action, DefaultLogger, DelayStrategy, Destination,
    LoggingAnalyticsSink, LoggingInterceptor, NavigationDelayingInterceptor, ReadinessSignal,
    RouterBuilder, RouterExt, Screen, ScreenStep, Step,
};

// ============================================================================
// Screens
// ============================================================================

#[derive(Debug)]
struct Home;
impl Screen for Home {}

#[derive(Debug)]
struct Modal;
impl Screen for Modal {}

#[derive(Debug)]
struct ColorScreen {
    hex: RwLock<String>,
}
impl Screen for ColorScreen {}

#[derive(Debug)]
struct Dashboard;
impl Screen for Dashboard {}

// ============================================================================
// Destinations
// ============================================================================

fn color() -> Destination<ColorScreen, String> {
    Destination::new(
        ScreenStep::new(factory_fn(|hex: &String| {
            Ok(ColorScreen {
                hex: RwLock::new(hex.clone()),
            })
        }))
        .with_finder(finder_fn(|screen: &ColorScreen, hex: &String| {
            if let Ok(mut current) = screen.hex.write() {
                current.clone_from(hex);
            }
            true
        })),
    )
    .within(Step::new(factory_fn(|_: &()| Ok(Modal))).with_action(Action::Present))
}

fn dashboard(signal: &ReadinessSignal) -> Destination<Dashboard, ()> {
    Destination::new(ScreenStep::new(factory_fn(|_: &()| Ok(Dashboard)))).intercepted_by(
        NavigationDelayingInterceptor::new(signal.clone(), DelayStrategy::Abort),
    )
}

fn print_stack(stack: &ScreenStack) {
    let labels: Vec<_> = stack.screens().iter().map(|s| s.label()).collect();
    println!("  stack: {}", labels.join(" > "));
}

fn main() {
    env_logger::init();

    let stack = Arc::new(ScreenStack::with_root(Arc::new(Home)));
    let router = RouterBuilder::over(stack.clone())
        .logger(Arc::new(DefaultLogger))
        .global_interceptor(LoggingInterceptor::new("navigation requested"))
        .analytics(Arc::new(LoggingAnalyticsSink::new()))
        .build();
    let ready = ReadinessSignal::new(false);

    pollster::block_on(async {
        for hex in ["#FFAA00", "#00AAFF"] {
            let result = router.commit(&color(), hex.to_string(), true).await;
            println!("color {hex}: {result:?}");
            print_stack(&stack);
        }

        let result = router.commit_void(&dashboard(&ready), false).await;
        println!("dashboard before ready: {result:?}");

        ready.set_ready(true);
        let result = router.commit_void(&dashboard(&ready), false).await;
        println!("dashboard after ready: {result:?}");
        print_stack(&stack);
    });
}
