//! Integration tests for the resolution pipeline
//!
//! Build-and-push, reuse with refresh, interceptor vetoes and the raising /
//! commit calling conventions, driven through the standard router pipeline.

mod common;

use common::*;
use screen_navigator::stack::ScreenStack;
use screen_navigator::transition::PlannedScreen;
use screen_navigator::*;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_color_built_and_pushed_when_absent() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let (builder, executor) = counted_builder(&stack);
    let router = builder.build();

    let result = router
        .commit(&color_destination(&builds), "#FFAA00".to_string(), true)
        .await;

    assert!(result.is_success());
    assert_eq!(builds.get(), 1);
    assert_eq!(stack.len(), 2);
    assert_eq!(top_color(&stack).as_deref(), Some("#FFAA00"));
    assert_eq!(executor.calls(), 1);
}

#[tokio::test]
async fn test_existing_color_refreshed_in_place() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();
    let destination = color_destination(&builds);

    router
        .navigate_to(&destination, "#FFAA00".to_string(), false)
        .await
        .unwrap();
    let before = stack.screens();

    router
        .navigate_to(&destination, "#00AAFF".to_string(), false)
        .await
        .unwrap();

    assert_eq!(builds.get(), 1, "factory must not run when a finder matches");
    assert_eq!(stack.len(), 2);
    assert!(same_screen(&before[1], &stack.screens()[1]));
    assert_eq!(top_color(&stack).as_deref(), Some("#00AAFF"));
}

#[tokio::test]
async fn test_reuse_is_idempotent() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();
    let destination = color_destination(&builds);

    for _ in 0..3 {
        router
            .navigate_to(&destination, "#123456".to_string(), true)
            .await
            .unwrap();
    }

    assert_eq!(builds.get(), 1);
    assert_eq!(stack.len(), 2);
}

#[tokio::test]
async fn test_global_interceptor_blocks_navigation() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let (builder, executor) = counted_builder(&stack);
    let router = builder.global_interceptor(BlockingInterceptor).build();

    let error = router
        .navigate_to(&color_destination(&builds), "#FFAA00".to_string(), true)
        .await
        .unwrap_err();

    match error {
        RoutingError::Interceptor(error) => assert_eq!(error.reason, "blocked"),
        other => panic!("Expected Interceptor error, got {other:?}"),
    }
    assert_eq!(builds.get(), 0);
    assert_eq!(executor.calls(), 0);
    assert_eq!(stack.len(), 1);
}

#[tokio::test]
async fn test_global_runs_before_local_regardless_of_registration() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let log = call_log();

    let router = RouterBuilder::over(stack.clone())
        .interceptor(RecordingInterceptor::new("router-local", &log))
        .global_interceptor(RecordingInterceptor::new("global", &log))
        .build();
    let destination = color_destination(&builds)
        .intercepted_by(RecordingInterceptor::new("destination", &log));

    router
        .navigate_to(&destination, "#FFFFFF".to_string(), false)
        .await
        .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["global", "router-local", "destination"]
    );
}

#[tokio::test]
async fn test_container_is_built_before_leaf() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();

    router
        .navigate_to(&modal_color_destination(&builds), "#ABCDEF".to_string(), true)
        .await
        .unwrap();

    let snapshot = stack.snapshot();
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot.entries()[1].screen.is::<NavigationContainer>());
    assert_eq!(
        snapshot.entries()[1].presentation,
        hierarchy::Presentation::Presented
    );
    assert!(snapshot.entries()[2].screen.is::<ColorScreen>());
}

#[tokio::test]
async fn test_build_failure_leaves_hierarchy_unchanged() {
    let stack = home_stack();
    let router = RouterBuilder::over(stack.clone()).build();
    let log = call_log();

    let broken: Destination<ColorScreen, String> = Destination::new(ScreenStep::new(
        factory_fn(|hex: &String| -> Result<ColorScreen, BuildError> {
            Err(BuildError::new("ColorScreen", format!("cannot render {hex}")))
        }),
    ))
    .within(Step::new(factory_fn(|_: &()| Ok(NavigationContainer))))
    .intercepted_by(RecordingInterceptor::new("audit", &log));

    let error = router
        .navigate_to(&broken, "#000000".to_string(), false)
        .await
        .unwrap_err();

    assert!(matches!(error, RoutingError::Build(_)));
    assert_eq!(error.to_string(), "failed to build 'ColorScreen': cannot render #000000");
    assert_eq!(*log.lock().unwrap(), vec!["audit"]);
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.transition_count(), 0);
}

#[tokio::test]
async fn test_context_mismatch_normalized_to_build() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();
    let destination = color_destination(&builds);

    let request = NavigationRequest::from_parts(
        destination.as_step().clone(),
        RoutingContext::new(42_u8),
        false,
    );
    let error = router.navigate(request).await.unwrap_err();

    assert!(error.is_normalized());
    match error {
        RoutingError::Build(build) => assert!(build.message.contains("u8")),
        other => panic!("Expected Build error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_commit_navigation_delivers_exactly_once() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();
    let outcomes = Arc::new(Mutex::new(Vec::new()));

    let sink = outcomes.clone();
    router
        .commit_navigation(
            &color_destination(&builds),
            "#FFAA00".to_string(),
            false,
            move |result| sink.lock().unwrap().push(result),
        )
        .await;

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_success());
}

#[tokio::test]
async fn test_commit_reports_failure_without_raising() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone())
        .global_interceptor(BlockingInterceptor)
        .build();

    let result = router
        .commit(&color_destination(&builds), "#FFAA00".to_string(), false)
        .await;

    assert!(result.is_failure());
    assert!(matches!(result.error(), Some(RoutingError::Interceptor(_))));
}

#[tokio::test]
async fn test_void_and_empty_context_overloads() {
    let stack = home_stack();
    let router = RouterBuilder::over(stack.clone()).build();

    let container = Destination::new(ScreenStep::new(factory_fn(|_: &()| Ok(NavigationContainer))));
    router.navigate_void(&container, false).await.unwrap();
    assert!(stack.top().unwrap().is::<NavigationContainer>());

    let profile: Destination<ProfileScreen, Option<u64>> = Destination::new(ScreenStep::new(
        factory_fn(|user_id: &Option<u64>| Ok(ProfileScreen { user_id: *user_id })),
    ));
    assert!(router.commit_empty(&profile, false).await.is_success());

    let top = downcast_screen::<ProfileScreen>(&stack.top().unwrap()).unwrap();
    assert_eq!(top.user_id, None);
    assert!(router.commit_void(&container, true).await.is_success());
}

#[tokio::test]
async fn test_animation_flag_reaches_executor() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let (builder, executor) = counted_builder(&stack);
    let router = builder.build();

    router
        .navigate_animated(&color_destination(&builds), "#111111".to_string())
        .await
        .unwrap();
    router
        .navigate_to(&color_destination(&builds), "#222222".to_string(), false)
        .await
        .unwrap();

    assert_eq!(*executor.animated.lock().unwrap(), vec![true, false]);
}

#[tokio::test]
async fn test_animations_disabled_in_config() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let (builder, executor) = counted_builder(&stack);
    let router = builder.animations(false).build();

    router
        .navigate_animated(&color_destination(&builds), "#111111".to_string())
        .await
        .unwrap();

    assert_eq!(*executor.animated.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn test_push_onto_empty_hierarchy_is_transition_error() {
    let stack = Arc::new(ScreenStack::new());
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();

    let error = router
        .navigate_to(&color_destination(&builds), "#FFAA00".to_string(), false)
        .await
        .unwrap_err();

    assert!(matches!(error, RoutingError::Transition(_)));
    assert!(stack.is_empty());
}

#[tokio::test]
async fn test_replace_root_resets_hierarchy() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone()).build();
    router
        .navigate_to(&color_destination(&builds), "#FFAA00".to_string(), false)
        .await
        .unwrap();

    let fresh_start = Destination::new(
        ScreenStep::new(factory_fn(|_: &()| Ok(HomeScreen))).with_action(Action::ReplaceRoot),
    );
    router.navigate_void(&fresh_start, false).await.unwrap();

    assert_eq!(stack.len(), 1);
    assert!(stack.top().unwrap().is::<HomeScreen>());
}

#[tokio::test]
async fn test_delaying_interceptor_abort_strategy() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let signal = ReadinessSignal::new(false);
    let router = RouterBuilder::over(stack.clone())
        .global_interceptor(NavigationDelayingInterceptor::new(
            signal.clone(),
            DelayStrategy::Abort,
        ))
        .build();
    let destination = color_destination(&builds);

    let result = router.commit(&destination, "#FFAA00".to_string(), false).await;
    assert!(result.is_failure());
    assert_eq!(stack.len(), 1);

    signal.set_ready(true);
    let result = router.commit(&destination, "#FFAA00".to_string(), false).await;
    assert!(result.is_success());
    assert_eq!(stack.len(), 2);
}

#[tokio::test]
async fn test_callback_interceptor_dropped_completion_cancels() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let router = RouterBuilder::over(stack.clone())
        .interceptor(callback_fn(|_: &RoutingContext, completion: Completion| {
            drop(completion);
        }))
        .build();

    let error = router
        .navigate_to(&color_destination(&builds), "#FFAA00".to_string(), false)
        .await
        .unwrap_err();

    // Normalized from `Cancelled { phase: Intercepting }`.
    assert!(matches!(error, RoutingError::Interceptor(_)));
    assert_eq!(builds.get(), 0);
}

#[tokio::test]
async fn test_executor_receives_the_resolution_snapshot() {
    let stack = home_stack();
    let builds = Arc::new(BuildCounter::default());
    let (builder, executor) = counted_builder(&stack);
    let live = stack.clone();
    let router = builder
        .interceptor(interceptor_fn(move |_: &RoutingContext| {
            // The hierarchy moves while the navigation is in Intercepting.
            let profile = PlannedScreen::new(Arc::new(ProfileScreen { user_id: None }), Action::Push);
            let plan = TransitionPlan::attach(None, vec![profile])
                .ok_or_else(|| RoutingError::from(InterceptorError::new("empty plan")))?;
            live.apply(&plan)?;
            Ok(())
        }))
        .build();

    router
        .navigate_to(&color_destination(&builds), "#FFAA00".to_string(), false)
        .await
        .unwrap();

    assert_eq!(*executor.depths.lock().unwrap(), vec![1]);
    assert_eq!(stack.len(), 3);
}
