//! In-memory screen hierarchy.
//!
//! [`ScreenStack`] models a live hierarchy as an ordered list of entries and
//! implements both [`ScreenHierarchy`] (snapshots for finders) and
//! [`TransitionExecutor`] (the only mutation path). Applications backed by a
//! real UI toolkit provide their own implementations of the two traits; the
//! stack is what the crate's tests and headless tools navigate against.
//!
//! Plans are validated against the live entries before anything changes, so a
//! rejected plan leaves the stack exactly as it was.

use crate::error::TransitionError;
use crate::hierarchy::{
    same_screen, Presentation, ScreenHandle, ScreenHierarchy, StackEntry, StackSnapshot,
};
use crate::transition::{Action, TransitionExecutor, TransitionPlan};
use crate::{debug_log, trace_log};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Screen hierarchy held in memory.
#[derive(Debug, Default)]
pub struct ScreenStack {
    entries: RwLock<Vec<StackEntry>>,
    /// Number of plans applied (reuse plans included)
    transitions: AtomicUsize,
}

impl ScreenStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack holding a single root screen.
    pub fn with_root(root: ScreenHandle) -> Self {
        Self {
            entries: RwLock::new(vec![StackEntry::new(root, Presentation::Root)]),
            transitions: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn top(&self) -> Option<ScreenHandle> {
        self.read().last().map(|entry| entry.screen.clone())
    }

    /// Screens from root to top.
    pub fn screens(&self) -> Vec<ScreenHandle> {
        self.read().iter().map(|entry| entry.screen.clone()).collect()
    }

    /// How many plans this stack has applied.
    pub fn transition_count(&self) -> usize {
        self.transitions.load(Ordering::SeqCst)
    }

    /// Apply `plan` atomically.
    pub fn apply(&self, plan: &TransitionPlan) -> Result<(), TransitionError> {
        let mut entries = self.write();
        let next = plan_entries(&entries, plan)?;
        *entries = next;
        drop(entries);
        self.transitions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<StackEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<StackEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Compute the entries that result from `plan` without touching `current`.
fn plan_entries(
    current: &[StackEntry],
    plan: &TransitionPlan,
) -> Result<Vec<StackEntry>, TransitionError> {
    let anchor_index = match plan.anchor() {
        Some(anchor) => Some(
            current
                .iter()
                .position(|entry| same_screen(&entry.screen, anchor))
                .ok_or_else(|| {
                    TransitionError::new(format!(
                        "'{}' is no longer in the hierarchy",
                        anchor.label()
                    ))
                })?,
        ),
        None => None,
    };

    // Everything above the anchor is unwound; without an anchor the plan
    // attaches on top of what is there.
    let keep = anchor_index.map_or(current.len(), |index| index + 1);
    let mut next: Vec<StackEntry> = current[..keep].to_vec();
    if keep < current.len() {
        trace_log!("Unwinding {} screen(s) above anchor", current.len() - keep);
    }

    for planned in plan.screens() {
        let presentation = match planned.action {
            Action::ReplaceRoot => {
                next.clear();
                Presentation::Root
            }
            Action::Push | Action::Present if next.is_empty() => {
                return Err(TransitionError::new(format!(
                    "cannot {:?} '{}': the hierarchy is empty",
                    planned.action,
                    planned.screen.label()
                )));
            }
            Action::Push => Presentation::Pushed,
            Action::Present => Presentation::Presented,
        };
        next.push(StackEntry::new(planned.screen.clone(), presentation));
    }

    Ok(next)
}

impl ScreenHierarchy for ScreenStack {
    fn snapshot(&self) -> StackSnapshot {
        StackSnapshot::new(self.read().clone())
    }
}

#[async_trait]
impl TransitionExecutor for ScreenStack {
    async fn execute(
        &self,
        plan: &TransitionPlan,
        animated: bool,
        hierarchy: &StackSnapshot,
    ) -> Result<(), TransitionError> {
        debug_log!(
            "Applying {} plan for '{}' (animated: {}, depth before: {})",
            if plan.is_reuse() { "reuse" } else { "attach" },
            plan.target().label(),
            animated,
            hierarchy.len()
        );
        self.apply(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Screen;
    use crate::transition::PlannedScreen;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Page(&'static str);
    impl Screen for Page {}

    fn page(name: &'static str) -> ScreenHandle {
        Arc::new(Page(name))
    }

    fn names(stack: &ScreenStack) -> Vec<&'static str> {
        stack
            .screens()
            .iter()
            .map(|s| s.downcast_ref::<Page>().map_or("?", |p| p.0))
            .collect()
    }

    #[test]
    fn test_push_and_present() {
        let stack = ScreenStack::with_root(page("home"));
        let plan = TransitionPlan::attach(
            None,
            vec![
                PlannedScreen::new(page("modal"), Action::Present),
                PlannedScreen::new(page("detail"), Action::Push),
            ],
        )
        .unwrap();

        stack.apply(&plan).unwrap();

        assert_eq!(names(&stack), vec!["home", "modal", "detail"]);
        let snapshot = stack.snapshot();
        assert_eq!(snapshot.entries()[1].presentation, Presentation::Presented);
        assert_eq!(snapshot.visible_indices(), vec![0, 2]);
        assert_eq!(stack.transition_count(), 1);
    }

    #[test]
    fn test_reuse_unwinds_above_target() {
        let home = page("home");
        let stack = ScreenStack::with_root(home.clone());
        stack
            .apply(
                &TransitionPlan::attach(None, vec![PlannedScreen::new(page("a"), Action::Push)])
                    .unwrap(),
            )
            .unwrap();

        stack.apply(&TransitionPlan::reuse(home)).unwrap();
        assert_eq!(names(&stack), vec!["home"]);
    }

    #[test]
    fn test_reuse_of_top_is_noop() {
        let home = page("home");
        let stack = ScreenStack::with_root(home.clone());
        stack.apply(&TransitionPlan::reuse(home)).unwrap();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_push_onto_empty_fails_without_mutation() {
        let stack = ScreenStack::new();
        let plan =
            TransitionPlan::attach(None, vec![PlannedScreen::new(page("a"), Action::Push)])
                .unwrap();
        let error = stack.apply(&plan).unwrap_err();
        assert!(error.message.contains("empty"));
        assert!(stack.is_empty());
        assert_eq!(stack.transition_count(), 0);
    }

    #[test]
    fn test_replace_root() {
        let stack = ScreenStack::with_root(page("splash"));
        let plan = TransitionPlan::attach(
            None,
            vec![
                PlannedScreen::new(page("home"), Action::ReplaceRoot),
                PlannedScreen::new(page("feed"), Action::Push),
            ],
        )
        .unwrap();
        stack.apply(&plan).unwrap();
        assert_eq!(names(&stack), vec!["home", "feed"]);
        assert_eq!(
            stack.snapshot().entries()[0].presentation,
            Presentation::Root
        );
    }

    #[test]
    fn test_missing_anchor_is_rejected() {
        let stack = ScreenStack::with_root(page("home"));
        let plan = TransitionPlan::reuse(page("gone"));
        assert!(stack.apply(&plan).is_err());
        assert_eq!(names(&stack), vec!["home"]);
    }

    #[test]
    fn test_execute_via_trait() {
        let stack = ScreenStack::with_root(page("home"));
        let snapshot = stack.snapshot();
        let plan =
            TransitionPlan::attach(None, vec![PlannedScreen::new(page("x"), Action::Push)])
                .unwrap();
        pollster::block_on(stack.execute(&plan, true, &snapshot)).unwrap();
        assert_eq!(stack.len(), 2);
    }
}
