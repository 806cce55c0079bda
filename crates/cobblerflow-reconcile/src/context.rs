//! Per-resource reconciliation context
//!
//! Carries the lifecycle state of one declared system through the controller,
//! the interface reconciler and the flusher for the duration of a pass.

use crate::flusher::FlushAction;
use crate::matcher::ReconciliationBinding;
use cobblerflow_core::{DesiredSystem, SystemRecord};
use serde::{Deserialize, Serialize};

/// Lifecycle of one system within a pass
///
/// `Absent -> PendingAdd -> Present` on create, `Present -> Absent` on destroy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Absent,
    PendingAdd,
    Present,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Absent => write!(f, "absent"),
            LifecycleState::PendingAdd => write!(f, "pending-add"),
            LifecycleState::Present => write!(f, "present"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileContext<'a> {
    pub desired: &'a DesiredSystem,
    pub actual: Option<&'a SystemRecord>,
    state: LifecycleState,
    action: FlushAction,
}

impl<'a> ReconcileContext<'a> {
    pub fn new(binding: ReconciliationBinding<'a>) -> Self {
        let state = if binding.actual.is_some() {
            LifecycleState::Present
        } else {
            LifecycleState::Absent
        };
        Self {
            desired: binding.desired,
            actual: binding.actual,
            state,
            action: FlushAction::Edit,
        }
    }

    pub fn name(&self) -> &str {
        &self.desired.name
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn action(&self) -> FlushAction {
        self.action
    }

    /// Reads the snapshot taken at the start of the pass; never re-queries
    pub fn exists(&self) -> bool {
        self.state == LifecycleState::Present
    }

    /// Record the intent to create; the remote call is deferred to the flush
    pub fn create(&mut self) {
        self.action = FlushAction::Add;
        self.state = LifecycleState::PendingAdd;
    }

    /// Record a completed remove
    pub fn mark_destroyed(&mut self) {
        self.action = FlushAction::Destroy;
        self.state = LifecycleState::Absent;
    }

    /// Record a successful add/edit flush
    pub fn mark_flushed(&mut self) {
        if self.action != FlushAction::Destroy {
            self.state = LifecycleState::Present;
        }
    }
}
