//! Planned actions and pass results

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A planned action for one declared system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// `<action_type>:<system>`
    pub id: String,

    pub action_type: ActionType,

    /// System name
    pub system: String,

    /// Human readable description
    pub description: String,

    /// Additional details (changed properties, interface sync, ...)
    pub details: HashMap<String, serde_json::Value>,
}

impl Action {
    pub fn new(action_type: ActionType, system: impl Into<String>) -> Self {
        let system = system.into();
        let description = match action_type {
            ActionType::Create => format!("Add system {}", system),
            ActionType::Update => format!("Edit system {}", system),
            ActionType::Delete => format!("Remove system {}", system),
            ActionType::NoOp => format!("System {} is up to date", system),
        };
        Self {
            id: format!("{}:{}", action_type, system),
            action_type,
            system,
            description,
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// `cobbler system add`
    Create,
    /// `cobbler system edit` and/or interface sync
    Update,
    /// `cobbler system remove`
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Plan containing one action per declared system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,

    /// Whether any action changes the server
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to add, {} to edit, {} to remove, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassReport {
    pub succeeded: Vec<ResourceResult>,

    pub failed: Vec<ResourceResult>,

    /// Whether the batch-level `cobbler sync` ran successfully
    pub synced: bool,

    /// Output of a failed batch-level sync
    pub sync_error: Option<String>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl PassReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.sync_error.is_none()
    }

    pub fn add_success(&mut self, system: &str, action: ActionType, message: String) {
        self.succeeded.push(ResourceResult {
            system: system.to_string(),
            action,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, system: &str, action: ActionType, error: String) {
        self.failed.push(ResourceResult {
            system: system.to_string(),
            action,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }

    /// Number of resources that changed the server
    pub fn changed(&self) -> usize {
        self.succeeded
            .iter()
            .filter(|r| r.action != ActionType::NoOp)
            .count()
    }
}

/// Result for a single declared system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceResult {
    pub system: String,

    pub action: ActionType,

    pub success: bool,

    pub message: String,

    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_summary() {
        let plan = Plan::new(vec![
            Action::new(ActionType::Create, "web01"),
            Action::new(ActionType::NoOp, "web02"),
            Action::new(ActionType::Delete, "old01"),
        ]);
        assert!(plan.has_changes);
        assert_eq!(
            plan.summary().to_string(),
            "1 to add, 0 to edit, 1 to remove, 1 unchanged"
        );
    }

    #[test]
    fn test_plan_without_changes() {
        let plan = Plan::new(vec![Action::new(ActionType::NoOp, "web01")]);
        assert!(!plan.has_changes);
    }

    #[test]
    fn test_action_id() {
        let action = Action::new(ActionType::Update, "web01")
            .with_detail("changes", serde_json::json!(["profile"]));
        assert_eq!(action.id, "update:web01");
        assert_eq!(action.details["changes"], serde_json::json!(["profile"]));
    }

    #[test]
    fn test_report_success() {
        let mut report = PassReport::new();
        report.add_success("web01", ActionType::Create, "added".to_string());
        report.add_success("web02", ActionType::NoOp, String::new());
        assert!(report.is_success());
        assert_eq!(report.changed(), 1);

        report.sync_error = Some("boom".to_string());
        assert!(!report.is_success());
    }
}
