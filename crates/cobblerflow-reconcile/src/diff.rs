//! Desired vs actual comparison
//!
//! Only managed (declared) properties are compared. The result decides which
//! of the controller's steps run for a binding.

use crate::attributes::ATTRIBUTES;
use crate::matcher::ReconciliationBinding;
use cobblerflow_core::{DesiredSystem, Ensure, Interfaces, SettingValue, SystemRecord};

/// What the controller has to do for one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Declared state already holds
    NoOp,
    /// Not on the server yet: `system add`, then interfaces if declared
    Create { interfaces: bool },
    /// Drift on an existing system: interfaces if needed, then `system edit`
    Update {
        interfaces: bool,
        changes: Vec<String>,
    },
    /// Declared absent but present remotely
    Destroy,
}

impl Decision {
    pub fn has_changes(&self) -> bool {
        !matches!(self, Decision::NoOp)
    }
}

pub fn decide(binding: &ReconciliationBinding<'_>) -> Decision {
    let desired = binding.desired;

    match (desired.ensure, binding.actual) {
        (Ensure::Absent, Some(_)) => Decision::Destroy,
        (Ensure::Absent, None) => Decision::NoOp,
        (Ensure::Present, None) => Decision::Create {
            interfaces: desired
                .interfaces
                .as_ref()
                .is_some_and(|ifaces| !effective_interfaces(ifaces).is_empty()),
        },
        (Ensure::Present, Some(actual)) => {
            let changes = changed_properties(desired, actual);
            if changes.is_empty() {
                Decision::NoOp
            } else {
                Decision::Update {
                    interfaces: changes.iter().any(|c| c == "interfaces"),
                    changes,
                }
            }
        }
    }
}

/// Names of managed properties whose remote value differs
pub fn changed_properties(desired: &DesiredSystem, actual: &SystemRecord) -> Vec<String> {
    let mut changes: Vec<String> = ATTRIBUTES
        .iter()
        .filter(|attr| attr.drifted(desired, actual))
        .map(|attr| attr.field.to_string())
        .collect();

    if let Some(kopts) = &desired.kernel_options {
        // IndexMap equality ignores order
        if *kopts != actual.kernel_options {
            changes.push("kernel_options".to_string());
        }
    }

    if let Some(interfaces) = &desired.interfaces {
        if interfaces_drifted(interfaces, &actual.interfaces) {
            changes.push("interfaces".to_string());
        }
    }

    changes
}

/// Interfaces that would actually exist remotely after a sync
///
/// An interface is only created as a side effect of an edit on it, so one
/// declared with no settings at all is never created.
pub fn effective_interfaces(desired: &Interfaces) -> Interfaces {
    desired
        .iter()
        .filter(|(_, settings)| !settings.is_empty())
        .map(|(name, settings)| (name.clone(), settings.clone()))
        .collect()
}

/// Whether the remote interface set or any declared setting differs
pub fn interfaces_drifted(desired: &Interfaces, actual: &Interfaces) -> bool {
    let desired = effective_interfaces(desired);

    // a system cannot hold zero interfaces; sync_interfaces refuses this set
    if desired.is_empty() {
        return false;
    }

    if desired.len() != actual.len() || desired.keys().any(|k| !actual.contains_key(k)) {
        return true;
    }

    desired.iter().any(|(name, settings)| {
        let remote = &actual[name.as_str()];
        settings.iter().any(|(key, value)| match value {
            SettingValue::Null => remote.contains_key(key),
            value => remote.get(key).and_then(SettingValue::to_flag_value) != value.to_flag_value(),
        })
    })
}
