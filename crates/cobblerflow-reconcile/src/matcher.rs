//! Desired/actual matcher

use cobblerflow_core::{DesiredSystem, SystemRecord};
use std::collections::HashMap;

/// A declared system paired with its remote record, if one exists
#[derive(Debug, Clone, Copy)]
pub struct ReconciliationBinding<'a> {
    pub desired: &'a DesiredSystem,
    pub actual: Option<&'a SystemRecord>,
}

impl ReconciliationBinding<'_> {
    pub fn name(&self) -> &str {
        &self.desired.name
    }

    pub fn exists_remotely(&self) -> bool {
        self.actual.is_some()
    }
}

/// Bind declarations to remote records by exact name
///
/// Bindings follow the order of `desired`.
pub fn bind<'a>(
    desired: &'a [DesiredSystem],
    actual: &'a [SystemRecord],
) -> Vec<ReconciliationBinding<'a>> {
    let by_name: HashMap<&str, &SystemRecord> =
        actual.iter().map(|r| (r.name.as_str(), r)).collect();

    desired
        .iter()
        .map(|d| ReconciliationBinding {
            desired: d,
            actual: by_name.get(d.name.as_str()).copied(),
        })
        .collect()
}
