//! Attribute flusher
//!
//! Every scalar attribute goes out in one `cobbler system add|edit` per
//! system per pass, and the whole batch ends with a single `cobbler sync`.
//! Each `cobbler` invocation is slow and the server syncs globally as a side
//! effect, so nothing here runs once per changed attribute.

use crate::attributes::ATTRIBUTES;
use crate::context::ReconcileContext;
use crate::error::{ReconcileError, Result};
use crate::remote::{CobblerCommand, CobblerRemote, SystemAction};
use cobblerflow_core::{DesiredSystem, KernelOptions};
use serde::{Deserialize, Serialize};

/// Pending action recorded for a system during the pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushAction {
    Add,
    Edit,
    /// The system was removed directly; nothing to flush
    Destroy,
}

impl std::fmt::Display for FlushAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushAction::Add => write!(f, "add"),
            FlushAction::Edit => write!(f, "edit"),
            FlushAction::Destroy => write!(f, "destroy"),
        }
    }
}

/// Render kernel options as `'k=v k2=v2 '` (each pair followed by a space)
pub fn serialize_kernel_options(options: &KernelOptions) -> String {
    let mut value = String::from("'");
    for (key, val) in options {
        value.push_str(&format!("{}={} ", key, val));
    }
    value.push('\'');
    value
}

/// The single add/edit command for `desired`; `None` for `Destroy`
///
/// All attributes are emitted, unset ones with their empty default, so the
/// flush always overwrites. Kernel options ride along when declared.
pub fn flush_command(action: FlushAction, desired: &DesiredSystem) -> Option<CobblerCommand> {
    let system_action = match action {
        FlushAction::Add => SystemAction::Add,
        FlushAction::Edit => SystemAction::Edit,
        FlushAction::Destroy => return None,
    };

    let mut command = CobblerCommand::system(system_action, &desired.name);
    for attr in ATTRIBUTES {
        command = command.flag(attr.flag, attr.flush_value(desired));
    }
    if let Some(kopts) = &desired.kernel_options {
        command = command.flag("kopts", serialize_kernel_options(kopts));
    }
    Some(command)
}

/// Issue the add/edit for `ctx`; returns whether a command was sent
pub async fn flush(remote: &dyn CobblerRemote, ctx: &ReconcileContext<'_>) -> Result<bool> {
    let action = ctx.action();
    let Some(command) = flush_command(action, ctx.desired) else {
        tracing::debug!("Skipping flush of {} (destroyed)", ctx.name());
        return Ok(false);
    };

    tracing::info!("Flushing attributes of {} (system {})", ctx.name(), action);
    remote
        .run(&command)
        .await
        .map_err(|e| ReconcileError::AttributeFlushFailed {
            system: ctx.name().to_string(),
            action,
            output: e.output(),
        })?;
    Ok(true)
}

/// The one `cobbler sync` of a batch
pub async fn trigger_sync(remote: &dyn CobblerRemote) -> Result<()> {
    tracing::info!("Running cobbler sync");
    remote
        .run(&CobblerCommand::sync())
        .await
        .map_err(|e| ReconcileError::SyncFailed { output: e.output() })?;
    Ok(())
}
