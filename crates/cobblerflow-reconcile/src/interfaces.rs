//! Interface reconciler
//!
//! Cobbler can add, edit or delete a single interface, and refuses to delete
//! the last interface of a system. To replace the whole set we:
//!
//! 1. capture the current interface names,
//! 2. add the placeholder `tmp_puppet` (static),
//! 3. delete every captured interface,
//! 4. recreate the declared interfaces, one edit per setting,
//! 5. delete the placeholder.
//!
//! The system therefore keeps at least one interface at every step. A failed
//! step aborts the sync; rerunning it from scratch converges.

use crate::context::ReconcileContext;
use crate::diff::effective_interfaces;
use crate::error::{ReconcileError, RemoteError, Result};
use crate::reader::fetch_system;
use crate::remote::{CobblerCommand, CobblerRemote};
use cobblerflow_core::{FlowError, Interfaces, PLACEHOLDER_INTERFACE};

/// Cobbler flag for an interface setting (`ip_address` -> `ip-address`)
pub fn setting_flag(key: &str) -> String {
    key.replace('_', "-")
}

/// Commands that replace `current` interfaces with `desired` on `system`
///
/// Interfaces declared with no settings produce no edit and are therefore
/// not created.
pub fn interface_commands(
    system: &str,
    current: &[String],
    desired: &Interfaces,
) -> Vec<CobblerCommand> {
    let mut commands = vec![
        CobblerCommand::interface(system, PLACEHOLDER_INTERFACE).flag("static", "true"),
    ];

    // a placeholder left by an interrupted sync is reused and removed last
    for iface in current.iter().filter(|i| *i != PLACEHOLDER_INTERFACE) {
        commands.push(CobblerCommand::interface(system, iface).switch("delete-interface"));
    }

    for (iface, settings) in desired {
        for (key, value) in settings {
            let flag = setting_flag(key);
            let value = value.to_flag_value().unwrap_or_else(|| "''".to_string());
            commands.push(CobblerCommand::interface(system, iface).flag(&flag, value));
        }
    }

    commands.push(
        CobblerCommand::interface(system, PLACEHOLDER_INTERFACE).switch("delete-interface"),
    );
    commands
}

/// Make the remote interface set of `ctx`'s system equal to `desired`
pub async fn sync_interfaces(
    remote: &dyn CobblerRemote,
    ctx: &ReconcileContext<'_>,
    desired: &Interfaces,
) -> Result<()> {
    let system = ctx.name();

    // deleting the real interfaces with nothing to recreate would strand the placeholder
    if effective_interfaces(desired).is_empty() {
        return Err(FlowError::NoInterfaces(system.to_string()).into());
    }

    let failed = |cause: RemoteError| ReconcileError::InterfaceSyncFailed {
        system: system.to_string(),
        cause,
    };

    // fresh read: an earlier step of this pass may have changed the system
    let current: Vec<String> = fetch_system(remote, system)
        .await
        .map_err(failed)?
        .map(|record| record.interfaces.keys().cloned().collect())
        .unwrap_or_default();

    let commands = interface_commands(system, &current, desired);
    tracing::info!(
        "Syncing interfaces of {}: {} -> {} ({} commands)",
        system,
        current.len(),
        desired.len(),
        commands.len()
    );

    for command in &commands {
        remote.run(command).await.map_err(failed)?;
    }

    Ok(())
}
