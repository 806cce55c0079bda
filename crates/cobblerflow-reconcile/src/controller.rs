//! Lifecycle controller
//!
//! Drives one reconciliation pass: read the server once, bind declarations to
//! records, then create, edit or destroy each system in declaration order.
//! Per-resource failures are reported and the batch moves on; only an
//! unreachable server aborts the whole pass.

use crate::action::{Action, ActionType, PassReport, Plan};
use crate::context::{LifecycleState, ReconcileContext};
use crate::diff::{Decision, decide};
use crate::error::{ReconcileError, Result};
use crate::flusher::{flush, trigger_sync};
use crate::interfaces::sync_interfaces;
use crate::lock::SystemLocks;
use crate::matcher::{ReconciliationBinding, bind};
use crate::reader::fetch_all;
use crate::remote::{CobblerCommand, CobblerRemote};
use cobblerflow_core::{DesiredSystem, FlowError, SystemRecord};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

pub struct Reconciler {
    remote: Arc<dyn CobblerRemote>,
    locks: SystemLocks,
    /// Last-known lifecycle state per system name
    snapshot: Mutex<HashMap<String, LifecycleState>>,
}

impl Reconciler {
    pub fn new(remote: Arc<dyn CobblerRemote>) -> Self {
        Self {
            remote,
            locks: SystemLocks::new(),
            snapshot: Mutex::new(HashMap::new()),
        }
    }

    /// Share a lock registry with other reconcilers in the same process
    pub fn with_locks(mut self, locks: SystemLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn remote(&self) -> &dyn CobblerRemote {
        self.remote.as_ref()
    }

    /// Every system currently on the server
    pub async fn list(&self) -> Result<Vec<SystemRecord>> {
        self.read_server().await
    }

    /// Whether `name` was present at the last read or pass
    ///
    /// Answers from the snapshot kept by `list`, `plan` and `apply`; never
    /// queries the server. A name never seen is reported absent.
    pub fn exists(&self, name: &str) -> bool {
        self.snapshot().get(name) == Some(&LifecycleState::Present)
    }

    /// Compute what `apply` would do, without issuing any command
    pub async fn plan(&self, desired: &[DesiredSystem]) -> Result<Plan> {
        let (valid, _) = partition_valid(desired);
        let actual = self.read_server().await?;

        let actions = bind(&valid, &actual)
            .iter()
            .map(|binding| planned_action(binding, &decide(binding)))
            .collect();
        Ok(Plan::new(actions))
    }

    /// Run one reconciliation pass
    pub async fn apply(&self, desired: &[DesiredSystem]) -> Result<PassReport> {
        let start = Instant::now();
        let mut report = PassReport::new();

        let (valid, invalid) = partition_valid(desired);
        for (name, err) in invalid {
            tracing::warn!("Skipping invalid declaration {}: {}", name, err);
            report.add_failure(
                &name,
                ActionType::NoOp,
                ReconcileError::InvalidResource(err).to_string(),
            );
        }

        let actual = self.read_server().await?;
        let bindings = bind(&valid, &actual);
        tracing::info!(
            "Reconciling {} systems ({} on the server)",
            bindings.len(),
            actual.len()
        );

        let mut needs_sync = false;
        for binding in bindings {
            let action_type = action_type(&decide(&binding));
            match self.reconcile(binding, &mut needs_sync).await {
                Ok(message) => report.add_success(binding.name(), action_type, message),
                Err(e) => {
                    tracing::error!("Failed to reconcile {}: {}", binding.name(), e);
                    report.add_failure(binding.name(), action_type, e.to_string());
                }
            }
        }

        if needs_sync {
            match trigger_sync(self.remote()).await {
                Ok(()) => report.synced = true,
                Err(e) => {
                    tracing::error!("{}", e);
                    report.sync_error = Some(e.to_string());
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Pass finished in {}ms: {} succeeded, {} failed",
            report.duration_ms,
            report.succeeded.len(),
            report.failed.len()
        );
        Ok(report)
    }

    fn snapshot(&self) -> MutexGuard<'_, HashMap<String, LifecycleState>> {
        self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read every system and replace the snapshot with what the server holds
    async fn read_server(&self) -> Result<Vec<SystemRecord>> {
        let actual = fetch_all(self.remote()).await?;
        let mut snapshot = self.snapshot();
        snapshot.clear();
        snapshot.extend(
            actual
                .iter()
                .map(|record| (record.name.clone(), LifecycleState::Present)),
        );
        Ok(actual)
    }

    /// Converge a single binding and record where it ended up
    async fn reconcile(
        &self,
        binding: ReconciliationBinding<'_>,
        needs_sync: &mut bool,
    ) -> Result<String> {
        let _guard = self.locks.lock(binding.name()).await;
        let mut ctx = ReconcileContext::new(binding);

        let outcome = self.converge(&binding, &mut ctx, needs_sync).await;
        self.snapshot().insert(ctx.name().to_string(), ctx.state());
        outcome
    }

    /// Run the decided steps; sets `needs_sync` once an add/edit landed
    async fn converge(
        &self,
        binding: &ReconciliationBinding<'_>,
        ctx: &mut ReconcileContext<'_>,
        needs_sync: &mut bool,
    ) -> Result<String> {
        let remote = self.remote();

        match decide(binding) {
            Decision::NoOp => {
                tracing::debug!("{} is up to date ({})", ctx.name(), ctx.state());
                Ok("up to date".to_string())
            }
            Decision::Destroy => {
                self.destroy(ctx).await?;
                Ok("removed".to_string())
            }
            Decision::Create { interfaces } => {
                ctx.create();
                // the system must exist before its interfaces can be edited
                flush(remote, ctx).await?;
                ctx.mark_flushed();
                *needs_sync = true;

                if let (true, Some(desired)) = (interfaces, &ctx.desired.interfaces) {
                    sync_interfaces(remote, ctx, desired).await?;
                }
                Ok("added".to_string())
            }
            Decision::Update {
                interfaces,
                changes,
            } => {
                tracing::info!("{} drifted: {}", ctx.name(), changes.join(", "));
                if let (true, Some(desired)) = (interfaces, &ctx.desired.interfaces) {
                    sync_interfaces(remote, ctx, desired).await?;
                }
                flush(remote, ctx).await?;
                ctx.mark_flushed();
                *needs_sync = true;
                Ok(format!("updated {}", changes.join(", ")))
            }
        }
    }

    /// `cobbler system remove` followed by its own `cobbler sync`
    async fn destroy(&self, ctx: &mut ReconcileContext<'_>) -> Result<()> {
        tracing::info!("Removing system {}", ctx.name());
        self.remote()
            .run(&CobblerCommand::remove(ctx.name()))
            .await
            .map_err(|e| ReconcileError::RemoveFailed {
                system: ctx.name().to_string(),
                output: e.output(),
            })?;
        trigger_sync(self.remote()).await?;
        ctx.mark_destroyed();
        Ok(())
    }
}

/// Split declarations into valid ones and (name, error) for the rest
///
/// A repeated name keeps its first declaration.
fn partition_valid(desired: &[DesiredSystem]) -> (Vec<DesiredSystem>, Vec<(String, FlowError)>) {
    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for system in desired {
        if let Err(e) = system.validate() {
            invalid.push((system.name.clone(), e));
        } else if !seen.insert(system.name.as_str()) {
            invalid.push((
                system.name.clone(),
                FlowError::DuplicateSystem(system.name.clone()),
            ));
        } else {
            valid.push(system.clone());
        }
    }
    (valid, invalid)
}

fn action_type(decision: &Decision) -> ActionType {
    match decision {
        Decision::NoOp => ActionType::NoOp,
        Decision::Create { .. } => ActionType::Create,
        Decision::Update { .. } => ActionType::Update,
        Decision::Destroy => ActionType::Delete,
    }
}

fn planned_action(binding: &ReconciliationBinding<'_>, decision: &Decision) -> Action {
    let action = Action::new(action_type(decision), binding.name());
    match decision {
        Decision::Create { interfaces } => {
            action.with_detail("interfaces", serde_json::json!(interfaces))
        }
        Decision::Update {
            interfaces,
            changes,
        } => action
            .with_detail("interfaces", serde_json::json!(interfaces))
            .with_detail("changes", serde_json::json!(changes)),
        Decision::NoOp | Decision::Destroy => action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeCobbler;

    #[test]
    fn test_partition_rejects_duplicates_and_placeholder() {
        let mut reserved = DesiredSystem::new("db01");
        let mut ifaces = cobblerflow_core::Interfaces::new();
        ifaces.insert("tmp_puppet".to_string(), Default::default());
        reserved.interfaces = Some(ifaces);

        let desired = vec![
            DesiredSystem::new("web01"),
            DesiredSystem::new("web01"),
            reserved,
        ];
        let (valid, invalid) = partition_valid(&desired);

        assert_eq!(valid.len(), 1);
        assert_eq!(invalid.len(), 2);
        assert!(matches!(invalid[0].1, FlowError::DuplicateSystem(_)));
        assert!(matches!(invalid[1].1, FlowError::ReservedInterface { .. }));
    }

    #[tokio::test]
    async fn test_plan_issues_no_commands() {
        let fake = Arc::new(FakeCobbler::new());
        fake.add_system("old01");
        let reconciler = Reconciler::new(fake.clone());

        let plan = reconciler
            .plan(&[DesiredSystem::new("web01"), DesiredSystem::absent("old01")])
            .await
            .unwrap();

        let summary = plan.summary();
        assert_eq!(summary.create, 1);
        assert_eq!(summary.delete, 1);
        assert!(fake.commands().is_empty());
    }

    #[tokio::test]
    async fn test_exists_reads_the_snapshot() {
        let fake = Arc::new(FakeCobbler::new());
        fake.add_system("web01");
        fake.add_system("old01");
        let reconciler = Reconciler::new(fake.clone());

        // nothing read yet
        assert!(!reconciler.exists("web01"));

        reconciler.list().await.unwrap();
        assert!(reconciler.exists("web01"));
        assert!(!reconciler.exists("web02"));

        // later server-side changes are not seen until the next read
        fake.add_system("web02");
        fake.set_unavailable(true);
        assert!(!reconciler.exists("web02"));
        fake.set_unavailable(false);

        reconciler
            .apply(&[DesiredSystem::new("web03"), DesiredSystem::absent("old01")])
            .await
            .unwrap();
        assert!(reconciler.exists("web02"));
        assert!(reconciler.exists("web03"));
        assert!(!reconciler.exists("old01"));
    }

    #[tokio::test]
    async fn test_failed_create_is_not_reported_present() {
        let fake = Arc::new(FakeCobbler::new());
        fake.fail_when(|c| c.to_string().starts_with("system add"));
        let reconciler = Reconciler::new(fake);

        let report = reconciler.apply(&[DesiredSystem::new("web01")]).await.unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(!reconciler.exists("web01"));
    }

    #[tokio::test]
    async fn test_unavailable_aborts_pass() {
        let fake = Arc::new(FakeCobbler::new());
        fake.set_unavailable(true);
        let reconciler = Reconciler::new(fake);

        assert!(matches!(
            reconciler.apply(&[DesiredSystem::new("web01")]).await,
            Err(ReconcileError::RemoteUnavailable(_))
        ));
    }
}
