//! cobblerflow reconcile
//!
//! Converges the systems held by a Cobbler server to their declared state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              Reconciler (controller)             │
//! │   create / destroy / exists, one sync per pass   │
//! └───────┬──────────────┬──────────────┬───────────┘
//!         │              │              │
//! ┌───────▼──────┐ ┌─────▼──────┐ ┌─────▼──────────┐
//! │    reader    │ │ interfaces │ │    flusher     │
//! │ get_systems  │ │ tmp_puppet │ │ system add/edit│
//! │  + matcher   │ │ workaround │ │   + sync       │
//! └───────┬──────┘ └─────┬──────┘ └─────┬──────────┘
//!         │              │              │
//! ┌───────▼──────────────▼──────────────▼───────────┐
//! │           trait CobblerRemote { ... }            │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The remote service is driven strictly sequentially: each command is awaited
//! before the next one is issued, and a system name is reconciled by at most
//! one task at a time (see [`SystemLocks`]).

pub mod action;
pub mod attributes;
pub mod context;
pub mod controller;
pub mod diff;
pub mod error;
pub mod fake;
pub mod flusher;
pub mod interfaces;
pub mod lock;
pub mod matcher;
pub mod reader;
pub mod remote;

// Re-exports
pub use action::{Action, ActionType, PassReport, Plan, PlanSummary, ResourceResult};
pub use context::{LifecycleState, ReconcileContext};
pub use controller::Reconciler;
pub use error::{ReconcileError, RemoteError, Result};
pub use fake::FakeCobbler;
pub use flusher::FlushAction;
pub use lock::{PassLock, SystemGuard, SystemLocks};
pub use matcher::{ReconciliationBinding, bind};
pub use reader::{fetch_all, fetch_system};
pub use remote::{CobblerCommand, CobblerRemote, RawSystem, SystemAction};
