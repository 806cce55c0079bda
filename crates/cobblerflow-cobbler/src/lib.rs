//! Cobbler transport for cobblerflow
//!
//! Implements [`cobblerflow_reconcile::CobblerRemote`] against a real Cobbler
//! server.
//!
//! # Requirements
//!
//! - the `cobbler` CLI on the reconciling host (`COBBLER_BIN` to override)
//! - the XML-RPC API reachable at `COBBLER_API_URL`
//!
//! # Example
//!
//! ```ignore
//! use cobblerflow_cobbler::CobblerClient;
//! use cobblerflow_config::Settings;
//! use cobblerflow_reconcile::Reconciler;
//! use std::sync::Arc;
//!
//! let client = CobblerClient::from_settings(&Settings::load()?);
//! let reconciler = Reconciler::new(Arc::new(client));
//! let report = reconciler.apply(&systems).await?;
//! ```

pub mod cli;
pub mod client;
pub mod error;
pub mod xmlrpc;

pub use cli::Cobbler;
pub use client::CobblerClient;
pub use error::{CobblerError, Result};
pub use xmlrpc::XmlRpc;
