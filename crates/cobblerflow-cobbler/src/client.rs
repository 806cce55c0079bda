//! Production [`CobblerRemote`]
//!
//! Reads through XML-RPC `get_systems`, writes through the `cobbler` CLI.
//! Holds no connection between calls; each call opens its own.

use crate::cli::Cobbler;
use crate::error::CobblerError;
use crate::xmlrpc::XmlRpc;
use async_trait::async_trait;
use cobblerflow_config::Settings;
use cobblerflow_reconcile::{CobblerCommand, CobblerRemote, RawSystem, RemoteError};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct CobblerClient {
    cli: Cobbler,
    rpc: XmlRpc,
}

impl CobblerClient {
    pub fn new(cli: Cobbler, rpc: XmlRpc) -> Self {
        Self { cli, rpc }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Cobbler::new(&settings.cobbler_bin, settings.timeout()),
            XmlRpc::new(&settings.api_url, settings.timeout()),
        )
    }

    pub fn cli(&self) -> &Cobbler {
        &self.cli
    }

    pub fn rpc(&self) -> &XmlRpc {
        &self.rpc
    }
}

/// Turn the decoded `get_systems` payload into raw records
pub fn raw_systems(value: Value) -> Result<Vec<RawSystem>, CobblerError> {
    let Value::Array(items) = value else {
        return Err(CobblerError::MalformedResponse(
            "get_systems did not return an array".to_string(),
        ));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(RawSystem(map)),
            other => {
                tracing::warn!("Ignoring non-struct system entry: {}", other);
                None
            }
        })
        .collect())
}

#[async_trait]
impl CobblerRemote for CobblerClient {
    async fn get_systems(&self) -> Result<Vec<RawSystem>, RemoteError> {
        let value = self.rpc.call("get_systems", &[]).await?;
        Ok(raw_systems(value)?)
    }

    async fn run(&self, command: &CobblerCommand) -> Result<String, RemoteError> {
        Ok(self.cli.run(command.args()).await?)
    }
}
