//! Remote capability trait
//!
//! The reconciler never talks to Cobbler directly. It is handed a stateless
//! client implementing [`CobblerRemote`]; the production implementation lives
//! in `cobblerflow-cobbler`, the in-memory one in [`crate::fake`].

use crate::error::RemoteError;
use async_trait::async_trait;
use cobblerflow_core::{KernelOptions, is_truthy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cobbler query and command interface
#[async_trait]
pub trait CobblerRemote: Send + Sync {
    /// Fetch every system known to the server (XML-RPC `get_systems`)
    async fn get_systems(&self) -> std::result::Result<Vec<RawSystem>, RemoteError>;

    /// Run one `cobbler` command and return its output
    async fn run(&self, command: &CobblerCommand) -> std::result::Result<String, RemoteError>;
}

/// Sub-command of `cobbler system`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemAction {
    Add,
    Edit,
    Remove,
}

impl std::fmt::Display for SystemAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SystemAction::Add => write!(f, "add"),
            SystemAction::Edit => write!(f, "edit"),
            SystemAction::Remove => write!(f, "remove"),
        }
    }
}

/// One invocation of the `cobbler` executable
///
/// Arguments are kept as separate tokens; flags are rendered `--key=value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CobblerCommand {
    args: Vec<String>,
}

impl CobblerCommand {
    /// `cobbler system <action> --name=<name>`
    pub fn system(action: SystemAction, name: &str) -> Self {
        Self {
            args: vec![
                "system".to_string(),
                action.to_string(),
                format!("--name={}", name),
            ],
        }
    }

    /// `cobbler system edit --name=<name> --interface=<interface>`
    pub fn interface(name: &str, interface: &str) -> Self {
        Self::system(SystemAction::Edit, name).flag("interface", interface)
    }

    /// `cobbler system remove --name=<name>`
    pub fn remove(name: &str) -> Self {
        Self::system(SystemAction::Remove, name)
    }

    /// `cobbler sync`
    pub fn sync() -> Self {
        Self {
            args: vec!["sync".to_string()],
        }
    }

    /// Append `--<key>=<value>`
    pub fn flag(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.args.push(format!("--{}={}", key, value.as_ref()));
        self
    }

    /// Append a bare `--<key>` switch
    pub fn switch(mut self, key: &str) -> Self {
        self.args.push(format!("--{}", key));
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_sync(&self) -> bool {
        self.args.first().is_some_and(|a| a == "sync")
    }

    /// Value of a `--<key>=` flag, if present
    pub fn flag_value(&self, key: &str) -> Option<&str> {
        let prefix = format!("--{}=", key);
        self.args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
    }

    pub fn has_switch(&self, key: &str) -> bool {
        let switch = format!("--{}", key);
        self.args.iter().any(|a| *a == switch)
    }
}

impl std::fmt::Display for CobblerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// A system record as returned by `get_systems`, before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSystem(pub Map<String, Value>);

impl RawSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.0
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Scalar field as text; empty strings and nulls are `None`
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Boolean field; Cobbler reports these as bools, ints or strings
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => is_truthy(s),
            _ => false,
        }
    }

    /// `kernel_options`, given either as a struct or as a `k=v k2` string
    pub fn kernel_options(&self) -> KernelOptions {
        let mut options = KernelOptions::new();
        match self.0.get("kernel_options") {
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    options.insert(key.clone(), value);
                }
            }
            Some(Value::String(s)) => {
                for token in s.trim_matches('\'').split_whitespace() {
                    let (key, value) = token.split_once('=').unwrap_or((token, ""));
                    options.insert(key.to_string(), value.to_string());
                }
            }
            _ => {}
        }
        options
    }

    pub fn interfaces(&self) -> Option<&Map<String, Value>> {
        self.0.get("interfaces").and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_rendering() {
        let cmd = CobblerCommand::interface("web01", "tmp_puppet").flag("static", "true");
        assert_eq!(
            cmd.args(),
            &[
                "system",
                "edit",
                "--name=web01",
                "--interface=tmp_puppet",
                "--static=true"
            ]
        );
        assert_eq!(
            cmd.to_string(),
            "system edit --name=web01 --interface=tmp_puppet --static=true"
        );
        assert_eq!(cmd.flag_value("interface"), Some("tmp_puppet"));
        assert!(!cmd.is_sync());
    }

    #[test]
    fn test_switch() {
        let cmd = CobblerCommand::interface("web01", "eth0").switch("delete-interface");
        assert!(cmd.has_switch("delete-interface"));
        assert_eq!(cmd.args().last().unwrap(), "--delete-interface");
    }

    #[test]
    fn test_sync_and_remove() {
        assert!(CobblerCommand::sync().is_sync());
        assert_eq!(
            CobblerCommand::remove("web01").to_string(),
            "system remove --name=web01"
        );
    }

    #[test]
    fn test_raw_text_and_flag() {
        let raw = RawSystem::new()
            .with("name", json!("web01"))
            .with("profile", json!(""))
            .with("hostname", json!("web01.lan"))
            .with("netboot_enabled", json!(1));

        assert_eq!(raw.name(), Some("web01"));
        assert_eq!(raw.text("profile"), None);
        assert_eq!(raw.text("hostname"), Some("web01.lan".to_string()));
        assert!(raw.flag("netboot_enabled"));
        assert!(!raw.flag("missing"));
    }

    #[test]
    fn test_raw_kernel_options() {
        let raw = RawSystem::new().with("kernel_options", json!({"console": "ttyS0", "quiet": null}));
        let kopts = raw.kernel_options();
        assert_eq!(kopts.get("console").map(String::as_str), Some("ttyS0"));
        assert_eq!(kopts.get("quiet").map(String::as_str), Some(""));

        let raw = RawSystem::new().with("kernel_options", json!("quiet console=ttyS0"));
        let kopts = raw.kernel_options();
        assert_eq!(kopts.get("quiet").map(String::as_str), Some(""));
        assert_eq!(kopts.get("console").map(String::as_str), Some("ttyS0"));
    }
}
