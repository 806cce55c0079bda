//! In-memory Cobbler server
//!
//! Interprets the same `cobbler system ...` commands the reconciler issues,
//! including Cobbler's refusal to delete the last interface of a system, and
//! records every command for inspection.

use crate::error::RemoteError;
use crate::remote::{CobblerCommand, CobblerRemote, RawSystem};
use async_trait::async_trait;
use cobblerflow_core::is_truthy;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type FailurePredicate = Box<dyn Fn(&CobblerCommand) -> bool + Send + Sync>;

#[derive(Default)]
struct FakeState {
    systems: IndexMap<String, RawSystem>,
    commands: Vec<CobblerCommand>,
    failures: Vec<FailurePredicate>,
    min_interfaces: HashMap<String, usize>,
    syncs: usize,
    unavailable: bool,
}

#[derive(Default)]
pub struct FakeCobbler {
    state: Mutex<FakeState>,
}

impl FakeCobbler {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make every call fail as if the server were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state().unavailable = unavailable;
    }

    /// Seed a record exactly as `get_systems` should return it
    pub fn insert_raw(&self, raw: RawSystem) {
        let name = raw.name().unwrap_or_default().to_string();
        self.state().systems.insert(name, raw);
    }

    pub fn add_system(&self, name: &str) {
        let raw = RawSystem::new()
            .with("name", Value::from(name))
            .with("netboot_enabled", Value::Bool(false))
            .with("interfaces", Value::Object(Map::new()));
        self.state().systems.insert(name.to_string(), raw);
    }

    /// Seed an interface without recording a command
    pub fn add_interface(&self, name: &str, interface: &str, settings: &[(&str, &str)]) {
        let mut state = self.state();
        let raw = state
            .systems
            .entry(name.to_string())
            .or_insert_with(|| RawSystem::new().with("name", Value::from(name)));
        if let Some(iface) = interface_entry(raw, interface) {
            for (key, value) in settings {
                iface.insert(key.to_string(), Value::from(*value));
            }
        }
    }

    /// Fail every later command matching `predicate`
    pub fn fail_when(&self, predicate: impl Fn(&CobblerCommand) -> bool + Send + Sync + 'static) {
        self.state().failures.push(Box::new(predicate));
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Current record of `name`
    pub fn system(&self, name: &str) -> Option<RawSystem> {
        self.state().systems.get(name).cloned()
    }

    pub fn system_names(&self) -> Vec<String> {
        self.state().systems.keys().cloned().collect()
    }

    /// Every command received so far, failed ones included
    pub fn commands(&self) -> Vec<CobblerCommand> {
        self.state().commands.clone()
    }

    pub fn clear_commands(&self) {
        let mut state = self.state();
        state.commands.clear();
        state.syncs = 0;
    }

    pub fn sync_count(&self) -> usize {
        self.state().syncs
    }

    /// Lowest interface count observed on `name` after any interface command
    pub fn min_interface_count(&self, name: &str) -> Option<usize> {
        self.state().min_interfaces.get(name).copied()
    }
}

#[async_trait]
impl CobblerRemote for FakeCobbler {
    async fn get_systems(&self) -> Result<Vec<RawSystem>, RemoteError> {
        let state = self.state();
        if state.unavailable {
            return Err(RemoteError::Unavailable("connection refused".to_string()));
        }
        Ok(state.systems.values().cloned().collect())
    }

    async fn run(&self, command: &CobblerCommand) -> Result<String, RemoteError> {
        let mut state = self.state();
        if state.unavailable {
            return Err(RemoteError::Unavailable("connection refused".to_string()));
        }

        state.commands.push(command.clone());

        if state.failures.iter().any(|fails| fails(command)) {
            return Err(failed(command, "injected failure"));
        }

        state.execute(command)?;
        Ok(String::new())
    }
}

impl FakeState {
    fn execute(&mut self, command: &CobblerCommand) -> Result<(), RemoteError> {
        if command.is_sync() {
            self.syncs += 1;
            return Ok(());
        }

        let args = command.args();
        let (Some("system"), Some(action)) = (
            args.first().map(String::as_str),
            args.get(1).map(String::as_str),
        ) else {
            return Err(failed(command, "unknown command"));
        };
        let Some(name) = command.flag_value("name").map(str::to_string) else {
            return Err(failed(command, "--name is required"));
        };

        match action {
            "add" => {
                if self.systems.contains_key(&name) {
                    return Err(failed(command, &format!("system {} already exists", name)));
                }
                let raw = RawSystem::new()
                    .with("name", Value::from(name.as_str()))
                    .with("interfaces", Value::Object(Map::new()));
                self.systems.insert(name.clone(), raw);
            }
            "edit" => {
                if !self.systems.contains_key(&name) {
                    return Err(failed(command, &format!("system {} not found", name)));
                }
            }
            "remove" => {
                return match self.systems.shift_remove(&name) {
                    Some(_) => Ok(()),
                    None => Err(failed(command, &format!("system {} not found", name))),
                };
            }
            _ => return Err(failed(command, "unknown system action")),
        }

        let Some(raw) = self.systems.get_mut(&name) else {
            return Err(failed(command, &format!("system {} not found", name)));
        };

        match command.flag_value("interface") {
            Some(interface) => {
                apply_interface(raw, interface, command)?;
                let count = raw.interfaces().map_or(0, Map::len);
                let min = self.min_interfaces.entry(name).or_insert(count);
                *min = (*min).min(count);
            }
            None => apply_system_flags(raw, command),
        }
        Ok(())
    }
}

fn failed(command: &CobblerCommand, output: &str) -> RemoteError {
    RemoteError::CommandFailed {
        command: command.to_string(),
        output: output.to_string(),
    }
}

/// `--key=value` pairs after `--name`, skipping `--interface`
fn flags(command: &CobblerCommand) -> impl Iterator<Item = (&str, &str)> {
    command
        .args()
        .iter()
        .skip(3)
        .filter_map(|a| a.strip_prefix("--")?.split_once('='))
        .filter(|(key, _)| *key != "interface")
}

fn unquote(value: &str) -> &str {
    value.trim_matches('\'')
}

fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let value = map
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()));
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

fn interface_entry<'a>(raw: &'a mut RawSystem, interface: &str) -> Option<&'a mut Map<String, Value>> {
    object_entry(object_entry(&mut raw.0, "interfaces")?, interface)
}

fn apply_interface(
    raw: &mut RawSystem,
    interface: &str,
    command: &CobblerCommand,
) -> Result<(), RemoteError> {
    if command.has_switch("delete-interface") {
        let Some(Value::Object(interfaces)) = raw.0.get_mut("interfaces") else {
            return Err(failed(command, "system has no interfaces"));
        };
        if !interfaces.contains_key(interface) {
            return Err(failed(
                command,
                &format!("interface {} does not exist", interface),
            ));
        }
        if interfaces.len() == 1 {
            return Err(failed(command, "cannot delete the last interface"));
        }
        interfaces.remove(interface);
        return Ok(());
    }

    let Some(iface) = interface_entry(raw, interface) else {
        return Err(failed(command, "malformed interface record"));
    };
    for (key, value) in flags(command) {
        iface.insert(key.replace('-', "_"), Value::from(unquote(value)));
    }
    Ok(())
}

fn apply_system_flags(raw: &mut RawSystem, command: &CobblerCommand) {
    for (key, value) in flags(command) {
        let (field, value) = match key {
            "power-pass" => ("power_pass".to_string(), Value::from(unquote(value))),
            "netboot-enabled" => ("netboot_enabled".to_string(), Value::Bool(is_truthy(value))),
            "kopts" => ("kernel_options".to_string(), kernel_options(value)),
            other => (other.replace('-', "_"), Value::from(unquote(value))),
        };
        raw.0.insert(field, value);
    }
}

fn kernel_options(value: &str) -> Value {
    let mut options = Map::new();
    for token in unquote(value).split_whitespace() {
        let (key, val) = token.split_once('=').unwrap_or((token, ""));
        options.insert(key.to_string(), Value::from(val));
    }
    Value::Object(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_edit_remove() {
        let fake = FakeCobbler::new();

        let add = CobblerCommand::system(crate::SystemAction::Add, "web01")
            .flag("profile", "centos7")
            .flag("power-pass", "secret")
            .flag("netboot-enabled", "1")
            .flag("kopts", "'quiet= console=ttyS0 '");
        fake.run(&add).await.unwrap();

        let raw = fake.system("web01").unwrap();
        assert_eq!(raw.text("profile"), Some("centos7".to_string()));
        assert_eq!(raw.text("power_pass"), Some("secret".to_string()));
        assert!(raw.flag("netboot_enabled"));
        assert_eq!(
            raw.kernel_options().get("console").map(String::as_str),
            Some("ttyS0")
        );

        // add twice fails
        assert!(fake.run(&add).await.is_err());

        fake.run(&CobblerCommand::remove("web01")).await.unwrap();
        assert!(fake.system("web01").is_none());
        assert_eq!(fake.commands().len(), 3);
    }

    #[tokio::test]
    async fn test_last_interface_cannot_be_deleted() {
        let fake = FakeCobbler::new();
        fake.add_system("web01");
        fake.add_interface("web01", "eth0", &[("ip_address", "10.0.0.1")]);

        let delete = CobblerCommand::interface("web01", "eth0").switch("delete-interface");
        match fake.run(&delete).await {
            Err(RemoteError::CommandFailed { output, .. }) => {
                assert!(output.contains("last interface"));
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_interface_edit_clears_with_empty_quotes() {
        let fake = FakeCobbler::new();
        fake.add_system("web01");

        fake.run(&CobblerCommand::interface("web01", "eth0").flag("netmask", "''"))
            .await
            .unwrap();

        let raw = fake.system("web01").unwrap();
        assert_eq!(raw.interfaces().unwrap()["eth0"]["netmask"], Value::from(""));
        assert_eq!(fake.min_interface_count("web01"), Some(1));
    }

    #[test]
    fn test_sync_is_counted() {
        let fake = FakeCobbler::new();
        tokio_test::block_on(async {
            tokio_test::assert_ok!(fake.run(&CobblerCommand::sync()).await);
            tokio_test::assert_ok!(fake.run(&CobblerCommand::sync()).await);
        });
        assert_eq!(fake.sync_count(), 2);

        fake.clear_commands();
        assert_eq!(fake.sync_count(), 0);
        assert!(fake.commands().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let fake = FakeCobbler::new();
        fake.set_unavailable(true);
        assert!(matches!(
            fake.get_systems().await,
            Err(RemoteError::Unavailable(_))
        ));
    }
}
