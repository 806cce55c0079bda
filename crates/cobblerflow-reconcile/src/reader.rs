//! Remote state reader
//!
//! Turns the raw `get_systems` payload into normalized [`SystemRecord`]s.
//! Nothing is cached; every pass reads the server again.

use crate::error::{ReconcileError, RemoteError, Result};
use crate::remote::{CobblerRemote, RawSystem};
use cobblerflow_core::{InterfaceSettings, Interfaces, SettingValue, SystemRecord};
use serde_json::Value;

/// Read and normalize every system on the server
pub async fn fetch_all(remote: &dyn CobblerRemote) -> Result<Vec<SystemRecord>> {
    let raw = remote
        .get_systems()
        .await
        .map_err(|e| ReconcileError::RemoteUnavailable(e.to_string()))?;

    let records: Vec<SystemRecord> = raw.iter().filter_map(normalize).collect();
    tracing::debug!("Fetched {} systems from cobbler", records.len());
    Ok(records)
}

/// Re-read a single system by name
pub async fn fetch_system(
    remote: &dyn CobblerRemote,
    name: &str,
) -> std::result::Result<Option<SystemRecord>, RemoteError> {
    let raw = remote.get_systems().await?;
    Ok(raw
        .iter()
        .find(|r| r.name() == Some(name))
        .and_then(normalize))
}

/// Normalize one raw record; records without a name are skipped
pub fn normalize(raw: &RawSystem) -> Option<SystemRecord> {
    let Some(name) = raw.name() else {
        tracing::warn!("Skipping cobbler system without a name");
        return None;
    };

    Some(SystemRecord {
        name: name.to_string(),
        profile: raw.text("profile"),
        hostname: raw.text("hostname"),
        gateway: raw.text("gateway"),
        comment: raw.text("comment"),
        kickstart: raw.text("kickstart"),
        power_user: raw.text("power_user"),
        power_address: raw.text("power_address"),
        power_password: raw.text("power_pass"),
        power_id: raw.text("power_id"),
        power_type: raw.text("power_type"),
        netboot: raw.flag("netboot_enabled"),
        kernel_options: raw.kernel_options(),
        interfaces: normalize_interfaces(raw),
    })
}

/// Copy only interface settings whose value is non-empty
fn normalize_interfaces(raw: &RawSystem) -> Interfaces {
    let mut interfaces = Interfaces::new();

    let Some(raw_interfaces) = raw.interfaces() else {
        return interfaces;
    };

    for (iface_name, iface_settings) in raw_interfaces {
        let mut settings = InterfaceSettings::new();
        if let Some(map) = iface_settings.as_object() {
            for (key, value) in map {
                if let Some(value) = setting_value(value) {
                    settings.insert(key.clone(), value);
                }
            }
        }
        interfaces.insert(iface_name.clone(), settings);
    }

    interfaces
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn setting_value(value: &Value) -> Option<SettingValue> {
    let value = match value {
        Value::Array(items) => SettingValue::List(items.iter().filter_map(scalar_text).collect()),
        Value::Null | Value::Object(_) => return None,
        scalar => SettingValue::Text(scalar_text(scalar)?),
    };
    (!value.is_empty()).then_some(value)
}
