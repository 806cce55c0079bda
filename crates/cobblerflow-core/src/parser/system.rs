//! system ノードのパース

use crate::error::{FlowError, Result};
use crate::model::{
    DesiredSystem, InterfaceSettings, Interfaces, KernelOptions, SettingValue, is_truthy,
};
use kdl::{KdlEntry, KdlNode, KdlValue};

/// 名前なし引数のみを取り出す
fn arguments(node: &KdlNode) -> impl Iterator<Item = &KdlEntry> {
    node.entries().iter().filter(|e| e.name().is_none())
}

/// KDL の値を文字列化（null は None）
fn value_to_string(value: &KdlValue) -> Option<String> {
    if value.is_null() {
        return None;
    }
    if let Some(s) = value.as_string() {
        return Some(s.to_string());
    }
    if let Some(b) = value.as_bool() {
        return Some(b.to_string());
    }
    if let Some(i) = value.as_integer() {
        return Some(i.to_string());
    }
    value.as_float().map(|f| f.to_string())
}

/// 最初の引数を文字列として取得
fn first_string(node: &KdlNode) -> Option<String> {
    arguments(node).next().and_then(|e| value_to_string(e.value()))
}

fn required_name(node: &KdlNode, kind: &str) -> Result<String> {
    arguments(node)
        .next()
        .and_then(|e| e.value().as_string())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| FlowError::InvalidConfig(format!("{} requires a name", kind)))
}

/// system ノードをパース
pub fn parse_system(node: &KdlNode) -> Result<DesiredSystem> {
    let name = required_name(node, "system")?;
    let mut system = DesiredSystem::new(name);

    let Some(children) = node.children() else {
        return Ok(system);
    };

    for child in children.nodes() {
        match child.name().value() {
            "ensure" => {
                let value = first_string(child).ok_or_else(|| {
                    FlowError::InvalidConfig(format!(
                        "system '{}': ensure requires a value",
                        system.name
                    ))
                })?;
                system.ensure = value.parse()?;
            }
            "profile" => system.profile = first_string(child),
            "hostname" => system.hostname = first_string(child),
            "gateway" => system.gateway = first_string(child),
            "comment" => system.comment = first_string(child),
            "kickstart" => system.kickstart = first_string(child),
            "power_user" | "power-user" => system.power_user = first_string(child),
            "power_address" | "power-address" => system.power_address = first_string(child),
            "power_password" | "power-password" | "power_pass" | "power-pass" => {
                system.power_password = first_string(child);
            }
            "power_id" | "power-id" => system.power_id = first_string(child),
            "power_type" | "power-type" => system.power_type = first_string(child),
            "netboot" | "netboot_enabled" | "netboot-enabled" => {
                // #true / "true" / 1 などを受け付ける
                system.netboot = Some(first_string(child).is_some_and(|v| is_truthy(&v)));
            }
            "kernel_options" | "kernel-options" | "kopts" => {
                system.kernel_options = Some(parse_kernel_options(child));
            }
            "interface" => {
                let (iface_name, settings) = parse_interface(child)?;
                system
                    .interfaces
                    .get_or_insert_with(Interfaces::new)
                    .insert(iface_name, settings);
            }
            "interfaces" => {
                // 空の interfaces {} は validate で拒否される
                let interfaces = system.interfaces.get_or_insert_with(Interfaces::new);
                if let Some(ifaces) = child.children() {
                    for iface in ifaces.nodes() {
                        let settings = parse_settings(iface);
                        interfaces.insert(iface.name().value().to_string(), settings);
                    }
                }
            }
            other => {
                tracing::warn!("system '{}': 未知の設定を無視します: {}", system.name, other);
            }
        }
    }

    Ok(system)
}

/// kernel-options ブロックをパース
///
/// 子ノード形式（`quiet ""`）とプロパティ形式（`console="ttyS0"`）の両方を受け付けます。
fn parse_kernel_options(node: &KdlNode) -> KernelOptions {
    let mut options = KernelOptions::new();

    for entry in node.entries() {
        if let Some(key) = entry.name() {
            let value = value_to_string(entry.value()).unwrap_or_default();
            options.insert(key.value().to_string(), value);
        }
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let value = first_string(child).unwrap_or_default();
            options.insert(child.name().value().to_string(), value);
        }
    }

    options
}

/// interface ノードをパース
fn parse_interface(node: &KdlNode) -> Result<(String, InterfaceSettings)> {
    let name = required_name(node, "interface")?;
    Ok((name, parse_settings(node)))
}

/// インターフェースの設定ブロックをパース
///
/// 引数が 1 つならスカラー、複数ならリスト、なし / #null ならクリア指定。
fn parse_settings(node: &KdlNode) -> InterfaceSettings {
    let mut settings = InterfaceSettings::new();

    let Some(children) = node.children() else {
        return settings;
    };

    for child in children.nodes() {
        let values: Vec<Option<String>> = arguments(child)
            .map(|e| value_to_string(e.value()))
            .collect();

        let value = match values.as_slice() {
            [] | [None] => SettingValue::Null,
            [Some(single)] => SettingValue::Text(single.clone()),
            many => SettingValue::List(many.iter().flatten().cloned().collect()),
        };
        settings.insert(child.name().value().to_string(), value);
    }

    settings
}
