//! system モデル
//!
//! Cobbler 上の実際の system と、宣言された望ましい system の定義

use super::value::{Interfaces, KernelOptions};
use super::PLACEHOLDER_INTERFACE;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 宣言された system があるべき状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl std::fmt::Display for Ensure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ensure::Present => write!(f, "present"),
            Ensure::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for Ensure {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "present" => Ok(Ensure::Present),
            "absent" => Ok(Ensure::Absent),
            other => Err(FlowError::InvalidConfig(format!(
                "ensure は present か absent を指定してください: {}",
                other
            ))),
        }
    }
}

/// Cobbler から読み出した system
///
/// 毎回のリコンサイルで新しく組み立てられ、キャッシュされません。
/// 空文字列・空リストの値は持たず、`None` / 欠落で「未設定」を表します。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub name: String,
    pub profile: Option<String>,
    pub hostname: Option<String>,
    pub gateway: Option<String>,
    pub comment: Option<String>,
    pub kickstart: Option<String>,
    pub power_user: Option<String>,
    pub power_address: Option<String>,
    pub power_password: Option<String>,
    pub power_id: Option<String>,
    pub power_type: Option<String>,
    pub netboot: bool,
    pub kernel_options: KernelOptions,
    pub interfaces: Interfaces,
}

impl SystemRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// 宣言された system
///
/// `None` の属性は管理対象外（差分判定に使わない）です。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesiredSystem {
    pub name: String,
    pub ensure: Ensure,
    pub profile: Option<String>,
    pub hostname: Option<String>,
    pub gateway: Option<String>,
    pub comment: Option<String>,
    pub kickstart: Option<String>,
    pub power_user: Option<String>,
    pub power_address: Option<String>,
    pub power_password: Option<String>,
    pub power_id: Option<String>,
    pub power_type: Option<String>,
    pub netboot: Option<bool>,
    pub kernel_options: Option<KernelOptions>,
    pub interfaces: Option<Interfaces>,
}

impl DesiredSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: Ensure::Absent,
            ..Default::default()
        }
    }

    /// 名前・予約済みインターフェース名・インターフェースの有無を確認
    ///
    /// Cobbler の system はインターフェースを 0 個にできないため、
    /// 設定を持つインターフェースが 1 つもない interfaces 宣言は拒否します。
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(FlowError::InvalidConfig(
                "system には名前が必要です".to_string(),
            ));
        }
        let reserved = self
            .interfaces
            .as_ref()
            .is_some_and(|ifaces| ifaces.contains_key(PLACEHOLDER_INTERFACE));
        if reserved {
            return Err(FlowError::ReservedInterface {
                system: self.name.clone(),
                interface: PLACEHOLDER_INTERFACE.to_string(),
            });
        }
        if self.ensure == Ensure::Present && self.declares_no_interfaces() {
            return Err(FlowError::NoInterfaces(self.name.clone()));
        }
        Ok(())
    }

    /// interfaces を宣言しているが、設定を持つインターフェースが 1 つもない
    pub fn declares_no_interfaces(&self) -> bool {
        self.interfaces
            .as_ref()
            .is_some_and(|ifaces| ifaces.values().all(|settings| settings.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InterfaceSettings, SettingValue};

    #[test]
    fn test_ensure_from_str() {
        assert_eq!("present".parse::<Ensure>().unwrap(), Ensure::Present);
        assert_eq!("absent".parse::<Ensure>().unwrap(), Ensure::Absent);
        assert!("running".parse::<Ensure>().is_err());
    }

    #[test]
    fn test_validate_rejects_placeholder() {
        let mut settings = InterfaceSettings::new();
        settings.insert("static".to_string(), SettingValue::from("true"));
        let mut interfaces = Interfaces::new();
        interfaces.insert(PLACEHOLDER_INTERFACE.to_string(), settings);

        let system = DesiredSystem {
            interfaces: Some(interfaces),
            ..DesiredSystem::new("web01")
        };

        match system.validate() {
            Err(FlowError::ReservedInterface { system, interface }) => {
                assert_eq!(system, "web01");
                assert_eq!(interface, "tmp_puppet");
            }
            other => panic!("Expected ReservedInterface, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_interface_set() {
        let empty = DesiredSystem {
            interfaces: Some(Interfaces::new()),
            ..DesiredSystem::new("web01")
        };
        assert!(matches!(empty.validate(), Err(FlowError::NoInterfaces(name)) if name == "web01"));

        let mut interfaces = Interfaces::new();
        interfaces.insert("eth0".to_string(), InterfaceSettings::new());
        let settingless = DesiredSystem {
            interfaces: Some(interfaces.clone()),
            ..DesiredSystem::new("web01")
        };
        assert!(matches!(settingless.validate(), Err(FlowError::NoInterfaces(_))));

        let mut eth1 = InterfaceSettings::new();
        eth1.insert("ip_address".to_string(), SettingValue::from("10.0.0.6"));
        interfaces.insert("eth1".to_string(), eth1);
        let partial = DesiredSystem {
            interfaces: Some(interfaces),
            ..DesiredSystem::new("web01")
        };
        assert!(partial.validate().is_ok());

        // absent の system はインターフェースを触らない
        let absent = DesiredSystem {
            interfaces: Some(Interfaces::new()),
            ..DesiredSystem::absent("old01")
        };
        assert!(absent.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_name() {
        assert!(DesiredSystem::default().validate().is_err());
        assert!(DesiredSystem::new("web01").validate().is_ok());
    }
}
