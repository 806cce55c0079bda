//! Scalar attribute table
//!
//! Maps each flushed attribute to its `cobbler system` flag. The flusher
//! walks this table to build the single add/edit command; the diff walks it
//! to find drift.

use cobblerflow_core::{DesiredSystem, SystemRecord};

/// One flushed attribute
pub struct Attribute {
    /// Field name in the data model
    pub field: &'static str,

    /// Flag name on the `cobbler system` command line
    pub flag: &'static str,

    /// Value emitted when the declaration leaves the attribute unset
    pub default: &'static str,

    /// Declared value rendered for the command line; `None` means unmanaged
    pub desired: fn(&DesiredSystem) -> Option<String>,

    /// Remote value rendered the same way
    pub actual: fn(&SystemRecord) -> String,
}

impl Attribute {
    /// Value passed to `--<flag>=` during a flush
    pub fn flush_value(&self, desired: &DesiredSystem) -> String {
        (self.desired)(desired).unwrap_or_else(|| self.default.to_string())
    }

    /// Whether a managed attribute differs from the remote value
    pub fn drifted(&self, desired: &DesiredSystem, actual: &SystemRecord) -> bool {
        (self.desired)(desired).is_some_and(|value| value != (self.actual)(actual))
    }
}

fn netboot_flag(enabled: bool) -> String {
    let flag = if enabled { "1" } else { "0" };
    flag.to_string()
}

pub const ATTRIBUTES: &[Attribute] = &[
    Attribute {
        field: "profile",
        flag: "profile",
        default: "",
        desired: |d| d.profile.clone(),
        actual: |r| r.profile.clone().unwrap_or_default(),
    },
    Attribute {
        field: "hostname",
        flag: "hostname",
        default: "",
        desired: |d| d.hostname.clone(),
        actual: |r| r.hostname.clone().unwrap_or_default(),
    },
    Attribute {
        field: "gateway",
        flag: "gateway",
        default: "",
        desired: |d| d.gateway.clone(),
        actual: |r| r.gateway.clone().unwrap_or_default(),
    },
    Attribute {
        field: "comment",
        flag: "comment",
        default: "",
        desired: |d| d.comment.clone(),
        actual: |r| r.comment.clone().unwrap_or_default(),
    },
    Attribute {
        field: "kickstart",
        flag: "kickstart",
        default: "",
        desired: |d| d.kickstart.clone(),
        actual: |r| r.kickstart.clone().unwrap_or_default(),
    },
    Attribute {
        field: "power_user",
        flag: "power-user",
        default: "",
        desired: |d| d.power_user.clone(),
        actual: |r| r.power_user.clone().unwrap_or_default(),
    },
    Attribute {
        field: "power_address",
        flag: "power-address",
        default: "",
        desired: |d| d.power_address.clone(),
        actual: |r| r.power_address.clone().unwrap_or_default(),
    },
    Attribute {
        field: "power_password",
        flag: "power-pass",
        default: "",
        desired: |d| d.power_password.clone(),
        actual: |r| r.power_password.clone().unwrap_or_default(),
    },
    Attribute {
        field: "power_id",
        flag: "power-id",
        default: "",
        desired: |d| d.power_id.clone(),
        actual: |r| r.power_id.clone().unwrap_or_default(),
    },
    Attribute {
        field: "power_type",
        flag: "power-type",
        default: "",
        desired: |d| d.power_type.clone(),
        actual: |r| r.power_type.clone().unwrap_or_default(),
    },
    Attribute {
        field: "netboot",
        flag: "netboot-enabled",
        default: "0",
        desired: |d| d.netboot.map(netboot_flag),
        actual: |r| netboot_flag(r.netboot),
    },
];
