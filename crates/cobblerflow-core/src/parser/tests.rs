use super::*;
use crate::model::{Ensure, SettingValue};

#[test]
fn test_parse_minimal_system() {
    let kdl = r#"
        system "web01"
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    assert_eq!(systems.len(), 1);

    let system = &systems[0];
    assert_eq!(system.name, "web01");
    assert_eq!(system.ensure, Ensure::Present);
    assert!(system.profile.is_none());
    assert!(system.netboot.is_none());
    assert!(system.kernel_options.is_none());
    assert!(system.interfaces.is_none());
}

#[test]
fn test_parse_full_system() {
    let kdl = r#"
        system "web01" {
            ensure "present"
            profile "centos7-x86_64"
            hostname "web01.example.com"
            gateway "10.0.0.1"
            comment "frontend"
            kickstart "/var/lib/cobbler/kickstarts/web.ks"
            power-user "admin"
            power-address "10.0.1.5"
            power-password "secret"
            power-id "1"
            power-type "ipmilan"
            netboot #true
        }
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    let system = &systems[0];
    assert_eq!(system.profile.as_deref(), Some("centos7-x86_64"));
    assert_eq!(system.hostname.as_deref(), Some("web01.example.com"));
    assert_eq!(system.gateway.as_deref(), Some("10.0.0.1"));
    assert_eq!(system.comment.as_deref(), Some("frontend"));
    assert_eq!(
        system.kickstart.as_deref(),
        Some("/var/lib/cobbler/kickstarts/web.ks")
    );
    assert_eq!(system.power_user.as_deref(), Some("admin"));
    assert_eq!(system.power_address.as_deref(), Some("10.0.1.5"));
    assert_eq!(system.power_password.as_deref(), Some("secret"));
    assert_eq!(system.power_id.as_deref(), Some("1"));
    assert_eq!(system.power_type.as_deref(), Some("ipmilan"));
    assert_eq!(system.netboot, Some(true));
}

#[test]
fn test_parse_netboot_variants() {
    let kdl = r#"
        system "a" { netboot "false"; }
        system "b" { netboot 1; }
        system "c" { netboot #false; }
        system "d" { netboot "yes"; }
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    let netboot: Vec<_> = systems.iter().map(|s| s.netboot).collect();
    assert_eq!(netboot, vec![Some(false), Some(true), Some(false), Some(true)]);
}

#[test]
fn test_parse_kernel_options_keeps_order() {
    let kdl = r#"
        system "web01" {
            kernel-options {
                quiet ""
                console "ttyS0"
            }
        }
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    let kopts = systems[0].kernel_options.as_ref().unwrap();
    let pairs: Vec<_> = kopts.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, vec![("quiet", ""), ("console", "ttyS0")]);
}

#[test]
fn test_parse_kernel_options_properties() {
    let kdl = r#"
        system "web01" {
            kopts console="ttyS0" nomodeset=""
        }
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    let kopts = systems[0].kernel_options.as_ref().unwrap();
    assert_eq!(kopts.get("console").map(String::as_str), Some("ttyS0"));
    assert_eq!(kopts.get("nomodeset").map(String::as_str), Some(""));
}

#[test]
fn test_parse_interfaces() {
    let kdl = r#"
        system "web01" {
            interface "eth0" {
                ip_address "10.0.0.5"
                mac_address "aa:bb:cc:dd:ee:ff"
                dns_name "web01.example.com" "web01"
                netmask #null
                static
            }
            interface "eth1" {
                ip_address "10.0.1.5"
            }
        }
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    let interfaces = systems[0].interfaces.as_ref().unwrap();
    let names: Vec<_> = interfaces.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["eth0", "eth1"]);

    let eth0 = &interfaces["eth0"];
    assert_eq!(eth0["ip_address"], SettingValue::from("10.0.0.5"));
    assert_eq!(
        eth0["dns_name"],
        SettingValue::List(vec!["web01.example.com".into(), "web01".into()])
    );
    assert_eq!(eth0["netmask"], SettingValue::Null);
    assert_eq!(eth0["static"], SettingValue::Null);
}

#[test]
fn test_parse_rejects_empty_interfaces_block() {
    let kdl = r#"
        system "web01" {
            interfaces {
            }
        }
    "#;

    match parse_kdl_string(kdl) {
        Err(FlowError::NoInterfaces(name)) => assert_eq!(name, "web01"),
        other => panic!("Expected NoInterfaces, got {:?}", other),
    }
}

#[test]
fn test_parse_rejects_interfaces_without_settings() {
    let kdl = r#"
        system "web01" {
            interface "eth0" {
            }
        }
    "#;

    assert!(matches!(
        parse_kdl_string(kdl),
        Err(FlowError::NoInterfaces(_))
    ));
}

#[test]
fn test_parse_absent_system() {
    let kdl = r#"
        system "old01" {
            ensure "absent"
        }
    "#;

    let systems = parse_kdl_string(kdl).unwrap();
    assert_eq!(systems[0].ensure, Ensure::Absent);
}

#[test]
fn test_invalid_ensure() {
    let kdl = r#"
        system "web01" {
            ensure "running"
        }
    "#;

    assert!(matches!(
        parse_kdl_string(kdl),
        Err(FlowError::InvalidConfig(_))
    ));
}

#[test]
fn test_reserved_interface_rejected() {
    let kdl = r#"
        system "web01" {
            interface "tmp_puppet" {
                static "true"
            }
        }
    "#;

    assert!(matches!(
        parse_kdl_string(kdl),
        Err(FlowError::ReservedInterface { .. })
    ));
}

#[test]
fn test_duplicate_system_rejected() {
    let kdl = r#"
        system "web01"
        system "web01"
    "#;

    match parse_kdl_string(kdl) {
        Err(FlowError::DuplicateSystem(name)) => assert_eq!(name, "web01"),
        other => panic!("Expected DuplicateSystem, got {:?}", other),
    }
}

#[test]
fn test_system_without_name() {
    let kdl = r#"
        system {
            profile "centos7"
        }
    "#;

    assert!(matches!(
        parse_kdl_string(kdl),
        Err(FlowError::InvalidConfig(_))
    ));
}

#[test]
fn test_parse_kdl_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("systems.kdl");
    std::fs::write(&path, "system \"web01\" { profile \"centos7\"; }\n").unwrap();

    let systems = parse_kdl_file(&path).unwrap();
    assert_eq!(systems.len(), 1);
    assert_eq!(systems[0].profile.as_deref(), Some("centos7"));
}

#[test]
fn test_parse_kdl_file_missing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let result = parse_kdl_file(temp_dir.path().join("missing.kdl"));
    assert!(matches!(result, Err(FlowError::IoError { .. })));
}
