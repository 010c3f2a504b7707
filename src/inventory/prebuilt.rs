// Inventory from the `ansible_inventory` output
//
// Expected shape (possibly JSON-encoded as a string):
//
//   { "all": { "children": { "<group>": { "hosts": { "<host>": {vars} } } },
//              "vars": {...} } }

use std::borrow::Cow;

use serde_json::Value;
use tracing::{debug, warn};

use super::{
    GroupKind, HostGroup, HostVars, Inventory, DEFAULT_ANSIBLE_USER, DEFAULT_SSH_KEY_FILE,
    PREBUILT_OUTPUT,
};
use crate::terraform::lookup;

/// Build from the output's `value`; `None` yields an inventory without groups
pub(super) fn build(value: Option<&Value>) -> Inventory {
    let mut inventory = Inventory::new();

    let Some(data) = value.and_then(decode) else {
        return inventory;
    };

    if let Some(children) = lookup(&data, &["all", "children"]) {
        for kind in GroupKind::CHILDREN {
            let Some(hosts) = lookup(children, &[kind.as_str(), "hosts"]).and_then(Value::as_object)
            else {
                continue;
            };

            for (host, vars) in hosts {
                inventory.add_host_vars(host.clone(), host_vars(vars));
            }

            debug!(group = %kind, hosts = hosts.len(), "group from {}", PREBUILT_OUTPUT);
            inventory.add_group(
                kind,
                group_defaults(kind).with_hosts(hosts.keys().cloned().collect()),
            );
        }
    }

    if let Some(vars) = lookup(&data, &["all", "vars"]).and_then(Value::as_object) {
        inventory.add_group(GroupKind::All, HostGroup::new().with_vars(vars.clone()));
    }

    inventory
}

/// Terraform often hands the document over as `jsonencode(...)` output
fn decode(value: &Value) -> Option<Cow<'_, Value>> {
    match value {
        Value::String(encoded) => match serde_json::from_str(encoded) {
            Ok(decoded) => Some(Cow::Owned(decoded)),
            Err(e) => {
                warn!("Ignoring '{}' output: invalid JSON string: {}", PREBUILT_OUTPUT, e);
                None
            }
        },
        other => Some(Cow::Borrowed(other)),
    }
}

fn host_vars(vars: &Value) -> HostVars {
    vars.as_object().cloned().unwrap_or_default()
}

fn group_defaults(kind: GroupKind) -> HostGroup {
    let mut group = HostGroup::new();
    if kind.has_login_user() {
        group = group
            .with_var("ansible_user", DEFAULT_ANSIBLE_USER)
            .with_var("ansible_ssh_private_key_file", DEFAULT_SSH_KEY_FILE);
    }
    if let Some(server_type) = kind.server_type() {
        group = group.with_var("server_type", server_type);
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "all": {
                "children": {
                    "webservers": {"hosts": {
                        "web-a": {"ansible_host": "54.1.1.1", "private_ip": "10.0.1.10"},
                        "web-b": {"ansible_host": "54.1.1.2", "private_ip": "10.0.1.11"}
                    }},
                    "appservers": {"hosts": {
                        "app-a": {"ansible_host": "10.0.2.10"}
                    }},
                    "databases": {"hosts": {
                        "db": {"ansible_host": "db.internal", "db_port": 5432}
                    }},
                    "monitoring": {"hosts": {"grafana": {}}}
                },
                "vars": {"environment": "prod", "aws_region": "eu-central-1"}
            }
        })
    }

    #[test]
    fn test_build_full_document() {
        let inventory = build(Some(&sample()));

        assert_eq!(
            serde_json::to_value(&inventory).unwrap(),
            json!({
                "webservers": {
                    "hosts": ["web-a", "web-b"],
                    "vars": {
                        "ansible_user": "ubuntu",
                        "ansible_ssh_private_key_file": "~/.ssh/id_rsa",
                        "server_type": "webserver"
                    }
                },
                "appservers": {
                    "hosts": ["app-a"],
                    "vars": {
                        "ansible_user": "ubuntu",
                        "ansible_ssh_private_key_file": "~/.ssh/id_rsa",
                        "server_type": "appserver"
                    }
                },
                "databases": {
                    "hosts": ["db"],
                    "vars": {"server_type": "database"}
                },
                "all": {
                    "hosts": [],
                    "vars": {"environment": "prod", "aws_region": "eu-central-1"}
                },
                "_meta": {"hostvars": {
                    "web-a": {"ansible_host": "54.1.1.1", "private_ip": "10.0.1.10"},
                    "web-b": {"ansible_host": "54.1.1.2", "private_ip": "10.0.1.11"},
                    "app-a": {"ansible_host": "10.0.2.10"},
                    "db": {"ansible_host": "db.internal", "db_port": 5432}
                }}
            })
        );
    }

    #[test]
    fn test_unknown_groups_are_ignored() {
        let inventory = build(Some(&sample()));
        assert!(inventory.host_vars("grafana").is_none());
    }

    #[test]
    fn test_every_listed_host_has_hostvars() {
        let inventory = build(Some(&json!({
            "all": {"children": {
                "webservers": {"hosts": {"w1": null, "w2": {"ansible_host": "1.1.1.1"}}},
                "databases": {"hosts": {"d1": "not-a-mapping"}}
            }}
        })));

        for (_, group) in inventory.groups() {
            for host in &group.hosts {
                assert!(inventory.host_vars(host).is_some(), "{} missing", host);
            }
        }
        assert_eq!(inventory.host_vars("w1"), Some(&HostVars::new()));
        assert_eq!(inventory.host_vars("d1"), Some(&HostVars::new()));
    }

    #[test]
    fn test_host_order_follows_terraform() {
        let inventory = build(Some(&json!({
            "all": {"children": {"appservers": {"hosts": {
                "zulu": {}, "alpha": {}, "mike": {}
            }}}}
        })));

        assert_eq!(
            inventory.group(GroupKind::Appservers).unwrap().hosts,
            vec!["zulu", "alpha", "mike"]
        );
    }

    #[test]
    fn test_json_encoded_string() {
        let encoded = Value::String(sample().to_string());
        let inventory = build(Some(&encoded));

        assert_eq!(inventory, build(Some(&sample())));
        assert_eq!(inventory.host_count(), 4);
    }

    #[test]
    fn test_invalid_json_string_produces_no_groups() {
        let inventory = build(Some(&json!("{not json")));
        assert_eq!(inventory, Inventory::new());
    }

    #[test]
    fn test_missing_children_and_hosts() {
        assert_eq!(build(None), Inventory::new());
        assert_eq!(build(Some(&json!({"all": {}}))), Inventory::new());

        let inventory = build(Some(&json!({
            "all": {"children": {"webservers": {}, "databases": {"hosts": null}}}
        })));
        assert!(inventory.group(GroupKind::Webservers).is_none());
        assert!(inventory.group(GroupKind::Databases).is_none());
    }

    #[test]
    fn test_all_vars_without_children() {
        let inventory = build(Some(&json!({"all": {"vars": {"environment": "dev"}}})));

        assert_eq!(
            inventory.group(GroupKind::All).unwrap().vars["environment"],
            json!("dev")
        );
    }
}
