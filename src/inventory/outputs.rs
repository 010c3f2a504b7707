// Inventory from individual Terraform outputs
//
// Used when there is no `ansible_inventory` output. Hosts get synthetic
// ordinal names (`web-1`, `web-2`, ...) so the order Terraform reports
// addresses in is part of the contract.

use serde_json::{json, Value};
use tracing::debug;

use super::{GroupKind, HostGroup, HostVars, Inventory, DEFAULT_ANSIBLE_USER, PROJECT_NAME};
use crate::terraform::Snapshot;

pub const WEB_IPS_OUTPUT: &str = "web_instance_public_ips";
pub const APP_IPS_OUTPUT: &str = "app_instance_private_ips";
pub const DATABASE_ENDPOINT_OUTPUT: &str = "database_endpoint";
pub const DATABASE_ENGINE_OUTPUT: &str = "database_engine";
pub const DATABASE_PORT_OUTPUT: &str = "database_port";
pub const INFRASTRUCTURE_INFO_OUTPUT: &str = "infrastructure_info";

/// Host name of the single database entry
pub const DATABASE_HOST: &str = "database";

const DEFAULT_DB_ENGINE: &str = "postgres";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_ENVIRONMENT: &str = "unknown";
const DEFAULT_AWS_REGION: &str = "us-west-2";

pub(super) fn build(snapshot: &Snapshot) -> Inventory {
    let mut inventory = Inventory::new();

    add_instances(&mut inventory, snapshot, WEB_IPS_OUTPUT, GroupKind::Webservers, "web");
    add_instances(&mut inventory, snapshot, APP_IPS_OUTPUT, GroupKind::Appservers, "app");
    add_database(&mut inventory, snapshot);

    let all = HostGroup::new()
        .with_var(
            "environment",
            snapshot.value_or(INFRASTRUCTURE_INFO_OUTPUT, &["environment"], json!(DEFAULT_ENVIRONMENT)),
        )
        .with_var("project_name", PROJECT_NAME)
        .with_var(
            "aws_region",
            snapshot.value_or(INFRASTRUCTURE_INFO_OUTPUT, &["region"], json!(DEFAULT_AWS_REGION)),
        );
    inventory.add_group(GroupKind::All, all);

    inventory
}

/// One `<prefix>-<n>` host per address, numbered from 1
fn add_instances(
    inventory: &mut Inventory,
    snapshot: &Snapshot,
    output: &str,
    kind: GroupKind,
    prefix: &str,
) {
    let addresses = match snapshot.value(output).and_then(Value::as_array) {
        Some(addresses) if !addresses.is_empty() => addresses,
        _ => return,
    };

    let mut hosts = Vec::with_capacity(addresses.len());
    for (i, address) in addresses.iter().enumerate() {
        let host = format!("{}-{}", prefix, i + 1);

        let mut vars = HostVars::new();
        vars.insert("ansible_host".to_string(), address.clone());
        vars.insert("ansible_user".to_string(), json!(DEFAULT_ANSIBLE_USER));
        inventory.add_host_vars(host.clone(), vars);

        hosts.push(host);
    }

    debug!(group = %kind, hosts = hosts.len(), "group from '{}'", output);

    let mut group = HostGroup::new()
        .with_hosts(hosts)
        .with_var("ansible_user", DEFAULT_ANSIBLE_USER);
    if let Some(server_type) = kind.server_type() {
        group = group.with_var("server_type", server_type);
    }
    inventory.add_group(kind, group);
}

/// `host:port` endpoint becomes the single `database` host
fn add_database(inventory: &mut Inventory, snapshot: &Snapshot) {
    let Some(endpoint) = snapshot
        .value(DATABASE_ENDPOINT_OUTPUT)
        .and_then(Value::as_str)
        .filter(|endpoint| !endpoint.is_empty())
    else {
        return;
    };

    let address = endpoint
        .split_once(':')
        .map_or(endpoint, |(address, _)| address);

    let mut vars = HostVars::new();
    vars.insert("ansible_host".to_string(), json!(address));
    vars.insert(
        "db_engine".to_string(),
        snapshot.value_or(DATABASE_ENGINE_OUTPUT, &[], json!(DEFAULT_DB_ENGINE)),
    );
    vars.insert(
        "db_port".to_string(),
        snapshot.value_or(DATABASE_PORT_OUTPUT, &[], json!(DEFAULT_DB_PORT)),
    );
    inventory.add_host_vars(DATABASE_HOST, vars);

    inventory.add_group(
        GroupKind::Databases,
        HostGroup::new()
            .with_hosts(vec![DATABASE_HOST.to_string()])
            .with_var("server_type", "database"),
    );
}
