// Ansible inventory built from Terraform outputs

mod outputs;
mod prebuilt;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::terraform::Snapshot;

/// Output that already carries an inventory-shaped document
pub const PREBUILT_OUTPUT: &str = "ansible_inventory";

/// Login user given to every provisioned instance
pub const DEFAULT_ANSIBLE_USER: &str = "ubuntu";

/// SSH key used for web and app groups built from the pre-built output
pub const DEFAULT_SSH_KEY_FILE: &str = "~/.ssh/id_rsa";

/// Project identifier placed in `all.vars` by the flat-output path
pub const PROJECT_NAME: &str = "iac-solution";

/// Per-host variables as they appear under `_meta.hostvars`
pub type HostVars = Map<String, Value>;

/// The fixed group vocabulary, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKind {
    Webservers,
    Appservers,
    Databases,
    All,
}

impl GroupKind {
    /// Groups that hold hosts (everything but `all`)
    pub const CHILDREN: [GroupKind; 3] = [
        GroupKind::Webservers,
        GroupKind::Appservers,
        GroupKind::Databases,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Webservers => "webservers",
            GroupKind::Appservers => "appservers",
            GroupKind::Databases => "databases",
            GroupKind::All => "all",
        }
    }

    /// The `server_type` tag for member hosts
    pub fn server_type(&self) -> Option<&'static str> {
        match self {
            GroupKind::Webservers => Some("webserver"),
            GroupKind::Appservers => Some("appserver"),
            GroupKind::Databases => Some("database"),
            GroupKind::All => None,
        }
    }

    /// Whether members are reached as the default login user
    pub fn has_login_user(&self) -> bool {
        matches!(self, GroupKind::Webservers | GroupKind::Appservers)
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A group of hosts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HostGroup {
    pub hosts: Vec<String>,
    pub vars: Map<String, Value>,
}

impl HostGroup {
    pub fn new() -> Self {
        HostGroup::default()
    }

    pub fn with_hosts(mut self, hosts: Vec<String>) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_vars(mut self, vars: Map<String, Value>) -> Self {
        self.vars.extend(vars);
        self
    }
}

/// The complete inventory document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    groups: BTreeMap<GroupKind, HostGroup>,
    hostvars: BTreeMap<String, HostVars>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory::default()
    }

    /// The document served when Terraform produced nothing
    pub fn empty() -> Self {
        let mut inv = Inventory::new();
        inv.add_group(GroupKind::All, HostGroup::new());
        inv
    }

    /// Build the inventory for a snapshot.
    ///
    /// The pre-built output wins whenever it is present; the flat outputs
    /// are only consulted without it.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        if snapshot.is_empty() {
            Inventory::empty()
        } else if snapshot.contains(PREBUILT_OUTPUT) {
            prebuilt::build(snapshot.value(PREBUILT_OUTPUT))
        } else {
            outputs::build(snapshot)
        }
    }

    /// Add or replace a group.
    ///
    /// Member hosts without variables get an empty hostvars entry so
    /// every listed host resolves through `_meta`.
    pub fn add_group(&mut self, kind: GroupKind, group: HostGroup) {
        for host in &group.hosts {
            self.hostvars.entry(host.clone()).or_default();
        }
        self.groups.insert(kind, group);
    }

    /// Set the variables of a host, replacing any previous entry
    pub fn add_host_vars(&mut self, host: impl Into<String>, vars: HostVars) {
        self.hostvars.insert(host.into(), vars);
    }

    pub fn group(&self, kind: GroupKind) -> Option<&HostGroup> {
        self.groups.get(&kind)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupKind, &HostGroup)> {
        self.groups.iter().map(|(kind, group)| (*kind, group))
    }

    pub fn host_vars(&self, host: &str) -> Option<&HostVars> {
        self.hostvars.get(host)
    }

    /// Variables for `--host`; unknown hosts get an empty mapping
    pub fn host(&self, host: &str) -> HostVars {
        self.host_vars(host).cloned().unwrap_or_default()
    }

    /// Get the total number of hosts
    pub fn host_count(&self) -> usize {
        self.hostvars.len()
    }
}

struct Meta<'a> {
    hostvars: &'a BTreeMap<String, HostVars>,
}

impl Serialize for Meta<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("hostvars", self.hostvars)?;
        map.end()
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        for (kind, group) in &self.groups {
            map.serialize_entry(kind.as_str(), group)?;
        }
        map.serialize_entry(
            "_meta",
            &Meta {
                hostvars: &self.hostvars,
            },
        )?;
        map.end()
    }
}
