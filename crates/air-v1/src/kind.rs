//! Resource variants known to the v1 API and their per-variant behaviour.

use air_core::Error;
use serde_json::{Map, Value};
use std::fmt;

/// Groups of create keys; a group is satisfied when any of its keys is present.
pub type KeyGroups = &'static [&'static [&'static str]];

const NAME_AND_ORGANIZATION: KeyGroups = &[&["name"], &["organization"]];
const LINK_KEYS: KeyGroups = &[&["topology"], &["interfaces"]];
const NODE_KEYS: KeyGroups = &[&["topology"], &["name"]];
const ORGANIZATION_KEYS: KeyGroups = &[&["name"], &["members"]];
const PERMISSION_KEYS: KeyGroups = &[&["email"]];
const SERVICE_KEYS: KeyGroups = &[&["name"], &["simulation"], &["interface"]];
const SIMULATION_KEYS: KeyGroups = &[&["topology"]];
const SSH_KEY_KEYS: KeyGroups = &[&["public_key"], &["name"]];
const API_TOKEN_KEYS: KeyGroups = &[&["name"]];
const TOPOLOGY_KEYS: KeyGroups = &[&["json", "dot"]];
const USER_CONFIG_KEYS: KeyGroups = &[&["name"], &["kind"], &["organization"], &["content"]];
const WORKER_KEYS: KeyGroups = &[
    &["cpu"],
    &["memory"],
    &["storage"],
    &["ip_address"],
    &["port_range"],
    &["username"],
    &["password"],
];

/// Concrete variant of a v1 entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// User account
    Account,
    /// API token
    ApiToken,
    /// Marketplace demo
    Demo,
    /// Worker fleet (served from the v2 prefix)
    Fleet,
    /// Disk image
    Image,
    /// Topology interface
    Interface,
    /// Background job
    Job,
    /// Topology link
    Link,
    /// Current login session
    Login,
    /// Topology node
    Node,
    /// Instruction queued for a simulation node
    NodeInstruction,
    /// Organization
    Organization,
    /// Simulation or topology permission
    Permission,
    /// Organization resource budget
    ResourceBudget,
    /// Forwarded service
    Service,
    /// Simulation
    Simulation,
    /// Interface of a running simulation
    SimulationInterface,
    /// Node of a running simulation
    SimulationNode,
    /// SSH public key
    SshKey,
    /// Topology
    Topology,
    /// Instruction attached to a topology node
    TopologyInstruction,
    /// User configuration (cloud-init)
    UserConfig,
    /// Simulation worker
    Worker,
}

impl ModelKind {
    /// Variant name as used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::ApiToken => "ApiToken",
            Self::Demo => "Demo",
            Self::Fleet => "Fleet",
            Self::Image => "Image",
            Self::Interface => "Interface",
            Self::Job => "Job",
            Self::Link => "Link",
            Self::Login => "Login",
            Self::Node => "Node",
            Self::NodeInstruction => "NodeInstruction",
            Self::Organization => "Organization",
            Self::Permission => "Permission",
            Self::ResourceBudget => "ResourceBudget",
            Self::Service => "Service",
            Self::Simulation => "Simulation",
            Self::SimulationInterface => "SimulationInterface",
            Self::SimulationNode => "SimulationNode",
            Self::SshKey => "SshKey",
            Self::Topology => "Topology",
            Self::TopologyInstruction => "TopologyInstruction",
            Self::UserConfig => "UserConfig",
            Self::Worker => "Worker",
        }
    }

    /// URL path segment of the variant's endpoint, if it has its own.
    #[must_use]
    pub const fn path(self) -> Option<&'static str> {
        match self {
            Self::Account => Some("account"),
            Self::ApiToken => Some("api-token"),
            Self::Demo => Some("demo"),
            Self::Fleet => Some("fleet"),
            Self::Image => Some("image"),
            Self::Interface => Some("interface"),
            Self::Job => Some("job"),
            Self::Link => Some("link"),
            Self::Login => Some("login"),
            Self::Node => Some("node"),
            Self::Organization => Some("organization"),
            Self::Permission => Some("permission"),
            Self::ResourceBudget => Some("resource-budget"),
            Self::Service => Some("service"),
            Self::Simulation => Some("simulation"),
            Self::SimulationInterface => Some("simulation-interface"),
            Self::SimulationNode => Some("simulation-node"),
            Self::SshKey => Some("sshkey"),
            Self::Topology => Some("topology"),
            Self::UserConfig => Some("userconfig"),
            Self::Worker => Some("worker"),
            Self::NodeInstruction | Self::TopologyInstruction => None,
        }
    }

    /// Whether entities of this variant accept `PATCH`/`PUT`.
    #[must_use]
    pub const fn updatable(self) -> bool {
        !matches!(
            self,
            Self::Account
                | Self::Demo
                | Self::Interface
                | Self::Login
                | Self::NodeInstruction
                | Self::TopologyInstruction
                | Self::Permission
                | Self::SshKey
                | Self::ApiToken
        )
    }

    /// Whether entities of this variant accept `DELETE`.
    #[must_use]
    pub const fn deletable(self) -> bool {
        !matches!(
            self,
            Self::Account
                | Self::Demo
                | Self::Interface
                | Self::Login
                | Self::NodeInstruction
                | Self::TopologyInstruction
                | Self::Job
                | Self::ResourceBudget
                | Self::Worker
                | Self::Simulation
                | Self::SimulationInterface
                | Self::SimulationNode
        )
    }

    /// Fields left out of full (`PUT`) updates.
    #[must_use]
    pub const fn ignored_update_fields(self) -> &'static [&'static str] {
        match self {
            Self::Topology => &["links", "nodes"],
            Self::Node => &["interfaces"],
            _ => &[],
        }
    }

    /// Keys a create payload must carry. Each group is satisfied by any one of its keys.
    #[must_use]
    pub const fn required_create_keys(self) -> Option<KeyGroups> {
        match self {
            Self::Fleet | Self::Image => Some(NAME_AND_ORGANIZATION),
            Self::Link => Some(LINK_KEYS),
            Self::Node => Some(NODE_KEYS),
            Self::Organization => Some(ORGANIZATION_KEYS),
            Self::Permission => Some(PERMISSION_KEYS),
            Self::Service => Some(SERVICE_KEYS),
            Self::Simulation => Some(SIMULATION_KEYS),
            Self::SshKey => Some(SSH_KEY_KEYS),
            Self::ApiToken => Some(API_TOKEN_KEYS),
            Self::Topology => Some(TOPOLOGY_KEYS),
            Self::UserConfig => Some(USER_CONFIG_KEYS),
            Self::Worker => Some(WORKER_KEYS),
            Self::Account
            | Self::Demo
            | Self::Interface
            | Self::Job
            | Self::Login
            | Self::NodeInstruction
            | Self::ResourceBudget
            | Self::SimulationInterface
            | Self::SimulationNode
            | Self::TopologyInstruction => None,
        }
    }

    /// Check that `payload` can be sent to this variant's create endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for variants without a create endpoint and
    /// [`Error::ModelAttribute`] naming the first missing key.
    pub fn check_create_payload(self, payload: &Map<String, Value>) -> Result<(), Error> {
        let groups = self.required_create_keys().ok_or_else(|| {
            Error::NotSupported(format!("{} does not support creation", self.name()))
        })?;
        for group in groups {
            let present = group
                .iter()
                .any(|key| payload.get(*key).is_some_and(|value| !value.is_null()));
            if !present {
                return Err(Error::ModelAttribute(format!(
                    "{}.create requires {}",
                    self.name(),
                    group.join(" or ")
                )));
            }
        }
        Ok(())
    }

    /// Target variant of a relational field, or `None` if the key holds plain data.
    ///
    /// Some keys resolve differently depending on the owning variant: `node` on an
    /// `Interface` is a topology node, while on a `SimulationInterface` it is a
    /// simulation node.
    #[must_use]
    pub fn reference_target(self, key: &str) -> Option<Self> {
        let target = match key {
            "account" => Self::Account,
            "base_simulation" | "simulation" => Self::Simulation,
            "bios" | "os" => Self::Image,
            "connection" => Self::Link,
            "demo" => Self::Demo,
            "interface" => Self::SimulationInterface,
            "job" => Self::Job,
            "last_worker" | "preferred_worker" | "worker" => Self::Worker,
            "nodes" => Self::SimulationNode,
            "organization" => Self::Organization,
            "services" => Self::Service,
            "topology" => Self::Topology,
            "fleet" => Self::Fleet,
            "interfaces" => match self {
                Self::Node | Self::Link => Self::Interface,
                Self::SimulationNode => Self::SimulationInterface,
                _ => return None,
            },
            "node" => match self {
                Self::Interface | Self::TopologyInstruction => Self::Node,
                Self::NodeInstruction | Self::SimulationInterface => Self::SimulationNode,
                _ => return None,
            },
            "original" => match self {
                Self::SimulationInterface => Self::Interface,
                Self::SimulationNode => Self::Node,
                _ => return None,
            },
            _ => return None,
        };
        Some(target)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shared_keys_resolve_per_variant() {
        assert_eq!(
            ModelKind::Interface.reference_target("node"),
            Some(ModelKind::Node)
        );
        assert_eq!(
            ModelKind::NodeInstruction.reference_target("node"),
            Some(ModelKind::SimulationNode)
        );
        assert_eq!(
            ModelKind::SimulationNode.reference_target("interfaces"),
            Some(ModelKind::SimulationInterface)
        );
        assert_eq!(
            ModelKind::SimulationInterface.reference_target("original"),
            Some(ModelKind::Interface)
        );
        assert_eq!(ModelKind::Simulation.reference_target("node"), None);
        assert_eq!(ModelKind::Simulation.reference_target("name"), None);
    }

    #[test]
    fn global_keys_resolve_for_every_variant() {
        assert_eq!(
            ModelKind::Worker.reference_target("fleet"),
            Some(ModelKind::Fleet)
        );
        assert_eq!(
            ModelKind::Node.reference_target("os"),
            Some(ModelKind::Image)
        );
    }

    #[test]
    fn capability_flags() {
        assert!(!ModelKind::Account.updatable());
        assert!(!ModelKind::Account.deletable());
        assert!(ModelKind::Job.updatable());
        assert!(!ModelKind::Job.deletable());
        assert!(!ModelKind::SshKey.updatable());
        assert!(ModelKind::SshKey.deletable());
        assert_eq!(
            ModelKind::Topology.ignored_update_fields(),
            &["links", "nodes"]
        );
    }

    #[test]
    fn create_requires_keys() {
        let payload = json!({"organization": "abc123"});
        let err = ModelKind::Image
            .check_create_payload(payload.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "Image.create requires name");

        let payload = json!({"name": "img", "organization": null});
        let err = ModelKind::Image
            .check_create_payload(payload.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "Image.create requires organization");
    }

    #[test]
    fn create_accepts_any_key_of_a_group() {
        let payload = json!({"dot": "graph {}"});
        assert!(ModelKind::Topology
            .check_create_payload(payload.as_object().unwrap())
            .is_ok());
        let err = ModelKind::Topology
            .check_create_payload(&Map::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Topology.create requires json or dot");
    }

    #[test]
    fn read_only_variants_cannot_be_created() {
        let err = ModelKind::Account
            .check_create_payload(&Map::new())
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_SUPPORTED");
    }
}
