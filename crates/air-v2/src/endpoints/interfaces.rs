//! Node interfaces.

use crate::encoder::Reference;
use crate::endpoints::links::Link;
use crate::endpoints::nodes::Node;
use crate::endpoints::simulations::Simulation;
use crate::entity::Entity;
use crate::mixins::{CreateApi, DeleteApi, GetApi, ListApi, PatchApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::value::FieldValue;
use crate::Result;
use serde::Serialize;
use validator::Validate;

const OPTIONAL_STR: FieldKind = FieldKind::Optional(&FieldKind::Str);

static INTERFACE: ModelSchema = ModelSchema {
    name: "Interface",
    path: "simulations/nodes/interfaces",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new("link_up", FieldKind::Bool),
        FieldSpec::new("internal_ipv4", OPTIONAL_STR),
        FieldSpec::new("full_ipv6", OPTIONAL_STR),
        FieldSpec::new("prefix_ipv6", OPTIONAL_STR),
        FieldSpec::new("interface_type", OPTIONAL_STR),
        FieldSpec::new("port_number", FieldKind::Int),
        FieldSpec::new("preserve_mac", FieldKind::Bool),
        FieldSpec::new("outbound", FieldKind::Bool),
        FieldSpec::new("mac_address", OPTIONAL_STR),
        FieldSpec::new("node", FieldKind::Model(Node::schema)).foreign_key(),
        FieldSpec::new("simulation", FieldKind::Model(Simulation::schema)).foreign_key(),
        FieldSpec::new("link", FieldKind::Optional(&FieldKind::Model(Link::schema))).foreign_key(),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: Some(scope_link),
    supports: &[Capability::Patch, Capability::Delete],
};

/// Links are only reachable through their simulation, so a linked interface hands its
/// simulation down to the link.
fn scope_link(entity: &mut Entity) {
    let simulation = entity
        .field_mut("simulation")
        .and_then(|value| value.as_model())
        .and_then(Entity::pk);
    if let (Some(simulation), Some(FieldValue::Model(link))) =
        (simulation, entity.field_mut("link"))
    {
        link.set_scope(simulation);
    }
}

air_model!(
    /// A network interface of a node.
    Interface,
    &INTERFACE
);

air_endpoint!(
    /// Interfaces endpoint.
    InterfaceEndpoint,
    Interface
);

/// Body of [`InterfaceEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct InterfaceCreate {
    /// Interface name, e.g. `swp1`
    #[validate(length(min = 1))]
    pub name: String,
    /// Owning node
    pub node: Reference,
    /// Interface type
    pub interface_type: String,
    /// Administrative link state
    pub link_up: bool,
    /// Port number on the node
    pub port_number: i64,
    /// Whether the interface connects outside the simulation
    pub outbound: bool,
    /// Keep the MAC address across rebuilds
    pub preserve_mac: bool,
    /// MAC address
    pub mac_address: Option<String>,
    /// Internal IPv4 address
    pub internal_ipv4: Option<String>,
    /// Full IPv6 address
    pub full_ipv6: Option<String>,
    /// IPv6 prefix
    pub prefix_ipv6: Option<String>,
    /// Link to attach to
    pub link: Option<Reference>,
}

impl InterfaceCreate {
    /// Request for an Ethernet interface `name` on `node`.
    pub fn new(name: impl Into<String>, node: impl Into<Reference>) -> Self {
        Self {
            name: name.into(),
            node: node.into(),
            interface_type: "ETH_INTF".to_string(),
            link_up: false,
            port_number: 0,
            outbound: false,
            preserve_mac: false,
            mac_address: None,
            internal_ipv4: None,
            full_ipv6: None,
            prefix_ipv6: None,
            link: None,
        }
    }
}

/// Body of [`Interface::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct InterfaceUpdate {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// Port number on the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_number: Option<i64>,
    /// Whether the interface connects outside the simulation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbound: Option<bool>,
    /// Keep the MAC address across rebuilds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_mac: Option<bool>,
    /// Administrative link state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_up: Option<bool>,
    /// Link to attach to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Reference>,
}

impl Interface {
    /// Partially update the interface.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `update` is invalid,
    /// or any request error.
    pub async fn update(&mut self, update: &InterfaceUpdate) -> Result<()> {
        self.entity_mut().update_from(update).await
    }
}

impl ListApi for InterfaceEndpoint {}

impl CreateApi for InterfaceEndpoint {
    type Request = InterfaceCreate;
}

impl GetApi for InterfaceEndpoint {}

impl PatchApi for InterfaceEndpoint {}

impl DeleteApi for InterfaceEndpoint {}
