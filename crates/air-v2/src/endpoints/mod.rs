//! v2 resources: model schemas, typed wrappers, request bodies and endpoints.

pub mod accounts;
pub mod announcements;
pub mod api_tokens;
pub mod cloud_inits;
pub mod fleets;
pub mod images;
pub mod interfaces;
pub mod jobs;
pub mod links;
pub mod node_instructions;
pub mod nodes;
pub mod organizations;
pub mod resource_budgets;
pub mod services;
pub mod simulations;
pub mod systems;
pub mod user_configs;
pub mod workers;

pub use accounts::{Account, AccountEndpoint};
pub use announcements::{Announcement, AnnouncementCreate, AnnouncementEndpoint};
pub use api_tokens::{ApiToken, ApiTokenCreate, ApiTokenEndpoint};
pub use cloud_inits::{CloudInit, CloudInitAssignment, CloudInitEndpoint};
pub use fleets::{Fleet, FleetCreate, FleetEndpoint, FleetUpdate, FleetWorker};
pub use images::{Image, ImageEndpoint};
pub use interfaces::{Interface, InterfaceCreate, InterfaceEndpoint, InterfaceUpdate};
pub use jobs::{Job, JobEndpoint};
pub use links::{Link, LinkEndpoint, LinkSpec};
pub use node_instructions::{
    Executor, NodeInstruction, NodeInstructionCreate, NodeInstructionEndpoint,
};
pub use nodes::{Node, NodeCreate, NodeEndpoint, NodeUpdate};
pub use organizations::{Organization, OrganizationEndpoint};
pub use resource_budgets::{ResourceBudget, ResourceBudgetEndpoint};
pub use services::{Service, ServiceCreate, ServiceEndpoint};
pub use simulations::{Simulation, SimulationCreate, SimulationEndpoint, SimulationUpdate};
pub use systems::{System, SystemEndpoint};
pub use user_configs::{UserConfig, UserConfigCreate, UserConfigEndpoint, UserConfigUpdate};
pub use workers::{Worker, WorkerEndpoint, WorkerInventory};
