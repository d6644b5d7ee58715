//! Ingress CIDR synchronization engine.
//!
//! Keeps the access-list annotations consumed by an nginx-style ingress proxy
//! in sync with the CIDRs declared by `NetworkPolicy` objects. An `Ingress`
//! names the policies it draws from (and, optionally, extra literal entries)
//! through input annotations; this crate aggregates the referenced CIDRs into
//! canonical allow/deny output annotations:
//!
//! ```text
//! [ NetworkPolicy ] <- refs -- [ Ingress inputs ] -> [ proxy output slots ]
//! ```
//!
//! Two entry points drive the engine: one per changed `Ingress` (resync that
//! object) and one per changed `NetworkPolicy` (resync every `Ingress` that
//! references it). The policy-triggered path scans the full `Ingress` list on
//! every event, which bounds this design to modestly sized clusters.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cluster_info;
mod network_policy;
mod reconcile;
pub mod store;
pub mod validation;


pub use self::{
    cluster_info::ClusterInfo,
    reconcile::{Error, Outcome, Reconciler},
    store::{ClusterStore, Store},
};
pub use k8s_openapi::api::networking::v1::{Ingress, NetworkPolicy};
pub use kube::api::{ObjectMeta, ResourceExt};
