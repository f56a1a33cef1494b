//! Model builders for keel
//!
//! Translates a cluster manifest into a graph of infrastructure tasks that
//! an external executor reconciles against the cloud.
//!
//! # Modules
//!
//! - [`task`] - Task descriptors (load balancers, security groups, rules, ...)
//! - [`link`] - Named references between tasks
//! - [`graph`] - The shared, insertion-ordered task collection
//! - [`context`] - Cluster view and deterministic naming helpers
//! - [`selector`] - One-subnet-per-zone selection for load balancers
//! - [`builders`] - The builders themselves

#![deny(missing_docs)]

pub mod builders;
pub mod context;
pub mod graph;
pub mod link;
pub mod selector;
pub mod task;

pub use builders::{build_task_graph, default_builders, ApiLoadBalancerBuilder, ModelBuilder};
pub use context::ModelContext;
pub use graph::TaskGraph;
pub use link::{Link, TaskKey};
pub use selector::{ScoredSubnet, SubnetSelector};
pub use task::{Task, TaskKind};
