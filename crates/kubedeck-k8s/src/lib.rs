//! Kubernetes client for kubedeck
//!
//! This crate wraps a single long-lived [`kube::Client`] and exposes the
//! list/get/delete/create operations the dashboard needs, projecting the
//! upstream objects into the flat view models in `kubedeck-types`.

mod client;
mod convert;

pub use client::KubeClient;
pub use convert::summarize;

// Re-export types that are used in our public API
pub use kubedeck_types::{
    ClusterCounts, ClusterInfo, ClusterVersion, ContainerInfo, CreateNamespaceRequest,
    DeploymentInfo, MetricsSummary, NamespaceInfo, NodeInfo, PodInfo, PodStatus, ServiceInfo,
};
