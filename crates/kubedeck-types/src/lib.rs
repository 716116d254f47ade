//! Shared view models for kubedeck
//!
//! This crate contains the wire-format data structures exchanged between the
//! API gateway and the dashboard frontend. Everything serializes to the
//! camelCase JSON shapes the SPA consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Cluster & Resource Types
// ============================================================================

/// Cluster identity and version information
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInfo {
    /// Version details from the first node, if any node could be listed
    pub version: Option<ClusterVersion>,
    pub context: String,
    pub cluster: String,
}

/// Version strings reported by a node's kubelet
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersion {
    pub kubelet_version: String,
    pub kube_proxy_version: String,
    pub container_runtime_version: String,
}

/// Namespace information
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub name: String,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub labels: HashMap<String, String>,
}

impl NamespaceInfo {
    pub fn new(name: String, status: String) -> Self {
        Self {
            name,
            status,
            created_at: None,
            labels: HashMap::new(),
        }
    }
}

/// Pod information
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub status: PodStatus,
    pub node: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub containers: Vec<ContainerInfo>,
    pub labels: HashMap<String, String>,
    pub ip: Option<String>,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            status: PodStatus::Unknown,
            node: None,
            created_at: None,
            containers: Vec::new(),
            labels: HashMap::new(),
            ip: None,
        }
    }
}

/// Pod lifecycle phase, serialized with the upstream capitalization
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PodStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodStatus {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Per-container state within a pod
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub name: String,
    pub image: String,
    pub ready: bool,
    pub restart_count: i32,
}

impl ContainerInfo {
    pub fn new(name: String, image: String) -> Self {
        Self {
            name,
            image,
            ready: false,
            restart_count: 0,
        }
    }
}

/// Deployment information
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub labels: HashMap<String, String>,
    /// Image of the first template container, "N/A" when there is none
    pub image: String,
}

impl DeploymentInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            replicas: 0,
            ready_replicas: 0,
            available_replicas: 0,
            created_at: None,
            labels: HashMap::new(),
            image: "N/A".to_string(),
        }
    }
}

/// Service information
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub cluster_ip: Option<String>,
    pub ports: Vec<ServicePortInfo>,
    pub created_at: Option<DateTime<Utc>>,
    pub labels: HashMap<String, String>,
}

/// A single exposed service port
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortInfo {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<PortTarget>,
    pub node_port: Option<i32>,
    pub protocol: Option<String>,
}

/// Target of a service port: a container port number or a named port
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PortTarget {
    Number(i32),
    Name(String),
}

/// Node information
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    pub status: NodeStatus,
    pub role: NodeRole,
    pub created_at: Option<DateTime<Utc>>,
    pub labels: HashMap<String, String>,
    pub kubelet_version: String,
    pub os_image: String,
    pub architecture: String,
    /// Capacity quantities, kept as the raw strings the apiserver reports
    pub cpu: String,
    pub memory: String,
    pub pods: String,
}

/// Node readiness derived from the Ready condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NodeStatus {
    Ready,
    NotReady,
}

/// Node role derived from the node-role labels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Master,
    Worker,
}

// ============================================================================
// Metrics Summary
// ============================================================================

/// Aggregate cluster counts for the dashboard overview page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub pods: PodCounts,
    pub nodes: NodeCounts,
    pub deployments: DeploymentCounts,
    pub services: ServiceCounts,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PodCounts {
    pub total: usize,
    pub running: usize,
    pub pending: usize,
    pub failed: usize,
    pub succeeded: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub total: usize,
    pub ready: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentCounts {
    pub total: usize,
    pub available: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServiceCounts {
    pub total: usize,
}

// ============================================================================
// Streaming Frames
// ============================================================================

/// Live pod/node counts pushed over the updates websocket
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCounts {
    pub pods: usize,
    pub nodes: usize,
    pub timestamp: DateTime<Utc>,
}

/// A frame pushed to a websocket client
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamFrame {
    /// Periodic cluster counts
    Update { data: ClusterCounts },
    /// One parsed log line from a follow stream
    Log { data: LogEntry },
    /// Upstream or connection-level failure
    Error { error: String },
}

impl StreamFrame {
    pub fn update(data: ClusterCounts) -> Self {
        Self::Update { data }
    }

    pub fn log(data: LogEntry) -> Self {
        Self::Log { data }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }
}

// ============================================================================
// Mutation Requests
// ============================================================================

/// Body of POST /api/namespaces
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateNamespaceRequest {
    pub name: String,
    #[serde(default)]
    pub labels: Option<HashMap<String, String>>,
}

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    Unknown,
}

impl LogLevel {
    /// Parse log level from common formats
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" | "trc" | "trce" => Self::Trace,
            "debug" | "dbg" | "debg" => Self::Debug,
            "info" | "inf" | "information" => Self::Info,
            "warn" | "warning" | "wrn" => Self::Warn,
            "error" | "err" | "erro" => Self::Error,
            "fatal" | "panic" | "critical" | "crit" | "ftl" => Self::Fatal,
            _ => Self::Unknown,
        }
    }

    /// Ordinal for minimum-severity comparisons; unknown sorts with info
    pub fn rank(&self) -> u8 {
        match self {
            Self::Trace => 0,
            Self::Debug => 1,
            Self::Info => 2,
            Self::Warn => 3,
            Self::Error => 4,
            Self::Fatal => 5,
            Self::Unknown => 2,
        }
    }
}

/// A single parsed log line
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Source pod name
    pub pod_name: String,

    /// Container name, when one was selected
    pub container: Option<String>,

    /// Line number within the pod's log stream
    pub line_number: u64,

    /// Original raw log line (timestamp prefix stripped)
    pub raw: String,

    /// Parsed timestamp, if the line carried one
    pub timestamp: Option<DateTime<Utc>>,

    /// Detected log level
    pub level: LogLevel,

    /// Message content: a common JSON message field, or the raw line
    pub message: String,
}

impl LogEntry {
    /// Create a new log entry with minimal fields
    pub fn new(pod_name: String, line_number: u64, raw: String) -> Self {
        Self {
            pod_name,
            container: None,
            line_number,
            message: raw.clone(),
            raw,
            timestamp: None,
            level: LogLevel::Unknown,
        }
    }
}
