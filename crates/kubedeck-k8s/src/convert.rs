//! Projections from upstream Kubernetes objects into dashboard view models
//!
//! Every function here is total: missing upstream fields fall back to
//! defaults instead of failing the request.

use std::collections::{BTreeMap, HashMap};

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service, ServicePort};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use kubedeck_types::{
    ClusterVersion, ContainerInfo, DeploymentCounts, DeploymentInfo, MetricsSummary,
    NamespaceInfo, NodeCounts, NodeInfo, NodeRole, NodeStatus, PodCounts, PodInfo, PodStatus,
    PortTarget, ServiceCounts, ServiceInfo, ServicePortInfo,
};

/// Convert a k8s Namespace to NamespaceInfo
pub fn namespace_to_info(ns: Namespace) -> NamespaceInfo {
    let status = ns
        .status
        .and_then(|s| s.phase)
        .unwrap_or_else(|| "Unknown".to_string());
    let mut info = NamespaceInfo::new(ns.metadata.name.unwrap_or_default(), status);
    info.created_at = ns.metadata.creation_timestamp.map(|t| t.0);
    if let Some(labels) = ns.metadata.labels {
        info.labels = labels.into_iter().collect();
    }
    info
}

/// Convert a k8s Pod to PodInfo
pub fn pod_to_info(pod: Pod) -> PodInfo {
    let name = pod.metadata.name.unwrap_or_default();
    let namespace = pod.metadata.namespace.unwrap_or_default();
    let mut info = PodInfo::new(name, namespace);
    info.created_at = pod.metadata.creation_timestamp.map(|t| t.0);
    if let Some(labels) = pod.metadata.labels {
        info.labels = labels.into_iter().collect();
    }

    let mut container_statuses = Vec::new();
    if let Some(status) = pod.status {
        info.status = status
            .phase
            .as_deref()
            .map(PodStatus::from)
            .unwrap_or(PodStatus::Unknown);
        info.ip = status.pod_ip;
        container_statuses = status.container_statuses.unwrap_or_default();
    }

    if let Some(spec) = pod.spec {
        info.node = spec.node_name;
        // Containers come from the pod spec; readiness and restarts are joined
        // in from containerStatuses by name, defaulting when no status exists
        info.containers = spec
            .containers
            .into_iter()
            .map(|c| {
                let status = container_statuses.iter().find(|cs| cs.name == c.name);
                ContainerInfo {
                    ready: status.map(|cs| cs.ready).unwrap_or(false),
                    restart_count: status.map(|cs| cs.restart_count).unwrap_or(0),
                    name: c.name,
                    image: c.image.unwrap_or_default(),
                }
            })
            .collect();
    }

    info
}

/// Convert a k8s Deployment to DeploymentInfo
pub fn deployment_to_info(deploy: Deployment) -> DeploymentInfo {
    let name = deploy.metadata.name.unwrap_or_default();
    let namespace = deploy.metadata.namespace.unwrap_or_default();
    let mut info = DeploymentInfo::new(name, namespace);
    info.created_at = deploy.metadata.creation_timestamp.map(|t| t.0);
    if let Some(labels) = deploy.metadata.labels {
        info.labels = labels.into_iter().collect();
    }

    if let Some(spec) = deploy.spec {
        info.replicas = spec.replicas.unwrap_or(0);
        if let Some(image) = spec
            .template
            .spec
            .and_then(|s| s.containers.into_iter().next())
            .and_then(|c| c.image)
        {
            info.image = image;
        }
    }

    if let Some(status) = deploy.status {
        info.ready_replicas = status.ready_replicas.unwrap_or(0);
        info.available_replicas = status.available_replicas.unwrap_or(0);
    }

    info
}

/// Convert a k8s Service to ServiceInfo
pub fn service_to_info(svc: Service) -> ServiceInfo {
    let metadata = svc.metadata;
    let spec = svc.spec.unwrap_or_default();
    ServiceInfo {
        name: metadata.name.unwrap_or_default(),
        namespace: metadata.namespace.unwrap_or_default(),
        service_type: spec.type_.unwrap_or_default(),
        cluster_ip: spec.cluster_ip,
        ports: spec
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(port_to_info)
            .collect(),
        created_at: metadata.creation_timestamp.map(|t| t.0),
        labels: metadata.labels.unwrap_or_default().into_iter().collect(),
    }
}

fn port_to_info(port: ServicePort) -> ServicePortInfo {
    ServicePortInfo {
        name: port.name,
        port: port.port,
        target_port: port.target_port.map(|t| match t {
            IntOrString::Int(n) => PortTarget::Number(n),
            IntOrString::String(s) => PortTarget::Name(s),
        }),
        node_port: port.node_port,
        protocol: port.protocol,
    }
}

/// Convert a k8s Node to NodeInfo
pub fn node_to_info(node: Node) -> NodeInfo {
    let ready = node_is_ready(&node);
    let metadata = node.metadata;
    let labels: HashMap<String, String> = metadata.labels.unwrap_or_default().into_iter().collect();
    let role = if labels.contains_key("node-role.kubernetes.io/master")
        || labels.contains_key("node-role.kubernetes.io/control-plane")
    {
        NodeRole::Master
    } else {
        NodeRole::Worker
    };

    let status = node.status.unwrap_or_default();
    let node_info = status.node_info.unwrap_or_default();
    let capacity = status.capacity.unwrap_or_default();

    NodeInfo {
        name: metadata.name.unwrap_or_default(),
        status: if ready {
            NodeStatus::Ready
        } else {
            NodeStatus::NotReady
        },
        role,
        created_at: metadata.creation_timestamp.map(|t| t.0),
        labels,
        kubelet_version: node_info.kubelet_version,
        os_image: node_info.os_image,
        architecture: node_info.architecture,
        cpu: quantity_or_zero(&capacity, "cpu"),
        memory: quantity_or_zero(&capacity, "memory"),
        pods: quantity_or_zero(&capacity, "pods"),
    }
}

fn quantity_or_zero(capacity: &BTreeMap<String, Quantity>, key: &str) -> String {
    capacity
        .get(key)
        .map(|q| q.0.clone())
        .unwrap_or_else(|| "0".to_string())
}

/// Node readiness as reported by the Ready condition
pub(crate) fn node_is_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conds| conds.iter().any(|c| c.type_ == "Ready" && c.status == "True"))
        .unwrap_or(false)
}

/// Kubelet version strings from a node, for the cluster-info endpoint
pub(crate) fn node_version(node: &Node) -> ClusterVersion {
    let info = node.status.as_ref().and_then(|s| s.node_info.as_ref());
    ClusterVersion {
        kubelet_version: version_field(info.map(|i| i.kubelet_version.as_str())),
        kube_proxy_version: version_field(info.map(|i| i.kube_proxy_version.as_str())),
        container_runtime_version: version_field(
            info.map(|i| i.container_runtime_version.as_str()),
        ),
    }
}

fn version_field(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "unknown".to_string(),
    }
}

/// Reduce freshly listed cluster objects into the dashboard summary
pub fn summarize(
    pods: &[Pod],
    nodes: &[Node],
    deployments: &[Deployment],
    services: &[Service],
) -> MetricsSummary {
    let mut pod_counts = PodCounts {
        total: pods.len(),
        ..Default::default()
    };
    for pod in pods {
        match pod.status.as_ref().and_then(|s| s.phase.as_deref()) {
            Some("Running") => pod_counts.running += 1,
            Some("Pending") => pod_counts.pending += 1,
            Some("Failed") => pod_counts.failed += 1,
            Some("Succeeded") => pod_counts.succeeded += 1,
            _ => {}
        }
    }

    MetricsSummary {
        pods: pod_counts,
        nodes: NodeCounts {
            total: nodes.len(),
            ready: nodes.iter().filter(|n| node_is_ready(n)).count(),
        },
        deployments: DeploymentCounts {
            total: deployments.len(),
            available: deployments
                .iter()
                .filter(|d| {
                    d.status
                        .as_ref()
                        .and_then(|s| s.available_replicas)
                        .unwrap_or(0)
                        > 0
                })
                .count(),
        },
        services: ServiceCounts {
            total: services.len(),
        },
    }
}
