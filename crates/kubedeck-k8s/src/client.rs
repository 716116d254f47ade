//! Kubernetes API access for the dashboard

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Api;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::config::Kubeconfig;

use kubedeck_types::{
    ClusterCounts, ClusterInfo, CreateNamespaceRequest, DeploymentInfo, MetricsSummary,
    NamespaceInfo, NodeInfo, PodInfo, ServiceInfo,
};

use crate::convert;

/// Wrapper around the kube client with the kubeconfig identity captured
/// at startup
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
    context: String,
    cluster: String,
}

impl KubeClient {
    /// Create a new client from kubeconfig or in-cluster settings
    pub async fn connect() -> Result<Self> {
        let (context, cluster) = kubeconfig_identity();
        let config = kube::Config::infer()
            .await
            .context("Failed to load Kubernetes configuration. Is kubectl configured?")?;
        let client =
            kube::Client::try_from(config).context("Failed to create Kubernetes client")?;
        Ok(Self {
            client,
            context,
            cluster,
        })
    }

    /// Wrap an already constructed kube client
    pub fn from_client(client: kube::Client) -> Self {
        Self {
            client,
            context: "in-cluster".to_string(),
            cluster: "unknown".to_string(),
        }
    }

    /// The underlying kube client, for callers that stream
    pub fn inner(&self) -> &kube::Client {
        &self.client
    }

    /// Cluster identity plus the kubelet version of the first node
    pub async fn cluster_info(&self) -> Result<ClusterInfo> {
        // A cluster that refuses node lists still gets context and cluster
        // names, with version omitted
        let version = match self.all_nodes().await {
            Ok(nodes) => nodes.first().map(convert::node_version),
            Err(e) => {
                tracing::warn!("Failed to read cluster version from nodes: {e:#}");
                None
            }
        };
        Ok(ClusterInfo {
            version,
            context: self.context.clone(),
            cluster: self.cluster.clone(),
        })
    }

    /// List all namespaces in the cluster
    pub async fn list_namespaces(&self) -> Result<Vec<NamespaceInfo>> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;
        Ok(list
            .items
            .into_iter()
            .map(convert::namespace_to_info)
            .collect())
    }

    /// Create a namespace, returning the object the cluster stored
    pub async fn create_namespace(&self, req: &CreateNamespaceRequest) -> Result<Namespace> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let namespace = Namespace {
            metadata: ObjectMeta {
                name: Some(req.name.clone()),
                labels: req
                    .labels
                    .as_ref()
                    .map(|l| l.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
                ..Default::default()
            },
            ..Default::default()
        };
        namespaces
            .create(&PostParams::default(), &namespace)
            .await
            .context(format!("Failed to create namespace '{}'", req.name))
    }

    /// List pods in a namespace
    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<PodInfo>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods
            .list(&ListParams::default())
            .await
            .context(format!("Failed to list pods in namespace '{}'", namespace))?;
        Ok(list.items.into_iter().map(convert::pod_to_info).collect())
    }

    /// Fetch one pod as the full upstream object
    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pods.get(name).await.context(format!(
            "Failed to get pod '{}' in namespace '{}'",
            name, namespace
        ))
    }

    /// Delete a pod
    pub async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        pods.delete(name, &DeleteParams::default())
            .await
            .context(format!(
                "Failed to delete pod '{}' in namespace '{}'",
                name, namespace
            ))?;
        Ok(())
    }

    /// List deployments in a namespace
    pub async fn list_deployments(&self, namespace: &str) -> Result<Vec<DeploymentInfo>> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let list = deployments.list(&ListParams::default()).await.context(format!(
            "Failed to list deployments in namespace '{}'",
            namespace
        ))?;
        Ok(list
            .items
            .into_iter()
            .map(convert::deployment_to_info)
            .collect())
    }

    /// Delete a deployment
    pub async fn delete_deployment(&self, namespace: &str, name: &str) -> Result<()> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        deployments
            .delete(name, &DeleteParams::default())
            .await
            .context(format!(
                "Failed to delete deployment '{}' in namespace '{}'",
                name, namespace
            ))?;
        Ok(())
    }

    /// List services in a namespace
    pub async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>> {
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let list = services.list(&ListParams::default()).await.context(format!(
            "Failed to list services in namespace '{}'",
            namespace
        ))?;
        Ok(list
            .items
            .into_iter()
            .map(convert::service_to_info)
            .collect())
    }

    /// List all nodes in the cluster
    pub async fn list_nodes(&self) -> Result<Vec<NodeInfo>> {
        Ok(self
            .all_nodes()
            .await?
            .into_iter()
            .map(convert::node_to_info)
            .collect())
    }

    /// Count pods, nodes, deployments and services across all namespaces
    pub async fn metrics_summary(&self) -> Result<MetricsSummary> {
        let (pods, nodes, deployments, services) = tokio::try_join!(
            self.all_pods(),
            self.all_nodes(),
            self.all_deployments(),
            self.all_services(),
        )?;
        Ok(convert::summarize(&pods, &nodes, &deployments, &services))
    }

    /// Pod and node totals for the periodic push channel
    pub async fn cluster_counts(&self) -> Result<ClusterCounts> {
        let (pods, nodes) = tokio::try_join!(self.all_pods(), self.all_nodes())?;
        Ok(ClusterCounts {
            pods: pods.len(),
            nodes: nodes.len(),
            timestamp: chrono::Utc::now(),
        })
    }

    async fn all_pods(&self) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods
            .list(&ListParams::default())
            .await
            .context("Failed to list pods across namespaces")?;
        Ok(list.items)
    }

    async fn all_nodes(&self) -> Result<Vec<Node>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;
        Ok(list.items)
    }

    async fn all_deployments(&self) -> Result<Vec<Deployment>> {
        let deployments: Api<Deployment> = Api::all(self.client.clone());
        let list = deployments
            .list(&ListParams::default())
            .await
            .context("Failed to list deployments across namespaces")?;
        Ok(list.items)
    }

    async fn all_services(&self) -> Result<Vec<Service>> {
        let services: Api<Service> = Api::all(self.client.clone());
        let list = services
            .list(&ListParams::default())
            .await
            .context("Failed to list services across namespaces")?;
        Ok(list.items)
    }
}

/// Current context and cluster names from the local kubeconfig, if any
fn kubeconfig_identity() -> (String, String) {
    match Kubeconfig::read() {
        Ok(kubeconfig) => {
            let context = kubeconfig
                .current_context
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            let cluster = kubeconfig
                .contexts
                .iter()
                .find(|c| c.name == context)
                .and_then(|c| c.context.as_ref())
                .map(|c| c.cluster.clone())
                .unwrap_or_else(|| "unknown".to_string());
            (context, cluster)
        }
        // No kubeconfig on disk usually means in-cluster credentials
        Err(_) => ("in-cluster".to_string(), "in-cluster".to_string()),
    }
}
