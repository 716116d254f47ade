use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::LogParams;

/// Options accepted by the log endpoints
#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    /// Container to read; the apiserver picks the only container when unset
    pub container: Option<String>,

    /// Number of trailing lines to return
    pub tail_lines: Option<i64>,

    /// Only return lines newer than this many seconds
    pub since_seconds: Option<i64>,

    /// Read the previous container instance instead of the current one
    pub previous: bool,
}

impl LogOptions {
    pub(crate) fn to_params(&self, follow: bool) -> LogParams {
        LogParams {
            follow,
            container: self.container.clone(),
            // since_seconds wins when both bounds are set
            tail_lines: if self.since_seconds.is_some() {
                None
            } else {
                self.tail_lines
            },
            since_seconds: self.since_seconds,
            previous: self.previous,
            timestamps: follow,
            ..Default::default()
        }
    }
}

/// Fetch one block of logs from a pod
pub async fn fetch_logs(
    client: &kube::Client,
    namespace: &str,
    pod: &str,
    options: &LogOptions,
) -> Result<String> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    pods.logs(pod, &options.to_params(false)).await.context(format!(
        "Failed to get logs for pod '{}' in namespace '{}'",
        pod, namespace
    ))
}
