use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kubedeck_k8s::KubeClient;

use crate::error::ApiError;

/// Runtime settings shared by the handlers
#[derive(Clone, Debug)]
pub struct ApiSettings {
    /// Push period for the cluster update channel
    pub update_interval: Duration,

    /// Default tailLines for log requests
    pub tail_lines: i64,

    /// Origins allowed by CORS; any origin when empty or containing `*`
    pub cors_origins: Vec<String>,

    /// Directory of built frontend assets to serve, if any
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(5),
            tail_lines: 100,
            cors_origins: Vec::new(),
            static_dir: None,
        }
    }
}

/// Shared application state
///
/// The client is optional: the server starts without credentials and
/// answers 503 until a cluster is reachable at restart.
#[derive(Clone)]
pub struct AppState {
    kube: Option<KubeClient>,
    settings: Arc<ApiSettings>,
}

impl AppState {
    pub fn new(kube: Option<KubeClient>, settings: ApiSettings) -> Self {
        Self {
            kube,
            settings: Arc::new(settings),
        }
    }

    /// The cluster client, or the error every endpoint maps to 503
    pub fn kube(&self) -> Result<&KubeClient, ApiError> {
        self.kube.as_ref().ok_or(ApiError::ClientUnavailable)
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }
}
