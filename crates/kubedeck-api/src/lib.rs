//! HTTP and WebSocket surface for kubedeck
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/api/health` | GET | Liveness check, no cluster round-trip |
//! | `/api/cluster/info` | GET | Cluster identity and version |
//! | `/api/namespaces` | GET, POST | List or create namespaces |
//! | `/api/pods` | GET | List pods in a namespace |
//! | `/api/pods/{ns}/{name}` | GET, DELETE | Inspect or delete one pod |
//! | `/api/pods/{ns}/{name}/logs` | GET | One-shot log fetch |
//! | `/api/pods/{ns}/{name}/logs/stream` | GET | WebSocket log follow |
//! | `/api/deployments` | GET | List deployments in a namespace |
//! | `/api/deployments/{ns}/{name}` | DELETE | Delete one deployment |
//! | `/api/services` | GET | List services in a namespace |
//! | `/api/nodes` | GET | List cluster nodes |
//! | `/api/metrics/summary` | GET | Aggregated object counts |
//! | `/ws` | GET | WebSocket pushing cluster counts |

mod error;
mod handlers;
mod routes;
mod state;
mod websocket;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{ApiSettings, AppState};
