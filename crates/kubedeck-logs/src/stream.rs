use anyhow::Context;
use futures::{AsyncBufReadExt, TryStreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{LogFilter, LogOptions, LogParser};
use kubedeck_types::LogEntry;

/// Follow-mode log stream for one pod
///
/// Lines arrive on `recv` already parsed and filtered. Open and read
/// failures are delivered on the same channel as the final item, so the
/// consumer can report them before the stream closes. Dropping the
/// stream cancels the background task.
pub struct LogStream {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
    rx: mpsc::UnboundedReceiver<anyhow::Result<LogEntry>>,
}

impl LogStream {
    /// Spawn a follow stream for the given pod
    pub fn spawn(
        client: kube::Client,
        namespace: &str,
        pod_name: &str,
        options: LogOptions,
        filter: LogFilter,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let api: Api<Pod> = Api::namespaced(client, namespace);
        let task = tokio::spawn(follow_pod(
            api,
            pod_name.to_string(),
            options,
            filter,
            tx,
            cancel.clone(),
        ));
        Self { cancel, task, rx }
    }

    /// Receive the next line or failure, None once the stream has ended
    pub async fn recv(&mut self) -> Option<anyhow::Result<LogEntry>> {
        self.rx.recv().await
    }

    /// Stop the background task
    pub fn stop(&self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn follow_pod(
    api: Api<Pod>,
    pod_name: String,
    options: LogOptions,
    filter: LogFilter,
    tx: mpsc::UnboundedSender<anyhow::Result<LogEntry>>,
    cancel: CancellationToken,
) {
    let params = options.to_params(true);

    let stream = match api
        .log_stream(&pod_name, &params)
        .await
        .context(format!("Failed to open log stream for pod '{pod_name}'"))
    {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("{e:#}");
            let _ = tx.send(Err(e));
            return;
        }
    };

    let mut lines = stream.lines();
    let mut line_number: u64 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            result = lines.try_next() => {
                match result {
                    Ok(Some(line)) => {
                        line_number += 1;
                        let mut entry = LogParser::parse(&line, &pod_name, line_number);
                        entry.container = options.container.clone();
                        if !filter.matches(&entry) {
                            continue;
                        }
                        if tx.send(Ok(entry)).is_err() {
                            // Receiver dropped, stop following
                            break;
                        }
                    }
                    // Stream ended (pod terminated?)
                    Ok(None) => break,
                    Err(e) => {
                        let err = anyhow::Error::new(e)
                            .context(format!("Log stream for pod '{pod_name}' failed"));
                        let _ = tx.send(Err(err));
                        break;
                    }
                }
            }
        }
    }
}
