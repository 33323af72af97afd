//! Child-process transport for SQL probes.
//!
//! One worker process serves every group. Probes from the four concurrent
//! group loads share its stdin; the reader task routes each reply back to the
//! caller that owns its request id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{
    methods, ConnectionParams, ErrorInfo, ExecuteQueryParams, ExecuteQueryResponse,
    RequestEnvelope, ResponseEnvelope,
};
use crate::config::Settings;

/// Per-request bound when no `[worker] timeout_secs` is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<ResponseEnvelope>>>>;

/// Handle to a running `dumpcat-worker` process.
///
/// Requests are NDJSON lines on the worker's stdin, replies are NDJSON lines
/// on its stdout, matched up by UUID. Several probes may be in flight at once.
pub struct WorkerClient {
    stdin: Arc<Mutex<BufWriter<ChildStdin>>>,
    /// Request id -> waiting caller.
    pending: PendingMap,
    _child: Child,
    reader_task: JoinHandle<()>,
    timeout: Duration,
}

impl WorkerClient {
    pub async fn spawn<P: AsRef<Path>>(worker_path: P) -> WorkerResult<Self> {
        Self::spawn_with_args_and_timeout(
            worker_path,
            &[],
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }

    /// Start the worker described by the `[worker]` table.
    pub async fn spawn_with_settings(settings: &Settings) -> WorkerResult<Self> {
        let worker_path = settings.worker_path().ok_or_else(|| {
            WorkerError::SpawnFailed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "dumpcat-worker not found; set worker.path or add it to PATH",
            ))
        })?;
        let timeout = Duration::from_secs(settings.worker.timeout_secs);

        Self::spawn_with_args_and_timeout(&worker_path, &settings.worker.args, timeout).await
    }

    pub async fn spawn_with_args_and_timeout<P: AsRef<Path>>(
        worker_path: P,
        args: &[String],
        timeout: Duration,
    ) -> WorkerResult<Self> {
        let mut child = Command::new(worker_path.as_ref())
            .args(args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(WorkerError::SpawnFailed)?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                return Err(WorkerError::SpawnFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "worker stdio was not captured",
                )))
            }
        };

        debug!(path = %worker_path.as_ref().display(), ?timeout, "spawned query worker");

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = tokio::spawn(route_replies(stdout, pending.clone()));

        Ok(Self {
            stdin: Arc::new(Mutex::new(BufWriter::new(stdin))),
            pending,
            _child: child,
            reader_task,
            timeout,
        })
    }

    /// Send one request and wait up to the client timeout for its reply.
    async fn request<P, R>(&self, method: &str, params: P) -> WorkerResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let envelope = RequestEnvelope {
            id: id.clone(),
            method: method.to_string(),
            params: serde_json::to_value(params).map_err(WorkerError::SerializeFailed)?,
        };
        let mut line = serde_json::to_string(&envelope).map_err(WorkerError::SerializeFailed)?;
        line.push('\n');

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        {
            let mut stdin = self.stdin.lock().await;
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(WorkerError::WriteFailed)?;
            stdin.flush().await.map_err(WorkerError::WriteFailed)?;
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(received) => decode_response(received?),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(WorkerError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    /// Run `sql` on the connection described by `driver` and `connection_string`.
    pub async fn execute_query(
        &self,
        driver: &str,
        connection_string: &str,
        sql: &str,
    ) -> WorkerResult<ExecuteQueryResponse> {
        self.request(
            methods::EXECUTE_QUERY,
            ExecuteQueryParams {
                connection: ConnectionParams {
                    driver: driver.to_string(),
                    connection_string: connection_string.to_string(),
                },
                sql: sql.to_string(),
            },
        )
        .await
    }
}

impl Drop for WorkerClient {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

/// Read replies until the worker closes stdout, then fail whatever is still waiting.
async fn route_replies(stdout: ChildStdout, pending: PendingMap) {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => match serde_json::from_str::<ResponseEnvelope>(&line) {
                Ok(reply) => {
                    if let Some(tx) = pending.lock().await.remove(&reply.id) {
                        let _ = tx.send(reply);
                    }
                }
                Err(e) => warn!(error = %e, "worker: unreadable reply line"),
            },
            Err(e) => {
                warn!(error = %e, "worker: stdout read failed");
                break;
            }
        }
    }

    for (id, tx) in pending.lock().await.drain() {
        let _ = tx.send(exited_reply(id));
    }
}

fn exited_reply(id: String) -> ResponseEnvelope {
    ResponseEnvelope {
        id,
        success: false,
        result: None,
        error: Some(ErrorInfo {
            code: "WORKER_EXITED".to_string(),
            message: "query worker exited before replying".to_string(),
        }),
    }
}

fn decode_response<R: DeserializeOwned>(reply: ResponseEnvelope) -> WorkerResult<R> {
    if reply.success {
        let result = reply.result.unwrap_or(serde_json::Value::Null);
        return serde_json::from_value(result).map_err(WorkerError::DeserializeFailed);
    }
    match reply.error {
        Some(error) => Err(classify_error(&error.code, &error.message)),
        None => Err(WorkerError::remote("UNKNOWN", "worker reported failure without details")),
    }
}

fn classify_error(code: &str, message: &str) -> WorkerError {
    match code {
        "DRIVER_NOT_FOUND" => WorkerError::DriverNotFound(message.to_string()),
        "CONNECTION_FAILED" => WorkerError::ConnectionFailed(message.to_string()),
        "QUERY_FAILED" => WorkerError::QueryFailed(message.to_string()),
        "INVALID_REQUEST" => WorkerError::InvalidRequest(message.to_string()),
        "METHOD_NOT_FOUND" => WorkerError::MethodNotFound(message.to_string()),
        _ => WorkerError::remote(code, message),
    }
}
