//! Bidirectional byte pump between a container exec socket and an SSH
//! channel.
//!
//! Grounded in the reference implementation's `_handle_output` /
//! `_read_with_timeout` (container → client, background task, 60s read
//! timeout, timeout is not EOF) and `data_received` / `eof_received`
//! (client → container, forwarded inline). The reference's blocking
//! `recv()`-in-an-executor idiom becomes a native `tokio::time::timeout`
//! around the exec stream, since `bollard`'s attach stream is already an
//! async `Stream`/`AsyncWrite` pair rather than a raw blocking socket.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bollard::container::LogOutput;
use futures_util::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::writer::ChannelWriter;

type ExecOutput = Pin<Box<dyn Stream<Item = std::result::Result<LogOutput, bollard::errors::Error>> + Send>>;
type ExecInput = Pin<Box<dyn AsyncWrite + Send>>;

/// Owns the client→container write half and the container→client reader
/// task. One `Pump` per session; never outlives it.
pub struct Pump {
    input: Arc<Mutex<ExecInput>>,
    reader: JoinHandle<()>,
}

impl Pump {
    /// Start the container→client reader task and return a handle whose
    /// `write` forwards client→container bytes inline.
    pub fn spawn(output: ExecOutput, input: ExecInput, writer: ChannelWriter, io_timeout: Duration) -> Self {
        let input = Arc::new(Mutex::new(input));
        let reader = tokio::spawn(read_loop(output, writer, io_timeout));
        Self { input, reader }
    }

    /// Forward client-sent bytes to the container's stdin. Called directly
    /// from the SSH channel's data callback — no extra buffering.
    pub async fn write(&self, data: &[u8]) -> std::io::Result<()> {
        let mut input = self.input.lock().await;
        input.write_all(data).await?;
        input.flush().await
    }

    /// Half-close the container's stdin, mirroring client EOF.
    pub async fn shutdown_input(&self) {
        let mut input = self.input.lock().await;
        let _ = input.shutdown().await;
    }

    /// Cancel the reader task. Idempotent; safe to call after the task has
    /// already finished on its own.
    pub fn cancel(&self) {
        self.reader.abort();
    }
}

async fn read_loop(mut output: ExecOutput, writer: ChannelWriter, io_timeout: Duration) {
    loop {
        match tokio::time::timeout(io_timeout, output.next()).await {
            Ok(Some(Ok(chunk))) => {
                let bytes: &[u8] = chunk.as_ref();
                if bytes.is_empty() {
                    continue;
                }
                if writer.data(bytes).await.is_err() {
                    tracing::warn!("pump write to SSH channel failed, ending pump");
                    break;
                }
            }
            Ok(Some(Err(e))) => {
                tracing::warn!(error = %e, "container exec stream error, ending pump");
                break;
            }
            Ok(None) => {
                tracing::debug!("container exec stream closed (EOF)");
                break;
            }
            Err(_elapsed) => {
                // Read timeout: not EOF, loop again so cancellation can be
                // observed promptly without blocking indefinitely.
                continue;
            }
        }
    }
    writer.exit_status(0).await;
    writer.eof().await;
}
