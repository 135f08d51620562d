//! Background conversion: run one [`Converter::convert`] off the caller's
//! thread and relay what happens as events.
//!
//! ## Why spawn_blocking?
//!
//! Rasterisation holds a CPU for seconds to minutes and pdfium is not
//! async-safe. `tokio::task::spawn_blocking` moves the conversion onto the
//! blocking pool so Tokio worker threads (and any UI driven from them) keep
//! running.
//!
//! ## Event contract
//!
//! * [`TaskEvent::Progress`] — zero or more, forwarded verbatim from the
//!   converter's page callback, in page order.
//! * exactly one of [`TaskEvent::Completed`] / [`TaskEvent::Failed`], always
//!   after the last progress event. A panic inside the conversion is reported
//!   as `Failed`.
//!
//! The worker and the caller share nothing but the channel. There is no
//! cancellation: dropping the [`ConversionTask`] stops event delivery but the
//! conversion itself runs to completion.

use crate::config::ConversionRequest;
use crate::convert::Converter;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// One notification from a background conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// Page `current` of `total` has been written.
    Progress { current: usize, total: usize },
    /// All pages written; paths in page order.
    Completed(Vec<PathBuf>),
    /// The conversion failed; the error's message, unchanged.
    Failed(String),
}

impl TaskEvent {
    /// `true` for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskEvent::Progress { .. })
    }
}

/// Handle to a conversion running on Tokio's blocking pool.
#[derive(Debug)]
pub struct ConversionTask {
    events: mpsc::UnboundedReceiver<TaskEvent>,
    relay: JoinHandle<()>,
}

impl ConversionTask {
    /// Start converting `request` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(converter: Converter, request: ConversionRequest) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let progress_tx = tx.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let forward = move |current: usize, total: usize| {
                // Receiver gone means nobody is listening; keep converting.
                let _ = progress_tx.send(TaskEvent::Progress { current, total });
            };
            converter.convert(&request, Some(&forward))
        });

        let relay = tokio::spawn(async move {
            let terminal = match worker.await {
                Ok(Ok(paths)) => TaskEvent::Completed(paths),
                Ok(Err(e)) => TaskEvent::Failed(e.to_string()),
                Err(join_err) => {
                    warn!("Conversion task panicked: {}", join_err);
                    TaskEvent::Failed(format!("Conversion task panicked: {join_err}"))
                }
            };
            debug!("Conversion task finished: {:?}", terminal);
            let _ = tx.send(terminal);
        });

        Self { events, relay }
    }

    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<TaskEvent> {
        self.events.recv().await
    }

    /// All events as a `Stream`, ending after the terminal event.
    pub fn into_stream(self) -> impl Stream<Item = TaskEvent> + Send + Unpin {
        UnboundedReceiverStream::new(self.events)
    }

    /// Drive the task to its end, calling `on_progress` for every progress
    /// event, and return the written paths or the failure message.
    pub async fn wait<F>(mut self, mut on_progress: F) -> Result<Vec<PathBuf>, String>
    where
        F: FnMut(usize, usize),
    {
        while let Some(event) = self.events.recv().await {
            match event {
                TaskEvent::Progress { current, total } => on_progress(current, total),
                TaskEvent::Completed(paths) => return Ok(paths),
                TaskEvent::Failed(message) => return Err(message),
            }
        }
        // The relay always sends a terminal event before dropping its sender;
        // reaching here means the runtime shut down underneath us.
        Err("conversion task ended without a result".to_string())
    }

    /// `true` once the conversion and its terminal event have been sent.
    pub fn is_finished(&self) -> bool {
        self.relay.is_finished()
    }
}
