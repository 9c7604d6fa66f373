//! In-memory transport doubles shared by the downloader and orchestrator tests.

use async_trait::async_trait;
use bytes::Bytes;
use czds_types::CzdsError;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::transport::{Transport, TransportResponse};

/// How a scripted body ends after its chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tail {
    End,
    Reset,
    Stall,
}

/// One scripted reply to a GET.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    ConnectionReset,
    Status(u16),
    Body {
        disposition: Option<String>,
        length: Option<u64>,
        chunks: Vec<Bytes>,
        tail: Tail,
    },
}

impl Reply {
    /// A complete file served as three chunks with an accurate length.
    pub(crate) fn file(filename: &str, data: &[u8]) -> Self {
        let third = data.len().div_ceil(3).max(1);
        Self::Body {
            disposition: Some(format!("attachment; filename=\"{filename}\"")),
            length: Some(data.len() as u64),
            chunks: data.chunks(third).map(Bytes::copy_from_slice).collect(),
            tail: Tail::End,
        }
    }

    pub(crate) fn with_length(mut self, declared: Option<u64>) -> Self {
        if let Self::Body { length, .. } = &mut self {
            *length = declared;
        }
        self
    }

    pub(crate) fn without_disposition(mut self) -> Self {
        if let Self::Body { disposition, .. } = &mut self {
            *disposition = None;
        }
        self
    }

    pub(crate) fn reset_mid_stream(self) -> Self {
        self.with_tail(Tail::Reset)
    }

    pub(crate) fn stall(self) -> Self {
        self.with_tail(Tail::Stall)
    }

    fn with_tail(mut self, new_tail: Tail) -> Self {
        if let Self::Body { chunks, tail, .. } = &mut self {
            *tail = new_tail;
            // Deliver only the first chunk before the body breaks
            chunks.truncate(1);
        }
        self
    }
}

/// Decrements the in-flight counter when the body is dropped.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Transport that replays per-URL scripts.
///
/// The last reply of a script repeats once earlier ones are used up.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<HashMap<String, u32>>,
    order: Mutex<Vec<String>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    chunk_delay: Duration,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(self, url: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into());
        self
    }

    /// Sleeps before every body chunk so transfers overlap.
    pub(crate) const fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub(crate) fn calls(&self, url: &str) -> u32 {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// URLs in the order their first request was issued.
    pub(crate) fn order(&self) -> Vec<String> {
        self.order.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.get_mut(url)?;
        if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, CzdsError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        {
            let mut order = self.order.lock().unwrap();
            if !order.iter().any(|u| u == url) {
                order.push(url.to_string());
            }
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(Arc::clone(&self.in_flight));

        let reply = self
            .next_reply(url)
            .ok_or_else(|| CzdsError::HttpStatus {
                status: 404,
                message: format!("no script for {url}"),
            })?;

        let (disposition, length, chunks, tail) = match reply {
            Reply::ConnectionReset => {
                return Err(CzdsError::Transport("connection reset by peer".into()));
            }
            Reply::Status(status) => {
                return Err(CzdsError::HttpStatus {
                    status,
                    message: "scripted status".into(),
                });
            }
            Reply::Body {
                disposition,
                length,
                chunks,
                tail,
            } => (disposition, length, chunks, tail),
        };

        let mut items: Vec<Result<Bytes, CzdsError>> = chunks.into_iter().map(Ok).collect();
        if tail == Tail::Reset {
            items.push(Err(CzdsError::Transport("connection reset by peer".into())));
        }

        let delay = self.chunk_delay;
        let body = futures::stream::iter(items)
            .then(move |item| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                item
            })
            .chain(futures::stream::unfold(tail, |tail| async move {
                if tail == Tail::Stall {
                    futures::future::pending::<()>().await;
                }
                None::<(Result<Bytes, CzdsError>, Tail)>
            }))
            .map(move |item| {
                let _held = &guard;
                item
            })
            .boxed();

        Ok(TransportResponse::new(disposition, length, body))
    }
}

/// Sorted file names in a directory.
pub(crate) fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub(crate) fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
