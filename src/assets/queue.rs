use super::{LoadError, MeshFormat, MeshLoader};
use crate::scene::{NodeId, Object};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadId(u64);

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// Shared cancellation flag between the viewport and a loader thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Caller-side handle for an in-flight load.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    pub id: LoadId,
    pub node: NodeId,
    pub url: String,
    cancel: CancelToken,
}

impl LoadHandle {
    /// The result is discarded when it arrives and reported as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A load that finished on its worker thread, not yet attached.
#[derive(Debug)]
pub struct CompletedLoad {
    pub id: LoadId,
    pub node: NodeId,
    pub url: String,
    pub result: Result<Object, LoadError>,
}

/// What happened to a load once the viewport processed it.
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: LoadId,
    pub node: NodeId,
    pub url: String,
    pub result: Result<(), LoadError>,
}

struct PendingLoad {
    id: LoadId,
    node: NodeId,
    url: String,
    cancel: CancelToken,
    receiver: Receiver<Result<Object, LoadError>>,
}

impl PendingLoad {
    fn finish(self, result: Result<Object, LoadError>) -> CompletedLoad {
        let result = if self.cancel.is_cancelled() {
            Err(LoadError::Cancelled {
                url: self.url.clone(),
            })
        } else {
            result
        };
        CompletedLoad {
            id: self.id,
            node: self.node,
            url: self.url,
            result,
        }
    }

    fn worker_lost(&self) -> Result<Object, LoadError> {
        Err(LoadError::Transport {
            url: self.url.clone(),
            source: std::io::Error::other("loader thread exited without a result"),
        })
    }
}

/// Runs mesh loads on worker threads and hands results back on poll.
pub struct LoadQueue {
    loader: Arc<dyn MeshLoader>,
    pending: Vec<PendingLoad>,
    next_id: u64,
}

impl LoadQueue {
    pub fn new(loader: Arc<dyn MeshLoader>) -> Self {
        Self {
            loader,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Starts loading `url` for `node`. Fails up front on an unrecognized
    /// extension or when the worker thread cannot be spawned.
    pub fn submit(&mut self, node: NodeId, url: &str) -> Result<LoadHandle, LoadError> {
        let format = MeshFormat::from_url(url)?;
        let id = LoadId(self.next_id);
        self.next_id += 1;

        let cancel = CancelToken::new();
        let (sender, receiver) = mpsc::channel();
        let loader = Arc::clone(&self.loader);
        let worker_cancel = cancel.clone();
        let worker_url = url.to_string();
        thread::Builder::new()
            .name(format!("archviz-{id}"))
            .spawn(move || {
                let result = if worker_cancel.is_cancelled() {
                    Err(LoadError::Cancelled {
                        url: worker_url.clone(),
                    })
                } else {
                    loader.load_mesh(&worker_url, format)
                };
                // The queue may be gone by now; nothing to report to.
                let _ = sender.send(result);
            })
            .map_err(|source| LoadError::Transport {
                url: url.to_string(),
                source,
            })?;

        log::info!("{id} started for {node}: {url}");
        self.pending.push(PendingLoad {
            id,
            node,
            url: url.to_string(),
            cancel: cancel.clone(),
            receiver,
        });
        Ok(LoadHandle {
            id,
            node,
            url: url.to_string(),
            cancel,
        })
    }

    /// Cancels every pending load targeting `node`.
    pub fn cancel_node(&mut self, node: NodeId) -> usize {
        let mut cancelled = 0;
        for load in self.pending.iter().filter(|load| load.node == node) {
            load.cancel.cancel();
            cancelled += 1;
        }
        cancelled
    }

    /// Collects finished loads without blocking.
    pub fn poll(&mut self) -> Vec<CompletedLoad> {
        let mut done = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for load in self.pending.drain(..) {
            match load.receiver.try_recv() {
                Ok(result) => done.push(load.finish(result)),
                Err(TryRecvError::Empty) => still_pending.push(load),
                Err(TryRecvError::Disconnected) => {
                    let result = load.worker_lost();
                    done.push(load.finish(result));
                }
            }
        }
        self.pending = still_pending;
        done
    }

    /// Blocks until every pending load has finished.
    pub fn wait_all(&mut self) -> Vec<CompletedLoad> {
        self.pending
            .drain(..)
            .map(|load| {
                let result = load.receiver.recv().unwrap_or_else(|_| load.worker_lost());
                load.finish(result)
            })
            .collect()
    }
}
