//! Background worker for dashboard queries.
//!
//! The terminal UI is synchronous, so queries run on a dedicated thread
//! that owns a single-threaded tokio runtime. Requests go in over a tokio
//! channel and results come back over a std channel the UI polls between
//! frames. Requests are served concurrently; ordering of replies is not
//! guaranteed, which is what the cache's refresh tickets are for.

use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use super::{DashboardQueries, DashboardResults, RefreshTicket};
use crate::error::{Error, Result};
use crate::types::{DeleteOutcome, LeadId};

enum WorkerRequest {
    Refresh(RefreshTicket),
    Delete(LeadId),
}

/// Reply from the worker.
#[derive(Debug)]
pub enum WorkerEvent {
    Refreshed {
        ticket: RefreshTicket,
        results: DashboardResults,
    },
    Deleted {
        id: LeadId,
        result: Result<DeleteOutcome>,
    },
}

/// Handle to the query thread. Dropping it stops the thread.
pub struct DashboardWorker {
    requests: Option<UnboundedSender<WorkerRequest>>,
    events: mpsc::Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
}

impl DashboardWorker {
    /// Start the worker thread.
    pub fn spawn(queries: DashboardQueries) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (request_tx, mut request_rx) = unbounded_channel::<WorkerRequest>();
        let (event_tx, event_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("leadboard-queries".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    while let Some(request) = request_rx.recv().await {
                        let queries = queries.clone();
                        let events = event_tx.clone();
                        tokio::spawn(async move {
                            let event = serve(&queries, request).await;
                            // The UI may already be gone
                            let _ = events.send(event);
                        });
                    }
                });
                tracing::debug!("Query worker stopped");
            })?;

        Ok(Self {
            requests: Some(request_tx),
            events: event_rx,
            handle: Some(handle),
        })
    }

    fn send(&self, request: WorkerRequest) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(Error::WorkerStopped)?
            .send(request)
            .map_err(|_| Error::WorkerStopped)
    }

    /// Queue a full refresh for the ticket's filter.
    pub fn request_refresh(&self, ticket: RefreshTicket) -> Result<()> {
        self.send(WorkerRequest::Refresh(ticket))
    }

    /// Queue a delete.
    pub fn request_delete(&self, id: LeadId) -> Result<()> {
        self.send(WorkerRequest::Delete(id))
    }

    /// Next finished reply, if any. Never blocks.
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.events.try_recv().ok()
    }

    /// Wait up to `timeout` for the next reply.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

async fn serve(queries: &DashboardQueries, request: WorkerRequest) -> WorkerEvent {
    match request {
        WorkerRequest::Refresh(ticket) => {
            let results = queries
                .refresh(&ticket.key.filter, ticket.key.period, Utc::now())
                .await;
            WorkerEvent::Refreshed { ticket, results }
        }
        WorkerRequest::Delete(id) => WorkerEvent::Deleted {
            id,
            result: queries.delete_lead(id).await,
        },
    }
}

impl Drop for DashboardWorker {
    fn drop(&mut self) {
        // Closing the channel ends the request loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::dashboard::{DashboardCache, DashboardKey};
    use crate::source::MemorySource;
    use crate::types::Lead;
    use std::sync::Arc;

    const WAIT: Duration = Duration::from_secs(5);

    fn worker_with(source: Arc<MemorySource>) -> DashboardWorker {
        crate::logging::init_test();
        DashboardWorker::spawn(DashboardQueries::new(source, &DashboardConfig::default())).unwrap()
    }

    #[test]
    fn test_refresh_round_trip() {
        let mut lead = Lead::new(1, Some(Utc::now()));
        lead.tag = Some("A".to_string());
        let source = Arc::new(MemorySource::new(vec![lead]));
        let worker = worker_with(source);

        let mut cache = DashboardCache::new();
        let ticket = cache.begin(DashboardKey::default());
        worker.request_refresh(ticket.clone()).unwrap();

        match worker.recv_timeout(WAIT) {
            Some(WorkerEvent::Refreshed {
                ticket: got,
                results,
            }) => {
                assert_eq!(got, ticket);
                assert_eq!(results.stats.unwrap().total_leads, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_delete_round_trip() {
        let source = Arc::new(MemorySource::new(vec![Lead::new(7, None)]));
        let worker = worker_with(source.clone());

        worker.request_delete(7).unwrap();
        match worker.recv_timeout(WAIT) {
            Some(WorkerEvent::Deleted { id, result }) => {
                assert_eq!(id, 7);
                assert_eq!(result.unwrap(), DeleteOutcome::Deleted);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(source.is_empty());
    }

    #[test]
    fn test_delete_failure_is_reported() {
        let source = Arc::new(MemorySource::new(vec![Lead::new(7, None)]));
        source.set_fail_deletes(true);
        let worker = worker_with(source.clone());

        worker.request_delete(7).unwrap();
        match worker.recv_timeout(WAIT) {
            Some(WorkerEvent::Deleted { result, .. }) => assert!(result.is_err()),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_try_recv_is_empty_when_idle() {
        let worker = worker_with(Arc::new(MemorySource::default()));
        assert!(worker.try_recv().is_none());
    }
}
