//! Async shell around [`Page`]: one task owns the page, one worker owns
//! the transport. Everything else talks to them over channels.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::debug;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::channel::{ChannelConfig, TransportOutcome, WireJob};
use crate::page::{HostEvent, Page};
use crate::session::Session;
use crate::transport::Transport;
use pagedom::Document;

const SWEEP_EVERY: Duration = Duration::from_secs(1);

/// Drives a [`Page`] until the host hangs up and every pending response
/// has resolved or been abandoned.
pub struct Runtime {
    page: Page,
    transport: Arc<dyn Transport>,
    host: mpsc::UnboundedReceiver<HostEvent>,
    jobs: mpsc::UnboundedReceiver<WireJob>,
    results_tx: mpsc::UnboundedSender<TransportOutcome>,
    results: mpsc::UnboundedReceiver<TransportOutcome>,
}

impl Runtime {
    /// Build the runtime and hand back the sender the host feeds events
    /// through. Dropping the sender is how the host signals shutdown.
    pub fn new(
        document: Document,
        session: Session,
        transport: Arc<dyn Transport>,
        config: ChannelConfig,
    ) -> (Self, mpsc::UnboundedSender<HostEvent>) {
        let (host_tx, host) = mpsc::unbounded_channel();
        let (jobs_tx, jobs) = mpsc::unbounded_channel();
        let (results_tx, results) = mpsc::unbounded_channel();
        let page = Page::new(document, session, config, jobs_tx);
        (
            Self {
                page,
                transport,
                host,
                jobs,
                results_tx,
                results,
            },
            host_tx,
        )
    }

    /// The page, for setup before [`run`](Self::run) starts: component
    /// and widget init happens here.
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Run until the host sender is dropped and the page has no pending
    /// responses left. Returns the page for inspection.
    pub async fn run(self) -> Page {
        let Runtime {
            mut page,
            transport,
            mut host,
            jobs,
            results_tx,
            mut results,
        } = self;
        let worker = tokio::spawn(transport_worker(transport, jobs, results_tx));
        let mut sweep = tokio::time::interval(SWEEP_EVERY);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut host_open = true;

        loop {
            if !host_open && page.is_idle() {
                break;
            }
            tokio::select! {
                event = host.recv(), if host_open => match event {
                    Some(event) => {
                        page.dispatch(event);
                    }
                    None => {
                        debug!("host hung up, draining pending responses");
                        host_open = false;
                    }
                },
                outcome = results.recv() => match outcome {
                    Some(outcome) => page.on_transport_result(outcome),
                    None => break,
                },
                _ = sweep.tick() => page.sweep_deadlines(Instant::now()),
            }
        }

        page.session().end();
        worker.abort();
        page
    }
}

/// Pulls wire jobs off the queue and runs them against the transport,
/// any number at a time. Per-cid ordering is the channel's business;
/// here everything just flies.
async fn transport_worker(
    transport: Arc<dyn Transport>,
    mut jobs: mpsc::UnboundedReceiver<WireJob>,
    results: mpsc::UnboundedSender<TransportOutcome>,
) {
    let mut in_flight = FuturesUnordered::new();
    loop {
        tokio::select! {
            job = jobs.recv() => match job {
                Some(WireJob { body, eids, cid }) => {
                    let transport = Arc::clone(&transport);
                    in_flight.push(async move {
                        let result = transport.submit(body).await;
                        TransportOutcome { eids, cid, result }
                    });
                }
                None => break,
            },
            Some(outcome) = in_flight.next() => {
                if results.send(outcome).is_err() {
                    return;
                }
            }
        }
    }
    while let Some(outcome) = in_flight.next().await {
        if results.send(outcome).is_err() {
            return;
        }
    }
}
