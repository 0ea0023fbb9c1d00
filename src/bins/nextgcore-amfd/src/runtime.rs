//! AMF Runtime
//!
//! Worker tasks around the `Amf` core. Each inbound PDU is decoded once and
//! queued on one worker: by AMF-UE-NGAP-ID when the message has one, else by
//! association and RAN-UE-NGAP-ID, else on worker 0. Messages of one UE
//! therefore run in arrival order while different UEs run in parallel.
//!
//! Handover guard timers are `tokio::time::sleep` tasks armed and aborted from
//! the core's indications; on expiry they queue a timeout on the UE's worker.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use ogs_ngap::{NgapMessage, NgapResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{AbortHandle, JoinHandle};

use crate::amf::Amf;
use crate::config::AmfProfile;
use crate::context::AssocId;
use crate::event::{AmfIndication, DecodedMessage, HandoverStep, OutboundMessage};

/// Largest NGAP PDU accepted from a peer
pub const MAX_NGAP_MSG_SIZE: usize = 65535;

/// Work queued on one worker
#[derive(Debug)]
pub enum WorkItem {
    Inbound(DecodedMessage),
    Timeout {
        amf_ue_ngap_id: u64,
        step: HandoverStep,
    },
    AssociationLost(AssocId),
}

/// Worker owning a UE known by its AMF-UE-NGAP-ID
pub fn ue_worker(amf_ue_ngap_id: u64, workers: usize) -> usize {
    if workers <= 1 {
        return 0;
    }
    (amf_ue_ngap_id % workers as u64) as usize
}

/// Worker for an inbound message
pub fn worker_index(message: &NgapMessage, assoc_id: AssocId, workers: usize) -> usize {
    if workers <= 1 {
        return 0;
    }
    if let Some(amf_ue_ngap_id) = message.amf_ue_ngap_id() {
        return ue_worker(amf_ue_ngap_id, workers);
    }
    if let Some(ran_ue_ngap_id) = message.ran_ue_ngap_id() {
        let mut hasher = DefaultHasher::new();
        (assoc_id, ran_ue_ngap_id).hash(&mut hasher);
        return (hasher.finish() % workers as u64) as usize;
    }
    0
}

/// What the runtime hands back to its owner
#[derive(Debug)]
pub struct RuntimeOutputs {
    /// Messages to put on the wire
    pub outbound: UnboundedReceiver<OutboundMessage>,
    /// NAS and context-release indications for the layers above
    pub upper: UnboundedReceiver<AmfIndication>,
}

/// Running AMF: the core plus its worker and timer tasks
#[derive(Debug)]
pub struct Runtime {
    amf: Arc<Amf>,
    workers: Arc<Vec<UnboundedSender<WorkItem>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Spawn `workers` worker tasks and the timer task. Must be called from
    /// within a tokio runtime.
    pub fn start(profile: AmfProfile, workers: usize) -> (Self, RuntimeOutputs) {
        let workers = workers.max(1);
        let (indication_tx, indication_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (upper_tx, upper_rx) = mpsc::unbounded_channel();
        let amf = Arc::new(Amf::with_indications(profile, indication_tx));

        let mut senders = Vec::with_capacity(workers);
        let mut tasks = Vec::with_capacity(workers + 1);
        for index in 0..workers {
            let (tx, rx) = mpsc::unbounded_channel();
            senders.push(tx);
            tasks.push(tokio::spawn(run_worker(
                index,
                amf.clone(),
                rx,
                outbound_tx.clone(),
            )));
        }
        let senders = Arc::new(senders);
        tasks.push(tokio::spawn(run_indications(
            indication_rx,
            senders.clone(),
            upper_tx,
        )));

        log::info!("AMF runtime started with {} workers", workers);
        (
            Self {
                amf,
                workers: senders,
                tasks,
            },
            RuntimeOutputs {
                outbound: outbound_rx,
                upper: upper_rx,
            },
        )
    }

    pub fn amf(&self) -> &Arc<Amf> {
        &self.amf
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Decode a PDU received on `assoc_id` and queue it. Returns the worker
    /// it went to.
    pub fn submit(&self, assoc_id: AssocId, raw: Bytes) -> NgapResult<usize> {
        let decoded = self.amf.on_inbound_message(assoc_id, raw)?;
        let index = worker_index(&decoded.message, assoc_id, self.workers.len());
        send_to(&self.workers, index, WorkItem::Inbound(decoded));
        Ok(index)
    }

    pub fn association_lost(&self, assoc_id: AssocId) {
        send_to(&self.workers, 0, WorkItem::AssociationLost(assoc_id));
    }

    pub fn shutdown(self) {
        for task in self.tasks {
            task.abort();
        }
        log::info!("AMF runtime stopped");
    }
}

fn send_to(workers: &[UnboundedSender<WorkItem>], index: usize, item: WorkItem) {
    match workers.get(index) {
        Some(tx) => {
            if tx.send(item).is_err() {
                log::warn!("Worker {} is gone", index);
            }
        }
        None => log::error!("No worker {}", index),
    }
}

async fn run_worker(
    index: usize,
    amf: Arc<Amf>,
    mut rx: UnboundedReceiver<WorkItem>,
    outbound: UnboundedSender<OutboundMessage>,
) {
    log::debug!("Worker {} started", index);
    while let Some(item) = rx.recv().await {
        let messages = match item {
            WorkItem::Inbound(decoded) => match amf.handle(&decoded) {
                Ok(messages) => messages,
                Err(e) => {
                    log::warn!(
                        "[assoc={}] {} failed: {}",
                        decoded.assoc_id,
                        decoded.message.name(),
                        e
                    );
                    Vec::new()
                }
            },
            WorkItem::Timeout {
                amf_ue_ngap_id,
                step,
            } => amf.handle_timeout(amf_ue_ngap_id, step),
            WorkItem::AssociationLost(assoc_id) => amf.on_association_lost(assoc_id),
        };
        for message in messages {
            if outbound.send(message).is_err() {
                log::debug!("Worker {}: outbound receiver gone", index);
                return;
            }
        }
    }
    log::debug!("Worker {} stopped", index);
}

async fn run_indications(
    mut rx: UnboundedReceiver<AmfIndication>,
    workers: Arc<Vec<UnboundedSender<WorkItem>>>,
    upper: UnboundedSender<AmfIndication>,
) {
    let mut timers: HashMap<(u64, HandoverStep), AbortHandle> = HashMap::new();

    while let Some(indication) = rx.recv().await {
        match &indication {
            AmfIndication::StartTimer {
                amf_ue_ngap_id,
                step,
                duration,
            } => {
                let (amf_ue_ngap_id, step, duration) = (*amf_ue_ngap_id, *step, *duration);
                let worker = workers
                    .get(ue_worker(amf_ue_ngap_id, workers.len()))
                    .cloned();
                let task = tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    if let Some(tx) = worker {
                        let _ = tx.send(WorkItem::Timeout {
                            amf_ue_ngap_id,
                            step,
                        });
                    }
                });
                log::debug!(
                    "{} started for {:?} (amf_ue_ngap_id={})",
                    step.name(),
                    duration,
                    amf_ue_ngap_id
                );
                if let Some(old) = timers.insert((amf_ue_ngap_id, step), task.abort_handle()) {
                    old.abort();
                }
                continue;
            }
            AmfIndication::StopTimer {
                amf_ue_ngap_id,
                step,
            } => {
                if let Some(timer) = timers.remove(&(*amf_ue_ngap_id, *step)) {
                    timer.abort();
                }
                continue;
            }
            AmfIndication::ContextReleased { amf_ue_ngap_id } => {
                timers.retain(|(id, _), timer| {
                    if id == amf_ue_ngap_id {
                        timer.abort();
                        false
                    } else {
                        true
                    }
                });
            }
            AmfIndication::Nas { .. } => {}
        }
        if upper.send(indication).is_err() {
            log::trace!("Upper layer receiver gone");
        }
    }
}

// ============================================================================
// TCP transport
// ============================================================================

/// Serve gNBs over TCP with a 4-octet big-endian length before each PDU.
/// Stands in for the SCTP association layer on test benches; every
/// accepted connection is one association.
pub async fn serve_tcp(
    runtime: Arc<Runtime>,
    listener: TcpListener,
    mut outbound: UnboundedReceiver<OutboundMessage>,
) -> std::io::Result<()> {
    let peers: Arc<Mutex<HashMap<AssocId, UnboundedSender<Bytes>>>> = Arc::default();
    let next_assoc_id = AtomicU64::new(1);

    let router_peers = peers.clone();
    tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let bytes = match message.encode() {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::error!(
                        "[assoc={}] {} encode failed: {}",
                        message.assoc_id,
                        message.message.name(),
                        e
                    );
                    continue;
                }
            };
            let peers = router_peers.lock().unwrap_or_else(PoisonError::into_inner);
            match peers.get(&message.assoc_id) {
                Some(tx) => {
                    let _ = tx.send(bytes);
                }
                None => log::warn!(
                    "[assoc={}] {} dropped: association gone",
                    message.assoc_id,
                    message.message.name()
                ),
            }
        }
    });

    loop {
        let (stream, remote) = listener.accept().await?;
        let assoc_id = next_assoc_id.fetch_add(1, Ordering::SeqCst);
        log::info!("[assoc={}] gNB connected from {}", assoc_id, remote);

        let (mut reader, mut writer) = stream.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
        peers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(assoc_id, tx);

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                if writer.write_u32(bytes.len() as u32).await.is_err()
                    || writer.write_all(&bytes).await.is_err()
                {
                    break;
                }
            }
        });

        let runtime = runtime.clone();
        let peers = peers.clone();
        tokio::spawn(async move {
            loop {
                let length = match reader.read_u32().await {
                    Ok(length) => length as usize,
                    Err(_) => break,
                };
                if length == 0 || length > MAX_NGAP_MSG_SIZE {
                    log::warn!("[assoc={}] bad frame length {}", assoc_id, length);
                    break;
                }
                let mut buf = vec![0u8; length];
                if reader.read_exact(&mut buf).await.is_err() {
                    break;
                }
                // Undecodable PDUs are logged by the core and dropped
                let _ = runtime.submit(assoc_id, Bytes::from(buf));
            }
            peers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&assoc_id);
            log::info!("[assoc={}] gNB disconnected", assoc_id);
            runtime.association_lost(assoc_id);
        });
    }
}
