//! Background cover generation. A single worker thread pulls requests off
//! a bounded FIFO queue, runs the host's generator and posts results back
//! for the interactive thread to apply. The worker never sees the live
//! cache or slots, only the payloads it is handed.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, warn};

use crate::asset::{AssetGenerator, CoverImage};
use crate::error::Error;
use crate::item::Item;

/// One unit of background work, tagged with the slot that asked for it.
pub struct GenerateRequest {
    pub slot: usize,
    pub item: Item,
    pub width: u32,
    pub height: u32,
    /// Buffer surrendered by the cache's oldest entry. Reclaimed for
    /// overwriting only when no slot still displays it.
    pub reuse: Option<Arc<CoverImage>>,
}

/// A finished generation, ready to be applied on the interactive thread.
pub struct GenerateResult {
    pub slot: usize,
    pub item_id: i64,
    pub cover: CoverImage,
}

/// Owns the worker thread and both channel endpoints. Requests go out in
/// submission order; results come back in the same order.
pub struct AssetPipeline {
    request_tx: Option<SyncSender<GenerateRequest>>,
    result_rx: Receiver<GenerateResult>,
    worker: Option<JoinHandle<()>>,
}

impl AssetPipeline {
    pub fn new(generator: Box<dyn AssetGenerator>, queue_bound: usize) -> Result<Self, Error> {
        let (request_tx, request_rx) = mpsc::sync_channel(queue_bound);
        let (result_tx, result_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("cover-generator".into())
            .spawn(move || worker_loop(generator, request_rx, result_tx))
            .map_err(Error::Spawn)?;
        Ok(AssetPipeline {
            request_tx: Some(request_tx),
            result_rx,
            worker: Some(worker),
        })
    }

    /// Enqueue a generation without blocking. A saturated queue drops the
    /// request; a later `set_items`/`resize` will ask again.
    pub fn submit(&self, request: GenerateRequest) -> Result<(), Error> {
        let request_tx = self.request_tx.as_ref().ok_or(Error::WorkerGone)?;
        match request_tx.try_send(request) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                warn!(
                    "generation queue full, dropping request for item {} (slot {})",
                    dropped.item.id, dropped.slot
                );
                Err(Error::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::WorkerGone),
        }
    }

    /// Drain finished generations without blocking, oldest first.
    pub fn poll(&mut self) -> Vec<GenerateResult> {
        let mut results = Vec::new();
        loop {
            match self.result_rx.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        results
    }
}

impl Drop for AssetPipeline {
    fn drop(&mut self) {
        // closing the request channel lets the worker drain and exit
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("cover generator worker panicked");
            }
        }
    }
}

fn worker_loop(
    generator: Box<dyn AssetGenerator>,
    request_rx: Receiver<GenerateRequest>,
    result_tx: mpsc::Sender<GenerateResult>,
) {
    while let Ok(request) = request_rx.recv() {
        let GenerateRequest {
            slot,
            item,
            width,
            height,
            reuse,
        } = request;
        // Reclaim the surrendered buffer unless a slot still displays it.
        let buffer = reuse.and_then(|arc| Arc::try_unwrap(arc).ok());
        debug!(
            "generating cover for item {} (slot {}, reused buffer: {})",
            item.id,
            slot,
            buffer.is_some()
        );
        match generator.generate(&item, width, height, buffer) {
            Ok(cover) => {
                let result = GenerateResult {
                    slot,
                    item_id: item.id,
                    cover,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
            Err(err) => warn!("cover generation failed for item {}: {}", item.id, err),
        }
    }
    debug!("cover generator worker exiting");
}
