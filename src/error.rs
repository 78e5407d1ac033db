use thiserror::Error;

/// Failures the carousel can run into. All of them are absorbed at the
/// pipeline/controller boundary (logged, never fatal); the worst visible
/// outcome is a blank tile until a later request re-renders it.
#[derive(Debug, Error)]
pub enum Error {
    /// The asset generator failed for an item. The slot keeps whatever
    /// cover it was already showing; no retry is scheduled.
    #[error("cover generation failed for item {id}: {reason}")]
    Generate { id: i64, reason: String },

    /// The bounded generation queue is saturated and the request was
    /// dropped. A later `set_items`/`resize` re-requests the slot.
    #[error("generation queue full, request dropped")]
    QueueFull,

    /// The generation worker or one of its channels is gone.
    #[error("generation worker disconnected")]
    WorkerGone,

    /// The generation worker thread could not be spawned.
    #[error("failed to spawn generation worker")]
    Spawn(#[source] std::io::Error),
}

impl Error {
    pub fn generate(id: i64, reason: impl Into<String>) -> Self {
        Error::Generate {
            id,
            reason: reason.into(),
        }
    }
}
