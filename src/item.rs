use std::path::PathBuf;

/// Identifier value meaning "no item", e.g. no previous track at the start
/// of a playlist.
pub const NO_ITEM_ID: i64 = -1;

/// A playable item occupying one carousel slot. Owned by the upstream
/// source; the carousel only keeps it while it sits in a slot. Carries the
/// metadata a cover generator typically renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub art_path: Option<PathBuf>,
}

impl Item {
    pub fn with_id(id: i64) -> Self {
        Item {
            id,
            title: None,
            artist: None,
            album: None,
            art_path: None,
        }
    }

    /// Whether this is the "no item" sentinel.
    pub fn is_none(&self) -> bool {
        self.id == NO_ITEM_ID
    }
}

/// Supplies the (previous, current, next) triple on demand. Queried after
/// every navigation commit to refill the vacated edge slot.
pub trait ItemSource {
    fn triple(&self) -> (Option<Item>, Option<Item>, Option<Item>);
}
