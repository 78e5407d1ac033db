mod cover_cache;

pub use cover_cache::CoverCache;
