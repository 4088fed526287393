pub mod inflight;
pub mod token;
pub mod token_cache;
