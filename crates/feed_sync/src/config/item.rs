use serde::{Deserialize, Serialize};

/// Concurrency caps for a single polling pass.
#[derive(Serialize, Deserialize, Clone)]
pub struct ConcurrentLimit {
    pub source: usize,
    pub thumbnail: usize,
    pub rate_limit: Option<RateLimit>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct RateLimit {
    pub limit: usize,
    pub duration: u64,
}

impl Default for ConcurrentLimit {
    fn default() -> Self {
        Self {
            source: 3,
            thumbnail: 4,
            // allow 4 requests every 250ms by default
            rate_limit: Some(RateLimit {
                limit: 4,
                duration: 250,
            }),
        }
    }
}
