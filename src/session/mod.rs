/// Generations allowed per session on the free tier.
pub const FREE_TIER_LIMIT: u32 = 1;

pub const UPGRADE_URL: &str = "https://your-gumroad-link.com";

/// Per-session generation counter. Advisory only: a new session starts at
/// zero and nothing is persisted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionUsage {
    count: u32,
}

impl SessionUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn limit_reached(&self) -> bool {
        self.count >= FREE_TIER_LIMIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_allows_one_generation() {
        let mut s = SessionUsage::new();
        assert_eq!(s.count(), 0);
        assert!(!s.limit_reached());
        s.increment();
        assert_eq!(s.count(), 1);
        assert!(s.limit_reached());
    }

    #[test]
    fn restart_resets_count() {
        let mut s = SessionUsage::new();
        s.increment();
        s = SessionUsage::new();
        assert!(!s.limit_reached());
    }
}
