//! Transient notifications that dismiss themselves.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The feed was refreshed.
    Updated,
    /// A page failed to load.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    expires_at: Instant,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            kind,
            text: text.into(),
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Drop `notice` once it has outlived its TTL.
pub fn expire(notice: &mut Option<Notice>, now: Instant) {
    if notice.as_ref().is_some_and(|n| n.is_expired(now)) {
        *notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_ttl() {
        let now = Instant::now();
        let mut notice = Some(Notice::new(
            NoticeKind::Updated,
            "Feed updated",
            now,
            Duration::from_secs(2),
        ));

        expire(&mut notice, now + Duration::from_millis(1999));
        assert!(notice.is_some());

        expire(&mut notice, now + Duration::from_secs(2));
        assert!(notice.is_none());
    }
}
