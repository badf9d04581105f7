//! Atomic view-limit counter.

use std::sync::Arc;

use tracing::debug;

use spaceshare_core::result::AppResult;
use spaceshare_core::types::id::ShareLinkId;
use spaceshare_database::ShareLinkStore;

/// Outcome of one admission attempt against the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The view was counted.
    Counted {
        /// Count after this admission.
        view_count: u32,
    },
    /// Every allowed view is used.
    Exhausted,
    /// The link vanished or was revoked.
    Unavailable,
}

/// Counts admitted views with compare-and-swap on the stored count.
///
/// A failed swap means another admission or a revocation landed first, so
/// the retry loop runs at most `view_limit` times.
#[derive(Debug, Clone)]
pub struct ViewLimitCounter {
    share_links: Arc<dyn ShareLinkStore>,
}

impl ViewLimitCounter {
    /// Creates a counter over the link store.
    pub fn new(share_links: Arc<dyn ShareLinkStore>) -> Self {
        Self { share_links }
    }

    /// Count one admitted view if capacity remains.
    pub async fn try_admit(&self, id: ShareLinkId) -> AppResult<Admission> {
        loop {
            let Some(snapshot) = self.share_links.counter_snapshot(id).await? else {
                return Ok(Admission::Unavailable);
            };
            if !snapshot.active {
                return Ok(Admission::Unavailable);
            }

            let Some(limit) = snapshot.view_limit else {
                return Ok(match self.share_links.increment_unlimited(id).await? {
                    Some(view_count) => Admission::Counted { view_count },
                    None => Admission::Unavailable,
                });
            };

            if snapshot.view_count >= limit {
                return Ok(Admission::Exhausted);
            }
            if self
                .share_links
                .compare_and_increment(id, snapshot.view_count)
                .await?
            {
                return Ok(Admission::Counted {
                    view_count: snapshot.view_count + 1,
                });
            }
            debug!(share_id = %id, expected = snapshot.view_count, "View counter contended, retrying");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::testing::{Harness, open_request};

    #[tokio::test]
    async fn test_limited_counter_stops_at_limit() {
        let h = Harness::new();
        let mut req = open_request();
        req.view_limit = Some(2);
        let link = h.issuance.issue(&h.owner, &req).await.unwrap().link;

        let counter = ViewLimitCounter::new(h.stores.share_links.clone());
        assert_eq!(
            counter.try_admit(link.id).await.unwrap(),
            Admission::Counted { view_count: 1 }
        );
        assert_eq!(
            counter.try_admit(link.id).await.unwrap(),
            Admission::Counted { view_count: 2 }
        );
        assert_eq!(counter.try_admit(link.id).await.unwrap(), Admission::Exhausted);
    }

    #[tokio::test]
    async fn test_unlimited_and_revoked() {
        let h = Harness::new();
        let link = h.issuance.issue(&h.owner, &open_request()).await.unwrap().link;
        let counter = ViewLimitCounter::new(h.stores.share_links.clone());

        for expected in 1..=5 {
            assert_eq!(
                counter.try_admit(link.id).await.unwrap(),
                Admission::Counted { view_count: expected }
            );
        }

        h.stores.share_links.revoke(link.id, Utc::now()).await.unwrap();
        assert_eq!(counter.try_admit(link.id).await.unwrap(), Admission::Unavailable);
        assert_eq!(
            counter.try_admit(ShareLinkId::new()).await.unwrap(),
            Admission::Unavailable
        );
    }
}
