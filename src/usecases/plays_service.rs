//! Fetches play logs per user, cache first.

use crate::domain::{DateRange, DomainError, PlaySession, PlaysByUser};
use crate::ports::{BggGateway, PlaysCache, ProgressPort};
use std::sync::Arc;
use tracing::{debug, info};

/// Play-log fetching. Users are processed one at a time, in order.
pub struct PlaysService {
    gateway: Arc<dyn BggGateway>,
    cache: Arc<dyn PlaysCache>,
    progress: Arc<dyn ProgressPort>,
}

impl PlaysService {
    pub fn new(
        gateway: Arc<dyn BggGateway>,
        cache: Arc<dyn PlaysCache>,
        progress: Arc<dyn ProgressPort>,
    ) -> Self {
        Self {
            gateway,
            cache,
            progress,
        }
    }

    /// Plays for one user. Cached logs are returned as stored, whatever `range`
    /// they were fetched with.
    pub async fn plays_for(
        &self,
        user: &str,
        range: DateRange,
    ) -> Result<Vec<PlaySession>, DomainError> {
        if let Some(plays) = self.cache.get_plays(user).await? {
            debug!(user, count = plays.len(), "plays cache hit");
            return Ok(plays);
        }
        info!(user, %range, "getting plays for user");
        let plays = self.gateway.fetch_plays(user, range).await?;
        self.cache.put_plays(user, &plays).await?;
        Ok(plays)
    }

    /// Plays for every user, keeping the input order.
    pub async fn plays_for_users(
        &self,
        users: &[String],
        range: DateRange,
    ) -> Result<PlaysByUser, DomainError> {
        self.progress.start("plays", users.len());
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let plays = self.plays_for(user, range).await?;
            self.progress.advance(user);
            out.push((user.clone(), plays));
        }
        self.progress.finish();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ui::SilentProgress;
    use crate::test_support::{FakeGateway, MemoryCache, range_2014, session};

    fn service(gateway: Arc<FakeGateway>, cache: Arc<MemoryCache>) -> PlaysService {
        PlaysService::new(gateway, cache, Arc::new(SilentProgress))
    }

    #[tokio::test]
    async fn test_users_kept_in_input_order_and_cached() {
        let gateway = Arc::new(
            FakeGateway::new()
                .with_plays("boyuki", vec![session(2, "boyuki", 13, "2014-03-03")])
                .with_plays("avlawn", vec![session(1, "avlawn", 822, "2014-03-10")]),
        );
        let cache = Arc::new(MemoryCache::default());
        let plays = service(gateway.clone(), cache.clone());

        let users = vec!["boyuki".to_string(), "avlawn".to_string(), "ghost".to_string()];
        let by_user = plays.plays_for_users(&users, range_2014()).await.unwrap();
        let names: Vec<&str> = by_user.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(names, vec!["boyuki", "avlawn", "ghost"]);
        assert_eq!(by_user[0].1[0].game_id, 13);
        assert!(by_user[2].1.is_empty());
        assert_eq!(gateway.plays_calls(), 3);

        // Second run: everything from cache, including the empty log.
        plays.plays_for_users(&users, range_2014()).await.unwrap();
        assert_eq!(gateway.plays_calls(), 3);
        assert_eq!(cache.get_plays("ghost").await.unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_remote_failure_aborts() {
        let gateway = Arc::new(FakeGateway::new().failing_plays("avlawn"));
        let plays = service(gateway, Arc::new(MemoryCache::default()));
        let users = vec!["avlawn".to_string()];
        let err = plays.plays_for_users(&users, range_2014()).await.unwrap_err();
        assert!(matches!(err, DomainError::Remote(_)));
    }
}
