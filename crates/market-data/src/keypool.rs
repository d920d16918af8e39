use pulse_core::PulseError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Default cooldown for a key that hit its quota
const DEFAULT_COOLDOWN_SECS: u64 = 60;

struct KeyState {
    key: String,
    cooling_until: Option<Instant>,
}

struct PoolState {
    keys: Vec<KeyState>,
    cursor: usize,
}

/// Round-robin pool of API keys for quota-limited vendors. A key that
/// reports a quota error is put on cooldown and skipped until it expires.
#[derive(Clone)]
pub struct ApiKeyPool {
    state: Arc<Mutex<PoolState>>,
    cooldown: Duration,
}

impl ApiKeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self::with_cooldown(keys, Duration::from_secs(DEFAULT_COOLDOWN_SECS))
    }

    pub fn with_cooldown(keys: Vec<String>, cooldown: Duration) -> Self {
        let keys = keys
            .into_iter()
            .filter(|k| !k.is_empty())
            .map(|key| KeyState {
                key,
                cooling_until: None,
            })
            .collect();

        Self {
            state: Arc::new(Mutex::new(PoolState { keys, cursor: 0 })),
            cooldown,
        }
    }

    /// Parse a comma-separated key list from an env var value.
    pub fn from_env_value(value: &str) -> Self {
        Self::new(
            value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.keys.is_empty()
    }

    /// Next usable key, round-robin. Errors when every key is cooling down
    /// (or none are configured) rather than blocking the caller.
    pub async fn acquire(&self) -> Result<String, PulseError> {
        let mut state = self.state.lock().await;
        if state.keys.is_empty() {
            return Err(PulseError::QuotaExhausted("no API keys configured".to_string()));
        }

        let now = Instant::now();
        let len = state.keys.len();

        for i in 0..len {
            let idx = (state.cursor + i) % len;
            let usable = match state.keys[idx].cooling_until {
                Some(until) if until > now => false,
                _ => true,
            };
            if usable {
                state.keys[idx].cooling_until = None;
                state.cursor = (idx + 1) % len;
                return Ok(state.keys[idx].key.clone());
            }
        }

        Err(PulseError::QuotaExhausted(format!(
            "all {} keys cooling down",
            len
        )))
    }

    /// Mark a key as quota-exhausted; it is skipped until the cooldown ends.
    pub async fn report_quota_error(&self, key: &str) {
        let mut state = self.state.lock().await;
        let until = Instant::now() + self.cooldown;
        for entry in state.keys.iter_mut() {
            if entry.key == key {
                entry.cooling_until = Some(until);
                tracing::warn!(
                    "API key ...{} on cooldown for {:?}",
                    &entry.key[entry.key.len().saturating_sub(4)..],
                    self.cooldown
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(keys: &[&str], cooldown_ms: u64) -> ApiKeyPool {
        ApiKeyPool::with_cooldown(
            keys.iter().map(|k| k.to_string()).collect(),
            Duration::from_millis(cooldown_ms),
        )
    }

    #[tokio::test]
    async fn test_round_robin_rotation() {
        let pool = pool(&["a", "b", "c"], 1000);
        assert_eq!(pool.acquire().await.unwrap(), "a");
        assert_eq!(pool.acquire().await.unwrap(), "b");
        assert_eq!(pool.acquire().await.unwrap(), "c");
        assert_eq!(pool.acquire().await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_cooling_key_is_skipped() {
        let pool = pool(&["a", "b"], 60_000);
        pool.report_quota_error("a").await;
        assert_eq!(pool.acquire().await.unwrap(), "b");
        assert_eq!(pool.acquire().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn test_all_keys_cooling_is_an_error() {
        let pool = pool(&["a"], 60_000);
        pool.report_quota_error("a").await;
        let err = pool.acquire().await.unwrap_err();
        assert!(matches!(err, PulseError::QuotaExhausted(_)));
    }

    #[tokio::test]
    async fn test_cooldown_expires() {
        let pool = pool(&["a"], 50);
        pool.report_quota_error("a").await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(pool.acquire().await.unwrap(), "a");
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let pool = ApiKeyPool::from_env_value(" , ,");
        assert!(pool.is_empty().await);
        assert!(pool.acquire().await.is_err());
    }
}
