//! Weather Cache
//!
//! Two-tier cache in front of a weather provider: an in-memory map, then
//! persistent key/value storage, then the network. Nearby coordinates share
//! a slot because keys are rounded to two decimals.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::weather::{
    moon_phase, CacheEntry, Clock, KeyValueStorage, SystemClock, WeatherProvider,
    WeatherSnapshot, WeatherStats,
};

/// Namespace for weather entries in persistent storage.
pub const STORAGE_PREFIX: &str = "weather_";

/// How long a snapshot stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on a single provider call.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Cache slot for a coordinate, rounded to ~1.1 km.
pub fn cache_key(lat: f64, lon: f64) -> String {
    format!("{:.2}_{:.2}", lat, lon)
}

fn storage_key(key: &str) -> String {
    format!("{STORAGE_PREFIX}{key}")
}

type MemoryEntry = CacheEntry<Arc<WeatherSnapshot>>;

// == Weather Cache ==
pub struct WeatherCache {
    provider: Arc<dyn WeatherProvider>,
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    fetch_timeout: Duration,
    memory: RwLock<HashMap<String, MemoryEntry>>,
    /// One lock per key with a lookup in progress
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    stats: Mutex<WeatherStats>,
}

impl WeatherCache {
    // == Constructor ==
    /// Creates an empty cache with the default TTL, timeout and system clock.
    ///
    /// Call [`WeatherCache::warm_from_storage`] afterwards to pick up entries
    /// persisted by an earlier run.
    pub fn new(provider: Arc<dyn WeatherProvider>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            provider,
            storage,
            clock: Arc::new(SystemClock),
            ttl: DEFAULT_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            memory: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            stats: Mutex::new(WeatherStats::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }

    // == Get ==
    /// Current weather at a coordinate, or None when nothing valid is cached
    /// and the provider fails. Never errors.
    pub async fn get(&self, lat: f64, lon: f64) -> Option<Arc<WeatherSnapshot>> {
        if !lat.is_finite() || !lon.is_finite() {
            warn!("Ignoring weather lookup for non-finite coordinates ({lat}, {lon})");
            return None;
        }
        let key = cache_key(lat, lon);

        if let Some(hit) = self.memory_lookup(&key).await {
            return Some(hit);
        }

        // Callers for the same key queue here; the first one fetches and the
        // rest find the memory tier filled.
        let gate = self.gate_for(&key).await;
        let guard = gate.lock().await;

        let result = match self.memory_lookup(&key).await {
            Some(hit) => Some(hit),
            None => match self.storage_lookup(&key).await {
                Some(hit) => Some(hit),
                None => self.fetch(lat, lon, &key).await,
            },
        };

        drop(guard);
        self.release_gate(&key, gate).await;
        result
    }

    async fn gate_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_gate(&self, key: &str, gate: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        drop(gate);
        // Only the map still holds it: nobody else is waiting on this key
        if in_flight
            .get(key)
            .is_some_and(|existing| Arc::strong_count(existing) == 1)
        {
            in_flight.remove(key);
        }
    }

    async fn memory_lookup(&self, key: &str) -> Option<Arc<WeatherSnapshot>> {
        let now = self.clock.now_ms();
        let hit = {
            let memory = self.memory.read().await;
            memory
                .get(key)
                .filter(|entry| entry.is_valid(now, self.ttl_ms()))
                .map(|entry| (Arc::clone(&entry.value), entry.age_minutes(now)))
        };

        let (snapshot, age) = hit?;
        debug!("Weather for {} served from memory ({} min old)", key, age);
        self.stats.lock().await.record_memory_hit();
        Some(snapshot)
    }

    async fn storage_lookup(&self, key: &str) -> Option<Arc<WeatherSnapshot>> {
        let now = self.clock.now_ms();
        let entry = self.read_stored(key)?;
        if !entry.is_valid(now, self.ttl_ms()) {
            debug!("Stored weather for {} is stale", key);
            return None;
        }

        debug!(
            "Weather for {} served from storage ({} min old)",
            key,
            entry.age_minutes(now)
        );
        let entry = entry.map(Arc::new);
        let snapshot = Arc::clone(&entry.value);
        self.memory.write().await.insert(key.to_string(), entry);
        self.stats.lock().await.record_storage_hit();
        Some(snapshot)
    }

    /// Reads and parses a persisted entry; every failure is a miss.
    fn read_stored(&self, key: &str) -> Option<CacheEntry<WeatherSnapshot>> {
        let raw = match self.storage.get_item(&storage_key(key)) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Weather storage read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Discarding unreadable weather entry {}: {}", key, e);
                None
            }
        }
    }

    async fn fetch(&self, lat: f64, lon: f64, key: &str) -> Option<Arc<WeatherSnapshot>> {
        debug!("Fetching weather for {} from provider", key);

        let conditions = match tokio::time::timeout(
            self.fetch_timeout,
            self.provider.current_conditions(lat, lon),
        )
        .await
        {
            Ok(Ok(conditions)) => conditions,
            Ok(Err(e)) => {
                warn!("Weather fetch failed for {}: {}", key, e);
                self.stats.lock().await.record_failure();
                return None;
            }
            Err(_) => {
                warn!(
                    "Weather fetch for {} timed out after {:?}",
                    key, self.fetch_timeout
                );
                self.stats.lock().await.record_failure();
                return None;
            }
        };

        let snapshot = Arc::new(conditions.into_snapshot(moon_phase(self.clock.today())));
        let now = self.clock.now_ms();

        self.persist(key, &snapshot, now);
        self.memory
            .write()
            .await
            .insert(key.to_string(), CacheEntry::new(Arc::clone(&snapshot), now));
        self.stats.lock().await.record_fetch();

        info!("Weather for {} fetched and cached", key);
        Some(snapshot)
    }

    fn persist(&self, key: &str, snapshot: &WeatherSnapshot, now: u64) {
        let raw = match serde_json::to_string(&CacheEntry::new(snapshot, now)) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize weather for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(&storage_key(key), &raw) {
            warn!("Could not persist weather for {}: {}", key, e);
        }
    }

    // == Warm From Storage ==
    /// Loads every still-valid persisted entry into memory.
    ///
    /// Returns the number of entries loaded.
    pub async fn warm_from_storage(&self) -> usize {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not list weather storage: {}", e);
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let mut loaded = 0;
        let mut memory = self.memory.write().await;
        for key in keys.iter().filter_map(|k| k.strip_prefix(STORAGE_PREFIX)) {
            if let Some(entry) = self.read_stored(key) {
                if entry.is_valid(now, self.ttl_ms()) {
                    memory.insert(key.to_string(), entry.map(Arc::new));
                    loaded += 1;
                }
            }
        }

        info!("Loaded {} cached weather entries from storage", loaded);
        loaded
    }

    // == Purge Expired ==
    /// Removes expired or unreadable entries from storage and memory.
    ///
    /// Returns the number of persisted entries removed.
    pub async fn purge_expired(&self) -> usize {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not list weather storage: {}", e);
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let ttl_ms = self.ttl_ms();
        let mut removed = 0;
        let mut memory = self.memory.write().await;

        for stored_key in keys.iter().filter(|k| k.starts_with(STORAGE_PREFIX)) {
            let key = &stored_key[STORAGE_PREFIX.len()..];
            let keep = self
                .read_stored(key)
                .is_some_and(|entry| entry.is_valid(now, ttl_ms));
            if keep {
                continue;
            }
            if let Err(e) = self.storage.remove_item(stored_key) {
                warn!("Could not remove weather entry {}: {}", key, e);
                continue;
            }
            memory.remove(key);
            removed += 1;
        }
        memory.retain(|_, entry| entry.is_valid(now, ttl_ms));

        if removed > 0 {
            info!("Purged {} expired weather entries", removed);
        } else {
            debug!("Weather purge: nothing expired");
        }
        removed
    }

    // == Stats ==
    pub async fn stats(&self) -> WeatherStats {
        let mut stats = self.stats.lock().await.clone();
        stats.set_memory_entries(self.memory.read().await.len());
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AtlasError, Result};
    use crate::weather::{CurrentConditions, ManualClock, MemoryStorage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// 2024-01-25T12:00:00Z, a full moon
    const START_MS: u64 = 1_706_184_000_000;

    struct StubProvider {
        calls: AtomicUsize,
        fail: AtomicBool,
        delay: Duration,
    }

    impl StubProvider {
        fn new() -> Self {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current_conditions(&self, _lat: f64, _lon: f64) -> Result<CurrentConditions> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AtlasError::Provider("stub failure".to_string()));
            }
            Ok(CurrentConditions {
                temperature: 12.4,
                apparent_temperature: 10.6,
                humidity: 65.0,
                wind_speed: 8.0,
                wind_direction: 270.0,
                cloud_cover: 20.0,
                weather_code: 1,
                ..Default::default()
            })
        }
    }

    struct Fixture {
        provider: Arc<StubProvider>,
        storage: Arc<MemoryStorage>,
        clock: Arc<ManualClock>,
        cache: WeatherCache,
    }

    fn fixture_with(provider: StubProvider, storage: MemoryStorage) -> Fixture {
        let provider = Arc::new(provider);
        let storage = Arc::new(storage);
        let clock = Arc::new(ManualClock::new(START_MS));
        let cache = WeatherCache::new(provider.clone(), storage.clone()).with_clock(clock.clone());
        Fixture {
            provider,
            storage,
            clock,
            cache,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(StubProvider::new(), MemoryStorage::new())
    }

    #[test]
    fn test_cache_key_rounds_to_two_decimals() {
        assert_eq!(cache_key(46.4528, 6.5395), "46.45_6.54");
        assert_eq!(cache_key(47.0, 8.0), "47.00_8.00");
        assert_eq!(cache_key(46.4531, 6.5412), cache_key(46.4528, 6.5395));
    }

    #[tokio::test]
    async fn test_second_get_within_ttl_hits_memory() {
        let f = fixture();

        let first = f.cache.get(46.4528, 6.5395).await.unwrap();
        f.clock.advance(Duration::from_secs(29 * 60));
        let second = f.cache.get(46.4528, 6.5395).await.unwrap();

        assert_eq!(f.provider.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.description, "Mainly clear");
        assert_eq!(first.temperature, 12);
        assert_eq!(first.moon_phase, "Full Moon");
    }

    #[tokio::test]
    async fn test_nearby_coordinates_share_a_slot() {
        let f = fixture();
        f.cache.get(46.4528, 6.5395).await.unwrap();
        f.cache.get(46.4531, 6.5412).await.unwrap();
        assert_eq!(f.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_new_fetch() {
        let f = fixture();

        let first = f.cache.get(47.0, 8.0).await.unwrap();
        f.clock.advance(DEFAULT_TTL);
        let second = f.cache.get(47.0, 8.0).await.unwrap();

        assert_eq!(f.provider.calls(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_fetch_writes_both_tiers() {
        let f = fixture();
        f.cache.get(47.0, 8.0).await.unwrap();

        let raw = f.storage.get_item("weather_47.00_8.00").unwrap().unwrap();
        let entry: CacheEntry<WeatherSnapshot> = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.created_at, START_MS);
        assert_eq!(entry.value.humidity, 65.0);
        assert_eq!(f.cache.stats().await.memory_entries, 1);
    }

    #[tokio::test]
    async fn test_storage_hit_is_promoted() {
        let f = fixture();
        f.cache.get(47.0, 8.0).await.unwrap();

        // New cache, same storage: simulates a restart
        let restarted = WeatherCache::new(f.provider.clone(), f.storage.clone())
            .with_clock(f.clock.clone());
        let from_storage = restarted.get(47.0, 8.0).await.unwrap();
        let from_memory = restarted.get(47.0, 8.0).await.unwrap();

        assert_eq!(f.provider.calls(), 1);
        assert!(Arc::ptr_eq(&from_storage, &from_memory));
        let stats = restarted.stats().await;
        assert_eq!(stats.storage_hits, 1);
        assert_eq!(stats.memory_hits, 1);
    }

    #[tokio::test]
    async fn test_stale_storage_entry_is_refetched() {
        let f = fixture();
        f.cache.get(47.0, 8.0).await.unwrap();
        f.clock.advance(Duration::from_secs(31 * 60));

        let restarted = WeatherCache::new(f.provider.clone(), f.storage.clone())
            .with_clock(f.clock.clone());
        restarted.get(47.0, 8.0).await.unwrap();
        assert_eq!(f.provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_provider_failure_returns_none() {
        let f = fixture();
        f.provider.fail.store(true, Ordering::SeqCst);

        assert!(f.cache.get(47.0, 8.0).await.is_none());
        let stats = f.cache.stats().await;
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.memory_entries, 0);
        assert!(f.storage.keys().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_timeout_returns_none() {
        let f = fixture_with(
            StubProvider::with_delay(Duration::from_secs(5)),
            MemoryStorage::new(),
        );
        let cache = f.cache.with_fetch_timeout(Duration::from_millis(50));
        assert!(cache.get(47.0, 8.0).await.is_none());
        assert_eq!(cache.stats().await.failures, 1);
    }

    #[tokio::test]
    async fn test_non_finite_coordinates_return_none() {
        let f = fixture();
        assert!(f.cache.get(f64::NAN, 8.0).await.is_none());
        assert_eq!(f.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_storage_quota_failure_still_returns_weather() {
        let f = fixture_with(StubProvider::new(), MemoryStorage::with_quota(10));
        let snapshot = f.cache.get(47.0, 8.0).await;
        assert!(snapshot.is_some());
        assert!(f.storage.keys().unwrap().is_empty());

        // Memory tier still works
        f.cache.get(47.0, 8.0).await.unwrap();
        assert_eq!(f.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_storage_entry_is_a_miss() {
        let f = fixture();
        f.storage.set_item("weather_47.00_8.00", "{ not json").unwrap();

        assert!(f.cache.get(47.0, 8.0).await.is_some());
        assert_eq!(f.provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_fetch() {
        let f = fixture_with(
            StubProvider::with_delay(Duration::from_millis(100)),
            MemoryStorage::new(),
        );
        let cache = Arc::new(f.cache);

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get(46.0, 8.0).await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(f.provider.calls(), 1);
        assert!(results.iter().all(|s| Arc::ptr_eq(s, &results[0])));
        assert!(cache.in_flight.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_warm_from_storage_loads_valid_entries() {
        let f = fixture();
        f.cache.get(47.0, 8.0).await.unwrap();
        f.clock.advance(Duration::from_secs(10 * 60));
        f.cache.get(46.0, 7.0).await.unwrap();
        f.storage.set_item("unrelated", "x").unwrap();

        // 25 minutes after the first fetch: both still valid
        f.clock.advance(Duration::from_secs(15 * 60));
        let restarted = WeatherCache::new(f.provider.clone(), f.storage.clone())
            .with_clock(f.clock.clone());
        assert_eq!(restarted.warm_from_storage().await, 2);

        // 35 minutes: only the second one
        f.clock.advance(Duration::from_secs(10 * 60));
        let restarted = WeatherCache::new(f.provider.clone(), f.storage.clone())
            .with_clock(f.clock.clone());
        assert_eq!(restarted.warm_from_storage().await, 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let f = fixture();
        f.cache.get(47.0, 8.0).await.unwrap();
        f.clock.advance(Duration::from_secs(20 * 60));
        f.cache.get(46.0, 7.0).await.unwrap();
        f.storage.set_item("weather_broken", "garbage").unwrap();
        f.storage.set_item("other_app_key", "keep me").unwrap();

        // First entry is now 31 minutes old, second 11
        f.clock.advance(Duration::from_secs(11 * 60));
        let removed = f.cache.purge_expired().await;

        assert_eq!(removed, 2);
        let mut keys = f.storage.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["other_app_key", "weather_46.00_7.00"]);
        assert_eq!(f.cache.stats().await.memory_entries, 1);

        // Idempotent
        assert_eq!(f.cache.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let f = fixture();
        let cache = f.cache.with_ttl(Duration::from_secs(60));
        cache.get(47.0, 8.0).await.unwrap();
        f.clock.advance(Duration::from_secs(61));
        cache.get(47.0, 8.0).await.unwrap();
        assert_eq!(f.provider.calls(), 2);
        assert_eq!(cache.ttl(), Duration::from_secs(60));
    }
}
