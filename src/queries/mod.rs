// Cached reads and cache-invalidating writes on top of the services
//
// Reads go through the query cache under an ordered key and can be disabled
// while their parameters are incomplete. Writes invalidate the list keys of
// their resource on success; the new state shows up on the next read.
// Both surface errors as a plain message.

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{EntrySnapshot, QueryCache, QueryKey, QueryStatus};
use crate::config::CacheConfig;
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::models::RecordId;

pub mod cinemas;
pub mod combos;
pub mod discounts;
pub mod genres;
pub mod keys;
pub mod movies;
pub mod payments;
pub mod rooms;
pub mod seats;
pub mod session;
pub mod statistics;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    pub key: QueryKey,
    pub enabled: bool,
}

impl QueryOptions {
    pub fn new(key: QueryKey) -> Self {
        Self { key, enabled: true }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<String>,
    pub is_fetching: bool,
}

impl<T> QueryResult<T> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

impl<T: Default> QueryResult<T> {
    // Collections read as empty until resolved
    pub fn data_or_default(&self) -> T
    where
        T: Clone,
    {
        self.data.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> MutationResult<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

// Select value for the cinema filter; "all" disables cinema-scoped reads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CinemaFilter {
    #[default]
    All,
    Cinema(RecordId),
}

impl CinemaFilter {
    pub fn cinema_id(&self) -> Option<&RecordId> {
        match self {
            CinemaFilter::All => None,
            CinemaFilter::Cinema(id) => Some(id),
        }
    }
}

impl FromStr for CinemaFilter {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Ok(CinemaFilter::All);
        }
        Ok(match value.parse::<i64>() {
            Ok(id) => CinemaFilter::Cinema(RecordId::Number(id)),
            Err(_) => CinemaFilter::Cinema(RecordId::Text(value.to_string())),
        })
    }
}

// The concrete cinema of an optional filter, if any
pub(crate) fn selected_cinema(filter: Option<&CinemaFilter>) -> Option<RecordId> {
    filter.and_then(CinemaFilter::cinema_id).cloned()
}

#[derive(Clone)]
pub struct QueryClient {
    http: HttpClient,
    cache: Arc<QueryCache>,
}

impl QueryClient {
    pub fn new(http: HttpClient, config: CacheConfig) -> Self {
        Self::with_cache(http, Arc::new(QueryCache::new(config)))
    }

    pub fn with_cache(http: HttpClient, cache: Arc<QueryCache>) -> Self {
        Self { http, cache }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    // Runs a cached read. A disabled read never touches the network and
    // reports `Idle`.
    pub async fn query<T, F, Fut>(&self, options: QueryOptions, fetcher: F) -> QueryResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if !options.enabled {
            return QueryResult::idle();
        }

        match self.cache.fetch(options.key.clone(), fetcher).await {
            Ok(value) => match value.downcast::<T>() {
                Ok(data) => QueryResult {
                    status: QueryStatus::Success,
                    data: Some((*data).clone()),
                    error: None,
                    is_fetching: false,
                },
                Err(_) => mismatched_type(&options.key),
            },
            Err(message) => {
                let previous = self.peek::<T>(&options);
                QueryResult {
                    status: QueryStatus::Error,
                    data: previous.data,
                    error: Some(message),
                    is_fetching: false,
                }
            }
        }
    }

    // Current cached state of a read without fetching
    pub fn peek<T>(&self, options: &QueryOptions) -> QueryResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if !options.enabled {
            return QueryResult::idle();
        }
        let EntrySnapshot {
            status,
            value,
            error,
            is_fetching,
        } = self.cache.snapshot(&options.key);

        let data = match value.map(|value| value.downcast::<T>()) {
            Some(Ok(data)) => Some((*data).clone()),
            Some(Err(_)) => return mismatched_type(&options.key),
            None => None,
        };
        QueryResult {
            status,
            data,
            error,
            is_fetching,
        }
    }

    // Runs a write and, only if it succeeds, invalidates every key under
    // the given prefixes. Nothing is written to the cache optimistically.
    pub async fn mutate<T, Fut>(&self, invalidates: &[QueryKey], write: Fut) -> MutationResult<T>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match write.await {
            Ok(data) => {
                for prefix in invalidates {
                    self.cache.invalidate(prefix);
                }
                MutationResult {
                    data: Some(data),
                    error: None,
                }
            }
            Err(e) => MutationResult {
                data: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.cache.invalidate(prefix)
    }
}

fn mismatched_type<T>(key: &QueryKey) -> QueryResult<T> {
    QueryResult {
        status: QueryStatus::Error,
        data: None,
        error: Some(format!("cached value for {} has an unexpected type", key)),
        is_fetching: false,
    }
}

// A read bound to a key that changes over time, like a list whose filters
// the user keeps editing.
//
// Only the response for the most recently observed key is kept; a slower
// response for a key the observer already left never replaces it.
pub struct QueryObserver<T> {
    client: QueryClient,
    current: Mutex<Option<QueryKey>>,
    latest: Mutex<QueryResult<T>>,
}

impl<T> QueryObserver<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(client: QueryClient) -> Self {
        Self {
            client,
            current: Mutex::new(None),
            latest: Mutex::new(QueryResult::idle()),
        }
    }

    pub async fn observe<F, Fut>(&self, options: QueryOptions, fetcher: F) -> QueryResult<T>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        *self.current.lock() = Some(options.key.clone());
        let mut pending = self.client.peek(&options);
        // Cached data stays visible while the new key loads
        if options.enabled {
            pending.status = QueryStatus::Loading;
            pending.is_fetching = true;
        }
        *self.latest.lock() = pending;

        let result = self.client.query(options.clone(), fetcher).await;

        let current = self.current.lock().clone();
        let mut latest = self.latest.lock();
        if current.as_ref() == Some(&options.key) {
            *latest = result;
        }
        latest.clone()
    }

    pub fn result(&self) -> QueryResult<T> {
        self.latest.lock().clone()
    }

    pub fn current_key(&self) -> Option<QueryKey> {
        self.current.lock().clone()
    }
}
