// Data-access layer for the cinema admin dashboard

pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod http;
pub mod models;
pub mod navigation;
pub mod queries;
pub mod services;

#[cfg(test)]
mod mock_server;

// Re-export key types for convenience
pub use auth::{AuthEvent, AuthSession, FileTokenStore, LogoutReason, MemoryTokenStore, TokenStore};
pub use cache::{CacheStatsReport, QueryCache, QueryKey, QueryStatus};
pub use config::{CacheConfig, ClientConfig, FilterConfig};
pub use context::{dashboard_data, provide, DashboardData, DashboardDataProvider};
pub use debounce::{Debounced, FilterControls, Timer, TimerHandle};
pub use error::{ApiError, ClientError, ContextError};
pub use http::{HttpClient, ReqwestTransport, Transport};
pub use navigation::{Navigator, SessionCoordinator, LOGIN_ROUTE};
pub use queries::{
    CinemaFilter, MutationResult, QueryClient, QueryObserver, QueryOptions, QueryResult,
};
