// Shared dashboard data
//
// Composes the four reads most dashboard views need into one value. The
// provider is scoped to a task; reading it outside that scope is a
// programming error and reported as `ContextError::OutsideProvider`.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::error::ContextError;
use crate::models::{Cinema, Movie, MovieStatus, Room};
use crate::queries::{keys, selected_cinema, CinemaFilter, QueryClient, QueryOptions, QueryResult};

tokio::task_local! {
    static DASHBOARD: Arc<DashboardDataProvider>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub now_showing: Vec<Movie>,
    pub coming_soon: Vec<Movie>,
    pub cinemas: Vec<Cinema>,
    pub screens: Vec<Room>,
    pub is_loading: bool,
}

pub struct DashboardDataProvider {
    client: QueryClient,
    selected_cinema: CinemaFilter,
}

impl DashboardDataProvider {
    pub fn new(client: QueryClient, selected_cinema: CinemaFilter) -> Self {
        Self {
            client,
            selected_cinema,
        }
    }

    pub fn selected_cinema(&self) -> &CinemaFilter {
        &self.selected_cinema
    }

    // The provider of the enclosing `provide` scope.
    pub fn current() -> Result<Arc<Self>, ContextError> {
        DASHBOARD
            .try_with(Arc::clone)
            .map_err(|_| ContextError::OutsideProvider)
    }

    // Runs all four reads concurrently and waits for them
    pub async fn load(&self) -> DashboardData {
        debug!(cinema = ?self.selected_cinema, "Loading dashboard data");
        let (now_showing, coming_soon, cinemas, screens) = futures::join!(
            self.client.movies(MovieStatus::NowShowing),
            self.client.movies(MovieStatus::ComingSoon),
            self.client.cinemas(),
            self.client.screens_by_cinema(Some(&self.selected_cinema)),
        );
        compose(now_showing, coming_soon, cinemas, screens)
    }

    // Cached state of the four reads, without fetching.
    pub fn snapshot(&self) -> DashboardData {
        let cinema_id = selected_cinema(Some(&self.selected_cinema));
        let screens = QueryOptions::new(keys::screens_by_cinema(cinema_id.as_ref()))
            .enabled(cinema_id.is_some());

        compose(
            self.client
                .peek(&QueryOptions::new(keys::movies(MovieStatus::NowShowing))),
            self.client
                .peek(&QueryOptions::new(keys::movies(MovieStatus::ComingSoon))),
            self.client.peek(&QueryOptions::new(keys::cinemas())),
            self.client.peek(&screens),
        )
    }
}

fn compose(
    now_showing: QueryResult<Vec<Movie>>,
    coming_soon: QueryResult<Vec<Movie>>,
    cinemas: QueryResult<Vec<Cinema>>,
    screens: QueryResult<Vec<Room>>,
) -> DashboardData {
    let is_loading = in_flight(&now_showing)
        || in_flight(&coming_soon)
        || in_flight(&cinemas)
        || in_flight(&screens);

    DashboardData {
        now_showing: now_showing.data.unwrap_or_default(),
        coming_soon: coming_soon.data.unwrap_or_default(),
        cinemas: cinemas.data.unwrap_or_default(),
        screens: screens.data.unwrap_or_default(),
        is_loading,
    }
}

fn in_flight<T>(result: &QueryResult<T>) -> bool {
    result.is_loading() || result.is_fetching
}

// Runs `future` with `provider` available through
// `DashboardDataProvider::current`.
pub async fn provide<F>(provider: Arc<DashboardDataProvider>, future: F) -> F::Output
where
    F: Future,
{
    DASHBOARD.scope(provider, future).await
}

pub async fn dashboard_data() -> Result<DashboardData, ContextError> {
    let provider = DashboardDataProvider::current()?;
    Ok(provider.load().await)
}
