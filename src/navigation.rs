// Top-level reaction to auth events
//
// The data layer only reports that the session ended; this coordinator is
// the single place that turns that into a navigation to the login view.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::auth::{AuthEvent, AuthSession};

pub const LOGIN_ROUTE: &str = "/login";

pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

pub struct SessionCoordinator;

impl SessionCoordinator {
    // Runs until every handle to the session is dropped
    pub fn spawn(session: &AuthSession, navigator: Arc<dyn Navigator>) -> JoinHandle<()> {
        let mut events = session.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::LoggedOut(reason)) => {
                        info!(?reason, route = LOGIN_ROUTE, "Redirecting to login");
                        navigator.navigate(LOGIN_ROUTE);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Session coordinator lagged behind auth events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
