// Login, logout and the signed-in admin

use tracing::info;

use super::{keys, MutationResult, QueryClient, QueryOptions, QueryResult};
use crate::error::{ApiError, ClientError};
use crate::models::{AuthTokens, Credentials, User};
use crate::services::{auth, user};

impl QueryClient {
    pub async fn current_user(&self) -> QueryResult<Option<User>> {
        let options =
            QueryOptions::new(keys::current_user()).enabled(self.http().session().is_signed_in());
        let http = self.http().clone();
        self.query(options, move || async move { user::current_user(&http).await })
            .await
    }

    // Exchanges credentials for tokens and stores them in the session.
    pub async fn login(&self, credentials: &Credentials) -> MutationResult<AuthTokens> {
        let http = self.http();
        let write = async move {
            let tokens = auth::login_admin(http, credentials)
                .await?
                .ok_or_else(|| ApiError::DecodeError("login response carried no tokens".to_string()))?;
            http.session().sign_in(tokens.clone()).await?;
            Ok::<AuthTokens, ApiError>(tokens)
        };
        self.mutate(&[keys::current_user()], write).await
    }

    pub async fn refresh_session(&self) -> MutationResult<AuthTokens> {
        let http = self.http();
        let write = async move {
            let refresh_token = http
                .session()
                .refresh_token()
                .ok_or_else(|| ApiError::ClientError("no refresh token stored".to_string()))?;
            let tokens = auth::refresh(http, &refresh_token)
                .await?
                .ok_or_else(|| ApiError::DecodeError("refresh response carried no tokens".to_string()))?;
            http.session().refresh(tokens.clone()).await?;
            Ok::<AuthTokens, ApiError>(tokens)
        };
        self.mutate(&[], write).await
    }

    // Cached data belongs to the admin that loaded it
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.http().session().sign_out().await?;
        self.cache().clear();
        info!("Query cache cleared on logout");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::mock_server::MockResponse;
    use crate::queries::tests::query_client;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            email: "admin@cinema.test".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_authorizes_reads() {
        let (client, server) = query_client();
        server.route(
            Method::POST,
            "/auth/login/admin",
            MockResponse::ok(json!({"accessToken": "abc", "refreshToken": "r1"})),
        );
        server.route(Method::GET, "/user/me", MockResponse::ok(json!({"id": 1, "role": "admin"})));

        assert_eq!(client.current_user().await, QueryResult::idle());

        let login = client.login(&credentials()).await;
        assert!(login.is_success());
        assert_eq!(client.http().session().access_token().as_deref(), Some("abc"));

        let me = client.current_user().await;
        assert!(me.is_success());
        assert_eq!(
            server.last_request().unwrap().header("Authorization"),
            Some("Bearer abc")
        );
    }

    #[tokio::test]
    async fn test_login_without_tokens_fails() {
        let (client, server) = query_client();
        server.route(Method::POST, "/auth/login/admin", MockResponse::raw(200, json!({})));

        let login = client.login(&credentials()).await;

        assert!(!login.is_success());
        assert!(!client.http().session().is_signed_in());
    }

    #[tokio::test]
    async fn test_rejected_login_reports_backend_message() {
        let (client, server) = query_client();
        server.route(
            Method::POST,
            "/auth/login/admin",
            MockResponse::raw(401, json!({"message": "Invalid email or password"})),
        );
        let mut events = client.http().session().subscribe();

        let login = client.login(&credentials()).await;

        assert_eq!(
            login.error.as_deref(),
            Some("Unauthorized: Invalid email or password")
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_refresh_keeps_previous_refresh_token() {
        let (client, server) = query_client();
        server.route(
            Method::POST,
            "/auth/login/admin",
            MockResponse::ok(json!({"accessToken": "abc", "refreshToken": "r1"})),
        );
        server.route(Method::POST, "/auth/refresh", MockResponse::ok(json!({"accessToken": "def"})));

        client.login(&credentials()).await;
        let refreshed = client.refresh_session().await;

        assert!(refreshed.is_success());
        let session = client.http().session();
        assert_eq!(session.access_token().as_deref(), Some("def"));
        assert_eq!(session.refresh_token().as_deref(), Some("r1"));
        assert_eq!(
            server.last_request().unwrap().body,
            crate::http::RequestBody::Json(json!({"refresh_token": "r1"}))
        );
    }

    #[tokio::test]
    async fn test_logout_clears_cache() {
        let (client, server) = query_client();
        server.route(Method::GET, "/cinema", MockResponse::ok(json!([{"id": 1}])));
        client.cinemas().await;
        assert_eq!(client.cache().len(), 1);

        client.logout().await.unwrap();

        assert!(client.cache().is_empty());
        assert!(!client.http().session().is_signed_in());
    }
}
