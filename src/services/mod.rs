// One module per backend resource
//
// Each function maps exactly one REST endpoint, takes the injected client and
// returns the unwrapped `body` of the response (`None` when the backend sent
// none). Errors are passed through as-is.

pub mod auth;
pub mod cinema;
pub mod combo;
pub mod discount;
pub mod genre;
pub mod movie;
pub mod payment;
pub mod room;
pub mod seat;
pub mod statistic;
pub mod user;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::{HttpClient, Method, RequestBody, MULTIPART_CONTENT_TYPE};
    use crate::mock_server::{mock_client, MockResponse};
    use crate::models::{
        Cinema, ComboForm, Credentials, DateRange, MovieStatus, Pagination, RecordId,
        StatisticKind,
    };
    use chrono::NaiveDate;
    use serde_json::json;
    use test_case::test_case;

    fn june() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
    }

    async fn call(name: &str, client: &HttpClient) -> Result<(), ApiError> {
        let id = RecordId::Number(5);
        let payload = json!({"name": "Screen 5"});
        match name {
            "login_admin" => {
                let credentials = Credentials {
                    email: "admin@cinema.test".to_string(),
                    password: "hunter2".to_string(),
                };
                auth::login_admin(client, &credentials).await.map(drop)
            }
            "refresh" => auth::refresh(client, "r-token").await.map(drop),
            "current_user" => user::current_user(client).await.map(drop),
            "list_cinemas" => cinema::list_cinemas(client).await.map(drop),
            "get_cinema" => cinema::get_cinema(client, &id).await.map(drop),
            "screens_by_cinema" => room::screens_by_cinema(client, &id).await.map(drop),
            "get_room" => room::get_room(client, &id).await.map(drop),
            "create_room" => room::create_room(client, &payload).await.map(drop),
            "update_room" => room::update_room(client, &id, &payload).await.map(drop),
            "delete_room" => room::delete_room(client, &id).await,
            "seats_by_room" => seat::seats_by_room(client, &id).await.map(drop),
            "list_combos" => combo::list_combos(client).await.map(drop),
            "get_combo" => combo::get_combo(client, &id).await.map(drop),
            "delete_combo" => combo::delete_combo(client, &id).await,
            "list_discounts" => discount::list_discounts(client).await.map(drop),
            "get_discount" => discount::get_discount(client, &id).await.map(drop),
            "create_discount" => discount::create_discount(client, &payload).await.map(drop),
            "update_discount" => discount::update_discount(client, &id, &payload)
                .await
                .map(drop),
            "delete_discount" => discount::delete_discount(client, &id).await,
            "list_genres" => genre::list_genres(client).await.map(drop),
            "now_showing" => movie::movies_by_status(client, MovieStatus::NowShowing)
                .await
                .map(drop),
            "payments_by_cinema" => payment::payments_by_cinema(client, &id, &june())
                .await
                .map(drop),
            "list_payments" => payment::list_payments(client, Pagination { page: 2, limit: 20 })
                .await
                .map(drop),
            "accept_all" => payment::accept_all_payments(client).await.map(drop),
            "combo_stats" => statistic::statistics(client, StatisticKind::Combo, &june())
                .await
                .map(drop),
            "movie_revenue" => statistic::statistics(client, StatisticKind::MovieRevenue, &june())
                .await
                .map(drop),
            "cinema_revenue" => {
                statistic::statistics(client, StatisticKind::CinemaRevenue, &june())
                    .await
                    .map(drop)
            }
            other => panic!("unknown call {}", other),
        }
    }

    const NO_QUERY: &[(&str, &str)] = &[];
    const JUNE_QUERY: &[(&str, &str)] = &[("start_date", "2025-06-01"), ("end_date", "2025-06-30")];

    #[test_case("login_admin", Method::POST, "/auth/login/admin", NO_QUERY)]
    #[test_case("refresh", Method::POST, "/auth/refresh", NO_QUERY)]
    #[test_case("current_user", Method::GET, "/user/me", NO_QUERY)]
    #[test_case("list_cinemas", Method::GET, "/cinema", NO_QUERY)]
    #[test_case("get_cinema", Method::GET, "/cinema/5", NO_QUERY)]
    #[test_case("screens_by_cinema", Method::GET, "/room/cinema/5", NO_QUERY)]
    #[test_case("get_room", Method::GET, "/room/5", NO_QUERY)]
    #[test_case("create_room", Method::POST, "/room", NO_QUERY)]
    #[test_case("update_room", Method::PUT, "/room/5", NO_QUERY)]
    #[test_case("delete_room", Method::DELETE, "/room/5", NO_QUERY)]
    #[test_case("seats_by_room", Method::GET, "/seat/room/5", NO_QUERY)]
    #[test_case("list_combos", Method::GET, "/combo", NO_QUERY)]
    #[test_case("get_combo", Method::GET, "/combo/5", NO_QUERY)]
    #[test_case("delete_combo", Method::DELETE, "/combo/5", NO_QUERY)]
    #[test_case("list_discounts", Method::GET, "/discount/list", NO_QUERY)]
    #[test_case("get_discount", Method::GET, "/discount/5", NO_QUERY)]
    #[test_case("create_discount", Method::POST, "/discount", NO_QUERY)]
    #[test_case("update_discount", Method::PUT, "/discount/5", NO_QUERY)]
    #[test_case("delete_discount", Method::DELETE, "/discount/5", NO_QUERY)]
    #[test_case("list_genres", Method::GET, "/genre", NO_QUERY)]
    #[test_case("now_showing", Method::GET, "/movie", &[("status", "now-showing")])]
    #[test_case("payments_by_cinema", Method::GET, "/payment/cinema/5", JUNE_QUERY)]
    #[test_case("list_payments", Method::GET, "/payment", &[("page", "2"), ("limit", "20")])]
    #[test_case("accept_all", Method::POST, "/payment/accept-all", NO_QUERY)]
    #[test_case("combo_stats", Method::GET, "/statistic/combo", JUNE_QUERY)]
    #[test_case("movie_revenue", Method::GET, "/statistic/movie-revenue", JUNE_QUERY)]
    #[test_case("cinema_revenue", Method::GET, "/statistic/cinema-revenue", JUNE_QUERY)]
    fn test_endpoint_table(name: &str, method: Method, path: &str, query: &[(&str, &str)]) {
        let (client, server) = mock_client();
        server.route(method.clone(), path, MockResponse::ok(json!(null)));

        tokio_test::block_on(call(name, &client)).unwrap();

        assert_eq!(server.request_count(), 1);
        let request = server.last_request().unwrap();
        assert_eq!(request.method, method);
        assert_eq!(request.url, format!("http://localhost:8000/api{}", path));
        let expected: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(request.query, expected);
    }

    #[tokio::test]
    async fn test_returns_body_of_response() {
        let (client, server) = mock_client();
        let cinemas = json!([{"id": 1, "name": "Downtown"}, {"id": 2, "name": "Riverside"}]);
        server.route(Method::GET, "/cinema", MockResponse::ok(cinemas.clone()));

        let returned = cinema::list_cinemas(&client).await.unwrap();
        let expected: Vec<Cinema> = serde_json::from_value(cinemas).unwrap();
        assert_eq!(returned, Some(expected));
    }

    #[tokio::test]
    async fn test_absent_body_is_none() {
        let (client, server) = mock_client();
        server.route(Method::GET, "/genre", MockResponse::raw(200, json!({})));
        assert_eq!(genre::list_genres(&client).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_payload_goes_in_body() {
        let (client, server) = mock_client();
        server.route(Method::PUT, "/discount/9", MockResponse::ok(json!({"id": 9})));

        let updated = discount::update_discount(&client, &RecordId::Number(9), &json!({"percent": 15}))
            .await
            .unwrap();

        assert_eq!(updated.map(|d| d.id), Some(RecordId::Number(9)));
        assert_eq!(
            server.last_request().unwrap().body,
            RequestBody::Json(json!({"percent": 15}))
        );
    }

    #[tokio::test]
    async fn test_combo_update_is_multipart() {
        let (client, server) = mock_client();
        server.route(Method::PUT, "/combo/4", MockResponse::ok(json!({"id": 4})));
        let form = ComboForm {
            name: "Family pack".to_string(),
            price: "12.50".to_string(),
            description: Some("Two drinks, one popcorn".to_string()),
            ..ComboForm::default()
        };

        combo::update_combo(&client, &RecordId::Number(4), form)
            .await
            .unwrap();

        let request = server.last_request().unwrap();
        assert_eq!(request.header("Content-Type"), Some(MULTIPART_CONTENT_TYPE));
        match request.body {
            RequestBody::Multipart(form) => {
                assert_eq!(form.text_value("name"), Some("Family pack"));
                assert_eq!(form.text_value("price"), Some("12.50"));
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_id_cannot_escape_its_segment() {
        let (client, server) = mock_client();
        let id = RecordId::from("../user/me");

        let _ = room::screens_by_cinema(&client, &id).await;
        let _ = cinema::get_cinema(&client, &RecordId::from("1?admin=true")).await;

        let urls: Vec<String> = server.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8000/api/room/cinema/..%2Fuser%2Fme".to_string(),
                "http://localhost:8000/api/cinema/1%3Fadmin%3Dtrue".to_string(),
            ]
        );
        assert_eq!(server.calls(Method::GET, "/user/me"), 0);
    }

    #[tokio::test]
    async fn test_errors_propagate_unmodified() {
        let (client, server) = mock_client();
        server.route(
            Method::DELETE,
            "/room/5",
            MockResponse::raw(409, json!({"message": "Room has upcoming showtimes"})),
        );

        let error = room::delete_room(&client, &RecordId::Number(5)).await.unwrap_err();
        assert_eq!(
            error,
            ApiError::ApiResponseError {
                status_code: 409,
                message: "Room has upcoming showtimes".to_string(),
            }
        );
    }
}
