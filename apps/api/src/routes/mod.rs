pub mod health;
pub mod profiles;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless conversion of a supplied response
        .route("/api/v1/convert", post(profiles::handle_convert))
        // Acquisition-backed export
        .route("/api/v1/profiles/parse", post(profiles::handle_parse))
        .route(
            "/api/v1/profiles/:profile_id/resume",
            get(profiles::handle_get_resume),
        )
        .route(
            "/api/v1/profiles/:profile_id/locales",
            get(profiles::handle_get_locales),
        )
        .route(
            "/api/v1/profiles/:profile_id/vcard",
            get(profiles::handle_get_vcard),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::acquisition::paginate::test_support::ScriptedFetcher;
    use crate::config::Config;
    use crate::graph::NormalizedResponse;

    fn profile_response() -> Value {
        json!({
            "data": { "*profile": "urn:li:fs_profile:A1", "*skillView": "urn:skills" },
            "included": [
                {
                    "$type": "com.linkedin.voyager.identity.profile.Profile",
                    "entityUrn": "urn:li:fs_profile:A1",
                    "publicIdentifier": "ada",
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "headline": "Analyst",
                    "defaultLocale": { "language": "en", "country": "US" },
                    "supportedLocales": [{ "language": "en", "country": "US" }]
                },
                { "entityUrn": "urn:skills", "*elements": ["s1"], "paging": { "start": 0, "count": 1, "total": 1 } },
                { "entityUrn": "s1", "name": "Mathematics" }
            ]
        })
    }

    fn scripted(script: Vec<Value>) -> Arc<ScriptedFetcher> {
        let script = script
            .into_iter()
            .map(|v| Ok(serde_json::from_value::<NormalizedResponse>(v).unwrap()))
            .collect();
        Arc::new(ScriptedFetcher::new(script))
    }

    fn app_with(fetcher: Arc<ScriptedFetcher>) -> Router {
        let config = Config {
            lazy_load_settle: std::time::Duration::ZERO,
            ..Config::default()
        };
        build_router(AppState::new(config, fetcher))
    }

    fn app(script: Vec<Value>) -> Router {
        app_with(scripted(script))
    }

    /// Page markup carrying the profile the way the site embeds it.
    fn page_markup() -> String {
        let escaped = profile_response()
            .to_string()
            .replace('&', "&amp;")
            .replace('"', "&quot;");
        format!(r#"<html><code id="bpr-guid-7">{escaped}</code></html>"#)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(vec![])
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_convert_supplied_response() {
        let response = app(vec![])
            .oneshot(post_json(
                "/api/v1/convert",
                json!({ "response": profile_response(), "schema": "legacy", "profile_id": "ada" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["succeeded"], true);
        assert_eq!(body["summary"]["acquisition_method"], "supplied");
        assert_eq!(body["summary"]["sections"]["skills"], "success");
        assert_eq!(body["document"]["basics"]["name"], "Ada Lovelace");
        assert_eq!(body["document"]["skills"][0]["name"], "Mathematics");
    }

    #[tokio::test]
    async fn test_convert_rejects_empty_response() {
        let response = app(vec![])
            .oneshot(post_json(
                "/api/v1/convert",
                json!({ "response": { "data": {}, "included": [] } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_parse_rejects_non_profile_page() {
        let response = app(vec![])
            .oneshot(post_json(
                "/api/v1/profiles/parse",
                json!({ "page_url": "https://www.linkedin.com/feed/" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_PAGE");
    }

    #[tokio::test]
    async fn test_same_markup_twice_is_served_from_cache() {
        let contact = json!({ "data": { "emailAddress": "ada@example.com" }, "included": [] });
        let fetcher = scripted(vec![contact]);
        let app = app_with(fetcher.clone());
        let request = || {
            post_json(
                "/api/v1/profiles/parse",
                json!({ "page_url": "https://www.linkedin.com/in/ada/", "markup": page_markup() }),
            )
        };

        let first = body_json(app.clone().oneshot(request()).await.unwrap()).await;
        assert_eq!(first["summary"]["acquisition_method"], "embedded");
        assert_eq!(first["document"]["basics"]["email"], "ada@example.com");
        let second = body_json(app.oneshot(request()).await.unwrap()).await;

        assert_eq!(second["summary"]["attempt_id"], first["summary"]["attempt_id"]);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_resume_without_any_source_is_bad_gateway() {
        let response = app(vec![])
            .oneshot(
                Request::builder()
                    .uri("/api/v1/profiles/ada/resume")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "ACQUISITION_ERROR");
    }

    #[tokio::test]
    async fn test_resume_from_live_fetch() {
        let contact = json!({ "data": { "emailAddress": "ada@example.com" }, "included": [] });
        let response = app(vec![profile_response(), contact])
            .oneshot(
                Request::builder()
                    .uri("/api/v1/profiles/ada/resume?schema=stable")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["summary"]["acquisition_method"], "live_fetch");
        assert_eq!(body["document"]["basics"]["email"], "ada@example.com");
        assert_eq!(
            body["document"]["$schema"],
            crate::resume::stable::SCHEMA_URL
        );
    }
}
