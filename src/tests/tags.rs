#[cfg(test)]
mod test {
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use crate::cache::CacheTagRegistry;
    use crate::client::{ApiClient, RequestConfig};
    use crate::credential::{Credential, CredentialStore};
    use crate::helpers::time::now_i64;
    use crate::tests::common::{make_jwt, session_context, settings_for};

    #[tokio::test]
    async fn invalidate_notifies_subscribers() {
        let registry = CacheTagRegistry::new();
        let mut rx = registry.subscribe();

        let tags = vec!["reservation-42".to_owned(), "reservations".to_owned()];
        registry.invalidate(&tags);

        assert_eq!(rx.recv().await.unwrap(), tags);
        assert_eq!(registry.drain_invalidated(), tags);
        assert!(registry.drain_invalidated().is_empty(), "drain takes ownership");
    }

    #[test]
    fn empty_invalidation_is_a_no_op() {
        let registry = CacheTagRegistry::new();
        registry.invalidate(&[]);
        assert!(registry.drain_invalidated().is_empty());
    }

    #[tokio::test]
    async fn successful_mutation_invalidates_declared_tags() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/reservations");
                then.status(201).json_body(json!({"id": 42}));
            })
            .await;

        let dir = tempdir().unwrap();
        let (context, _) = session_context(&dir);
        let client = ApiClient::new(&settings_for(&server.base_url()), context).unwrap();

        let config = RequestConfig::with_tags(&["reservation-42", "reservations"]);
        let _: Value = client
            .post("/reservations", &json!({"room": 7}), config)
            .await
            .unwrap();

        assert_eq!(
            client.tags().drain_invalidated(),
            vec!["reservation-42".to_owned(), "reservations".to_owned()]
        );
    }

    #[tokio::test]
    async fn mutation_that_succeeds_on_the_reauth_retry_invalidates_once() {
        // First attempt is rejected with a 401, the post-renewal retry lands.
        // The declared tags must be observed exactly once either way.
        let server = MockServer::start_async().await;
        let stale = make_jwt(now_i64() + 600);
        let fresh = make_jwt(now_i64() + 3600);

        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/reservations")
                    .header("authorization", format!("Bearer {stale}"));
                then.status(401).json_body(json!({
                    "statusCode": 401,
                    "message": "Unauthorized",
                    "timestamp": "2026-01-01T00:00:00.000Z",
                    "path": "/reservations"
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/reservations")
                    .header("authorization", format!("Bearer {fresh}"));
                then.status(201).json_body(json!({"id": 42}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/refresh");
                then.status(200)
                    .json_body(json!({"access_token": fresh, "refresh_token": "R2"}));
            })
            .await;

        let dir = tempdir().unwrap();
        let (context, _) = session_context(&dir);
        context
            .store()
            .write(&Credential::new(stale.clone(), Some("R1".to_owned())));
        let client = ApiClient::new(&settings_for(&server.base_url()), context).unwrap();

        let config = RequestConfig::with_tags(&["reservation-42", "reservations"]);
        let body: Value = client
            .request_with_reauth(
                http::Method::POST,
                "/reservations",
                Some(json!({"room": 7})),
                config,
            )
            .await
            .unwrap();

        assert_eq!(body, json!({"id": 42}));
        assert_eq!(
            client.tags().drain_invalidated(),
            vec!["reservation-42".to_owned(), "reservations".to_owned()],
            "tags observed exactly once despite the internal retry"
        );
    }

    #[tokio::test]
    async fn failed_mutation_invalidates_nothing() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/reservations");
                then.status(400).json_body(json!({
                    "statusCode": 400,
                    "message": "Bad request",
                    "timestamp": "2026-01-01T00:00:00.000Z",
                    "path": "/reservations"
                }));
            })
            .await;

        let dir = tempdir().unwrap();
        let (context, _) = session_context(&dir);
        let client = ApiClient::new(&settings_for(&server.base_url()), context).unwrap();

        let config = RequestConfig::with_tags(&["reservations"]);
        let result = client
            .post::<Value>("/reservations", &json!({}), config)
            .await;

        assert!(result.is_err());
        assert!(client.tags().drain_invalidated().is_empty());
    }

    #[tokio::test]
    async fn reads_never_invalidate() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/reservations");
                then.status(200).json_body(json!([]));
            })
            .await;

        let dir = tempdir().unwrap();
        let (context, _) = session_context(&dir);
        let client = ApiClient::new(&settings_for(&server.base_url()), context).unwrap();

        // tags on a read are advisory metadata at most
        let config = RequestConfig::with_tags(&["reservations"]);
        let _: Value = client.get("/reservations", config).await.unwrap();
        assert!(client.tags().drain_invalidated().is_empty());
    }
}
