#[cfg(test)]
mod test {

    use std::time::Duration;

    use http::StatusCode;

    use crate::cache::token_cache::TokenCache;
    use crate::errors::Error;
    use crate::sources::RequestOptions;
    use crate::tests::common::*;
    use crate::utils::constants::OAUTH_TOKEN_PATH;
    use crate::ClientConfig;

    #[tokio::test]
    async fn returns_a_valid_access_token() {
        let server = MockServer::start_async().await;
        let mock = mock_token_endpoint(&server, &token_body("access-abc", 14399)).await;

        let token = isolated_client(&server)
            .get_access_token(&RequestOptions::default())
            .await
            .expect("token");

        assert!(!token.access_token.is_empty());
        assert!(!token.client_id.is_empty());
        assert!(token.expires_in > 0);
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.raw["status"], "approved");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn returns_the_same_token_on_subsequent_calls() {
        let server = MockServer::start_async().await;
        let mock = mock_token_endpoint(&server, &token_body("access-abc", 14399)).await;
        let ups = isolated_client(&server);

        let first = ups.get_access_token(&RequestOptions::default()).await.unwrap();
        let second = ups.get_access_token(&RequestOptions::default()).await.unwrap();

        assert_eq!(first, second);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn invalid_environment_url_fails_with_url_error() {
        let config = ClientConfig::new(CLIENT_ID, CLIENT_SECRET).with_environment_url("invalid");
        let ups = client_with_cache(config, TokenCache::new());

        let err = ups.get_access_token(&RequestOptions::default()).await.unwrap_err();

        assert!(matches!(err, Error::Url { .. }));
        assert!(
            err.to_string().starts_with("failed to parse URL from invalid/security/v1/oauth/token"),
            "unexpected message: {}",
            err
        );
    }

    #[tokio::test]
    async fn non_success_status_fails_with_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(OAUTH_TOKEN_PATH);
                then.status(500);
            })
            .await;

        let err = isolated_client(&server)
            .get_access_token(&RequestOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(err.to_string().starts_with("500"), "unexpected message: {}", err);
    }

    #[tokio::test]
    async fn failed_exchange_is_not_cached() {
        let server = MockServer::start_async().await;
        let mut failing = server
            .mock_async(|when, then| {
                when.method(POST).path(OAUTH_TOKEN_PATH);
                then.status(401).json_body(json!({
                    "response": { "errors": [{ "code": "10401", "message": "ClientId is Invalid" }] }
                }));
            })
            .await;
        let ups = isolated_client(&server);

        let err = ups.get_access_token(&RequestOptions::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "401 Unauthorized: [10401] ClientId is Invalid");

        failing.delete_async().await;
        let ok = mock_token_endpoint(&server, &token_body("after-fix", 3600)).await;
        let token = ups.get_access_token(&RequestOptions::default()).await.unwrap();
        assert_eq!(token.access_token, "after-fix");
        ok.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn slow_exchange_fails_with_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(OAUTH_TOKEN_PATH);
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .json_body(token_body("too-late", 3600));
            })
            .await;

        let err = isolated_client(&server)
            .get_access_token(&RequestOptions::with_timeout(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(err.is_timeout(), "expected timeout, got {}", err);
        assert!(matches!(err, Error::Timeout { timeout_ms: 50, .. }));
    }

    #[tokio::test]
    async fn unreachable_host_fails_with_transport_error() {
        // nothing listens on port 1
        let config = ClientConfig::new(CLIENT_ID, CLIENT_SECRET).with_environment_url("http://127.0.0.1:1");
        let ups = client_with_cache(config, TokenCache::new());

        let err = ups
            .get_access_token(&RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { .. }), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn malformed_success_body_fails_with_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(OAUTH_TOKEN_PATH);
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let err = isolated_client(&server)
            .get_access_token(&RequestOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode { .. }), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn distinct_client_ids_do_not_share_a_cache_slot() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(OAUTH_TOKEN_PATH);
                then.status(200).json_body(token_body("shared-endpoint", 3600));
            })
            .await;
        let cache = TokenCache::new();

        let first = client_with_cache(
            ClientConfig::new("client-a", "secret-a").with_environment_url(server.base_url()),
            cache.clone(),
        );
        let second = client_with_cache(
            ClientConfig::new("client-b", "secret-b").with_environment_url(server.base_url()),
            cache.clone(),
        );

        first.get_access_token(&RequestOptions::default()).await.unwrap();
        second.get_access_token(&RequestOptions::default()).await.unwrap();
        first.get_access_token(&RequestOptions::default()).await.unwrap();

        mock.assert_calls_async(2).await;
        assert_eq!(cache.len().await, 2);
    }
}
