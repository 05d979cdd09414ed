//! Gateway-level endpoints.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{TestServer, header};

    #[tokio::test]
    async fn test_should_report_health() {
        let server = TestServer::start(json!({})).await;

        for path in ["/_health", "/health"] {
            let resp = server.get(path).await;
            assert_eq!(resp.status().as_u16(), 200);
            let body: serde_json::Value = resp.json().await.expect("json body");
            assert_eq!(body["status"], "running");
            assert_eq!(body["service"], "s3gate");
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_assign_unique_request_ids() {
        let server = TestServer::start(json!({"buckets": {"b": {}}})).await;

        let first = server.get("/b/k").await;
        let second = server.get("/b/k").await;
        let first_id = header(&first, "x-amz-request-id").map(ToOwned::to_owned);
        let second_id = header(&second, "x-amz-request-id").map(ToOwned::to_owned);

        assert!(first_id.is_some());
        assert_ne!(first_id, second_id);
    }

    #[tokio::test]
    async fn test_should_not_leak_bucket_existence_in_denials() {
        let server = TestServer::start(json!({
            "buckets": {
                "a": {},
                "b": {"policy": {"Statement": [{
                    "Effect": "Deny", "Principal": "*",
                    "Action": "s3:*", "Resource": "arn:aws:s3:::b/*"
                }]}}
            }
        }))
        .await;

        let a = server.get("/a/k").await;
        let b = server.get("/b/k").await;
        assert_eq!(a.status(), b.status());

        let a = a.text().await.expect("body");
        let b = b.text().await.expect("body");
        let strip = |s: &str| {
            s.split("<RequestId>")
                .next()
                .unwrap_or_default()
                .replace("/a/k", "/X")
                .replace("/b/k", "/X")
        };
        assert_eq!(strip(&a), strip(&b));
    }
}
