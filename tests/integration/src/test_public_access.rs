//! Anonymous access decisions over HTTP.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{TestServer, header};

    fn seed() -> serde_json::Value {
        json!({
            "buckets": {
                "site": { "owner": "alice", "acl": "public-read" },
                "private": { "owner": "alice" },
                "photos": {
                    "owner": "bob",
                    "acl": "public-read",
                    "policy": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Principal": "*",
                            "Action": "s3:GetObject",
                            "Resource": "arn:aws:s3:::photos/public/*"
                        }]
                    }
                },
                "wide-open": {
                    "policy": {
                        "Statement": [{
                            "Effect": "Allow",
                            "Principal": {"AWS": ["*"]},
                            "Action": "s3:*",
                            "Resource": ["arn:aws:s3:::wide-open", "arn:aws:s3:::wide-open/*"]
                        }]
                    }
                }
            }
        })
    }

    async fn assert_access_denied(resp: reqwest::Response) {
        assert_eq!(resp.status().as_u16(), 403);
        assert!(header(&resp, "x-amz-request-id").is_some());
        let body = resp.text().await.expect("body");
        assert!(body.contains("<Code>AccessDenied</Code>"), "{body}");
        assert!(body.contains("<Message>Access Denied</Message>"), "{body}");
    }

    #[tokio::test]
    async fn test_should_allow_public_read_acl_bucket() {
        let server = TestServer::start(seed()).await;

        let resp = server.get("/site/index.html").await;
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(header(&resp, "x-s3gate-access"), Some("public"));
        assert_eq!(header(&resp, "x-s3gate-action"), Some("s3:GetObject"));
        assert_eq!(header(&resp, "x-s3gate-grant"), Some("acl"));

        let resp = server.get("/site?list-type=2&prefix=docs/").await;
        assert_eq!(header(&resp, "x-s3gate-action"), Some("s3:ListBucket"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_deny_private_bucket() {
        let server = TestServer::start(seed()).await;
        assert_access_denied(server.get("/private/secret.txt").await).await;
        assert_access_denied(server.get("/private").await).await;
    }

    #[tokio::test]
    async fn test_should_let_policy_override_public_acl() {
        let server = TestServer::start(seed()).await;

        let resp = server.get("/photos/public/cat.jpg").await;
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(header(&resp, "x-s3gate-grant"), Some("policy"));

        // The ACL is public-read, but a policy exists and does not cover these.
        assert_access_denied(server.get("/photos/private/cat.jpg").await).await;
        assert_access_denied(server.get("/photos").await).await;
    }

    #[tokio::test]
    async fn test_should_deny_never_public_actions() {
        let server = TestServer::start(seed()).await;

        assert_access_denied(server.get("/").await).await;
        assert_access_denied(server.get("/wide-open?policy").await).await;
        assert_access_denied(server.get("/wide-open?ownershipControls").await).await;

        let resp = server.get("/wide-open?acl").await;
        assert_eq!(header(&resp, "x-s3gate-action"), Some("s3:GetBucketAcl"));
    }

    #[tokio::test]
    async fn test_should_classify_by_query_priority() {
        let server = TestServer::start(seed()).await;

        let cases = [
            ("/wide-open?tagging&acl", "s3:GetBucketTagging"),
            ("/wide-open?versions", "s3:ListBucketVersions"),
            ("/wide-open?uploads", "s3:ListBucketMultipartUploads"),
            ("/wide-open?unknown=1", "s3:ListBucket"),
            ("/wide-open/my/nested/object?acl=", "s3:GetObjectAcl"),
            ("/wide-open/k?versionId=abc", "s3:GetObjectVersion"),
            ("/wide-open/k?uploadId=u1", "s3:ListMultipartUploadParts"),
            ("/wide-open/k?retention&tagging", "s3:GetObjectTagging"),
        ];
        for (path, action) in cases {
            let resp = server.get(path).await;
            assert_eq!(resp.status().as_u16(), 200, "{path}");
            assert_eq!(header(&resp, "x-s3gate-action"), Some(action), "{path}");
        }
    }

    #[tokio::test]
    async fn test_should_ignore_query_for_head() {
        let server = TestServer::start(seed()).await;

        let resp = server
            .request(reqwest::Method::HEAD, "/wide-open?policy")
            .await;
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(header(&resp, "x-s3gate-action"), Some("s3:ListBucket"));

        let resp = server
            .request(reqwest::Method::HEAD, "/wide-open/k?acl")
            .await;
        assert_eq!(header(&resp, "x-s3gate-action"), Some("s3:GetObject"));
    }

    #[tokio::test]
    async fn test_should_deny_anonymous_writes() {
        let server = TestServer::start(seed()).await;
        for method in [
            reqwest::Method::PUT,
            reqwest::Method::POST,
            reqwest::Method::DELETE,
        ] {
            assert_access_denied(server.request(method, "/wide-open/k").await).await;
        }
    }

    #[tokio::test]
    async fn test_should_skip_authenticated_requests() {
        let server = TestServer::start(seed()).await;

        let authorization = "AWS4-HMAC-SHA256 Credential=test/20240101/us-east-1/s3/aws4_request";
        let resp = server
            .client()
            .put(server.url("/private/k"))
            .header("Authorization", authorization)
            .send()
            .await
            .expect("request sent");
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(header(&resp, "x-s3gate-access"), Some("authenticated"));

        let resp = server
            .get("/?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Signature=abc")
            .await;
        assert_eq!(header(&resp, "x-s3gate-access"), Some("authenticated"));
    }

    #[tokio::test]
    async fn test_should_surface_missing_bucket_error() {
        let server = TestServer::start(seed()).await;

        let resp = server.get("/ghost/k").await;
        assert_eq!(resp.status().as_u16(), 404);
        let body = resp.text().await.expect("body");
        assert!(body.contains("<Code>NoSuchBucket</Code>"), "{body}");
    }
}
