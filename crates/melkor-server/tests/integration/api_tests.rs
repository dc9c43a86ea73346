use axum::http::StatusCode;
use serde_json::json;

use crate::integration::common::{TEST_OWNER, TEST_REGION, ids, setup_test_app};

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_unknown_resource_returns_404() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn list_empty_resource_returns_empty_array() {
    let app = setup_test_app(0);

    for uri in [
        "/api/v1/aws/instances",
        "/api/v1/aws/instances?_expand=true",
        "/api/v1/aws/volumes",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(json, json!([]), "{uri}");
    }
}

#[tokio::test]
async fn list_returns_all_identifiers_in_order() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/instances").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!(["i-0", "i-1", "i-2", "i-3"]));
}

#[tokio::test]
async fn resource_name_is_case_insensitive() {
    let app = setup_test_app(2);

    for uri in ["/api/v1/aws/Instances", "/api/v1/aws/INSTANCES"] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(ids(&json), ["i-0", "i-1"]);
    }
}

#[tokio::test]
async fn list_with_limit() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/instances?_limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!(["i-0", "i-1"]));
}

#[tokio::test]
async fn limit_zero_or_larger_than_count_returns_everything() {
    let app = setup_test_app(3);

    for uri in [
        "/api/v1/aws/instances?_limit=0",
        "/api/v1/aws/instances?_limit=",
        "/api/v1/aws/instances?_limit=10",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(ids(&json).len(), 3, "{uri}");
    }
}

#[tokio::test]
async fn bad_limit_returns_400() {
    let app = setup_test_app(4);

    for uri in [
        "/api/v1/aws/instances?_limit=one",
        "/api/v1/aws/instances?_limit=-1",
        "/api/v1/aws/instances?_limit=1.5",
    ] {
        let (status, json) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json, json!({"error": "Bad limit parameter"}));
    }
}

#[tokio::test]
async fn expand_returns_full_records() {
    let app = setup_test_app(3);

    let (status, json) = app.get("/api/v1/aws/instances?_expand=true").await;

    assert_eq!(status, StatusCode::OK);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["InstanceId"], "i-1");
    assert_eq!(records[1]["PrivateIpAddress"], "10.20.30.1");
    assert_eq!(records[1]["State"]["Name"], "running");
    assert!(records[1]["Platform"].is_null());
}

#[tokio::test]
async fn expand_only_accepts_exact_true() {
    let app = setup_test_app(2);

    for value in ["1", "TRUE", "yes"] {
        let (status, json) = app
            .get(&format!("/api/v1/aws/instances?_expand={value}"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!(["i-0", "i-1"]), "_expand={value}");
    }
}

#[tokio::test]
async fn expand_with_limit_normalizes_tags() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/instances?_expand=true&_limit=1").await;

    assert_eq!(status, StatusCode::OK);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["InstanceId"], "i-0");

    let tags = records[0]["Tags"].as_array().unwrap();
    assert_eq!(tags.len(), 4);
    for tag in tags {
        let key = tag["Key"].as_str().unwrap();
        assert_eq!(tag[key], tag["Value"], "tag {key}");
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filter_on_tag() {
    let app = setup_test_app(4);

    let (status, json) = app
        .get("/api/v1/aws/instances?_expand=true&_filter=(Tags.Team:team2)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), ["i-2"]);
}

#[tokio::test]
async fn filter_value_is_case_insensitive() {
    let app = setup_test_app(4);

    let (status, json) = app
        .get("/api/v1/aws/instances?_expand=true&_filter=(Tags.Team:TEAM2)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), ["i-2"]);
}

#[tokio::test]
async fn filter_without_expand_returns_identifiers() {
    let app = setup_test_app(4);

    let (status, json) = app
        .get("/api/v1/aws/instances?_filter=(PrivateIpAddress:10.20.30.3)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!(["i-3"]));
}

#[tokio::test]
async fn filter_through_nested_lists() {
    let app = setup_test_app(4);

    let (status, json) = app
        .get("/api/v1/aws/instances?_filter=(NetworkInterfaces.Groups.GroupId:sg-1)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!(["i-1"]));
}

#[tokio::test]
async fn filter_shared_value_matches_all() {
    let app = setup_test_app(3);

    let (status, json) = app
        .get("/api/v1/aws/instances?_filter=(Tags.Environment:staging)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), ["i-0", "i-1", "i-2"]);
}

#[tokio::test]
async fn filter_without_match_returns_empty_array() {
    let app = setup_test_app(4);

    let (status, json) = app
        .get("/api/v1/aws/instances?_filter=(Tags.Team:nobody)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn invalid_filter_returns_400_with_reason() {
    let app = setup_test_app(4);

    let cases = [
        (
            "Tags.Team:team2",
            "invalid format of filter, must be surrounded by '()'",
        ),
        (
            "(Tags.Team:team2:x)",
            "invalid format of filter, only one ':' allowed",
        ),
        (
            "(.Tags.Team:team2)",
            "invalid format of filter, must not start or end with '.' or ':'",
        ),
        (
            "(Tags.:team2)",
            "invalid format of filter, must not have '.' adjacent to ':'",
        ),
    ];

    for (filter, message) in cases {
        let (status, json) = app
            .get(&format!("/api/v1/aws/instances?_filter={filter}"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{filter}");
        assert_eq!(json, json!({ "error": message }), "{filter}");
    }
}

#[tokio::test]
async fn limit_applies_after_filter() {
    let app = setup_test_app(4);

    let (status, json) = app
        .get("/api/v1/aws/instances?_expand=true&_limit=1&_filter=(Tags.Team:team2)")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), ["i-2"]);
}

// ---------------------------------------------------------------------------
// Single resource
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_single_resource() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/instances/i-1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["InstanceId"], "i-1");
    assert_eq!(json["Tags"][2]["Team"], "team1");
}

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/instances/i-42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Not Found"}));
}

#[tokio::test]
async fn get_from_unknown_resource_returns_404() {
    let app = setup_test_app(4);

    let (status, json) = app.get("/api/v1/aws/nonexistent/i-1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Not Found"}));
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[tokio::test]
async fn service_metadata_describes_crawlers() {
    let app = setup_test_app(20);

    let (status, json) = app.get("/service-metadata").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["owner"], TEST_OWNER);
    assert_eq!(json["description"], "AWS caching layer");
    assert_eq!(json["service_name"], "melkor");
    assert_eq!(json["service_version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["aws_region"], TEST_REGION);
    assert_eq!(
        json["crawlers"],
        json!([
            {
                "resource": "Instances",
                "last_crawled": "2017-02-28T10:15:22Z",
                "count": 20,
            },
            {
                "resource": "Volumes",
                "last_crawled": null,
                "count": 0,
            },
        ])
    );
}

#[tokio::test]
async fn health_reports_crawler_count() {
    let app = setup_test_app(1);

    let (status, json) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok", "crawlers": 2}));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app(1);

    let (status, json) = app.get("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["info"]["title"], "Melkor API");
    assert!(json["paths"]["/api/v1/aws/{resource}"].is_object());
    assert!(json["paths"]["/service-metadata"].is_object());
}
