use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use melkor_core::CrawlerRegistry;
use melkor_core::testutil::{MockCrawler, fixture_records};
use melkor_server::config::Config;
use melkor_server::routes;
use melkor_server::state::AppState;

pub const TEST_OWNER: &str = "team-melkor";
pub const TEST_REGION: &str = "eu-west-1";

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    /// Send a GET request and return the status plus the decoded JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

/// App serving an "Instances" crawler holding `count` fixture instances and
/// a "Volumes" crawler that has never crawled.
pub fn setup_test_app(count: usize) -> TestApp {
    let mut registry = CrawlerRegistry::new();
    registry
        .register(Arc::new(MockCrawler::with_records(
            "Instances",
            fixture_records(count),
        )))
        .unwrap();
    registry
        .register(Arc::new(MockCrawler::new("Volumes")))
        .unwrap();

    let config = Config {
        owner: TEST_OWNER.to_string(),
        aws_region: TEST_REGION.to_string(),
        ..Config::defaults(|_| None)
    };
    let state = Arc::new(AppState::new(Arc::new(registry), &config));

    TestApp {
        router: routes::router(state),
    }
}

/// Instance ids in response order.
pub fn ids(json: &serde_json::Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|v| match v {
            serde_json::Value::String(id) => id.clone(),
            other => other["InstanceId"].as_str().unwrap().to_string(),
        })
        .collect()
}
