use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// HTTP Actions
// ============================================================================

impl TestSetup {
    pub fn id_of(&self, name: &str) -> String {
        self.player_ids
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no player named {name} in setup"))
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Builds a result form from `(name, rank)` pairs
    pub fn week_body(&self, ranks: &[(&str, i64)], is_doubled: bool) -> Value {
        let results: Vec<Value> = ranks
            .iter()
            .map(|(name, rank)| json!({ "playerId": self.id_of(name), "rank": rank }))
            .collect();
        json!({ "results": results, "isDoubled": is_doubled })
    }

    /// Submits a week and returns its id
    pub async fn submit_week(&self, ranks: &[(&str, i64)], is_doubled: bool) -> String {
        let (status, body) = self
            .send("POST", "/weeks", Some(self.week_body(ranks, is_doubled)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "unexpected response: {body}");
        body["weekId"].as_str().unwrap().to_string()
    }

    /// Polls a read endpoint until the mirror reflects the expected state
    pub async fn get_until<F>(&self, uri: &str, ready: F) -> Value
    where
        F: Fn(&Value) -> bool,
    {
        for _ in 0..100 {
            let (status, body) = self.send("GET", uri, None).await;
            if status == StatusCode::OK && ready(&body) {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("{uri} never reached the expected state");
    }

    /// Ranking entry for a player name, `Null` when absent
    pub fn ranked<'a>(ranking: &'a Value, name: &str) -> &'a Value {
        static ABSENT: Value = Value::Null;
        ranking["players"]
            .as_array()
            .and_then(|players| players.iter().find(|p| p["name"] == name))
            .unwrap_or(&ABSENT)
    }
}
