use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

mod utils;

use utils::*;

fn players_scored(ranking: &Value) -> usize {
    ranking["players"]
        .as_array()
        .map(|players| players.iter().filter(|p| p["presence"] != 0).count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_week_submission_updates_ranking() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    setup
        .submit_week(&[("bob", 1), ("carol", 2), ("alice", 3)], false)
        .await;

    let ranking = setup
        .get_until("/ranking", |r| players_scored(r) == 3)
        .await;

    let order: Vec<&str> = ranking["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["bob", "carol", "alice"]);

    let bob = TestSetup::ranked(&ranking, "bob");
    assert_eq!(bob["rank"], 1);
    assert_eq!(bob["totalPoints"], 150);
    assert_eq!(bob["pointsToday"], 150);
    assert_eq!(bob["previousTotalPoints"], 0);
    assert_eq!(bob["wins"], 1);
    assert_eq!(bob["presence"], 1);

    let alice = TestSetup::ranked(&ranking, "alice");
    assert_eq!(alice["totalPoints"], 100);
    assert_eq!(alice["wins"], 0);
}

#[tokio::test]
async fn test_doubled_week_doubles_placement_and_bonus() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    setup
        .submit_week(&[("alice", 1), ("bob", 2)], true)
        .await;

    let ranking = setup
        .get_until("/ranking", |r| players_scored(r) == 2)
        .await;
    assert_eq!(TestSetup::ranked(&ranking, "alice")["totalPoints"], 300);
    assert_eq!(TestSetup::ranked(&ranking, "bob")["totalPoints"], 240);
    assert_eq!(TestSetup::ranked(&ranking, "carol")["totalPoints"], 0);
}

#[tokio::test]
async fn test_rank_past_the_table_earns_the_floor() {
    let names: Vec<String> = (1..=14).map(|i| format!("p{i}")).collect();
    let setup = TestSetupBuilder::new()
        .with_players(names.iter().map(String::as_str).collect())
        .build()
        .await;

    let ranks: Vec<(&str, i64)> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i as i64 + 1))
        .collect();
    setup.submit_week(&ranks, true).await;

    let ranking = setup
        .get_until("/ranking", |r| players_scored(r) == 14)
        .await;
    // (1 + 20) * 2
    assert_eq!(TestSetup::ranked(&ranking, "p14")["totalPoints"], 42);
    assert_eq!(TestSetup::ranked(&ranking, "p13")["totalPoints"], 42);
    assert_eq!(TestSetup::ranked(&ranking, "p1")["totalPoints"], 300);
}

#[tokio::test]
async fn test_sitting_out_clears_points_today_only() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    setup.submit_week(&[("alice", 1), ("bob", 2)], false).await;
    setup.submit_week(&[("alice", 1)], false).await;

    let ranking = setup
        .get_until("/ranking", |r| {
            TestSetup::ranked(r, "alice")["presence"] == 2
        })
        .await;

    let bob = TestSetup::ranked(&ranking, "bob");
    assert_eq!(bob["pointsToday"], 0);
    assert_eq!(bob["totalPoints"], 120);
    assert_eq!(bob["previousTotalPoints"], 120);
    assert_eq!(bob["presence"], 1);

    let alice = TestSetup::ranked(&ranking, "alice");
    assert_eq!(alice["totalPoints"], 300);
    assert_eq!(alice["previousTotalPoints"], 150);
    assert_eq!(alice["wins"], 2);

    let carol = TestSetup::ranked(&ranking, "carol");
    assert_eq!(carol["pointsToday"], 0);
    assert_eq!(carol["presence"], 0);
}

#[tokio::test]
async fn test_blank_and_non_positive_ranks_mean_absence() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;
    let body = json!({
        "results": [
            { "playerId": setup.id_of("alice"), "rank": 1 },
            { "playerId": setup.id_of("bob") },
            { "playerId": setup.id_of("carol"), "rank": 0 },
        ],
    });

    let (status, _) = setup.send("POST", "/weeks", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let weeks = setup
        .get_until("/weeks", |w| w.as_array().map(|w| w.len()) == Some(1))
        .await;
    let results = weeks[0]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["playerId"], setup.id_of("alice").as_str());
    assert_eq!(weeks[0]["isDoubled"], false);
}

#[tokio::test]
async fn test_invalid_result_sets_are_rejected_without_writes() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let cases = vec![
        setup.week_body(&[("alice", 1), ("bob", 1)], false),
        setup.week_body(&[("alice", 1), ("bob", 3)], false),
        setup.week_body(&[("alice", 2), ("bob", 3)], false),
        setup.week_body(&[("alice", 0)], false),
        setup.week_body(&[("alice", 1), ("alice", 2)], false),
    ];

    for body in cases {
        let (status, error) = setup.send("POST", "/weeks", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted: {error}");
        assert!(error["error"].is_string());
    }

    let weeks = setup.state.league.ledger().weeks().await.unwrap();
    assert!(weeks.is_empty());
    let players = setup.state.league.ledger().players().await.unwrap();
    assert!(players.iter().all(|p| p.total_points == 0));
}

#[tokio::test]
async fn test_edit_week_keeps_totals_until_corrected() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let week_id = setup.submit_week(&[("alice", 1), ("bob", 2)], false).await;

    let (status, _) = setup
        .send(
            "PUT",
            &format!("/weeks/{week_id}"),
            Some(setup.week_body(&[("bob", 1), ("alice", 2)], true)),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let weeks = setup
        .get_until("/weeks", |w| w[0]["isDoubled"] == true)
        .await;
    assert_eq!(weeks[0]["results"][0]["playerId"], setup.id_of("bob").as_str());

    let ranking = setup.get_until("/ranking", |r| players_scored(r) == 2).await;
    assert_eq!(TestSetup::ranked(&ranking, "alice")["totalPoints"], 150);
    assert_eq!(TestSetup::ranked(&ranking, "alice")["wins"], 1);

    // Operator reconciles by hand
    let (status, _) = setup
        .send(
            "PATCH",
            &format!("/players/{}", setup.id_of("alice")),
            Some(json!({ "totalPoints": 240, "wins": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let ranking = setup
        .get_until("/ranking", |r| TestSetup::ranked(r, "alice")["wins"] == 0)
        .await;
    assert_eq!(TestSetup::ranked(&ranking, "alice")["totalPoints"], 240);
    assert_eq!(TestSetup::ranked(&ranking, "alice")["presence"], 1);
}

#[tokio::test]
async fn test_delete_week_keeps_totals() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let first = setup.submit_week(&[("alice", 1)], false).await;
    let second = setup.submit_week(&[("bob", 1)], false).await;

    let weeks = setup
        .get_until("/weeks", |w| w.as_array().map(|w| w.len()) == Some(2))
        .await;
    // Newest first
    assert_eq!(weeks[0]["id"], second.as_str());
    assert_eq!(weeks[1]["id"], first.as_str());

    let (status, _) = setup
        .send("DELETE", &format!("/weeks/{first}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = setup
        .send("DELETE", &format!("/weeks/{first}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    setup
        .get_until("/weeks", |w| w.as_array().map(|w| w.len()) == Some(1))
        .await;
    let ranking = setup.get_until("/ranking", |r| players_scored(r) == 2).await;
    assert_eq!(TestSetup::ranked(&ranking, "alice")["totalPoints"], 150);
}

#[tokio::test]
async fn test_remove_player_cascades_through_history() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let shared = setup.submit_week(&[("alice", 1), ("bob", 2)], false).await;
    let solo = setup.submit_week(&[("alice", 1)], false).await;
    let untouched = setup.submit_week(&[("carol", 1)], false).await;

    let (status, _) = setup
        .send("DELETE", &format!("/players/{}", setup.id_of("alice")), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let weeks = setup
        .get_until("/weeks", |w| w.as_array().map(|w| w.len()) == Some(2))
        .await;
    let ids: Vec<&str> = weeks
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&shared.as_str()));
    assert!(ids.contains(&untouched.as_str()));
    assert!(!ids.contains(&solo.as_str()));

    let shared_week = weeks
        .as_array()
        .unwrap()
        .iter()
        .find(|w| w["id"] == shared.as_str())
        .unwrap();
    let results = shared_week["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["playerId"], setup.id_of("bob").as_str());

    let players = setup
        .get_until("/players", |p| p.as_array().map(|p| p.len()) == Some(2))
        .await;
    assert!(players
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["name"] != "alice"));

    let (status, _) = setup
        .send("DELETE", &format!("/players/{}", setup.id_of("alice")), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ties_keep_registration_order() {
    let setup = TestSetupBuilder::new()
        .with_players(vec!["zed", "amy", "kim"])
        .build()
        .await;

    let ranking = setup
        .get_until("/ranking", |r| r["players"].as_array().map(|p| p.len()) == Some(3))
        .await;

    let order: Vec<(&str, u64)> = ranking["players"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| (p["name"].as_str().unwrap(), p["rank"].as_u64().unwrap()))
        .collect();
    assert_eq!(order, vec![("zed", 1), ("amy", 2), ("kim", 3)]);
}

#[tokio::test]
async fn test_player_registration_rules() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    let (status, _) = setup
        .send("POST", "/players", Some(json!({ "name": "ALICE" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = setup
        .send("POST", "/players", Some(json!({ "name": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = setup
        .send("POST", "/players", Some(json!({ "name": "dave" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["totalPoints"], 0);
    assert_eq!(body["accumulatedValue"], 0.0);
}

#[tokio::test]
async fn test_accumulated_value_is_summed_in_ranking() {
    let setup = TestSetupBuilder::new().with_three_players().build().await;

    for (name, value) in [("alice", 10.5), ("bob", 4.0)] {
        let (status, _) = setup
            .send(
                "PATCH",
                &format!("/players/{}", setup.id_of(name)),
                Some(json!({ "accumulatedValue": value })),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (status, _) = setup
        .send(
            "PATCH",
            &format!("/players/{}", setup.id_of("carol")),
            Some(json!({ "accumulatedValue": -1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ranking = setup
        .get_until("/ranking", |r| r["totalAccumulatedValue"] == 14.5)
        .await;
    assert_eq!(TestSetup::ranked(&ranking, "carol")["accumulatedValue"], 0.0);
}

#[tokio::test]
async fn test_denied_writes_surface_the_store_message() {
    let store = Arc::new(SwitchableStore::new());
    let setup = TestSetupBuilder::new()
        .with_store(store.clone())
        .with_three_players()
        .build()
        .await;

    store.deny_writes(true);
    let (status, body) = setup
        .send("POST", "/weeks", Some(setup.week_body(&[("alice", 1)], false)))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("PERMISSION_DENIED"));

    store.deny_writes(false);
    let weeks = setup.state.league.ledger().weeks().await.unwrap();
    assert!(weeks.is_empty());
    let players = setup.state.league.ledger().players().await.unwrap();
    assert!(players.iter().all(|p| p.presence == 0));
}
