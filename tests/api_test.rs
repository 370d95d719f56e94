//! End-to-end tests against a running API server

mod common;

use std::time::{Duration as StdDuration, Instant};

use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};

use common::{create_user, json_of, TestServer};

fn iso(dt: chrono::DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query string for a window around now
fn around_now() -> String {
    let now = Utc::now();
    format!(
        "startDate={}&endDate={}",
        iso(now - Duration::days(1)),
        iso(now + Duration::days(1))
    )
}

/// Billable project, a task under it and one completed 30 minute action
fn seed_billed_work(server: &TestServer, token: &str) -> (Value, Value, Value) {
    let (status, project) = json_of(server.post("/api/projects", token).send_json(json!({
        "name": "Client",
        "isBillable": true,
        "hourlyRate": 100.0,
    })));
    assert_eq!(status, 201);

    let (status, task) = json_of(server.post("/api/tasks", token).send_json(json!({
        "name": "Build",
        "projectId": project["id"],
    })));
    assert_eq!(status, 201);

    let (status, action) = json_of(
        server
            .post("/api/timer/start", token)
            .send_json(json!({ "taskId": task["id"] })),
    );
    assert_eq!(status, 201);
    let action_id = action["id"].as_str().unwrap().to_string();

    let (status, _) = json_of(
        server
            .put(&format!("/api/timer/end/{}", action_id), token)
            .send_string(""),
    );
    assert_eq!(status, 200);

    let start = Utc::now() - Duration::hours(2);
    let (status, action) = json_of(
        server
            .put(&format!("/api/timer/actions/{}", action_id), token)
            .send_json(json!({
                "userStartTime": iso(start),
                "userEndTime": iso(start + Duration::minutes(30)),
                "note": "Sprint planning",
            })),
    );
    assert_eq!(status, 200);
    (project, task, action)
}

#[test]
fn test_health_needs_no_token() {
    let server = TestServer::start();
    let (status, body) = json_of(ureq::get(&server.url("/api/health")).call());
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
}

#[test]
fn test_missing_or_bad_token_is_401() {
    let server = TestServer::start();

    let (status, body) = json_of(ureq::get(&server.url("/api/projects")).call());
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    let (status, _) = json_of(server.get("/api/projects", "not-a-token").call());
    assert_eq!(status, 401);
}

#[test]
fn test_me_returns_requester() {
    let server = TestServer::start();
    let (user, token) = create_user(&server.store, "ada@example.com");
    let (status, body) = json_of(server.get("/api/auth/me", &token).call());
    assert_eq!(status, 200);
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["email"], "ada@example.com");
}

#[test]
fn test_project_crud() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");

    let (status, project) = json_of(server.post("/api/projects", &token).send_json(json!({
        "name": "Side gig",
        "isBillable": false,
        "hourlyRate": 80.0,
    })));
    assert_eq!(status, 201);
    assert_eq!(project["hourlyRate"], 0.0);
    let id = project["id"].as_str().unwrap().to_string();

    let (status, updated) = json_of(
        server
            .put(&format!("/api/projects/{}", id), &token)
            .send_json(json!({ "name": "Main gig", "isBillable": true, "hourlyRate": 120.0 })),
    );
    assert_eq!(status, 200);
    assert_eq!(updated["name"], "Main gig");
    assert_eq!(updated["hourlyRate"], 120.0);

    let (status, list) = json_of(server.get("/api/projects", &token).call());
    assert_eq!(status, 200);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, deleted) = json_of(
        server
            .delete(&format!("/api/projects/{}", id), &token)
            .call(),
    );
    assert_eq!(status, 200);
    assert_eq!(deleted["success"], true);
    assert_eq!(deleted["deletedProject"]["id"], id.as_str());

    let (status, _) = json_of(
        server
            .delete(&format!("/api/projects/{}", id), &token)
            .call(),
    );
    assert_eq!(status, 404);
}

#[test]
fn test_billable_project_requires_rate() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    let (status, body) = json_of(
        server
            .post("/api/projects", &token)
            .send_json(json!({ "name": "Client", "isBillable": true })),
    );
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[test]
fn test_other_users_project_is_forbidden() {
    let server = TestServer::start();
    let (_, owner) = create_user(&server.store, "ada@example.com");
    let (_, intruder) = create_user(&server.store, "eve@example.com");

    let (_, project) = json_of(
        server
            .post("/api/projects", &owner)
            .send_json(json!({ "name": "Private" })),
    );
    let path = format!("/api/projects/{}", project["id"].as_str().unwrap());

    let (status, _) = json_of(
        server
            .put(&path, &intruder)
            .send_json(json!({ "name": "Mine now" })),
    );
    assert_eq!(status, 403);

    let (status, _) = json_of(server.delete(&path, &intruder).call());
    assert_eq!(status, 403);

    let (_, list) = json_of(server.get("/api/projects", &intruder).call());
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_route_and_missing_id() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");

    let (status, _) = json_of(server.get("/api/nope", &token).call());
    assert_eq!(status, 404);

    let (status, body) = json_of(server.delete("/api/projects", &token).call());
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Resource id is required");

    let (status, _) = json_of(server.put("/api/timer/end/missing", &token).send_string(""));
    assert_eq!(status, 404);
}

#[test]
fn test_project_with_tasks_cannot_be_deleted() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    let (project, _, _) = seed_billed_work(&server, &token);

    let (status, body) = json_of(
        server
            .delete(
                &format!("/api/projects/{}", project["id"].as_str().unwrap()),
                &token,
            )
            .call(),
    );
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[test]
fn test_timer_flow_feeds_stats() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    let (project, task, action) = seed_billed_work(&server, &token);
    assert_eq!(action["isCompleted"], true);
    assert_eq!(action["note"], "Sprint planning");

    let (status, stats) = json_of(
        server
            .get(&format!("/api/projects/stats?{}", around_now()), &token)
            .call(),
    );
    assert_eq!(status, 200);
    assert_eq!(stats["totalHours"], 0.5);
    assert_eq!(stats["totalAmount"], 50.0);
    assert_eq!(stats["projectStats"][0]["projectId"], project["id"]);
    assert_eq!(stats["projectStats"][0]["recordCount"], 1);
    assert_eq!(stats["taskStats"][0]["taskId"], task["id"]);
    assert_eq!(stats["dailyStats"].as_array().unwrap().len(), 1);

    let (_, tasks) = json_of(server.get("/api/tasks", &token).call());
    let cached = tasks
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == task["id"])
        .unwrap();
    assert_eq!(cached["stats"]["totalActions"], 1);
    assert_eq!(cached["stats"]["totalDuration"], 30 * 60 * 1000);

    let (status, page) = json_of(
        server
            .get(
                &format!(
                    "/api/projects/{}/actions?page=1&limit=10",
                    project["id"].as_str().unwrap()
                ),
                &token,
            )
            .call(),
    );
    assert_eq!(status, 200);
    assert_eq!(page["pagination"]["totalItems"], 1);
    assert_eq!(page["pagination"]["hasMore"], false);
    assert_eq!(page["actions"][0]["taskName"], "Build");
}

#[test]
fn test_stats_requires_date_range() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    let (status, _) = json_of(
        server
            .get("/api/projects/stats?startDate=2024-05-01", &token)
            .call(),
    );
    assert_eq!(status, 400);
}

#[test]
fn test_timer_start_without_task_uses_default() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");

    let (status, action) = json_of(server.post("/api/timer/start", &token).send_string(""));
    assert_eq!(status, 201);
    assert_eq!(action["note"], "Focus");
    assert_eq!(action["isCompleted"], false);

    let (_, tasks) = json_of(server.get("/api/tasks", &token).call());
    let default = tasks
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["isDefault"] == true)
        .unwrap();
    assert_eq!(default["id"], action["taskId"]);
}

#[test]
fn test_habit_completion_counts_today() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");

    let (status, habit) = json_of(server.post("/api/tasks", &token).send_json(json!({
        "name": "Push-ups",
        "type": "habit",
    })));
    assert_eq!(status, 201);
    assert_eq!(habit["dailyGoal"], 10);

    let (status, body) = json_of(
        server
            .post("/api/timer/habit", &token)
            .send_json(json!({ "taskId": habit["id"] })),
    );
    assert_eq!(status, 201);
    assert_eq!(body["action"]["type"], "habit");
    assert_eq!(body["task"]["habitStats"]["todayCompletedCount"], 1);
    assert_eq!(body["task"]["habitStats"]["currentStreak"], 1);
    assert_eq!(body["goalReached"], false);

    let (_, daily_once) = json_of(server.post("/api/tasks", &token).send_json(json!({
        "name": "Meditate",
        "type": "habit",
        "dailyGoal": 1,
    })));
    let (status, body) = json_of(
        server
            .post("/api/timer/habit", &token)
            .send_json(json!({ "taskId": daily_once["id"] })),
    );
    assert_eq!(status, 201);
    assert_eq!(body["goalReached"], true);

    let (_, project_task) = json_of(
        server
            .post("/api/tasks", &token)
            .send_json(json!({ "name": "Code" })),
    );
    let (status, _) = json_of(
        server
            .post("/api/timer/habit", &token)
            .send_json(json!({ "taskId": project_task["id"] })),
    );
    assert_eq!(status, 400);
}

#[test]
fn test_system_views_are_seeded_and_protected() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");

    let (status, views) = json_of(server.get("/api/reports/views", &token).call());
    assert_eq!(status, 200);
    let views = views.as_array().unwrap();
    assert!(views.iter().any(|v| v["name"] == "DaDuo"));
    let system = views.iter().find(|v| v["isSystem"] == true).unwrap();

    let (status, _) = json_of(
        server
            .delete(
                &format!("/api/reports/views/{}", system["id"].as_str().unwrap()),
                &token,
            )
            .call(),
    );
    assert_eq!(status, 403);

    let (status, mine) = json_of(server.post("/api/reports/views", &token).send_json(json!({
        "name": "Weekly",
        "fields": ["date", "hours"],
        "format": "csv",
    })));
    assert_eq!(status, 201);
    let (status, _) = json_of(
        server
            .delete(
                &format!("/api/reports/views/{}", mine["id"].as_str().unwrap()),
                &token,
            )
            .call(),
    );
    assert_eq!(status, 200);
}

#[test]
fn test_csv_export_streams_and_removes_file() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    seed_billed_work(&server, &token);

    let resp = server
        .get(
            &format!(
                "/api/reports/export?{}&format=csv&fields=project,task,duration,amount",
                around_now()
            ),
            &token,
        )
        .call()
        .expect("export failed");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("Content-Type"), Some("text/csv"));
    let disposition = resp.header("Content-Disposition").unwrap_or_default().to_string();
    assert!(disposition.starts_with("attachment; filename=\"time-report-"));
    assert!(disposition.ends_with(".csv\""));

    let body = resp.into_string().unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines[0], "Project,Task,Duration (minutes),Amount");
    assert_eq!(lines[1], "Client,Build,30,50.00");
    assert_eq!(lines.len(), 2);

    // The temp file is deleted once the response is sent
    let deadline = Instant::now() + StdDuration::from_secs(2);
    loop {
        let remaining = std::fs::read_dir(&server.export_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        if remaining == 0 {
            break;
        }
        assert!(Instant::now() < deadline, "export file was not removed");
        std::thread::sleep(StdDuration::from_millis(20));
    }
}

#[test]
fn test_export_without_records_is_404() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    let (status, body) = json_of(
        server
            .get(&format!("/api/reports/export?{}", around_now()), &token)
            .call(),
    );
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
}

#[test]
fn test_out_of_range_paging_is_rejected_and_server_survives() {
    let server = TestServer::start();
    let (_, token) = create_user(&server.store, "ada@example.com");
    let (project, _, _) = seed_billed_work(&server, &token);
    let base = format!("/api/projects/{}/actions", project["id"].as_str().unwrap());

    let (status, body) = json_of(
        server
            .get(&format!("{}?page=18446744073709551615&limit=2", base), &token)
            .call(),
    );
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    let (status, _) = json_of(
        server
            .get(&format!("{}?page=9223372036854775807&limit=100", base), &token)
            .call(),
    );
    assert_eq!(status, 400);

    let (status, _) = json_of(server.get(&format!("{}?limit=101", base), &token).call());
    assert_eq!(status, 400);

    let (status, body) = json_of(ureq::get(&server.url("/api/health")).call());
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let (status, page) = json_of(
        server
            .get(&format!("{}?page=2&limit=100", base), &token)
            .call(),
    );
    assert_eq!(status, 200);
    assert!(page["actions"].as_array().unwrap().is_empty());
    assert_eq!(page["pagination"]["totalItems"], 1);
}
