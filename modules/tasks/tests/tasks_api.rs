use std::sync::Arc;

use accounts::AccountsModule;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use modkit::{DbModule, Module, ModuleCtxBuilder, RestfulModule};
use modkit_db::{ConnectOpts, DbHandle};
use serde_json::{json, Value};
use tasks::{TasksApi, TasksError, TasksModule};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use tower_cookies::CookieManagerLayer;

struct App {
    router: Router,
    api: Arc<dyn TasksApi>,
    db: Arc<DbHandle>,
}

async fn setup() -> App {
    let db = Arc::new(
        DbHandle::connect("sqlite::memory:", ConnectOpts::default())
            .await
            .unwrap(),
    );
    let base = ModuleCtxBuilder::new(CancellationToken::new())
        .with_db(db.clone())
        .build();
    let accounts_ctx = base.clone().for_module("accounts");
    let tasks_ctx = base.for_module("tasks");

    let accounts = AccountsModule::new();
    let tasks = TasksModule::new();
    accounts.init(&accounts_ctx).await.unwrap();
    tasks.init(&tasks_ctx).await.unwrap();
    accounts.migrate(&db).await.unwrap();
    tasks.migrate(&db).await.unwrap();

    let router = accounts.register_rest(&accounts_ctx, Router::new()).unwrap();
    let router = tasks
        .register_rest(&tasks_ctx, router)
        .unwrap()
        .layer(CookieManagerLayer::new());

    App {
        router,
        api: tasks_ctx.client_hub().get::<dyn TasksApi>().unwrap(),
        db,
    }
}

fn request(method: &str, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        b = b.header(header::COOKIE, c);
    }
    match body {
        Some(v) => b
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => b.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Sign up and return the `name=value` session cookie.
async fn sign_up(app: &Router, email: &str) -> String {
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/signup",
            Some(json!({ "email": email, "password": "pw" })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_owned)
        .unwrap()
}

fn timed_task(title: &str) -> Value {
    json!({
        "task_title": title,
        "description": "  notes  ",
        "priority": "high",
        "time_required": 2,
        "tag": "work"
    })
}

fn scheduled_task(title: &str, date: &str, from: &str, to: &str) -> Value {
    json!({
        "task_title": title,
        "schedule_date": date,
        "schedule_from": from,
        "schedule_to": to,
    })
}

async fn create(app: &Router, cookie: &str, task: Value) -> Value {
    let (status, body) = send(
        app,
        request("POST", "/api/tasks", Some(json!({ "task": task })), Some(cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["task"].clone()
}

#[tokio::test]
async fn task_routes_require_a_session() {
    let app = setup().await;
    for (method, uri) in [
        ("GET", "/api/tasks"),
        ("GET", "/api/tasks/1"),
        ("DELETE", "/api/tasks/1"),
        ("GET", "/api/analytics"),
        ("GET", "/api/calendar-tasks?month=1&year=2025"),
    ] {
        let (status, body) = send(&app.router, request(method, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body, json!({ "success": false, "message": "Unauthorized" }));
    }
}

#[tokio::test]
async fn create_normalizes_and_stores_the_task() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;

    let task = create(&app.router, &cookie, timed_task("Write report")).await;
    assert_eq!(task["task_title"], "Write report");
    assert_eq!(task["description"], "notes");
    assert_eq!(task["priority"], "High");
    assert_eq!(task["tag"], "WORK");
    assert_eq!(task["time_required"], "2");
    assert_eq!(task["schedule_date"], "F");
    assert_eq!(task["schedule_from"], "F");
    assert_eq!(task["schedule_to"], "F");
    assert_eq!(task["completed"], false);
    assert!(task["review"].is_null());

    let id = task["id"].as_i64().unwrap();
    let (status, body) = send(
        &app.router,
        request("GET", &format!("/api/tasks/{id}"), None, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["task"]["id"], id);
}

#[tokio::test]
async fn create_rejects_bad_input_without_persisting() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;

    let (status, body) = send(
        &app.router,
        request("POST", "/api/tasks", Some(json!({})), Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Task data is required");

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/tasks",
            Some(json!({ "task": { "task_title": "  ", "time_required": "1" } })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Task title is required");

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/tasks",
            Some(json!({ "task": scheduled_task("Gym", "32/01/2025", "23:59", "00:00") })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Task has validation warnings");
    let warnings = body["warnings"].as_array().unwrap();
    assert!(warnings.contains(&json!("schedule_date is not in DD/MM/YYYY format.")));
    assert!(warnings.contains(&json!("schedule_to must be later than schedule_from.")));

    let (_, body) = send(&app.router, request("GET", "/api/tasks", None, Some(&cookie))).await;
    assert_eq!(body["tasks"], json!([]));
}

#[tokio::test]
async fn validate_task_is_public_and_reports_in_band() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/validate-task",
            Some(json!({ "task": { "task_title": "Nothing", "description": "x" } })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(body["task"]["schedule_date"], "F");

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/validate-task",
            Some(json!({ "task": scheduled_task("Gym", "01/02/2025", "09:00", "10:00") })),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["warnings"], json!([]));
    assert_eq!(body["task"]["schedule_from"], "09:00");

    for empty in [json!({ "task": {} }), json!({})] {
        let (status, body) =
            send(&app.router, request("POST", "/api/validate-task", Some(empty), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["warnings"],
            json!(["WARNING! You either need time required for the task or scheduled date and schedule time. These values are currently missing in your note."])
        );
        assert_eq!(body["task"]["schedule_to"], "F");
    }
}

#[tokio::test]
async fn tasks_are_private_to_their_owner() {
    let app = setup().await;
    let alice = sign_up(&app.router, "alice@example.com").await;
    let bob = sign_up(&app.router, "bob@example.com").await;

    let id = create(&app.router, &alice, timed_task("Secret"))
        .await["id"]
        .as_i64()
        .unwrap();

    let (status, body) = send(
        &app.router,
        request("GET", &format!("/api/tasks/{id}"), None, Some(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let (status, body) = send(
        &app.router,
        request(
            "PUT",
            &format!("/api/tasks/{id}"),
            Some(json!({ "task": timed_task("Mine now") })),
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found or not authorized");

    let (status, _) = send(
        &app.router,
        request("DELETE", &format!("/api/tasks/{id}"), None, Some(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app.router, request("GET", "/api/tasks", None, Some(&bob))).await;
    assert_eq!(body["tasks"], json!([]));
    let (_, body) = send(&app.router, request("GET", "/api/tasks", None, Some(&alice))).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;
    create(&app.router, &cookie, timed_task("first")).await;
    create(&app.router, &cookie, timed_task("second")).await;
    create(&app.router, &cookie, timed_task("third")).await;

    let (_, body) = send(&app.router, request("GET", "/api/tasks", None, Some(&cookie))).await;
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["task_title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn update_review_complete_and_delete() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;
    let id = create(&app.router, &cookie, timed_task("Draft"))
        .await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/tasks/{id}");

    let (status, body) = send(
        &app.router,
        request(
            "PUT",
            &uri,
            Some(json!({ "task": scheduled_task("Draft v2", "05/03/2025", "9:00", "11:30") })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["task"]["task_title"], "Draft v2");
    assert_eq!(body["task"]["priority"], "Medium");
    assert_eq!(body["task"]["tag"], "OTHER");
    assert_eq!(body["task"]["schedule_from"], "9:00");

    let (status, body) = send(
        &app.router,
        request(
            "PUT",
            &uri,
            Some(json!({ "task": { "task_title": "Draft v3", "time_required": "two" } })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["warnings"],
        json!(["time_required must be in decimal format without any text."])
    );

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("{uri}/review"),
            Some(json!({ "review": "   " })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Review text is required");

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("{uri}/review"),
            Some(json!({ "review": "Went well" })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Review added successfully");

    let (status, body) = send(
        &app.router,
        request("POST", &format!("{uri}/complete"), None, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task status updated");
    assert_eq!(body["task"]["completed"], true);
    assert_eq!(body["task"]["review"], "Went well");

    let (_, body) = send(
        &app.router,
        request("POST", &format!("{uri}/complete"), None, Some(&cookie)),
    )
    .await;
    assert_eq!(body["task"]["completed"], false);

    let (status, body) = send(&app.router, request("DELETE", &uri, None, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, _) = send(&app.router, request("GET", &uri, None, Some(&cookie))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_inserts_valid_and_reports_invalid() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/tasks/batch",
            Some(json!({ "tasks": [
                timed_task("ok one"),
                { "task_title": "no bucket" },
                scheduled_task("ok two", "01/01/2025", "08:00", "09:00"),
                { "description": "untitled", "time_required": "1" }
            ] })),
            Some(&cookie),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["created"].as_array().unwrap().len(), 2);

    let failed = body["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["index"], 1);
    assert_eq!(failed[0]["task_title"], "no bucket");
    assert_eq!(failed[1]["index"], 3);
    assert_eq!(failed[1]["warnings"], json!(["Task title is required"]));

    let (status, _) = send(
        &app.router,
        request("POST", "/api/tasks/batch", Some(json!({ "tasks": [] })), Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_counts_per_owner() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;

    let (_, body) = send(&app.router, request("GET", "/api/analytics", None, Some(&cookie))).await;
    assert_eq!(body["analytics"]["completion_rate"], 0);
    assert_eq!(body["analytics"]["total_tasks"], 0);

    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        ids.push(create(&app.router, &cookie, timed_task(title)).await["id"].as_i64().unwrap());
    }
    create(
        &app.router,
        &cookie,
        scheduled_task("d", "02/02/2025", "10:00", "11:00"),
    )
    .await;
    send(
        &app.router,
        request("POST", &format!("/api/tasks/{}/complete", ids[0]), None, Some(&cookie)),
    )
    .await;

    let (status, body) = send(&app.router, request("GET", "/api/analytics", None, Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    let a = &body["analytics"];
    assert_eq!(a["total_tasks"], 4);
    assert_eq!(a["completed_tasks"], 1);
    assert_eq!(a["completion_rate"], 25);
    assert_eq!(
        a["priority_distribution"],
        json!([{ "priority": "High", "count": 3 }, { "priority": "Medium", "count": 1 }])
    );
    assert_eq!(
        a["tag_distribution"],
        json!([{ "tag": "OTHER", "count": 1 }, { "tag": "WORK", "count": 3 }])
    );
}

#[tokio::test]
async fn calendar_filters_by_month_and_year() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;
    create(&app.router, &cookie, scheduled_task("late", "20/03/2025", "14:00", "15:00")).await;
    create(&app.router, &cookie, scheduled_task("early", "05/03/2025", "08:00", "09:00")).await;
    create(&app.router, &cookie, scheduled_task("april", "05/04/2025", "08:00", "09:00")).await;
    create(&app.router, &cookie, scheduled_task("last year", "05/03/2024", "08:00", "09:00")).await;
    create(&app.router, &cookie, timed_task("unscheduled")).await;

    // rows written before strict date checks may carry a short year
    let (_, me) = send(&app.router, request("GET", "/api/me", None, Some(&cookie))).await;
    sqlx::query(
        "INSERT INTO tasks (user_id, task_title, schedule_date, schedule_from, schedule_to) \
         VALUES (?, 'short year', '05/03/25', '08:00', '09:00')",
    )
    .bind(me["user"]["id"].as_i64().unwrap())
    .execute(app.db.pool())
    .await
    .unwrap();

    let (status, body) = send(
        &app.router,
        request("GET", "/api/calendar-tasks?month=3&year=2025", None, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["task_title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["early", "late"]);

    let (status, body) = send(
        &app.router,
        request("GET", "/api/calendar-tasks?month=3&year=25", None, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"], json!([]));

    let (status, body) = send(
        &app.router,
        request("GET", "/api/calendar-tasks?month=3", None, Some(&cookie)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Month and year are required");
}

#[tokio::test]
async fn client_api_searches_and_overwrites() {
    let app = setup().await;
    let cookie = sign_up(&app.router, "a@example.com").await;
    let task = create(
        &app.router,
        &cookie,
        scheduled_task("Call Mom", "12/05/2025", "18:00", "18:30"),
    )
    .await;
    let id = task["id"].as_i64().unwrap();
    let user_id = task["user_id"].as_i64().unwrap();

    let found = app.api.find_by_title(user_id, "call mom").await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(id));
    assert!(app.api.find_by_title(user_id, "dentist").await.unwrap().is_none());
    assert!(app.api.find_by_title(user_id + 1, "call").await.unwrap().is_none());

    let dated = app
        .api
        .find_by_title_and_date(user_id, "MOM", "12/05")
        .await
        .unwrap();
    assert!(dated.is_some());
    assert!(app
        .api
        .find_by_title_and_date(user_id, "mom", "13/05/2025")
        .await
        .unwrap()
        .is_none());

    assert_eq!(app.api.tasks_on_date(user_id, "12/05/2025").await.unwrap().len(), 1);

    let mut fields = app.api.get_task(user_id, id).await.unwrap().fields();
    fields.schedule_to = "17:00".into();
    let err = app
        .api
        .overwrite_checked(user_id, id, fields.clone())
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<TasksError>(),
        Some(&TasksError::Rejected {
            message: "schedule_to must be later than schedule_from.".into()
        })
    );

    fields.schedule_to = "19:00".into();
    fields.priority = "low".into();
    let updated = app.api.overwrite_checked(user_id, id, fields).await.unwrap();
    assert_eq!(updated.schedule_to, "19:00");
    assert_eq!(updated.priority, "Low");

    let err = app
        .api
        .get_task(user_id, id + 100)
        .await
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<TasksError>(),
        Some(&TasksError::NotFound { id: id + 100 })
    );
}
