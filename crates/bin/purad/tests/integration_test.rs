//! End-to-end smoke tests for the full purad stack.
//!
//! Each test wires the complete application (virtual Pura cloud, coordinator,
//! entity registry, timer service, real axum router) and exercises the HTTP
//! layer via `tower::ServiceExt::oneshot` — no TCP port is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use purahub_adapter_http_axum::router;
use purahub_adapter_http_axum::state::AppState;
use purahub_adapter_virtual::VirtualPuraApi;
use purahub_app::registry::EntityRegistry;
use purahub_app::services::coordinator::DeviceCoordinator;
use serde_json::{Value, json};
use tower::ServiceExt;

const WALL: &str = "a4:cf:12:34:56:01";
const MINI: &str = "d0:8b:7e:00:00:02";
const CAR: &str = "e1:22:33:00:00:03";

type State = AppState<VirtualPuraApi, Arc<EntityRegistry>>;

/// Build the wired state the way `main` does, minus the polling task.
async fn state() -> State {
    let coordinator = Arc::new(DeviceCoordinator::new(VirtualPuraApi::default()));
    coordinator
        .refresh()
        .await
        .expect("virtual cloud should answer");
    let registry = Arc::new(EntityRegistry::new());
    registry.sync(&coordinator.devices().await);
    AppState::new(coordinator, registry)
}

async fn send(state: &State, request: Request<Body>) -> (StatusCode, Value) {
    let response = router::build(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn call(service: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/services/pura/{service}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn start_timer(body: &Value) -> Request<Body> {
    call("start_timer", body)
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let state = state().await;
    let response = router::build(state).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

// ---------------------------------------------------------------------------
// Device snapshot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_list_virtual_devices() {
    let (status, body) = send(&state().await, get("/api/devices")).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["title"].as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["Living Room Diffuser", "Office Diffuser", "Car Diffuser"]
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_device() {
    let (status, _) = send(&state().await, get("/api/devices/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_redact_diagnostics() {
    let (status, body) = send(&state().await, get("/api/diagnostics")).await;

    assert_eq!(status, StatusCode::OK);
    let wall = &body["devices"][0];
    assert_eq!(wall["deviceId"], "**REDACTED**");
    assert_eq!(wall["serialNumber"], "**REDACTED**");
    assert_eq!(wall["deviceLocation"]["longitude"], "**REDACTED**");
    assert_eq!(wall["bay1"]["code"], "LAV01");
}

// ---------------------------------------------------------------------------
// start_timer service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_start_timer_through_entity_id() {
    let state = state().await;

    let (status, body) = send(
        &state,
        start_timer(&json!({
            "entity_id": "select.living_room_diffuser_fragrance",
            "slot": "2",
            "intensity": 7,
            "duration": {"hours": 1},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"dispatched": 1}));

    let sent = state.coordinator.api().sent_commands();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].device_id.as_str(), WALL);
    assert_eq!(sent[0].slot.number(), 2);
    assert_eq!(sent[0].intensity.value(), 7);
    assert_eq!(sent[0].duration.as_secs(), 3600);

    // The service refreshes after dispatch, so the timer is visible.
    let (_, device) = send(&state, get(&format!("/api/devices/{WALL}"))).await;
    assert_eq!(device["controller"], "timer");
    assert!(device["timer_end"].is_string());
    assert_eq!(device["timer_level"], "medium");
}

#[tokio::test]
async fn should_start_timer_on_every_targeted_device_once() {
    let state = state().await;

    let (status, body) = send(
        &state,
        start_timer(&json!({
            "device_id": [WALL, MINI],
            "entity_id": "sensor.office_diffuser_timer",
            "intensity": 4,
            "duration": "00:30:00",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"dispatched": 2}));
    let sent: Vec<(String, u8)> = state
        .coordinator
        .api()
        .sent_commands()
        .iter()
        .map(|c| (c.device_id.to_string(), c.slot.number()))
        .collect();
    // Each device picks its own fuller cartridge: bay 2 on the wall unit,
    // the only bay on the mini.
    assert_eq!(sent, vec![(WALL.to_string(), 2), (MINI.to_string(), 1)]);
}

#[tokio::test]
async fn should_reject_car_diffuser_without_dispatching() {
    let state = state().await;

    let (status, body) = send(
        &state,
        start_timer(&json!({"device_id": [WALL, CAR], "intensity": 5, "duration": 600})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Car Diffuser does not support fragrance timers");
    assert!(state.coordinator.api().sent_commands().is_empty());
}

#[tokio::test]
async fn should_reject_empty_slot_on_single_bay_device() {
    let state = state().await;

    let (status, body) = send(
        &state,
        start_timer(&json!({"device_id": MINI, "slot": 2, "intensity": 5, "duration": 600})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "fragrance slot 2 is not available on Office Diffuser"
    );
}

#[tokio::test]
async fn should_return_not_found_for_unknown_target() {
    let state = state().await;

    let (status, _) = send(
        &state,
        start_timer(&json!({
            "entity_id": "select.kitchen_fragrance",
            "intensity": 5,
            "duration": 60,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.coordinator.api().sent_commands().is_empty());
}

#[tokio::test]
async fn should_return_bad_gateway_when_cloud_rejects() {
    let state = state().await;
    state.coordinator.api().fail_next_command(MINI);

    let (status, _) = send(
        &state,
        start_timer(&json!({"device_id": MINI, "intensity": 5, "duration": 60})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// ---------------------------------------------------------------------------
// Direct controls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_select_fragrance_then_adjust_its_intensity() {
    let state = state().await;

    let (status, body) = send(
        &state,
        call(
            "select_fragrance",
            &json!({"entity_id": "select.living_room_diffuser_fragrance", "option": "slot_2"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"dispatched": 1}));

    let (_, device) = send(&state, get(&format!("/api/devices/{WALL}"))).await;
    assert_eq!(device["fragrance"], "slot_2");
    assert_eq!(device["active_fragrance"], "Lemon Verbena");
    assert_eq!(device["bays"][1]["active"], true);

    let (status, _) = send(
        &state,
        call(
            "set_intensity",
            &json!({"entity_id": "select.living_room_diffuser_intensity", "intensity": "strong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let controls = state.coordinator.api().sent_controls();
    assert_eq!(controls.len(), 2);
    assert_eq!(
        serde_json::to_value(&controls[1].control).unwrap(),
        json!({"action": "set_intensity", "slot": 2, "controller": "always_on", "intensity": 10})
    );
}

#[tokio::test]
async fn should_refuse_intensity_when_nothing_is_diffusing() {
    let state = state().await;

    let (status, body) = send(
        &state,
        call("set_intensity", &json!({"device_id": WALL, "intensity": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "no fragrance is active on Living Room Diffuser; \
         select a fragrance before adjusting intensity"
    );
    assert!(state.coordinator.api().sent_controls().is_empty());
}

#[tokio::test]
async fn should_block_fragrance_selection_while_away() {
    let state = state().await;

    let (status, _) = send(
        &state,
        call(
            "set_away_mode",
            &json!({"entity_id": "switch.living_room_diffuser_away_mode", "enabled": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let armed = serde_json::to_value(&state.coordinator.api().sent_controls()[0]).unwrap();
    assert_eq!(armed["control"]["location"]["radius"], 150);

    let (_, device) = send(&state, get(&format!("/api/devices/{WALL}"))).await;
    assert_eq!(device["away"], true);

    let (status, body) = send(
        &state,
        call("select_fragrance", &json!({"device_id": WALL, "option": "slot_1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("away mode is active"));

    let (status, _) = send(
        &state,
        call("select_fragrance", &json!({"device_id": WALL, "option": "off"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn should_refuse_ambient_mode_on_mini() {
    let state = state().await;

    let (status, body) = send(
        &state,
        call("set_ambient_mode", &json!({"device_id": [WALL, MINI], "enabled": true})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Office Diffuser does not support ambient mode");
    assert!(state.coordinator.api().sent_controls().is_empty());
}

#[tokio::test]
async fn should_turn_on_nightlight_keeping_its_colour() {
    let state = state().await;

    let (status, _) = send(
        &state,
        call(
            "nightlight_on",
            &json!({"entity_id": "light.office_diffuser_nightlight", "brightness": 255}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, device) = send(&state, get(&format!("/api/devices/{MINI}"))).await;
    assert_eq!(
        device["nightlight"],
        json!({"active": true, "brightness": 10, "color": "6a5acd"})
    );
}

#[tokio::test]
async fn should_set_car_intensity_on_reported_bay() {
    let state = state().await;

    let (status, _) = send(
        &state,
        call(
            "set_intensity",
            &json!({"entity_id": "number.car_diffuser_intensity", "intensity": 7}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let controls = state.coordinator.api().sent_controls();
    assert_eq!(controls[0].device_id.as_str(), CAR);
    assert_eq!(
        serde_json::to_value(&controls[0].control).unwrap(),
        json!({"action": "set_intensity", "slot": 1, "controller": "always_on", "intensity": 7})
    );
}

// ---------------------------------------------------------------------------
// Pushed changes
// ---------------------------------------------------------------------------

fn push(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/push")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn should_apply_pushed_device_change() {
    let state = state().await;

    let (status, body) = send(
        &state,
        push(&json!({
            "eventType": "MODIFY",
            "recordType": "DEVICE",
            "deviceId": WALL,
            "deviceRecord": {"connected": false, "bay2": {"code": ""}},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"applied": true}));

    let (_, device) = send(&state, get(&format!("/api/devices/{WALL}"))).await;
    assert_eq!(device["connected"], false);
    assert_eq!(device["networked"], true);
    assert_eq!(device["away"], false);
    assert_eq!(device["bays"][1]["installed"], false);
    assert_eq!(device["bays"][0]["fragrance"], "French Lavender");
}

#[tokio::test]
async fn should_reject_push_that_breaks_the_record() {
    let state = state().await;

    let (status, body) = send(
        &state,
        push(&json!({
            "eventType": "MODIFY",
            "recordType": "DEVICE",
            "deviceId": WALL,
            "deviceRecord": {"deviceType": "toaster"},
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("pushed record is malformed"));
    let (_, device) = send(&state, get(&format!("/api/devices/{WALL}"))).await;
    assert_eq!(device["device_type"], "wall");
}

#[tokio::test]
async fn should_survive_pushed_runtime_at_the_integer_limit() {
    let state = state().await;

    let (status, _) = send(
        &state,
        push(&json!({
            "eventType": "MODIFY",
            "recordType": "DEVICE",
            "deviceId": WALL,
            "deviceRecord": {
                "lastConnectedAt": null,
                "bay1": {"wearingTime": i64::MAX, "activeAt": 1},
            },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, device) = send(&state, get(&format!("/api/devices/{WALL}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["bays"][0]["runtime_seconds"], i64::MAX);
    assert_eq!(device["bays"][0]["remaining_percent"], 0.0);
}

#[tokio::test]
async fn should_acknowledge_push_for_unknown_device() {
    let (status, body) = send(
        &state().await,
        push(&json!({"eventType": "REMOVE", "recordType": "TIMER", "deviceId": "ghost"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"applied": false}));
}
