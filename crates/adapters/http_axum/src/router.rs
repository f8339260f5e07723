//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use purahub_app::ports::{PuraApi, TargetResolver};

use crate::state::AppState;

/// Assemble the application: `/health`, the JSON API under `/api`, and a
/// [`TraceLayer`] emitting one span per request.
pub fn build<A, R>(state: AppState<A, R>) -> Router
where
    A: PuraApi + 'static,
    R: TargetResolver + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use purahub_app::services::coordinator::DeviceCoordinator;
    use purahub_domain::control::{Control, ControlCommand};
    use purahub_domain::device::PuraDevice;
    use purahub_domain::error::PuraError;
    use purahub_domain::id::DeviceId;
    use purahub_domain::target::Target;
    use purahub_domain::timer::TimerCommand;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct StubApi {
        devices: Vec<PuraDevice>,
        sent: Mutex<Vec<TimerCommand>>,
        controls: Mutex<Vec<ControlCommand>>,
    }

    fn offline_error() -> PuraError {
        PuraError::device_command(std::io::Error::other("device offline"))
    }

    impl PuraApi for StubApi {
        fn get_devices(
            &self,
        ) -> impl Future<Output = Result<Vec<PuraDevice>, PuraError>> + Send {
            let devices = self.devices.clone();
            async move { Ok(devices) }
        }

        fn set_timer(
            &self,
            command: TimerCommand,
        ) -> impl Future<Output = Result<(), PuraError>> + Send {
            let result = if command.device_id.as_str() == "offline" {
                Err(offline_error())
            } else {
                self.sent.lock().unwrap().push(command);
                Ok(())
            };
            async move { result }
        }

        fn send_control(
            &self,
            command: ControlCommand,
        ) -> impl Future<Output = Result<(), PuraError>> + Send {
            let result = if command.device_id.as_str() == "offline" {
                Err(offline_error())
            } else {
                self.controls.lock().unwrap().push(command);
                Ok(())
            };
            async move { result }
        }
    }

    struct StubResolver;

    impl TargetResolver for StubResolver {
        fn resolve(
            &self,
            target: &Target,
        ) -> impl Future<Output = Result<Vec<DeviceId>, PuraError>> + Send {
            let ids = target.device_ids.clone();
            async move { Ok(ids) }
        }
    }

    fn wall(id: &str, name: &str) -> PuraDevice {
        serde_json::from_value(json!({
            "deviceId": id,
            "deviceType": "wall",
            "displayName": {"name": name},
            "model": 1,
            "hwVersion": "2.1",
            "serialNumber": "SN-1",
            "deviceLocation": {"latitude": 1.0, "longitude": 2.0},
            "bay1": {"code": "LAV01", "fragrance": {"name": "Lavender"}},
            "bay2": {"code": ""},
        }))
        .unwrap()
    }

    async fn test_state() -> AppState<StubApi, StubResolver> {
        let api = StubApi {
            devices: vec![wall("dev-a", "Office"), wall("offline", "Garage")],
            sent: Mutex::new(Vec::new()),
            controls: Mutex::new(Vec::new()),
        };
        let coordinator = Arc::new(DeviceCoordinator::new(api));
        coordinator.refresh().await.unwrap();
        AppState::new(coordinator, StubResolver)
    }

    async fn send(
        state: AppState<StubApi, StubResolver>,
        request: Request<Body>,
    ) -> (StatusCode, Value) {
        let response = build(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_request(uri: &str) -> Request<Body> {
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

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(test_state().await);

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_list_device_summaries() {
        let (status, body) = send(test_state().await, get_request("/api/devices")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["title"], "Office Diffuser");
        assert_eq!(body[0]["model"], "Pura 3");
        assert_eq!(body[0]["bays"][0]["fragrance"], "Lavender");
        assert_eq!(body[0]["bays"][1]["installed"], false);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_device() {
        let (status, body) = send(test_state().await, get_request("/api/devices/ghost")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "no Pura devices found for target ghost");
    }

    #[tokio::test]
    async fn should_redact_diagnostics() {
        let (status, body) = send(test_state().await, get_request("/api/diagnostics")).await;

        assert_eq!(status, StatusCode::OK);
        let first = &body["devices"][0];
        assert_eq!(first["deviceId"], "**REDACTED**");
        assert_eq!(first["serialNumber"], "**REDACTED**");
        assert_eq!(first["deviceLocation"]["latitude"], "**REDACTED**");
        assert_eq!(first["displayName"]["name"], "Office");
    }

    #[tokio::test]
    async fn should_dispatch_timer() {
        let state = test_state().await;
        let (status, body) = send(
            state.clone(),
            start_timer(&json!({"device_id": "dev-a", "intensity": 6, "duration": "00:15:00"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"dispatched": 1}));
        let sent = state.coordinator.api().sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].duration.as_secs(), 900);
    }

    #[tokio::test]
    async fn should_return_bad_request_for_invalid_fields() {
        let (status, _) = send(
            test_state().await,
            start_timer(&json!({"device_id": "dev-a", "intensity": 11, "duration": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            test_state().await,
            start_timer(&json!({"device_id": "dev-a", "slot": 2, "intensity": 5, "duration": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "fragrance slot 2 is not available on Office Diffuser"
        );
    }

    #[tokio::test]
    async fn should_return_not_found_for_unresolved_target() {
        let (status, _) = send(
            test_state().await,
            start_timer(&json!({"intensity": 5, "duration": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_device_rejects() {
        let (status, body) = send(
            test_state().await,
            start_timer(&json!({"device_id": "offline", "intensity": 5, "duration": 60})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "device command failed: device offline");
    }

    #[tokio::test]
    async fn should_dispatch_control_by_service_name() {
        let state = test_state().await;
        let (status, body) = send(
            state.clone(),
            call("select_fragrance", &json!({"device_id": "dev-a", "option": "off"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"dispatched": 1}));
        let controls = state.coordinator.api().controls.lock().unwrap().clone();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].control, Control::StopAll);
        assert!(state.coordinator.api().sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_bad_request_for_unknown_service() {
        let (status, body) = send(
            test_state().await,
            call("make_coffee", &json!({"device_id": "dev-a"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown service `pura.make_coffee`");
    }

    #[tokio::test]
    async fn should_return_bad_request_for_control_the_device_lacks() {
        let (status, body) = send(
            test_state().await,
            call("nightlight_on", &json!({"device_id": "dev-a", "rgb_color": [1, 2, 3]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, body) = send(
            test_state().await,
            call("select_fragrance", &json!({"device_id": "dev-a", "option": "slot_2"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "fragrance slot 2 is not available on Office Diffuser"
        );
    }

    #[tokio::test]
    async fn should_return_bad_gateway_when_device_rejects_control() {
        let (status, _) = send(
            test_state().await,
            call("set_ambient_mode", &json!({"device_id": "offline", "enabled": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
