// src/routes.rs

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{config::AppState, handlers};

pub fn app_router(app_state: AppState) -> Router {
    // Catálogo (leitura pública, escrita com `manage_catalog`)
    let catalog_routes = Router::new()
        .route("/services", get(handlers::catalog::list_services))
        .route("/professionals", get(handlers::catalog::list_professionals))
        .route(
            "/professionals/{id}/availability",
            put(handlers::catalog::set_professional_availability),
        );

    // Agenda interna: as checagens de capacidade ficam nos handlers,
    // porque dependem do profissional dono de cada registro
    let agenda_routes = Router::new()
        .route("/", get(handlers::agenda::list_appointments))
        .route("/blocks", post(handlers::agenda::block_slot))
        .route("/appointments/{id}/slot", put(handlers::agenda::move_appointment))
        .route("/appointments/{id}/cancel", post(handlers::agenda::cancel_appointment))
        .route("/appointments/{id}/confirm", post(handlers::agenda::confirm_appointment))
        .route("/appointments/{id}/complete", post(handlers::agenda::complete_appointment));

    let finance_routes = Router::new()
        .route("/commissions", get(handlers::finance::commissions))
        .route("/daily", get(handlers::finance::daily));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/availability", get(handlers::bookings::get_availability))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .nest("/api/catalog", catalog_routes)
        .nest("/api/agenda", agenda_routes)
        .nest("/api/finance", finance_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Settings,
        db::MemoryLedgerStore,
        middleware::caller::{CAPABILITIES_HEADER, PROFESSIONAL_ID_HEADER},
        services::{agenda_service::tests::SEED, InMemoryCatalog, LogNotificationSink},
    };

    fn test_router() -> Router {
        let settings = Settings::from_lookup(|_| None).unwrap();
        let state = AppState::from_parts(
            settings,
            Arc::new(MemoryLedgerStore::new()),
            Arc::new(InMemoryCatalog::from_json(SEED).unwrap()),
            Arc::new(LogNotificationSink),
        );
        app_router(state)
    }

    struct Caller<'a> {
        professional_id: Option<&'a str>,
        capabilities: &'a str,
    }

    const ANONYMOUS: Caller<'static> = Caller { professional_id: None, capabilities: "" };

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        caller: &Caller<'_>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = caller.professional_id {
            builder = builder.header(PROFESSIONAL_ID_HEADER, id);
        }
        if !caller.capabilities.is_empty() {
            builder = builder.header(CAPABILITIES_HEADER, caller.capabilities);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn booking(professional_id: &str, time: &str) -> Value {
        json!({
            "serviceId": "1",
            "professionalId": professional_id,
            "date": "2030-01-10",
            "time": time,
            "customerName": "João",
            "customerPhone": "11999999999",
            "paymentMethod": "pix"
        })
    }

    #[tokio::test]
    async fn health_check() {
        let app = test_router();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn booking_is_created_and_double_booking_conflicts() {
        let app = test_router();

        let (status, body) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "10:00"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["appointment"]["status"], "confirmed");
        assert_eq!(body["appointment"]["time"], "10:00");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Corte Premium"));
        assert!(message.contains("Carlos"));
        assert!(message.contains("10/01/2030"));

        let (status, body) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "10:00"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "slot_taken");

        // Outro profissional no mesmo horário é permitido
        let (status, _) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p2", "10:00"))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn booking_rejections() {
        let app = test_router();

        let (status, body) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p3", "10:00"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "professional_unavailable");

        let (status, body) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "12:00"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");

        let (status, _) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p9", "10:00"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_customer_name_is_rejected() {
        let app = test_router();
        let mut payload = booking("p1", "10:00");
        payload["customerName"] = json!("   ");

        let (status, body) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
        assert!(body["details"]["customer_name"].is_array());
    }

    #[tokio::test]
    async fn availability_reflects_bookings_without_exposing_customers() {
        let app = test_router();
        send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "11:00"))).await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/availability?professionalId=p1&date=2030-01-10",
            &ANONYMOUS,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let slots = body["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 9);
        let eleven = slots.iter().find(|s| s["time"] == "11:00").unwrap();
        assert_eq!(eleven["status"], "occupied");
        assert!(eleven["appointment"].is_null());
    }

    #[tokio::test]
    async fn agenda_writes_require_capability() {
        let app = test_router();
        let block = json!({ "professionalId": "p1", "date": "2030-01-10", "time": "09:00" });

        let (status, body) = send(&app, Method::POST, "/api/agenda/blocks", &ANONYMOUS, Some(block.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "forbidden");

        // Agenda própria com `view_own_schedule` funciona; a de outro, não
        let own = Caller { professional_id: Some("p1"), capabilities: "view_own_schedule" };
        let (status, _) = send(&app, Method::POST, "/api/agenda/blocks", &own, Some(block)).await;
        assert_eq!(status, StatusCode::CREATED);

        let other = json!({ "professionalId": "p2", "date": "2030-01-10", "time": "09:00" });
        let (status, _) = send(&app, Method::POST, "/api/agenda/blocks", &own, Some(other)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Bloqueio impede reserva
        let (status, body) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "09:00"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "slot_blocked");
    }

    #[tokio::test]
    async fn move_complete_and_cancel_through_the_api() {
        let app = test_router();
        let admin = Caller { professional_id: None, capabilities: "view_all_schedules" };

        let (_, created) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "10:00"))).await;
        let id = created["appointment"]["id"].as_str().unwrap().to_string();

        let target = json!({ "professionalId": "p2", "date": "2030-01-10", "time": "15:00" });
        let (status, moved) = send(&app, Method::PUT, &format!("/api/agenda/appointments/{id}/slot"), &admin, Some(target)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["professionalId"], "p2");
        assert_eq!(moved["time"], "15:00");

        let (status, done) = send(&app, Method::POST, &format!("/api/agenda/appointments/{id}/complete"), &admin, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["status"], "completed");

        let (status, listed) = send(&app, Method::GET, "/api/agenda?from=2030-01-10&to=2030-01-10", &admin, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, cancelled) = send(&app, Method::POST, &format!("/api/agenda/appointments/{id}/cancel"), &admin, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["outcome"], "cancelled");

        // Cancelado libera o horário para nova reserva
        let again = json!({
            "serviceId": "1", "professionalId": "p2", "date": "2030-01-10", "time": "15:00",
            "customerName": "Maria", "customerPhone": "11988887777"
        });
        let (status, _) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(again)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unknown_appointment_is_not_found() {
        let app = test_router();
        let admin = Caller { professional_id: None, capabilities: "view_all_schedules" };
        let uri = format!("/api/agenda/appointments/{}/cancel", uuid::Uuid::new_v4());

        let (status, body) = send(&app, Method::POST, &uri, &admin, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn commission_report_is_filtered_to_the_caller() {
        let app = test_router();
        send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "10:00"))).await;
        send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p2", "10:00"))).await;

        let uri = "/api/finance/commissions?from=2030-01-01&to=2030-01-31";

        let own = Caller { professional_id: Some("p2"), capabilities: "view_own_schedule" };
        let (status, body) = send(&app, Method::GET, uri, &own, None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["professionals"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["professionalId"], "p2");
        assert_eq!(rows[0]["servicesCount"], 1);

        let manager = Caller { professional_id: None, capabilities: "view_all_financials" };
        let (_, body) = send(&app, Method::GET, uri, &manager, None).await;
        assert_eq!(body["professionals"].as_array().unwrap().len(), 3);

        let (status, _) = send(&app, Method::GET, uri, &ANONYMOUS, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn daily_summary_needs_financial_capability() {
        let app = test_router();
        send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p1", "10:00"))).await;

        let uri = "/api/finance/daily?date=2030-01-10";
        let own = Caller { professional_id: Some("p1"), capabilities: "view_own_schedule" };
        let (status, _) = send(&app, Method::GET, uri, &own, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let manager = Caller { professional_id: None, capabilities: "view_all_financials" };
        let (status, body) = send(&app, Method::GET, uri, &manager, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appointmentsCount"], 1);
    }

    #[tokio::test]
    async fn catalog_toggle_needs_manage_catalog() {
        let app = test_router();
        let payload = json!({ "isAvailable": true });

        let (status, _) = send(&app, Method::PUT, "/api/catalog/professionals/p3/availability", &ANONYMOUS, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let manager = Caller { professional_id: None, capabilities: "manage_catalog" };
        let (status, body) = send(&app, Method::PUT, "/api/catalog/professionals/p3/availability", &manager, Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isAvailable"], true);

        let (status, _) = send(&app, Method::POST, "/api/bookings", &ANONYMOUS, Some(booking("p3", "10:00"))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn unknown_capability_is_rejected() {
        let app = test_router();
        let caller = Caller { professional_id: None, capabilities: "superuser" };
        let (status, _) = send(&app, Method::GET, "/api/agenda", &caller, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
