use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use checkin_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    checkin::{cancel_check_in, create_check_in, get_check_in, get_verification_link},
    contact::{create_contact, list_contacts},
    escalation::run_escalations,
    health::{healthz, readyz},
    verify::{acknowledge_check_in, verify_check_in},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Verification links are opened from arbitrary origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let public = Router::new()
        .route("/checkins/{id}/verify", post(verify_check_in))
        .layer(cors);

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Check-ins
        .route("/checkins", post(create_check_in))
        .route("/checkins/{id}", get(get_check_in).delete(cancel_check_in))
        .route("/checkins/{id}/acknowledge", post(acknowledge_check_in))
        .route("/checkins/{id}/verification-link", get(get_verification_link))
        // Contacts
        .route("/contacts", post(create_contact).get(list_contacts))
        // Sweep trigger, internal network only
        .route("/internal/escalations/run", post(run_escalations))
        .merge(public)
        .with_state(state)
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
