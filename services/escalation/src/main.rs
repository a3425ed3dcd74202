use tracing::info;

use checkin_core::tracing::init_tracing;
use checkin_escalation::config::EscalationConfig;
use checkin_escalation::router::build_router;
use checkin_escalation::state::AppState;
use checkin_escalation::worker::spawn_scanner;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = EscalationConfig::from_env();

    let state = AppState::connect(&config)
        .await
        .expect("failed to initialise application state");

    let scanner = (!config.scan_interval.is_zero())
        .then(|| spawn_scanner(state.clone(), config.scan_interval));

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.escalation_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("escalation service listening on {http_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received ctrl-c, shutting down");
        })
        .await
        .expect("server error");

    if let Some(handle) = scanner {
        handle.abort();
    }
}
