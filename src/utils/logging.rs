use tracing::{info, warn, error, debug};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_upstream_error(endpoint: &str, status: Option<u16>, error: &str) {
    error!("GHL API error: {} - Status: {:?} - Error: {}", endpoint, status, error);
}

pub fn log_token_persisted(record_id: &str, user_id: Option<&str>) {
    info!("💾 Token record persisted: {} - User: {}", record_id, user_id.unwrap_or("-"));
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 GHL integration API starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
