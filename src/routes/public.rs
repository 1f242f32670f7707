use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token: health, account registration and login.
/// Nothing here reads or changes catalog data.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and monitoring.
        .route("/health", get(|| async { "ok" }))
        // POST /usuarios/cadastrar
        // Account registration. Rejects duplicate logins, malformed e-mails and short passwords.
        .route("/usuarios/cadastrar", post(handlers::register_usuario))
        // POST /usuarios/logar
        // Credential check; answers with a ready-to-use `Bearer` token.
        .route("/usuarios/logar", post(handlers::login_usuario))
}
