use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod services;

// Route table, split by access level.
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use memory::InMemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};
use services::{AuthService, CategoriaService, ProdutoService, UsuarioService};

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`, served at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::find_all_categorias, handlers::find_categoria_by_id,
        handlers::find_categorias_by_descricao, handlers::find_categorias_by_nome,
        handlers::create_categoria, handlers::update_categoria,
        handlers::update_categoria_descricao, handlers::delete_categoria,
        handlers::find_all_produtos, handlers::find_produto_by_id,
        handlers::find_produtos_by_nome, handlers::create_produto,
        handlers::update_produto, handlers::delete_produto,
        handlers::register_usuario, handlers::login_usuario,
        handlers::find_all_usuarios, handlers::find_usuario_by_id,
        handlers::update_usuario,
    ),
    components(
        schemas(
            models::Categoria, models::Produto, models::Usuario,
            models::CategoriaRequest, models::DescricaoRequest, models::ProdutoRequest,
            models::EntityRef, models::UsuarioRequest, models::UsuarioLogin,
            models::LoginResponse, error::ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Categorias", description = "Product categories"),
        (name = "Produtos", description = "Catalog products"),
        (name = "Usuarios", description = "Accounts and login")
    )
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// The single shared container of the application: configuration, the repository and the
/// services built on top of it. Cloning is cheap; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer, used directly only by the auth guard.
    pub repo: RepositoryState,
    pub config: AppConfig,
    pub categorias: CategoriaService,
    pub produtos: ProdutoService,
    pub usuarios: UsuarioService,
    pub auth: AuthService,
}

impl AppState {
    /// Wires every service to the given repository.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let categorias = CategoriaService::new(repo.clone());
        let usuarios = UsuarioService::new(repo.clone(), config.bcrypt_cost);
        let produtos = ProdutoService::new(repo.clone(), categorias.clone(), usuarios.clone());
        let auth = AuthService::new(repo.clone(), config.clone());

        Self {
            repo,
            config,
            categorias,
            produtos,
            usuarios,
            auth,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Let the auth guard pull only what it needs from the shared state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guard for `authenticated_routes`. Extracting `AuthUser` validates the bearer token and
/// the account behind it; on failure the extractor rejects with 401 and `next` never runs.
async fn auth_middleware(auth_user: AuthUser, request: Request, next: Next) -> Response {
    tracing::debug!(usuario_id = auth_user.id, "request authenticated");
    next.run(request).await
}

/// create_router
///
/// Assembles the route table, applies the guard and the observability layers, and binds
/// the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, uri and the `x-request-id` set by the layer
/// above, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
