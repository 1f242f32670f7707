use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, put},
};

/// Authenticated Router Module
///
/// Every catalog and account-management route. The whole router is wrapped by the
/// bearer-token guard in `create_router`, so a request without a valid token gets a 401
/// before any handler or service runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Categorias ---
        .route(
            "/categorias",
            get(handlers::find_all_categorias)
                .post(handlers::create_categoria)
                .put(handlers::update_categoria),
        )
        .route(
            "/categorias/{id}",
            get(handlers::find_categoria_by_id).delete(handlers::delete_categoria),
        )
        .route(
            "/categorias/{id}/descricao",
            patch(handlers::update_categoria_descricao),
        )
        .route(
            "/categorias/descricao/{descricao}",
            get(handlers::find_categorias_by_descricao),
        )
        .route("/categorias/nome/{nome}", get(handlers::find_categorias_by_nome))
        // --- Produtos ---
        .route(
            "/produtos",
            get(handlers::find_all_produtos)
                .post(handlers::create_produto)
                .put(handlers::update_produto),
        )
        .route(
            "/produtos/{id}",
            get(handlers::find_produto_by_id).delete(handlers::delete_produto),
        )
        .route("/produtos/nome/{nome}", get(handlers::find_produtos_by_nome))
        // --- Usuarios ---
        // `/usuarios/all` is a static segment and wins over `/usuarios/{id}`.
        .route("/usuarios/all", get(handlers::find_all_usuarios))
        .route("/usuarios/atualizar", put(handlers::update_usuario))
        .route("/usuarios/{id}", get(handlers::find_usuario_by_id))
}
