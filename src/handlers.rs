use crate::{
    AppState,
    error::AppResult,
    extract::{ValidatedJson, ValidatedPath},
    models::{
        Categoria, CategoriaRequest, DescricaoRequest, LoginResponse, Produto, ProdutoRequest,
        Usuario, UsuarioLogin, UsuarioRequest,
    },
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

// --- Categorias ---

/// find_all_categorias
///
/// [Authenticated Route] Lists every category in ascending id order, products included.
#[utoipa::path(
    get,
    path = "/categorias",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All categories", body = [Categoria]),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorBody)
    )
)]
pub async fn find_all_categorias(State(state): State<AppState>) -> AppResult<Json<Vec<Categoria>>> {
    Ok(Json(state.categorias.find_all().await?))
}

/// find_categoria_by_id
///
/// [Authenticated Route] Retrieves one category with its products.
#[utoipa::path(
    get,
    path = "/categorias/{id}",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Categoria ID")),
    responses(
        (status = 200, description = "Found", body = Categoria),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn find_categoria_by_id(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> AppResult<Json<Categoria>> {
    Ok(Json(state.categorias.find_by_id(id).await?))
}

/// find_categorias_by_descricao
///
/// [Authenticated Route] Case-insensitive substring search on the description.
#[utoipa::path(
    get,
    path = "/categorias/descricao/{descricao}",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    params(("descricao" = String, Path, description = "Text contained in the description")),
    responses((status = 200, description = "Matches, possibly empty", body = [Categoria]))
)]
pub async fn find_categorias_by_descricao(
    State(state): State<AppState>,
    ValidatedPath(descricao): ValidatedPath<String>,
) -> AppResult<Json<Vec<Categoria>>> {
    Ok(Json(state.categorias.find_all_by_descricao(&descricao).await?))
}

/// find_categorias_by_nome
///
/// [Authenticated Route] Case-insensitive substring search on the name.
#[utoipa::path(
    get,
    path = "/categorias/nome/{nome}",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    params(("nome" = String, Path, description = "Text contained in the name")),
    responses((status = 200, description = "Matches, possibly empty", body = [Categoria]))
)]
pub async fn find_categorias_by_nome(
    State(state): State<AppState>,
    ValidatedPath(nome): ValidatedPath<String>,
) -> AppResult<Json<Vec<Categoria>>> {
    Ok(Json(state.categorias.find_all_by_nome(&nome).await?))
}

/// create_categoria
///
/// [Authenticated Route] Creates a category; storage assigns the id.
#[utoipa::path(
    post,
    path = "/categorias",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    request_body = CategoriaRequest,
    responses(
        (status = 201, description = "Created", body = Categoria),
        (status = 400, description = "Invalid body", body = crate::error::ErrorBody)
    )
)]
pub async fn create_categoria(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CategoriaRequest>,
) -> AppResult<(StatusCode, Json<Categoria>)> {
    let categoria = state.categorias.create(payload).await?;
    Ok((StatusCode::CREATED, Json(categoria)))
}

/// update_categoria
///
/// [Authenticated Route] Full replacement of an existing category; the id travels in the body.
#[utoipa::path(
    put,
    path = "/categorias",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    request_body = CategoriaRequest,
    responses(
        (status = 200, description = "Updated", body = Categoria),
        (status = 400, description = "Invalid body or missing id", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn update_categoria(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CategoriaRequest>,
) -> AppResult<Json<Categoria>> {
    Ok(Json(state.categorias.update(payload).await?))
}

/// update_categoria_descricao
///
/// [Authenticated Route] Replaces only the description. Blank text is rejected.
#[utoipa::path(
    patch,
    path = "/categorias/{id}/descricao",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Categoria ID")),
    request_body = DescricaoRequest,
    responses(
        (status = 200, description = "Updated", body = Categoria),
        (status = 400, description = "Blank description", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn update_categoria_descricao(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
    ValidatedJson(payload): ValidatedJson<DescricaoRequest>,
) -> AppResult<Json<Categoria>> {
    Ok(Json(
        state
            .categorias
            .update_descricao(id, &payload.descricao)
            .await?,
    ))
}

/// delete_categoria
///
/// [Authenticated Route] Removes a category that has no products.
#[utoipa::path(
    delete,
    path = "/categorias/{id}",
    tag = "Categorias",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Categoria ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Category still has products", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_categoria(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> AppResult<StatusCode> {
    state.categorias.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Produtos ---

/// find_all_produtos
///
/// [Authenticated Route] Lists every product in ascending id order.
#[utoipa::path(
    get,
    path = "/produtos",
    tag = "Produtos",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All products", body = [Produto]))
)]
pub async fn find_all_produtos(State(state): State<AppState>) -> AppResult<Json<Vec<Produto>>> {
    Ok(Json(state.produtos.find_all().await?))
}

/// find_produto_by_id
///
/// [Authenticated Route] Retrieves one product.
#[utoipa::path(
    get,
    path = "/produtos/{id}",
    tag = "Produtos",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Produto ID")),
    responses(
        (status = 200, description = "Found", body = Produto),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn find_produto_by_id(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> AppResult<Json<Produto>> {
    Ok(Json(state.produtos.find_by_id(id).await?))
}

/// find_produtos_by_nome
///
/// [Authenticated Route] Case-insensitive substring search on the product name.
#[utoipa::path(
    get,
    path = "/produtos/nome/{nome}",
    tag = "Produtos",
    security(("bearer_auth" = [])),
    params(("nome" = String, Path, description = "Text contained in the name")),
    responses((status = 200, description = "Matches, possibly empty", body = [Produto]))
)]
pub async fn find_produtos_by_nome(
    State(state): State<AppState>,
    ValidatedPath(nome): ValidatedPath<String>,
) -> AppResult<Json<Vec<Produto>>> {
    Ok(Json(state.produtos.find_all_by_nome(&nome).await?))
}

/// create_produto
///
/// [Authenticated Route] Creates a product. `categoria` and `usuario` accept a bare id or
/// an object with an `id`; both must exist (404 otherwise).
#[utoipa::path(
    post,
    path = "/produtos",
    tag = "Produtos",
    security(("bearer_auth" = [])),
    request_body = ProdutoRequest,
    responses(
        (status = 201, description = "Created", body = Produto),
        (status = 400, description = "Invalid body", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown categoria or usuario", body = crate::error::ErrorBody)
    )
)]
pub async fn create_produto(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProdutoRequest>,
) -> AppResult<(StatusCode, Json<Produto>)> {
    let produto = state.produtos.create(payload).await?;
    Ok((StatusCode::CREATED, Json(produto)))
}

/// update_produto
///
/// [Authenticated Route] Full replacement of an existing product; the id travels in the body.
#[utoipa::path(
    put,
    path = "/produtos",
    tag = "Produtos",
    security(("bearer_auth" = [])),
    request_body = ProdutoRequest,
    responses(
        (status = 200, description = "Updated", body = Produto),
        (status = 400, description = "Invalid body or missing id", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn update_produto(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProdutoRequest>,
) -> AppResult<Json<Produto>> {
    Ok(Json(state.produtos.update(payload).await?))
}

/// delete_produto
///
/// [Authenticated Route] Removes a product.
#[utoipa::path(
    delete,
    path = "/produtos/{id}",
    tag = "Produtos",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Produto ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn delete_produto(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> AppResult<StatusCode> {
    state.produtos.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Usuarios ---

/// register_usuario
///
/// [Public Route] Registers an account. The login must be an unused e-mail address and the
/// password at least 8 characters long.
#[utoipa::path(
    post,
    path = "/usuarios/cadastrar",
    tag = "Usuarios",
    request_body = UsuarioRequest,
    responses(
        (status = 201, description = "Registered", body = Usuario),
        (status = 400, description = "Invalid data or login already taken", body = crate::error::ErrorBody)
    )
)]
pub async fn register_usuario(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UsuarioRequest>,
) -> AppResult<(StatusCode, Json<Usuario>)> {
    let usuario = state.usuarios.create(payload).await?;
    Ok((StatusCode::CREATED, Json(usuario)))
}

/// login_usuario
///
/// [Public Route] Exchanges credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/usuarios/logar",
    tag = "Usuarios",
    request_body = UsuarioLogin,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody)
    )
)]
pub async fn login_usuario(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<UsuarioLogin>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(state.auth.login(credentials).await?))
}

/// find_all_usuarios
///
/// [Authenticated Route] Lists every account. Password hashes are never serialized.
#[utoipa::path(
    get,
    path = "/usuarios/all",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All accounts", body = [Usuario]))
)]
pub async fn find_all_usuarios(State(state): State<AppState>) -> AppResult<Json<Vec<Usuario>>> {
    Ok(Json(state.usuarios.find_all().await?))
}

/// find_usuario_by_id
///
/// [Authenticated Route] Retrieves one account.
#[utoipa::path(
    get,
    path = "/usuarios/{id}",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Usuario ID")),
    responses(
        (status = 200, description = "Found", body = Usuario),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn find_usuario_by_id(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> AppResult<Json<Usuario>> {
    Ok(Json(state.usuarios.find_by_id(id).await?))
}

/// update_usuario
///
/// [Authenticated Route] Replaces every field of an account, re-hashing the password.
#[utoipa::path(
    put,
    path = "/usuarios/atualizar",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    request_body = UsuarioRequest,
    responses(
        (status = 200, description = "Updated", body = Usuario),
        (status = 400, description = "Invalid data or login taken", body = crate::error::ErrorBody),
        (status = 404, description = "Not Found", body = crate::error::ErrorBody)
    )
)]
pub async fn update_usuario(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UsuarioRequest>,
) -> AppResult<Json<Usuario>> {
    Ok(Json(state.usuarios.update(payload).await?))
}
