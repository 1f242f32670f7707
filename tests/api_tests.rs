use delivery_api::{AppConfig, AppState, InMemoryRepository, create_router};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn register(&self, usuario: &str, senha: &str) -> reqwest::Response {
        self.client
            .post(self.url("/usuarios/cadastrar"))
            .json(&json!({
                "nome": "Root",
                "usuario": usuario,
                "senha": senha,
                "foto": "-"
            }))
            .send()
            .await
            .expect("req fail")
    }

    async fn login(&self, usuario: &str, senha: &str) -> reqwest::Response {
        self.client
            .post(self.url("/usuarios/logar"))
            .json(&json!({ "usuario": usuario, "senha": senha }))
            .send()
            .await
            .expect("req fail")
    }

    /// Registers `root@root.com` and returns its id together with a ready `Authorization` value.
    async fn root_session(&self) -> (i64, String) {
        let created: Value = self.register("root@root.com", "rootroot").await.json().await.unwrap();
        let login: Value = self.login("root@root.com", "rootroot").await.json().await.unwrap();
        (
            created["id"].as_i64().unwrap(),
            login["token"].as_str().unwrap().to_string(),
        )
    }
}

/// Serves the full router on an ephemeral port, backed by a fresh in-memory store.
async fn spawn_app() -> TestApp {
    let state = AppState::new(Arc::new(InMemoryRepository::new()), AppConfig::default());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_registration_rules() {
    let app = spawn_app().await;

    let created = app.register("root@root.com", "rootroot").await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["usuario"], "root@root.com");
    assert!(body.get("senha").is_none(), "password must never be echoed");

    let duplicate = app.register("root@root.com", "rootroot").await;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let err: Value = duplicate.json().await.unwrap();
    assert_eq!(err["statusCode"], 400);
    assert_eq!(err["message"], "O Usuário já existe!");

    let bad_email = app.register("root@root", "rootroot").await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);

    let short_password = app.register("outro@root.com", "curta").await;
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let app = spawn_app().await;
    app.register("root@root.com", "rootroot").await;

    let ok = app.login("root@root.com", "rootroot").await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    assert!(body["token"].as_str().unwrap().starts_with("Bearer "));
    assert_eq!(body["nome"], "Root");

    let wrong = app.login("root@root.com", "errada00").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = app.login("ninguem@root.com", "rootroot").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;

    for path in ["/categorias", "/produtos", "/usuarios/all", "/usuarios/1"] {
        let response = app.client.get(app.url(path)).send().await.expect("req fail");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", path);
    }

    let forged = app
        .client
        .get(app.url("/categorias"))
        .header("Authorization", "Bearer forged.token.value")
        .send()
        .await
        .expect("req fail");
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    let err: Value = forged.json().await.unwrap();
    assert_eq!(err["statusCode"], 401);
}

#[tokio::test]
async fn test_catalog_lifecycle() {
    let app = spawn_app().await;
    let (usuario_id, token) = app.root_session().await;

    // Categoria
    let created = app
        .client
        .post(app.url("/categorias"))
        .header("Authorization", &token)
        .json(&json!({ "nome": "categoria 01", "descricao": "nova categoria" }))
        .send()
        .await
        .expect("req fail");
    assert_eq!(created.status(), StatusCode::CREATED);
    let categoria: Value = created.json().await.unwrap();
    let categoria_id = categoria["id"].as_i64().unwrap();
    assert_eq!(categoria["nome"], "categoria 01");

    // Produto, referencing both records.
    let produto = app
        .client
        .post(app.url("/produtos"))
        .header("Authorization", &token)
        .json(&json!({
            "nome": "produto 01",
            "descricao": "novo produto",
            "preco": 10.5,
            "foto": "-",
            "categoria": { "id": categoria_id },
            "usuario": usuario_id
        }))
        .send()
        .await
        .expect("req fail");
    assert_eq!(produto.status(), StatusCode::CREATED);
    let produto: Value = produto.json().await.unwrap();
    assert_eq!(produto["categoria_id"].as_i64(), Some(categoria_id));
    assert_eq!(produto["disponivel"], true);

    // The category now lists its product.
    let found: Value = app
        .client
        .get(app.url(&format!("/categorias/{}", categoria_id)))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found["produtos"].as_array().unwrap().len(), 1);

    // Search by description is case-insensitive.
    let search: Value = app
        .client
        .get(app.url("/categorias/descricao/NOVA"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(search.as_array().unwrap().len(), 1);

    // Deleting a category that still has products is refused.
    let blocked = app
        .client
        .delete(app.url(&format!("/categorias/{}", categoria_id)))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::BAD_REQUEST);

    let produto_id = produto["id"].as_i64().unwrap();
    let removed = app
        .client
        .delete(app.url(&format!("/produtos/{}", produto_id)))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let removed = app
        .client
        .delete(app.url(&format!("/categorias/{}", categoria_id)))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let gone = app
        .client
        .get(app.url(&format!("/categorias/{}", categoria_id)))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let err: Value = gone.json().await.unwrap();
    assert_eq!(err["message"], "Categoria não encontrada!");
}

#[tokio::test]
async fn test_categoria_descricao_patch() {
    let app = spawn_app().await;
    let (_, token) = app.root_session().await;

    let categoria: Value = app
        .client
        .post(app.url("/categorias"))
        .header("Authorization", &token)
        .json(&json!({ "nome": "Sopas", "descricao": "quentes" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = categoria["id"].as_i64().unwrap();

    let blank = app
        .client
        .patch(app.url(&format!("/categorias/{}/descricao", id)))
        .header("Authorization", &token)
        .json(&json!({ "descricao": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let ok = app
        .client
        .patch(app.url(&format!("/categorias/{}/descricao", id)))
        .header("Authorization", &token)
        .json(&json!({ "descricao": "caldos" }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let updated: Value = ok.json().await.unwrap();
    assert_eq!(updated["descricao"], "caldos");

    let missing = app
        .client
        .patch(app.url("/categorias/999/descricao"))
        .header("Authorization", &token)
        .json(&json!({ "descricao": "caldos" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_bodies_are_bad_requests() {
    let app = spawn_app().await;
    let (_, token) = app.root_session().await;

    let blank_nome = app
        .client
        .post(app.url("/categorias"))
        .header("Authorization", &token)
        .json(&json!({ "nome": " ", "descricao": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(blank_nome.status(), StatusCode::BAD_REQUEST);

    let not_json = app
        .client
        .post(app.url("/categorias"))
        .header("Authorization", &token)
        .header("Content-Type", "application/json")
        .body("{nome:")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    let negative_price = app
        .client
        .post(app.url("/produtos"))
        .header("Authorization", &token)
        .json(&json!({
            "nome": "p", "descricao": "d", "preco": -1.0,
            "categoria": 1, "usuario": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(negative_price.status(), StatusCode::BAD_REQUEST);

    let put_without_id = app
        .client
        .put(app.url("/categorias"))
        .header("Authorization", &token)
        .json(&json!({ "nome": "n", "descricao": "d" }))
        .send()
        .await
        .unwrap();
    assert_eq!(put_without_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_usuarios_endpoints() {
    let app = spawn_app().await;
    let (usuario_id, token) = app.root_session().await;

    let me = app
        .client
        .get(app.url(&format!("/usuarios/{}", usuario_id)))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);

    let other = app
        .client
        .get(app.url("/usuarios/2"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    let all: Value = app
        .client
        .get(app.url("/usuarios/all"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);

    let updated = app
        .client
        .put(app.url("/usuarios/atualizar"))
        .header("Authorization", &token)
        .json(&json!({
            "id": usuario_id,
            "nome": "Root Atualizado",
            "usuario": "root@root.com",
            "senha": "novasenha",
            "foto": "-"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::OK);

    // The new password is the one that works now.
    assert_eq!(
        app.login("root@root.com", "rootroot").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.login("root@root.com", "novasenha").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: Value = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"].get("/categorias").is_some());
    assert!(doc["components"]["securitySchemes"].get("bearer_auth").is_some());
}

#[tokio::test]
async fn test_values_beyond_column_limits_are_bad_requests() {
    let app = spawn_app().await;
    let (usuario_id, token) = app.root_session().await;

    let long_nome = app
        .client
        .post(app.url("/categorias"))
        .header("Authorization", &token)
        .json(&json!({ "nome": "n".repeat(300), "descricao": "d" }))
        .send()
        .await
        .unwrap();
    assert_eq!(long_nome.status(), StatusCode::BAD_REQUEST);
    let err: Value = long_nome.json().await.unwrap();
    assert_eq!(err["statusCode"], 400);

    let categoria: Value = app
        .client
        .post(app.url("/categorias"))
        .header("Authorization", &token)
        .json(&json!({ "nome": "Bebidas", "descricao": "geladas" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for preco in [json!(1_000_000_000), json!(12.345)] {
        let response = app
            .client
            .post(app.url("/produtos"))
            .header("Authorization", &token)
            .json(&json!({
                "nome": "Suco", "descricao": "laranja", "preco": preco,
                "categoria": categoria["id"], "usuario": usuario_id
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", preco);
    }

    // Nothing was stored.
    let produtos: Value = app
        .client
        .get(app.url("/produtos"))
        .header("Authorization", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(produtos.as_array().unwrap().is_empty());
}
