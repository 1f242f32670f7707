use delivery_api::{
    AppError,
    models::{Categoria, Produto, Usuario},
    repository::{PostgresRepository, Repository},
};
use rust_decimal::Decimal;
use sqlx::PgPool;

// --- Test Context and Setup ---

/// Holds a migrated pool. Every test wipes the tables it touches first, so these tests
/// must not run against a database holding real data.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        sqlx::query("TRUNCATE produtos, categorias, usuarios RESTART IDENTITY CASCADE")
            .execute(&pool)
            .await
            .expect("Failed to reset tables.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

fn new_categoria(nome: &str, descricao: &str) -> Categoria {
    Categoria {
        nome: nome.to_string(),
        descricao: descricao.to_string(),
        ..Default::default()
    }
}

fn new_usuario(login: &str) -> Usuario {
    Usuario {
        nome: "Root".to_string(),
        usuario: login.to_string(),
        senha: "$2b$04$not-a-real-hash".to_string(),
        ..Default::default()
    }
}

fn new_produto(categoria_id: i32, usuario_id: i32) -> Produto {
    Produto {
        nome: "Pastel".to_string(),
        descricao: "de queijo".to_string(),
        preco: Decimal::new(750, 2),
        disponivel: true,
        categoria_id,
        usuario_id,
        ..Default::default()
    }
}

// --- Tests ---

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_categoria_crud_and_search() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let a = repo.create_categoria(&new_categoria("Lanches", "Comida RAPIDA")).await.unwrap();
    let b = repo.create_categoria(&new_categoria("Pizzas", "entrega rapida")).await.unwrap();
    repo.create_categoria(&new_categoria("50% off", "promo_dia")).await.unwrap();

    let found = repo.find_categorias_by_descricao("rapida").await.unwrap();
    let ids: Vec<i32> = found.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);

    // Wildcards in the search term match literally.
    assert_eq!(repo.find_categorias_by_nome("%").await.unwrap().len(), 1);
    assert_eq!(repo.find_categorias_by_descricao("o_d").await.unwrap().len(), 1);

    let mut changed = a.clone();
    changed.descricao = "outra".to_string();
    let updated = repo.update_categoria(&changed).await.unwrap().unwrap();
    assert_eq!(updated.descricao, "outra");

    assert!(repo.delete_categoria(a.id).await.unwrap());
    assert!(!repo.delete_categoria(a.id).await.unwrap());
    assert!(repo.find_categoria_by_id(a.id).await.unwrap().is_none());

    let missing = Categoria { id: 9999, ..new_categoria("x", "y") };
    assert!(repo.update_categoria(&missing).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_produtos_are_attached_and_constraints_map_to_bad_request() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let usuario = repo.create_usuario(&new_usuario("root@root.com")).await.unwrap();
    let categoria = repo.create_categoria(&new_categoria("Salgados", "fritos")).await.unwrap();
    let produto = repo.create_produto(&new_produto(categoria.id, usuario.id)).await.unwrap();
    assert_eq!(produto.preco, Decimal::new(750, 2));

    let loaded = repo.find_categoria_by_id(categoria.id).await.unwrap().unwrap();
    assert_eq!(loaded.produtos, vec![produto.clone()]);
    assert_eq!(repo.count_produtos_by_categoria(categoria.id).await.unwrap(), 1);

    // Duplicate login.
    let duplicate = repo.create_usuario(&new_usuario("root@root.com")).await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    // Dangling reference.
    let dangling = repo.create_produto(&new_produto(categoria.id + 100, usuario.id)).await;
    assert!(matches!(dangling, Err(AppError::BadRequest(_))));

    // Referenced category.
    let blocked = repo.delete_categoria(categoria.id).await;
    assert!(matches!(blocked, Err(AppError::BadRequest(_))));

    assert!(repo.delete_produto(produto.id).await.unwrap());
    assert!(repo.delete_categoria(categoria.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_usuario_lookup_and_update() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let created = repo.create_usuario(&new_usuario("root@root.com")).await.unwrap();

    let by_login = repo.find_usuario_by_login("root@root.com").await.unwrap().unwrap();
    assert_eq!(by_login.id, created.id);
    assert_eq!(by_login.senha, created.senha);

    let mut changed = created.clone();
    changed.nome = "Outro Nome".to_string();
    let updated = repo.update_usuario(&changed).await.unwrap().unwrap();
    assert_eq!(updated.nome, "Outro Nome");

    assert_eq!(repo.find_all_usuarios().await.unwrap().len(), 1);
    assert!(repo.find_usuario_by_id(created.id + 1).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_values_beyond_column_limits_map_to_bad_request() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let too_long = repo.create_categoria(&new_categoria(&"n".repeat(300), "d")).await;
    assert!(matches!(too_long, Err(AppError::BadRequest(_))));

    let usuario = repo.create_usuario(&new_usuario("root@root.com")).await.unwrap();
    let categoria = repo.create_categoria(&new_categoria("Bebidas", "geladas")).await.unwrap();
    let mut produto = new_produto(categoria.id, usuario.id);
    produto.preco = Decimal::new(1_000_000_000, 0);
    let too_large = repo.create_produto(&produto).await;
    assert!(matches!(too_large, Err(AppError::BadRequest(_))));
}
