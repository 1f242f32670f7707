use crate::{
    error::{AppError, AppResult},
    models::{Categoria, Produto, Usuario},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};

/// Repository Trait
///
/// The typed query gateway the services talk to. Every filter the application needs is an
/// explicit method, so no query object is ever assembled at runtime by callers.
///
/// Insert methods ignore the `id` of the record they receive: storage assigns it and the
/// returned record carries the new value. Update methods return `None` when no row matched.
///
/// **Send + Sync + async_trait** are required to make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Categorias ---
    // Ordered by ascending id, products attached.
    async fn find_all_categorias(&self) -> AppResult<Vec<Categoria>>;
    async fn find_categoria_by_id(&self, id: i32) -> AppResult<Option<Categoria>>;
    // Case-insensitive substring matches, ordered by id.
    async fn find_categorias_by_descricao(&self, descricao: &str) -> AppResult<Vec<Categoria>>;
    async fn find_categorias_by_nome(&self, nome: &str) -> AppResult<Vec<Categoria>>;
    async fn create_categoria(&self, categoria: &Categoria) -> AppResult<Categoria>;
    async fn update_categoria(&self, categoria: &Categoria) -> AppResult<Option<Categoria>>;
    async fn delete_categoria(&self, id: i32) -> AppResult<bool>;
    async fn count_produtos_by_categoria(&self, categoria_id: i32) -> AppResult<i64>;

    // --- Produtos ---
    async fn find_all_produtos(&self) -> AppResult<Vec<Produto>>;
    async fn find_produto_by_id(&self, id: i32) -> AppResult<Option<Produto>>;
    async fn find_produtos_by_nome(&self, nome: &str) -> AppResult<Vec<Produto>>;
    async fn create_produto(&self, produto: &Produto) -> AppResult<Produto>;
    async fn update_produto(&self, produto: &Produto) -> AppResult<Option<Produto>>;
    async fn delete_produto(&self, id: i32) -> AppResult<bool>;

    // --- Usuarios ---
    async fn find_all_usuarios(&self) -> AppResult<Vec<Usuario>>;
    async fn find_usuario_by_id(&self, id: i32) -> AppResult<Option<Usuario>>;
    // Exact match on the login identifier.
    async fn find_usuario_by_login(&self, usuario: &str) -> AppResult<Option<Usuario>>;
    async fn create_usuario(&self, usuario: &Usuario) -> AppResult<Usuario>;
    async fn update_usuario(&self, usuario: &Usuario) -> AppResult<Option<Usuario>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Builds an ILIKE pattern matching `term` anywhere, with LIKE wildcards in the input escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Translates constraint violations into client errors; anything else stays a database fault.
fn constraint_error(e: sqlx::Error, context: &str) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::bad_request(format!("{}: registro duplicado.", context));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(format!("{}: referência inválida.", context));
        }
        if db_err.is_check_violation() {
            return AppError::bad_request(format!("{}: valor fora do permitido.", context));
        }
        // string_data_right_truncation, numeric_value_out_of_range
        if matches!(db_err.code().as_deref(), Some("22001" | "22003")) {
            return AppError::bad_request(format!("{}: valor excede o tamanho da coluna.", context));
        }
    }
    tracing::error!("{} error: {:?}", context, e);
    AppError::Database(e)
}

fn db_error(e: sqlx::Error, context: &str) -> AppError {
    tracing::error!("{} error: {:?}", context, e);
    AppError::Database(e)
}

const CATEGORIA_COLUMNS: &str = "id, nome, descricao";
const PRODUTO_COLUMNS: &str =
    "id, nome, descricao, preco, disponivel, foto, categoria_id, usuario_id";
const USUARIO_COLUMNS: &str = "id, nome, usuario, senha, foto";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are built at runtime
/// with bound parameters, so the crate compiles without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the products of every given category in one query and attaches them.
    async fn attach_produtos(&self, mut categorias: Vec<Categoria>) -> AppResult<Vec<Categoria>> {
        if categorias.is_empty() {
            return Ok(categorias);
        }

        let ids: Vec<i32> = categorias.iter().map(|c| c.id).collect();
        let produtos = sqlx::query_as::<_, Produto>(&format!(
            "SELECT {} FROM produtos WHERE categoria_id = ANY($1) ORDER BY id ASC",
            PRODUTO_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(e, "attach_produtos"))?;

        let mut by_categoria: HashMap<i32, Vec<Produto>> = HashMap::new();
        for produto in produtos {
            by_categoria.entry(produto.categoria_id).or_default().push(produto);
        }
        for categoria in &mut categorias {
            categoria.produtos = by_categoria.remove(&categoria.id).unwrap_or_default();
        }
        Ok(categorias)
    }

    async fn find_categorias_where(&self, column: &str, term: &str) -> AppResult<Vec<Categoria>> {
        let categorias = sqlx::query_as::<_, Categoria>(&format!(
            "SELECT {} FROM categorias WHERE {} ILIKE $1 ORDER BY id ASC",
            CATEGORIA_COLUMNS, column
        ))
        .bind(contains_pattern(term))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_categorias_where"))?;

        self.attach_produtos(categorias).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_all_categorias(&self) -> AppResult<Vec<Categoria>> {
        let categorias = sqlx::query_as::<_, Categoria>(&format!(
            "SELECT {} FROM categorias ORDER BY id ASC",
            CATEGORIA_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_all_categorias"))?;

        self.attach_produtos(categorias).await
    }

    async fn find_categoria_by_id(&self, id: i32) -> AppResult<Option<Categoria>> {
        let categoria = sqlx::query_as::<_, Categoria>(&format!(
            "SELECT {} FROM categorias WHERE id = $1",
            CATEGORIA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_categoria_by_id"))?;

        match categoria {
            Some(c) => Ok(self.attach_produtos(vec![c]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_categorias_by_descricao(&self, descricao: &str) -> AppResult<Vec<Categoria>> {
        self.find_categorias_where("descricao", descricao).await
    }

    async fn find_categorias_by_nome(&self, nome: &str) -> AppResult<Vec<Categoria>> {
        self.find_categorias_where("nome", nome).await
    }

    async fn create_categoria(&self, categoria: &Categoria) -> AppResult<Categoria> {
        sqlx::query_as::<_, Categoria>(&format!(
            "INSERT INTO categorias (nome, descricao) VALUES ($1, $2) RETURNING {}",
            CATEGORIA_COLUMNS
        ))
        .bind(&categoria.nome)
        .bind(&categoria.descricao)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "create_categoria"))
    }

    async fn update_categoria(&self, categoria: &Categoria) -> AppResult<Option<Categoria>> {
        let updated = sqlx::query_as::<_, Categoria>(&format!(
            "UPDATE categorias SET nome = $2, descricao = $3 WHERE id = $1 RETURNING {}",
            CATEGORIA_COLUMNS
        ))
        .bind(categoria.id)
        .bind(&categoria.nome)
        .bind(&categoria.descricao)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "update_categoria"))?;

        match updated {
            Some(c) => Ok(self.attach_produtos(vec![c]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete_categoria(&self, id: i32) -> AppResult<bool> {
        sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(|e| constraint_error(e, "delete_categoria"))
    }

    async fn count_produtos_by_categoria(&self, categoria_id: i32) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM produtos WHERE categoria_id = $1")
            .bind(categoria_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(e, "count_produtos_by_categoria"))
    }

    async fn find_all_produtos(&self) -> AppResult<Vec<Produto>> {
        sqlx::query_as::<_, Produto>(&format!(
            "SELECT {} FROM produtos ORDER BY id ASC",
            PRODUTO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_all_produtos"))
    }

    async fn find_produto_by_id(&self, id: i32) -> AppResult<Option<Produto>> {
        sqlx::query_as::<_, Produto>(&format!(
            "SELECT {} FROM produtos WHERE id = $1",
            PRODUTO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_produto_by_id"))
    }

    async fn find_produtos_by_nome(&self, nome: &str) -> AppResult<Vec<Produto>> {
        sqlx::query_as::<_, Produto>(&format!(
            "SELECT {} FROM produtos WHERE nome ILIKE $1 ORDER BY id ASC",
            PRODUTO_COLUMNS
        ))
        .bind(contains_pattern(nome))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_produtos_by_nome"))
    }

    async fn create_produto(&self, produto: &Produto) -> AppResult<Produto> {
        sqlx::query_as::<_, Produto>(&format!(
            r#"INSERT INTO produtos (nome, descricao, preco, disponivel, foto, categoria_id, usuario_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {}"#,
            PRODUTO_COLUMNS
        ))
        .bind(&produto.nome)
        .bind(&produto.descricao)
        .bind(produto.preco)
        .bind(produto.disponivel)
        .bind(&produto.foto)
        .bind(produto.categoria_id)
        .bind(produto.usuario_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "create_produto"))
    }

    async fn update_produto(&self, produto: &Produto) -> AppResult<Option<Produto>> {
        sqlx::query_as::<_, Produto>(&format!(
            r#"UPDATE produtos
               SET nome = $2, descricao = $3, preco = $4, disponivel = $5,
                   foto = $6, categoria_id = $7, usuario_id = $8
               WHERE id = $1
               RETURNING {}"#,
            PRODUTO_COLUMNS
        ))
        .bind(produto.id)
        .bind(&produto.nome)
        .bind(&produto.descricao)
        .bind(produto.preco)
        .bind(produto.disponivel)
        .bind(&produto.foto)
        .bind(produto.categoria_id)
        .bind(produto.usuario_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "update_produto"))
    }

    async fn delete_produto(&self, id: i32) -> AppResult<bool> {
        sqlx::query("DELETE FROM produtos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(|e| db_error(e, "delete_produto"))
    }

    async fn find_all_usuarios(&self) -> AppResult<Vec<Usuario>> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {} FROM usuarios ORDER BY id ASC",
            USUARIO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_all_usuarios"))
    }

    async fn find_usuario_by_id(&self, id: i32) -> AppResult<Option<Usuario>> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {} FROM usuarios WHERE id = $1",
            USUARIO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_usuario_by_id"))
    }

    async fn find_usuario_by_login(&self, usuario: &str) -> AppResult<Option<Usuario>> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {} FROM usuarios WHERE usuario = $1",
            USUARIO_COLUMNS
        ))
        .bind(usuario)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error(e, "find_usuario_by_login"))
    }

    async fn create_usuario(&self, usuario: &Usuario) -> AppResult<Usuario> {
        sqlx::query_as::<_, Usuario>(&format!(
            "INSERT INTO usuarios (nome, usuario, senha, foto) VALUES ($1, $2, $3, $4) RETURNING {}",
            USUARIO_COLUMNS
        ))
        .bind(&usuario.nome)
        .bind(&usuario.usuario)
        .bind(&usuario.senha)
        .bind(&usuario.foto)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "create_usuario"))
    }

    async fn update_usuario(&self, usuario: &Usuario) -> AppResult<Option<Usuario>> {
        sqlx::query_as::<_, Usuario>(&format!(
            r#"UPDATE usuarios SET nome = $2, usuario = $3, senha = $4, foto = $5
               WHERE id = $1
               RETURNING {}"#,
            USUARIO_COLUMNS
        ))
        .bind(usuario.id)
        .bind(&usuario.nome)
        .bind(&usuario.usuario)
        .bind(&usuario.senha)
        .bind(&usuario.foto)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "update_usuario"))
    }
}
