use crate::{
    error::{AppError, AppResult},
    models::{Categoria, CategoriaRequest},
    repository::RepositoryState,
};

pub const CATEGORIA_NAO_ENCONTRADA: &str = "Categoria não encontrada!";

/// CategoriaService
///
/// Lifecycle and validation rules of categories.
#[derive(Clone)]
pub struct CategoriaService {
    repo: RepositoryState,
}

impl CategoriaService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// All categories in ascending id order, each with its products.
    pub async fn find_all(&self) -> AppResult<Vec<Categoria>> {
        self.repo.find_all_categorias().await
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Categoria> {
        self.repo
            .find_categoria_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORIA_NAO_ENCONTRADA))
    }

    /// Case-insensitive substring search on `descricao`. No match is an empty list.
    pub async fn find_all_by_descricao(&self, descricao: &str) -> AppResult<Vec<Categoria>> {
        self.repo.find_categorias_by_descricao(descricao).await
    }

    /// Case-insensitive substring search on `nome`.
    pub async fn find_all_by_nome(&self, nome: &str) -> AppResult<Vec<Categoria>> {
        self.repo.find_categorias_by_nome(nome).await
    }

    /// Persists a new category. Any `id` in the payload is ignored.
    pub async fn create(&self, payload: CategoriaRequest) -> AppResult<Categoria> {
        let categoria = Categoria {
            id: 0,
            nome: payload.nome,
            descricao: payload.descricao,
            produtos: Vec::new(),
        };

        let created = self.repo.create_categoria(&categoria).await?;
        tracing::info!(categoria_id = created.id, "categoria created");
        Ok(created)
    }

    /// Replaces every field of an existing category.
    pub async fn update(&self, payload: CategoriaRequest) -> AppResult<Categoria> {
        let id = payload
            .id
            .ok_or_else(|| AppError::bad_request("O id da categoria é obrigatório."))?;

        self.find_by_id(id).await?;

        let categoria = Categoria {
            id,
            nome: payload.nome,
            descricao: payload.descricao,
            produtos: Vec::new(),
        };

        // The row can vanish between the read above and this write.
        let updated = self
            .repo
            .update_categoria(&categoria)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORIA_NAO_ENCONTRADA))?;
        tracing::info!(categoria_id = id, "categoria updated");
        Ok(updated)
    }

    /// Replaces only the description, trimmed. Blank descriptions are rejected.
    pub async fn update_descricao(&self, id: i32, nova_descricao: &str) -> AppResult<Categoria> {
        let mut categoria = self.find_by_id(id).await?;

        let nova_descricao = nova_descricao.trim();
        if nova_descricao.is_empty() {
            return Err(AppError::bad_request("Descrição não pode ser vazia!"));
        }

        categoria.descricao = nova_descricao.to_string();
        self.repo
            .update_categoria(&categoria)
            .await?
            .ok_or_else(|| AppError::not_found(CATEGORIA_NAO_ENCONTRADA))
    }

    /// Removes a category. Categories that still own products are kept.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.find_by_id(id).await?;

        let produtos = self.repo.count_produtos_by_categoria(id).await?;
        if produtos > 0 {
            return Err(AppError::bad_request(format!(
                "A categoria possui {} produto(s) vinculado(s) e não pode ser removida.",
                produtos
            )));
        }

        if !self.repo.delete_categoria(id).await? {
            return Err(AppError::not_found(CATEGORIA_NAO_ENCONTRADA));
        }
        tracing::info!(categoria_id = id, "categoria deleted");
        Ok(())
    }
}
