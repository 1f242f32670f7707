use crate::{
    error::{AppError, AppResult},
    models::{Produto, ProdutoRequest},
    repository::RepositoryState,
    services::{CategoriaService, UsuarioService},
};

pub const PRODUTO_NAO_ENCONTRADO: &str = "Produto não encontrado!";

/// ProdutoService
///
/// Product lifecycle. A product is only stored when the category and the user it points to
/// exist; both checks go through their own services so the NotFound messages match.
#[derive(Clone)]
pub struct ProdutoService {
    repo: RepositoryState,
    categorias: CategoriaService,
    usuarios: UsuarioService,
}

impl ProdutoService {
    pub fn new(
        repo: RepositoryState,
        categorias: CategoriaService,
        usuarios: UsuarioService,
    ) -> Self {
        Self {
            repo,
            categorias,
            usuarios,
        }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Produto>> {
        self.repo.find_all_produtos().await
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Produto> {
        self.repo
            .find_produto_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(PRODUTO_NAO_ENCONTRADO))
    }

    pub async fn find_all_by_nome(&self, nome: &str) -> AppResult<Vec<Produto>> {
        self.repo.find_produtos_by_nome(nome).await
    }

    pub async fn create(&self, payload: ProdutoRequest) -> AppResult<Produto> {
        let produto = self.resolve(0, payload).await?;

        let created = self.repo.create_produto(&produto).await?;
        tracing::info!(
            produto_id = created.id,
            categoria_id = created.categoria_id,
            "produto created"
        );
        Ok(created)
    }

    pub async fn update(&self, payload: ProdutoRequest) -> AppResult<Produto> {
        let id = payload
            .id
            .ok_or_else(|| AppError::bad_request("O id do produto é obrigatório."))?;

        self.find_by_id(id).await?;
        let produto = self.resolve(id, payload).await?;

        let updated = self
            .repo
            .update_produto(&produto)
            .await?
            .ok_or_else(|| AppError::not_found(PRODUTO_NAO_ENCONTRADO))?;
        tracing::info!(produto_id = id, "produto updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.find_by_id(id).await?;

        if !self.repo.delete_produto(id).await? {
            return Err(AppError::not_found(PRODUTO_NAO_ENCONTRADO));
        }
        tracing::info!(produto_id = id, "produto deleted");
        Ok(())
    }

    /// Checks both references and builds the record to store.
    async fn resolve(&self, id: i32, payload: ProdutoRequest) -> AppResult<Produto> {
        let categoria = self.categorias.find_by_id(payload.categoria.id()).await?;
        let usuario = self.usuarios.find_by_id(payload.usuario.id()).await?;

        Ok(Produto {
            id,
            nome: payload.nome,
            descricao: payload.descricao,
            preco: payload.preco,
            disponivel: payload.disponivel,
            foto: payload.foto,
            categoria_id: categoria.id,
            usuario_id: usuario.id,
        })
    }
}
