use crate::{
    error::{AppError, AppResult},
    models::{Categoria, Produto, Usuario},
    repository::Repository,
};
use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Tables keyed by id. `BTreeMap` keeps iteration in ascending id order, which is the
/// order every listing query promises.
#[derive(Default)]
struct Tables {
    categorias: BTreeMap<i32, Categoria>,
    produtos: BTreeMap<i32, Produto>,
    usuarios: BTreeMap<i32, Usuario>,
    next_categoria_id: i32,
    next_produto_id: i32,
    next_usuario_id: i32,
}

impl Tables {
    fn with_produtos(&self, categoria: &Categoria) -> Categoria {
        let mut categoria = categoria.clone();
        categoria.produtos = self
            .produtos
            .values()
            .filter(|p| p.categoria_id == categoria.id)
            .cloned()
            .collect();
        categoria
    }

    fn categorias_matching<F>(&self, predicate: F) -> Vec<Categoria>
    where
        F: Fn(&Categoria) -> bool,
    {
        self.categorias
            .values()
            .filter(|&c| predicate(c))
            .map(|c| self.with_produtos(c))
            .collect()
    }

    /// Mirrors the foreign keys of the `produtos` table.
    fn check_produto_refs(&self, produto: &Produto) -> AppResult<()> {
        if !self.categorias.contains_key(&produto.categoria_id)
            || !self.usuarios.contains_key(&produto.usuario_id)
        {
            return Err(AppError::bad_request("produto: referência inválida."));
        }
        Ok(())
    }

    /// Mirrors the UNIQUE constraint on `usuarios.usuario`.
    fn check_login_free(&self, usuario: &Usuario) -> AppResult<()> {
        let taken = self
            .usuarios
            .values()
            .any(|u| u.id != usuario.id && u.usuario == usuario.usuario);
        if taken {
            return Err(AppError::bad_request("usuario: registro duplicado."));
        }
        Ok(())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// InMemoryRepository
///
/// A `Repository` held entirely in process memory. It enforces the same constraints the
/// Postgres schema does (unique login, restricted foreign keys) so services behave the
/// same on both. Used by the test suite and by `STORAGE=memory` local runs.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // No lock is ever held across an await, so a poisoned mutex still holds consistent data.
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_all_categorias(&self) -> AppResult<Vec<Categoria>> {
        Ok(self.tables().categorias_matching(|_| true))
    }

    async fn find_categoria_by_id(&self, id: i32) -> AppResult<Option<Categoria>> {
        let tables = self.tables();
        Ok(tables.categorias.get(&id).map(|c| tables.with_produtos(c)))
    }

    async fn find_categorias_by_descricao(&self, descricao: &str) -> AppResult<Vec<Categoria>> {
        Ok(self
            .tables()
            .categorias_matching(|c| contains_ignore_case(&c.descricao, descricao)))
    }

    async fn find_categorias_by_nome(&self, nome: &str) -> AppResult<Vec<Categoria>> {
        Ok(self
            .tables()
            .categorias_matching(|c| contains_ignore_case(&c.nome, nome)))
    }

    async fn create_categoria(&self, categoria: &Categoria) -> AppResult<Categoria> {
        let mut tables = self.tables();
        tables.next_categoria_id += 1;
        let stored = Categoria {
            id: tables.next_categoria_id,
            nome: categoria.nome.clone(),
            descricao: categoria.descricao.clone(),
            produtos: Vec::new(),
        };
        tables.categorias.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_categoria(&self, categoria: &Categoria) -> AppResult<Option<Categoria>> {
        let mut tables = self.tables();
        let Some(existing) = tables.categorias.get_mut(&categoria.id) else {
            return Ok(None);
        };
        existing.nome = categoria.nome.clone();
        existing.descricao = categoria.descricao.clone();
        let updated = existing.clone();
        Ok(Some(tables.with_produtos(&updated)))
    }

    async fn delete_categoria(&self, id: i32) -> AppResult<bool> {
        let mut tables = self.tables();
        if tables.produtos.values().any(|p| p.categoria_id == id) {
            return Err(AppError::bad_request("delete_categoria: referência inválida."));
        }
        Ok(tables.categorias.remove(&id).is_some())
    }

    async fn count_produtos_by_categoria(&self, categoria_id: i32) -> AppResult<i64> {
        let count = self
            .tables()
            .produtos
            .values()
            .filter(|p| p.categoria_id == categoria_id)
            .count();
        Ok(count as i64)
    }

    async fn find_all_produtos(&self) -> AppResult<Vec<Produto>> {
        Ok(self.tables().produtos.values().cloned().collect())
    }

    async fn find_produto_by_id(&self, id: i32) -> AppResult<Option<Produto>> {
        Ok(self.tables().produtos.get(&id).cloned())
    }

    async fn find_produtos_by_nome(&self, nome: &str) -> AppResult<Vec<Produto>> {
        Ok(self
            .tables()
            .produtos
            .values()
            .filter(|p| contains_ignore_case(&p.nome, nome))
            .cloned()
            .collect())
    }

    async fn create_produto(&self, produto: &Produto) -> AppResult<Produto> {
        let mut tables = self.tables();
        tables.check_produto_refs(produto)?;
        tables.next_produto_id += 1;
        let stored = Produto {
            id: tables.next_produto_id,
            ..produto.clone()
        };
        tables.produtos.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_produto(&self, produto: &Produto) -> AppResult<Option<Produto>> {
        let mut tables = self.tables();
        if !tables.produtos.contains_key(&produto.id) {
            return Ok(None);
        }
        tables.check_produto_refs(produto)?;
        tables.produtos.insert(produto.id, produto.clone());
        Ok(Some(produto.clone()))
    }

    async fn delete_produto(&self, id: i32) -> AppResult<bool> {
        Ok(self.tables().produtos.remove(&id).is_some())
    }

    async fn find_all_usuarios(&self) -> AppResult<Vec<Usuario>> {
        Ok(self.tables().usuarios.values().cloned().collect())
    }

    async fn find_usuario_by_id(&self, id: i32) -> AppResult<Option<Usuario>> {
        Ok(self.tables().usuarios.get(&id).cloned())
    }

    async fn find_usuario_by_login(&self, usuario: &str) -> AppResult<Option<Usuario>> {
        Ok(self
            .tables()
            .usuarios
            .values()
            .find(|u| u.usuario == usuario)
            .cloned())
    }

    async fn create_usuario(&self, usuario: &Usuario) -> AppResult<Usuario> {
        let mut tables = self.tables();
        let stored = Usuario {
            id: tables.next_usuario_id + 1,
            ..usuario.clone()
        };
        tables.check_login_free(&stored)?;
        tables.next_usuario_id = stored.id;
        tables.usuarios.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_usuario(&self, usuario: &Usuario) -> AppResult<Option<Usuario>> {
        let mut tables = self.tables();
        if !tables.usuarios.contains_key(&usuario.id) {
            return Ok(None);
        }
        tables.check_login_free(usuario)?;
        tables.usuarios.insert(usuario.id, usuario.clone());
        Ok(Some(usuario.clone()))
    }
}
