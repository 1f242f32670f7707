use crate::{
    auth,
    error::{AppError, AppResult},
    models::{Usuario, UsuarioRequest},
    repository::RepositoryState,
};

pub const USUARIO_NAO_ENCONTRADO: &str = "Usuário não encontrado!";
pub const USUARIO_JA_EXISTE: &str = "O Usuário já existe!";

/// UsuarioService
///
/// Account registration and maintenance. Passwords are hashed here and nowhere else.
#[derive(Clone)]
pub struct UsuarioService {
    repo: RepositoryState,
    bcrypt_cost: u32,
}

impl UsuarioService {
    pub fn new(repo: RepositoryState, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    pub async fn find_all(&self) -> AppResult<Vec<Usuario>> {
        self.repo.find_all_usuarios().await
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Usuario> {
        self.repo
            .find_usuario_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(USUARIO_NAO_ENCONTRADO))
    }

    pub async fn find_by_usuario(&self, usuario: &str) -> AppResult<Option<Usuario>> {
        self.repo.find_usuario_by_login(usuario).await
    }

    /// Registers a new account. The login identifier must not be taken.
    pub async fn create(&self, payload: UsuarioRequest) -> AppResult<Usuario> {
        if self.find_by_usuario(&payload.usuario).await?.is_some() {
            return Err(AppError::bad_request(USUARIO_JA_EXISTE));
        }

        let usuario = Usuario {
            id: 0,
            nome: payload.nome,
            usuario: payload.usuario,
            senha: self.hash(payload.senha).await?,
            foto: payload.foto,
        };

        let created = self.repo.create_usuario(&usuario).await?;
        tracing::info!(usuario_id = created.id, "usuario registered");
        Ok(created)
    }

    /// Replaces every field of an existing account, re-hashing the password. The new login
    /// may only collide with the account's own current login.
    pub async fn update(&self, payload: UsuarioRequest) -> AppResult<Usuario> {
        let id = payload
            .id
            .ok_or_else(|| AppError::bad_request("O id do usuário é obrigatório."))?;

        self.find_by_id(id).await?;

        if let Some(existing) = self.find_by_usuario(&payload.usuario).await? {
            if existing.id != id {
                return Err(AppError::bad_request(USUARIO_JA_EXISTE));
            }
        }

        let usuario = Usuario {
            id,
            nome: payload.nome,
            usuario: payload.usuario,
            senha: self.hash(payload.senha).await?,
            foto: payload.foto,
        };

        let updated = self
            .repo
            .update_usuario(&usuario)
            .await?
            .ok_or_else(|| AppError::not_found(USUARIO_NAO_ENCONTRADO))?;
        tracing::info!(usuario_id = id, "usuario updated");
        Ok(updated)
    }

    // bcrypt is CPU bound; keep it off the async workers.
    async fn hash(&self, senha: String) -> AppResult<String> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || auth::hash_password(&senha, cost))
            .await
            .map_err(|e| AppError::internal(format!("hashing task failed: {}", e)))?
    }
}
