use crate::{
    auth,
    config::AppConfig,
    error::{AppError, AppResult},
    models::{LoginResponse, Usuario, UsuarioLogin},
    repository::RepositoryState,
};

const CREDENCIAIS_INVALIDAS: &str = "Usuário e/ou senha inválidos!";

/// AuthService
///
/// Credential checks and token issuance for `POST /usuarios/logar`. Token verification on
/// incoming requests is done by the `AuthUser` extractor.
#[derive(Clone)]
pub struct AuthService {
    repo: RepositoryState,
    config: AppConfig,
}

impl AuthService {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self { repo, config }
    }

    /// Returns the account when `senha` matches its stored hash. Unknown logins and wrong
    /// passwords fail the same way.
    pub async fn validate_credentials(&self, usuario: &str, senha: &str) -> AppResult<Usuario> {
        let Some(found) = self.repo.find_usuario_by_login(usuario).await? else {
            tracing::debug!(usuario, "login for unknown usuario");
            return Err(AppError::unauthorized(CREDENCIAIS_INVALIDAS));
        };

        let senha = senha.to_string();
        let hash = found.senha.clone();
        let matches = tokio::task::spawn_blocking(move || auth::verify_password(&senha, &hash))
            .await
            .map_err(|e| AppError::internal(format!("verification task failed: {}", e)))??;

        if !matches {
            tracing::debug!(usuario, "login with wrong password");
            return Err(AppError::unauthorized(CREDENCIAIS_INVALIDAS));
        }
        Ok(found)
    }

    pub async fn login(&self, credentials: UsuarioLogin) -> AppResult<LoginResponse> {
        let usuario = self
            .validate_credentials(&credentials.usuario, &credentials.senha)
            .await?;

        let token = auth::issue_token(&usuario.usuario, &self.config)?;
        tracing::info!(usuario_id = usuario.id, "usuario logged in");

        Ok(LoginResponse {
            id: usuario.id,
            nome: usuario.nome,
            usuario: usuario.usuario,
            foto: usuario.foto,
            token,
        })
    }
}
