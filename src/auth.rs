use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    repository::RepositoryState,
};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Claims
///
/// Payload of the JSON Web Tokens issued by `POST /usuarios/logar`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the login identifier (`usuario`) of the account.
    pub sub: String,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub usuario: String,
}

/// Hashes a plain-text password with a fresh salt.
pub fn hash_password(senha: &str, cost: u32) -> AppResult<String> {
    Ok(bcrypt::hash(senha, cost)?)
}

/// Compares a plain-text password against a stored bcrypt hash.
pub fn verify_password(senha: &str, hash: &str) -> AppResult<bool> {
    Ok(bcrypt::verify(senha, hash)?)
}

/// issue_token
///
/// Signs an HS256 token for `usuario` valid for `config.jwt_expiration_secs` and returns it
/// with the `Bearer ` prefix already applied.
pub fn issue_token(usuario: &str, config: &AppConfig) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(config.jwt_expiration_secs);

    let claims = Claims {
        sub: usuario.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &key)?;
    Ok(format!("{}{}", BEARER_PREFIX, token))
}

/// verify_token
///
/// Decodes and validates (signature and expiry) a raw token, without the `Bearer ` prefix.
pub fn verify_token(token: &str, config: &AppConfig) -> AppResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(AppError::unauthorized("Token expirado.")),
            _ => {
                tracing::debug!("rejected token: {:?}", e);
                Err(AppError::unauthorized("Token inválido."))
            }
        },
    }
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler or middleware argument. The guard:
/// 1. reads `Authorization: Bearer <jwt>`,
/// 2. validates the token against the configured secret,
/// 3. re-loads the account, so tokens of removed accounts stop working.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Token de autenticação ausente."))?;

        let token = auth_header
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| AppError::unauthorized("Formato de token inválido."))?;

        let claims = verify_token(token, &config)?;

        let usuario = repo
            .find_usuario_by_login(&claims.sub)
            .await?
            .ok_or_else(|| AppError::unauthorized("Usuário não encontrado."))?;

        Ok(AuthUser {
            id: usuario.id,
            usuario: usuario.usuario,
        })
    }
}
