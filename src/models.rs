use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use std::borrow::Cow;
use validator::{Validate, ValidateEmail, ValidationError};

// --- Core Application Schemas (Mapped to Database) ---

/// Categoria
///
/// A product category from the `categorias` table. `produtos` is not a column: it is
/// filled by the repository with every product whose `categoria_id` points here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Categoria {
    pub id: i32,
    pub nome: String,
    pub descricao: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub produtos: Vec<Produto>,
}

/// Produto
///
/// A catalog item from the `produtos` table. Both foreign keys are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Produto {
    pub id: i32,
    pub nome: String,
    pub descricao: String,
    #[ts(type = "number")]
    #[schema(value_type = f64)]
    pub preco: Decimal,
    pub disponivel: bool,
    pub foto: String,
    pub categoria_id: i32,
    pub usuario_id: i32,
}

/// Usuario
///
/// An account from the `usuarios` table. `senha` holds the bcrypt hash and is never
/// written back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Usuario {
    pub id: i32,
    pub nome: String,
    /// Login identifier, e-mail shaped and unique.
    pub usuario: String,
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    #[schema(write_only)]
    pub senha: String,
    pub foto: String,
}

// --- Request Payloads (Input Schemas) ---

/// CategoriaRequest
///
/// Body of `POST /categorias` and `PUT /categorias`. `id` is ignored on create and
/// required on update.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CategoriaRequest {
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(
        custom(function = "not_blank", message = "O nome da categoria é obrigatório."),
        length(max = 255, message = "O nome da categoria deve ter no máximo 255 caracteres.")
    )]
    pub nome: String,
    #[validate(
        custom(function = "not_blank", message = "A descrição da categoria é obrigatória."),
        length(max = 255, message = "A descrição da categoria deve ter no máximo 255 caracteres.")
    )]
    pub descricao: String,
}

/// DescricaoRequest
///
/// Body of `PATCH /categorias/{id}/descricao`. Blank values are rejected by the service,
/// not here, so the rule lives in one place.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct DescricaoRequest {
    #[validate(length(max = 255, message = "A descrição da categoria deve ter no máximo 255 caracteres."))]
    pub descricao: String,
}

/// EntityRef
///
/// A reference to a related record, accepted either as a bare id (`"categoria": 1`)
/// or as an object carrying the id (`"categoria": {"id": 1, ...}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum EntityRef {
    Id(i32),
    Object { id: i32 },
}

impl EntityRef {
    pub fn id(&self) -> i32 {
        match *self {
            EntityRef::Id(id) | EntityRef::Object { id } => id,
        }
    }
}

/// ProdutoRequest
///
/// Body of `POST /produtos` and `PUT /produtos`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct ProdutoRequest {
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(
        custom(function = "not_blank", message = "O nome do produto é obrigatório."),
        length(max = 255, message = "O nome do produto deve ter no máximo 255 caracteres.")
    )]
    pub nome: String,
    #[validate(
        custom(function = "not_blank", message = "A descrição do produto é obrigatória."),
        length(max = 1000, message = "A descrição do produto deve ter no máximo 1000 caracteres.")
    )]
    pub descricao: String,
    /// At most two decimal places, below `PRECO_MAXIMO`.
    #[ts(type = "number")]
    #[schema(value_type = f64)]
    #[validate(custom(function = "valid_preco"))]
    pub preco: Decimal,
    #[serde(default = "default_disponivel")]
    pub disponivel: bool,
    #[serde(default)]
    #[validate(length(max = 5000, message = "A foto deve ter no máximo 5000 caracteres."))]
    pub foto: String,
    pub categoria: EntityRef,
    pub usuario: EntityRef,
}

fn default_disponivel() -> bool {
    true
}

/// UsuarioRequest
///
/// Body of `POST /usuarios/cadastrar` and `PUT /usuarios/atualizar`. `senha` arrives in
/// plain text and is hashed by the service before it reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UsuarioRequest {
    #[serde(default)]
    pub id: Option<i32>,
    #[validate(
        custom(function = "not_blank", message = "O nome do usuário é obrigatório."),
        length(max = 255, message = "O nome do usuário deve ter no máximo 255 caracteres.")
    )]
    pub nome: String,
    #[validate(
        custom(function = "email_shaped", message = "O usuário deve ser um e-mail válido."),
        length(max = 255, message = "O usuário deve ter no máximo 255 caracteres.")
    )]
    pub usuario: String,
    #[validate(length(min = 8, message = "A senha deve ter no mínimo 8 caracteres."))]
    pub senha: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "A foto deve ter no máximo 5000 caracteres."))]
    pub foto: String,
}

/// UsuarioLogin
///
/// Body of `POST /usuarios/logar`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UsuarioLogin {
    #[validate(custom(function = "not_blank", message = "O usuário é obrigatório."))]
    pub usuario: String,
    #[validate(custom(function = "not_blank", message = "A senha é obrigatória."))]
    pub senha: String,
}

/// LoginResponse
///
/// Returned by a successful login. `token` already carries the `Bearer ` prefix so clients
/// can forward it untouched in the `Authorization` header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub id: i32,
    pub nome: String,
    pub usuario: String,
    pub foto: String,
    pub token: String,
}

// --- Field Validators ---

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Largest price the `NUMERIC(10, 2)` column holds: 99999999.99.
pub const PRECO_MAXIMO: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

fn valid_preco(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(rejected("negative", "O preço não pode ser negativo."));
    }
    if *value > PRECO_MAXIMO {
        return Err(rejected("range", "O preço deve ser no máximo 99999999.99."));
    }
    // Stored with two decimal places; anything finer would be rounded away.
    if value.normalize().scale() > 2 {
        return Err(rejected("scale", "O preço deve ter no máximo duas casas decimais."));
    }
    Ok(())
}

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// RFC-style e-mail check plus a dotted domain: `root@root` is rejected.
fn email_shaped(value: &str) -> Result<(), ValidationError> {
    let dotted_domain = value
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.') && !domain.ends_with('.'));

    if !value.validate_email() || !dotted_domain {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}
