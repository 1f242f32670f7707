//! Resource services.
//!
//! Each service owns the business rules of one resource and receives its repository
//! explicitly at construction. Handlers never talk to the repository directly.
//!
//! Mutations are read-then-write and not atomic: two concurrent updates of the same record
//! can overwrite each other. Consistency beyond that is left to the storage backend.

pub mod auth;
pub mod categoria;
pub mod produto;
pub mod usuario;

pub use auth::AuthService;
pub use categoria::CategoriaService;
pub use produto::ProdutoService;
pub use usuario::UsuarioService;
