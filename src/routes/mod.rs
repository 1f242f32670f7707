//! Router Module Index
//!
//! The explicit route table of the application, split by access level. The guard is
//! applied per module in `create_router`, never per handler.

/// Routes accessible without a token.
pub mod public;

/// Routes behind the bearer-token guard.
pub mod authenticated;
