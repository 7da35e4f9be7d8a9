// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition only. These handlers get no user context, so every
// input is validated by the credential service before use.
pub mod auth;

pub use auth::*;
