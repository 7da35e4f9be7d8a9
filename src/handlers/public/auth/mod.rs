// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

pub mod login;    // POST /api/login - verify credentials and get a JWT
pub mod register; // POST /api/register - create a new account

pub use login::login_post;
pub use register::register_post;
