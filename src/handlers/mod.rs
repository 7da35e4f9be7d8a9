// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (Bearer token required).
// Routing lives in app.rs; the protected tier is wrapped in jwt_auth_middleware there.
pub mod public;    // /api/register, /api/login
pub mod protected; // /api/profile, /api/transactions/*
