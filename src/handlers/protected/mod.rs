// handlers/protected/mod.rs - Protected handlers (Bearer token required)
//
// Each handler receives the verified `AuthUser` from the request extensions
// and passes its id as the owner to the services. No handler reads an owner
// id from the path, query, or body.
pub mod profile;
pub mod transactions;
