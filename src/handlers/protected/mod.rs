// handlers/protected/mod.rs - Protected handlers (bearer credential required)
//
// Every handler here takes the AuthUser extractor: the identity gate resolves
// the bearer token before any authorization or store work happens.
pub mod comments;
pub mod messages;
pub mod products;
pub mod profile;
