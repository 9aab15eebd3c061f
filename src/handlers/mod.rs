// handlers/mod.rs - Two-tier handler architecture:
// Public (no auth) → Protected (bearer credential required)
pub mod protected;
pub mod public;
