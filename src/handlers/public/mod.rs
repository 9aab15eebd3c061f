// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Product listing and detail are the only anonymous data endpoints; every
// mutation lives under handlers::protected.
pub mod products;
