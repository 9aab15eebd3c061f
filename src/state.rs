use std::sync::Arc;

use sqlx::PgPool;

use crate::database::models::Profile;
use crate::database::Repository;
use crate::identity::IdentityProvider;
use crate::services::catalog::CatalogService;
use crate::services::messaging::MessageService;

/// Process-wide shared state: the store pool and the identity service
/// client, both built once at startup and torn down at shutdown.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub identity: Arc<dyn IdentityProvider>,
    pub catalog: CatalogService,
    pub messages: MessageService,
    pub profiles: Repository<Profile>,
}

impl AppState {
    pub fn new(pool: PgPool, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            catalog: CatalogService::new(pool.clone()),
            messages: MessageService::new(pool.clone()),
            profiles: Repository::new("profiles", pool.clone()),
            pool,
            identity,
        }
    }
}
