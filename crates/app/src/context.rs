//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use trolley::{products::Catalog, server::ServerCartStore};

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        carts::PgCartsService,
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrations(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn ServerCartStore>,
    pub products: Arc<dyn ProductsService>,
    pub catalog: Arc<dyn Catalog>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(url: &str, run_migrations: bool) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrations)?;

            info!("database migrations applied");
        }

        let db = Db::new(pool.clone());
        let products = Arc::new(PgProductsService::new(db.clone()));

        Ok(Self {
            carts: Arc::new(PgCartsService::new(db)),
            catalog: products.clone(),
            products,
            auth: Arc::new(PgAuthService::new(pool)),
        })
    }
}
