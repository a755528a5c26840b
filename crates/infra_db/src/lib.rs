//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the age verification service, using SQLx.
//! The only durable state is the per-user success notice flag; everything
//! else lives in the identity server.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgNoticeStore};
//!
//! let pool = create_pool(&DatabaseConfig::new("postgres://localhost/guardio")).await?;
//! run_migrations(&pool).await?;
//! let store = PgNoticeStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod notice_store;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, run_migrations};
pub use error::DatabaseError;
pub use notice_store::PgNoticeStore;
