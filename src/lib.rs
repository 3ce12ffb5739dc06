//! Entity CRUD: paginated, filtered entity listing over PostgreSQL, a fixture document store, or in-memory data.

pub mod config;
pub mod error;
pub mod migration;
pub mod pagination;
pub mod query;
pub mod response;
pub mod sql;
pub mod state;
pub mod store;
pub mod service;
pub mod handlers;
pub mod routes;

pub use config::{builtin_entities, load_from_file, resolve, EntityConfig, EntityRegistry, ResolvedEntity, ServerSettings};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use pagination::{PageMeta, PaginatedResult};
pub use query::{DataSource, ListRequest, PageRequest, SearchSpec, SortDirection, SortSpec};
pub use state::AppState;
pub use store::ensure_database_exists;
pub use routes::{app_router, common_routes, common_routes_with_ready, entity_routes};
pub use service::{
    DocumentStorePaginator, FixtureStore, InMemoryPaginator, Paginator, PgExecutor, RelationalPaginator, RetryPolicy,
    SqlExecutor,
};
