/// User store collaborator
///
/// The authentication core does not own user persistence; it talks to a
/// keyed store through the `UserStore` trait. Two implementations ship
/// here: a Postgres-backed store for deployments and an in-memory store
/// for tests and embedders.

mod memory;
mod models;
mod postgres;
mod store;

pub use memory::InMemoryUserStore;
pub use models::AuthUser;
pub use models::NewUser;
pub use models::StoredUser;
pub use postgres::PostgresUserStore;
pub use store::UserStore;
