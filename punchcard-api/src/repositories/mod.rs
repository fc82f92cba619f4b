mod repo_error;
mod session_repo;

pub use repo_error::RepositoryError;
pub use session_repo::PostgresSessionStore;
