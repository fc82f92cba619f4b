mod mock;
mod session_store;

pub use mock::MockSessionStore;
pub use session_store::SessionStore;
