mod ids;
mod session;
mod summary;

pub use ids::*;
pub use session::*;
pub use summary::*;
