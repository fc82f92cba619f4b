pub(crate) mod error;
pub(crate) mod identity;
pub(crate) mod time_tracking;

pub(crate) use error::ApiError;
pub(crate) use identity::EmployeeIdentity;
