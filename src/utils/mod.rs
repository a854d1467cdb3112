pub mod constants;
mod errors;
mod timeout;

pub use errors::SetupError;
pub use timeout::{
    MAX_INTERACTION_TIMEOUT_MS, MAX_NAVIGATION_TIMEOUT_MS, validate_interaction_timeout,
    validate_navigation_timeout,
};
