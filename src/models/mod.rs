pub mod blueprints;
pub mod users;

pub use blueprints::*;
pub use users::*;
