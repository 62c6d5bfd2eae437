pub mod due_date;
pub mod errors;
pub mod group;
pub mod ids;
pub mod roster;
pub mod tag_color;
pub mod task;
pub mod user;
pub mod validation;

pub use due_date::*;
pub use errors::*;
pub use group::*;
pub use ids::*;
pub use roster::*;
pub use tag_color::*;
pub use task::*;
pub use user::*;
pub use validation::*;
