pub mod api;
pub mod groups;
pub mod http_client;
pub mod memory;
pub mod tasks;
pub mod users;

pub use api::*;
pub use groups::*;
pub use http_client::*;
pub use memory::*;
pub use tasks::*;
pub use users::*;
