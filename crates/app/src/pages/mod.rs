//! 画面ごとの状態と操作
//!
//! どの画面もリゾルバーの結果（`RouteData`）から組み立てる。データは欠けている可能性がある。

pub mod create_group;
pub mod dashboard;
pub mod group_detail;
pub mod group_edit;
pub mod groups;
pub mod register;
pub mod task_detail;
pub mod task_edit;

pub use create_group::CreateGroupPage;
pub use dashboard::DashboardPage;
pub use group_detail::{GroupDetailPage, TASK_PAGE_SIZE};
pub use group_edit::GroupEditPage;
pub use groups::{join_error_message, GroupsPage};
pub use register::RegisterPage;
pub use task_detail::TaskDetailPage;
pub use task_edit::TaskEditPage;
