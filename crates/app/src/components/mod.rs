pub mod create_task_dialog;
pub mod form;
pub mod roster;
pub mod table;
pub mod task_editor;

pub use create_task_dialog::{CreateTaskDialog, CreateTaskDialogData};
pub use form::{FieldKind, FieldOption, FormConfig, FormField, FormValues, CREATE_GROUP_CONFIG};
pub use roster::{RosterEditor, UserCard};
pub use table::{ButtonColor, DataTable, SortDirection, TableActionButton, TableColumn};
pub use task_editor::{AssigneeCard, TaskEditor};
