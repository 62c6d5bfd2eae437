pub mod components;
pub mod context;
pub mod dialogs;
pub mod guard;
pub mod navigation;
pub mod pages;
pub mod resolvers;
pub mod router;
pub mod routes;

pub use context::AppContext;
pub use dialogs::{ConfirmDialog, DialogKind, Dialogs, RecordingDialogs, StatusDialog};
pub use guard::{can_activate, GuardOutcome};
pub use navigation::{NavigationHistory, Navigator};
pub use resolvers::{GroupResolvedData, Resolved, Resolvers, RouteData};
pub use router::{Activation, Router};
pub use routes::{ResolveKey, Route};
