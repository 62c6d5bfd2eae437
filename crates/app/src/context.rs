use crate::dialogs::Dialogs;
use crate::navigation::Navigator;
use infrastructure::{GroupsService, StudyConnectApi, TasksService, UsersService};
use shared::AuthService;
use std::sync::Arc;

/// 画面とリゾルバーが共有するサービス一式
#[derive(Clone)]
pub struct AppContext {
    pub groups: GroupsService,
    pub tasks: TasksService,
    pub users: UsersService,
    pub auth: AuthService,
    pub dialogs: Arc<dyn Dialogs>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppContext {
    pub fn new(
        api: Arc<dyn StudyConnectApi>,
        auth: AuthService,
        dialogs: Arc<dyn Dialogs>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            groups: GroupsService::new(api.clone()),
            tasks: TasksService::new(api.clone()),
            users: UsersService::new(api),
            auth,
            dialogs,
            navigator,
        }
    }

    pub fn navigate(&self, path: &str) {
        self.navigator.navigate(path);
    }
}
