/// 画面遷移先のルート
///
/// IDパラメータは生の文字列のまま保持し、数値かどうかはリゾルバーで検証する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Register,
    Dashboard,
    Groups,
    CreateGroup,
    GroupDetail { group_id: String },
    GroupEdit { group_id: String },
    TaskDetail { group_id: String, task_id: String },
    TaskEdit { group_id: String, task_id: String },
    Unauthorized { return_url: Option<String> },
    NotAllowed,
    NotFound,
}

/// ルートが必要とする事前取得データ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveKey {
    UserId,
    Users,
    UserTasks,
    UserGroups,
    GroupData,
    GroupMembers,
    Task,
}

impl Route {
    /// URL（クエリ文字列を含んでよい）をルートに変換する
    /// 空のパスはダッシュボード、どれにも一致しなければ NotFound
    pub fn parse(url: &str) -> Route {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["register"] => Route::Register,
            ["dashboard"] => Route::Dashboard,
            ["groups"] => Route::Groups,
            ["groups", "create"] => Route::CreateGroup,
            ["groups", group_id] => Route::GroupDetail {
                group_id: group_id.to_string(),
            },
            ["groups", group_id, "edit"] => Route::GroupEdit {
                group_id: group_id.to_string(),
            },
            ["groups", group_id, "tasks", task_id] => Route::TaskDetail {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
            },
            ["groups", group_id, "tasks", task_id, "edit"] => Route::TaskEdit {
                group_id: group_id.to_string(),
                task_id: task_id.to_string(),
            },
            ["unauthorized"] => Route::Unauthorized {
                return_url: query.and_then(return_url_from_query),
            },
            ["not-allowed"] => Route::NotAllowed,
            ["not-found"] => Route::NotFound,
            _ => Route::NotFound,
        }
    }

    /// 正規化したパス
    pub fn path(&self) -> String {
        match self {
            Route::Register => "/register".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Groups => "/groups".to_string(),
            Route::CreateGroup => "/groups/create".to_string(),
            Route::GroupDetail { group_id } => format!("/groups/{group_id}"),
            Route::GroupEdit { group_id } => format!("/groups/{group_id}/edit"),
            Route::TaskDetail { group_id, task_id } => {
                format!("/groups/{group_id}/tasks/{task_id}")
            }
            Route::TaskEdit { group_id, task_id } => {
                format!("/groups/{group_id}/tasks/{task_id}/edit")
            }
            Route::Unauthorized { return_url: None } => "/unauthorized".to_string(),
            Route::Unauthorized {
                return_url: Some(url),
            } => format!("/unauthorized?returnUrl={url}"),
            Route::NotAllowed => "/not-allowed".to_string(),
            Route::NotFound => "/not-found".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Register => "register",
            Route::Dashboard => "dashboard",
            Route::Groups => "groups",
            Route::CreateGroup => "create_group",
            Route::GroupDetail { .. } => "group_detail",
            Route::GroupEdit { .. } => "group_edit",
            Route::TaskDetail { .. } => "task_detail",
            Route::TaskEdit { .. } => "task_edit",
            Route::Unauthorized { .. } => "unauthorized",
            Route::NotAllowed => "not_allowed",
            Route::NotFound => "not_found",
        }
    }

    /// 認証ガードの対象か
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Route::Register | Route::Unauthorized { .. } | Route::NotAllowed | Route::NotFound
        )
    }

    pub fn resolve_keys(&self) -> &'static [ResolveKey] {
        match self {
            Route::Dashboard => &[ResolveKey::UserId, ResolveKey::UserTasks, ResolveKey::UserGroups],
            Route::Groups => &[ResolveKey::UserId],
            Route::CreateGroup => &[ResolveKey::UserId, ResolveKey::Users],
            Route::GroupDetail { .. } | Route::GroupEdit { .. } => {
                &[ResolveKey::GroupData, ResolveKey::UserId, ResolveKey::Users]
            }
            Route::TaskDetail { .. } | Route::TaskEdit { .. } => {
                &[ResolveKey::Task, ResolveKey::GroupMembers, ResolveKey::UserId]
            }
            Route::Register
            | Route::Unauthorized { .. }
            | Route::NotAllowed
            | Route::NotFound => &[],
        }
    }

    pub fn group_param(&self) -> Option<&str> {
        match self {
            Route::GroupDetail { group_id }
            | Route::GroupEdit { group_id }
            | Route::TaskDetail { group_id, .. }
            | Route::TaskEdit { group_id, .. } => Some(group_id),
            _ => None,
        }
    }

    pub fn task_param(&self) -> Option<&str> {
        match self {
            Route::TaskDetail { task_id, .. } | Route::TaskEdit { task_id, .. } => Some(task_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// `returnUrl` は最後のパラメータとして付くため、戻り先自身のクエリ文字列も含めて取り出す
fn return_url_from_query(query: &str) -> Option<String> {
    let value = match query.strip_prefix("returnUrl=") {
        Some(value) => value,
        None => query.split_once("&returnUrl=")?.1,
    };
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/register"), Route::Register);
        assert_eq!(Route::parse("/groups/create"), Route::CreateGroup);
        assert_eq!(
            Route::parse("/groups/4/tasks/7/edit"),
            Route::TaskEdit {
                group_id: "4".to_string(),
                task_id: "7".to_string()
            }
        );
        assert_eq!(
            Route::parse("/groups/abc"),
            Route::GroupDetail {
                group_id: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_empty_path_is_dashboard_and_unknown_is_not_found() {
        assert_eq!(Route::parse(""), Route::Dashboard);
        assert_eq!(Route::parse("/"), Route::Dashboard);
        assert_eq!(Route::parse("/settings/profile"), Route::NotFound);
        assert_eq!(Route::parse("/groups/4/members"), Route::NotFound);
    }

    #[test]
    fn test_unauthorized_keeps_return_url() {
        let route = Route::parse("/unauthorized?returnUrl=/groups/4");
        assert_eq!(
            route,
            Route::Unauthorized {
                return_url: Some("/groups/4".to_string())
            }
        );
        assert_eq!(route.path(), "/unauthorized?returnUrl=/groups/4");
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn test_return_url_keeps_its_query_string() {
        let route = Route::Unauthorized {
            return_url: Some("/groups?view=mine&page=2".to_string()),
        };
        assert_eq!(Route::parse(&route.path()), route);
        assert_eq!(
            Route::parse("/unauthorized?lang=de&returnUrl=/dashboard"),
            Route::Unauthorized {
                return_url: Some("/dashboard".to_string())
            }
        );
    }

    #[test]
    fn test_public_routes_skip_guard_and_resolvers() {
        for route in [Route::Register, Route::NotAllowed, Route::NotFound] {
            assert!(!route.requires_auth());
            assert!(route.resolve_keys().is_empty());
        }
        assert!(Route::Groups.requires_auth());
    }

    #[test]
    fn test_task_routes_expose_params() {
        let route = Route::parse("/groups/4/tasks/x");
        assert_eq!(route.group_param(), Some("4"));
        assert_eq!(route.task_param(), Some("x"));
        assert_eq!(route.name(), "task_detail");
    }
}
