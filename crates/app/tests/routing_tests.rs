mod common;

use app::Route;
use common::{production_auth, Harness};
use domain::{GroupId, TaskId, UserId};

#[tokio::test]
async fn test_production_guard_redirects_unauthenticated_user() {
    let h = Harness::with_auth(production_auth(false, &[]));

    let activation = h.open("/groups").await;

    assert_eq!(
        activation.route,
        Route::Unauthorized {
            return_url: Some("/groups".to_string())
        }
    );
    assert_eq!(activation.path, "/unauthorized?returnUrl=/groups");
    assert_eq!(h.navigation.last().as_deref(), Some("/unauthorized?returnUrl=/groups"));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_production_guard_keeps_query_in_return_url() {
    let h = Harness::with_auth(production_auth(false, &[]));

    let activation = h.open("/groups?view=mine").await;

    assert_eq!(
        activation.route,
        Route::Unauthorized {
            return_url: Some("/groups?view=mine".to_string())
        }
    );
    assert_eq!(
        h.navigation.last().as_deref(),
        Some("/unauthorized?returnUrl=/groups?view=mine")
    );

    let h = Harness::with_auth(production_auth(false, &[]));
    let activation = h.open("").await;
    assert_eq!(
        activation.route,
        Route::Unauthorized {
            return_url: Some("/".to_string())
        }
    );
}

#[tokio::test]
async fn test_production_guard_requires_role() {
    let h = Harness::with_auth(production_auth(true, &["guest"]));
    let activation = h.open("/dashboard").await;
    assert_eq!(activation.route, Route::NotAllowed);
    assert!(activation.was_redirected());

    let h = Harness::with_auth(production_auth(true, &["studyconnect"]));
    let activation = h.open("/dashboard").await;
    assert_eq!(activation.name, "dashboard");
    assert!(!activation.was_redirected());
}

#[tokio::test]
async fn test_public_routes_skip_guard() {
    let h = Harness::with_auth(production_auth(false, &[]));
    let activation = h.open("/register").await;
    assert_eq!(activation.route, Route::Register);
    assert!(h.navigation.entries().is_empty());
}

#[tokio::test]
async fn test_non_numeric_group_id_never_reaches_backend() {
    let h = Harness::new();

    let activation = h.open("/groups/abc").await;

    assert_eq!(activation.route, Route::NotFound);
    assert_eq!(h.navigation.last().as_deref(), Some("/not-found"));
    assert_eq!(h.api.call_count("get_group"), 0);
    assert_eq!(h.api.call_count("group_members"), 0);
    assert_eq!(h.api.call_count("group_admins"), 0);
    assert_eq!(h.api.call_count("tasks_for_group"), 0);
}

#[tokio::test]
async fn test_non_numeric_task_id_never_fetches_tasks() {
    let h = Harness::new();

    let activation = h.open("/groups/4/tasks/first").await;

    assert_eq!(activation.route, Route::NotFound);
    assert_eq!(h.api.call_count("tasks_for_group"), 0);
}

#[tokio::test]
async fn test_invalid_params_redirect_once() {
    let h = Harness::new();

    let activation = h.open("/groups/abc/tasks/xyz").await;

    assert_eq!(activation.route, Route::NotFound);
    assert_eq!(h.navigation.entries(), vec!["/not-found".to_string()]);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_failed_fetches_redirect_once() {
    let h = Harness::new();

    let activation = h.open("/groups/999/tasks/1").await;

    assert_eq!(activation.route, Route::NotFound);
    assert_eq!(h.navigation.entries(), vec!["/not-found".to_string()]);
}

#[tokio::test]
async fn test_group_detail_resolves_all_data() {
    let h = Harness::new();

    let activation = h.open("/groups/4").await;

    assert_eq!(activation.name, "group_detail");
    let data = activation.data;
    assert_eq!(data.user_id, Some(UserId::new(1)));
    assert_eq!(data.users.map(|users| users.len()), Some(3));
    let group = data.group.unwrap();
    assert_eq!(group.group.id, GroupId::new(4));
    assert_eq!(group.members.len(), 2);
    assert_eq!(group.admins.len(), 1);
    assert_eq!(group.tasks.len(), 2);
}

#[tokio::test]
async fn test_missing_task_redirects_to_not_found() {
    let h = Harness::new();
    let activation = h.open("/groups/4/tasks/999").await;
    assert_eq!(activation.route, Route::NotFound);
    assert_eq!(h.navigation.last().as_deref(), Some("/not-found"));

    let activation = h.open("/groups/4/tasks/7").await;
    assert_eq!(activation.data.task.map(|t| t.id()), Some(TaskId::new(7)));
}

#[tokio::test]
async fn test_dashboard_tolerates_task_fetch_failure() {
    let h = Harness::new();
    h.api.fail(
        "tasks_for_user",
        shared::AppError::Network("offline".to_string()),
    );

    let activation = h.open("").await;

    assert_eq!(activation.route, Route::Dashboard);
    assert!(activation.data.user_tasks.is_none());
    assert_eq!(activation.data.user_groups.map(|g| g.len()), Some(1));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let h = Harness::new();
    let activation = h.open("/settings/profile").await;
    assert_eq!(activation.route, Route::NotFound);
    assert!(h.api.calls().is_empty());
}
