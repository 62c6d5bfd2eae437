mod common;

use app::pages::{
    CreateGroupPage, GroupDetailPage, GroupEditPage, GroupsPage, RegisterPage,
};
use common::Harness;
use domain::{GroupId, RegistrationForm, TaskId, TaskStatus, UserId};
use infrastructure::DisplayTask;
use shared::AppError;

fn registration(email: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        email: email.to_string(),
        firstname: "Dora".to_string(),
        lastname: "Klein".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_status_change_rolls_back_on_failure() {
    let h = Harness::new();
    let data = h.open("/groups/4").await.data;
    let page = GroupDetailPage::new(h.ctx(), data);
    h.api.fail("update_task", AppError::Network("timeout".to_string()));

    page.on_status_change(TaskId::new(7), TaskStatus::Completed).await;

    let task = page.tasks().into_iter().find(|t| t.id() == TaskId::new(7)).unwrap();
    assert_eq!(task.task.status, TaskStatus::Open);
    assert!(!page.is_updating_task(TaskId::new(7)));
    assert_eq!(h.last_dialog_title().as_deref(), Some("Status update failed"));
}

#[tokio::test]
async fn test_status_change_keeps_new_status_on_success() {
    let h = Harness::new();
    let data = h.open("/groups/4").await.data;
    let page = GroupDetailPage::new(h.ctx(), data);

    page.on_status_change(TaskId::new(7), TaskStatus::Completed).await;

    assert_eq!(page.tasks_for_status(TaskStatus::Completed).len(), 1);
    assert_eq!(h.api.call_count("update_task"), 1);
    assert!(h.dialogs.statuses().is_empty());
}

#[tokio::test]
async fn test_created_task_is_prepended() {
    let h = Harness::new();
    let data = h.open("/groups/4").await.data;
    let page = GroupDetailPage::new(h.ctx(), data);
    let task = h.api.insert_task(
        GroupId::new(4),
        "Prepare slides",
        TaskStatus::Open,
        &[],
        &[UserId::new(1)],
        UserId::new(1),
    );
    h.dialogs.queue_created_task(DisplayTask::from_task(task.clone()));

    page.open_create_task_dialog().await;

    assert_eq!(page.tasks().first().map(|t| t.id()), Some(task.id));
    assert_eq!(page.tasks().len(), 3);
    assert_eq!(h.last_dialog_title().as_deref(), Some("Task created"));
}

#[tokio::test]
async fn test_join_public_group_from_list() {
    let h = Harness::new();
    let data = h.open("/groups").await.data;
    let page = GroupsPage::new(h.ctx(), data);
    page.load().await;
    let databases = page
        .suggested_groups()
        .into_iter()
        .find(|g| g.id == GroupId::new(5))
        .unwrap();
    assert!(page.can_join_group(&databases));

    page.join_group(&databases).await;

    assert!(page.user_groups().iter().any(|g| g.id == databases.id));
    assert!(!page.suggested_groups().iter().any(|g| g.id == databases.id));
    assert!(!page.can_join_group(&databases));
    assert!(h.api.members_of(GroupId::new(5)).contains(&UserId::new(1)));
    assert_eq!(h.last_dialog_title().as_deref(), Some("Joined group"));
}

#[tokio::test]
async fn test_join_by_invite_code_trims_and_reloads() {
    let h = Harness::new();
    let data = h.open("/groups").await.data;
    let page = GroupsPage::new(h.ctx(), data);
    page.load().await;
    page.toggle_invite_join_form();
    page.set_invite_code_input("  SC-0006 ");

    page.join_group_by_invite_code(&page.invite_code_input()).await;

    assert!(page.user_groups().iter().any(|g| g.id == GroupId::new(6)));
    assert!(!page.show_invite_join_form());
    assert!(page.invite_code_input().is_empty());
    assert!(!page.join_by_invite_loading());
    let dialog = h.dialogs.last_status().unwrap();
    assert_eq!(dialog.title, "Joined group");
    assert_eq!(dialog.message, "You have successfully joined the group.");
}

#[tokio::test]
async fn test_join_by_invalid_invite_code_shows_backend_message() {
    let h = Harness::new();
    let data = h.open("/groups").await.data;
    let page = GroupsPage::new(h.ctx(), data);

    page.join_group_by_invite_code("SC-9999").await;

    let dialog = h.dialogs.last_status().unwrap();
    assert_eq!(dialog.title, "Join failed");
    assert!(dialog.message.contains("Invalid invite code"));
}

#[tokio::test]
async fn test_join_by_invite_code_requires_user() {
    let h = Harness::new();
    h.api.set_current_user(None);
    let data = h.open("/groups").await.data;
    let page = GroupsPage::new(h.ctx(), data);

    page.join_group_by_invite_code("SC-0005").await;

    assert_eq!(h.last_dialog_title().as_deref(), Some("Join unavailable"));
    assert_eq!(h.api.call_count("join_by_invite_code"), 0);
}

#[tokio::test]
async fn test_register_blocks_weak_password() {
    let h = Harness::new();
    let page = RegisterPage::new(h.ctx());
    page.set_form(registration("dora@studyconnect.dev", "password"));

    assert!(!page.is_valid());
    assert!(!page.submit().await);
    assert!(page.field_errors().has("password"));
    assert_eq!(h.api.call_count("create_user"), 0);
}

#[tokio::test]
async fn test_register_creates_user() {
    let h = Harness::new();
    let page = RegisterPage::new(h.ctx());
    page.set_form(registration("dora@studyconnect.dev", "Secret#123"));

    assert!(page.submit().await);
    assert_eq!(h.api.call_count("create_user"), 1);
    assert!(page.error_message().is_empty());
    assert!(!page.is_loading());
}

#[tokio::test]
async fn test_register_duplicate_email_shows_backend_message() {
    let h = Harness::new();
    let page = RegisterPage::new(h.ctx());
    page.set_form(registration("anna@studyconnect.dev", "Secret#123"));

    assert!(!page.submit().await);
    assert_eq!(page.error_message(), "Email is already registered");
}

#[tokio::test]
async fn test_group_edit_removes_members_and_admins_once() {
    let h = Harness::new();
    let ids = [UserId::new(1), UserId::new(2), UserId::new(3)];
    let group = h.api.insert_group("Study Buddies", true, 6, &ids, &ids);
    let data = h.open(&format!("/groups/{}/edit", group.id)).await.data;
    let page = GroupEditPage::new(h.ctx(), &group.id.to_string(), data);
    assert!(page.is_admin());

    page.remove_member(UserId::new(2));
    page.remove_admin(UserId::new(3));
    assert!(page.submit().await);

    assert_eq!(h.api.call_count("remove_member"), 1);
    assert_eq!(h.api.call_count("remove_admin"), 1);
    assert_eq!(h.api.members_of(group.id), vec![UserId::new(1), UserId::new(3)]);
    assert_eq!(h.api.admins_of(group.id), vec![UserId::new(1)]);
    assert_eq!(h.navigation.last(), Some(format!("/groups/{}", group.id)));
    assert_eq!(h.last_dialog_title().as_deref(), Some("Group updated"));
}

#[tokio::test]
async fn test_group_edit_rejects_non_admin() {
    let h = Harness::new();
    h.api.set_current_user(Some(UserId::new(2)));
    let data = h.open("/groups/4/edit").await.data;
    let page = GroupEditPage::new(h.ctx(), "4", data);

    assert!(!page.is_admin());
    assert!(!page.submit().await);
    assert_eq!(h.api.call_count("update_group"), 0);
}

#[tokio::test]
async fn test_create_group_rejects_admin_who_is_not_member() {
    let h = Harness::new();
    let data = h.open("/groups/create").await.data;
    let page = CreateGroupPage::new(h.ctx(), data);

    page.add_admin(UserId::new(3));

    assert_eq!(h.last_dialog_title().as_deref(), Some("Invalid Admin Selection"));
    assert!(!page.roster().is_admin(UserId::new(3)));
}

#[tokio::test]
async fn test_create_group_with_non_numeric_max_members() {
    let h = Harness::new();
    let data = h.open("/groups/create").await.data;
    let page = CreateGroupPage::new(h.ctx(), data);
    page.edit_form(|form| {
        form.name = "Reading Club".to_string();
        form.max_members = "abc".to_string();
    });

    assert!(!page.submit().await);
    assert_eq!(h.last_dialog_title().as_deref(), Some("Invalid max members"));
    assert_eq!(h.api.call_count("create_group"), 0);
}

#[tokio::test]
async fn test_create_group_navigates_to_new_group() {
    let h = Harness::new();
    let data = h.open("/groups/create").await.data;
    let page = CreateGroupPage::new(h.ctx(), data);
    page.edit_form(|form| {
        form.name = "Reading Club".to_string();
        form.max_members = "8".to_string();
    });
    page.add_member(UserId::new(2));
    page.add_admin(UserId::new(2));

    assert!(page.submit().await);

    let path = h.navigation.last().unwrap();
    assert!(path.starts_with("/groups/"));
    assert_eq!(h.last_dialog_title().as_deref(), Some("Group Created Successfully"));
    let group_id = GroupId::from_param(path.trim_start_matches("/groups/")).unwrap();
    assert_eq!(h.api.members_of(group_id), vec![UserId::new(1), UserId::new(2)]);
}
