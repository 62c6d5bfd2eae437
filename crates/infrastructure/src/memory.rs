//! メモリ上で動作する API 実装
//!
//! オフラインでの動作確認とテストに使う。呼び出しを記録し、
//! 操作名を指定して失敗させることができる。

use crate::api::{Endpoint, StudyConnectApi};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Timelike};
use domain::{
    CreateGroupRequest, Group, GroupId, Task, TaskId, TaskPriority, TaskRequest, TaskStatus,
    UpdateGroupRequest, User, UserCreateRequest, UserId, UserUpdateRequest,
};
use shared::AppError;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug)]
struct GroupRecord {
    group: Group,
    members: Vec<UserId>,
    admins: Vec<UserId>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, GroupRecord>,
    tasks: BTreeMap<TaskId, Task>,
    current_user: Option<UserId>,
    next_id: i64,
    calls: Vec<Endpoint>,
    failures: HashMap<&'static str, AppError>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn group_mut(&mut self, group_id: GroupId) -> Result<&mut GroupRecord, AppError> {
        self.groups
            .get_mut(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("Group {group_id} not found")))
    }

    fn users_for(&self, ids: &[UserId]) -> Vec<User> {
        ids.iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryApi {
    state: Mutex<State>,
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn conflict(message: &str) -> AppError {
    AppError::Api {
        status: 409,
        message: Some(message.to_string()),
    }
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// デモ用の初期データ入り
    pub fn with_demo_data() -> Self {
        let api = Self::new();
        let anna = api.insert_user("anna@studyconnect.dev", "Anna", "Schmidt");
        let ben = api.insert_user("ben@studyconnect.dev", "Ben", "Weber");
        let clara = api.insert_user("clara@studyconnect.dev", "Clara", "Fischer");
        api.set_current_user(Some(anna.id));

        let algorithms = api.insert_group("Algorithms", true, 10, &[anna.id, ben.id], &[anna.id]);
        api.insert_group("Databases", true, 5, &[clara.id], &[clara.id]);
        api.insert_group("Thesis Circle", false, 4, &[ben.id, clara.id], &[ben.id]);

        api.insert_task(
            algorithms.id,
            "Read chapter 3",
            TaskStatus::Open,
            &["Exam"],
            &[anna.id, ben.id],
            anna.id,
        );
        api.insert_task(
            algorithms.id,
            "Solve sheet 2",
            TaskStatus::InProgress,
            &["homework"],
            &[ben.id],
            anna.id,
        );
        api
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // 毒化していても中身をそのまま使う
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 呼び出しを記録し、失敗が設定されていればそれを返す
    fn record(&self, endpoint: Endpoint) -> Result<MutexGuard<'_, State>, AppError> {
        let mut state = self.lock();
        debug!("インメモリAPI呼び出し: {} {}", endpoint.method(), endpoint.path());
        let failure = state.failures.get(endpoint.name()).cloned();
        state.calls.push(endpoint);
        match failure {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }

    pub fn insert_user(&self, email: &str, firstname: &str, lastname: &str) -> User {
        let mut state = self.lock();
        let user = User {
            id: UserId::new(state.next_id()),
            email: email.to_string(),
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
        };
        state.users.insert(user.id, user.clone());
        user
    }

    pub fn insert_group(
        &self,
        name: &str,
        is_public: bool,
        max_members: i32,
        members: &[UserId],
        admins: &[UserId],
    ) -> Group {
        let mut state = self.lock();
        let id = GroupId::new(state.next_id());
        let group = Group {
            id,
            name: name.to_string(),
            description: None,
            is_public,
            max_members,
            member_count: members.len() as i32,
            invite_code: format!("SC-{:04}", id.value()),
            created_by_id: admins.first().copied(),
            created_at: Some(now()),
            last_updated_at: Some(now()),
        };
        state.groups.insert(
            id,
            GroupRecord {
                group: group.clone(),
                members: members.to_vec(),
                admins: admins.to_vec(),
            },
        );
        group
    }

    pub fn insert_task(
        &self,
        group_id: GroupId,
        title: &str,
        status: TaskStatus,
        tags: &[&str],
        assignees: &[UserId],
        created_by: UserId,
    ) -> Task {
        let mut state = self.lock();
        let task = Task {
            id: TaskId::new(state.next_id()),
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: TaskPriority::Medium,
            status,
            category: None,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            created_by_id: created_by,
            assignee_ids: assignees.to_vec(),
            created_at: now(),
            updated_at: now(),
            last_status_change_at: None,
            group_id: Some(group_id),
        };
        state.tasks.insert(task.id, task.clone());
        task
    }

    pub fn set_current_user(&self, user_id: Option<UserId>) {
        self.lock().current_user = user_id;
    }

    /// 指定した操作名（`Endpoint::name`）の呼び出しを失敗させる
    pub fn fail(&self, operation: &'static str, error: AppError) {
        self.lock().failures.insert(operation, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|endpoint| endpoint.name() == operation)
            .count()
    }

    pub fn members_of(&self, group_id: GroupId) -> Vec<UserId> {
        self.lock()
            .groups
            .get(&group_id)
            .map(|record| record.members.clone())
            .unwrap_or_default()
    }

    pub fn admins_of(&self, group_id: GroupId) -> Vec<UserId> {
        self.lock()
            .groups
            .get(&group_id)
            .map(|record| record.admins.clone())
            .unwrap_or_default()
    }

    pub fn stored_task(&self, task_id: TaskId) -> Option<Task> {
        self.lock().tasks.get(&task_id).cloned()
    }

    pub fn stored_group(&self, group_id: GroupId) -> Option<Group> {
        self.lock()
            .groups
            .get(&group_id)
            .map(|record| record.group.clone())
    }
}

fn add_member(record: &mut GroupRecord, user_id: UserId) -> Result<(), AppError> {
    if record.members.contains(&user_id) {
        return Ok(());
    }
    if record.members.len() as i32 >= record.group.max_members {
        return Err(conflict("Group is full"));
    }
    record.members.push(user_id);
    record.group.member_count = record.members.len() as i32;
    Ok(())
}

fn apply_task_request(task: &mut Task, request: &TaskRequest) {
    let status = request.status.unwrap_or(task.status);
    if status != task.status {
        task.last_status_change_at = Some(now());
    }
    task.title = request.title.clone();
    task.description = request.description.clone();
    task.due_date = request.due_date;
    task.priority = request.priority;
    task.status = status;
    task.category = request.category.clone();
    task.tags = request.tags.clone();
    task.assignee_ids = request.assignee_ids.clone();
    task.updated_at = now();
}

#[async_trait]
impl StudyConnectApi for InMemoryApi {
    async fn list_public_groups(&self) -> Result<Vec<Group>, AppError> {
        let state = self.record(Endpoint::PublicGroups)?;
        Ok(state
            .groups
            .values()
            .filter(|record| record.group.is_public)
            .map(|record| record.group.clone())
            .collect())
    }

    async fn search_groups(&self, query: &str) -> Result<Vec<Group>, AppError> {
        let state = self.record(Endpoint::SearchGroups {
            query: query.to_string(),
        })?;
        let needle = query.to_lowercase();
        Ok(state
            .groups
            .values()
            .filter(|record| record.group.is_public)
            .filter(|record| {
                record.group.name.to_lowercase().contains(&needle)
                    || record
                        .group
                        .description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .map(|record| record.group.clone())
            .collect())
    }

    async fn create_group(&self, request: &CreateGroupRequest) -> Result<Group, AppError> {
        let mut state = self.record(Endpoint::CreateGroup)?;
        let id = GroupId::new(state.next_id());
        let group = Group {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            is_public: request.is_public,
            max_members: request.max_members,
            member_count: request.member_ids.len() as i32,
            invite_code: format!("SC-{:04}", id.value()),
            created_by_id: Some(request.created_by_id),
            created_at: Some(now()),
            last_updated_at: Some(now()),
        };
        state.groups.insert(
            id,
            GroupRecord {
                group: group.clone(),
                members: request.member_ids.clone(),
                admins: request.admin_ids.clone(),
            },
        );
        Ok(group)
    }

    async fn get_group(&self, group_id: GroupId) -> Result<Group, AppError> {
        let mut state = self.record(Endpoint::Group(group_id))?;
        Ok(state.group_mut(group_id)?.group.clone())
    }

    async fn update_group(
        &self,
        group_id: GroupId,
        request: &UpdateGroupRequest,
    ) -> Result<Group, AppError> {
        let mut state = self.record(Endpoint::UpdateGroup(group_id))?;
        let record = state.group_mut(group_id)?;
        if let Some(name) = &request.name {
            record.group.name = name.clone();
        }
        if request.description.is_some() {
            record.group.description = request.description.clone();
        }
        if let Some(is_public) = request.is_public {
            record.group.is_public = is_public;
        }
        if let Some(max_members) = request.max_members {
            record.group.max_members = max_members;
        }
        if let Some(members) = &request.member_ids {
            record.members = members.clone();
        }
        if let Some(admins) = &request.admin_ids {
            record.admins = admins.clone();
        }
        record.group.member_count = record.members.len() as i32;
        record.group.last_updated_at = Some(now());
        Ok(record.group.clone())
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<(), AppError> {
        let mut state = self.record(Endpoint::DeleteGroup(group_id))?;
        state
            .groups
            .remove(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("Group {group_id} not found")))?;
        state.tasks.retain(|_, task| task.group_id != Some(group_id));
        Ok(())
    }

    async fn group_members(&self, group_id: GroupId) -> Result<Vec<User>, AppError> {
        let mut state = self.record(Endpoint::GroupMembers(group_id))?;
        let members = state.group_mut(group_id)?.members.clone();
        Ok(state.users_for(&members))
    }

    async fn group_admins(&self, group_id: GroupId) -> Result<Vec<User>, AppError> {
        let mut state = self.record(Endpoint::GroupAdmins(group_id))?;
        let admins = state.group_mut(group_id)?.admins.clone();
        Ok(state.users_for(&admins))
    }

    async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        let mut state = self.record(Endpoint::RemoveMember(group_id, user_id))?;
        let record = state.group_mut(group_id)?;
        if !record.members.contains(&user_id) {
            return Err(AppError::NotFound(format!(
                "User {user_id} is not a member of group {group_id}"
            )));
        }
        record.members.retain(|id| *id != user_id);
        record.admins.retain(|id| *id != user_id);
        record.group.member_count = record.members.len() as i32;
        Ok(())
    }

    async fn remove_admin(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        let mut state = self.record(Endpoint::RemoveAdmin(group_id, user_id))?;
        state.group_mut(group_id)?.admins.retain(|id| *id != user_id);
        Ok(())
    }

    async fn join_group(&self, group_id: GroupId, user_id: UserId) -> Result<(), AppError> {
        let mut state = self.record(Endpoint::JoinGroup(group_id, user_id))?;
        let record = state.group_mut(group_id)?;
        if !record.group.is_public {
            return Err(AppError::Forbidden("This group is private".to_string()));
        }
        add_member(record, user_id)
    }

    async fn join_by_invite_code(&self, code: &str, user_id: UserId) -> Result<(), AppError> {
        let mut state = self.record(Endpoint::JoinByInviteCode {
            code: code.to_string(),
            user_id,
        })?;
        let record = state
            .groups
            .values_mut()
            .find(|record| record.group.invite_code == code)
            .ok_or_else(|| AppError::NotFound("Invalid invite code".to_string()))?;
        add_member(record, user_id)
    }

    async fn groups_for_user(&self, user_id: UserId) -> Result<Vec<Group>, AppError> {
        let state = self.record(Endpoint::Membership(user_id))?;
        Ok(state
            .groups
            .values()
            .filter(|record| record.members.contains(&user_id))
            .map(|record| record.group.clone())
            .collect())
    }

    async fn tasks_for_group(&self, group_id: GroupId) -> Result<Vec<Task>, AppError> {
        let mut state = self.record(Endpoint::GroupTasks(group_id))?;
        state.group_mut(group_id)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn create_task(
        &self,
        group_id: GroupId,
        request: &TaskRequest,
    ) -> Result<Task, AppError> {
        let mut state = self.record(Endpoint::CreateTask(group_id))?;
        state.group_mut(group_id)?;
        let mut task = Task {
            id: TaskId::new(state.next_id()),
            title: String::new(),
            description: None,
            due_date: None,
            priority: request.priority,
            status: request.status.unwrap_or_default(),
            category: None,
            tags: Vec::new(),
            created_by_id: request.created_by_id,
            assignee_ids: Vec::new(),
            created_at: now(),
            updated_at: now(),
            last_status_change_at: None,
            group_id: Some(group_id),
        };
        apply_task_request(&mut task, request);
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, task_id: TaskId, request: &TaskRequest) -> Result<Task, AppError> {
        let mut state = self.record(Endpoint::UpdateTask(task_id))?;
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))?;
        apply_task_request(task, request);
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: TaskId) -> Result<(), AppError> {
        let mut state = self.record(Endpoint::DeleteTask(task_id))?;
        state
            .tasks
            .remove(&task_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))
    }

    async fn tasks_for_user(&self, user_id: UserId) -> Result<Vec<Task>, AppError> {
        let state = self.record(Endpoint::UserTasks(user_id))?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.is_assigned_to(user_id))
            .cloned()
            .collect())
    }

    async fn create_user(&self, request: &UserCreateRequest) -> Result<User, AppError> {
        let mut state = self.record(Endpoint::CreateUser)?;
        if state
            .users
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(&request.email))
        {
            return Err(conflict("Email is already registered"));
        }
        let user = User {
            id: UserId::new(state.next_id()),
            email: request.email.clone(),
            firstname: request.firstname.clone(),
            lastname: request.lastname.clone(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let state = self.record(Endpoint::Users)?;
        Ok(state.users.values().cloned().collect())
    }

    async fn current_user(&self) -> Result<User, AppError> {
        let state = self.record(Endpoint::CurrentUser)?;
        state
            .current_user
            .and_then(|id| state.users.get(&id).cloned())
            .ok_or_else(|| AppError::Unauthorized("No user signed in".to_string()))
    }

    async fn get_user(&self, user_id: UserId) -> Result<User, AppError> {
        let state = self.record(Endpoint::User(user_id))?;
        state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
    }

    async fn update_user(
        &self,
        user_id: UserId,
        request: &UserUpdateRequest,
    ) -> Result<User, AppError> {
        let mut state = self.record(Endpoint::UpdateUser(user_id))?;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
        user.email = request.email.clone();
        user.firstname = request.firstname.clone();
        user.lastname = request.lastname.clone();
        Ok(user.clone())
    }
}
