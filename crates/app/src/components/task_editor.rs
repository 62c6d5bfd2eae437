//! タスク作成ダイアログと編集画面で共有するフォーム状態

use domain::{add_tag, add_unique, member_label, tag_color, TaskForm, User, UserId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeCard {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEditor {
    pub form: TaskForm,
    members: Vec<User>,
}

impl TaskEditor {
    pub fn new(form: TaskForm, members: Vec<User>) -> Self {
        Self { form, members }
    }

    pub fn members(&self) -> &[User] {
        &self.members
    }

    pub fn add_assignee(&mut self, user_id: UserId) {
        add_unique(&mut self.form.assignee_ids, user_id);
    }

    pub fn remove_assignee(&mut self, user_id: UserId) {
        self.form.assignee_ids.retain(|id| *id != user_id);
    }

    /// タグを追加する。空や重複（大文字小文字無視）は false
    pub fn add_tag(&mut self, raw: &str) -> bool {
        add_tag(&mut self.form.tags, raw)
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.form.tags.retain(|existing| existing != tag);
    }

    /// 未割り当てのメンバーを名前・メールで絞り込む
    pub fn filtered_assignees(&self, query: &str) -> Vec<&User> {
        let query = query.trim().to_lowercase();
        self.members
            .iter()
            .filter(|member| !self.form.assignee_ids.contains(&member.id))
            .filter(|member| member.search_label().contains(&query))
            .collect()
    }

    pub fn assignee_cards(&self) -> Vec<AssigneeCard> {
        self.form
            .assignee_ids
            .iter()
            .map(|id| AssigneeCard {
                id: *id,
                name: member_label(&self.members, *id),
            })
            .collect()
    }

    pub fn tag_color(&self, tag: &str) -> String {
        tag_color(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, firstname: &str, email: &str) -> User {
        User {
            id: UserId::new(id),
            email: email.to_string(),
            firstname: firstname.to_string(),
            lastname: "Student".to_string(),
        }
    }

    fn editor() -> TaskEditor {
        TaskEditor::new(
            TaskForm::default(),
            vec![member(1, "Anna", "anna@uni.de"), member(2, "Ben", "ben@uni.de")],
        )
    }

    #[test]
    fn test_assignee_filter_excludes_assigned() {
        let mut editor = editor();
        assert_eq!(editor.filtered_assignees("UNI.DE").len(), 2);
        editor.add_assignee(UserId::new(1));
        editor.add_assignee(UserId::new(1));
        let remaining = editor.filtered_assignees("");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].firstname, "Ben");
        assert_eq!(editor.assignee_cards()[0].name, "Anna Student");

        editor.remove_assignee(UserId::new(1));
        assert!(editor.assignee_cards().is_empty());
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let mut editor = editor();
        assert!(editor.add_tag(" Exam "));
        assert!(!editor.add_tag("exam"));
        assert!(!editor.add_tag("   "));
        assert_eq!(editor.form.tags, vec!["Exam".to_string()]);
        assert_eq!(editor.tag_color("Exam"), tag_color("exam"));

        editor.remove_tag("Exam");
        assert!(editor.form.tags.is_empty());
    }

    #[test]
    fn test_unknown_assignee_label() {
        let mut editor = editor();
        editor.add_assignee(UserId::new(42));
        assert_eq!(editor.assignee_cards()[0].name, "User 42");
    }
}
