//! 設定から組み立てる動的フォーム

use domain::{is_valid_email, AutocompleteOption, UserId, ValidationErrors};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};

/// フォームの入力値（フィールド名 → 値）
pub type FormValues = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Radio,
    Select,
    Number,
    Checkbox,
    Date,
    Email,
    Tel,
    Search,
    Table,
    Textarea,
    Autocomplete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default_value: Option<Value>,
    pub options: Vec<FieldOption>,
    pub placeholder: Option<String>,
    pub tooltip: Option<String>,
    /// 編集モードで変更できるか
    pub editable: bool,
    /// 入力に応じて選択肢を絞り込むか
    pub filterable: bool,
    /// 値の変更を画面へ通知するか
    pub emit_changes: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            default_value: None,
            options: Vec::new(),
            placeholder: None,
            tooltip: None,
            editable: true,
            filterable: false,
            emit_changes: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn emit_changes(mut self) -> Self {
        self.emit_changes = true;
        self
    }

    /// 入力ラベルで選択肢を絞り込む（大文字小文字を区別しない）
    pub fn filter_options(&self, query: &str) -> Vec<FieldOption> {
        if !self.filterable {
            return self.options.clone();
        }
        let query = query.to_lowercase();
        self.options
            .iter()
            .filter(|option| option.label.to_lowercase().contains(&query))
            .cloned()
            .collect()
    }

    fn validate(&self, value: Option<&Value>, errors: &mut ValidationErrors) {
        let value = value.filter(|value| !is_blank(value));
        let Some(value) = value else {
            if self.required {
                errors.push(&self.name, format!("{} is required", self.label));
            }
            return;
        };

        match self.kind {
            FieldKind::Number => {
                if number_value(value).is_none() {
                    errors.push(&self.name, format!("{} must be a number", self.label));
                }
            }
            FieldKind::Email => {
                if !value.as_str().map(is_valid_email).unwrap_or(false) {
                    errors.push(&self.name, "Please provide a valid email address");
                }
            }
            FieldKind::Select | FieldKind::Radio => {
                if !self.options.is_empty() && !self.options.iter().any(|o| &o.value == value) {
                    errors.push(&self.name, format!("Please choose a valid {}", self.label));
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormConfig {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormConfig {
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// 既定値で初期化した入力値
    /// 選択式の既定値は選択肢に含まれる場合のみ採用する
    pub fn initial_values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in &self.fields {
            let default = match (&field.default_value, field.kind) {
                (Some(value), FieldKind::Select | FieldKind::Radio | FieldKind::Autocomplete)
                    if !field.options.is_empty() =>
                {
                    field
                        .options
                        .iter()
                        .find(|option| &option.value == value)
                        .map(|option| option.value.clone())
                }
                (value, _) => value.clone(),
            };
            values.insert(field.name.clone(), default.unwrap_or(Value::Null));
        }
        values
    }

    pub fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for field in &self.fields {
            field.validate(values.get(&field.name), &mut errors);
        }
        errors.into_result()
    }

    /// 編集モードで無効化するフィールド名
    pub fn disabled_fields(&self, edit_mode: bool) -> Vec<&str> {
        if !edit_mode {
            return Vec::new();
        }
        self.fields
            .iter()
            .filter(|field| !field.editable)
            .map(|field| field.name.as_str())
            .collect()
    }
}

/// グループ作成フォーム
pub static CREATE_GROUP_CONFIG: Lazy<FormConfig> = Lazy::new(|| FormConfig {
    title: Some("Create New Group".to_string()),
    subtitle: None,
    fields: vec![
        FormField::new("name", "Group Name", FieldKind::Text)
            .placeholder("Enter group name")
            .required(),
        FormField::new("description", "Description", FieldKind::Textarea)
            .placeholder("Enter group description"),
        FormField::new("is_public", "Visibility", FieldKind::Select)
            .placeholder("Visibility of the group")
            .required()
            .options(vec![
                FieldOption::new("Public", true),
                FieldOption::new("Private", false),
            ])
            .default_value(true),
        FormField::new("max_members", "Maximum Members", FieldKind::Number)
            .placeholder("Enter maximum number of members"),
        FormField::new("member_ids", "Members", FieldKind::Autocomplete)
            .placeholder("Add members to the group")
            .required()
            .filterable()
            .emit_changes(),
        FormField::new("admin_ids", "Admins", FieldKind::Autocomplete)
            .placeholder("Add admins to the group")
            .required()
            .filterable()
            .emit_changes(),
    ],
});

/// ユーザー選択肢をラベルで絞り込み、選択済みのユーザーを除く
pub fn filter_user_options(
    options: &[AutocompleteOption],
    query: &str,
    excluded: &[UserId],
) -> Vec<AutocompleteOption> {
    let query = query.to_lowercase();
    options
        .iter()
        .filter(|option| !excluded.contains(&option.value))
        .filter(|option| option.label.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(label: &str, id: i64) -> AutocompleteOption {
        AutocompleteOption {
            label: label.to_string(),
            value: UserId::new(id),
        }
    }

    #[test]
    fn test_create_group_config_initial_values() {
        let values = CREATE_GROUP_CONFIG.initial_values();
        assert_eq!(values["is_public"], json!(true));
        assert_eq!(values["name"], Value::Null);
        assert_eq!(CREATE_GROUP_CONFIG.fields.len(), 6);
    }

    #[test]
    fn test_create_group_config_validation() {
        let mut values = CREATE_GROUP_CONFIG.initial_values();
        let errors = CREATE_GROUP_CONFIG.validate(&values).unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("member_ids"));
        assert!(!errors.has("max_members"));

        values.insert("name".to_string(), json!("Algorithms"));
        values.insert("max_members".to_string(), json!("ten"));
        values.insert("member_ids".to_string(), json!([1]));
        values.insert("admin_ids".to_string(), json!([1]));
        let errors = CREATE_GROUP_CONFIG.validate(&values).unwrap_err();
        assert_eq!(errors.message_for("max_members"), Some("Maximum Members must be a number"));

        values.insert("max_members".to_string(), json!(8));
        assert!(CREATE_GROUP_CONFIG.validate(&values).is_ok());

        values.insert("is_public".to_string(), json!("maybe"));
        assert!(CREATE_GROUP_CONFIG.validate(&values).unwrap_err().has("is_public"));
    }

    #[test]
    fn test_filterable_options() {
        let field = FormField::new("tag", "Tag", FieldKind::Autocomplete)
            .options(vec![
                FieldOption::new("Exam", "exam"),
                FieldOption::new("Homework", "hw"),
            ])
            .filterable();
        assert_eq!(field.filter_options("EX").len(), 1);
        assert_eq!(field.filter_options("").len(), 2);
    }

    #[test]
    fn test_disabled_fields_in_edit_mode() {
        let config = FormConfig {
            title: None,
            subtitle: None,
            fields: vec![
                FormField::new("email", "Email", FieldKind::Email).read_only(),
                FormField::new("name", "Name", FieldKind::Text),
            ],
        };
        assert!(config.disabled_fields(false).is_empty());
        assert_eq!(config.disabled_fields(true), vec!["email"]);

        let mut values = config.initial_values();
        values.insert("email".to_string(), json!("not-an-email"));
        assert!(config.validate(&values).unwrap_err().has("email"));
    }

    #[test]
    fn test_filter_user_options_excludes_selected() {
        let options = vec![
            option("Anna Schmidt (anna@uni.de)", 1),
            option("Ben Weber (ben@uni.de)", 2),
            option("Clara Fischer (clara@uni.de)", 3),
        ];
        let filtered = filter_user_options(&options, "UNI.DE", &[UserId::new(2)]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filter_user_options(&options, "ann", &[])[0].value, UserId::new(1));
    }
}
