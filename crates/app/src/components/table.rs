//! 汎用データテーブル
//!
//! 行は `Serialize` できる任意の型。列IDは行のフィールド名と一致させる。
//! 並び替えは列IDに対応するフィールド値で行う。

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use tracing::warn;

/// 操作列のID
pub const ACTIONS_COLUMN_ID: &str = "actions";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 25, 50, 100];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub id: String,
    pub label: String,
    pub is_invisible: bool,
    pub is_unsortable: bool,
}

impl TableColumn {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_invisible: false,
            is_unsortable: false,
        }
    }

    pub fn invisible(mut self) -> Self {
        self.is_invisible = true;
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.is_unsortable = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Primary,
    Accent,
    Warn,
    Default,
}

type ShowCondition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// 行ごとの操作ボタン
pub struct TableActionButton<T> {
    pub id: String,
    pub label: String,
    pub color: ButtonColor,
    pub disabled: bool,
    show_condition: Option<ShowCondition<T>>,
}

impl<T> TableActionButton<T> {
    pub fn new(id: impl Into<String>, label: impl Into<String>, color: ButtonColor) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color,
            disabled: false,
            show_condition: None,
        }
    }

    pub fn show_when(mut self, condition: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.show_condition = Some(Box::new(condition));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_shown_for(&self, row: &T) -> bool {
        self.show_condition
            .as_ref()
            .map(|condition| condition(row))
            .unwrap_or(true)
    }
}

impl<T> std::fmt::Debug for TableActionButton<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableActionButton")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("color", &self.color)
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug)]
pub struct DataTable<T> {
    rows: Vec<T>,
    columns: Vec<TableColumn>,
    actions: Vec<TableActionButton<T>>,
    page_size: usize,
    page_size_options: Vec<usize>,
    sort: Option<(String, SortDirection)>,
    selected: Option<usize>,
}

impl<T: Serialize> DataTable<T> {
    pub fn new(columns: Vec<TableColumn>) -> Self {
        Self {
            rows: Vec::new(),
            columns,
            actions: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            sort: None,
            selected: None,
        }
    }

    pub fn with_actions(mut self, actions: Vec<TableActionButton<T>>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.selected = None;
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 操作ボタンがあれば操作列を末尾に加えた列定義
    pub fn columns(&self) -> Vec<TableColumn> {
        let mut columns = self.columns.clone();
        if !self.actions.is_empty() {
            columns.push(TableColumn::new(ACTIONS_COLUMN_ID, "Actions").unsortable());
        }
        columns
    }

    /// 表示する列のID（非表示列を除く）
    pub fn displayed_column_ids(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .filter(|column| !column.is_invisible)
            .map(|column| column.id)
            .collect()
    }

    /// 並び替えを設定する。並び替え不可の列や未知の列なら false
    pub fn sort_by(&mut self, column_id: &str, direction: SortDirection) -> bool {
        let sortable = self
            .columns
            .iter()
            .any(|column| column.id == column_id && !column.is_unsortable);
        if !sortable {
            warn!("並び替えできない列です: column={}", column_id);
            return false;
        }
        self.sort = Some((column_id.to_string(), direction));
        true
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// 並び替え済みの行
    pub fn sorted_rows(&self) -> Vec<&T> {
        let mut rows: Vec<&T> = self.rows.iter().collect();
        if let Some((column_id, direction)) = &self.sort {
            let mut keyed: Vec<(Value, &T)> = rows
                .into_iter()
                .map(|row| (cell_value(row, column_id), row))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| {
                let ordering = compare_values(a, b);
                match direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
            rows = keyed.into_iter().map(|(_, row)| row).collect();
        }
        rows
    }

    /// 0始まりのページ番号で行を取り出す
    pub fn page(&self, index: usize) -> Vec<&T> {
        self.sorted_rows()
            .into_iter()
            .skip(index * self.page_size)
            .take(self.page_size)
            .collect()
    }

    /// 現在のページサイズを必ず含む選択肢
    pub fn page_size_options(&self) -> Vec<usize> {
        let mut options = self.page_size_options.clone();
        if !options.contains(&self.page_size) {
            options.push(self.page_size);
            options.sort_unstable();
        }
        options
    }

    /// ページ表示ラベル（例: `11 - 20 von 42`）
    pub fn range_label(&self, page: usize) -> String {
        let length = self.rows.len();
        if length == 0 {
            return format!("0 von {length}");
        }
        let start = page * self.page_size + 1;
        let end = ((page + 1) * self.page_size).min(length);
        format!("{start} - {end} von {length}")
    }

    /// 行に表示する操作ボタン
    pub fn visible_actions(&self, row: &T) -> Vec<&TableActionButton<T>> {
        self.actions
            .iter()
            .filter(|action| action.is_shown_for(row))
            .collect()
    }

    /// 行の選択を切り替える。同じ行なら選択解除して None
    pub fn toggle_row(&mut self, index: usize) -> Option<&T> {
        if self.selected == Some(index) || index >= self.rows.len() {
            self.selected = None;
            return None;
        }
        self.selected = Some(index);
        self.rows.get(index)
    }

    pub fn selected_row(&self) -> Option<&T> {
        self.selected.and_then(|index| self.rows.get(index))
    }
}

fn cell_value<T: Serialize>(row: &T, column_id: &str) -> Value {
    match serde_json::to_value(row) {
        Ok(Value::Object(map)) => map.get(column_id).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// 数値は数値として、それ以外は文字列として比較する。値なしは先頭
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Row {
        name: String,
        members: i32,
        description: Option<String>,
    }

    fn row(name: &str, members: i32) -> Row {
        Row {
            name: name.to_string(),
            members,
            description: None,
        }
    }

    fn table() -> DataTable<Row> {
        let mut table = DataTable::new(vec![
            TableColumn::new("name", "Group"),
            TableColumn::new("description", "Description").unsortable(),
            TableColumn::new("members", "Members"),
            TableColumn::new("id", "Id").invisible(),
        ]);
        table.set_rows(vec![row("Beta", 12), row("Alpha", 3), row("Gamma", 7)]);
        table
    }

    #[test]
    fn test_displayed_columns_hide_invisible_and_add_actions() {
        let table = table().with_actions(vec![TableActionButton::new(
            "view",
            "View group",
            ButtonColor::Primary,
        )]);
        assert_eq!(
            table.displayed_column_ids(),
            vec!["name", "description", "members", "actions"]
        );
        assert!(table.columns().last().unwrap().is_unsortable);
    }

    #[test]
    fn test_sorting_numbers_and_strings() {
        let mut table = table();
        assert!(table.sort_by("members", SortDirection::Desc));
        let names: Vec<&str> = table.sorted_rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Gamma", "Alpha"]);

        assert!(table.sort_by("name", SortDirection::Asc));
        assert_eq!(table.page(0)[0].name, "Alpha");
    }

    #[test]
    fn test_unsortable_column_is_rejected() {
        let mut table = table();
        assert!(!table.sort_by("description", SortDirection::Asc));
        assert!(!table.sort_by("unknown", SortDirection::Asc));
        assert_eq!(table.sorted_rows()[0].name, "Beta");
    }

    #[test]
    fn test_action_show_condition() {
        let table = table().with_actions(vec![
            TableActionButton::new("view", "View", ButtonColor::Primary),
            TableActionButton::new("join", "Join", ButtonColor::Accent)
                .show_when(|row: &Row| row.members < 10),
        ]);
        let big = row("Big", 12);
        let small = row("Small", 2);
        assert_eq!(table.visible_actions(&big).len(), 1);
        assert_eq!(table.visible_actions(&small).len(), 2);
    }

    #[test]
    fn test_paging_and_labels() {
        let mut table = DataTable::new(vec![TableColumn::new("name", "Group")]).with_page_size(2);
        assert_eq!(table.range_label(0), "0 von 0");
        table.set_rows(vec![row("a", 1), row("b", 2), row("c", 3)]);
        assert_eq!(table.page(1).len(), 1);
        assert_eq!(table.range_label(1), "3 - 3 von 3");
        assert_eq!(table.page_size_options(), vec![2, 5, 10, 25, 50, 100]);
    }

    #[test]
    fn test_toggle_row_selection() {
        let mut table = table();
        assert_eq!(table.toggle_row(1).map(|r| r.name.clone()), Some("Alpha".to_string()));
        assert_eq!(table.selected_row().map(|r| r.members), Some(3));
        assert!(table.toggle_row(1).is_none());
        assert!(table.selected_row().is_none());
    }
}
