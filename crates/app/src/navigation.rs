use std::sync::Mutex;
use tracing::info;

/// 画面遷移の要求先
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// 遷移要求を記録するナビゲーター
#[derive(Debug, Default)]
pub struct NavigationHistory {
    entries: Mutex<Vec<String>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.entries().pop()
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&self, path: &str) {
        info!("画面遷移: path={}", path);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(path.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_records_in_order() {
        let history = NavigationHistory::new();
        assert_eq!(history.last(), None);

        history.navigate("/groups");
        history.navigate("/groups/4");
        assert_eq!(history.entries(), vec!["/groups", "/groups/4"]);
        assert_eq!(history.last().as_deref(), Some("/groups/4"));
    }
}
