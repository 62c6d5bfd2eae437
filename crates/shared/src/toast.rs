//! プロセス全体で共有する通知キュー
//!
//! 追加順を保ち、変更のたびに購読者へ一覧全体を配信する。
//! 上限や重複排除はない。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};
use ulid::Ulid;

static GLOBAL_TOASTS: Lazy<ToastService> = Lazy::new(ToastService::new);

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// 通知の追加リクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRequest {
    pub message: String,
    pub kind: ToastKind,
    /// 強制指定でのみ閉じられる
    pub is_persistent: bool,
    /// 指定時間後に自動で閉じる
    pub duration: Option<Duration>,
}

impl ToastRequest {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            is_persistent: false,
            duration: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn persistent(mut self) -> Self {
        self.is_persistent = true;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// 表示中の通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: Ulid,
    pub message: String,
    pub kind: ToastKind,
    pub is_persistent: bool,
    #[serde(skip)]
    pub duration: Option<Duration>,
}

/// 追加した通知を閉じるためのハンドル
#[derive(Clone)]
pub struct ToastHandle {
    id: Ulid,
    service: ToastService,
}

impl ToastHandle {
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// 通知を閉じる。永続通知は `force` が true の場合のみ閉じる
    pub fn cancel(&self, force: bool) -> bool {
        self.service.remove_toast(self.id, force)
    }
}

#[derive(Clone)]
pub struct ToastService {
    toasts: Arc<watch::Sender<Vec<Toast>>>,
}

impl Default for ToastService {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastService {
    pub fn new() -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        Self {
            toasts: Arc::new(toasts),
        }
    }

    /// プロセス共有のインスタンス
    pub fn global() -> ToastService {
        GLOBAL_TOASTS.clone()
    }

    /// 通知を末尾に追加する
    pub fn add_toast(&self, request: ToastRequest) -> ToastHandle {
        let toast = Toast {
            id: Ulid::new(),
            message: request.message,
            kind: request.kind,
            is_persistent: request.is_persistent,
            duration: request.duration,
        };
        let id = toast.id;
        debug!("通知を追加: id={}, kind={:?}", id, toast.kind);
        self.toasts.send_modify(|toasts| toasts.push(toast));

        if let Some(duration) = request.duration {
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    let service = self.clone();
                    runtime.spawn(async move {
                        tokio::time::sleep(duration).await;
                        service.remove_toast(id, true);
                    });
                }
                Err(_) => warn!("ランタイム外のため自動クローズを設定できません: id={}", id),
            }
        }

        ToastHandle {
            id,
            service: self.clone(),
        }
    }

    /// 通知を取り除く。取り除いた場合は true
    pub fn remove_toast(&self, id: Ulid, force: bool) -> bool {
        self.toasts.send_if_modified(|toasts| {
            match toasts.iter().position(|toast| toast.id == id) {
                Some(index) if force || !toasts[index].is_persistent => {
                    toasts.remove(index);
                    true
                }
                _ => false,
            }
        })
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.toasts.subscribe()
    }

    pub fn has_errors(&self) -> bool {
        self.toasts
            .borrow()
            .iter()
            .any(|toast| toast.kind == ToastKind::Error)
    }

    pub fn clear(&self) {
        self.toasts.send_if_modified(|toasts| {
            let changed = !toasts.is_empty();
            toasts.clear();
            changed
        });
    }
}
