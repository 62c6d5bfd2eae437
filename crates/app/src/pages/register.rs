use crate::context::AppContext;
use domain::{RegistrationForm, ValidationErrors};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Default)]
struct RegisterState {
    form: RegistrationForm,
    field_errors: ValidationErrors,
    error_message: String,
    is_loading: bool,
}

/// 新規ユーザー登録画面
pub struct RegisterPage {
    ctx: AppContext,
    state: Mutex<RegisterState>,
}

impl RegisterPage {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(RegisterState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, RegisterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_form(&self, form: RegistrationForm) {
        let mut state = self.state();
        state.field_errors = form.validate().err().unwrap_or_default();
        state.form = form;
    }

    pub fn is_valid(&self) -> bool {
        self.state().form.is_valid()
    }

    pub fn field_errors(&self) -> ValidationErrors {
        self.state().field_errors.clone()
    }

    pub fn error_message(&self) -> String {
        self.state().error_message.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    /// 入力が有効な場合のみ登録し、成功したらログインへ進む
    pub async fn submit(&self) -> bool {
        let request = {
            let mut state = self.state();
            if state.is_loading {
                return false;
            }
            match state.form.to_request() {
                Ok(request) => {
                    state.is_loading = true;
                    state.error_message.clear();
                    request
                }
                Err(errors) => {
                    warn!("登録フォームが不正: {}", errors);
                    state.field_errors = errors;
                    return false;
                }
            }
        };

        let result = self.ctx.users.create_user(&request).await;
        {
            let mut state = self.state();
            state.is_loading = false;
            if let Err(e) = &result {
                error!("ユーザー登録に失敗: {}", e);
                state.error_message = e
                    .api_message()
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or(REGISTRATION_FAILED)
                    .to_string();
            }
        }
        if result.is_err() {
            return false;
        }

        info!("登録完了のためログインへ: email={}", request.email);
        self.handle_login().await;
        true
    }

    pub async fn handle_login(&self) {
        if let Err(e) = self.ctx.auth.login(None).await {
            error!("ログイン画面への遷移に失敗: {}", e);
        }
    }
}
