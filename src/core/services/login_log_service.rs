use chrono::Utc;

use crate::core::errors::Result;
use crate::core::models::filter::{LoginFilter, Page, TimeWindow};
use crate::core::models::login_event::{LoginEvent, NewLoginEvent};
use crate::core::models::summary::LoginSummary;
use crate::core::traits::login_log::LoginLogStore;

/// Write, read and summarize login attempts through a `LoginLogStore`.
pub struct LoginLogService<S: LoginLogStore> {
    pub store: S,
}

impl<S: LoginLogStore> LoginLogService<S> {
    /// Persist one attempt, stamping it with the current time if needed.
    pub fn record(&self, event: NewLoginEvent) -> Result<LoginEvent> {
        let event = event.into_event(Utc::now().timestamp());
        self.store.insert_login(&event)?;
        tracing::debug!(
            id = %event.id,
            status = %event.status,
            login_type = %event.login_type,
            "login event recorded"
        );
        Ok(event)
    }

    pub fn list(&self, filter: &LoginFilter, page: Page) -> Result<Vec<LoginEvent>> {
        self.store.list_logins(filter, page)
    }

    pub fn count(&self, filter: &LoginFilter) -> Result<u64> {
        self.store.count_logins(filter)
    }

    pub fn list_for_user(&self, user_id: &str, page: Page) -> Result<Vec<LoginEvent>> {
        self.store.list_logins(&LoginFilter::for_user(user_id), page)
    }

    pub fn list_failed(&self, page: Page) -> Result<Vec<LoginEvent>> {
        self.store.list_logins(&LoginFilter::failed(), page)
    }

    pub fn summarize(&self, window: TimeWindow) -> Result<LoginSummary> {
        self.store.summarize_logins(window)
    }
}
