use crate::core::errors::Result;
use crate::core::models::filter::{LoginFilter, Page, TimeWindow};
use crate::core::models::login_event::LoginEvent;
use crate::core::models::summary::LoginSummary;

/// Port for persisting and querying login attempts. Same contract as
/// `OperationLogStore`, over the login relation.
pub trait LoginLogStore: Send + Sync {
    fn insert_login(&self, event: &LoginEvent) -> Result<()>;

    fn list_logins(&self, filter: &LoginFilter, page: Page) -> Result<Vec<LoginEvent>>;

    fn count_logins(&self, filter: &LoginFilter) -> Result<u64>;

    fn summarize_logins(&self, window: TimeWindow) -> Result<LoginSummary>;
}

impl<T: LoginLogStore + ?Sized> LoginLogStore for &T {
    fn insert_login(&self, event: &LoginEvent) -> Result<()> {
        (**self).insert_login(event)
    }

    fn list_logins(&self, filter: &LoginFilter, page: Page) -> Result<Vec<LoginEvent>> {
        (**self).list_logins(filter, page)
    }

    fn count_logins(&self, filter: &LoginFilter) -> Result<u64> {
        (**self).count_logins(filter)
    }

    fn summarize_logins(&self, window: TimeWindow) -> Result<LoginSummary> {
        (**self).summarize_logins(window)
    }
}
