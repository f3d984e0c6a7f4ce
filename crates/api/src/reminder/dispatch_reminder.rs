use crate::{error::NotifierError, shared::usecase::UseCase};
use actix_web::rt::time::{sleep, timeout};
use reminder_notifier_domain::{NotificationRecord, Reminder, User, ID};
use reminder_notifier_infra::{NotifierContext, PushError, PushMessage, PushReceipt};
use std::{collections::HashMap, time::Duration};
use tracing::{error, warn};

const DEFAULT_TITLE: &str = "Notification";
const DEFAULT_BODY: &str = "You have a reminder!";
const DEFAULT_RECURRING_BODY: &str = "You have a recurring reminder!";

/// Sends the push notification of a due `Reminder` to the device of its owner
/// and records it as a `NotificationRecord`
#[derive(Debug)]
pub struct DispatchReminderUseCase<'a> {
    pub reminder: &'a Reminder,
    /// When the `Reminder` is scheduled, shown in the `NotificationRecord`
    pub occasion: String,
}

#[derive(Debug)]
pub struct Delivered {
    pub provider_response: String,
    /// `None` if the push was sent but the `NotificationRecord` could not be stored
    pub notification_id: Option<ID>,
}

fn render_message(reminder: &Reminder, user: &User, token: String) -> PushMessage {
    let title = if reminder.title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        reminder.title.clone()
    };
    let body = match (reminder.description.is_empty(), reminder.is_recurring) {
        (false, _) => reminder.description.clone(),
        (true, false) => DEFAULT_BODY.to_string(),
        (true, true) => DEFAULT_RECURRING_BODY.to_string(),
    };

    let mut data = HashMap::new();
    data.insert("type".to_string(), "reminder".to_string());
    data.insert("reminder_id".to_string(), reminder.id.as_string());
    data.insert(
        "user_email".to_string(),
        user.email.clone().unwrap_or_default(),
    );

    PushMessage {
        token,
        title,
        body,
        data,
    }
}

/// `base` doubled for every previous retry, saturating instead of overflowing
fn retry_backoff(base: Duration, retries: usize) -> Duration {
    let factor = u32::try_from(retries)
        .ok()
        .and_then(|retries| 2u32.checked_pow(retries))
        .unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Sends the message, retrying transient failures with exponential backoff
async fn send_with_retries(
    message: &PushMessage,
    ctx: &NotifierContext,
) -> Result<PushReceipt, PushError> {
    // Token acquisition and the push call are each bounded by the request timeout
    let attempt_timeout = ctx.config.request_timeout * 2;
    let mut retries = 0;
    loop {
        let res = match timeout(attempt_timeout, ctx.push.send(message)).await {
            Ok(res) => res,
            Err(_) => Err(PushError::Transient(format!(
                "Push attempt timed out after {:?}",
                attempt_timeout
            ))),
        };
        match res {
            Err(e) if e.is_transient() && retries < ctx.config.dispatch_max_retries => {
                let backoff = retry_backoff(ctx.config.dispatch_retry_backoff, retries);
                warn!(
                    "Retrying push in {:?} after transient failure: {}",
                    backoff, e
                );
                sleep(backoff).await;
                retries += 1;
            }
            res => return res,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<'a> UseCase for DispatchReminderUseCase<'a> {
    type Response = Delivered;

    type Error = NotifierError;

    const NAME: &'static str = "DispatchReminder";

    async fn execute(&mut self, ctx: &NotifierContext) -> Result<Self::Response, Self::Error> {
        let user = ctx
            .repos
            .users
            .find(&self.reminder.user_id)
            .await
            .map_err(|e| NotifierError::RepositoryUnavailable(e.to_string()))?
            .ok_or_else(|| NotifierError::UserNotFound(self.reminder.user_id.clone()))?;

        let token = match &user.push_token {
            Some(token) if !token.is_empty() => token.clone(),
            _ => return Err(NotifierError::TokenMissing(user.id.clone())),
        };

        let message = render_message(self.reminder, &user, token);
        let receipt = send_with_retries(&message, ctx).await?;

        let record = NotificationRecord::reminder_due(
            self.reminder,
            &self.occasion,
            ctx.sys.get_timestamp_millis(),
        );
        let notification_id = match ctx.repos.notifications.insert(&record).await {
            Ok(_) => Some(record.id),
            Err(e) => {
                error!(
                    "Notification for reminder {} was sent but could not be stored. Err: {:?}",
                    self.reminder.id, e
                );
                None
            }
        };

        Ok(Delivered {
            provider_response: receipt.provider_response,
            notification_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use reminder_notifier_domain::RecurrencePattern;
    use reminder_notifier_infra::InMemoryPushGateway;
    use std::sync::Arc;

    struct TestContext {
        ctx: NotifierContext,
        push: Arc<InMemoryPushGateway>,
    }

    async fn setup(push_token: Option<&str>) -> (TestContext, User) {
        let push = Arc::new(InMemoryPushGateway::new());
        let mut ctx = NotifierContext::create_inmemory();
        ctx.push = push.clone();
        ctx.config.dispatch_max_retries = 2;
        ctx.config.dispatch_retry_backoff = Duration::from_millis(0);

        let mut user = User::new();
        user.email = Some("user@example.com".into());
        user.push_token = push_token.map(String::from);
        ctx.repos.users.insert(&user).await.unwrap();

        (TestContext { ctx, push }, user)
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        let base = Duration::from_millis(500);
        assert_eq!(retry_backoff(base, 0), Duration::from_millis(500));
        assert_eq!(retry_backoff(base, 1), Duration::from_millis(1000));
        assert_eq!(retry_backoff(base, 3), Duration::from_millis(4000));
        assert_eq!(retry_backoff(base, 32), base.saturating_mul(u32::MAX));
        assert_eq!(retry_backoff(base, usize::MAX), base.saturating_mul(u32::MAX));
        assert_eq!(retry_backoff(Duration::MAX, 1), Duration::MAX);
    }

    #[actix_web::test]
    async fn sends_push_and_records_notification() {
        let (test_ctx, user) = setup(Some("tok123")).await;
        let mut reminder = Reminder::new(user.id.clone(), 0);
        reminder.title = "Dentist".into();
        reminder.description = "Bring the insurance card".into();

        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: "00:00:00 - 01/01/1970".into(),
        };
        let res = execute(usecase, &test_ctx.ctx).await.expect("To deliver");
        assert!(res.notification_id.is_some());

        let sent = test_ctx.push.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "tok123");
        assert_eq!(sent[0].title, "Dentist");
        assert_eq!(sent[0].body, "Bring the insurance card");
        assert_eq!(sent[0].data["type"], "reminder");
        assert_eq!(sent[0].data["reminder_id"], reminder.id.as_string());
        assert_eq!(sent[0].data["user_email"], "user@example.com");

        let records = test_ctx
            .ctx
            .repos
            .notifications
            .find_by_user(&user.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reference_id, reminder.id);
        assert_eq!(records[0].title, r#"{"time":"00:00:00 - 01/01/1970","description":"Bring the insurance card"}"#);
    }

    #[actix_web::test]
    async fn falls_back_to_default_texts() {
        let (test_ctx, user) = setup(Some("tok123")).await;
        let reminder = Reminder::new(user.id.clone(), 0);
        let recurring = Reminder::recurring(user.id.clone(), 0, RecurrencePattern::Daily);

        for r in [&reminder, &recurring] {
            let usecase = DispatchReminderUseCase {
                reminder: r,
                occasion: String::new(),
            };
            assert!(execute(usecase, &test_ctx.ctx).await.is_ok());
        }

        let sent = test_ctx.push.sent_messages();
        assert_eq!(sent[0].title, "Notification");
        assert_eq!(sent[0].body, "You have a reminder!");
        assert_eq!(sent[1].title, "Notification");
        assert_eq!(sent[1].body, "You have a recurring reminder!");
    }

    #[actix_web::test]
    async fn skips_users_without_token() {
        let (test_ctx, user) = setup(None).await;
        let reminder = Reminder::new(user.id.clone(), 0);
        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: String::new(),
        };
        let res = execute(usecase, &test_ctx.ctx).await;
        assert_eq!(res.unwrap_err(), NotifierError::TokenMissing(user.id.clone()));

        let reminder = Reminder::new(ID::default(), 0);
        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: String::new(),
        };
        let res = execute(usecase, &test_ctx.ctx).await;
        assert_eq!(
            res.unwrap_err(),
            NotifierError::UserNotFound(reminder.user_id.clone())
        );
        assert!(test_ctx.push.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn retries_transient_failures() {
        let (test_ctx, user) = setup(Some("tok123")).await;
        let reminder = Reminder::new(user.id.clone(), 0);

        test_ctx.push.fail_next(PushError::Transient("503".into()));
        test_ctx
            .push
            .fail_next(PushError::AuthAcquisitionFailed("timeout".into()));
        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: String::new(),
        };
        assert!(execute(usecase, &test_ctx.ctx).await.is_ok());
        assert_eq!(test_ctx.push.sent_messages().len(), 1);

        // Three transient failures exhaust the two retries
        for _ in 0..3 {
            test_ctx.push.fail_next(PushError::Transient("503".into()));
        }
        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: String::new(),
        };
        let res = execute(usecase, &test_ctx.ctx).await;
        assert_eq!(res.unwrap_err(), NotifierError::Transient("503".into()));
        assert_eq!(test_ctx.push.sent_messages().len(), 1);
    }

    #[actix_web::test]
    async fn does_not_retry_permanent_failures() {
        let (test_ctx, user) = setup(Some("tok123")).await;
        let reminder = Reminder::new(user.id.clone(), 0);

        test_ctx
            .push
            .fail_next(PushError::Permanent("UNREGISTERED".into()));
        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: String::new(),
        };
        let res = execute(usecase, &test_ctx.ctx).await;
        assert_eq!(
            res.unwrap_err(),
            NotifierError::Permanent("UNREGISTERED".into())
        );

        // The failure was consumed by the first attempt only
        let usecase = DispatchReminderUseCase {
            reminder: &reminder,
            occasion: String::new(),
        };
        assert!(execute(usecase, &test_ctx.ctx).await.is_ok());
    }
}
