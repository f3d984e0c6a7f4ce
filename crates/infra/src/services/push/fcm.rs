use super::{
    auth_provider::{GoogleServiceAccountAuthProvider, IAccessTokenProvider, ServiceAccountKey},
    IPushGateway, PushError, PushMessage, PushReceipt,
};
use crate::system::ISys;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{error, info};

// https://firebase.google.com/docs/reference/fcm/rest/v1/projects.messages/send

const FCM_API_BASE: &str = "https://fcm.googleapis.com/v1/projects";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: Message<'a>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    token: &'a str,
    notification: Notification<'a>,
    data: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

/// Push gateway for the Firebase Cloud Messaging HTTP v1 api
pub struct FcmPushGateway {
    client: Client,
    project_id: String,
    auth: Arc<dyn IAccessTokenProvider>,
}

impl FcmPushGateway {
    pub fn new(key: ServiceAccountKey, timeout: Duration, sys: Arc<dyn ISys>) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let project_id = key.project_id.clone();
        let auth = GoogleServiceAccountAuthProvider::new(key, client.clone(), sys);
        Ok(Self {
            client,
            project_id,
            auth: Arc::new(auth),
        })
    }

    fn send_url(&self) -> String {
        format!("{}/{}/messages:send", FCM_API_BASE, self.project_id)
    }
}

/// Maps an unsuccessful FCM response to a `PushError`
fn classify_response(status: StatusCode, body: &str) -> PushError {
    let message = format!("{}: {}", status, body);
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::REQUEST_TIMEOUT
    {
        PushError::Transient(message)
    } else {
        PushError::Permanent(message)
    }
}

fn classify_request_error(e: reqwest::Error) -> PushError {
    if e.is_builder() {
        PushError::Permanent(e.to_string())
    } else {
        PushError::Transient(e.to_string())
    }
}

#[async_trait::async_trait]
impl IPushGateway for FcmPushGateway {
    async fn send(&self, message: &PushMessage) -> Result<PushReceipt, PushError> {
        let access_token = self.auth.get_access_token().await?;

        let body = SendRequest {
            message: Message {
                token: &message.token,
                notification: Notification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
            },
        };

        let res = self
            .client
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = res.status();
        let response_body = res.text().await.map_err(classify_request_error)?;
        if status.is_success() {
            info!("[FCM] Sent notification: {}", message.title);
            return Ok(PushReceipt {
                provider_response: response_body,
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            self.auth.invalidate().await;
        }
        error!("[FCM] Unable to send notification: {} {}", status, response_body);
        Err(classify_response(status, &response_body))
    }
}
