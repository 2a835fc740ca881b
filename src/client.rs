//! Panelist API HTTP client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode, cookie::Jar};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{AppError, Result};
use crate::models::{NewPanelist, Panelist};
use crate::session::AdminSession;

/// Operations offered by the panelist API.
///
/// Flows in [`crate::registration`], [`crate::admin`] and [`crate::session`]
/// are written against this trait so they can be exercised without a server.
pub trait PanelistApi: Send + Sync {
    /// Ask whether a panelist with this email already exists.
    fn check_email(&self, email: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Create a panelist from a multipart registration.
    fn submit_form(&self, panelist: &NewPanelist) -> impl Future<Output = Result<()>> + Send;

    /// Fetch every panelist, in API order.
    fn list_panelists(&self, token: &str) -> impl Future<Output = Result<Vec<Panelist>>> + Send;

    /// Delete one panelist by id.
    fn delete_panelist(&self, token: &str, id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Exchange the admin password for a session token.
    fn login(&self, password: &str) -> impl Future<Output = Result<AdminSession>> + Send;

    /// Revoke a session token on the server.
    fn logout(&self, token: &str) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Serialize)]
struct CheckEmailRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct CheckEmailResponse {
    #[serde(default)]
    exists: bool,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
}

/// HTTP implementation of [`PanelistApi`].
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The server root (e.g., "https://panel.example.ci")
    /// * `timeout` - Per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{base}/api/{path}", base = self.base_url)
    }

    /// Test connection to the server root.
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{base}/", base = self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(!response.status().is_server_error())
    }
}

/// Map a non-success response to an error, logging the body.
async fn reject(response: Response, what: &str) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!(status = status.as_u16(), body = %body, "{what} rejected by server");
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized,
        _ => AppError::Rejected {
            status: status.as_u16(),
        },
    }
}

impl PanelistApi for ApiClient {
    async fn check_email(&self, email: &str) -> Result<bool> {
        let response = self
            .client
            .post(self.endpoint("check-email"))
            .json(&CheckEmailRequest { email })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, "Email check").await);
        }

        let body: CheckEmailResponse = response.json().await?;
        Ok(body.exists)
    }

    async fn submit_form(&self, panelist: &NewPanelist) -> Result<()> {
        let mut form = Form::new();
        for (name, value) in panelist.text_fields() {
            debug!("submit-form field {name}: {value}");
            form = form.text(name, value);
        }

        let photo = Part::bytes(panelist.photo.bytes.clone())
            .file_name(panelist.photo.file_name.clone())
            .mime_str(panelist.photo.mime)?;
        form = form.part("photo", photo);

        let response = self
            .client
            .post(self.endpoint("submit-form"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, "Form submission").await);
        }
        Ok(())
    }

    async fn list_panelists(&self, token: &str) -> Result<Vec<Panelist>> {
        let response = self
            .client
            .get(self.endpoint("panelistes"))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, "Panelist list").await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AppError::parse(format!("panelist list: {e}")))
    }

    async fn delete_panelist(&self, token: &str, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("panelistes/{id}")))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, "Panelist deletion").await);
        }
        Ok(())
    }

    async fn login(&self, password: &str) -> Result<AdminSession> {
        let response = self
            .client
            .post(self.endpoint("admin/login"))
            .json(&LoginRequest { password })
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::InvalidCredentials),
            status if !status.is_success() => return Err(reject(response, "Admin login").await),
            _ => {}
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AppError::parse(format!("login response: {e}")))
    }

    async fn logout(&self, token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("admin/logout"))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(reject(response, "Admin logout").await);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory [`PanelistApi`] that records every call.

    use std::sync::Mutex;

    use chrono::{Duration, Utc};

    use super::*;

    #[derive(Default)]
    pub struct MockApi {
        pub calls: Mutex<Vec<String>>,
        pub existing_emails: Vec<String>,
        pub panelists: Mutex<Vec<Panelist>>,
        pub submit_status: Option<u16>,
        pub delete_status: Option<u16>,
        pub admin_password: String,
        pub transport_down: bool,
    }

    impl MockApi {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn status(code: Option<u16>) -> Result<()> {
            match code {
                None => Ok(()),
                Some(401) => Err(AppError::Unauthorized),
                Some(status) => Err(AppError::Rejected { status }),
            }
        }

        /// A real reqwest error, so callers see the same variant as a dead server.
        fn transport(&self) -> Result<()> {
            if !self.transport_down {
                return Ok(());
            }
            let error = reqwest::Client::new()
                .get("unreachable/api")
                .build()
                .expect_err("a relative URL never builds");
            Err(AppError::Http(error))
        }
    }

    impl PanelistApi for MockApi {
        async fn check_email(&self, email: &str) -> Result<bool> {
            self.record(format!("check_email:{email}"));
            self.transport()?;
            Ok(self.existing_emails.iter().any(|e| e == email))
        }

        async fn submit_form(&self, panelist: &NewPanelist) -> Result<()> {
            self.record(format!("submit_form:{}", panelist.email));
            self.transport()?;
            Self::status(self.submit_status)
        }

        async fn list_panelists(&self, token: &str) -> Result<Vec<Panelist>> {
            self.record(format!("list_panelists:{token}"));
            self.transport()?;
            Ok(self.panelists.lock().unwrap().clone())
        }

        async fn delete_panelist(&self, token: &str, id: i64) -> Result<()> {
            self.record(format!("delete_panelist:{token}:{id}"));
            self.transport()?;
            Self::status(self.delete_status)?;
            self.panelists.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }

        async fn login(&self, password: &str) -> Result<AdminSession> {
            self.record("login");
            self.transport()?;
            if password == self.admin_password {
                Ok(AdminSession {
                    token: "tok-123".to_string(),
                    expires_at: Utc::now() + Duration::hours(8),
                })
            } else {
                Err(AppError::InvalidCredentials)
            }
        }

        async fn logout(&self, token: &str) -> Result<()> {
            self.record(format!("logout:{token}"));
            self.transport()
        }
    }
}
