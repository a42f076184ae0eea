//! Typed RPC client for a remote backend reachable over HTTP.
//!
//! Each method is `POST {base}/rpc/{method}` with body `{"args": [...]}`. The caller's identity
//! travels in the `x-caller-identity` header. Replies are `{"ok": value}` or `{"err": message}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::Collaborator;
use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::{FormSchema, Member, Principal, RegisterMemberRequest, UserProfile, UserRole};

/// Header carrying the caller's principal to the backend.
pub const CALLER_IDENTITY_HEADER: &str = "x-caller-identity";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RpcReply<T> {
    Ok(T),
    Err(String),
}

/// Remote backend reached through HTTP RPC.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    client: Client,
    base_url: String,
}

impl HttpCollaborator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        method: &str,
        args: Value,
    ) -> Result<T, AppError> {
        let url = format!("{}/rpc/{}", self.base_url, method);
        let mut request = self.client.post(&url).json(&json!({ "args": args }));
        if let Some(principal) = caller.principal() {
            request = request.header(CALLER_IDENTITY_HEADER, principal.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<RpcReply<T>>(&body) {
            Ok(RpcReply::Ok(value)) => Ok(value),
            Ok(RpcReply::Err(message)) => {
                tracing::warn!("Backend rejected {}: {}", method, message);
                Err(AppError::Remote(message))
            }
            Err(e) if status.is_success() => {
                tracing::error!("Malformed reply from backend {}: {}", method, e);
                Err(AppError::Remote(format!(
                    "Malformed reply from backend: {}",
                    e
                )))
            }
            Err(_) => {
                tracing::warn!("Backend {} failed with HTTP {}", method, status);
                Err(AppError::Remote(format!("Backend returned HTTP {}", status)))
            }
        }
    }
}

#[async_trait]
impl Collaborator for HttpCollaborator {
    async fn get_current_form(&self, caller: &Caller) -> Result<Option<FormSchema>, AppError> {
        self.call(caller, "getCurrentForm", json!([])).await
    }

    async fn upload_form(&self, caller: &Caller, form: &FormSchema) -> Result<(), AppError> {
        self.call(caller, "uploadForm", json!([form])).await
    }

    async fn register_member(
        &self,
        caller: &Caller,
        request: &RegisterMemberRequest,
    ) -> Result<u64, AppError> {
        self.call(
            caller,
            "registerMember",
            json!([
                request.full_name,
                request.email,
                request.phone_number,
                request.membership_type,
                request.custom_fields,
            ]),
        )
        .await
    }

    async fn get_all_members(&self, caller: &Caller) -> Result<Vec<Member>, AppError> {
        self.call(caller, "getAllMembers", json!([])).await
    }

    async fn get_caller_user_profile(
        &self,
        caller: &Caller,
    ) -> Result<Option<UserProfile>, AppError> {
        self.call(caller, "getCallerUserProfile", json!([])).await
    }

    async fn get_user_profile(
        &self,
        caller: &Caller,
        user: &Principal,
    ) -> Result<Option<UserProfile>, AppError> {
        self.call(caller, "getUserProfile", json!([user])).await
    }

    async fn save_caller_user_profile(
        &self,
        caller: &Caller,
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        self.call(caller, "saveCallerUserProfile", json!([profile]))
            .await
    }

    async fn is_caller_admin(&self, caller: &Caller) -> Result<bool, AppError> {
        self.call(caller, "isCallerAdmin", json!([])).await
    }

    async fn assign_caller_user_role(
        &self,
        caller: &Caller,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), AppError> {
        self.call(caller, "assignCallerUserRole", json!([user, role]))
            .await
    }

    async fn get_caller_user_role(&self, caller: &Caller) -> Result<UserRole, AppError> {
        self.call(caller, "getCallerUserRole", json!([])).await
    }
}
