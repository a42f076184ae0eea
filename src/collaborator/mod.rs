//! Client side of the remote backend actor.
//!
//! The backend owns members, profiles, roles and the form schema. Every call carries the
//! caller's identity and fails with a plain message string.

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use async_trait::async_trait;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::{FormSchema, Member, Principal, RegisterMemberRequest, UserProfile, UserRole};

#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn get_current_form(&self, caller: &Caller) -> Result<Option<FormSchema>, AppError>;

    /// Replace the stored schema wholesale.
    async fn upload_form(&self, caller: &Caller, form: &FormSchema) -> Result<(), AppError>;

    /// Register a member and return the new member id.
    async fn register_member(
        &self,
        caller: &Caller,
        request: &RegisterMemberRequest,
    ) -> Result<u64, AppError>;

    async fn get_all_members(&self, caller: &Caller) -> Result<Vec<Member>, AppError>;

    async fn get_caller_user_profile(
        &self,
        caller: &Caller,
    ) -> Result<Option<UserProfile>, AppError>;

    async fn get_user_profile(
        &self,
        caller: &Caller,
        user: &Principal,
    ) -> Result<Option<UserProfile>, AppError>;

    async fn save_caller_user_profile(
        &self,
        caller: &Caller,
        profile: &UserProfile,
    ) -> Result<(), AppError>;

    async fn is_caller_admin(&self, caller: &Caller) -> Result<bool, AppError>;

    async fn assign_caller_user_role(
        &self,
        caller: &Caller,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), AppError>;

    async fn get_caller_user_role(&self, caller: &Caller) -> Result<UserRole, AppError>;
}
