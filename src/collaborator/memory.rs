//! In-memory backend (for local development and testing).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Collaborator;
use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::{
    FormSchema, Member, Principal, RegisterMemberRequest, UserProfile, UserRole, STATUS_ACTIVE,
};

#[derive(Debug, Default)]
struct MemoryState {
    form: Option<FormSchema>,
    members: Vec<Member>,
    profiles: HashMap<Principal, UserProfile>,
    roles: HashMap<Principal, UserRole>,
    next_member_id: u64,
}

/// Backend held entirely in process memory, enforcing the same access rules as the remote one.
#[derive(Debug, Default)]
pub struct InMemoryCollaborator {
    state: RwLock<MemoryState>,
}

impl InMemoryCollaborator {
    /// Start with the given principals holding the admin role.
    pub fn with_admins<I, P>(admins: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let roles = admins
            .into_iter()
            .map(|p| (Principal::new(p), UserRole::Admin))
            .collect();
        Self {
            state: RwLock::new(MemoryState {
                roles,
                ..MemoryState::default()
            }),
        }
    }

    /// Principals that currently hold the admin role.
    pub async fn admins(&self) -> HashSet<Principal> {
        self.state
            .read()
            .await
            .roles
            .iter()
            .filter(|(_, role)| **role == UserRole::Admin)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

fn role_of(state: &MemoryState, caller: &Caller) -> UserRole {
    match caller.principal() {
        None => UserRole::Guest,
        Some(p) => state.roles.get(p).copied().unwrap_or(UserRole::User),
    }
}

fn require_admin(state: &MemoryState, caller: &Caller) -> Result<(), AppError> {
    match role_of(state, caller) {
        UserRole::Admin => Ok(()),
        UserRole::User | UserRole::Guest => Err(AppError::Remote(
            "Unauthorized: Only admins can perform this action".to_string(),
        )),
    }
}

fn require_user(caller: &Caller) -> Result<&Principal, AppError> {
    caller.principal().ok_or_else(|| {
        AppError::Remote("Unauthorized: Only users can perform this action".to_string())
    })
}

#[async_trait]
impl Collaborator for InMemoryCollaborator {
    async fn get_current_form(&self, _caller: &Caller) -> Result<Option<FormSchema>, AppError> {
        Ok(self.state.read().await.form.clone())
    }

    async fn upload_form(&self, caller: &Caller, form: &FormSchema) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        require_admin(&state, caller)?;
        form.check().map_err(AppError::Remote)?;
        state.form = Some(form.clone());
        Ok(())
    }

    async fn register_member(
        &self,
        _caller: &Caller,
        request: &RegisterMemberRequest,
    ) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        state.next_member_id += 1;
        let id = state.next_member_id;

        state.members.push(Member {
            id,
            status: STATUS_ACTIVE.to_string(),
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone_number: request.phone_number.clone(),
            membership_type: request.membership_type.clone(),
            custom_fields: request.custom_fields.clone(),
            registration_date: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        });
        Ok(id)
    }

    async fn get_all_members(&self, caller: &Caller) -> Result<Vec<Member>, AppError> {
        let state = self.state.read().await;
        require_admin(&state, caller)?;
        Ok(state.members.clone())
    }

    async fn get_caller_user_profile(
        &self,
        caller: &Caller,
    ) -> Result<Option<UserProfile>, AppError> {
        let principal = require_user(caller)?;
        Ok(self.state.read().await.profiles.get(principal).cloned())
    }

    async fn get_user_profile(
        &self,
        caller: &Caller,
        user: &Principal,
    ) -> Result<Option<UserProfile>, AppError> {
        let state = self.state.read().await;
        if caller.principal() != Some(user) {
            require_admin(&state, caller)?;
        }
        Ok(state.profiles.get(user).cloned())
    }

    async fn save_caller_user_profile(
        &self,
        caller: &Caller,
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        let principal = require_user(caller)?.clone();
        self.state
            .write()
            .await
            .profiles
            .insert(principal, profile.clone());
        Ok(())
    }

    async fn is_caller_admin(&self, caller: &Caller) -> Result<bool, AppError> {
        let state = self.state.read().await;
        Ok(role_of(&state, caller) == UserRole::Admin)
    }

    async fn assign_caller_user_role(
        &self,
        caller: &Caller,
        user: &Principal,
        role: UserRole,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        require_admin(&state, caller)?;
        state.roles.insert(user.clone(), role);
        Ok(())
    }

    async fn get_caller_user_role(&self, caller: &Caller) -> Result<UserRole, AppError> {
        let state = self.state.read().await;
        Ok(role_of(&state, caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldDescriptor, FieldType};

    fn admin() -> Caller {
        Caller::signed_in("admin-principal")
    }

    fn request(name: &str) -> RegisterMemberRequest {
        RegisterMemberRequest {
            full_name: name.into(),
            email: "a@b.com".into(),
            phone_number: "012-3456789".into(),
            membership_type: "biasa".into(),
            custom_fields: vec![],
        }
    }

    #[tokio::test]
    async fn test_member_ids_are_sequential() {
        let backend = InMemoryCollaborator::with_admins(["admin-principal"]);
        let anonymous = Caller::anonymous();

        assert_eq!(backend.register_member(&anonymous, &request("A")).await.unwrap(), 1);
        assert_eq!(backend.register_member(&anonymous, &request("B")).await.unwrap(), 2);

        let members = backend.get_all_members(&admin()).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].full_name, "B");
        assert_eq!(members[1].status, STATUS_ACTIVE);
    }

    #[tokio::test]
    async fn test_admin_only_calls() {
        let backend = InMemoryCollaborator::with_admins(["admin-principal"]);
        let user = Caller::signed_in("someone");
        let schema = FormSchema::new(vec![
            FieldDescriptor::new("Alamat", FieldType::Text, true, vec![]).unwrap(),
        ]);

        assert!(matches!(
            backend.upload_form(&user, &schema).await,
            Err(AppError::Remote(_))
        ));
        assert!(backend.get_all_members(&Caller::anonymous()).await.is_err());

        backend.upload_form(&admin(), &schema).await.unwrap();
        assert_eq!(
            backend.get_current_form(&user).await.unwrap(),
            Some(schema)
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_malformed_schema() {
        let backend = InMemoryCollaborator::with_admins(["admin-principal"]);
        let bad = FormSchema::new(vec![FieldDescriptor {
            label: "Negeri".into(),
            field_type: FieldType::Dropdown,
            required: true,
            choices: None,
        }]);
        assert!(backend.upload_form(&admin(), &bad).await.is_err());
        assert_eq!(backend.get_current_form(&admin()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_profiles_and_roles() {
        let backend = InMemoryCollaborator::with_admins(["admin-principal"]);
        let user = Caller::signed_in("someone");

        assert_eq!(backend.get_caller_user_profile(&user).await.unwrap(), None);
        assert!(backend
            .save_caller_user_profile(&Caller::anonymous(), &UserProfile { name: "X".into() })
            .await
            .is_err());

        let profile = UserProfile { name: "Siti".into() };
        backend.save_caller_user_profile(&user, &profile).await.unwrap();
        assert_eq!(
            backend.get_caller_user_profile(&user).await.unwrap(),
            Some(profile.clone())
        );
        assert_eq!(
            backend
                .get_user_profile(&admin(), &Principal::new("someone"))
                .await
                .unwrap(),
            Some(profile)
        );

        assert_eq!(backend.get_caller_user_role(&user).await.unwrap(), UserRole::User);
        assert_eq!(
            backend.get_caller_user_role(&Caller::anonymous()).await.unwrap(),
            UserRole::Guest
        );
        assert!(!backend.is_caller_admin(&user).await.unwrap());

        backend
            .assign_caller_user_role(&admin(), &Principal::new("someone"), UserRole::Admin)
            .await
            .unwrap();
        assert!(backend.is_caller_admin(&user).await.unwrap());
        assert_eq!(backend.admins().await.len(), 2);
    }
}
