//! User provisioning from verified identities.
//!
//! The token verifier upstream hands us a [`VerifiedIdentity`]; this
//! module keeps the user table in sync with it so the rest of the
//! system can resolve learners and instructors by email.

use crate::error::ServiceError;
use crate::identity::VerifiedIdentity;
use crate::persistence::traits::UserRepository;
use crate::persistence::UserRecord;

pub struct UserDirectory<U> {
    users: U,
}

impl<U> UserDirectory<U>
where
    U: UserRepository,
{
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Create the user on first sight, or update the stored role when
    /// the identity provider's role assignment changed.
    pub async fn sync_identity(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<UserRecord, ServiceError> {
        let role = identity.effective_role();

        match self.users.find_user_by_email(&identity.email).await? {
            Some(mut user) => {
                if user.role != role {
                    tracing::info!(user_id = user.user_id, "updating role for user");
                    self.users.update_user_role(user.user_id, role).await?;
                    user.role = role;
                }
                Ok(user)
            }
            None => {
                tracing::info!(email = %identity.email, "creating new user");
                let (first_name, last_name) = identity.name_parts();
                Ok(self
                    .users
                    .create_user(
                        &identity.subject,
                        &identity.email,
                        &first_name,
                        &last_name,
                        role,
                    )
                    .await?)
            }
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<UserRecord, ServiceError> {
        self.users
            .find_user_by_email(email)
            .await?
            .ok_or(ServiceError::NotFound("user"))
    }
}
