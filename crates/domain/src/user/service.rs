use store::{BookingStore, NewUser, User, UserId};

use super::{RegisterUser, UserError, UserResult, hash_password, validate_password, verify_password};

/// Service layer for user accounts.
#[derive(Clone)]
pub struct UserService<S: BookingStore> {
    store: S,
}

impl<S: BookingStore> UserService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a user with a hashed password.
    ///
    /// An account created implicitly by a booking is claimed by the first
    /// registration for its email.
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterUser) -> UserResult<UserId> {
        if input.email.trim().is_empty() {
            return Err(UserError::Validation("Email is required".to_string()));
        }
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password)?;
        let user_id = self
            .store
            .register_user(NewUser {
                email: input.email,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
            })
            .await?;

        metrics::counter!("users_registered_total").increment(1);
        tracing::info!(%user_id, "user registered");
        Ok(user_id)
    }

    /// Verifies credentials and returns the matching active user.
    ///
    /// Unknown emails, inactive accounts, accounts without a password and wrong
    /// passwords all yield the same `InvalidCredentials` error.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self.store.get_user_by_email(email).await?;

        let verified = match user.as_ref().and_then(|u| u.password_hash.as_deref()) {
            Some(hash) => verify_password(password, hash)?,
            None => false,
        };

        match user {
            Some(user) if verified => Ok(user),
            _ => {
                metrics::counter!("logins_failed_total").increment(1);
                tracing::warn!("login rejected");
                Err(UserError::InvalidCredentials)
            }
        }
    }

    /// Loads an active user by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, user_id: UserId) -> UserResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))
    }

    /// Soft-deletes a user. Their bookings are kept.
    #[tracing::instrument(skip(self))]
    pub async fn deactivate(&self, user_id: UserId) -> UserResult<()> {
        if self.store.set_user_active(user_id, false).await? {
            Ok(())
        } else {
            Err(UserError::NotFound(user_id))
        }
    }
}
