use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, LoginInput, ResetPasswordInput, SignupInput};
use super::errors::AuthError;
use super::password::{hash_password, needs_rehash, verify_password};
use super::token::{Claims, TokenKeys};
use crate::users::{PublicUser, Role, UserRecord, UserStore};

/// Auth business service independent of web framework
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys) -> Self { Self { users, keys } }

    /// Register a new user with a hashed password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenKeys, domain::SignupInput};
    /// use service::file::FileUserStore;
    /// let dir = std::env::temp_dir().join(format!("echoes-doc-{}", uuid::Uuid::new_v4()));
    /// let users = tokio_test::block_on(FileUserStore::open(&dir)).unwrap();
    /// let svc = AuthService::new(users, TokenKeys::new("secret", 1));
    /// let input = SignupInput { name: "Ada".into(), email: "ada@example.com".into(), password: "Secret123".into() };
    /// let session = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(session.user.email, "ada@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthSession, AuthError> {
        if input.name.trim().is_empty() || input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Name, email, and password are required".into()));
        }
        if let Some(existing) = self.users.find_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let user = self.users.create(UserRecord::new(input.name, input.email, hash)).await?;
        let token = self.keys.issue(&user)?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(AuthSession { user: user.into(), token })
    }

    /// Authenticate by email and password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenKeys, domain::{SignupInput, LoginInput}};
    /// use service::file::FileUserStore;
    /// let dir = std::env::temp_dir().join(format!("echoes-doc-{}", uuid::Uuid::new_v4()));
    /// let users = tokio_test::block_on(FileUserStore::open(&dir)).unwrap();
    /// let svc = AuthService::new(users, TokenKeys::new("secret", 1));
    /// let _ = tokio_test::block_on(svc.signup(SignupInput { name: "N".into(), email: "u@e.com".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.name, "N");
    /// assert!(tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "nope".into() })).is_err());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }
        let user = self.users.find_by_email(&input.email).await?.ok_or(AuthError::Unauthorized)?;
        if !verify_password(&input.password, &user.password_hash) {
            warn!(user_id = %user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }
        if needs_rehash(&user.password_hash) {
            self.upgrade_hash(&user.id, &input.password).await;
        }
        let token = self.keys.issue(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user: user.into(), token })
    }

    /// Replace a legacy bcrypt hash with argon2. Failure leaves the old hash usable.
    async fn upgrade_hash(&self, user_id: &str, password: &str) {
        let result = match hash_password(password) {
            Ok(hash) => self.users.set_password(user_id, hash).await.map_err(AuthError::from),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(user_id = %user_id, "password_hash_upgraded"),
            Err(e) => warn!(user_id = %user_id, error = %e, "password hash upgrade failed"),
        }
    }

    /// Set a new password for the account with this email.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError> {
        if input.email.trim().is_empty() || input.new_password.is_empty() {
            return Err(AuthError::Validation("Email and new password are required".into()));
        }
        let user = self.users.find_by_email(&input.email).await?.ok_or(AuthError::NotFound)?;
        let hash = hash_password(&input.new_password)?;
        self.users.set_password(&user.id, hash).await?;
        info!(user_id = %user.id, "password_reset");
        Ok(())
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }

    /// The account behind a verified token.
    pub async fn current_user(&self, claims: &Claims) -> Result<PublicUser, AuthError> {
        let user = self.users.get(&claims.id).await?.ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    pub async fn is_admin(&self, user_id: &str) -> Result<bool, AuthError> {
        Ok(self.users.get(user_id).await?.is_some_and(|u| u.role == Role::Admin))
    }
}
