//! User service: token authentication and account management.

use labhub_domain::ability::{self, Action, Resource};
use labhub_domain::error::{LabHubError, ValidationError, messages};
use labhub_domain::time::now;
use labhub_domain::user::{ApiToken, User, UserParams};

use crate::ports::UserRepository;

/// Application service for users and their API tokens.
pub struct UserService<U> {
    repo: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repo: U) -> Self {
        Self { repo }
    }

    /// Resolve the user owning `token`, tracking the sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Unauthorized`] for unknown tokens, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, token))]
    pub async fn authenticate(
        &self,
        token: &ApiToken,
        ip: Option<String>,
    ) -> Result<User, LabHubError> {
        let Some(mut user) = self.repo.find_by_token_digest(&token.digest()).await? else {
            tracing::debug!("rejected unknown api token");
            return Err(LabHubError::Unauthorized);
        };
        let at = now();
        if user.needs_sign_in_refresh(ip.as_deref(), at) {
            user.record_sign_in(ip, at);
            user = self.repo.update(user).await?;
        }
        Ok(user)
    }

    /// The acting user's own record.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Forbidden`] if the rule denies reading it.
    pub fn current(&self, actor: &User) -> Result<User, LabHubError> {
        ability::authorize(actor, Action::Read, Resource::User(actor))?;
        Ok(actor.clone())
    }

    /// Create an account and return it with its freshly generated token.
    ///
    /// The plaintext token is only ever returned here.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Forbidden`] unless `actor` is an admin,
    /// [`LabHubError::Validation`] for invalid params or a taken email, or a
    /// storage error.
    #[tracing::instrument(skip(self, actor, params), fields(actor = %actor.id))]
    pub async fn create_user(
        &self,
        actor: &User,
        params: UserParams,
    ) -> Result<(User, ApiToken), LabHubError> {
        ability::authorize(actor, Action::Create, Resource::Users)?;
        let user = User::builder().params(params).build()?;
        self.ensure_email_free(&user.email).await?;

        let token = ApiToken::generate();
        let user = self.repo.create(user, token.digest()).await?;
        tracing::info!(user = %user.id, "user created");
        Ok((user, token))
    }

    /// Create the first admin account when the store holds no users.
    ///
    /// Returns `None` when users already exist.
    ///
    /// # Errors
    ///
    /// Returns [`LabHubError::Validation`] for an invalid email, or a
    /// storage error.
    #[tracing::instrument(skip(self, token))]
    pub async fn bootstrap_admin(
        &self,
        email: &str,
        token: &ApiToken,
    ) -> Result<Option<User>, LabHubError> {
        if self.repo.count().await? > 0 {
            return Ok(None);
        }
        let user = User::builder()
            .name("Administrator")
            .email(email)
            .admin(true)
            .build()?;
        let user = self.repo.create(user, token.digest()).await?;
        tracing::info!(user = %user.id, "bootstrapped admin account");
        Ok(Some(user))
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), LabHubError> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(ValidationError::single("email", messages::TAKEN).into());
        }
        Ok(())
    }
}
