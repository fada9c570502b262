//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::{debug, warn};
use trolley::users::UserId;
use uuid::Uuid;

use crate::auth::{
    ApiTokenSecret, AuthServiceError, IssuedApiToken, NewApiToken, format_api_token,
    hash_api_token, parse_api_token, repository::PgAuthRepository,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
        }
    }

    /// Issue a new API token for the given user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insertion fails.
    pub async fn issue_api_token(&self, user: UserId) -> Result<IssuedApiToken, AuthServiceError> {
        let token_uuid = Uuid::now_v7();
        let secret = ApiTokenSecret::generate();
        let token = format_api_token(token_uuid, &secret);

        let metadata = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: token_uuid,
                user_id: user,
                token_hash: hash_api_token(&token),
            })
            .await?;

        Ok(IssuedApiToken { token, metadata })
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        let rows_affected = self.repository.revoke_api_token(token_uuid).await?;

        Ok(rows_affected > 0)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserId, AuthServiceError> {
        let parsed = parse_api_token(bearer_token).map_err(|error| {
            debug!(%error, "rejecting malformed bearer token");

            AuthServiceError::NotFound
        })?;

        let hash = hash_api_token(bearer_token);

        let user = self
            .repository
            .find_user_by_token_hash(&hash)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        if let Err(error) = self.repository.touch_api_token(&hash).await {
            warn!(token = %parsed.token_uuid, %error, "failed to record token use");
        }

        Ok(user)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve the user owning an API token.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<UserId, AuthServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers};

    use super::*;

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn issued_token_authenticates_its_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = helpers::create_user(&ctx, "Ada").await?;

        let issued = ctx.auth.issue_api_token(user.id).await?;

        assert_eq!(issued.metadata.user_id, user.id);
        assert_eq!(ctx.auth.authenticate_bearer(&issued.token).await?, user.id);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn revoked_token_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = helpers::create_user(&ctx, "Ada").await?;

        let issued = ctx.auth.issue_api_token(user.id).await?;

        assert!(ctx.auth.revoke_api_token(issued.metadata.uuid).await?);
        assert!(!ctx.auth.revoke_api_token(issued.metadata.uuid).await?);

        let result = ctx.auth.authenticate_bearer(&issued.token).await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a Docker daemon for testcontainers"]
    async fn malformed_token_is_rejected_without_lookup() {
        let ctx = TestContext::new().await;

        let result = ctx.auth.authenticate_bearer("definitely-not-a-token").await;

        assert!(
            matches!(result, Err(AuthServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
