/// Invitation model and database operations
///
/// Admins invite new team members by email. An invitation carries a random
/// token that is emailed to the invitee; only the SHA-256 hash of the token
/// is stored, mirroring how API secrets are handled everywhere else in the
/// codebase. Accepting the token creates the user with the invited role.
///
/// Invariant: a revoked, expired, or already-accepted invitation can never
/// be accepted. [`Invitation::find_acceptable`] is the only lookup used by
/// the accept flow and enforces all three conditions in SQL.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::permissions::UserRole;

/// Length of the random invitation token (characters)
const TOKEN_LENGTH: usize = 40;

/// How long invitations stay valid
const VALID_DAYS: i64 = 7;

/// Pending or settled invitation to join a company
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Company the invitee would join
    pub company_id: Uuid,

    /// Invitee email
    pub email: String,

    /// Role the invitee will receive on acceptance
    pub role: UserRole,

    /// SHA-256 hash of the invitation token (hex)
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// User who sent the invitation
    pub invited_by: Uuid,

    /// Hard expiry
    pub expires_at: DateTime<Utc>,

    /// Set when the invitation was accepted
    pub accepted_at: Option<DateTime<Utc>>,

    /// Set when the invitation was revoked
    pub revoked_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating an invitation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitation {
    pub company_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub invited_by: Uuid,
}

/// Generates a random invitation token and its storage hash
///
/// Returns (plaintext_token, sha256_hex). The plaintext is shown once and
/// never stored.
pub fn generate_token() -> (String, String) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let token: String = (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect();

    let hash = hash_token(&token);
    (token, hash)
}

/// Hashes an invitation token with SHA-256 (hex output)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

const INVITATION_COLUMNS: &str = "id, company_id, email, role, token_hash, invited_by, \
                                  expires_at, accepted_at, revoked_at, created_at";

impl Invitation {
    /// Creates an invitation
    ///
    /// Returns the invitation row together with the plaintext token, which
    /// the caller is responsible for delivering to the invitee.
    pub async fn create(
        pool: &PgPool,
        data: CreateInvitation,
    ) -> Result<(Self, String), sqlx::Error> {
        let (token, token_hash) = generate_token();
        let expires_at = Utc::now() + Duration::days(VALID_DAYS);

        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            r#"
            INSERT INTO invitations (company_id, email, role, token_hash, invited_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {INVITATION_COLUMNS}
            "#,
        ))
        .bind(data.company_id)
        .bind(data.email)
        .bind(data.role)
        .bind(token_hash)
        .bind(data.invited_by)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok((invitation, token))
    }

    /// Finds an invitation that can still be accepted
    ///
    /// Excludes revoked, expired, and already-accepted invitations.
    pub async fn find_acceptable(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE token_hash = $1
              AND accepted_at IS NULL
              AND revoked_at IS NULL
              AND expires_at > NOW()
            "#,
        ))
        .bind(hash_token(token))
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Marks an invitation accepted
    ///
    /// Guarded against double-acceptance and late revocation at the SQL
    /// level; returns false if the invitation was no longer acceptable.
    pub async fn mark_accepted(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET accepted_at = NOW()
            WHERE id = $1
              AND accepted_at IS NULL
              AND revoked_at IS NULL
              AND expires_at > NOW()
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes an invitation (company-scoped)
    pub async fn revoke(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET revoked_at = NOW()
            WHERE id = $1 AND company_id = $2 AND revoked_at IS NULL AND accepted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a company's invitations, newest first
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, Invitation>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(invitations)
    }

    /// Whether the invitation can still be accepted
    pub fn is_acceptable(&self) -> bool {
        self.accepted_at.is_none() && self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let (token, hash) = generate_token();

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(hash.len(), 64); // SHA-256 hex
        assert_eq!(hash, hash_token(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_token();
        let (b, _) = generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_deterministic() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn test_is_acceptable() {
        let base = Invitation {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            email: "new@example.com".to_string(),
            role: UserRole::Technician,
            token_hash: hash_token("tok"),
            invited_by: Uuid::new_v4(),
            expires_at: Utc::now() + Duration::days(1),
            accepted_at: None,
            revoked_at: None,
            created_at: Utc::now(),
        };

        assert!(base.is_acceptable());

        let revoked = Invitation {
            revoked_at: Some(Utc::now()),
            ..base.clone()
        };
        assert!(!revoked.is_acceptable());

        let accepted = Invitation {
            accepted_at: Some(Utc::now()),
            ..base.clone()
        };
        assert!(!accepted.is_acceptable());

        let expired = Invitation {
            expires_at: Utc::now() - Duration::hours(1),
            ..base
        };
        assert!(!expired.is_acceptable());
    }
}
