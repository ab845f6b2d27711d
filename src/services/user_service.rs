use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::User;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolves the session identity to a local user row, provisioning one on
    /// first sight. Identity itself comes from the externally issued token;
    /// this service only mirrors it.
    pub async fn ensure_user(&self, claims: &Claims) -> Result<Uuid> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("Token subject is not a valid user id".to_string()))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(claims.name.clone().unwrap_or_else(|| "Candidate".to_string()))
        .bind(
            claims
                .email
                .clone()
                .unwrap_or_else(|| format!("{}@placeholder.local", user_id)),
        )
        .bind(claims.role.clone().unwrap_or_else(|| "candidate".to_string()))
        .fetch_one(&self.pool)
        .await?;

        if !user.is_active {
            return Err(Error::Forbidden("Account is deactivated".to_string()));
        }

        Ok(user.id)
    }
}
