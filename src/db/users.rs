//! User directory operations.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{now_timestamp, Repository};
use crate::auth::IdTokenClaims;
use crate::errors::AppError;
use crate::models::{CustomClaims, User, UserMetadata};

const USER_COLUMNS: &str = "uid, email, display_name, photo_url, email_verified, disabled, admin, created_at, last_sign_in_at";

impl Repository {
    /// Record a sign-in from verified token claims, creating the user on first sight.
    ///
    /// The admin flag is never taken from the token here; it is only changed
    /// through `set_admin`.
    pub async fn upsert_user_from_claims(&self, claims: &IdTokenClaims) -> Result<User, AppError> {
        let now = now_timestamp();

        sqlx::query(
            r#"
            INSERT INTO users (uid, email, display_name, photo_url, email_verified, disabled, admin, created_at, last_sign_in_at)
            VALUES (?, ?, ?, ?, ?, 0, 0, ?, ?)
            ON CONFLICT(uid) DO UPDATE SET
                email = COALESCE(excluded.email, users.email),
                display_name = COALESCE(excluded.display_name, users.display_name),
                photo_url = COALESCE(excluded.photo_url, users.photo_url),
                email_verified = excluded.email_verified,
                last_sign_in_at = excluded.last_sign_in_at
            "#,
        )
        .bind(&claims.sub)
        .bind(&claims.email)
        .bind(&claims.name)
        .bind(&claims.picture)
        .bind(claims.email_verified as i32)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_user(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Internal(format!("User {} vanished after upsert", claims.sub)))
    }

    /// Get a user by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE uid = ?", USER_COLUMNS))
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Whether the directory marks this uid as admin.
    pub async fn is_admin(&self, uid: &str) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT admin FROM users WHERE uid = ?")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some_and(|r| r.get::<i32, _>("admin") != 0))
    }

    /// List up to 1000 users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC LIMIT 1000",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Grant or revoke the admin flag.
    ///
    /// Unknown uids get a placeholder record so the flag applies on first sign-in.
    pub async fn set_admin(&self, uid: &str, admin: bool) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (uid, admin, created_at) VALUES (?, ?, ?)
            ON CONFLICT(uid) DO UPDATE SET admin = excluded.admin
            "#,
        )
        .bind(uid)
        .bind(admin as i32)
        .bind(now_timestamp())
        .execute(&self.pool)
        .await?;

        tracing::info!(uid = %uid, admin, "Admin role updated");
        Ok(())
    }

    /// Delete a user.
    pub async fn delete_user(&self, uid: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE uid = ?")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", uid)));
        }
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        uid: row.get("uid"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        photo_url: row.get("photo_url"),
        email_verified: row.get::<i32, _>("email_verified") != 0,
        disabled: row.get::<i32, _>("disabled") != 0,
        custom_claims: CustomClaims {
            admin: row.get::<i32, _>("admin") != 0,
        },
        metadata: UserMetadata {
            creation_time: row.get("created_at"),
            last_sign_in_time: row.get("last_sign_in_at"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    fn claims(uid: &str, email: Option<&str>) -> IdTokenClaims {
        IdTokenClaims {
            sub: uid.to_string(),
            email: email.map(str::to_string),
            name: Some("Asha".to_string()),
            picture: None,
            email_verified: true,
            admin: None,
            exp: 0,
        }
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("users.sqlite")).await.unwrap();
        let repo = Repository::new(pool);

        let user = repo
            .upsert_user_from_claims(&claims("uid-1", Some("asha@example.com")))
            .await
            .unwrap();
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));
        assert!(!user.custom_claims.admin);
        assert!(user.metadata.last_sign_in_time.is_some());

        // A later sign-in without email keeps the stored one
        let user = repo.upsert_user_from_claims(&claims("uid-1", None)).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("asha@example.com"));

        repo.set_admin("uid-1", true).await.unwrap();
        assert!(repo.is_admin("uid-1").await.unwrap());
        assert!(!repo.is_admin("uid-2").await.unwrap());

        // Sign-in does not reset the flag
        repo.upsert_user_from_claims(&claims("uid-1", None)).await.unwrap();
        assert!(repo.is_admin("uid-1").await.unwrap());

        // Placeholder for a user who has never signed in
        repo.set_admin("uid-3", true).await.unwrap();
        assert_eq!(repo.list_users().await.unwrap().len(), 2);

        repo.delete_user("uid-1").await.unwrap();
        assert!(repo.get_user("uid-1").await.unwrap().is_none());
        assert!(matches!(
            repo.delete_user("uid-1").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
