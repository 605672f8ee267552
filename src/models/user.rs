use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account, as exposed to pages and API responses.
///
/// Never carries the password hash; see [`UserCredentials`] for that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The columns needed to check a sign-in attempt.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub password_hash: String,
}

/// A validated account about to be inserted.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_omits_secrets() {
        let user = User {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }
}
