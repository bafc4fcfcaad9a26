use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

/// A user as persisted in `users.json`.
///
/// Older files store the plaintext under `password`; those records are
/// re-hashed at startup, after which only `passwordHash` is written. A
/// record without any password is kept but can never sign in.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub username: String,
    #[serde(default, alias = "password", skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
}

/// An entry of the append-only score log in `student_scores.json`.
///
/// The body of a submission is not validated, so every field other than
/// the server-stamped `timestamp` is kept as raw JSON.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScoreRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub timestamp: String,
}

impl ScoreRecord {
    pub fn student_name(&self) -> Option<&str> {
        self.fields.get("studentName").and_then(Value::as_str)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTeacherRequest {
    pub requester_username: String,
    pub requester_password: String,
    pub new_username: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteUserRequest {
    pub target_username: String,
    pub requester_username: String,
    pub requester_password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteUsersRequest {
    pub target_usernames: Option<Vec<String>>,
    pub requester_username: String,
    pub requester_password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SuccessReply {
    pub success: bool,
    pub message: String,
}

impl SuccessReply {
    pub fn new(message: impl Into<String>) -> SuccessReply {
        SuccessReply {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LoginReply {
    pub success: bool,
    pub role: Role,
    pub username: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BatchDeleteReply {
    pub success: bool,
    pub message: String,
    pub deleted: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct MessageReply {
    pub message: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UserSummary {
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_user_reads_legacy_password_key() {
        let user: StoredUser = serde_json::from_value(json!({
            "username": "admin",
            "password": "hunter2",
            "role": "teacher",
        }))
        .unwrap();

        assert_eq!(user.password_hash.as_deref(), Some("hunter2"));
        assert_eq!(user.role, Role::Teacher);

        let written = serde_json::to_value(&user).unwrap();
        assert_eq!(written["passwordHash"], "hunter2");
        assert!(written.get("password").is_none());
    }

    #[test]
    fn stored_user_without_password_still_parses() {
        let users: Vec<StoredUser> = serde_json::from_value(json!([
            {"username": "siti", "password": "pw1", "role": "student"},
            {"username": "bob", "role": "teacher"},
        ]))
        .unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1].password_hash, None);

        let written = serde_json::to_value(&users[1]).unwrap();
        assert_eq!(written, json!({"username": "bob", "role": "teacher"}));
    }

    #[test]
    fn login_request_accepts_null_fields() {
        let request: LoginRequest =
            serde_json::from_value(json!({"username": null, "password": "x"})).unwrap();

        assert_eq!(request.username, None);
        assert_eq!(request.password.as_deref(), Some("x"));
    }

    #[test]
    fn score_record_keeps_unknown_fields() {
        let record: ScoreRecord = serde_json::from_value(json!({
            "studentName": "budi",
            "questionsAnswered": 7,
            "score": 85.5,
            "timestamp": "2024-03-01T10:00:00.000Z",
        }))
        .unwrap();

        assert_eq!(record.student_name(), Some("budi"));
        assert_eq!(record.fields["questionsAnswered"], 7);
        assert_eq!(record.timestamp, "2024-03-01T10:00:00.000Z");
        assert!(!record.fields.contains_key("timestamp"));
    }
}
