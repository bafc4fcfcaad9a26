use anyhow::anyhow;
use chrono::{SecondsFormat, Utc};
use log::{info, warn};
use rand::prelude::*;
use serde_json::{Map, Value};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use crate::error::ApiError;
use crate::models::{
    BatchDeleteReply, CreateTeacherRequest, DeleteUserRequest, DeleteUsersRequest, LoginReply,
    LoginRequest, MessageReply, RegisterRequest, Role, ScoreRecord, StoredUser, SuccessReply,
    UserSummary,
};
use crate::password;
use crate::store::Store;

/// The account that is seeded at startup and can never be batch deleted.
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Clone, Debug)]
pub struct AccountController {
    store: Arc<Mutex<Store>>,
}

impl AccountController {
    pub fn new(store: Store) -> AccountController {
        AccountController {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` on a blocking thread with exclusive access to the store, so
    /// that every read-modify-write happens as one step. Password hashing
    /// stays outside of `f`.
    async fn with_store<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&Store) -> Result<R, ApiError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.store.clone();

        let blocking_task = tokio::task::spawn_blocking(move || {
            let store = store.lock().map_err(|_err| anyhow!("couldn't lock store"))?;
            f(&store)
        });

        blocking_task.await.map_err(anyhow::Error::from)?
    }

    async fn find_user(&self, username: String) -> Result<Option<StoredUser>, ApiError> {
        self.with_store(move |store| {
            let user = store
                .users
                .read()?
                .into_iter()
                .find(|user| user.username == username);

            Ok(user)
        })
        .await
    }

    /// Checks the requester's credentials without holding the store. The
    /// returned snapshot is compared again under the lock by
    /// `still_authorized` before anything is written.
    async fn authorize_teacher(
        &self,
        username: &str,
        password: &str,
        denied: &'static str,
    ) -> Result<StoredUser, ApiError> {
        let requester = self
            .find_user(username.to_owned())
            .await?
            .filter(|user| user.role == Role::Teacher)
            .ok_or(ApiError::Forbidden(denied))?;

        if !verify_password(&requester, password.to_owned()).await? {
            return Err(ApiError::Forbidden(denied));
        }

        Ok(requester)
    }

    /// Re-hashes plaintext passwords left by older deployments and seeds the
    /// admin teacher if it is missing.
    pub async fn bootstrap(&self, admin_password: Option<String>) -> Result<(), ApiError> {
        self.with_store(move |store| {
            let mut users = store.users.read()?;
            let mut changed = false;

            for user in users.iter_mut() {
                let stored = match &user.password_hash {
                    None => {
                        warn!("User {} has no password and cannot sign in", user.username);
                        continue;
                    }
                    Some(stored) => stored,
                };

                if !password::is_hash(stored) {
                    info!("Migrating plaintext password of {}", user.username);
                    user.password_hash = Some(password::hash(stored));
                    changed = true;
                }
            }

            if !users.iter().any(|user| user.username == ADMIN_USERNAME) {
                let admin_password = admin_password.unwrap_or_else(|| {
                    let mut secret = [0u8; 12];
                    rand::rngs::OsRng.fill(&mut secret);
                    let secret = hex::encode(secret);

                    warn!("No admin password was configured, generated a new one.");
                    warn!("Sign in as {} with password {}", ADMIN_USERNAME, secret);

                    secret
                });

                info!("Seeding default admin account...");
                users.push(StoredUser {
                    username: ADMIN_USERNAME.into(),
                    password_hash: Some(password::hash(&admin_password)),
                    role: Role::Teacher,
                });
                changed = true;
            }

            if changed {
                store.users.write(&users)?;
            }

            Ok(())
        })
        .await
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<SuccessReply, ApiError> {
        let (username, password) = match (request.username, request.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                (username, password)
            }
            _ => return Err(ApiError::Validation("Username and password required")),
        };

        let password_hash = hash_password(password).await?;

        self.with_store(move |store| {
            let mut users = store.users.read()?;

            if users.iter().any(|user| user.username == username) {
                return Err(ApiError::Validation("Username already exists"));
            }

            users.push(StoredUser {
                username: username.clone(),
                password_hash: Some(password_hash),
                role: Role::Student,
            });
            store.users.write(&users)?;

            info!("User registered: {}", username);
            Ok(SuccessReply::new("Registration successful"))
        })
        .await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginReply, ApiError> {
        let username = request.username.ok_or(ApiError::NotFound)?;
        let user = self.find_user(username).await?.ok_or(ApiError::NotFound)?;

        let password = request.password.unwrap_or_default();
        if !verify_password(&user, password).await? {
            return Err(ApiError::IncorrectPassword);
        }

        Ok(LoginReply {
            success: true,
            role: user.role,
            username: user.username,
        })
    }

    pub async fn create_teacher(
        &self,
        request: CreateTeacherRequest,
    ) -> Result<SuccessReply, ApiError> {
        const DENIED: &str = "Unauthorized: Only teachers can create new teachers.";

        let requester = self
            .authorize_teacher(
                &request.requester_username,
                &request.requester_password,
                DENIED,
            )
            .await?;

        let (username, password) = match (request.new_username, request.new_password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                (username, password)
            }
            _ => return Err(ApiError::Validation("Username and password required")),
        };

        let password_hash = hash_password(password).await?;

        self.with_store(move |store| {
            let mut users = store.users.read()?;
            still_authorized(&users, &requester, DENIED)?;

            if users.iter().any(|user| user.username == username) {
                return Err(ApiError::Validation("Username already exists"));
            }

            users.push(StoredUser {
                username: username.clone(),
                password_hash: Some(password_hash),
                role: Role::Teacher,
            });
            store.users.write(&users)?;

            info!("New teacher created by {}: {}", requester.username, username);
            Ok(SuccessReply::new("Teacher created successfully"))
        })
        .await
    }

    pub async fn delete_user(&self, request: DeleteUserRequest) -> Result<SuccessReply, ApiError> {
        const DENIED: &str = "Unauthorized: Only teachers can delete users.";

        let requester = self
            .authorize_teacher(
                &request.requester_username,
                &request.requester_password,
                DENIED,
            )
            .await?;
        let target = request.target_username;

        self.with_store(move |store| {
            let mut users = store.users.read()?;
            still_authorized(&users, &requester, DENIED)?;

            let index = users
                .iter()
                .position(|user| user.username == target)
                .ok_or(ApiError::NotFound)?;
            let removed = users.remove(index);
            store.users.write(&users)?;

            if removed.role == Role::Student {
                let mut students = HashSet::new();
                students.insert(removed.username);
                remove_scores(store, &students)?;
            }

            info!("User {} deleted by {}", target, requester.username);
            Ok(SuccessReply::new("User deleted successfully"))
        })
        .await
    }

    /// Deletes several users at once. The admin account and the requester
    /// are never deleted; they are reported as skipped.
    pub async fn delete_users(
        &self,
        request: DeleteUsersRequest,
    ) -> Result<BatchDeleteReply, ApiError> {
        const DENIED: &str = "Unauthorized: Teacher access required";

        let requester = self
            .authorize_teacher(
                &request.requester_username,
                &request.requester_password,
                DENIED,
            )
            .await?;

        let targets = match request.target_usernames {
            Some(targets) if !targets.is_empty() => targets.into_iter().collect::<HashSet<_>>(),
            _ => return Err(ApiError::Validation("No users specified for deletion")),
        };

        self.with_store(move |store| {
            let mut users = store.users.read()?;
            still_authorized(&users, &requester, DENIED)?;

            let mut deleted = 0;
            let mut skipped = 0;
            let mut students = HashSet::new();

            users.retain(|user| {
                if !targets.contains(&user.username) {
                    return true;
                }

                if user.username == ADMIN_USERNAME || user.username == requester.username {
                    skipped += 1;
                    return true;
                }

                deleted += 1;
                if user.role == Role::Student {
                    students.insert(user.username.clone());
                }
                false
            });

            if deleted > 0 {
                store.users.write(&users)?;
                remove_scores(store, &students)?;

                info!("{} users deleted by {}", deleted, requester.username);
            }

            let mut message = format!("Deleted {} users.", deleted);
            if skipped > 0 {
                message.push_str(&format!(" Failed to delete {} protected users.", skipped));
            }

            Ok(BatchDeleteReply {
                success: true,
                message,
                deleted,
                skipped,
            })
        })
        .await
    }

    /// Appends a submission to the score log, stamped with the server time.
    pub async fn submit_score(&self, body: Value) -> Result<MessageReply, ApiError> {
        info!("Received Score: {}", body);

        let fields = match body {
            Value::Object(mut fields) => {
                fields.remove("timestamp");
                fields
            }
            other => {
                warn!("Score submission is not an object, keeping only its timestamp: {}", other);
                Map::new()
            }
        };

        let record = ScoreRecord {
            fields,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        self.with_store(move |store| {
            let mut scores = store.scores.read()?;
            scores.push(record);
            store.scores.write(&scores)?;

            Ok(MessageReply {
                message: "Score saved".into(),
            })
        })
        .await
    }

    pub async fn scores(&self) -> Result<Vec<ScoreRecord>, ApiError> {
        self.with_store(|store| Ok(store.scores.read()?)).await
    }

    pub async fn users_with_role(&self, role: Role) -> Result<Vec<UserSummary>, ApiError> {
        self.with_store(move |store| {
            let users: Vec<UserSummary> = store
                .users
                .read()?
                .into_iter()
                .filter(|user| user.role == role)
                .map(|user| UserSummary {
                    username: user.username,
                })
                .collect();

            Ok(users)
        })
        .await
    }
}

async fn hash_password(password: String) -> Result<String, ApiError> {
    let blocking_task = tokio::task::spawn_blocking(move || password::hash(&password));
    Ok(blocking_task.await.map_err(anyhow::Error::from)?)
}

/// A user without a stored password never verifies.
async fn verify_password(user: &StoredUser, password: String) -> Result<bool, ApiError> {
    let stored = match user.password_hash.clone() {
        None => return Ok(false),
        Some(stored) => stored,
    };

    let blocking_task = tokio::task::spawn_blocking(move || password::verify(&stored, &password));
    Ok(blocking_task.await.map_err(anyhow::Error::from)?)
}

fn still_authorized(
    users: &[StoredUser],
    requester: &StoredUser,
    denied: &'static str,
) -> Result<(), ApiError> {
    if users.iter().any(|user| user == requester) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(denied))
    }
}

fn remove_scores(store: &Store, students: &HashSet<String>) -> Result<(), ApiError> {
    let mut scores = store.scores.read()?;
    let before = scores.len();

    scores.retain(|score| {
        score
            .student_name()
            .map(|name| !students.contains(name))
            .unwrap_or(true)
    });

    if scores.len() != before {
        store.scores.write(&scores)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TempDir;
    use serde_json::json;

    const ADMIN_PASSWORD: &str = "admin-pass";

    async fn controller(dir: &TempDir) -> AccountController {
        let controller = AccountController::new(Store::open(dir.path()).unwrap());
        controller
            .bootstrap(Some(ADMIN_PASSWORD.into()))
            .await
            .unwrap();
        controller
    }

    async fn register(controller: &AccountController, username: &str, password: &str) {
        controller
            .register(RegisterRequest {
                username: Some(username.into()),
                password: Some(password.into()),
            })
            .await
            .unwrap();
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    fn batch(targets: &[&str], requester: &str, password: &str) -> DeleteUsersRequest {
        DeleteUsersRequest {
            target_usernames: Some(targets.iter().map(|t| t.to_string()).collect()),
            requester_username: requester.into(),
            requester_password: password.into(),
        }
    }

    #[tokio::test]
    async fn registered_student_can_log_in() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "siti", "pw1").await;

        let reply = controller.login(login("siti", "pw1")).await.unwrap();
        assert_eq!(reply.role, Role::Student);
        assert_eq!(reply.username, "siti");
        assert!(reply.success);
    }

    #[tokio::test]
    async fn passwords_are_not_stored_in_plaintext() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "siti", "pw1").await;

        let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert!(!raw.contains("\"pw1\""));
        assert!(!raw.contains(ADMIN_PASSWORD));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "siti", "pw1").await;

        let err = controller
            .register(RegisterRequest {
                username: Some("siti".into()),
                password: Some("different".into()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[tokio::test]
    async fn register_requires_both_fields() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        let err = controller
            .register(RegisterRequest {
                username: Some("siti".into()),
                password: Some(String::new()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn login_distinguishes_unknown_user_from_wrong_password() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "siti", "pw1").await;

        let err = controller.login(login("nobody", "pw1")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let err = controller.login(login("siti", "nope")).await.unwrap_err();
        assert!(matches!(err, ApiError::IncorrectPassword));
    }

    #[tokio::test]
    async fn only_teachers_create_teachers() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "siti", "pw1").await;

        let request = |requester: &str, password: &str| CreateTeacherRequest {
            requester_username: requester.into(),
            requester_password: password.into(),
            new_username: Some("bu-ani".into()),
            new_password: Some("guru".into()),
        };

        let err = controller
            .create_teacher(request("siti", "pw1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = controller
            .create_teacher(request("admin", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        controller
            .create_teacher(request("admin", ADMIN_PASSWORD))
            .await
            .unwrap();
        let reply = controller.login(login("bu-ani", "guru")).await.unwrap();
        assert_eq!(reply.role, Role::Teacher);

        let err = controller
            .create_teacher(request("admin", ADMIN_PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[tokio::test]
    async fn student_cannot_delete_users() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "siti", "pw1").await;
        register(&controller, "budi", "pw2").await;

        let err = controller
            .delete_user(DeleteUserRequest {
                target_username: "budi".into(),
                requester_username: "siti".into(),
                requester_password: "pw1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        assert!(controller.login(login("budi", "pw2")).await.is_ok());
    }

    #[tokio::test]
    async fn teacher_deletes_user_and_their_scores() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        register(&controller, "budi", "pw2").await;
        controller
            .submit_score(json!({"studentName": "budi", "questionsAnswered": 3, "score": 60}))
            .await
            .unwrap();
        controller
            .submit_score(json!({"studentName": "siti", "questionsAnswered": 5, "score": 100}))
            .await
            .unwrap();

        let request = DeleteUserRequest {
            target_username: "budi".into(),
            requester_username: "admin".into(),
            requester_password: ADMIN_PASSWORD.into(),
        };
        controller.delete_user(request.clone()).await.unwrap();

        let err = controller.login(login("budi", "pw2")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let scores = controller.scores().await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].student_name(), Some("siti"));

        let err = controller.delete_user(request).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn batch_delete_protects_admin() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        for name in &["a", "b", "c"] {
            register(&controller, name, "pw").await;
        }

        let reply = controller
            .delete_users(batch(&["admin", "a", "b", "c"], "admin", ADMIN_PASSWORD))
            .await
            .unwrap();

        assert_eq!(reply.deleted, 3);
        assert_eq!(reply.skipped, 1);
        assert_eq!(
            reply.message,
            "Deleted 3 users. Failed to delete 1 protected users."
        );

        let students = controller.users_with_role(Role::Student).await.unwrap();
        assert!(students.is_empty());
        let teachers = controller.users_with_role(Role::Teacher).await.unwrap();
        assert_eq!(
            teachers,
            vec![UserSummary {
                username: "admin".into()
            }]
        );
    }

    #[tokio::test]
    async fn batch_delete_protects_the_requester() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        controller
            .create_teacher(CreateTeacherRequest {
                requester_username: "admin".into(),
                requester_password: ADMIN_PASSWORD.into(),
                new_username: Some("guru".into()),
                new_password: Some("guru-pw".into()),
            })
            .await
            .unwrap();
        register(&controller, "a", "pw").await;
        controller
            .submit_score(json!({"studentName": "guru", "score": 1}))
            .await
            .unwrap();
        controller
            .submit_score(json!({"studentName": "a", "score": 2}))
            .await
            .unwrap();

        let reply = controller
            .delete_users(batch(&["guru", "a", "ghost"], "guru", "guru-pw"))
            .await
            .unwrap();

        assert_eq!(reply.deleted, 1);
        assert_eq!(reply.skipped, 1);

        let scores = controller.scores().await.unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].student_name(), Some("guru"));
    }

    #[tokio::test]
    async fn batch_delete_checks_requester_before_targets() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        let err = controller
            .delete_users(batch(&[], "admin", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = controller
            .delete_users(batch(&[], "admin", ADMIN_PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No users specified for deletion");

        let reply = controller
            .delete_users(batch(&["ghost"], "admin", ADMIN_PASSWORD))
            .await
            .unwrap();
        assert_eq!(reply.message, "Deleted 0 users.");
    }

    #[tokio::test]
    async fn submitted_score_is_stamped_by_the_server() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        let body = json!({
            "studentName": "siti",
            "questionsAnswered": 10,
            "score": 92.5,
            "timestamp": "1999-01-01T00:00:00.000Z",
        });
        let reply = controller.submit_score(body).await.unwrap();
        assert_eq!(reply.message, "Score saved");

        let scores = controller.scores().await.unwrap();
        assert_eq!(scores.len(), 1);

        let record = &scores[0];
        assert_eq!(record.fields["studentName"], "siti");
        assert_eq!(record.fields["questionsAnswered"], 10);
        assert_eq!(record.fields["score"], 92.5);
        assert_ne!(record.timestamp, "1999-01-01T00:00:00.000Z");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[tokio::test]
    async fn bootstrap_migrates_plaintext_passwords() {
        let dir = TempDir::new();
        std::fs::write(
            dir.path().join("users.json"),
            r#"[
                {"username": "admin", "password": "aloganteng03.", "role": "teacher"},
                {"username": "siti", "password": "pw1", "role": "student"}
            ]"#,
        )
        .unwrap();

        let controller = AccountController::new(Store::open(dir.path()).unwrap());
        controller.bootstrap(None).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert!(!raw.contains("aloganteng03."));
        assert!(!raw.contains("\"pw1\""));

        let reply = controller
            .login(login("admin", "aloganteng03."))
            .await
            .unwrap();
        assert_eq!(reply.role, Role::Teacher);
        assert!(controller.login(login("siti", "pw1")).await.is_ok());
    }

    #[tokio::test]
    async fn bootstrap_seeds_admin_once() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        controller.bootstrap(Some("other".into())).await.unwrap();

        let teachers = controller.users_with_role(Role::Teacher).await.unwrap();
        assert_eq!(teachers.len(), 1);
        assert!(controller
            .login(login("admin", ADMIN_PASSWORD))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn bootstrap_keeps_users_without_password() {
        let dir = TempDir::new();
        std::fs::write(
            dir.path().join("users.json"),
            r#"[
                {"username": "admin", "password": "aloganteng03.", "role": "teacher"},
                {"username": "siti", "password": "pw1", "role": "student"},
                {"username": "bob", "role": "teacher"}
            ]"#,
        )
        .unwrap();

        let controller = AccountController::new(Store::open(dir.path()).unwrap());
        controller.bootstrap(Some("fresh".into())).await.unwrap();

        assert!(controller.login(login("siti", "pw1")).await.is_ok());
        assert!(controller
            .login(login("admin", "aloganteng03."))
            .await
            .is_ok());

        let err = controller.login(login("bob", "")).await.unwrap_err();
        assert!(matches!(err, ApiError::IncorrectPassword));

        let teachers = controller.users_with_role(Role::Teacher).await.unwrap();
        let names = teachers.into_iter().map(|t| t.username).collect::<Vec<_>>();
        assert_eq!(names, vec!["admin", "bob"]);
    }

    #[tokio::test]
    async fn login_without_username_is_not_found() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        let err = controller
            .login(LoginRequest {
                username: None,
                password: Some("x".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn password_work_does_not_hold_the_store() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;
        let admin = controller
            .find_user(ADMIN_USERNAME.into())
            .await
            .unwrap()
            .unwrap();

        let _guard = controller.store.lock().unwrap();

        let stored = hash_password("pw".into()).await.unwrap();
        assert!(password::verify(&stored, "pw"));
        assert!(verify_password(&admin, ADMIN_PASSWORD.into()).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_teacher_keeps_scores_under_that_name() {
        let dir = TempDir::new();
        let controller = controller(&dir).await;

        for name in &["guru", "guru2"] {
            controller
                .create_teacher(CreateTeacherRequest {
                    requester_username: "admin".into(),
                    requester_password: ADMIN_PASSWORD.into(),
                    new_username: Some(name.to_string()),
                    new_password: Some("pw".into()),
                })
                .await
                .unwrap();
            controller
                .submit_score(json!({"studentName": name, "score": 1}))
                .await
                .unwrap();
        }

        controller
            .delete_user(DeleteUserRequest {
                target_username: "guru".into(),
                requester_username: "admin".into(),
                requester_password: ADMIN_PASSWORD.into(),
            })
            .await
            .unwrap();
        let reply = controller
            .delete_users(batch(&["guru2"], "admin", ADMIN_PASSWORD))
            .await
            .unwrap();
        assert_eq!(reply.deleted, 1);

        assert_eq!(controller.scores().await.unwrap().len(), 2);
        let teachers = controller.users_with_role(Role::Teacher).await.unwrap();
        assert_eq!(teachers.len(), 1);
    }
}
