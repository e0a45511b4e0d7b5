// ABOUTME: Session-based authentication over the users collection: login, register, logout, permissions.
// ABOUTME: The signed-in user's full record is kept under its own key, outside the collection namespace.

use gym_core::{Clock, Document, Entity, Filter, NewUser, Record, Role, User};
use thiserror::Error;

use crate::backend::StorageBackend;
use crate::store::{KEY_PREFIX, RecordStore, SESSION_NAME, StoreError, to_document};

/// Storage key holding the current session's user record.
pub fn session_key() -> String {
    format!("{KEY_PREFIX}{SESSION_NAME}")
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Authentication bound to a record store for the duration of a borrow.
pub struct Auth<'s, B, C> {
    store: &'s mut RecordStore<B, C>,
}

impl<B: StorageBackend, C: Clock> RecordStore<B, C> {
    pub fn auth(&mut self) -> Auth<'_, B, C> {
        Auth { store: self }
    }
}

impl<B: StorageBackend, C: Clock> Auth<'_, B, C> {
    /// Sign in with an exact email and password match. On success the user's
    /// stored document becomes the current session; on failure the session
    /// is untouched.
    pub fn login(&mut self, email: &str, password: &str) -> Result<Option<Record<User>>, AuthError> {
        let filter = Filter::new()
            .field("email", email)
            .field("password", password);
        let found = self
            .store
            .read_documents(User::COLLECTION, &filter)
            .into_iter()
            .find_map(|doc| {
                let user = Record::<User>::from_document(doc.clone()).ok()?;
                Some((doc, user))
            });
        let Some((doc, user)) = found else {
            tracing::info!("login failed for {}", email);
            return Ok(None);
        };

        self.store.write_value(&session_key(), &doc)?;
        tracing::info!("user {} signed in as {}", user.id, user.data.role);
        Ok(Some(user))
    }

    /// Create an account and sign it in. An email already present in the
    /// users collection is rejected and nothing is written.
    pub fn register(&mut self, new_user: NewUser) -> Result<Record<User>, AuthError> {
        let same_email = Filter::new().field("email", new_user.email.as_str());
        let taken = !self
            .store
            .read_documents(User::COLLECTION, &same_email)
            .is_empty();
        if taken {
            tracing::info!("registration rejected, {} already exists", new_user.email);
            return Err(AuthError::DuplicateEmail(new_user.email));
        }

        let fields = to_document(&new_user.into_user())?;
        let doc = self.store.create_document(User::COLLECTION, fields)?;
        let user = Record::<User>::from_document(doc.clone()).map_err(StoreError::from)?;
        self.store.write_value(&session_key(), &doc)?;
        tracing::info!("registered user {} ({})", user.id, user.data.email);
        Ok(user)
    }

    /// The signed-in user, if any. Unparsable session data reads as nobody.
    pub fn current_user(&self) -> Option<Record<User>> {
        let doc: Document = self.store.read_value(&session_key())?;
        match Record::<User>::from_document(doc) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("ignoring session that is not a user record: {}", e);
                None
            }
        }
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.remove_value(&session_key())?;
        tracing::info!("signed out");
        Ok(())
    }

    /// True when someone is signed in with a role at or above `required`.
    pub fn has_permission(&self, required: Role) -> bool {
        self.current_user()
            .is_some_and(|user| user.data.role.satisfies(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use gym_core::Status;

    fn store_with_admin() -> RecordStore<MemoryBackend> {
        let mut store = RecordStore::new(MemoryBackend::new());
        store
            .create(User {
                name: "Administrador".to_string(),
                email: "admin@gym.com".to_string(),
                password: "admin123".to_string(),
                role: Role::Admin,
                status: Status::Active,
                phone: None,
            })
            .unwrap();
        store
    }

    #[test]
    fn login_with_valid_credentials_starts_session() {
        let mut store = store_with_admin();
        let mut auth = store.auth();

        let user = auth.login("admin@gym.com", "admin123").unwrap().unwrap();
        assert_eq!(user.data.name, "Administrador");
        assert_eq!(auth.current_user(), Some(user));
        assert!(auth.has_permission(Role::Admin));
        assert!(auth.has_permission(Role::Member));
    }

    #[test]
    fn login_with_wrong_password_leaves_session_empty() {
        let mut store = store_with_admin();
        let mut auth = store.auth();

        assert!(auth.login("admin@gym.com", "wrong").unwrap().is_none());
        assert!(auth.login("nobody@gym.com", "admin123").unwrap().is_none());
        assert!(auth.current_user().is_none());
        assert!(!auth.has_permission(Role::Member));
    }

    #[test]
    fn register_defaults_to_active_member_and_signs_in() {
        let mut store = RecordStore::new(MemoryBackend::new());
        let mut auth = store.auth();

        let user = auth
            .register(NewUser::new("Ana", "ana@ejemplo.com", "clave"))
            .unwrap();
        assert_eq!(user.data.role, Role::Member);
        assert_eq!(user.data.status, Status::Active);
        assert_eq!(auth.current_user().map(|u| u.id), Some(user.id));
        assert!(auth.has_permission(Role::Member));
        assert!(!auth.has_permission(Role::Coach));
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let mut store = store_with_admin();
        let err = store
            .auth()
            .register(NewUser::new("Otro", "admin@gym.com", "x"))
            .unwrap_err();

        assert!(matches!(err, AuthError::DuplicateEmail(ref email) if email == "admin@gym.com"));
        assert_eq!(store.all::<User>().len(), 1);
        assert!(store.auth().current_user().is_none());
    }

    #[test]
    fn logout_clears_session() {
        let mut store = store_with_admin();
        let mut auth = store.auth();
        auth.login("admin@gym.com", "admin123").unwrap();

        auth.logout().unwrap();
        assert!(auth.current_user().is_none());
        auth.logout().unwrap();
    }

    #[test]
    fn garbage_session_reads_as_signed_out() {
        let mut backend = MemoryBackend::new();
        backend.set(&session_key(), "{oops").unwrap();
        let mut store = RecordStore::new(backend);

        assert!(store.auth().current_user().is_none());
        assert!(!store.auth().has_permission(Role::Member));
    }

    #[test]
    fn login_accepts_seeded_admin_without_updated_at() {
        let mut backend = MemoryBackend::new();
        backend
            .set(
                "gym_users",
                r#"[{"id":"admin_force","name":"Administrador","email":"admin@gym.com","password":"admin123","role":"admin","status":"active","created_at":"2024-05-02T08:30:00.000Z"},{"id":"coach_force","name":"Coach Principal","email":"coach@gym.com","password":"coach123","role":"coach","status":"active","created_at":"2024-05-02T08:30:00.000Z"}]"#,
            )
            .unwrap();
        let mut store = RecordStore::new(backend);
        let mut auth = store.auth();

        let admin = auth.login("admin@gym.com", "admin123").unwrap().unwrap();
        assert_eq!(admin.id, "admin_force");
        assert_eq!(admin.updated_at, admin.created_at);
        assert_eq!(auth.current_user().map(|u| u.id), Some("admin_force".to_string()));
        assert!(auth.has_permission(Role::Admin));
    }

    #[test]
    fn session_keeps_fields_outside_the_user_schema() {
        let mut backend = MemoryBackend::new();
        backend
            .set(
                "gym_users",
                r#"[{"id":"u1","name":"Ana","email":"ana@gym.com","password":"x","role":"member","status":"active","member_since":"2023","created_at":"2024-01-01T00:00:00.000Z","updated_at":"2024-01-01T00:00:00.000Z"}]"#,
            )
            .unwrap();
        let mut store = RecordStore::new(backend);
        store.auth().login("ana@gym.com", "x").unwrap().unwrap();

        let raw = store.backend().get(&session_key()).unwrap().unwrap();
        let session: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(session["member_since"], serde_json::json!("2023"));
        assert_eq!(session["id"], serde_json::json!("u1"));
    }

    #[test]
    fn session_is_not_listed_as_a_collection() {
        let mut store = store_with_admin();
        store.auth().login("admin@gym.com", "admin123").unwrap();

        assert_eq!(store.collections().unwrap(), ["users"]);
    }
}
