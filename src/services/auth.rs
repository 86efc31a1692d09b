use crate::core::config::Config;
use crate::core::error::AuthError;
use crate::models::user::User;
use crate::stores::blob::{read_json, write_json, Credentials};
use crate::stores::kv::KeyValueStore;
use crate::utils::ids::{synthetic_password, synthetic_username};
use crate::utils::latency::Latency;
use crate::utils::time::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Username/password accounts held in one credential document
pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    latency: Latency,
    delay: Duration,
    users_key: String,
    max_username_attempts: u32,
}

impl AuthService {
    pub fn new(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        latency: Latency,
    ) -> Self {
        Self {
            store,
            clock,
            latency,
            delay: config.latency.auth(),
            users_key: config.storage.users_key.clone(),
            max_username_attempts: config.auth.max_username_attempts,
        }
    }

    /// Log in with an existing username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.latency.wait(self.delay).await;

        let users = self.users();
        match users.get(username) {
            Some(stored) if stored == password => {
                debug!(username = %username, "Login succeeded");
                Ok(User::new(username))
            }
            _ => {
                warn!(username = %username, "Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Register a new username with a password
    pub async fn signup(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.latency.wait(self.delay).await;

        let mut users = self.users();
        if users.contains_key(username) {
            warn!(username = %username, "Signup rejected, username taken");
            return Err(AuthError::UsernameTaken);
        }

        users.insert(username.to_string(), password.to_string());
        write_json(self.store.as_ref(), &self.users_key, &users);

        info!(username = %username, total_users = users.len(), "User signed up");
        Ok(User::new(username))
    }

    /// Register a generated `google_user_NNNN` account
    ///
    /// No identity provider is contacted; the account gets a placeholder
    /// password nobody knows.
    pub async fn google_signup(&self) -> Result<User, AuthError> {
        self.latency.wait(self.delay).await;

        let mut users = self.users();

        let mut rng = rand::rng();
        let mut username = synthetic_username(&mut rng);
        let mut attempts = 1;
        while users.contains_key(&username) && attempts < self.max_username_attempts {
            username = synthetic_username(&mut rng);
            attempts += 1;
        }

        if users.contains_key(&username) {
            warn!(attempts, "Synthetic username generation exhausted");
            return Err(AuthError::UsernameGenerationExhausted);
        }

        users.insert(username.clone(), synthetic_password(self.clock.now_millis()));
        write_json(self.store.as_ref(), &self.users_key, &users);

        info!(username = %username, attempts, "Synthetic user signed up");
        Ok(User::new(username))
    }

    fn users(&self) -> Credentials {
        read_json(self.store.as_ref(), &self.users_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::stores::memory_store::MemoryStore;
    use crate::utils::time::SystemClock;

    fn service_with(config: &Config) -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = AuthService::new(
            config,
            store.clone(),
            Arc::new(SystemClock),
            Latency::none(),
        );
        (service, store)
    }

    fn service() -> (AuthService, Arc<MemoryStore>) {
        service_with(&Config::default())
    }

    fn stored_users(store: &MemoryStore) -> Credentials {
        read_json(store, "color-picker-users")
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (auth, _) = service();

        let user = auth.signup("alice", "pw1").await.unwrap();
        assert_eq!(user, User::new("alice"));

        let user = auth.login("alice", "pw1").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (auth, _) = service();
        auth.signup("alice", "pw1").await.unwrap();

        let err = auth.login("alice", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (auth, _) = service();

        let err = auth.login("nobody", "pw").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_duplicate_signup_keeps_first_password() {
        let (auth, store) = service();
        auth.signup("alice", "pw1").await.unwrap();

        let err = auth.signup("alice", "pw2").await.unwrap_err();
        assert_eq!(err, AuthError::UsernameTaken);

        let users = stored_users(&store);
        assert_eq!(users.len(), 1);
        assert_eq!(users["alice"], "pw1");
        assert!(auth.login("alice", "pw2").await.is_err());
    }

    #[tokio::test]
    async fn test_login_is_case_sensitive() {
        let (auth, _) = service();
        auth.signup("alice", "Secret").await.unwrap();

        assert!(auth.login("Alice", "Secret").await.is_err());
        assert!(auth.login("alice", "secret").await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_credentials_read_as_empty() {
        let (auth, store) = service();
        store.set("color-picker-users", "{broken").unwrap();

        assert_eq!(
            auth.login("alice", "pw1").await.unwrap_err(),
            AuthError::InvalidCredentials
        );

        // Signup recovers by rewriting the document
        auth.signup("alice", "pw1").await.unwrap();
        assert!(auth.login("alice", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn test_signup_write_failure_is_silent() {
        let store = Arc::new(MemoryStore::with_quota(8));
        let auth = AuthService::new(
            &Config::default(),
            store.clone(),
            Arc::new(SystemClock),
            Latency::none(),
        );

        let user = auth.signup("alice", "pw1").await.unwrap();
        assert_eq!(user.username, "alice");

        // The write was dropped, so the account does not exist
        assert!(store.is_empty());
        assert!(auth.login("alice", "pw1").await.is_err());
    }

    #[tokio::test]
    async fn test_google_signup_creates_user() {
        let (auth, store) = service();

        let user = auth.google_signup().await.unwrap();
        let number: u32 = user
            .username
            .strip_prefix("google_user_")
            .unwrap()
            .parse()
            .unwrap();
        assert!((1000..=9999).contains(&number));

        let users = stored_users(&store);
        assert!(users[&user.username].starts_with("simulated_google_password_"));
    }

    #[tokio::test]
    async fn test_google_signup_avoids_existing_names() {
        let config = Config {
            auth: AuthConfig {
                max_username_attempts: 1_000_000,
            },
            ..Config::default()
        };
        let (auth, store) = service_with(&config);

        // Leave exactly one free synthetic name
        let mut users = Credentials::new();
        for n in 1000..=9999 {
            if n != 4242 {
                users.insert(format!("google_user_{}", n), "taken".to_string());
            }
        }
        write_json(&*store, "color-picker-users", &users);

        let user = auth.google_signup().await.unwrap();
        assert_eq!(user.username, "google_user_4242");
        assert_eq!(stored_users(&store).len(), 9000);
    }

    #[tokio::test]
    async fn test_google_signup_exhausted() {
        let (auth, store) = service();

        let mut users = Credentials::new();
        for n in 1000..=9999 {
            users.insert(format!("google_user_{}", n), "taken".to_string());
        }
        write_json(&*store, "color-picker-users", &users);

        let err = auth.google_signup().await.unwrap_err();
        assert_eq!(err, AuthError::UsernameGenerationExhausted);
        assert_eq!(stored_users(&store).len(), 9000);
    }

    #[tokio::test]
    async fn test_operations_request_auth_latency() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let latency = Latency::from_fn(move |duration| {
            recorder.lock().unwrap().push(duration);
            Box::pin(async {})
        });

        let auth = AuthService::new(
            &Config::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            latency,
        );

        auth.signup("alice", "pw1").await.unwrap();
        auth.login("alice", "pw1").await.unwrap();
        auth.google_signup().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Duration::from_millis(500); 3]);
    }
}
