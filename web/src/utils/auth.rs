use std::fmt::Display;
use std::sync::Arc;

use shared_types::UserSession;
use tracing::{debug, info, warn};

use crate::db::store::{read_json, write_json, DurableStore, USER_KEY};
use crate::services::auth::{AuthService, NewAccount, SocialProvider};
use crate::utils::validation::{
    validate_email, validate_find_username, validate_new_password, validate_reset_request,
    LoginForm, RegistrationForm,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(UserSession),
}

/// Account-recovery progress: which account proved it owns the reset code.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VerifiedReset {
    username: String,
    email: String,
    code: String,
}

/// Who is signed in, mirrored to the `user` key.
///
/// Operations report success as a `bool`; on failure the reason is kept in
/// [`SessionManager::last_error`] and the session state is left unchanged.
pub struct SessionManager {
    store: Arc<dyn DurableStore>,
    auth: Arc<dyn AuthService>,
    state: SessionState,
    last_error: Option<String>,
    verified_emails: Vec<String>,
    reset: Option<VerifiedReset>,
}

impl SessionManager {
    /// Restores a persisted session. A missing or undecodable `user` entry
    /// leaves the manager anonymous.
    pub fn new(store: Arc<dyn DurableStore>, auth: Arc<dyn AuthService>) -> Self {
        let state = match read_json::<UserSession>(store.as_ref(), USER_KEY) {
            Ok(Some(user)) => {
                debug!("Restored session for {}", user.username);
                SessionState::Authenticated(user)
            }
            Ok(None) => SessionState::Anonymous,
            Err(e) => {
                warn!("Failed to parse user from store: {}", e);
                if let Err(e) = store.remove(USER_KEY) {
                    warn!("Failed to clear corrupt user entry: {}", e);
                }
                SessionState::Anonymous
            }
        };

        Self {
            store,
            auth,
            state,
            last_error: None,
            verified_emails: Vec::new(),
            reset: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&UserSession> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Reason the most recent operation failed, if it did.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_email_verified(&self, email: &str) -> bool {
        self.verified_emails.iter().any(|e| e == email)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        self.last_error = None;
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        if let Err(errors) = form.validate() {
            return self.fail(errors);
        }

        match self.auth.login(username.trim(), password).await {
            Ok(user) => self.sign_in(user),
            Err(e) => self.fail(e),
        }
    }

    /// Creates the account and signs straight into it.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        email: &str,
        phone: &str,
    ) -> bool {
        self.last_error = None;
        let account = NewAccount {
            username: username.trim().to_string(),
            password: password.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        };
        let form = RegistrationForm {
            username: account.username.clone(),
            password: account.password.clone(),
            confirm_password: account.password.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            agree_terms: true,
        };
        if let Err(errors) = form.validate_account() {
            return self.fail(errors);
        }

        self.create_account(&account).await
    }

    /// The sign-up page path: also requires the confirmation field, the
    /// terms box and a verified email.
    pub async fn register_with_form(&mut self, form: &RegistrationForm) -> bool {
        self.last_error = None;
        if let Err(errors) = form.validate(self.is_email_verified(&form.email)) {
            return self.fail(errors);
        }

        let account = NewAccount {
            username: form.username.trim().to_string(),
            password: form.password.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
        };
        self.create_account(&account).await
    }

    pub async fn social_login(&mut self, provider: SocialProvider) -> bool {
        self.last_error = None;
        match self.auth.social_login(provider).await {
            Ok(user) => self.sign_in(user),
            Err(e) => self.fail(format!("{provider} login failed: {e}")),
        }
    }

    /// Always ends anonymous, even if the backend call fails.
    pub async fn logout(&mut self) {
        self.last_error = None;
        if let SessionState::Authenticated(user) = std::mem::take(&mut self.state) {
            if let Err(e) = self.auth.logout(&user).await {
                warn!("Logout call failed for {}: {}", user.username, e);
            }
            info!("Signed out {}", user.username);
        }

        if let Err(e) = self.store.remove(USER_KEY) {
            warn!("Failed to clear stored user: {}", e);
        }
    }

    pub async fn send_verification_code(&mut self, email: &str) -> bool {
        self.last_error = None;
        if let Err(errors) = validate_email(email) {
            return self.fail(errors);
        }

        match self.auth.send_verification_code(email).await {
            Ok(()) => true,
            Err(e) => self.fail(e),
        }
    }

    pub async fn verify_email(&mut self, email: &str, code: &str) -> bool {
        self.last_error = None;
        if code.is_empty() {
            return self.fail("Enter the verification code.");
        }

        match self.auth.verify_email(email, code).await {
            Ok(()) => {
                if !self.is_email_verified(email) {
                    self.verified_emails.push(email.to_string());
                }
                true
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn find_username(&mut self, email: &str, phone: &str) -> Option<String> {
        self.last_error = None;
        if let Err(errors) = validate_find_username(email, phone) {
            self.fail(errors);
            return None;
        }

        match self.auth.find_username(email, phone).await {
            Ok(username) => Some(username),
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    pub async fn send_password_reset_code(
        &mut self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> bool {
        self.last_error = None;
        self.reset = None;
        if let Err(errors) = validate_reset_request(username, email, phone) {
            return self.fail(errors);
        }

        match self.auth.send_password_reset_code(username, email, phone).await {
            Ok(()) => true,
            Err(e) => self.fail(e),
        }
    }

    pub async fn verify_password_reset_code(
        &mut self,
        username: &str,
        email: &str,
        code: &str,
    ) -> bool {
        self.last_error = None;
        if code.is_empty() {
            return self.fail("Enter the verification code.");
        }

        match self.auth.verify_password_reset_code(username, email, code).await {
            Ok(()) => {
                self.reset = Some(VerifiedReset {
                    username: username.to_string(),
                    email: email.to_string(),
                    code: code.to_string(),
                });
                true
            }
            Err(e) => self.fail(e),
        }
    }

    /// Sets a new password for the account verified by
    /// [`Self::verify_password_reset_code`]. Does not sign in.
    pub async fn reset_password(&mut self, new_password: &str, confirm_password: &str) -> bool {
        self.last_error = None;
        let Some(reset) = self.reset.clone() else {
            return self.fail("Verify the reset code first.");
        };
        if let Err(errors) = validate_new_password(new_password, confirm_password) {
            return self.fail(errors);
        }

        match self
            .auth
            .reset_password(&reset.username, &reset.email, &reset.code, new_password)
            .await
        {
            Ok(()) => {
                self.reset = None;
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn create_account(&mut self, account: &NewAccount) -> bool {
        match self.auth.register(account).await {
            Ok(user) => self.sign_in(user),
            Err(e) => self.fail(e),
        }
    }

    fn sign_in(&mut self, user: UserSession) -> bool {
        info!("Signed in {}", user.username);
        if let Err(e) = write_json(self.store.as_ref(), USER_KEY, &user) {
            warn!("Failed to save session: {}", e);
        }
        self.state = SessionState::Authenticated(user);
        true
    }

    fn fail(&mut self, reason: impl Display) -> bool {
        let reason = reason.to_string();
        debug!("Auth operation failed: {}", reason);
        self.last_error = Some(reason);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use crate::services::auth::{MockAuthService, DEMO_EMAIL, DEMO_PASSWORD, DEMO_PHONE, DEMO_USERNAME};

    fn parts() -> (Arc<dyn DurableStore>, Arc<dyn AuthService>) {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let auth: Arc<dyn AuthService> = Arc::new(MockAuthService::new("123456", 4).unwrap());
        (store, auth)
    }

    #[tokio::test]
    async fn starts_anonymous_without_stored_user() {
        let (store, auth) = parts();
        let session = SessionManager::new(store, auth);
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn login_persists_and_restores() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(Arc::clone(&store), Arc::clone(&auth));

        assert!(session.login(DEMO_USERNAME, DEMO_PASSWORD).await);
        let user = session.current_user().cloned().unwrap();
        assert_eq!(user.username, DEMO_USERNAME);

        let restored = SessionManager::new(store, auth);
        assert_eq!(restored.state(), &SessionState::Authenticated(user));
    }

    #[tokio::test]
    async fn failed_login_stays_anonymous_with_reason() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(Arc::clone(&store), auth);

        assert!(!session.login(DEMO_USERNAME, "nope").await);
        assert!(!session.is_authenticated());
        assert!(session.last_error().unwrap().contains("Login failed"));
        assert_eq!(store.get(USER_KEY).unwrap(), None);

        assert!(!session.login("", "").await);
        assert_eq!(
            session.last_error(),
            Some("Enter your username. Enter your password.")
        );
    }

    #[tokio::test]
    async fn register_signs_in() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(store, auth);

        assert!(
            session
                .register("grandpa", "secret12", "grandpa@example.com", "010-2222-3333")
                .await
        );
        assert_eq!(session.current_user().unwrap().username, "grandpa");
        assert!(session.last_error().is_none());

        assert!(!session.register("ab", "x", "bad", "123").await);
        assert_eq!(session.current_user().unwrap().username, "grandpa");
    }

    #[tokio::test]
    async fn form_registration_requires_verified_email() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(store, auth);
        let form = RegistrationForm {
            username: "grandma".to_string(),
            password: "secret12".to_string(),
            confirm_password: "secret12".to_string(),
            email: "grandma@example.com".to_string(),
            phone: "010-1111-2222".to_string(),
            agree_terms: true,
        };

        assert!(!session.register_with_form(&form).await);
        assert_eq!(session.last_error(), Some("Email verification is required."));

        assert!(session.send_verification_code(&form.email).await);
        assert!(!session.verify_email(&form.email, "000000").await);
        assert!(session.verify_email(&form.email, "123456").await);
        assert!(!session.is_authenticated());

        assert!(session.register_with_form(&form).await);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn social_login_and_logout() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(Arc::clone(&store), auth);

        assert!(session.social_login(SocialProvider::Google).await);
        assert_eq!(session.current_user().unwrap().id, "google_user123");
        assert!(store.get(USER_KEY).unwrap().is_some());

        session.logout().await;
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(store.get(USER_KEY).unwrap(), None);

        // logging out twice is harmless
        session.logout().await;
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn corrupt_stored_user_is_discarded() {
        let (store, auth) = parts();
        store.set(USER_KEY, "not json").unwrap();

        let session = SessionManager::new(Arc::clone(&store), auth);
        assert!(!session.is_authenticated());
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_email_is_not_sent() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(store, auth);
        assert!(!session.send_verification_code("no-at-sign").await);
        assert_eq!(session.last_error(), Some("Enter a valid email address."));
    }

    #[tokio::test]
    async fn account_recovery() {
        let (store, auth) = parts();
        let mut session = SessionManager::new(store, auth);

        assert_eq!(
            session.find_username(DEMO_EMAIL, DEMO_PHONE).await.as_deref(),
            Some(DEMO_USERNAME)
        );
        assert_eq!(session.find_username("", DEMO_PHONE).await, None);
        assert!(session.last_error().is_some());

        assert!(!session.reset_password("newpass1", "newpass1").await);
        assert_eq!(session.last_error(), Some("Verify the reset code first."));

        assert!(
            session
                .send_password_reset_code(DEMO_USERNAME, DEMO_EMAIL, DEMO_PHONE)
                .await
        );
        assert!(
            session
                .verify_password_reset_code(DEMO_USERNAME, DEMO_EMAIL, "123456")
                .await
        );
        assert!(!session.reset_password("newpass1", "newpass2").await);
        assert!(session.reset_password("newpass1", "newpass1").await);
        assert!(!session.is_authenticated());

        assert!(session.login(DEMO_USERNAME, "newpass1").await);
    }
}
