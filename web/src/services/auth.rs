use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::UserSession;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::AuthError;

type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Kakao,
    Google,
}

impl SocialProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            SocialProvider::Kakao => "kakao",
            SocialProvider::Google => "google",
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kakao" => Ok(SocialProvider::Kakao),
            "google" => Ok(SocialProvider::Google),
            other => Err(format!("unsupported login provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: String,
}

/// Everything the app asks of an identity backend. Each call either yields
/// the signed-in principal or an `AuthError` whose message is shown as-is.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> AuthResult<UserSession>;

    async fn register(&self, account: &NewAccount) -> AuthResult<UserSession>;

    async fn social_login(&self, provider: SocialProvider) -> AuthResult<UserSession>;

    async fn logout(&self, session: &UserSession) -> AuthResult<()>;

    async fn send_verification_code(&self, email: &str) -> AuthResult<()>;

    async fn verify_email(&self, email: &str, code: &str) -> AuthResult<()>;

    async fn find_username(&self, email: &str, phone: &str) -> AuthResult<String>;

    async fn send_password_reset_code(
        &self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> AuthResult<()>;

    async fn verify_password_reset_code(
        &self,
        username: &str,
        email: &str,
        code: &str,
    ) -> AuthResult<()>;

    async fn reset_password(
        &self,
        username: &str,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> AuthResult<()>;
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    username: String,
    email: String,
    phone: String,
    password_hash: String,
}

impl Account {
    fn session(&self) -> UserSession {
        UserSession {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: Some(self.phone.clone()),
        }
    }
}

pub const DEMO_USERNAME: &str = "user123";
pub const DEMO_EMAIL: &str = "user@example.com";
pub const DEMO_PHONE: &str = "010-1234-5678";
pub const DEMO_PASSWORD: &str = "password123";

/// In-memory stand-in for the identity backend. Accounts live for the life of
/// the service; passwords are bcrypt-hashed. Every verification code equals
/// the configured one, so this must never back a real deployment.
pub struct MockAuthService {
    accounts: Mutex<Vec<Account>>,
    verification_code: String,
    bcrypt_cost: u32,
}

impl MockAuthService {
    /// Starts with the demo account `user123` / `password123`.
    pub fn new(verification_code: impl Into<String>, bcrypt_cost: u32) -> AuthResult<Self> {
        let demo = Account {
            id: DEMO_USERNAME.to_string(),
            username: DEMO_USERNAME.to_string(),
            email: DEMO_EMAIL.to_string(),
            phone: DEMO_PHONE.to_string(),
            password_hash: bcrypt::hash(DEMO_PASSWORD, bcrypt_cost)?,
        };

        Ok(Self {
            accounts: Mutex::new(vec![demo]),
            verification_code: verification_code.into(),
            bcrypt_cost,
        })
    }

    pub fn from_config(config: &AppConfig) -> AuthResult<Self> {
        Self::new(config.verification_code.clone(), config.bcrypt_cost)
    }

    fn accounts(&self) -> MutexGuard<'_, Vec<Account>> {
        // each mutation is a single push or field write, so a poisoned list is still consistent
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_code(&self, code: &str) -> AuthResult<()> {
        if code == self.verification_code {
            Ok(())
        } else {
            Err(AuthError::InvalidVerificationCode)
        }
    }

    fn find_account(&self, username: &str, email: &str, phone: Option<&str>) -> AuthResult<Account> {
        self.accounts()
            .iter()
            .find(|a| {
                a.username == username && a.email == email && phone.map_or(true, |p| a.phone == p)
            })
            .cloned()
            .ok_or(AuthError::AccountNotFound)
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, username: &str, password: &str) -> AuthResult<UserSession> {
        let account = self
            .accounts()
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(account.session())
    }

    async fn register(&self, account: &NewAccount) -> AuthResult<UserSession> {
        let password_hash = bcrypt::hash(&account.password, self.bcrypt_cost)?;

        let mut accounts = self.accounts();
        if accounts.iter().any(|a| a.username == account.username) {
            return Err(AuthError::UsernameTaken(account.username.clone()));
        }

        let created = Account {
            id: format!("user_{}", accounts.len() + 1),
            username: account.username.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            password_hash,
        };
        info!("Registered account {}", created.id);
        let session = created.session();
        accounts.push(created);
        Ok(session)
    }

    async fn social_login(&self, provider: SocialProvider) -> AuthResult<UserSession> {
        Ok(UserSession {
            id: format!("{provider}_user123"),
            username: format!("{provider}User"),
            email: format!("{provider}@example.com"),
            phone: None,
        })
    }

    async fn logout(&self, session: &UserSession) -> AuthResult<()> {
        debug!("Mock logout for {}", session.id);
        Ok(())
    }

    async fn send_verification_code(&self, email: &str) -> AuthResult<()> {
        debug!("Pretending to mail a verification code to {}", email);
        Ok(())
    }

    async fn verify_email(&self, _email: &str, code: &str) -> AuthResult<()> {
        self.check_code(code)
    }

    async fn find_username(&self, email: &str, phone: &str) -> AuthResult<String> {
        self.accounts()
            .iter()
            .find(|a| a.email == email && a.phone == phone)
            .map(|a| a.username.clone())
            .ok_or(AuthError::AccountNotFound)
    }

    async fn send_password_reset_code(
        &self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> AuthResult<()> {
        self.find_account(username, email, Some(phone)).map(|_| ())
    }

    async fn verify_password_reset_code(
        &self,
        username: &str,
        email: &str,
        code: &str,
    ) -> AuthResult<()> {
        self.find_account(username, email, None)?;
        self.check_code(code)
    }

    async fn reset_password(
        &self,
        username: &str,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        self.check_code(code)?;
        let password_hash = bcrypt::hash(new_password, self.bcrypt_cost)?;

        let mut accounts = self.accounts();
        let account = accounts
            .iter_mut()
            .find(|a| a.username == username && a.email == email)
            .ok_or(AuthError::AccountNotFound)?;
        account.password_hash = password_hash;
        info!("Password reset for {}", account.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MockAuthService {
        MockAuthService::new("123456", 4).unwrap()
    }

    #[tokio::test]
    async fn demo_account_logs_in() {
        let auth = service();
        let session = auth.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        assert_eq!(session.email, DEMO_EMAIL);
        assert_eq!(session.phone.as_deref(), Some(DEMO_PHONE));

        assert!(matches!(
            auth.login(DEMO_USERNAME, "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost", DEMO_PASSWORD).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn register_rejects_taken_username() {
        let auth = service();
        let account = NewAccount {
            username: "grandma".to_string(),
            password: "secret12".to_string(),
            email: "grandma@example.com".to_string(),
            phone: "010-9999-0000".to_string(),
        };
        let session = auth.register(&account).await.unwrap();
        assert_eq!(session.id, "user_2");
        assert!(auth.login("grandma", "secret12").await.is_ok());

        assert!(matches!(
            auth.register(&account).await,
            Err(AuthError::UsernameTaken(name)) if name == "grandma"
        ));
    }

    #[tokio::test]
    async fn social_login_names_provider() {
        let session = service().social_login(SocialProvider::Kakao).await.unwrap();
        assert_eq!(session.id, "kakao_user123");
        assert_eq!(session.username, "kakaoUser");
        assert_eq!(session.phone, None);
    }

    #[tokio::test]
    async fn recovery_flow() {
        let auth = service();
        assert_eq!(
            auth.find_username(DEMO_EMAIL, DEMO_PHONE).await.unwrap(),
            DEMO_USERNAME
        );
        assert!(auth.find_username(DEMO_EMAIL, "010-0000-0000").await.is_err());

        auth.send_password_reset_code(DEMO_USERNAME, DEMO_EMAIL, DEMO_PHONE)
            .await
            .unwrap();
        assert!(matches!(
            auth.verify_password_reset_code(DEMO_USERNAME, DEMO_EMAIL, "000000").await,
            Err(AuthError::InvalidVerificationCode)
        ));
        auth.reset_password(DEMO_USERNAME, DEMO_EMAIL, "123456", "brand-new")
            .await
            .unwrap();

        assert!(auth.login(DEMO_USERNAME, DEMO_PASSWORD).await.is_err());
        assert!(auth.login(DEMO_USERNAME, "brand-new").await.is_ok());
    }

    #[test]
    fn provider_parsing() {
        assert_eq!("Kakao".parse::<SocialProvider>(), Ok(SocialProvider::Kakao));
        assert!("naver".parse::<SocialProvider>().is_err());
    }
}
