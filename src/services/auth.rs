//! Authentication service
//!
//! Registration, login, and the token pipeline: a signed session token is
//! issued for the user id, then sealed by the transport cipher before it
//! leaves the server. Opening runs the two steps in reverse; every failure
//! along the way collapses into the same 401 so callers cannot probe which
//! step rejected them.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{AuthResponse, LoginRequest, RegisterRequest, Role, User},
    repository::Repository,
    token::{cipher, session},
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account and log it in
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = self.hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Member);

        let user = self
            .repository
            .users
            .create(&request.name, &request.email, &password_hash, role)
            .await?;

        self.auth_response(user)
    }

    /// Authenticate by email and password
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = self
            .repository
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, &request.password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        self.auth_response(user)
    }

    /// Resolve a transport token back to its user
    ///
    /// Unseals the transport layer, verifies the session claims, and loads
    /// the account. Any failure is reported as the same authentication
    /// error so the response does not leak which step failed.
    pub async fn authenticate_token(&self, transport_token: &str) -> AppResult<User> {
        let unauthorized = || AppError::Authentication("Not authorized, token failed".to_string());

        let session_token = cipher::open(transport_token, &self.config.cipher_secret)
            .map_err(|err| {
                tracing::debug!("transport token rejected: {}", err);
                unauthorized()
            })?;

        let user_id = session::verify(&session_token, &self.config.session_secret)
            .map_err(|err| {
                tracing::debug!("session token rejected: {}", err);
                unauthorized()
            })?;

        self.repository
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(unauthorized)
    }

    /// Issue a sealed transport token for the user
    pub fn issue_transport_token(&self, user: &User) -> AppResult<String> {
        let session_token = session::issue(
            user.id,
            &self.config.session_secret,
            self.config.session_lifetime_days,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))?;

        Ok(cipher::seal(&session_token, &self.config.cipher_secret))
    }

    fn auth_response(&self, user: User) -> AppResult<AuthResponse> {
        let token = self.issue_transport_token(&user)?;

        Ok(AuthResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        })
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(&user.password)
            .map_err(|e| AppError::Internal(format!("Stored password hash invalid: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
