/// Authentication service - JWT, password handling and identity resolution
use crate::error::{Result, ServerError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use contacts_core::{Identity, IdentityStore, UserId};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
    bcrypt_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Credentials carried by an `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer(String),
}

impl Credentials {
    /// Parse an `Authorization` header value
    ///
    /// Returns `None` for schemes this server does not understand.
    pub fn parse(header: &str) -> Result<Option<Self>> {
        let (scheme, value) = match header.split_once(' ') {
            Some((scheme, value)) => (scheme, value.trim()),
            None => return Ok(None),
        };

        if scheme.eq_ignore_ascii_case("bearer") {
            return Ok(Some(Credentials::Bearer(value.to_string())));
        }

        if scheme.eq_ignore_ascii_case("basic") {
            let decoded = STANDARD
                .decode(value)
                .map_err(|_| ServerError::Auth("Invalid basic header".to_string()))?;
            let decoded = String::from_utf8(decoded)
                .map_err(|_| ServerError::Auth("Invalid basic header".to_string()))?;
            let (username, password) = decoded
                .split_once(':')
                .ok_or_else(|| ServerError::Auth("Invalid basic header".to_string()))?;

            return Ok(Some(Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            }));
        }

        Ok(None)
    }
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64, refresh_expiration_days: u64) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
            refresh_token_expiration: Duration::days(refresh_expiration_days as i64),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Override the bcrypt work factor used for new hashes
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Create an access token
    pub fn create_access_token(&self, user_id: UserId) -> Result<String> {
        self.create_token(user_id, TokenType::Access, self.access_token_expiration)
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, user_id: UserId) -> Result<String> {
        self.create_token(user_id, TokenType::Refresh, self.refresh_token_expiration)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify that a token is an access token
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        self.verify_typed(token, TokenType::Access)
    }

    /// Verify that a token is a refresh token
    pub fn verify_refresh_token(&self, token: &str) -> Result<UserId> {
        self.verify_typed(token, TokenType::Refresh)
    }

    /// Check a username/password pair against the identity store
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn authenticate(
        &self,
        store: &dyn IdentityStore,
        username: &str,
        password: &str,
    ) -> Result<Identity> {
        let (user, hash) = store
            .find_credentials(username)
            .await?
            .ok_or_else(|| ServerError::Auth(INVALID_CREDENTIALS.to_string()))?;

        // bcrypt is CPU-bound; keep it off the async workers
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ServerError::Internal(format!("Password check task failed: {}", e)))??;

        if !matches {
            return Err(ServerError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        Ok(Identity::from(user))
    }

    /// Resolve the identity behind an `Authorization` header
    ///
    /// A missing header or an unknown scheme yields `Identity::Anonymous`;
    /// credentials that are present but wrong are an error.
    pub async fn resolve_identity(
        &self,
        store: &dyn IdentityStore,
        header: Option<&str>,
    ) -> Result<Identity> {
        let credentials = match header {
            Some(header) => Credentials::parse(header)?,
            None => None,
        };

        match credentials {
            None => Ok(Identity::Anonymous),
            Some(Credentials::Basic { username, password }) => {
                self.authenticate(store, &username, &password).await
            }
            Some(Credentials::Bearer(token)) => {
                let user_id = self.verify_access_token(&token)?;
                let user = store.get_user(user_id).await.map_err(|e| {
                    if e.is_not_found() {
                        ServerError::Auth("Token user no longer exists".to_string())
                    } else {
                        ServerError::from(e)
                    }
                })?;
                Ok(Identity::from(user))
            }
        }
    }

    fn verify_typed(&self, token: &str, expected: TokenType) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        if claims.token_type != expected {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ServerError::Auth("Invalid token subject".to_string()))
    }

    fn create_token(
        &self,
        user_id: UserId,
        token_type: TokenType,
        expiration: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}
