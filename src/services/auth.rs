use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::NaiveDateTime;
use pushkind_common::routes::check_role;
use rand::Rng;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::merchant::Merchant;
use crate::forms::auth::LoginForm;
use crate::models::config::ServerConfig;
use crate::repository::MerchantReader;
use crate::services::{ServiceError, ServiceResult};

/// Body returned by a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub merchant: Merchant,
}

/// Argon2id hash of `password` in PHC string format.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|err| ServiceError::Internal(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

/// Whether `password` matches a stored PHC hash. Unparseable hashes never match.
pub fn verify_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Exchange merchant credentials for a bearer token.
pub fn login<R>(
    repo: &R,
    config: &ServerConfig,
    form: LoginForm,
    now: NaiveDateTime,
) -> ServiceResult<LoginResponse>
where
    R: MerchantReader + ?Sized,
{
    let (username, password) = form
        .into_credentials()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let merchant = repo
        .get_merchant_by_username(&username)?
        .filter(|merchant| verify_password(&merchant.password_hash, &password))
        .ok_or(ServiceError::Unauthorized)?;

    let claims = AuthenticatedUser::for_merchant(&merchant, now, config.token_ttl_hours);
    let token = claims
        .encode_token(&config.secret_key)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;

    log::info!("Merchant {} logged in", merchant.id);
    Ok(LoginResponse { token, merchant })
}

/// The merchant behind a bearer token.
pub fn current_merchant<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Merchant>
where
    R: MerchantReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_merchant_by_id(user.merchant_id)?
        .ok_or(ServiceError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merchant::MerchantSettings;
    use crate::repository::mock::MockMerchantReader;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .and_then(|d| d.and_hms_opt(8, 0, 0))
            .expect("valid datetime")
    }

    fn merchant(password_hash: String) -> Merchant {
        Merchant {
            id: 7,
            name: "Glow Studio".into(),
            subdomain: "glow".into(),
            email: "owner@glow.test".into(),
            username: "glow".into(),
            password_hash,
            timezone: "Australia/Sydney".into(),
            currency: "AUD".into(),
            settings: MerchantSettings::default(),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn hashed_passwords_verify() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret!"));
        assert!(!verify_password(&hash, "nope"));
        assert!(!verify_password("not-a-hash", "s3cret!"));
    }

    #[test]
    fn login_issues_token_for_valid_credentials() {
        let hash = hash_password("s3cret!").unwrap();
        let mut repo = MockMerchantReader::new();
        repo.expect_get_merchant_by_username()
            .withf(|username| username == "glow")
            .returning(move |_| Ok(Some(merchant(hash.clone()))));

        let config = ServerConfig::with_secret("secret");
        let form = LoginForm {
            username: "glow".into(),
            password: "s3cret!".into(),
        };
        let response = login(&repo, &config, form, chrono::Utc::now().naive_utc()).unwrap();
        let claims = AuthenticatedUser::decode_token(&response.token, "secret").unwrap();
        assert_eq!(claims.merchant_id, 7);
        assert_eq!(claims.roles, vec![SERVICE_ACCESS_ROLE.to_string()]);
        assert_eq!(response.merchant.id, 7);
    }

    #[test]
    fn login_rejects_wrong_password_and_unknown_user_alike() {
        let hash = hash_password("s3cret!").unwrap();
        let mut repo = MockMerchantReader::new();
        repo.expect_get_merchant_by_username()
            .returning(move |username| {
                Ok((username == "glow").then(|| merchant(hash.clone())))
            });
        let config = ServerConfig::with_secret("secret");

        let wrong = LoginForm {
            username: "glow".into(),
            password: "guess".into(),
        };
        assert!(matches!(
            login(&repo, &config, wrong, now()),
            Err(ServiceError::Unauthorized)
        ));

        let unknown = LoginForm {
            username: "other".into(),
            password: "s3cret!".into(),
        };
        assert!(matches!(
            login(&repo, &config, unknown, now()),
            Err(ServiceError::Unauthorized)
        ));
    }
}
