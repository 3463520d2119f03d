//! Bearer-token identity and tenant resolution.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::error::{ErrorBadRequest, ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, FromRequest, HttpRequest, web};
use chrono::{Duration, NaiveDateTime};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::merchant::Merchant;
use crate::models::config::ServerConfig;

pub const MERCHANT_SUBDOMAIN_HEADER: &str = "X-Merchant-Subdomain";

/// Claims carried by a merchant bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Merchant username.
    pub sub: String,
    pub merchant_id: i32,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Expiry as seconds since the Unix epoch.
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn for_merchant(merchant: &Merchant, now: NaiveDateTime, ttl_hours: i64) -> Self {
        let exp = (now + Duration::hours(ttl_hours)).and_utc().timestamp().max(0) as usize;
        Self {
            sub: merchant.username.clone(),
            merchant_id: merchant.id,
            email: merchant.email.clone(),
            name: merchant.name.clone(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp,
        }
    }

    pub fn encode_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Validate signature and expiry of `token`.
    pub fn decode_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let Some(config) = req.app_data::<web::Data<ServerConfig>>() else {
        log::error!("Server configuration is not registered");
        return Err(ErrorInternalServerError("Server misconfigured"));
    };
    let token = bearer_token(req).ok_or_else(|| ErrorUnauthorized("Missing bearer token"))?;
    AuthenticatedUser::decode_token(token, &config.secret_key)
        .map_err(|_| ErrorUnauthorized("Invalid or expired token"))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Tenant subdomain taken from the `X-Merchant-Subdomain` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantSubdomain(pub String);

impl MerchantSubdomain {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().to_lowercase();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for MerchantSubdomain {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let subdomain = req
            .headers()
            .get(MERCHANT_SUBDOMAIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(MerchantSubdomain::parse)
            .ok_or_else(|| ErrorBadRequest("X-Merchant-Subdomain header is required"));
        ready(subdomain)
    }
}
