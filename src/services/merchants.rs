use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::merchant::Merchant;
use crate::forms::merchants::{RegisterMerchantForm, UpdateSettingsForm};
use crate::repository::{MerchantReader, MerchantWriter};
use crate::services::auth::hash_password;
use crate::services::{ServiceError, ServiceResult};

/// Merchant of the token, after the role check.
pub(crate) fn authorized_merchant<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Merchant>
where
    R: MerchantReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_merchant_by_id(user.merchant_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn get_merchant<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Merchant>
where
    R: MerchantReader + ?Sized,
{
    authorized_merchant(repo, user)
}

/// Merge a partial settings payload into the stored settings.
pub fn update_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UpdateSettingsForm,
) -> ServiceResult<Merchant>
where
    R: MerchantReader + MerchantWriter + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let settings = form
        .apply_to(merchant.settings)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_merchant_settings(merchant.id, &settings)
        .map_err(ServiceError::from)
}

/// Create a tenant account. Subdomain and username must be unused.
pub fn register_merchant<R>(repo: &R, form: RegisterMerchantForm) -> ServiceResult<Merchant>
where
    R: MerchantReader + MerchantWriter + ?Sized,
{
    let password_hash = hash_password(&form.password)?;
    let new_merchant = form
        .into_new_merchant(password_hash)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo.get_merchant_by_subdomain(&new_merchant.subdomain)?.is_some() {
        return Err(ServiceError::conflict(format!(
            "Subdomain `{}` is already taken",
            new_merchant.subdomain
        )));
    }
    if repo.get_merchant_by_username(&new_merchant.username)?.is_some() {
        return Err(ServiceError::conflict(format!(
            "Username `{}` is already taken",
            new_merchant.username
        )));
    }

    let merchant = repo.create_merchant(&new_merchant)?;
    log::info!("Registered merchant {} ({})", merchant.id, merchant.subdomain);
    Ok(merchant)
}
