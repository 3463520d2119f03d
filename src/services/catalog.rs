use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::service::{Service, ServiceListQuery, UpdateService};
use crate::forms::catalog::{AddServiceForm, EditServiceForm, ServiceQueryParams};
use crate::repository::{CatalogReader, CatalogWriter};
use crate::services::{ServiceError, ServiceResult};

pub fn list_services<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ServiceQueryParams,
) -> ServiceResult<Vec<Service>>
where
    R: CatalogReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let mut query = ServiceListQuery::new(user.merchant_id);
    if params.active_only.unwrap_or(false) {
        query = query.active();
    }
    if let Some(category) = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|category| !category.is_empty())
    {
        query = query.category(category);
    }

    repo.list_services(query).map_err(ServiceError::from)
}

pub fn get_service<R>(repo: &R, user: &AuthenticatedUser, service_id: i32) -> ServiceResult<Service>
where
    R: CatalogReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_service_by_id(service_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_service<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddServiceForm,
) -> ServiceResult<Service>
where
    R: CatalogWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_service = form
        .into_new_service(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.create_service(&new_service)
        .map_err(ServiceError::from)
}

pub fn update_service<R>(
    repo: &R,
    user: &AuthenticatedUser,
    service_id: i32,
    form: EditServiceForm,
) -> ServiceResult<Service>
where
    R: CatalogWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = form
        .into_update_service()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.update_service(service_id, user.merchant_id, &updates)
        .map_err(ServiceError::from)
}

/// Services referenced by bookings stay in the catalog; deleting deactivates.
pub fn deactivate_service<R>(
    repo: &R,
    user: &AuthenticatedUser,
    service_id: i32,
) -> ServiceResult<Service>
where
    R: CatalogWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = UpdateService {
        is_active: Some(false),
        ..UpdateService::default()
    };
    repo.update_service(service_id, user.merchant_id, &updates)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::{MockCatalogReader, MockCatalogWriter};
    use chrono::NaiveDateTime;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "glow".into(),
            merchant_id: 4,
            email: "owner@glow.test".into(),
            name: "Glow".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    fn service(id: i32, is_active: bool) -> Service {
        Service {
            id,
            merchant_id: 4,
            name: "Balayage".into(),
            description: None,
            category: Some("Colour".into()),
            duration_minutes: 120,
            padding_before_minutes: 0,
            padding_after_minutes: 15,
            price_cents: 28_000,
            tax_rate_bps: 1_000,
            is_active,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn list_applies_filters() {
        let mut repo = MockCatalogReader::new();
        repo.expect_list_services()
            .withf(|query| {
                query.merchant_id == 4
                    && query.active_only
                    && query.category.as_deref() == Some("Colour")
            })
            .returning(|_| Ok(vec![service(1, true)]));

        let params = ServiceQueryParams {
            category: Some(" Colour ".into()),
            active_only: Some(true),
        };
        let services = list_services(&repo, &user(), params).unwrap();
        assert_eq!(services.len(), 1);
    }

    #[test]
    fn short_durations_are_rejected() {
        let repo = MockCatalogWriter::new();
        let form = AddServiceForm {
            name: "Fringe trim".into(),
            description: None,
            category: None,
            duration_minutes: 2,
            padding_before_minutes: None,
            padding_after_minutes: None,
            price_cents: 1_000,
            tax_rate_bps: None,
        };
        assert!(matches!(
            create_service(&repo, &user(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn delete_only_deactivates() {
        let mut repo = MockCatalogWriter::new();
        repo.expect_update_service()
            .withf(|id, merchant_id, updates| {
                *id == 3 && *merchant_id == 4 && updates.is_active == Some(false)
            })
            .returning(|id, _, _| Ok(service(id, false)));

        let service = deactivate_service(&repo, &user(), 3).unwrap();
        assert!(!service.is_active);
    }
}
