use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::location::Location;
use crate::forms::locations::{AddLocationForm, EditLocationForm};
use crate::repository::{LocationReader, LocationWriter};
use crate::services::{ServiceError, ServiceResult};

pub fn list_locations<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Location>>
where
    R: LocationReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.list_locations(user.merchant_id)
        .map_err(ServiceError::from)
}

pub fn create_location<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddLocationForm,
) -> ServiceResult<Location>
where
    R: LocationWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_location = form
        .into_new_location(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.create_location(&new_location)
        .map_err(ServiceError::from)
}

pub fn update_location<R>(
    repo: &R,
    user: &AuthenticatedUser,
    location_id: i32,
    form: EditLocationForm,
) -> ServiceResult<Location>
where
    R: LocationWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = form
        .into_update_location()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.update_location(location_id, user.merchant_id, &updates)
        .map_err(ServiceError::from)
}

pub fn delete_location<R>(repo: &R, user: &AuthenticatedUser, location_id: i32) -> ServiceResult<()>
where
    R: LocationWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.delete_location(location_id, user.merchant_id)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::MockLocationWriter;
    use pushkind_common::repository::errors::RepositoryError;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "glow".into(),
            merchant_id: 5,
            email: "owner@glow.test".into(),
            name: "Glow".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    #[test]
    fn blank_names_never_reach_the_repository() {
        let repo = MockLocationWriter::new();
        let form = AddLocationForm {
            name: "   ".into(),
            address: None,
            phone: None,
        };
        assert!(matches!(
            create_location(&repo, &user(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn deleting_foreign_location_is_not_found() {
        let mut repo = MockLocationWriter::new();
        repo.expect_delete_location()
            .withf(|id, merchant_id| *id == 9 && *merchant_id == 5)
            .returning(|_, _| Err(RepositoryError::NotFound));
        assert!(matches!(
            delete_location(&repo, &user(), 9),
            Err(ServiceError::NotFound)
        ));
    }
}
