//! Read-only views for the public booking pages, resolved by subdomain.

use serde::Serialize;

use crate::domain::auth::MerchantSubdomain;
use crate::domain::merchant::{BusinessHours, Merchant};
use crate::domain::service::{Service, ServiceListQuery};
use crate::domain::staff::{Staff, StaffListQuery};
use crate::repository::{CatalogReader, MerchantReader, StaffReader};
use crate::services::{ServiceError, ServiceResult};

/// Merchant owning `subdomain`.
pub(crate) fn tenant_merchant<R>(repo: &R, subdomain: &MerchantSubdomain) -> ServiceResult<Merchant>
where
    R: MerchantReader + ?Sized,
{
    repo.get_merchant_by_subdomain(subdomain.as_str())?
        .ok_or(ServiceError::NotFound)
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicMerchant {
    pub name: String,
    pub subdomain: String,
    pub timezone: String,
    pub currency: String,
    pub business_hours: Option<BusinessHours>,
}

impl From<Merchant> for PublicMerchant {
    fn from(merchant: Merchant) -> Self {
        Self {
            name: merchant.name,
            subdomain: merchant.subdomain,
            timezone: merchant.timezone,
            currency: merchant.currency,
            business_hours: merchant.settings.business_hours,
        }
    }
}

/// Staff member as shown to clients choosing who to book with.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicStaff {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub calendar_color: Option<String>,
}

impl From<Staff> for PublicStaff {
    fn from(staff: Staff) -> Self {
        Self {
            id: staff.id,
            first_name: staff.first_name,
            last_name: staff.last_name,
            calendar_color: staff.calendar_color,
        }
    }
}

pub fn merchant_info<R>(repo: &R, subdomain: &MerchantSubdomain) -> ServiceResult<PublicMerchant>
where
    R: MerchantReader + ?Sized,
{
    tenant_merchant(repo, subdomain).map(PublicMerchant::from)
}

/// Active services offered online.
pub fn list_services<R>(repo: &R, subdomain: &MerchantSubdomain) -> ServiceResult<Vec<Service>>
where
    R: MerchantReader + CatalogReader + ?Sized,
{
    let merchant = tenant_merchant(repo, subdomain)?;
    Ok(repo.list_services(ServiceListQuery::new(merchant.id).active())?)
}

/// Active staff that can take bookings, without the "Unassigned" column.
pub fn list_staff<R>(repo: &R, subdomain: &MerchantSubdomain) -> ServiceResult<Vec<PublicStaff>>
where
    R: MerchantReader + StaffReader + ?Sized,
{
    let merchant = tenant_merchant(repo, subdomain)?;
    let staff = repo.list_staff(StaffListQuery::new(merchant.id).active())?;
    Ok(staff
        .into_iter()
        .filter(Staff::is_bookable)
        .map(PublicStaff::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::domain::merchant::MerchantSettings;
    use crate::domain::staff::{AccessLevel, StaffStatus};
    use crate::repository::mock::MockRepository;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 3)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid datetime")
    }

    fn merchant() -> Merchant {
        Merchant {
            id: 3,
            name: "Glow".into(),
            subdomain: "glow".into(),
            email: "owner@glow.test".into(),
            username: "glow".into(),
            password_hash: "secret-hash".into(),
            timezone: "Australia/Sydney".into(),
            currency: "AUD".into(),
            settings: MerchantSettings::default(),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn staff(id: i32, first_name: &str) -> Staff {
        Staff {
            id,
            merchant_id: 3,
            first_name: first_name.into(),
            last_name: None,
            email: None,
            phone: None,
            access_level: AccessLevel::Staff,
            status: StaffStatus::Active,
            calendar_color: Some("#aabbcc".into()),
            pin_cipher: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn subdomain() -> MerchantSubdomain {
        MerchantSubdomain("glow".into())
    }

    #[test]
    fn unknown_subdomain_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_subdomain()
            .returning(|_| Ok(None));

        assert!(matches!(
            merchant_info(&repo, &subdomain()),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn merchant_info_hides_credentials() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_subdomain()
            .withf(|subdomain| subdomain.to_string() == "glow")
            .returning(|_| Ok(Some(merchant())));

        let info = merchant_info(&repo, &subdomain()).unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["timezone"], "Australia/Sydney");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn placeholder_staff_are_hidden() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_subdomain()
            .returning(|_| Ok(Some(merchant())));
        repo.expect_list_staff()
            .returning(|_| Ok(vec![staff(1, "Ava"), staff(2, "Unassigned")]));

        let staff = list_staff(&repo, &subdomain()).unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff[0].first_name, "Ava");
    }
}
