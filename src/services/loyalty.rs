use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::loyalty::{
    AdjustmentOutcome, CustomerLoyalty, LoyaltyCard, LoyaltyProgram, LoyaltyTransaction,
    RedemptionOutcome,
};
use crate::forms::loyalty::{AdjustPointsForm, LoyaltyProgramForm, RedeemPointsForm};
use crate::repository::{CustomerReader, LoyaltyReader, LoyaltyWriter};
use crate::services::{ServiceError, ServiceResult};

/// Card and transaction left by a redemption or manual adjustment.
#[derive(Debug, Clone, Serialize)]
pub struct PointsReceipt {
    pub card: LoyaltyCard,
    pub transaction: LoyaltyTransaction,
}

/// The merchant's program, `None` until one is configured.
pub fn get_program<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Option<LoyaltyProgram>>
where
    R: LoyaltyReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    Ok(repo.get_loyalty_program(user.merchant_id)?)
}

pub fn save_program<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: LoyaltyProgramForm,
) -> ServiceResult<LoyaltyProgram>
where
    R: LoyaltyWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let settings = form
        .into_settings(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let program = repo.save_loyalty_program(&settings)?;
    log::info!(
        "Saved {} loyalty program for merchant {}",
        program.kind.as_str(),
        program.merchant_id
    );
    Ok(program)
}

/// Card, history and redeemable value for a customer.
pub fn customer_loyalty<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<CustomerLoyalty>
where
    R: CustomerReader + LoyaltyReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_customer_by_id(customer_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;

    let Some(card) = repo.get_loyalty_card(user.merchant_id, customer_id)? else {
        return Ok(CustomerLoyalty {
            card: None,
            transactions: Vec::new(),
            reward_value_available_cents: 0,
        });
    };

    let transactions = repo.list_loyalty_transactions(card.id)?;
    let reward_value_available_cents = repo
        .get_loyalty_program(user.merchant_id)?
        .map(|program| program.reward_value_cents(card.points))
        .unwrap_or(0);

    Ok(CustomerLoyalty {
        card: Some(card),
        transactions,
        reward_value_available_cents,
    })
}

pub fn redeem<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
    form: RedeemPointsForm,
) -> ServiceResult<PointsReceipt>
where
    R: CustomerReader + LoyaltyWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_customer_by_id(customer_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;
    let redemption = form
        .into_redemption(user.merchant_id, customer_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    match repo.redeem_loyalty_points(&redemption)? {
        RedemptionOutcome::Redeemed { card, transaction } => {
            log::info!(
                "Customer {customer_id} redeemed {} points, {} left",
                redemption.points,
                card.points
            );
            Ok(PointsReceipt { card, transaction })
        }
        RedemptionOutcome::Rejected(message) => Err(ServiceError::Form(message)),
    }
}

/// Credit or deduct points by hand, e.g. to correct a missed visit.
pub fn adjust<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
    form: AdjustPointsForm,
) -> ServiceResult<PointsReceipt>
where
    R: CustomerReader + LoyaltyWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_customer_by_id(customer_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;
    let adjustment = form
        .into_adjustment(user.merchant_id, customer_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    match repo.adjust_loyalty_points(&adjustment)? {
        AdjustmentOutcome::Adjusted { card, transaction } => {
            log::info!(
                "Adjusted customer {customer_id} by {} points by {}: {}",
                adjustment.points,
                user.email,
                adjustment.reason
            );
            Ok(PointsReceipt { card, transaction })
        }
        AdjustmentOutcome::Rejected(message) => Err(ServiceError::Form(message)),
    }
}
