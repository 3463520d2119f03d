use chrono::Utc;
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::loyalty::{
        AdjustmentOutcome, LoyaltyAdjustment, LoyaltyCard as DomainLoyaltyCard,
        LoyaltyCardStatus, LoyaltyProgram as DomainLoyaltyProgram, LoyaltyProgramSettings,
        LoyaltyRedemption, LoyaltyTransaction as DomainLoyaltyTransaction,
        LoyaltyTransactionKind, NewLoyaltyCard as DomainNewLoyaltyCard,
        NewLoyaltyTransaction as DomainNewLoyaltyTransaction, RedemptionOutcome,
        generate_card_number,
    },
    models::loyalty::{
        LoyaltyCard as DbLoyaltyCard, LoyaltyProgram as DbLoyaltyProgram, LoyaltyProgramRow,
        LoyaltyTransaction as DbLoyaltyTransaction, NewLoyaltyCard as DbNewLoyaltyCard,
        NewLoyaltyTransaction as DbNewLoyaltyTransaction,
    },
    repository::{DieselRepository, LoyaltyReader, LoyaltyWriter},
};

impl LoyaltyReader for DieselRepository {
    fn get_loyalty_program(
        &self,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainLoyaltyProgram>> {
        use crate::schema::loyalty_programs;

        let mut conn = self.conn()?;
        let program = loyalty_programs::table
            .filter(loyalty_programs::merchant_id.eq(merchant_id))
            .first::<DbLoyaltyProgram>(&mut conn)
            .optional()?;

        Ok(program.map(Into::into))
    }

    fn get_loyalty_card(
        &self,
        merchant_id: i32,
        customer_id: i32,
    ) -> RepositoryResult<Option<DomainLoyaltyCard>> {
        use crate::schema::loyalty_cards;

        let mut conn = self.conn()?;
        let card = loyalty_cards::table
            .filter(loyalty_cards::merchant_id.eq(merchant_id))
            .filter(loyalty_cards::customer_id.eq(customer_id))
            .first::<DbLoyaltyCard>(&mut conn)
            .optional()?;

        Ok(card.map(Into::into))
    }

    fn list_loyalty_transactions(
        &self,
        card_id: i32,
    ) -> RepositoryResult<Vec<DomainLoyaltyTransaction>> {
        use crate::schema::loyalty_transactions;

        let mut conn = self.conn()?;
        let rows = loyalty_transactions::table
            .filter(loyalty_transactions::card_id.eq(card_id))
            .order((
                loyalty_transactions::created_at.desc(),
                loyalty_transactions::id.desc(),
            ))
            .load::<DbLoyaltyTransaction>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl LoyaltyWriter for DieselRepository {
    fn save_loyalty_program(
        &self,
        settings: &LoyaltyProgramSettings,
    ) -> RepositoryResult<DomainLoyaltyProgram> {
        use crate::schema::loyalty_programs;

        let mut conn = self.conn()?;
        let row = LoyaltyProgramRow::from_domain(settings, Utc::now().naive_utc());

        let saved = diesel::insert_into(loyalty_programs::table)
            .values(&row)
            .on_conflict(loyalty_programs::merchant_id)
            .do_update()
            .set(&row)
            .get_result::<DbLoyaltyProgram>(&mut conn)?;

        Ok(saved.into())
    }

    fn redeem_loyalty_points(
        &self,
        redemption: &LoyaltyRedemption,
    ) -> RepositoryResult<RedemptionOutcome> {
        use crate::schema::{loyalty_cards, loyalty_transactions};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<RedemptionOutcome, RepositoryError, _>(|conn| {
            let card: Option<DomainLoyaltyCard> = loyalty_cards::table
                .filter(loyalty_cards::merchant_id.eq(redemption.merchant_id))
                .filter(loyalty_cards::customer_id.eq(redemption.customer_id))
                .first::<DbLoyaltyCard>(conn)
                .optional()?
                .map(Into::into);

            let Some(card) = card else {
                return Ok(RedemptionOutcome::Rejected(
                    "Customer has no loyalty card".to_string(),
                ));
            };
            if card.status != LoyaltyCardStatus::Active {
                return Ok(RedemptionOutcome::Rejected(
                    "Loyalty card is not active".to_string(),
                ));
            }
            if redemption.points <= 0 {
                return Ok(RedemptionOutcome::Rejected(
                    "Points to redeem must be positive".to_string(),
                ));
            }
            if card.points < redemption.points {
                return Ok(RedemptionOutcome::Rejected(
                    "Insufficient points".to_string(),
                ));
            }

            let updated = diesel::update(loyalty_cards::table.filter(loyalty_cards::id.eq(card.id)))
                .set((
                    loyalty_cards::points.eq(card.points - redemption.points),
                    loyalty_cards::updated_at.eq(Utc::now().naive_utc()),
                ))
                .get_result::<DbLoyaltyCard>(conn)?;

            let transaction = DomainNewLoyaltyTransaction {
                card_id: card.id,
                kind: LoyaltyTransactionKind::Redeemed,
                points: -redemption.points,
                description: redemption.description.clone(),
                invoice_id: None,
            };
            let created = diesel::insert_into(loyalty_transactions::table)
                .values(&DbNewLoyaltyTransaction::from(&transaction))
                .get_result::<DbLoyaltyTransaction>(conn)?;

            Ok(RedemptionOutcome::Redeemed {
                card: updated.into(),
                transaction: created.into(),
            })
        })
    }

    fn adjust_loyalty_points(
        &self,
        adjustment: &LoyaltyAdjustment,
    ) -> RepositoryResult<AdjustmentOutcome> {
        use crate::schema::{loyalty_cards, loyalty_transactions};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<AdjustmentOutcome, RepositoryError, _>(|conn| {
            let now = Utc::now().naive_utc();
            let existing = loyalty_cards::table
                .filter(loyalty_cards::merchant_id.eq(adjustment.merchant_id))
                .filter(loyalty_cards::customer_id.eq(adjustment.customer_id))
                .first::<DbLoyaltyCard>(conn)
                .optional()?;

            let card: DomainLoyaltyCard = match existing {
                Some(card) => card.into(),
                None if adjustment.points > 0 => {
                    let new_card = DomainNewLoyaltyCard {
                        merchant_id: adjustment.merchant_id,
                        customer_id: adjustment.customer_id,
                        card_number: generate_card_number(&mut rand::thread_rng(), now),
                    };
                    diesel::insert_into(loyalty_cards::table)
                        .values(&DbNewLoyaltyCard::from(&new_card))
                        .get_result::<DbLoyaltyCard>(conn)?
                        .into()
                }
                None => {
                    return Ok(AdjustmentOutcome::Rejected(
                        "Customer has no loyalty card".to_string(),
                    ));
                }
            };
            if card.status != LoyaltyCardStatus::Active {
                return Ok(AdjustmentOutcome::Rejected(
                    "Loyalty card is not active".to_string(),
                ));
            }

            let balance = card.points.saturating_add(adjustment.points);
            if balance < 0 {
                return Ok(AdjustmentOutcome::Rejected(
                    "Adjustment would make the balance negative".to_string(),
                ));
            }
            // Credits count towards lifetime points, deductions do not.
            let lifetime = card
                .lifetime_points
                .saturating_add(adjustment.points.max(0));

            let updated = diesel::update(loyalty_cards::table.filter(loyalty_cards::id.eq(card.id)))
                .set((
                    loyalty_cards::points.eq(balance),
                    loyalty_cards::lifetime_points.eq(lifetime),
                    loyalty_cards::updated_at.eq(now),
                ))
                .get_result::<DbLoyaltyCard>(conn)?;

            let transaction = DomainNewLoyaltyTransaction {
                card_id: card.id,
                kind: LoyaltyTransactionKind::Adjusted,
                points: adjustment.points,
                description: adjustment.reason.clone(),
                invoice_id: None,
            };
            let created = diesel::insert_into(loyalty_transactions::table)
                .values(&DbNewLoyaltyTransaction::from(&transaction))
                .get_result::<DbLoyaltyTransaction>(conn)?;

            Ok(AdjustmentOutcome::Adjusted {
                card: updated.into(),
                transaction: created.into(),
            })
        })
    }
}
