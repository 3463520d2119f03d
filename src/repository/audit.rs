use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::audit::{AuditLog as DomainAuditLog, NewAuditLog as DomainNewAuditLog},
    models::audit::{AuditLog as DbAuditLog, NewAuditLog as DbNewAuditLog},
    repository::{AuditReader, AuditWriter, DieselRepository},
};

impl AuditReader for DieselRepository {
    fn list_audit_logs(&self, merchant_id: i32) -> RepositoryResult<Vec<DomainAuditLog>> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;
        let rows = audit_logs::table
            .filter(audit_logs::merchant_id.eq(merchant_id))
            .order((audit_logs::created_at.desc(), audit_logs::id.desc()))
            .load::<DbAuditLog>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl AuditWriter for DieselRepository {
    fn create_audit_log(&self, entry: &DomainNewAuditLog) -> RepositoryResult<DomainAuditLog> {
        use crate::schema::audit_logs;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(audit_logs::table)
            .values(&DbNewAuditLog::from(entry))
            .get_result::<DbAuditLog>(&mut conn)?;

        Ok(created.into())
    }
}
