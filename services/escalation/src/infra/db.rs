use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionError, TransactionTrait,
    sea_query::Expr,
};
use tracing::warn;
use uuid::Uuid;

use checkin_domain::code::VerificationCode;
use checkin_domain::id::{CheckInId, ContactId, OwnerId};
use checkin_domain::status::CheckInStatus;
use checkin_escalation_schema::{check_ins, contacts, scheduled_deadlines};

use crate::domain::repository::{CheckInStore, ContactRepository};
use crate::domain::types::{CheckIn, Contact, OverdueBatch, Transition};
use crate::error::CheckInServiceError;

// ── Check-in store ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCheckInStore {
    pub db: DatabaseConnection,
}

impl CheckInStore for DbCheckInStore {
    async fn create(&self, check_in: &CheckIn) -> Result<(), CheckInServiceError> {
        check_in.ensure_insertable()?;
        let model = check_in_active_model(check_in)?;
        let index_row = scheduled_deadlines::ActiveModel {
            check_in_id: Set(check_in.id.0),
            escalation_deadline: Set(check_in.escalation_deadline),
        };

        let result = self
            .db
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    model.insert(txn).await?;
                    index_row.insert(txn).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(CheckInServiceError::CheckInAlreadyExists)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create check-in").into()),
        }
    }

    async fn get_by_owner_and_id(
        &self,
        owner_id: OwnerId,
        id: CheckInId,
    ) -> Result<CheckIn, CheckInServiceError> {
        let model = check_ins::Entity::find_by_id(id.0)
            .filter(check_ins::Column::OwnerId.eq(owner_id.0))
            .one(&self.db)
            .await
            .context("find check-in by owner and id")?
            .ok_or(CheckInServiceError::CheckInNotFound)?;
        check_in_from_model(model)
    }

    async fn get_by_id(&self, id: CheckInId) -> Result<CheckIn, CheckInServiceError> {
        let model = check_ins::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find check-in by id")?
            .ok_or(CheckInServiceError::CheckInNotFound)?;
        check_in_from_model(model)
    }

    async fn transition(
        &self,
        id: CheckInId,
        expected: CheckInStatus,
        transition: &Transition,
    ) -> Result<CheckIn, CheckInServiceError> {
        transition.ensure_valid_from(expected)?;
        let transition = *transition;

        let updated = self
            .db
            .transaction::<_, Option<check_ins::Model>, DbErr>(move |txn| {
                Box::pin(async move {
                    let mut update = check_ins::Entity::update_many()
                        .col_expr(check_ins::Column::Status, Expr::value(transition.to.as_str()))
                        .col_expr(check_ins::Column::UpdatedAt, Expr::value(transition.at));
                    match transition.to {
                        CheckInStatus::Acknowledged => {
                            update = update
                                .col_expr(check_ins::Column::AcknowledgedAt, Expr::value(transition.at));
                        }
                        CheckInStatus::Escalated => {
                            update = update
                                .col_expr(check_ins::Column::EscalatedAt, Expr::value(transition.at));
                        }
                        CheckInStatus::Scheduled | CheckInStatus::Cancelled => {}
                    }

                    // Compare-and-set on the prior status.
                    let result = update
                        .filter(check_ins::Column::Id.eq(id.0))
                        .filter(check_ins::Column::Status.eq(expected.as_str()))
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(None);
                    }

                    if expected == CheckInStatus::Scheduled {
                        scheduled_deadlines::Entity::delete_by_id(id.0)
                            .exec(txn)
                            .await?;
                    }

                    check_ins::Entity::find_by_id(id.0).one(txn).await
                })
            })
            .await
            .context("transition check-in status")?;

        if let Some(model) = updated {
            return check_in_from_model(model);
        }

        // Nothing matched: either the id is unknown or the status moved on.
        let current = check_ins::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("re-read check-in after lost transition")?
            .ok_or(CheckInServiceError::CheckInNotFound)?;
        Err(CheckInServiceError::StatusConflict {
            current: parse_status(&current.status)?,
        })
    }

    async fn list_overdue(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<OverdueBatch, CheckInServiceError> {
        let ids: Vec<Uuid> = scheduled_deadlines::Entity::find()
            .filter(scheduled_deadlines::Column::EscalationDeadline.lte(cutoff))
            .order_by_asc(scheduled_deadlines::Column::EscalationDeadline)
            .order_by_asc(scheduled_deadlines::Column::CheckInId)
            .limit(limit)
            .all(&self.db)
            .await
            .context("query scheduled deadline index")?
            .into_iter()
            .map(|row| row.check_in_id)
            .collect();
        if ids.is_empty() {
            return Ok(OverdueBatch::default());
        }

        let models: HashMap<Uuid, check_ins::Model> = check_ins::Entity::find()
            .filter(check_ins::Column::Id.is_in(ids.clone()))
            .filter(check_ins::Column::Status.eq(CheckInStatus::Scheduled.as_str()))
            .all(&self.db)
            .await
            .context("load overdue check-ins")?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(decode_overdue(ids, models))
    }
}

/// Decodes each overdue row on its own, in index order. A row that fails to
/// decode is logged and reported as unreadable instead of failing the batch.
fn decode_overdue(ids: Vec<Uuid>, mut models: HashMap<Uuid, check_ins::Model>) -> OverdueBatch {
    let mut batch = OverdueBatch::default();
    for id in ids {
        let Some(model) = models.remove(&id) else {
            continue;
        };
        match check_in_from_model(model) {
            Ok(check_in) => batch.check_ins.push(check_in),
            Err(e) => {
                warn!(check_in_id = %id, error = ?e, "undecodable check-in in deadline index");
                batch.unreadable.push(CheckInId(id));
            }
        }
    }
    batch
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn parse_status(raw: &str) -> Result<CheckInStatus, CheckInServiceError> {
    Ok(raw.parse::<CheckInStatus>().context("decode check-in status")?)
}

fn check_in_active_model(
    check_in: &CheckIn,
) -> Result<check_ins::ActiveModel, CheckInServiceError> {
    let contacts =
        serde_json::to_value(&check_in.contacts).context("encode check-in contacts")?;
    Ok(check_ins::ActiveModel {
        id: Set(check_in.id.0),
        owner_id: Set(check_in.owner_id.0),
        owner_name: Set(check_in.owner_name.clone()),
        title: Set(check_in.title.clone()),
        scheduled_time: Set(check_in.scheduled_time),
        escalation_deadline: Set(check_in.escalation_deadline),
        status: Set(check_in.status.as_str().to_owned()),
        verification_code: Set(check_in.verification_code.as_str().to_owned()),
        contacts: Set(contacts),
        created_at: Set(check_in.created_at),
        updated_at: Set(check_in.updated_at),
        acknowledged_at: Set(check_in.acknowledged_at),
        escalated_at: Set(check_in.escalated_at),
    })
}

fn check_in_from_model(model: check_ins::Model) -> Result<CheckIn, CheckInServiceError> {
    Ok(CheckIn {
        id: CheckInId(model.id),
        owner_id: OwnerId(model.owner_id),
        owner_name: model.owner_name,
        title: model.title,
        scheduled_time: model.scheduled_time,
        escalation_deadline: model.escalation_deadline,
        status: parse_status(&model.status)?,
        verification_code: VerificationCode::parse(&model.verification_code)
            .context("decode verification code")?,
        contacts: serde_json::from_value(model.contacts).context("decode check-in contacts")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
        acknowledged_at: model.acknowledged_at,
        escalated_at: model.escalated_at,
    })
}

// ── Contact repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbContactRepository {
    pub db: DatabaseConnection,
}

impl ContactRepository for DbContactRepository {
    async fn create(&self, contact: &Contact) -> Result<(), CheckInServiceError> {
        contacts::ActiveModel {
            id: Set(contact.id.0),
            owner_id: Set(contact.owner_id.0),
            name: Set(contact.name.clone()),
            phone: Set(contact.phone.clone()),
            email: Set(contact.email.clone()),
            created_at: Set(contact.created_at),
        }
        .insert(&self.db)
        .await
        .context("create contact")?;
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Contact>, CheckInServiceError> {
        let models = contacts::Entity::find()
            .filter(contacts::Column::OwnerId.eq(owner_id.0))
            .order_by_asc(contacts::Column::CreatedAt)
            .order_by_asc(contacts::Column::Id)
            .all(&self.db)
            .await
            .context("list contacts by owner")?;
        Ok(models.into_iter().map(contact_from_model).collect())
    }

    async fn find_by_owner_and_ids(
        &self,
        owner_id: OwnerId,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>, CheckInServiceError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut by_id: HashMap<Uuid, contacts::Model> = contacts::Entity::find()
            .filter(contacts::Column::OwnerId.eq(owner_id.0))
            .filter(contacts::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .all(&self.db)
            .await
            .context("find contacts by owner and ids")?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(&id.0))
            .map(contact_from_model)
            .collect())
    }
}

fn contact_from_model(model: contacts::Model) -> Contact {
    Contact {
        id: ContactId(model.id),
        owner_id: OwnerId(model.owner_id),
        name: model.name,
        phone: model.phone,
        email: model.email,
        created_at: model.created_at,
    }
}
