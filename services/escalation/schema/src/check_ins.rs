use sea_orm::entity::prelude::*;

/// A scheduled safety check-in.
/// `status` is only ever written through a conditional update on its prior value.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "check_ins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_name: String,
    pub title: String,
    pub scheduled_time: chrono::DateTime<chrono::Utc>,
    pub escalation_deadline: chrono::DateTime<chrono::Utc>,
    /// One of `scheduled`, `acknowledged`, `escalated`, `cancelled`.
    pub status: String,
    pub verification_code: String,
    /// Ordered list of saved-contact references and inline contacts.
    pub contacts: Json,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub acknowledged_at: Option<chrono::DateTime<chrono::Utc>>,
    pub escalated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::scheduled_deadlines::Entity")]
    ScheduledDeadline,
}

impl Related<super::scheduled_deadlines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduledDeadline.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
