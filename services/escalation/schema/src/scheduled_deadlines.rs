use sea_orm::entity::prelude::*;

/// Deadline index over check-ins whose status is `scheduled`.
///
/// A row exists exactly while its check-in is scheduled: inserted with the
/// check-in, deleted in the same transaction that moves it out of `scheduled`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduled_deadlines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub check_in_id: Uuid,
    pub escalation_deadline: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::check_ins::Entity",
        from = "Column::CheckInId",
        to = "super::check_ins::Column::Id"
    )]
    CheckIn,
}

impl Related<super::check_ins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckIn.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
