use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_picks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub pick_date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_pick_items::Entity")]
    DailyPickItems,
}

impl Related<super::daily_pick_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyPickItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
