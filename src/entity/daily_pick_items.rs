use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_pick_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub daily_pick_id: Uuid,
    pub antique_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::daily_picks::Entity",
        from = "Column::DailyPickId",
        to = "super::daily_picks::Column::Id"
    )]
    DailyPicks,
    #[sea_orm(
        belongs_to = "super::antiques::Entity",
        from = "Column::AntiqueId",
        to = "super::antiques::Column::Id"
    )]
    Antiques,
}

impl Related<super::daily_picks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyPicks.def()
    }
}

impl Related<super::antiques::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Antiques.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
