use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "antique_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub antique_id: Uuid,
    pub image_url: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::antiques::Entity",
        from = "Column::AntiqueId",
        to = "super::antiques::Column::Id"
    )]
    Antiques,
}

impl Related<super::antiques::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Antiques.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
