use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wishlist_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub wishlist_id: Uuid,
    pub antique_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wishlists::Entity",
        from = "Column::WishlistId",
        to = "super::wishlists::Column::Id"
    )]
    Wishlists,
    #[sea_orm(
        belongs_to = "super::antiques::Entity",
        from = "Column::AntiqueId",
        to = "super::antiques::Column::Id"
    )]
    Antiques,
}

impl Related<super::wishlists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlists.def()
    }
}

impl Related<super::antiques::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Antiques.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
