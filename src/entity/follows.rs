use sea_orm::entity::prelude::*;

/// Directed edge: `user_following_id` follows `user_being_followed_id`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_being_followed_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_following_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserBeingFollowedId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Followed,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserFollowingId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Follower,
}

impl ActiveModelBehavior for ActiveModel {}
