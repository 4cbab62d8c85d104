use std::collections::HashSet;

use chrono::Utc;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use super::users::{following_ids, map_tx_error};
use super::StoreError;
use crate::entity::{likes, message, user};

pub const TIMELINE_LIMIT: u64 = 100;

/// A message paired with the user who wrote it.
pub type Warble = (message::Model, user::Model);

pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    text: &str,
) -> Result<message::Model, StoreError> {
    let text = text.trim();
    let len = text.chars().count();
    if len == 0 || len > message::MAX_TEXT_LEN {
        return Err(StoreError::InvalidMessage {
            max: message::MAX_TEXT_LEN,
        });
    }
    let model = message::ActiveModel {
        text: Set(text.to_string()),
        timestamp: Set(Utc::now()),
        user_id: Set(user_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!("message saved id={} user_id={}", model.id, user_id);
    Ok(model)
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Warble>, StoreError> {
    let found = message::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await?;
    Ok(found.and_then(|(m, author)| author.map(|a| (m, a))))
}

/// Newest first.
pub async fn for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<message::Model>, StoreError> {
    Ok(message::Entity::find()
        .filter(message::Column::UserId.eq(user_id))
        .order_by_desc(message::Column::Timestamp)
        .order_by_desc(message::Column::Id)
        .limit(TIMELINE_LIMIT)
        .all(db)
        .await?)
}

/// Messages by `user_id` and everyone they follow, newest first.
pub async fn timeline<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<Warble>, StoreError> {
    let mut authors = following_ids(db, user_id).await?;
    authors.push(user_id);

    let rows = message::Entity::find()
        .filter(message::Column::UserId.is_in(authors))
        .order_by_desc(message::Column::Timestamp)
        .order_by_desc(message::Column::Id)
        .limit(TIMELINE_LIMIT)
        .find_also_related(user::Entity)
        .all(db)
        .await?;
    Ok(with_authors(rows))
}

/// Messages `user_id` has liked, newest first.
pub async fn liked_by<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<Warble>, StoreError> {
    let rows = message::Entity::find()
        .join(JoinType::InnerJoin, likes::Relation::Message.def().rev())
        .filter(likes::Column::UserId.eq(user_id))
        .order_by_desc(message::Column::Timestamp)
        .order_by_desc(message::Column::Id)
        .find_also_related(user::Entity)
        .all(db)
        .await?;
    Ok(with_authors(rows))
}

pub async fn liked_ids<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<HashSet<i32>, StoreError> {
    let ids: Vec<i32> = likes::Entity::find()
        .select_only()
        .column(likes::Column::MessageId)
        .filter(likes::Column::UserId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

pub async fn likes_for<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
) -> Result<Vec<likes::Model>, StoreError> {
    Ok(likes::Entity::find()
        .filter(likes::Column::MessageId.eq(message_id))
        .order_by_asc(likes::Column::Id)
        .all(db)
        .await?)
}

pub async fn find_like<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    message_id: i32,
) -> Result<Option<likes::Model>, StoreError> {
    Ok(likes::Entity::find()
        .filter(likes::Column::UserId.eq(user_id))
        .filter(likes::Column::MessageId.eq(message_id))
        .one(db)
        .await?)
}

pub async fn like<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    message_id: i32,
) -> Result<likes::Model, StoreError> {
    likes::Entity::insert(likes::ActiveModel {
        user_id: Set(user_id),
        message_id: Set(message_id),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([likes::Column::UserId, likes::Column::MessageId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    find_like(db, user_id, message_id)
        .await?
        .ok_or_else(|| StoreError::Integrity(format!("like {}/{} vanished", user_id, message_id)))
}

pub async fn unlike<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    message_id: i32,
) -> Result<(), StoreError> {
    likes::Entity::delete_many()
        .filter(likes::Column::UserId.eq(user_id))
        .filter(likes::Column::MessageId.eq(message_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Flips the like and reports whether the message is liked afterwards.
pub async fn toggle_like<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    message_id: i32,
) -> Result<bool, StoreError> {
    if find_like(db, user_id, message_id).await?.is_some() {
        unlike(db, user_id, message_id).await?;
        return Ok(false);
    }
    like(db, user_id, message_id).await?;
    Ok(true)
}

pub async fn delete(db: &DatabaseConnection, message_id: i32) -> Result<(), StoreError> {
    db.transaction::<_, (), StoreError>(|txn| {
        Box::pin(async move {
            likes::Entity::delete_many()
                .filter(likes::Column::MessageId.eq(message_id))
                .exec(txn)
                .await?;
            message::Entity::delete_by_id(message_id).exec(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(map_tx_error)?;
    debug!("message deleted id={}", message_id);
    Ok(())
}

fn with_authors(rows: Vec<(message::Model, Option<user::Model>)>) -> Vec<Warble> {
    rows.into_iter()
        .filter_map(|(m, author)| author.map(|a| (m, a)))
        .collect()
}
