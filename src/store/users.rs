use bcrypt::{hash, verify};
use log::{info, warn};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionError,
    TransactionTrait,
};

use super::StoreError;
use crate::entity::{follows, likes, message, user};

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub image_url: Option<&'a str>,
}

/// Profile fields a user may change about themselves. `None` image urls
/// fall back to the defaults.
pub struct ProfileUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: Option<&'a str>,
    pub header_image_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub location: Option<&'a str>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserStats {
    pub messages: u64,
    pub following: u64,
    pub followers: u64,
    pub likes: u64,
}

pub async fn signup<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser<'_>,
    cost: u32,
) -> Result<user::Model, StoreError> {
    if new_user.password.is_empty() {
        return Err(StoreError::InvalidPassword);
    }
    let username = required(new_user.username, "username")?;
    let email = required(new_user.email, "email")?;

    let password = hash(new_user.password, cost)?;
    let model = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        image_url: Set(or_default(new_user.image_url, user::DEFAULT_IMAGE_URL)),
        header_image_url: Set(user::DEFAULT_HEADER_IMAGE_URL.to_string()),
        bio: Set(None),
        location: Set(None),
        password: Set(password),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("user signed up id={} username={}", model.id, model.username);
    Ok(model)
}

/// The user with `username` if `password` matches their stored hash.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>, StoreError> {
    let found = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    let Some(found) = found else {
        return Ok(None);
    };
    match verify(password, &found.password) {
        Ok(true) => Ok(Some(found)),
        Ok(false) => Ok(None),
        Err(e) => {
            warn!("unreadable password hash for user id={}: {}", found.id, e);
            Ok(None)
        }
    }
}

pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<user::Model>, StoreError> {
    Ok(user::Entity::find_by_id(id).one(db).await?)
}

/// All users, or those whose username contains `q`.
pub async fn search<C: ConnectionTrait>(
    db: &C,
    q: Option<&str>,
) -> Result<Vec<user::Model>, StoreError> {
    let mut query = user::Entity::find();
    if let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) {
        query = query.filter(user::Column::Username.contains(q));
    }
    Ok(query.order_by_asc(user::Column::Id).all(db).await?)
}

pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    current: user::Model,
    update: ProfileUpdate<'_>,
) -> Result<user::Model, StoreError> {
    let username = required(update.username, "username")?.to_string();
    let email = required(update.email, "email")?.to_string();

    let mut active: user::ActiveModel = current.into();
    active.username = Set(username);
    active.email = Set(email);
    active.image_url = Set(or_default(update.image_url, user::DEFAULT_IMAGE_URL));
    active.header_image_url = Set(or_default(update.header_image_url, user::DEFAULT_HEADER_IMAGE_URL));
    active.bio = Set(optional(update.bio));
    active.location = Set(optional(update.location));
    Ok(active.update(db).await?)
}

/// Removes the user along with their messages, likes, and follow edges.
pub async fn delete(db: &DatabaseConnection, user_id: i32) -> Result<(), StoreError> {
    db.transaction::<_, (), StoreError>(|txn| {
        Box::pin(async move {
            let own_messages: Vec<i32> = message::Entity::find()
                .select_only()
                .column(message::Column::Id)
                .filter(message::Column::UserId.eq(user_id))
                .into_tuple()
                .all(txn)
                .await?;

            likes::Entity::delete_many()
                .filter(
                    likes::Column::UserId
                        .eq(user_id)
                        .or(likes::Column::MessageId.is_in(own_messages)),
                )
                .exec(txn)
                .await?;
            message::Entity::delete_many()
                .filter(message::Column::UserId.eq(user_id))
                .exec(txn)
                .await?;
            follows::Entity::delete_many()
                .filter(
                    follows::Column::UserFollowingId
                        .eq(user_id)
                        .or(follows::Column::UserBeingFollowedId.eq(user_id)),
                )
                .exec(txn)
                .await?;
            user::Entity::delete_by_id(user_id).exec(txn).await?;
            Ok(())
        })
    })
    .await
    .map_err(map_tx_error)?;

    info!("user deleted id={}", user_id);
    Ok(())
}

/// Users that `user_id` follows.
pub async fn following<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<user::Model>, StoreError> {
    Ok(user::Entity::find()
        .join(JoinType::InnerJoin, follows::Relation::Followed.def().rev())
        .filter(follows::Column::UserFollowingId.eq(user_id))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

/// Users that follow `user_id`.
pub async fn followers<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<user::Model>, StoreError> {
    Ok(user::Entity::find()
        .join(JoinType::InnerJoin, follows::Relation::Follower.def().rev())
        .filter(follows::Column::UserBeingFollowedId.eq(user_id))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?)
}

pub async fn following_ids<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<i32>, StoreError> {
    Ok(follows::Entity::find()
        .select_only()
        .column(follows::Column::UserBeingFollowedId)
        .filter(follows::Column::UserFollowingId.eq(user_id))
        .into_tuple()
        .all(db)
        .await?)
}

/// Whether `user_id` follows `other_id`.
pub async fn is_following<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    other_id: i32,
) -> Result<bool, StoreError> {
    let edge = follows::Entity::find_by_id((other_id, user_id)).one(db).await?;
    Ok(edge.is_some())
}

/// Whether `other_id` follows `user_id`.
pub async fn is_followed_by<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    other_id: i32,
) -> Result<bool, StoreError> {
    is_following(db, other_id, user_id).await
}

pub async fn follow<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    other_id: i32,
) -> Result<(), StoreError> {
    follows::Entity::insert(follows::ActiveModel {
        user_being_followed_id: Set(other_id),
        user_following_id: Set(user_id),
    })
    .on_conflict(
        OnConflict::columns([
            follows::Column::UserBeingFollowedId,
            follows::Column::UserFollowingId,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

pub async fn unfollow<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    other_id: i32,
) -> Result<(), StoreError> {
    follows::Entity::delete_by_id((other_id, user_id)).exec(db).await?;
    Ok(())
}

pub async fn stats<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<UserStats, StoreError> {
    let messages = message::Entity::find()
        .filter(message::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    let following = follows::Entity::find()
        .filter(follows::Column::UserFollowingId.eq(user_id))
        .count(db)
        .await?;
    let followers = follows::Entity::find()
        .filter(follows::Column::UserBeingFollowedId.eq(user_id))
        .count(db)
        .await?;
    let likes = likes::Entity::find()
        .filter(likes::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(UserStats {
        messages,
        following,
        followers,
        likes,
    })
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Integrity(format!("{} is required", field)));
    }
    Ok(value)
}

fn or_default(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(super) fn map_tx_error(err: TransactionError<StoreError>) -> StoreError {
    match err {
        TransactionError::Connection(e) => e.into(),
        TransactionError::Transaction(e) => e,
    }
}
