use crate::{
    auth::navigation::{find_entry, path_from_permission, DASHBOARD},
    db::DbPool,
    entities::{app_user, user_permission},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<app_user::Model> for UserSummary {
    fn from(user: app_user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            active: user.active,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Activation {
    pub active: bool,
}

/// The full `menu_*` permission set for one user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionSet {
    pub permissions: Vec<String>,
}

/// Checks every identifier names a menu entry and drops duplicates. The
/// dashboard id (`menu_/` or `menu__`) is accepted and dropped, since the
/// dashboard is always visible.
pub fn normalize_permissions(ids: &[String]) -> Result<Vec<String>, ServiceError> {
    let mut unique = BTreeSet::new();
    for id in ids {
        let path = path_from_permission(id);
        if path.as_deref() == Some(DASHBOARD.path) {
            continue;
        }
        let known = path.as_deref().and_then(find_entry).is_some();
        if !known {
            return Err(ServiceError::ValidationError(format!(
                "Unknown permission: {}",
                id
            )));
        }
        unique.insert(id.clone());
    }
    Ok(unique.into_iter().collect())
}

#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ServiceError> {
        let users = app_user::Entity::find()
            .order_by_asc(app_user::Column::Username)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<app_user::Model, ServiceError> {
        app_user::Entity::find_by_id(user_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    /// Enables or disables sign-in for `user_id`. Administrators cannot
    /// change their own account.
    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        acting_user: Uuid,
        user_id: Uuid,
        active: bool,
    ) -> Result<UserSummary, ServiceError> {
        if acting_user == user_id {
            return Err(ServiceError::ValidationError(
                "Administrators cannot deactivate their own account".to_string(),
            ));
        }
        let user = self.ensure_user(user_id).await?;
        if user.active == active {
            return Ok(UserSummary::from(user));
        }

        let mut model: app_user::ActiveModel = user.into();
        model.active = Set(active);
        let updated = model.update(self.db_pool.as_ref()).await?;

        self.event_sender
            .send_or_log(Event::UserActivationChanged { user_id, active })
            .await;
        info!(%user_id, active, "User activation changed");
        Ok(UserSummary::from(updated))
    }

    /// Removes the account; its permissions go with it.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, acting_user: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        if acting_user == user_id {
            return Err(ServiceError::ValidationError(
                "Administrators cannot delete their own account".to_string(),
            ));
        }
        super::delete_row::<app_user::Entity>(
            self.db_pool.as_ref(),
            &self.event_sender,
            "User",
            user_id,
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn permissions(&self, user_id: Uuid) -> Result<PermissionSet, ServiceError> {
        self.ensure_user(user_id).await?;
        let permissions = user_permission::Entity::find()
            .filter(user_permission::Column::UserId.eq(user_id))
            .order_by_asc(user_permission::Column::PermissionId)
            .all(self.db_pool.as_ref())
            .await?
            .into_iter()
            .map(|p| p.permission_id)
            .collect();
        Ok(PermissionSet { permissions })
    }

    /// Replaces the user's permission set. Sessions already open keep the
    /// gate they resolved at sign-in.
    #[instrument(skip(self, set), fields(count = set.permissions.len()))]
    pub async fn replace_permissions(
        &self,
        user_id: Uuid,
        set: PermissionSet,
    ) -> Result<PermissionSet, ServiceError> {
        self.ensure_user(user_id).await?;
        let permissions = normalize_permissions(&set.permissions)?;

        let txn = self.db_pool.begin().await?;
        user_permission::Entity::delete_many()
            .filter(user_permission::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if !permissions.is_empty() {
            user_permission::Entity::insert_many(permissions.iter().map(|id| {
                user_permission::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    permission_id: Set(id.clone()),
                }
            }))
            .exec_without_returning(&txn)
            .await?;
        }
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::PermissionsReplaced {
                user_id,
                count: permissions.len(),
            })
            .await;
        info!(%user_id, count = permissions.len(), "User permissions replaced");
        Ok(PermissionSet { permissions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn known_permissions_are_deduplicated() {
        let ids = vec![
            "menu__cadastro-toners".to_string(),
            "menu__graficos".to_string(),
            "menu__cadastro-toners".to_string(),
        ];
        assert_eq!(normalize_permissions(&ids).unwrap().len(), 2);
    }

    #[test]
    fn dashboard_permission_is_accepted_and_dropped() {
        let ids = vec![
            "menu_/".to_string(),
            "menu__".to_string(),
            "menu__graficos".to_string(),
        ];
        assert_eq!(
            normalize_permissions(&ids).unwrap(),
            vec!["menu__graficos".to_string()]
        );
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert_matches!(
            normalize_permissions(&["menu__nowhere".to_string()]),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            normalize_permissions(&["cadastro-toners".to_string()]),
            Err(ServiceError::ValidationError(_))
        );
    }
}
