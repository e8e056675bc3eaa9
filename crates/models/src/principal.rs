use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, tenant};

/// Identity record linking a provider-specific principal to a user.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "principal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub provider: String,
    pub user_id: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Tenant }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity)
                .from(Column::TenantId)
                .to(tenant::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    tenant_id: Uuid,
    provider: &str,
    user_id: &str,
) -> Result<Model, errors::ModelError> {
    if user_id.trim().is_empty() { return Err(errors::ModelError::Validation("user_id required".into())); }
    let am = ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        provider: Set(provider.to_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    id: Uuid,
    provider: &str,
) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::Id.eq(id))
        .filter(Column::Provider.eq(provider))
        .one(db)
        .await?)
}

pub async fn find_by_user<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    user_id: &str,
    provider: &str,
) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Provider.eq(provider))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}
