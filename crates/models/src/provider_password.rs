use sea_orm::{entity::prelude::*, sea_query::Expr, ConnectionTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, principal};

/// Password credential of one principal.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider_password")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub principal_id: Uuid,
    pub tenant_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub auth_data: Json,
    pub password_hash: String,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Principal }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Principal => Entity::belongs_to(principal::Entity)
                .from(Column::PrincipalId)
                .to(principal::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(
    db: &C,
    principal_id: Uuid,
    tenant_id: Uuid,
    auth_data: Json,
    password_hash: String,
) -> Result<Model, errors::ModelError> {
    if password_hash.trim().is_empty() {
        return Err(errors::ModelError::Validation("password hash required".into()));
    }
    let am = ActiveModel {
        principal_id: Set(principal_id),
        tenant_id: Set(tenant_id),
        auth_data: Set(auth_data),
        password_hash: Set(password_hash),
        updated_at: Set(Utc::now().into()),
    };
    Ok(am.insert(db).await?)
}

/// Rows whose stored `auth_data` contains every key/value of `candidate`.
pub async fn find_containing<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    candidate: Json,
) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Expr::cust_with_values("\"auth_data\" @> $1::jsonb", [candidate]))
        .order_by_asc(Column::PrincipalId)
        .all(db)
        .await?)
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    email: &str,
) -> Result<Vec<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Expr::cust_with_values("\"auth_data\" ->> 'email' = $1", [email.to_string()]))
        .order_by_asc(Column::PrincipalId)
        .all(db)
        .await?)
}

pub async fn find_by_principal<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    principal_id: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find()
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::PrincipalId.eq(principal_id))
        .one(db)
        .await?)
}

/// Overwrite auth data and hash. Returns the number of rows touched.
pub async fn update_credential<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
    principal_id: Uuid,
    auth_data: Json,
    password_hash: String,
) -> Result<u64, errors::ModelError> {
    if password_hash.trim().is_empty() {
        return Err(errors::ModelError::Validation("password hash required".into()));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = Entity::update_many()
        .col_expr(Column::AuthData, Expr::value(auth_data))
        .col_expr(Column::PasswordHash, Expr::value(password_hash))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::PrincipalId.eq(principal_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
