use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verify_code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: String,
    pub record_key: String,
    pub record_value: String,
    pub code: String,
    pub consumed: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn insert<C: ConnectionTrait>(db: &C, model: Model) -> Result<Model, errors::ModelError> {
    if model.code.is_empty() {
        return Err(errors::ModelError::Validation("code required".into()));
    }
    let am = ActiveModel {
        id: Set(model.id),
        tenant_id: Set(model.tenant_id),
        user_id: Set(model.user_id),
        record_key: Set(model.record_key),
        record_value: Set(model.record_value),
        code: Set(model.code),
        consumed: Set(model.consumed),
        created_at: Set(model.created_at),
    };
    Ok(am.insert(db).await?)
}
