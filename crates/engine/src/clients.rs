//! Client directory records.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Money,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lookup key for client names: trimmed, NFC, lower-cased.
pub(crate) fn client_name_key(name: &str) -> ResultEngine<String> {
    let key: String = name.trim().nfc().collect::<String>().to_lowercase();
    if key.is_empty() {
        return Err(EngineError::MissingField("name".to_string()));
    }
    Ok(key)
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance_minor: i64,
    pub remarks: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Client> for ActiveModel {
    type Error = EngineError;

    fn try_from(client: &Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(client.id.to_string()),
            name: ActiveValue::Set(client.name.clone()),
            name_norm: ActiveValue::Set(client_name_key(&client.name)?),
            phone: ActiveValue::Set(client.phone.clone()),
            address: ActiveValue::Set(client.address.clone()),
            opening_balance_minor: ActiveValue::Set(client.opening_balance.minor()),
            remarks: ActiveValue::Set(client.remarks.clone()),
            created_at: ActiveValue::Set(client.created_at),
            updated_at: ActiveValue::Set(client.updated_at),
        })
    }
}

impl TryFrom<Model> for Client {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "client")?,
            name: model.name,
            phone: model.phone,
            address: model.address,
            opening_balance: Money::new(model.opening_balance_minor),
            remarks: model.remarks,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
