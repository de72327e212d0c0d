use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{
    Client, ClientPatch, EngineError, NewClientCmd, ResultEngine,
    clients::{self, client_name_key},
};

use super::{Engine, apply_optional_text_patch, normalize_optional_text, with_tx};

fn normalize_client_name(name: &str) -> ResultEngine<String> {
    client_name_key(name)?;
    Ok(name.trim().nfc().collect())
}

impl Engine {
    async fn ensure_client_name_free<C: ConnectionTrait>(
        &self,
        db: &C,
        name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query =
            clients::Entity::find().filter(clients::Column::NameNorm.eq(client_name_key(name)?));
        if let Some(id) = except {
            query = query.filter(clients::Column::Id.ne(id.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        Ok(())
    }

    async fn require_client<C: ConnectionTrait>(&self, db: &C, id: Uuid) -> ResultEngine<Client> {
        let model = clients::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("client not exists".to_string()))?;
        Client::try_from(model)
    }

    /// Adds a client to the directory. Names are unique ignoring case.
    pub async fn create_client(&self, cmd: NewClientCmd) -> ResultEngine<Client> {
        let name = normalize_client_name(&cmd.name)?;
        with_tx!(self, |db_tx| {
            self.ensure_client_name_free(&db_tx, &name, None).await?;

            let now = Utc::now();
            let client = Client {
                id: Uuid::new_v4(),
                name,
                phone: normalize_optional_text(cmd.phone.as_deref()),
                address: normalize_optional_text(cmd.address.as_deref()),
                opening_balance: cmd.opening_balance,
                remarks: normalize_optional_text(cmd.remarks.as_deref()),
                created_at: now,
                updated_at: now,
            };
            clients::ActiveModel::try_from(&client)?
                .insert(&db_tx)
                .await?;
            Ok(client)
        })
    }

    /// Every client, ordered by name.
    pub async fn clients(&self) -> ResultEngine<Vec<Client>> {
        clients::Entity::find()
            .order_by_asc(clients::Column::NameNorm)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Client::try_from)
            .collect()
    }

    pub async fn client(&self, id: Uuid) -> ResultEngine<Client> {
        self.require_client(&self.database, id).await
    }

    pub async fn update_client(&self, id: Uuid, patch: ClientPatch) -> ResultEngine<Client> {
        let name = patch
            .name
            .as_deref()
            .map(normalize_client_name)
            .transpose()?;
        with_tx!(self, |db_tx| {
            let mut client = self.require_client(&db_tx, id).await?;
            if let Some(name) = name {
                self.ensure_client_name_free(&db_tx, &name, Some(id)).await?;
                client.name = name;
            }
            client.phone = apply_optional_text_patch(client.phone.take(), patch.phone.as_deref());
            client.address =
                apply_optional_text_patch(client.address.take(), patch.address.as_deref());
            client.remarks =
                apply_optional_text_patch(client.remarks.take(), patch.remarks.as_deref());
            if let Some(opening_balance) = patch.opening_balance {
                client.opening_balance = opening_balance;
            }
            client.updated_at = Utc::now();

            clients::ActiveModel::try_from(&client)?
                .update(&db_tx)
                .await?;
            Ok(client)
        })
    }

    /// Removes a client from the directory. Ledger entries are kept.
    pub async fn delete_client(&self, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let result = clients::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("client not exists".to_string()));
            }
            Ok(())
        })
    }
}
