use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{AccountKey, EngineError, LedgerBook, LedgerEntry, ResultEngine, entries, ledger};

use super::{Engine, reports::AccountStatement};

impl Engine {
    /// Entries of one account in canonical `(date, sequence)` order.
    pub(super) async fn load_account<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &AccountKey,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        entries::Entity::find()
            .filter(entries::Column::Book.eq(key.book.as_str()))
            .filter(entries::Column::Account.eq(key.name.as_str()))
            .order_by_asc(entries::Column::Date)
            .order_by_asc(entries::Column::Sequence)
            .all(db)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }

    /// Replays the account as `db` sees it, without writing anything.
    ///
    /// Mutations call this inside their transaction so that an entry whose
    /// balance cannot be represented is rolled back instead of committed.
    pub(super) async fn check_replay<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &AccountKey,
    ) -> ResultEngine<()> {
        let chain = self.load_account(db, key).await?;
        ledger::replay(key.book.convention(), &chain)?;
        Ok(())
    }

    /// Replays the account and rewrites every closing balance, one entry at
    /// a time in canonical order.
    ///
    /// The caller must hold the account lock. On a failed write the earlier
    /// entries are already correct and [`EngineError::PartialRecompute`]
    /// names where it stopped.
    pub(super) async fn recompute_locked(&self, key: &AccountKey) -> ResultEngine<Vec<LedgerEntry>> {
        let mut chain = self.load_account(&self.database, key).await?;
        let balances = ledger::replay(key.book.convention(), &chain)?;

        let mut last_updated: Option<Uuid> = None;
        for (entry, (id, closing)) in chain.iter_mut().zip(balances) {
            let written = entries::Entity::update_many()
                .col_expr(
                    entries::Column::ClosingBalanceMinor,
                    Expr::value(closing.minor()),
                )
                .filter(entries::Column::Id.eq(id.to_string()))
                .exec(&self.database)
                .await;
            if let Err(source) = written {
                tracing::error!(
                    account = %key,
                    failed_entry = %id,
                    last_updated = ?last_updated,
                    "recompute stopped: {source}"
                );
                return Err(EngineError::PartialRecompute {
                    account: key.clone(),
                    failed_entry: id,
                    last_updated,
                    source,
                });
            }
            entry.closing_balance = closing;
            last_updated = Some(id);
        }

        tracing::debug!(
            account = %key,
            entries = chain.len(),
            balance = %chain.last().map(|e| e.closing_balance).unwrap_or_default(),
            "recomputed account"
        );
        Ok(chain)
    }

    /// Recomputes one account from scratch.
    ///
    /// Safe to call at any time, in particular to repair an account after a
    /// [`EngineError::PartialRecompute`].
    pub async fn recompute(&self, book: LedgerBook, account: &str) -> ResultEngine<AccountStatement> {
        let key = AccountKey::new(book, account)?;
        let _guard = self.locks.lock([&key]).await;
        let entries = self.recompute_locked(&key).await?;
        AccountStatement::new(key, entries)
    }

    /// Recomputes every account of a book, returning the accounts touched.
    pub async fn recompute_book(&self, book: LedgerBook) -> ResultEngine<Vec<AccountKey>> {
        let accounts = self.account_names(book).await?;
        for key in &accounts {
            let _guard = self.locks.lock([key]).await;
            self.recompute_locked(key).await?;
        }
        tracing::info!(book = %book, accounts = accounts.len(), "recomputed book");
        Ok(accounts)
    }

    pub(super) async fn account_names(&self, book: LedgerBook) -> ResultEngine<Vec<AccountKey>> {
        let names: Vec<String> = entries::Entity::find()
            .select_only()
            .column(entries::Column::Account)
            .distinct()
            .filter(entries::Column::Book.eq(book.as_str()))
            .order_by_asc(entries::Column::Account)
            .into_tuple()
            .all(&self.database)
            .await?;
        Ok(names
            .into_iter()
            .map(|name| AccountKey::stored(book, name))
            .collect())
    }
}
