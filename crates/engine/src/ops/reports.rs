use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    AccountKey, AccountTotals, EngineError, EntryKind, LedgerBook, LedgerEntry, NewEntryCmd,
    OpeningBalanceCmd, ResultEngine, SignConvention, entries, ledger,
};

use super::{Engine, entries::prepare_entry, with_tx};

/// Entries of one account with their closing balances and totals.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountStatement {
    pub account: AccountKey,
    pub entries: Vec<LedgerEntry>,
    pub totals: AccountTotals,
}

impl AccountStatement {
    pub(super) fn new(account: AccountKey, entries: Vec<LedgerEntry>) -> ResultEngine<Self> {
        let totals = ledger::totals(account.book.convention(), &entries)?;
        Ok(Self {
            account,
            entries,
            totals,
        })
    }
}

/// One row of the per-book account overview.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountSummary {
    pub account: AccountKey,
    pub totals: AccountTotals,
}

impl AccountSummary {
    /// Summarizes a non-empty run of entries of one account.
    fn new(entries: Vec<LedgerEntry>) -> ResultEngine<Self> {
        let statement = AccountStatement::new(entries[0].account.clone(), entries)?;
        Ok(Self {
            account: statement.account,
            totals: statement.totals,
        })
    }
}

impl Engine {
    /// Statement of one account, read under the account lock.
    pub async fn account_statement(
        &self,
        book: LedgerBook,
        account: &str,
    ) -> ResultEngine<AccountStatement> {
        let key = AccountKey::new(book, account)?;
        let _guard = self.locks.lock([&key]).await;
        let entries = self.load_account(&self.database, &key).await?;
        AccountStatement::new(key, entries)
    }

    /// Totals of every account of a book, ordered by account name.
    pub async fn account_summaries(&self, book: LedgerBook) -> ResultEngine<Vec<AccountSummary>> {
        let models = entries::Entity::find()
            .filter(entries::Column::Book.eq(book.as_str()))
            .order_by_asc(entries::Column::Account)
            .order_by_asc(entries::Column::Date)
            .order_by_asc(entries::Column::Sequence)
            .all(&self.database)
            .await?;

        let mut out: Vec<AccountSummary> = Vec::new();
        let mut group: Vec<LedgerEntry> = Vec::new();
        for model in models {
            let entry = LedgerEntry::try_from(model)?;
            if let Some(first) = group.first()
                && first.account != entry.account
            {
                out.push(AccountSummary::new(std::mem::take(&mut group))?);
            }
            group.push(entry);
        }
        if !group.is_empty() {
            out.push(AccountSummary::new(group)?);
        }
        Ok(out)
    }

    /// Replaces the opening balance of an account.
    ///
    /// Every existing `OPENING` entry of the account is removed and a single
    /// new one is booked: in `amount` for the supplier book, in `credit`
    /// elsewhere.
    pub async fn set_opening_balance(&self, cmd: OpeningBalanceCmd) -> ResultEngine<LedgerEntry> {
        let key = AccountKey::new(cmd.book, &cmd.account)?;
        let date = cmd.date.unwrap_or_else(|| Utc::now().date_naive());
        let note = cmd
            .note
            .unwrap_or_else(|| "Opening balance set".to_string());

        let mut new = NewEntryCmd::new(cmd.book)
            .account(key.name.clone())
            .date(date)
            .kind(EntryKind::Opening)
            .note(note);
        new = match cmd.book.convention() {
            SignConvention::Payable => new.amount(cmd.amount),
            SignConvention::CreditMinusDebit => new.credit(cmd.amount),
        };
        let entry = prepare_entry(new)?;

        let _guard = self.locks.lock([&key]).await;
        let entry = {
            let _seq = self.sequence.lock().await;
            with_tx!(self, |db_tx| {
                let removed = entries::Entity::delete_many()
                    .filter(entries::Column::Book.eq(key.book.as_str()))
                    .filter(entries::Column::Account.eq(key.name.as_str()))
                    .filter(entries::Column::Kind.eq(EntryKind::Opening.as_str()))
                    .exec(&db_tx)
                    .await?;
                tracing::debug!(account = %key, removed = removed.rows_affected, "replacing opening balance");
                let entry = self.insert_entry(&db_tx, entry).await?;
                self.check_replay(&db_tx, &key).await?;
                Ok::<_, EngineError>(entry)
            })?
        };

        let chain = self.recompute_locked(&key).await?;
        Ok(chain
            .into_iter()
            .find(|e| e.id == entry.id)
            .unwrap_or(entry))
    }
}
