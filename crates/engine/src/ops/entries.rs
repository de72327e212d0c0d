use chrono::{NaiveDate, Utc};
use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    AccountKey, EngineError, EntryDetails, EntryKind, EntryPatch, LedgerBook, LedgerEntry,
    Money, NewEntryCmd, ResultEngine, SignConvention, entries, stock,
};

use super::{
    Engine, apply_optional_date_patch, apply_optional_text_patch, locks::AccountGuard,
    normalize_optional_text, with_tx,
};

/// Sort order of [`Engine::list_entries`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// `(date, sequence)`, the order balances are computed in.
    #[default]
    Chronological,
    /// `(account, date, sequence)`, grouping accounts together.
    ByAccount,
    /// `(created_at desc, sequence desc)`, for display only.
    NewestFirst,
}

impl TryFrom<&str> for EntryOrder {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "date" | "chronological" => Ok(Self::Chronological),
            "account" => Ok(Self::ByAccount),
            "newest" | "created_desc" => Ok(Self::NewestFirst),
            other => Err(EngineError::InvalidValue(format!("invalid order: {other}"))),
        }
    }
}

/// Filters for listing entries of a book.
///
/// `from` and `to` are both inclusive.
#[derive(Clone, Debug, Default)]
pub struct EntryListFilter {
    pub account: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<EntryKind>,
    pub order: EntryOrder,
}

fn normalize_details(details: EntryDetails) -> EntryDetails {
    EntryDetails {
        description: normalize_optional_text(details.description.as_deref()),
        note: normalize_optional_text(details.note.as_deref()),
        product_type: normalize_optional_text(details.product_type.as_deref()),
        invoice_number: normalize_optional_text(details.invoice_number.as_deref()),
        other_expense_name: normalize_optional_text(details.other_expense_name.as_deref()),
        payment: crate::PaymentDetails {
            bank_name: normalize_optional_text(details.payment.bank_name.as_deref()),
            cheque_no: normalize_optional_text(details.payment.cheque_no.as_deref()),
            transaction_reference: normalize_optional_text(
                details.payment.transaction_reference.as_deref(),
            ),
            ..details.payment
        }
        .normalized(),
        ..details
    }
}

fn apply_patch(entry: &mut LedgerEntry, patch: EntryPatch) {
    if let Some(date) = patch.date {
        entry.date = date;
    }
    if let Some(kind) = patch.kind {
        entry.kind = kind;
    }
    if let Some(debit) = patch.debit {
        entry.debit = debit;
    }
    if let Some(credit) = patch.credit {
        entry.credit = credit;
    }
    if let Some(amount) = patch.amount {
        entry.amount = amount;
    }

    let d = &mut entry.details;
    d.description = apply_optional_text_patch(d.description.take(), patch.description.as_deref());
    d.note = apply_optional_text_patch(d.note.take(), patch.note.as_deref());
    d.product_type =
        apply_optional_text_patch(d.product_type.take(), patch.product_type.as_deref());
    if let Some(quantity) = patch.quantity {
        d.quantity = quantity;
    }
    if let Some(rate) = patch.rate {
        d.rate = rate;
    }
    if let Some(loading) = patch.loading {
        d.loading = loading;
    }
    if let Some(mdays) = patch.mdays {
        d.mdays = mdays;
    }
    d.due_date = apply_optional_date_patch(d.due_date, patch.due_date);
    d.lifting_date = apply_optional_date_patch(d.lifting_date, patch.lifting_date);
    d.invoice_number =
        apply_optional_text_patch(d.invoice_number.take(), patch.invoice_number.as_deref());
    d.invoice_date = apply_optional_date_patch(d.invoice_date, patch.invoice_date);
    d.other_expense_name = apply_optional_text_patch(
        d.other_expense_name.take(),
        patch.other_expense_name.as_deref(),
    );
    if let Some(amount) = patch.other_expense_amount {
        d.other_expense_amount = amount;
    }

    let p = &mut d.payment;
    p.bank_name = apply_optional_text_patch(p.bank_name.take(), patch.bank_name.as_deref());
    p.cheque_no = apply_optional_text_patch(p.cheque_no.take(), patch.cheque_no.as_deref());
    p.cheque_date = apply_optional_date_patch(p.cheque_date, patch.cheque_date);
    p.transaction_reference = apply_optional_text_patch(
        p.transaction_reference.take(),
        patch.transaction_reference.as_deref(),
    );
    if let Some(method) = patch.payment_method {
        p.method = Some(method);
        *p = std::mem::take(p).normalized();
    }
}

impl Engine {
    pub(super) async fn require_entry_model<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
    ) -> ResultEngine<entries::Model> {
        entries::Entity::find_by_id(id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("entry not exists".to_string()))
    }

    /// Next value of the global insertion order.
    ///
    /// Callers hold `self.sequence` until their transaction commits.
    pub(super) async fn next_sequence<C: ConnectionTrait>(&self, db: &C) -> ResultEngine<i64> {
        let max: Option<Option<i64>> = entries::Entity::find()
            .select_only()
            .column_as(entries::Column::Sequence.max(), "max_sequence")
            .into_tuple()
            .one(db)
            .await?;
        Ok(max.flatten().unwrap_or(0) + 1)
    }

    /// Locks the account an entry currently belongs to (plus `extra`).
    ///
    /// The entry is read again once the lock is held; if it moved to another
    /// account in between, the lock is released and taken again.
    pub(super) async fn lock_entry(
        &self,
        id: Uuid,
        extra: Option<&AccountKey>,
    ) -> ResultEngine<(LedgerEntry, AccountGuard)> {
        loop {
            let seen = LedgerEntry::try_from(self.require_entry_model(&self.database, id).await?)?;
            let guard = self
                .locks
                .lock(std::iter::once(&seen.account).chain(extra))
                .await;
            let current =
                LedgerEntry::try_from(self.require_entry_model(&self.database, id).await?)?;
            if current.account == seen.account {
                return Ok((current, guard));
            }
        }
    }
}

/// Builds a new entry from a command, validating the required fields and
/// the range of its amounts.
///
/// The sequence is assigned on insert.
pub(super) fn prepare_entry(cmd: NewEntryCmd) -> ResultEngine<LedgerEntry> {
    let account = cmd
        .account
        .as_deref()
        .ok_or_else(|| EngineError::MissingField("account".to_string()))?;
    let account = AccountKey::new(cmd.book, account)?;
    let date = cmd
        .date
        .ok_or_else(|| EngineError::MissingField("date".to_string()))?;
    let amount = match (cmd.book.convention(), cmd.amount) {
        (SignConvention::Payable, None) => {
            return Err(EngineError::MissingField("amount".to_string()));
        }
        (_, amount) => amount.unwrap_or_default(),
    };

    let now = Utc::now();
    let entry = LedgerEntry {
        id: Uuid::new_v4(),
        account,
        date,
        sequence: 0,
        kind: cmd.kind.unwrap_or_else(|| cmd.book.default_kind()),
        debit: cmd.debit,
        credit: cmd.credit,
        amount,
        closing_balance: Money::ZERO,
        details: normalize_details(cmd.details),
        created_at: now,
        updated_at: now,
    };
    entry.check_limits()?;
    Ok(entry)
}

impl Engine {
    /// Inserts a prepared entry, assigning its sequence inside `db`.
    pub(super) async fn insert_entry<C: ConnectionTrait>(
        &self,
        db: &C,
        mut entry: LedgerEntry,
    ) -> ResultEngine<LedgerEntry> {
        entry.sequence = self.next_sequence(db).await?;
        entries::ActiveModel::from(&entry).insert(db).await?;
        Ok(entry)
    }

    /// Creates an entry and recomputes its account.
    pub async fn create_entry(&self, cmd: NewEntryCmd) -> ResultEngine<LedgerEntry> {
        let entry = prepare_entry(cmd)?;
        let key = entry.account.clone();
        let _guard = self.locks.lock([&key]).await;

        let entry = {
            let _seq = self.sequence.lock().await;
            with_tx!(self, |db_tx| {
                let entry = self.insert_entry(&db_tx, entry).await?;
                self.check_replay(&db_tx, &key).await?;
                Ok::<_, EngineError>(entry)
            })?
        };
        tracing::debug!(entry = %entry.id, account = %key, "created entry");

        let chain = self.recompute_locked(&key).await?;
        Ok(find_in_chain(chain, entry.id).unwrap_or(entry))
    }

    /// Applies a partial update and recomputes the affected account(s).
    ///
    /// When the account changes, both the old and the new account are
    /// recomputed.
    pub async fn update_entry(&self, id: Uuid, patch: EntryPatch) -> ResultEngine<LedgerEntry> {
        // The book of an entry never changes; the new key needs it.
        let book = self.entry(id).await?.account.book;
        let new_key = patch
            .account
            .as_deref()
            .map(|name| AccountKey::new(book, name))
            .transpose()?;

        let (mut entry, _guard) = self.lock_entry(id, new_key.as_ref()).await?;
        let old_key = entry.account.clone();

        apply_patch(&mut entry, patch);
        if let Some(key) = new_key {
            entry.account = key;
        }
        entry.updated_at = Utc::now();
        entry.check_limits()?;

        let mut keys = vec![old_key.clone(), entry.account.clone()];
        keys.sort();
        keys.dedup();

        with_tx!(self, |db_tx| {
            entries::ActiveModel::from(&entry).update(&db_tx).await?;
            for key in &keys {
                self.check_replay(&db_tx, key).await?;
            }
            Ok::<_, EngineError>(())
        })?;
        tracing::debug!(entry = %id, from = %old_key, to = %entry.account, "updated entry");

        // Every touched account is recomputed even if an earlier one fails;
        // the first failure is reported.
        let mut updated = None;
        let mut failure = None;
        for key in &keys {
            match self.recompute_locked(key).await {
                Ok(chain) if *key == entry.account => updated = find_in_chain(chain, id),
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(entry = %id, account = %key, "recompute after update failed: {err}");
                    failure.get_or_insert(err);
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(updated.unwrap_or(entry)),
        }
    }

    /// Sets the "other expense" pair of an entry, both fields at once.
    pub async fn set_entry_expense(
        &self,
        id: Uuid,
        name: Option<String>,
        amount: Money,
    ) -> ResultEngine<LedgerEntry> {
        let patch = EntryPatch {
            other_expense_name: Some(name.unwrap_or_default()),
            other_expense_amount: Some(amount),
            ..EntryPatch::default()
        };
        self.update_entry(id, patch).await
    }

    /// Deletes an entry and recomputes the account it belonged to.
    ///
    /// A supplier purchase booked by a stock lot cannot be deleted while the
    /// lot exists.
    pub async fn delete_entry(&self, id: Uuid) -> ResultEngine<LedgerEntry> {
        let (entry, _guard) = self.lock_entry(id, None).await?;

        if let Some(stock_id) = entry.details.stock_entry_id {
            let lot = stock::Entity::find_by_id(stock_id.to_string())
                .one(&self.database)
                .await?;
            if lot.is_some() {
                return Err(EngineError::Conflict(format!(
                    "entry {id} belongs to stock entry {stock_id}; delete the stock entry instead"
                )));
            }
        }

        with_tx!(self, |db_tx| {
            entries::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok::<_, EngineError>(())
        })?;
        tracing::debug!(entry = %id, account = %entry.account, "deleted entry");

        self.recompute_locked(&entry.account).await?;
        Ok(entry)
    }

    /// Returns a single entry.
    pub async fn entry(&self, id: Uuid) -> ResultEngine<LedgerEntry> {
        LedgerEntry::try_from(self.require_entry_model(&self.database, id).await?)
    }

    /// Entries of one account in canonical order, read under the account
    /// lock.
    pub async fn account_entries(
        &self,
        book: LedgerBook,
        account: &str,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        let key = AccountKey::new(book, account)?;
        let _guard = self.locks.lock([&key]).await;
        self.load_account(&self.database, &key).await
    }

    /// Entries of a book, filtered and ordered.
    pub async fn list_entries(
        &self,
        book: LedgerBook,
        filter: &EntryListFilter,
    ) -> ResultEngine<Vec<LedgerEntry>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(EngineError::InvalidValue(
                "invalid range: from must be <= to".to_string(),
            ));
        }

        let mut query = entries::Entity::find().filter(entries::Column::Book.eq(book.as_str()));
        if let Some(account) = filter.account.as_deref() {
            let key = AccountKey::new(book, account)?;
            query = query.filter(entries::Column::Account.eq(key.name));
        }
        if let Some(from) = filter.from {
            query = query.filter(entries::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(entries::Column::Date.lte(to));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(entries::Column::Kind.eq(kind.as_str()));
        }

        query = match filter.order {
            EntryOrder::Chronological => query
                .order_by_asc(entries::Column::Date)
                .order_by_asc(entries::Column::Sequence),
            EntryOrder::ByAccount => query
                .order_by_asc(entries::Column::Account)
                .order_by_asc(entries::Column::Date)
                .order_by_asc(entries::Column::Sequence),
            EntryOrder::NewestFirst => query
                .order_by_desc(entries::Column::CreatedAt)
                .order_by_desc(entries::Column::Sequence),
        };

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }
}

fn find_in_chain(chain: Vec<LedgerEntry>, id: Uuid) -> Option<LedgerEntry> {
    chain.into_iter().find(|entry| entry.id == id)
}
