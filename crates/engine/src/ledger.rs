//! Pure balance replay.
//!
//! Nothing here touches the store: given the entries of one account, compute
//! the running balance chain and the account totals. The recompute operation
//! feeds this module with a fresh read and persists what comes out.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::{EngineError, EntryKind, LedgerEntry, Money, ResultEngine, SignConvention};

fn out_of_range(entry: &LedgerEntry) -> EngineError {
    EngineError::InvalidValue(format!(
        "balance of {} out of range at entry {}",
        entry.account, entry.id
    ))
}

fn checked_delta(convention: SignConvention, entry: &LedgerEntry) -> ResultEngine<Money> {
    convention
        .delta(entry.kind, entry.effect())
        .ok_or_else(|| out_of_range(entry))
}

fn accumulate(total: &mut Money, value: Money, entry: &LedgerEntry) -> ResultEngine<()> {
    *total = total.checked_add(value).ok_or_else(|| out_of_range(entry))?;
    Ok(())
}

/// Canonical order of an account: `date`, then insertion `sequence`.
pub fn canonical_order(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Closing balance for each entry, in the order given.
///
/// The entries must already be in canonical order and belong to one account.
/// Fails with [`EngineError::InvalidValue`] when the running balance leaves
/// the `i64` range.
pub fn replay(
    convention: SignConvention,
    entries: &[LedgerEntry],
) -> ResultEngine<Vec<(Uuid, Money)>> {
    let mut running = Money::ZERO;
    entries
        .iter()
        .map(|entry| -> ResultEngine<(Uuid, Money)> {
            accumulate(&mut running, checked_delta(convention, entry)?, entry)?;
            Ok((entry.id, running))
        })
        .collect()
}

/// Totals of one account, derived from its entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountTotals {
    pub entry_count: u64,
    /// Net effect of the `OPENING` entries.
    pub opening_balance: Money,
    pub total_increase: Money,
    pub total_decrease: Money,
    pub closing_balance: Money,
}

pub fn totals(convention: SignConvention, entries: &[LedgerEntry]) -> ResultEngine<AccountTotals> {
    let mut totals = AccountTotals::default();
    for entry in entries {
        let (increase, decrease) = convention.split(entry.kind, entry.effect());
        let delta = checked_delta(convention, entry)?;
        totals.entry_count += 1;
        accumulate(&mut totals.total_increase, increase, entry)?;
        accumulate(&mut totals.total_decrease, decrease, entry)?;
        accumulate(&mut totals.closing_balance, delta, entry)?;
        if entry.kind == EntryKind::Opening {
            accumulate(&mut totals.opening_balance, delta, entry)?;
        }
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::{AccountKey, EntryDetails, LedgerBook};

    fn entry(book: LedgerBook, day: u32, sequence: i64, kind: EntryKind) -> LedgerEntry {
        let now = Utc::now();
        LedgerEntry {
            id: Uuid::new_v4(),
            account: AccountKey::new(book, "ABC").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            sequence,
            kind,
            debit: Money::ZERO,
            credit: Money::ZERO,
            amount: Money::ZERO,
            closing_balance: Money::ZERO,
            details: EntryDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn credit(day: u32, sequence: i64, minor: i64) -> LedgerEntry {
        LedgerEntry {
            credit: Money::new(minor),
            ..entry(LedgerBook::Client, day, sequence, EntryKind::Sale)
        }
    }

    fn debit(day: u32, sequence: i64, minor: i64) -> LedgerEntry {
        LedgerEntry {
            debit: Money::new(minor),
            ..entry(LedgerBook::Client, day, sequence, EntryKind::Sale)
        }
    }

    fn balances(convention: SignConvention, entries: &[LedgerEntry]) -> Vec<i64> {
        replay(convention, entries)
            .unwrap()
            .into_iter()
            .map(|(_, m)| m.minor())
            .collect()
    }

    #[test]
    fn replays_credit_minus_debit() {
        let mut entries = vec![debit(5, 2, 400), credit(1, 1, 1000), credit(3, 3, 200)];
        entries.sort_by(canonical_order);
        assert_eq!(
            balances(SignConvention::CreditMinusDebit, &entries),
            vec![1000, 1200, 800]
        );
    }

    #[test]
    fn equal_dates_follow_sequence() {
        let mut entries = vec![debit(1, 9, 300), credit(1, 4, 500)];
        entries.sort_by(canonical_order);
        assert_eq!(
            balances(SignConvention::CreditMinusDebit, &entries),
            vec![500, 200]
        );
    }

    #[test]
    fn payable_replay_and_totals() {
        let amount = |day, seq, kind, minor| LedgerEntry {
            amount: Money::new(minor),
            ..entry(LedgerBook::Supplier, day, seq, kind)
        };
        let entries = vec![
            amount(1, 1, EntryKind::Opening, 5000),
            amount(2, 2, EntryKind::Purchase, 2000),
            amount(3, 3, EntryKind::Payment, 3000),
            amount(4, 4, EntryKind::Adjustment, 999),
        ];
        assert_eq!(
            balances(SignConvention::Payable, &entries),
            vec![5000, 7000, 4000, 4000]
        );

        let t = totals(SignConvention::Payable, &entries).unwrap();
        assert_eq!(t.entry_count, 4);
        assert_eq!(t.opening_balance, Money::new(5000));
        assert_eq!(t.total_increase, Money::new(7000));
        assert_eq!(t.total_decrease, Money::new(3000));
        assert_eq!(t.closing_balance, Money::new(4000));
    }

    #[test]
    fn empty_account_has_zero_totals() {
        assert_eq!(
            totals(SignConvention::CreditMinusDebit, &[]).unwrap(),
            AccountTotals::default()
        );
    }

    #[test]
    fn overflowing_balance_is_an_error() {
        let big = || credit(1, 1, i64::MAX / 2 + 1);
        let entries = vec![big(), credit(2, 2, 0), big()];
        let err = replay(SignConvention::CreditMinusDebit, &entries).unwrap_err();
        assert!(matches!(err, EngineError::InvalidValue(_)));
        assert!(err.to_string().contains(&entries[2].id.to_string()));
        assert!(totals(SignConvention::CreditMinusDebit, &entries).is_err());

        // One step back from the edge still replays.
        let fits = vec![credit(1, 1, i64::MAX - 1), credit(2, 2, 1)];
        assert_eq!(
            balances(SignConvention::CreditMinusDebit, &fits),
            vec![i64::MAX - 1, i64::MAX]
        );
    }
}
