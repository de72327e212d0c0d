//! Per-account serialization.
//!
//! Two recomputes of one account must never interleave their writes, and a
//! reader must not observe a chain that is being rewritten. Each account gets
//! an async mutex; the table only keeps weak handles so idle accounts vanish.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex, PoisonError, Weak},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::AccountKey;

#[derive(Debug, Default)]
pub(crate) struct AccountLocks {
    table: StdMutex<HashMap<AccountKey, Weak<Mutex<()>>>>,
}

/// Held while an operation owns one or more accounts.
#[derive(Debug)]
pub(crate) struct AccountGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl AccountLocks {
    fn handle(&self, key: &AccountKey) -> Arc<Mutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.retain(|_, weak| weak.strong_count() > 0);
        if let Some(existing) = table.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let fresh = Arc::new(Mutex::new(()));
        table.insert(key.clone(), Arc::downgrade(&fresh));
        fresh
    }

    /// Locks every given account, in key order so that two callers asking
    /// for overlapping sets cannot deadlock.
    pub(crate) async fn lock<'a, I>(&self, keys: I) -> AccountGuard
    where
        I: IntoIterator<Item = &'a AccountKey>,
    {
        let mut keys: Vec<&AccountKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let handles: Vec<Arc<Mutex<()>>> = keys.iter().map(|key| self.handle(key)).collect();
        let mut guards = Vec::with_capacity(handles.len());
        for handle in handles {
            guards.push(handle.lock_owned().await);
        }
        AccountGuard { _guards: guards }
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.values().filter(|w| w.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::LedgerBook;

    fn key(name: &str) -> AccountKey {
        AccountKey::new(LedgerBook::Client, name).unwrap()
    }

    #[tokio::test]
    async fn same_account_is_exclusive() {
        let locks = Arc::new(AccountLocks::default());
        let a = key("A");

        let guard = locks.lock([&a]).await;
        let contender = {
            let locks = Arc::clone(&locks);
            let a = a.clone();
            tokio::spawn(async move {
                let _g = locks.lock([&a]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_accounts_do_not_block() {
        let locks = AccountLocks::default();
        let (a, b) = (key("A"), key("B"));
        let _ga = locks.lock([&a]).await;
        let _gb = locks.lock([&b]).await;
        assert_eq!(locks.live(), 2);
    }

    #[tokio::test]
    async fn released_accounts_are_pruned() {
        let locks = AccountLocks::default();
        let (a, b) = (key("A"), key("B"));
        drop(locks.lock([&a, &b, &a]).await);
        assert_eq!(locks.live(), 0);
        let _g = locks.lock([&a]).await;
        assert_eq!(locks.live(), 1);
    }
}
