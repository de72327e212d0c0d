use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{EngineError, LedgerBook, LedgerEntry, ResultEngine, entries};

use super::Engine;

/// One page of a book's newest-first feed.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedPage {
    pub entries: Vec<LedgerEntry>,
    /// Opaque cursor for the next (older) page, `None` on the last one.
    pub next_cursor: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct FeedCursor {
    created_at: DateTime<Utc>,
    sequence: i64,
}

impl FeedCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid feed cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid feed cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid feed cursor".to_string()))
    }
}

impl Engine {
    /// Lists the entries of a book newest first, with cursor-based
    /// pagination.
    ///
    /// Pagination is newest → older by `(created_at DESC, sequence DESC)`.
    /// The feed is for display and plays no part in balance computation.
    pub async fn feed_page(
        &self,
        book: LedgerBook,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<FeedPage> {
        if limit == 0 {
            return Err(EngineError::InvalidValue(
                "limit must be > 0".to_string(),
            ));
        }

        let limit_plus_one = limit.saturating_add(1);
        let mut query = entries::Entity::find()
            .filter(entries::Column::Book.eq(book.as_str()))
            .order_by_desc(entries::Column::CreatedAt)
            .order_by_desc(entries::Column::Sequence)
            .limit(limit_plus_one);

        if let Some(cursor) = cursor {
            let cursor = FeedCursor::decode(cursor)?;
            query = query.filter(
                Condition::any()
                    .add(entries::Column::CreatedAt.lt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(entries::Column::CreatedAt.eq(cursor.created_at))
                            .add(entries::Column::Sequence.lt(cursor.sequence)),
                    ),
            );
        }

        let rows: Vec<entries::Model> = query.all(&self.database).await?;
        let has_more = rows.len() > limit as usize;

        let mut out: Vec<LedgerEntry> = Vec::with_capacity(rows.len().min(limit as usize));
        for model in rows.into_iter().take(limit as usize) {
            out.push(LedgerEntry::try_from(model)?);
        }

        let next_cursor = out.last().map(|entry| FeedCursor {
            created_at: entry.created_at,
            sequence: entry.sequence,
        });
        let next_cursor = if has_more {
            next_cursor.map(|c| c.encode()).transpose()?
        } else {
            None
        };

        Ok(FeedPage {
            entries: out,
            next_cursor,
        })
    }
}
