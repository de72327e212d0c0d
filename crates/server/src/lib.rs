use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod clients;
mod entries;
mod server;
mod stock;
mod wire;

pub mod types {
    pub mod entry {
        pub use api_types::entry::{
            EntryExpense, EntryListQuery, EntryListResponse, EntryNew, EntryUpdate, EntryView,
            FeedQuery, FeedResponse,
        };
    }

    pub mod account {
        pub use api_types::account::{
            AccountListResponse, AccountStatementView, AccountSummaryView, AccountTotalsView,
            OpeningBalanceSet,
        };
    }

    pub mod client {
        pub use api_types::client::{ClientListResponse, ClientNew, ClientUpdate, ClientView};
    }

    pub mod stock {
        pub use api_types::stock::{
            ManualPaidSet, ManualPaidView, StockListQuery, StockListResponse, StockNew,
            StockStatusSet, StockSummaryView, StockUpdate, StockView,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::PartialRecompute { .. } | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::MissingField(_)
        | EngineError::InvalidValue(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody {
                error: "internal server error".to_string(),
                details: None,
            }
        }
        EngineError::PartialRecompute {
            ref account,
            failed_entry,
            last_updated,
            ..
        } => ErrorBody {
            details: Some(serde_json::json!({
                "book": account.book.as_str(),
                "account": account.name,
                "failed_entry": failed_entry,
                "last_updated": last_updated,
            })),
            error: err.to_string(),
        },
        other => ErrorBody {
            error: other.to_string(),
            details: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::{AccountKey, LedgerBook};
    use sea_orm::DbErr;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::MissingField("date".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let res = ServerError::from(EngineError::InvalidCursor("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn partial_recompute_maps_to_500() {
        let account = AccountKey::new(LedgerBook::Client, "ABC").unwrap();
        let err = EngineError::PartialRecompute {
            account,
            failed_entry: Uuid::new_v4(),
            last_updated: None,
            source: DbErr::Custom("disk full".to_string()),
        };
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn database_error_maps_to_500() {
        let err = EngineError::Database(DbErr::Custom("boom".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
