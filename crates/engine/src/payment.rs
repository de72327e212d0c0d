//! Payment details attached to ledger entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Cheque,
    Online,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Bank => "BANK",
            Self::Cheque => "CHEQUE",
            Self::Online => "ONLINE",
            Self::Credit => "CREDIT",
        }
    }

    fn keeps_bank_name(self) -> bool {
        matches!(self, Self::Bank | Self::Cheque | Self::Online)
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "BANK" | "BANK_TRANSFER" => Ok(Self::Bank),
            "CHEQUE" => Ok(Self::Cheque),
            "ONLINE" => Ok(Self::Online),
            "CREDIT" => Ok(Self::Credit),
            other => Err(EngineError::InvalidValue(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: Option<PaymentMethod>,
    pub bank_name: Option<String>,
    pub cheque_no: Option<String>,
    pub cheque_date: Option<NaiveDate>,
    pub transaction_reference: Option<String>,
}

impl PaymentDetails {
    /// Drops the references that do not belong to the chosen method.
    ///
    /// A bank name survives only for bank, cheque and online payments; cheque
    /// number and date only for cheques. Without a method nothing is dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let Some(method) = self.method else {
            return self;
        };
        if !method.keeps_bank_name() {
            self.bank_name = None;
        }
        if method != PaymentMethod::Cheque {
            self.cheque_no = None;
            self.cheque_date = None;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(method: PaymentMethod) -> PaymentDetails {
        PaymentDetails {
            method: Some(method),
            bank_name: Some("HDFC".to_string()),
            cheque_no: Some("000123".to_string()),
            cheque_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            transaction_reference: Some("UTR-9".to_string()),
        }
    }

    #[test]
    fn cash_drops_bank_and_cheque_fields() {
        let d = details(PaymentMethod::Cash).normalized();
        assert_eq!(d.bank_name, None);
        assert_eq!(d.cheque_no, None);
        assert_eq!(d.cheque_date, None);
        assert_eq!(d.transaction_reference.as_deref(), Some("UTR-9"));
    }

    #[test]
    fn bank_keeps_bank_name_only() {
        let d = details(PaymentMethod::Bank).normalized();
        assert_eq!(d.bank_name.as_deref(), Some("HDFC"));
        assert_eq!(d.cheque_no, None);
    }

    #[test]
    fn cheque_keeps_everything() {
        let d = details(PaymentMethod::Cheque).normalized();
        assert_eq!(d, details(PaymentMethod::Cheque));
    }

    #[test]
    fn bank_transfer_is_an_alias() {
        assert_eq!(
            PaymentMethod::try_from("bank_transfer").unwrap(),
            PaymentMethod::Bank
        );
        assert!(PaymentMethod::try_from("barter").is_err());
    }
}
