//! Kraken API error registry
//!
//! Kraken reports errors as strings of the form
//! `<severity><category>:<message>[:<detail>]`, e.g. `EOrder:Insufficient funds`
//! or `EGeneral:Invalid arguments:Index unavailable`. [`ApiError::classify`]
//! matches such a string against a fixed, ordered table of known errors and
//! falls back to [`ApiErrorKind::Unknown`] when nothing matches.

use thiserror::Error;

/// Error severity, the first character of an error string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// `E`
    Error,
    /// `W`
    Warning,
    /// Any other leading character
    Other(char),
}

impl Severity {
    pub fn from_char(c: char) -> Self {
        match c {
            'E' => Self::Error,
            'W' => Self::Warning,
            other => Self::Other(other),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warning => 'W',
            Self::Other(c) => *c,
        }
    }
}

/// Known error categories
pub mod category {
    pub const GENERAL: &str = "General";
    pub const BM: &str = "BM";
    pub const AUTH: &str = "Auth";
    pub const API: &str = "API";
    pub const QUERY: &str = "Query";
    pub const ORDER: &str = "Order";
    pub const TRADE: &str = "Trade";
    pub const FUNDING: &str = "Funding";
    pub const SERVICE: &str = "Service";
    pub const SESSION: &str = "Session";
}

/// Every known Kraken error, plus the unknown fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    InvalidArguments,
    InvalidIndex,
    InvalidPair,
    ServiceUnavailable,
    CancelOnlyMode,
    PostOnlyMode,
    DeadlineElapsed,
    InvalidKey,
    InvalidSignature,
    InvalidNonce,
    PermissionDenied,
    IneligibleMarginTrading,
    MarginAllowanceExceeded,
    InsufficientEquity,
    ExceedsMaximumPosition,
    ExchangeMargin,
    AccountBalanceLow,
    OrderMinimum,
    CostMinimum,
    PriceTickSize,
    OrderLimit,
    RateLimitExceeded,
    DomainRateLimitExceeded,
    PositionsLimitExceeded,
    PositionUnknown,
    CalLimitExceeded,
    WithdrawalFee,
    AssetPairUnknown,
    SessionInvalid,
    EndpointInvalid,
    BadRequest,
    Lockout,
    PositionOpposing,
    OrderNotEditable,
    LeavesQuantityInvalid,
    VolumeMinimumNotMet,
    VolumeMaximumExceeded,
    IcebergOrderIncompatible,
    AddressLimit,
    FundingMethodMissing,
    WithdrawalKeyUnknown,
    WithdrawalAmountMinimum,
    FundingGeneral,
    FundingUnavailable,
    FundingBusy,
    ServiceError,
    TradeLocked,
    FeatureDisabled,
    BeneficiaryUnknown,
    /// Not in the registry; the parsed fields are kept on the error
    Unknown,
}

/// One registry entry
#[derive(Debug, Clone, Copy)]
pub struct KnownError {
    pub kind: ApiErrorKind,
    pub severity: Severity,
    pub category: &'static str,
    pub message: &'static str,
    pub detail: Option<&'static str>,
    pub description: &'static str,
}

const fn known(
    kind: ApiErrorKind,
    category: &'static str,
    message: &'static str,
    detail: Option<&'static str>,
    description: &'static str,
) -> KnownError {
    KnownError {
        kind,
        severity: Severity::Error,
        category,
        message,
        detail,
        description,
    }
}

const SERVICE_TEMPORARY: &str = "The service errors you are experiencing should only be temporary. \
     You may wish to resubmit your requests if they have failed. \
     We will be monitoring the issues and will update our page: https://status.kraken.com/";

/// The registry, in match order
///
/// Entries with a detail sit after the general entry they refine (e.g.
/// `InvalidPair` after `InvalidArguments`) yet still win, because
/// [`ApiError::classify`] scans for an exact detail match before falling back
/// to detail-less entries.
pub static KNOWN_ERRORS: &[KnownError] = &[
    known(ApiErrorKind::InvalidArguments, category::GENERAL, "Invalid arguments", None,
        "The request payload is malformed, incorrect or ambiguous"),
    known(ApiErrorKind::InvalidIndex, category::GENERAL, "Index unavailable", None,
        "Index pricing is unavailable for stop/profit orders on this pair"),
    known(ApiErrorKind::InvalidPair, category::GENERAL, "Invalid arguments", Some("Index unavailable"),
        "Index pricing is unavailable for stop/profit orders on this pair"),
    known(ApiErrorKind::ServiceUnavailable, category::SERVICE, "Unavailable", None,
        "The matching engine or API is offline"),
    known(ApiErrorKind::CancelOnlyMode, category::SERVICE, "Market in cancel_only mode", None,
        "Request can't be made at this time (See SystemStatus endpoint)"),
    known(ApiErrorKind::PostOnlyMode, category::SERVICE, "Market in post_only mode", None,
        "Request can't be made at this time (See SystemStatus endpoint)"),
    known(ApiErrorKind::DeadlineElapsed, category::SERVICE, "Deadline elapsed", None,
        "The request timed out according to the default or specified deadline"),
    known(ApiErrorKind::InvalidKey, category::API, "Invalid key", None,
        "An invalid API-Key header was supplied (see Authentication section)"),
    known(ApiErrorKind::InvalidSignature, category::API, "Invalid signature", None,
        "An invalid API-Sign header was supplied (see Authentication section)"),
    known(ApiErrorKind::InvalidNonce, category::API, "Invalid nonce", None,
        "An invalid nonce was supplied"),
    known(ApiErrorKind::PermissionDenied, category::GENERAL, "Permission denied", None,
        "API key doesn't have permission to make this request"),
    known(ApiErrorKind::IneligibleMarginTrading, category::ORDER, "Cannot open position", None,
        "User/tier is ineligible for margin trading"),
    known(ApiErrorKind::MarginAllowanceExceeded, category::ORDER, "Margin allowance exceeded", None,
        "User has exceeded their margin allowance"),
    known(ApiErrorKind::InsufficientEquity, category::ORDER, "Margin level too low", None,
        "Client has insufficient equity or collateral"),
    known(ApiErrorKind::ExceedsMaximumPosition, category::ORDER, "Margin position size exceeded", None,
        "Client would exceed the maximum position size for this pair"),
    known(ApiErrorKind::ExchangeMargin, category::ORDER, "Insufficient margin", None,
        "Exchange does not have available funds for this margin trade"),
    known(ApiErrorKind::AccountBalanceLow, category::ORDER, "Insufficient funds", None,
        "Client does not have the necessary funds"),
    known(ApiErrorKind::OrderMinimum, category::ORDER, "Order minimum not met", None,
        "Order size does not meet order minimum"),
    known(ApiErrorKind::CostMinimum, category::ORDER, "Cost minimum not met", None,
        "Cost (price * volume) does not meet costmin (See AssetPairs endpoint)"),
    known(ApiErrorKind::PriceTickSize, category::ORDER, "Tick size check failed", None,
        "Price submitted is not a valid multiple of the pair's tick_size (See AssetPairs endpoint)"),
    known(ApiErrorKind::OrderLimit, category::ORDER, "Orders limit exceeded", None,
        "(See Rate Limits section)"),
    known(ApiErrorKind::RateLimitExceeded, category::API, "Rate limit exceeded", None,
        "(See Rate Limits section)"),
    known(ApiErrorKind::DomainRateLimitExceeded, category::ORDER, "Domain rate limit exceeded", None,
        "(See Rate Limits section)"),
    known(ApiErrorKind::PositionsLimitExceeded, category::ORDER, "Positions limit exceeded", None, ""),
    known(ApiErrorKind::PositionUnknown, category::ORDER, "Unknown position", None, ""),
    known(ApiErrorKind::CalLimitExceeded, category::BM, "limit exceeded", Some("CAL"),
        "Exceeded Canadian Acquisition Limits (CAL)"),
    known(ApiErrorKind::WithdrawalFee, category::FUNDING, "Max fee exceeded", None,
        "Processed fee exceeds max_fee set in Withdraw request"),
    known(ApiErrorKind::AssetPairUnknown, category::QUERY, "Unknown asset pair", None,
        "The asset pair is not known to the exchange"),
    known(ApiErrorKind::SessionInvalid, category::SESSION, "Invalid session", None,
        "The authentication token is no longer valid."),
    known(ApiErrorKind::EndpointInvalid, category::GENERAL, "Unknown Method", None,
        "Invalid endpoint"),
    known(ApiErrorKind::BadRequest, category::API, "Bad request", None,
        "There is something incorrect about the underlying HTTP request, such as mismatched URLs \
         between REST/WebSocket, or not including the HTTP POST data correctly"),
    known(ApiErrorKind::Lockout, category::GENERAL, "Temporary lockout", None,
        "Temporary lockout: too many malformed requests, incorrect nonces, or too many requests"),
    known(ApiErrorKind::PositionOpposing, category::ORDER, "Cannot open opposing position", None,
        "On Kraken you cannot open a long and short position for the same pair."),
    known(ApiErrorKind::OrderNotEditable, category::ORDER, "Order not editable", None,
        "An attempt was made to edit an existing (open) order but the modifications could not be \
         completed successfully. Possible reasons include insufficient funds for the new order, \
         some partial fill scenarios, and some leveraged orders."),
    known(ApiErrorKind::LeavesQuantityInvalid, category::ORDER, "Not enough leaves qty", None,
        "The new volume is less than the already executed/filled volume."),
    known(ApiErrorKind::VolumeMinimumNotMet, category::GENERAL, "Invalid arguments",
        Some("display volume minimum not met"),
        "The display volume has not met the minimum order volume."),
    known(ApiErrorKind::VolumeMaximumExceeded, category::GENERAL, "Invalid arguments",
        Some("display-volume"),
        "The display volume must be less than the volume of the order."),
    known(ApiErrorKind::IcebergOrderIncompatible, category::GENERAL, "Invalid arguments",
        Some("iceberg:ordertype"),
        "Iceberg orders are not compatible with any other order types besides a limit order."),
    known(ApiErrorKind::AddressLimit, category::FUNDING, "Too many addresses", None,
        "Each crypto currency has a maximum of 5 new (unused) deposit addresses, after which any \
         attempt to create a 6th new address will return an error."),
    known(ApiErrorKind::FundingMethodMissing, category::FUNDING, "No funding method", None,
        "This error is returned whenever the funding endpoints are called with an invalid or \
         missing \"method\" parameter."),
    known(ApiErrorKind::WithdrawalKeyUnknown, category::FUNDING, "Unknown withdraw key", None,
        "The \"key\" input parameter does not correspond to the address description set within \
         account management (via the Funding -> Withdraw)."),
    known(ApiErrorKind::WithdrawalAmountMinimum, category::FUNDING, "Invalid amount", None,
        "The minimum withdrawal amounts by currency varies and any attempted withdrawal below the \
         minimum would result in this error."),
    known(ApiErrorKind::FundingGeneral, category::FUNDING, "Failed", None,
        "This is a generic error indicating that a funding request could not be completed (for \
         example, clients from certain locations attempting to make on chain staking requests \
         would cause this error)."),
    known(ApiErrorKind::FundingUnavailable, category::FUNDING, "Failed", None, SERVICE_TEMPORARY),
    known(ApiErrorKind::FundingBusy, category::SERVICE, "Busy", None, SERVICE_TEMPORARY),
    known(ApiErrorKind::ServiceError, category::SERVICE, "Internal error", None, SERVICE_TEMPORARY),
    known(ApiErrorKind::TradeLocked, category::TRADE, "Locked", None,
        "This issue has to do with the security of your account which may have been compromised. \
         Please change your password and Two-Factor Authentication and contact our Support Center."),
    known(ApiErrorKind::FeatureDisabled, category::API, "Feature disabled", None,
        "This error occurs when a flag or input parameter is disabled temporary or permanently. \
         The error should come from one of the inputs passed, please contact our support sending \
         a log with the complete informations used for the call that generated the error."),
    known(ApiErrorKind::BeneficiaryUnknown, category::API, "Feature disabled", None,
        "The requested withdrawal could not be completed, because the destination address is \
         missing the required beneficiary/recipient information (note that this currently only \
         applies to select withdrawals from Canadian accounts)."),
];

/// A classified Kraken error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Kraken API error {raw}: {description}")]
pub struct ApiError {
    kind: ApiErrorKind,
    severity: Severity,
    category: String,
    message: Option<String>,
    detail: Option<String>,
    description: String,
    raw: String,
}

/// Fields split out of a raw error string
struct ParsedError<'a> {
    severity: Severity,
    category: &'a str,
    message: Option<&'a str>,
    detail: Option<&'a str>,
}

impl<'a> ParsedError<'a> {
    fn parse(raw: &'a str) -> Self {
        let mut chars = raw.chars();
        let severity = chars.next().map(Severity::from_char).unwrap_or(Severity::Other('?'));
        let rest = chars.as_str();

        let mut parts = rest.splitn(3, ':');
        let category = parts.next().unwrap_or("");
        let message = parts.next();
        let detail = parts.next();

        Self {
            severity,
            category,
            message,
            detail,
        }
    }

    fn matches(&self, known: &KnownError, with_detail: bool) -> bool {
        let head = self.severity == known.severity
            && self.category == known.category
            && self.message == Some(known.message);
        if with_detail {
            head && self.detail == known.detail
        } else {
            head && known.detail.is_none()
        }
    }
}

impl ApiError {
    /// Classify a raw Kraken error string
    ///
    /// An entry whose detail matches exactly wins; otherwise the first entry
    /// that declares no detail and matches on severity, category and message
    /// is used. Anything else becomes [`ApiErrorKind::Unknown`].
    pub fn classify(raw: &str) -> Self {
        let parsed = ParsedError::parse(raw);

        let found = KNOWN_ERRORS
            .iter()
            .find(|k| parsed.matches(k, true))
            .or_else(|| KNOWN_ERRORS.iter().find(|k| parsed.matches(k, false)));

        match found {
            Some(known) => Self {
                kind: known.kind,
                severity: parsed.severity,
                category: parsed.category.to_string(),
                message: parsed.message.map(str::to_string),
                detail: parsed.detail.map(str::to_string),
                description: known.description.to_string(),
                raw: raw.to_string(),
            },
            None => Self {
                kind: ApiErrorKind::Unknown,
                severity: parsed.severity,
                category: parsed.category.to_string(),
                message: parsed.message.map(str::to_string),
                detail: parsed.detail.map(str::to_string),
                description: format!("Unknown exception: {}", raw),
                raw: raw.to_string(),
            },
        }
    }

    /// Classify every entry of an error list
    pub fn parse_many(errors: &[String]) -> Vec<Self> {
        errors.iter().map(|e| Self::classify(e)).collect()
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Human-readable explanation
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The original error string
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == ApiErrorKind::Unknown
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::RateLimitExceeded
                | ApiErrorKind::DomainRateLimitExceeded
                | ApiErrorKind::OrderLimit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key() {
        let err = ApiError::classify("EAPI:Invalid key");
        assert_eq!(err.kind(), ApiErrorKind::InvalidKey);
        assert_eq!(err.category(), "API");
        assert_eq!(err.message(), Some("Invalid key"));
        assert!(err.is_error());
    }

    #[test]
    fn test_insufficient_funds() {
        let err = ApiError::classify("EOrder:Insufficient funds");
        assert_eq!(err.kind(), ApiErrorKind::AccountBalanceLow);
        assert_eq!(err.description(), "Client does not have the necessary funds");
    }

    #[test]
    fn test_unknown_keeps_fields() {
        let err = ApiError::classify("EFoo:Bar");
        assert_eq!(err.kind(), ApiErrorKind::Unknown);
        assert_eq!(err.category(), "Foo");
        assert_eq!(err.message(), Some("Bar"));
        assert_eq!(err.severity(), Severity::Error);
        assert!(err.description().starts_with("Unknown exception"));
    }

    #[test]
    fn test_detail_match_preferred() {
        let err = ApiError::classify("EGeneral:Invalid arguments:Index unavailable");
        assert_eq!(err.kind(), ApiErrorKind::InvalidPair);

        let err = ApiError::classify("EGeneral:Invalid arguments:iceberg:ordertype");
        assert_eq!(err.kind(), ApiErrorKind::IcebergOrderIncompatible);
        assert_eq!(err.detail(), Some("iceberg:ordertype"));

        let err = ApiError::classify("EBM:limit exceeded:CAL");
        assert_eq!(err.kind(), ApiErrorKind::CalLimitExceeded);
    }

    #[test]
    fn test_later_detail_entry_beats_earlier_general_entry() {
        let position = |kind: ApiErrorKind| KNOWN_ERRORS.iter().position(|k| k.kind == kind).unwrap();
        assert!(position(ApiErrorKind::InvalidArguments) < position(ApiErrorKind::InvalidPair));

        let err = ApiError::classify("EGeneral:Invalid arguments:Index unavailable");
        assert_eq!(err.kind(), ApiErrorKind::InvalidPair);
    }

    #[test]
    fn test_unlisted_detail_falls_back_to_message() {
        let err = ApiError::classify("EGeneral:Invalid arguments:volume");
        assert_eq!(err.kind(), ApiErrorKind::InvalidArguments);
        assert_eq!(err.detail(), Some("volume"));
    }

    #[test]
    fn test_first_registered_wins() {
        let err = ApiError::classify("EAPI:Feature disabled");
        assert_eq!(err.kind(), ApiErrorKind::FeatureDisabled);

        let err = ApiError::classify("EFunding:Failed");
        assert_eq!(err.kind(), ApiErrorKind::FundingGeneral);
    }

    #[test]
    fn test_warning_severity_does_not_match_error_entry() {
        let err = ApiError::classify("WAPI:Invalid key");
        assert!(err.is_warning());
        assert!(err.is_unknown());
    }

    #[test]
    fn test_category_only() {
        let err = ApiError::classify("EService");
        assert!(err.is_unknown());
        assert_eq!(err.category(), "Service");
        assert_eq!(err.message(), None);
    }

    #[test]
    fn test_rate_limit() {
        assert!(ApiError::classify("EAPI:Rate limit exceeded").is_rate_limit());
        assert!(!ApiError::classify("EAPI:Invalid nonce").is_rate_limit());
    }

    #[test]
    fn test_parse_many() {
        let errors = vec![
            "EOrder:Insufficient funds".to_string(),
            "EOrder:Order minimum not met".to_string(),
        ];
        let parsed = ApiError::parse_many(&errors);
        assert_eq!(parsed[1].kind(), ApiErrorKind::OrderMinimum);
    }

    #[test]
    fn test_registry_size() {
        assert_eq!(KNOWN_ERRORS.len(), 49);
    }
}
