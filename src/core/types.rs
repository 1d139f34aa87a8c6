use crate::core::config::ClientConfig;
use crate::core::kernel::temporal::Timestamp;
use rust_decimal::Decimal;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a trade (`sBaibaiKubun`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "1")]
    Sell,
    #[serde(rename = "3")]
    Buy,
    /// Delivery of held shares against a short margin position.
    #[serde(rename = "5")]
    Delivery,
    /// Receipt of shares against a long margin position.
    #[serde(rename = "7")]
    Receipt,
}

/// Execution condition (`sCondition`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionTiming {
    #[default]
    #[serde(rename = "0")]
    NoCondition,
    #[serde(rename = "2")]
    Opening,
    #[serde(rename = "4")]
    Closing,
    /// Limit order that becomes a market order at the close if unfilled.
    #[serde(rename = "6")]
    Funari,
}

impl ExecutionTiming {
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoCondition => "0",
            Self::Opening => "2",
            Self::Closing => "4",
            Self::Funari => "6",
        }
    }
}

/// Tax treatment of the account an order books to (`sZyoutoekiKazeiC`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "1")]
    Specific,
    #[serde(rename = "3")]
    General,
    #[serde(rename = "5")]
    Nisa,
    #[serde(rename = "6")]
    GrowthNisa,
}

/// Cash or margin, and for margin whether the order opens or closes (`sGenkinShinyouKubun`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashMargin {
    #[default]
    #[serde(rename = "0")]
    Cash,
    #[serde(rename = "2")]
    NewSystemMargin,
    #[serde(rename = "4")]
    ExitSystemMargin,
    #[serde(rename = "6")]
    NewGeneralMargin,
    #[serde(rename = "8")]
    ExitGeneralMargin,
}

/// Listing venue (`sSizyouC`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    #[default]
    #[serde(rename = "00")]
    Tokyo,
    #[serde(rename = "02")]
    Nagoya,
    #[serde(rename = "05")]
    Fukuoka,
    #[serde(rename = "07")]
    Sapporo,
}

impl Exchange {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Tokyo => "00",
            Self::Nagoya => "02",
            Self::Fukuoka => "05",
            Self::Sapporo => "07",
        }
    }

    /// Venue for a wire code; master tables also carry venues this crate does not trade on.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "00" => Some(Self::Tokyo),
            "02" => Some(Self::Nagoya),
            "05" => Some(Self::Fukuoka),
            "07" => Some(Self::Sapporo),
            _ => None,
        }
    }
}

/// Stop-order kind (`sGyakusasiOrderType`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopOrderType {
    #[default]
    #[serde(rename = "0")]
    Normal,
    #[serde(rename = "1")]
    Stop,
    /// A normal order plus a stop order replacing it once triggered.
    #[serde(rename = "2")]
    NormalAndStop,
}

/// Filter for order inquiries (`sOrderSyoukaiStatus`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderInquiryStatus {
    #[default]
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "1")]
    Open,
    #[serde(rename = "2")]
    Filled,
    #[serde(rename = "3")]
    PartiallyFilled,
    #[serde(rename = "4")]
    Amendable,
    #[serde(rename = "5")]
    OpenOrPartiallyFilled,
}

/// Price condition of a single-issue quote column (`sTargetColumn`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceColumn {
    CurrentPrice,
    CurrentPriceTime,
    PreviousClose,
    Open,
    High,
    Low,
    Volume,
    AskPrice,
    BidPrice,
    AskQuantity,
    BidQuantity,
}

impl PriceColumn {
    pub const ALL: [Self; 11] = [
        Self::CurrentPrice,
        Self::CurrentPriceTime,
        Self::PreviousClose,
        Self::Open,
        Self::High,
        Self::Low,
        Self::Volume,
        Self::AskPrice,
        Self::BidPrice,
        Self::AskQuantity,
        Self::BidQuantity,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::CurrentPrice => "pDPP",
            Self::CurrentPriceTime => "tDPP:T",
            Self::PreviousClose => "pPRP",
            Self::Open => "pDOP",
            Self::High => "pDHP",
            Self::Low => "pDLP",
            Self::Volume => "pDV",
            Self::AskPrice => "pQAP",
            Self::BidPrice => "pQBP",
            Self::AskQuantity => "pAV",
            Self::BidQuantity => "pBV",
        }
    }
}

impl fmt::Display for PriceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Envelope fields every decoded response exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCommon {
    pub sent_at: Option<Timestamp>,
    pub received_at: Option<Timestamp>,
    /// Transport-level problem code; `0` when the request was processed.
    pub error_code: i64,
    pub error_message: String,
    pub message_type: String,
}

impl ResponseCommon {
    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }
}

/// Business outcome reported inside a well-formed response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultStatus {
    /// `"0"` on success.
    pub code: String,
    pub text: String,
}

impl ResultStatus {
    pub fn is_success(&self) -> bool {
        self.code == "0"
    }
}

pub struct LoginRequest {
    pub user_id: Secret<String>,
    pub password: Secret<String>,
}

impl LoginRequest {
    pub fn new(user_id: String, password: String) -> Self {
        Self {
            user_id: Secret::new(user_id),
            password: Secret::new(password),
        }
    }

    /// Credentials held by a client configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            user_id: config.user_id.clone(),
            password: config.password.clone(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_id", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
    pub account_type: AccountType,
    /// Whether order entry may omit the second password.
    pub second_password_omitted: bool,
    pub last_login_at: Option<Timestamp>,
    pub has_general_account: bool,
    pub has_margin_account: bool,
    /// Whether regulatory documents are waiting to be read; order entry is blocked until they are.
    pub has_unread_documents: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
}

/// Order expiry. `Today` means the trading day the order is accepted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpireDay {
    #[default]
    Today,
    Until(Timestamp),
}

/// Stop trigger for `StopOrderType::Stop` and `StopOrderType::NormalAndStop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTrigger {
    pub trigger_price: Decimal,
    /// Limit price once triggered; `None` for a market order.
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRequest {
    pub account_type: AccountType,
    pub issue_code: String,
    pub exchange: Exchange,
    pub side: Side,
    pub execution_timing: ExecutionTiming,
    /// Limit price; `None` for a market order.
    pub price: Option<Decimal>,
    pub quantity: u64,
    pub cash_margin: CashMargin,
    pub expire_day: ExpireDay,
    pub stop_order_type: StopOrderType,
    pub stop_trigger: Option<StopTrigger>,
}

impl NewOrderRequest {
    /// Cash limit/market order on the Tokyo exchange, valid for the day.
    pub fn cash(
        issue_code: impl Into<String>,
        side: Side,
        quantity: u64,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            account_type: AccountType::Specific,
            issue_code: issue_code.into(),
            exchange: Exchange::Tokyo,
            side,
            execution_timing: ExecutionTiming::NoCondition,
            price,
            quantity,
            cash_margin: CashMargin::Cash,
            expire_day: ExpireDay::Today,
            stop_order_type: StopOrderType::Normal,
            stop_trigger: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
    pub warning: ResultStatus,
    pub order_number: String,
    pub business_day: Option<Timestamp>,
    pub settlement_amount: Decimal,
    pub commission: Decimal,
    pub consumption_tax: Decimal,
    pub interest: Decimal,
    pub ordered_at: Option<Timestamp>,
}

/// Amendment of a live order. Every `None` leaves the corresponding field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectOrderRequest {
    pub order_number: String,
    pub business_day: Option<Timestamp>,
    pub execution_timing: Option<ExecutionTiming>,
    /// `Some(None)` turns the order into a market order.
    pub price: Option<Option<Decimal>>,
    pub quantity: Option<u64>,
    pub expire_day: Option<ExpireDay>,
    pub trigger_price: Option<Decimal>,
    pub stop_price: Option<Option<Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectOrderResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
    pub order_number: String,
    pub business_day: Option<Timestamp>,
    pub settlement_amount: Decimal,
    pub commission: Decimal,
    pub consumption_tax: Decimal,
    pub ordered_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOrderRequest {
    pub order_number: String,
    pub business_day: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
    pub order_number: String,
    pub business_day: Option<Timestamp>,
    pub settlement_amount: Decimal,
    pub ordered_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderListRequest {
    /// Restrict to one issue; empty for all.
    pub issue_code: String,
    pub execution_day: Option<Timestamp>,
    pub status: OrderInquiryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
    pub warning: ResultStatus,
    pub issue_code: String,
    pub status: OrderInquiryStatus,
    pub execution_day: Option<Timestamp>,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub warning: ResultStatus,
    pub order_number: String,
    pub issue_code: String,
    pub exchange: Exchange,
    pub account_type: AccountType,
    pub cash_margin: CashMargin,
    pub side: Side,
    pub quantity: u64,
    pub remaining_quantity: u64,
    pub price: Decimal,
    pub execution_timing: ExecutionTiming,
    pub stop_order_type: StopOrderType,
    pub trigger_price: Decimal,
    pub contract_quantity: u64,
    pub contract_price: Decimal,
    pub execution_day: Option<Timestamp>,
    pub status_code: String,
    pub status: String,
    pub ordered_at: Option<Timestamp>,
    pub expire_day: Option<Timestamp>,
    pub carried_over: bool,
    pub amendable: bool,
    pub estimated_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPriceRequest {
    pub issue_codes: Vec<String>,
    pub columns: Vec<PriceColumn>,
}

impl MarketPriceRequest {
    /// Every known column for `issue_codes`.
    pub fn new(issue_codes: Vec<String>) -> Self {
        Self {
            issue_codes,
            columns: PriceColumn::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPriceResponse {
    pub common: ResponseCommon,
    pub result: ResultStatus,
    pub prices: Vec<MarketPrice>,
}

/// Snapshot quote; columns that were not requested or not yet traded read as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPrice {
    pub issue_code: String,
    pub current_price: Decimal,
    pub current_price_time: Option<Timestamp>,
    pub previous_close: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub volume: Decimal,
    pub ask_price: Decimal,
    pub bid_price: Decimal,
    pub ask_quantity: Decimal,
    pub bid_quantity: Decimal,
}

/// Master tables to download; empty requests every table the service offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterDownloadRequest {
    pub tables: Vec<MasterTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterTable {
    SystemStatus,
    BusinessDay,
    StockMaster,
    StockExchangeMaster,
}

impl MasterTable {
    pub const fn clmid(self) -> &'static str {
        match self {
            Self::SystemStatus => "CLMSystemStatus",
            Self::BusinessDay => "CLMDateZyouhou",
            Self::StockMaster => "CLMIssueMstKabu",
            Self::StockExchangeMaster => "CLMIssueSizyouMstKabu",
        }
    }
}

/// One record of a master download.
#[derive(Debug, Clone, PartialEq)]
pub enum MasterRecord {
    SystemStatus(SystemStatus),
    BusinessDay(BusinessDay),
    StockMaster(StockMaster),
    StockExchangeMaster(StockExchangeMaster),
    /// A table this crate does not model, kept as received.
    Unknown {
        message_type: String,
        raw: serde_json::Value,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemStatus {
    pub status_key: String,
    pub login_permitted: bool,
    pub system_status: String,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessDay {
    pub day_key: String,
    pub previous_business_days: [Option<Timestamp>; 3],
    pub the_day: Option<Timestamp>,
    pub next_business_days: [Option<Timestamp>; 3],
    pub stock_delivery_day: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMaster {
    pub issue_code: String,
    pub issue_name: String,
    pub issue_name_short: String,
    pub issue_name_kana: String,
    pub issue_name_english: String,
    pub trading_unit: u64,
    pub listed_shares: u64,
    pub preferred_exchange: Option<Exchange>,
    pub industry_code: String,
    pub industry_name: String,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockExchangeMaster {
    pub issue_code: String,
    pub exchange: Option<Exchange>,
    pub price_limit_low: Decimal,
    pub price_limit_high: Decimal,
    pub margin_eligible: bool,
    pub previous_close: Decimal,
    pub listed_on: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}
