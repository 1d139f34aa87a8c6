use crate::core::errors::ExchangeError;
use crate::core::kernel::envelope::{
    fixup_list, fixup_number, record_tag, wire_flag, wire_number, Fixup, ResponseEnvelope,
    StreamRecord, WireRequest, WireResponse,
};
use crate::core::kernel::session::Endpoint;
use crate::core::kernel::temporal::{CompactDateTime, HourMinute, WireDate};
use crate::core::types::{
    AccountType, CashMargin, Exchange, ExecutionTiming, OrderInquiryStatus, Side, StopOrderType,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Written where an amendment leaves a field as it is, or a new order declines an option.
pub const UNCHANGED: &str = "*";

// Records carrying passwords have no `Debug`.

#[derive(Serialize)]
pub struct WireLoginRequest {
    #[serde(rename = "sUserId")]
    pub user_id: String,
    #[serde(rename = "sPassword")]
    pub password: String,
}

impl WireRequest for WireLoginRequest {
    const CLMID: &'static str = "CLMAuthLoginRequest";
    const ENDPOINT: Endpoint = Endpoint::Auth;
    type Response = WireLoginResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireLoginResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
    #[serde(rename = "sZyoutoekiKazeiC", default)]
    pub account_type: AccountType,
    #[serde(rename = "sSecondPasswordOmit", default, deserialize_with = "wire_flag::deserialize")]
    pub second_password_omit: bool,
    #[serde(rename = "sLastLoginDate", default)]
    pub last_login_date: CompactDateTime,
    #[serde(rename = "sSogoKouzaKubun", default, deserialize_with = "wire_flag::deserialize")]
    pub general_account: bool,
    #[serde(rename = "sShinyouKouzaKubun", default, deserialize_with = "wire_flag::deserialize")]
    pub margin_account: bool,
    #[serde(rename = "sKinsyouhouMidokuFlg", default, deserialize_with = "wire_flag::deserialize")]
    pub unread_documents: bool,
    #[serde(rename = "sUrlRequest", default)]
    pub url_request: String,
    #[serde(rename = "sUrlMaster", default)]
    pub url_master: String,
    #[serde(rename = "sUrlPrice", default)]
    pub url_price: String,
    #[serde(rename = "sUrlEvent", default)]
    pub url_event: String,
}

impl WireResponse for WireLoginResponse {}

#[derive(Debug, Default, Serialize)]
pub struct WireLogoutRequest {}

impl WireRequest for WireLogoutRequest {
    const CLMID: &'static str = "CLMAuthLogoutRequest";
    const ENDPOINT: Endpoint = Endpoint::Request;
    type Response = WireLogoutResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireLogoutResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
}

impl WireResponse for WireLogoutResponse {}

#[derive(Serialize)]
pub struct WireNewOrderRequest {
    #[serde(rename = "sZyoutoekiKazeiC")]
    pub account_type: AccountType,
    #[serde(rename = "sIssueCode")]
    pub issue_code: String,
    #[serde(rename = "sSizyouC")]
    pub exchange: Exchange,
    #[serde(rename = "sBaibaiKubun")]
    pub side: Side,
    #[serde(rename = "sCondition")]
    pub execution_timing: ExecutionTiming,
    /// `"0"` for a market order.
    #[serde(rename = "sOrderPrice")]
    pub price: String,
    #[serde(rename = "sOrderSuryou", serialize_with = "wire_number::serialize")]
    pub quantity: u64,
    #[serde(rename = "sGenkinShinyouKubun")]
    pub cash_margin: CashMargin,
    #[serde(rename = "sOrderExpireDay")]
    pub expire_day: WireDate,
    #[serde(rename = "sGyakusasiOrderType")]
    pub stop_order_type: StopOrderType,
    #[serde(rename = "sGyakusasiZyouken")]
    pub trigger_price: String,
    #[serde(rename = "sGyakusasiPrice")]
    pub stop_price: String,
    #[serde(rename = "sTatebiType")]
    pub closing_order: String,
    #[serde(rename = "sTategyokuZyoutoekiKazeiC")]
    pub closing_account_type: String,
    #[serde(rename = "sSecondPassword")]
    pub second_password: String,
}

impl WireRequest for WireNewOrderRequest {
    const CLMID: &'static str = "CLMKabuNewOrder";
    const ENDPOINT: Endpoint = Endpoint::Request;
    type Response = WireNewOrderResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireNewOrderResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
    #[serde(rename = "sWarningCode", default)]
    pub warning_code: String,
    #[serde(rename = "sWarningText", default)]
    pub warning_text: String,
    #[serde(rename = "sOrderNumber", default)]
    pub order_number: String,
    #[serde(rename = "sEigyouDay", default)]
    pub business_day: WireDate,
    #[serde(rename = "sOrderUkewatasiKingaku", default)]
    pub settlement_amount: Decimal,
    #[serde(rename = "sOrderTesuryou", default)]
    pub commission: Decimal,
    #[serde(rename = "sOrderSyouhizei", default)]
    pub consumption_tax: Decimal,
    #[serde(rename = "sKinri", default)]
    pub interest: Decimal,
    #[serde(rename = "sOrderDate", default)]
    pub order_date: CompactDateTime,
}

impl WireResponse for WireNewOrderResponse {
    const FIXUPS: &'static [Fixup] = &[
        fixup_number!("sOrderUkewatasiKingaku"),
        fixup_number!("sOrderTesuryou"),
        fixup_number!("sOrderSyouhizei"),
        fixup_number!("sKinri"),
    ];
}

#[derive(Serialize)]
pub struct WireCorrectOrderRequest {
    #[serde(rename = "sOrderNumber")]
    pub order_number: String,
    #[serde(rename = "sEigyouDay")]
    pub business_day: WireDate,
    #[serde(rename = "sCondition")]
    pub execution_timing: String,
    #[serde(rename = "sOrderPrice")]
    pub price: String,
    #[serde(rename = "sOrderSuryou")]
    pub quantity: String,
    #[serde(rename = "sOrderExpireDay")]
    pub expire_day: WireDate,
    #[serde(rename = "sGyakusasiZyouken")]
    pub trigger_price: String,
    #[serde(rename = "sGyakusasiPrice")]
    pub stop_price: String,
    #[serde(rename = "sSecondPassword")]
    pub second_password: String,
}

impl WireRequest for WireCorrectOrderRequest {
    const CLMID: &'static str = "CLMKabuCorrectOrder";
    const ENDPOINT: Endpoint = Endpoint::Request;
    type Response = WireCorrectOrderResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireCorrectOrderResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
    #[serde(rename = "sOrderNumber", default)]
    pub order_number: String,
    #[serde(rename = "sEigyouDay", default)]
    pub business_day: WireDate,
    #[serde(rename = "sOrderUkewatasiKingaku", default)]
    pub settlement_amount: Decimal,
    #[serde(rename = "sOrderTesuryou", default)]
    pub commission: Decimal,
    #[serde(rename = "sOrderSyouhizei", default)]
    pub consumption_tax: Decimal,
    #[serde(rename = "sOrderDate", default)]
    pub order_date: CompactDateTime,
}

impl WireResponse for WireCorrectOrderResponse {
    const FIXUPS: &'static [Fixup] = &[
        fixup_number!("sOrderUkewatasiKingaku"),
        fixup_number!("sOrderTesuryou"),
        fixup_number!("sOrderSyouhizei"),
    ];
}

#[derive(Serialize)]
pub struct WireCancelOrderRequest {
    #[serde(rename = "sOrderNumber")]
    pub order_number: String,
    #[serde(rename = "sEigyouDay")]
    pub business_day: WireDate,
    #[serde(rename = "sSecondPassword")]
    pub second_password: String,
}

impl WireRequest for WireCancelOrderRequest {
    const CLMID: &'static str = "CLMKabuCancelOrder";
    const ENDPOINT: Endpoint = Endpoint::Request;
    type Response = WireCancelOrderResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireCancelOrderResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
    #[serde(rename = "sOrderNumber", default)]
    pub order_number: String,
    #[serde(rename = "sEigyouDay", default)]
    pub business_day: WireDate,
    #[serde(rename = "sOrderUkewatasiKingaku", default)]
    pub settlement_amount: Decimal,
    #[serde(rename = "sOrderDate", default)]
    pub order_date: CompactDateTime,
}

impl WireResponse for WireCancelOrderResponse {
    const FIXUPS: &'static [Fixup] = &[fixup_number!("sOrderUkewatasiKingaku")];
}

#[derive(Debug, Serialize)]
pub struct WireOrderListRequest {
    #[serde(rename = "sIssueCode")]
    pub issue_code: String,
    #[serde(rename = "sSikkouDay")]
    pub execution_day: WireDate,
    #[serde(rename = "sOrderSyoukaiStatus")]
    pub status: OrderInquiryStatus,
}

impl WireRequest for WireOrderListRequest {
    const CLMID: &'static str = "CLMOrderList";
    const ENDPOINT: Endpoint = Endpoint::Request;
    type Response = WireOrderListResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireOrderListResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
    #[serde(rename = "sWarningCode", default)]
    pub warning_code: String,
    #[serde(rename = "sWarningText", default)]
    pub warning_text: String,
    #[serde(rename = "sIssueCode", default)]
    pub issue_code: String,
    #[serde(rename = "sOrderSyoukaiStatus", default)]
    pub status: OrderInquiryStatus,
    #[serde(rename = "sSikkouDay", default)]
    pub execution_day: WireDate,
    #[serde(rename = "aOrderList", default)]
    pub orders: Vec<WireOrder>,
}

impl WireResponse for WireOrderListResponse {
    // No orders is sent as `"aOrderList":""`; unfilled orders carry empty contract columns.
    const FIXUPS: &'static [Fixup] = &[
        fixup_list!("aOrderList"),
        fixup_number!("sOrderYakuzyouSuryo"),
        fixup_number!("sOrderYakuzyouPrice"),
        fixup_number!("sOrderOrderPrice"),
        fixup_number!("sOrderCurrentSuryou"),
        fixup_number!("sOrderGyakusasiZyouken"),
        fixup_number!("sGaisanDaikin"),
    ];
}

#[derive(Debug, Deserialize)]
pub struct WireOrder {
    #[serde(rename = "sOrderWarningCode", default)]
    pub warning_code: String,
    #[serde(rename = "sOrderWarningText", default)]
    pub warning_text: String,
    #[serde(rename = "sOrderOrderNumber", default)]
    pub order_number: String,
    #[serde(rename = "sOrderIssueCode", default)]
    pub issue_code: String,
    #[serde(rename = "sOrderSizyouC", default)]
    pub exchange: Exchange,
    #[serde(rename = "sOrderZyoutoekiKazeiC", default)]
    pub account_type: AccountType,
    #[serde(rename = "sGenkinSinyouKubun", default)]
    pub cash_margin: CashMargin,
    #[serde(rename = "sOrderBaibaiKubun")]
    pub side: Side,
    #[serde(rename = "sOrderOrderSuryou", deserialize_with = "wire_number::deserialize")]
    pub quantity: u64,
    #[serde(rename = "sOrderCurrentSuryou", deserialize_with = "wire_number::deserialize")]
    pub remaining_quantity: u64,
    #[serde(rename = "sOrderOrderPrice")]
    pub price: Decimal,
    #[serde(rename = "sOrderCondition", default)]
    pub execution_timing: ExecutionTiming,
    #[serde(rename = "sOrderGyakusasiOrderType", default)]
    pub stop_order_type: StopOrderType,
    #[serde(rename = "sOrderGyakusasiZyouken", default)]
    pub trigger_price: Decimal,
    #[serde(rename = "sOrderYakuzyouSuryo", deserialize_with = "wire_number::deserialize")]
    pub contract_quantity: u64,
    #[serde(rename = "sOrderYakuzyouPrice")]
    pub contract_price: Decimal,
    #[serde(rename = "sOrderSikkouDay", default)]
    pub execution_day: WireDate,
    #[serde(rename = "sOrderStatusCode", default)]
    pub status_code: String,
    #[serde(rename = "sOrderStatus", default)]
    pub status: String,
    #[serde(rename = "sOrderOrderDateTime", default)]
    pub ordered_at: CompactDateTime,
    #[serde(rename = "sOrderOrderExpireDay", default)]
    pub expire_day: WireDate,
    #[serde(
        rename = "sOrderKurikosiOrderFlg",
        default,
        deserialize_with = "wire_flag::deserialize"
    )]
    pub carried_over: bool,
    #[serde(
        rename = "sOrderCorrectCancelKahiFlg",
        default,
        deserialize_with = "wire_flag::deserialize"
    )]
    pub amendable: bool,
    #[serde(rename = "sGaisanDaikin", default)]
    pub estimated_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WireMarketPriceRequest {
    /// Comma-separated issue codes.
    #[serde(rename = "sTargetIssueCode")]
    pub issue_codes: String,
    /// Comma-separated column codes.
    #[serde(rename = "sTargetColumn")]
    pub columns: String,
}

impl WireRequest for WireMarketPriceRequest {
    const CLMID: &'static str = "CLMMfdsGetMarketPrice";
    const ENDPOINT: Endpoint = Endpoint::Price;
    type Response = WireMarketPriceResponse;
}

#[derive(Debug, Deserialize)]
pub struct WireMarketPriceResponse {
    #[serde(flatten)]
    pub envelope: ResponseEnvelope,
    #[serde(rename = "sResultCode", default)]
    pub result_code: String,
    #[serde(rename = "sResultText", default)]
    pub result_text: String,
    #[serde(rename = "aCLMMfdsMarketPrice", default)]
    pub prices: Vec<WireMarketPrice>,
}

impl WireResponse for WireMarketPriceResponse {
    // Columns of an issue that has not traded yet are empty strings.
    const FIXUPS: &'static [Fixup] = &[
        fixup_list!("aCLMMfdsMarketPrice"),
        fixup_number!("pDPP"),
        fixup_number!("pPRP"),
        fixup_number!("pDOP"),
        fixup_number!("pDHP"),
        fixup_number!("pDLP"),
        fixup_number!("pDV"),
        fixup_number!("pQAP"),
        fixup_number!("pQBP"),
        fixup_number!("pAV"),
        fixup_number!("pBV"),
    ];
}

#[derive(Debug, Deserialize)]
pub struct WireMarketPrice {
    #[serde(rename = "sIssueCode", default)]
    pub issue_code: String,
    #[serde(rename = "pDPP", default)]
    pub current_price: Decimal,
    #[serde(rename = "tDPP:T", default)]
    pub current_price_time: HourMinute,
    #[serde(rename = "pPRP", default)]
    pub previous_close: Decimal,
    #[serde(rename = "pDOP", default)]
    pub open: Decimal,
    #[serde(rename = "pDHP", default)]
    pub high: Decimal,
    #[serde(rename = "pDLP", default)]
    pub low: Decimal,
    #[serde(rename = "pDV", default)]
    pub volume: Decimal,
    #[serde(rename = "pQAP", default)]
    pub ask_price: Decimal,
    #[serde(rename = "pQBP", default)]
    pub bid_price: Decimal,
    #[serde(rename = "pAV", default)]
    pub ask_quantity: Decimal,
    #[serde(rename = "pBV", default)]
    pub bid_quantity: Decimal,
}

#[derive(Debug, Serialize)]
pub struct WireMasterDownloadRequest {
    /// Comma-separated table tags; omitted to download everything.
    #[serde(rename = "sTargetCLMID", skip_serializing_if = "String::is_empty")]
    pub tables: String,
}

impl WireRequest for WireMasterDownloadRequest {
    const CLMID: &'static str = "CLMEventDownload";
    const ENDPOINT: Endpoint = Endpoint::Master;
    type Response = WireMasterRecord;
}

/// One master-download record, dispatched on its `sCLMID`.
#[derive(Debug)]
pub enum WireMasterRecord {
    SystemStatus(WireSystemStatus),
    BusinessDay(WireBusinessDay),
    StockMaster(WireStockMaster),
    StockExchangeMaster(WireStockExchangeMaster),
    Unknown {
        clmid: String,
        raw: serde_json::Value,
    },
}

impl StreamRecord for WireMasterRecord {
    fn decode_record(raw: &str) -> Result<Self, ExchangeError> {
        let clmid = record_tag(raw)?;
        let record = match clmid.as_str() {
            "CLMSystemStatus" => Self::SystemStatus(WireSystemStatus::decode(raw)?),
            "CLMDateZyouhou" => Self::BusinessDay(WireBusinessDay::decode(raw)?),
            "CLMIssueMstKabu" => Self::StockMaster(WireStockMaster::decode(raw)?),
            "CLMIssueSizyouMstKabu" => {
                Self::StockExchangeMaster(WireStockExchangeMaster::decode(raw)?)
            }
            _ => Self::Unknown {
                raw: serde_json::from_str(raw)?,
                clmid,
            },
        };
        Ok(record)
    }
}

#[derive(Debug, Deserialize)]
pub struct WireSystemStatus {
    #[serde(rename = "sSystemStatusKey", default)]
    pub status_key: String,
    #[serde(rename = "sLoginKyokaKubun", default)]
    pub login_permission: String,
    #[serde(rename = "sSystemStatus", default)]
    pub system_status: String,
    #[serde(rename = "sCreateTime", default)]
    pub created_at: CompactDateTime,
    #[serde(rename = "sUpdateTime", default)]
    pub updated_at: CompactDateTime,
}

impl WireResponse for WireSystemStatus {}

#[derive(Debug, Deserialize)]
pub struct WireBusinessDay {
    #[serde(rename = "sDayKey", default)]
    pub day_key: String,
    #[serde(rename = "sMaeEigyouDay_1", default)]
    pub previous_1: WireDate,
    #[serde(rename = "sMaeEigyouDay_2", default)]
    pub previous_2: WireDate,
    #[serde(rename = "sMaeEigyouDay_3", default)]
    pub previous_3: WireDate,
    #[serde(rename = "sTheDay", default)]
    pub the_day: WireDate,
    #[serde(rename = "sYokuEigyouDay_1", default)]
    pub next_1: WireDate,
    #[serde(rename = "sYokuEigyouDay_2", default)]
    pub next_2: WireDate,
    #[serde(rename = "sYokuEigyouDay_3", default)]
    pub next_3: WireDate,
    #[serde(rename = "sKabuUkewatasiDay", default)]
    pub stock_delivery_day: WireDate,
}

impl WireResponse for WireBusinessDay {}

#[derive(Debug, Deserialize)]
pub struct WireStockMaster {
    #[serde(rename = "sIssueCode", default)]
    pub issue_code: String,
    #[serde(rename = "sIssueName", default)]
    pub issue_name: String,
    #[serde(rename = "sIssueNameRyaku", default)]
    pub issue_name_short: String,
    #[serde(rename = "sIssueNameKana", default)]
    pub issue_name_kana: String,
    #[serde(rename = "sIssueNameEizi", default)]
    pub issue_name_english: String,
    #[serde(rename = "sBaibaiTani", default, deserialize_with = "wire_number::deserialize")]
    pub trading_unit: u64,
    #[serde(
        rename = "sZyouzyouHakkouKabusu",
        default,
        deserialize_with = "wire_number::deserialize"
    )]
    pub listed_shares: u64,
    #[serde(rename = "sYusenSizyou", default)]
    pub preferred_exchange: String,
    #[serde(rename = "sGyousyuCode", default)]
    pub industry_code: String,
    #[serde(rename = "sGyousyuName", default)]
    pub industry_name: String,
    #[serde(rename = "sUpdateDate", default)]
    pub updated_at: CompactDateTime,
}

impl WireResponse for WireStockMaster {
    const FIXUPS: &'static [Fixup] = &[
        fixup_number!("sBaibaiTani"),
        fixup_number!("sZyouzyouHakkouKabusu"),
    ];
}

#[derive(Debug, Deserialize)]
pub struct WireStockExchangeMaster {
    #[serde(rename = "sIssueCode", default)]
    pub issue_code: String,
    #[serde(rename = "sZyouzyouSizyou", default)]
    pub exchange: String,
    #[serde(rename = "sNehabaMin", default)]
    pub price_limit_low: Decimal,
    #[serde(rename = "sNehabaMax", default)]
    pub price_limit_high: Decimal,
    #[serde(rename = "sSinyouC", default)]
    pub margin_code: String,
    #[serde(rename = "sZenzituOwarine", default)]
    pub previous_close: Decimal,
    #[serde(rename = "sSinkiZyouzyouDay", default)]
    pub listed_on: WireDate,
    #[serde(rename = "sUpdateDate", default)]
    pub updated_at: CompactDateTime,
}

impl WireResponse for WireStockExchangeMaster {
    const FIXUPS: &'static [Fixup] = &[
        fixup_number!("sNehabaMin"),
        fixup_number!("sNehabaMax"),
        fixup_number!("sZenzituOwarine"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::envelope::{parse, RequestEnvelope, WireRecord};
    use crate::core::kernel::temporal::RequestTime;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn wire_json<Q: WireRequest>(request: &Q) -> String {
        let mut envelope = RequestEnvelope::new(2, Q::CLMID);
        envelope.sent_at = RequestTime::default();
        serde_json::to_string(&WireRecord {
            envelope,
            body: request,
        })
        .unwrap()
    }

    #[test]
    fn test_new_order_wire_layout() {
        let request = WireNewOrderRequest {
            account_type: AccountType::Specific,
            issue_code: "6501".to_string(),
            exchange: Exchange::Tokyo,
            side: Side::Buy,
            execution_timing: ExecutionTiming::NoCondition,
            price: "0".to_string(),
            quantity: 100,
            cash_margin: CashMargin::Cash,
            expire_day: WireDate::today(),
            stop_order_type: StopOrderType::Normal,
            trigger_price: "0".to_string(),
            stop_price: "0".to_string(),
            closing_order: UNCHANGED.to_string(),
            closing_account_type: UNCHANGED.to_string(),
            second_password: "pin".to_string(),
        };

        assert_eq!(
            wire_json(&request),
            concat!(
                r#"{"p_no":"2","p_sd_date":"0","sCLMID":"CLMKabuNewOrder","sJsonOfmt":"5","#,
                r#""sZyoutoekiKazeiC":"1","sIssueCode":"6501","sSizyouC":"00","sBaibaiKubun":"3","#,
                r#""sCondition":"0","sOrderPrice":"0","sOrderSuryou":"100","sGenkinShinyouKubun":"0","#,
                r#""sOrderExpireDay":"0","sGyakusasiOrderType":"0","sGyakusasiZyouken":"0","#,
                r#""sGyakusasiPrice":"0","sTatebiType":"*","sTategyokuZyoutoekiKazeiC":"*","#,
                r#""sSecondPassword":"pin"}"#
            )
        );
    }

    #[test]
    fn test_logout_carries_only_envelope() {
        assert_eq!(
            wire_json(&WireLogoutRequest {}),
            r#"{"p_no":"2","p_sd_date":"0","sCLMID":"CLMAuthLogoutRequest","sJsonOfmt":"5"}"#
        );
    }

    #[test]
    fn test_master_download_omits_empty_target() {
        let all = wire_json(&WireMasterDownloadRequest {
            tables: String::new(),
        });
        assert!(!all.contains("sTargetCLMID"));

        let some = wire_json(&WireMasterDownloadRequest {
            tables: "CLMIssueMstKabu,CLMDateZyouhou".to_string(),
        });
        assert!(some.ends_with(r#""sTargetCLMID":"CLMIssueMstKabu,CLMDateZyouhou"}"#));
    }

    #[test]
    fn test_login_response_decodes() {
        let raw = r#"{"p_no":"1","p_sd_date":"2024.01.04-08:00:00.000","p_rv_date":"2024.01.04-08:00:00.050","p_errno":"0","p_err":"","sCLMID":"CLMAuthLoginAck","sResultCode":"0","sResultText":"","sZyoutoekiKazeiC":"1","sSecondPasswordOmit":"0","sLastLoginDate":"20240103183000","sSogoKouzaKubun":"1","sShinyouKouzaKubun":"0","sKinsyouhouMidokuFlg":"0","sUrlRequest":"https://host/request/x/","sUrlMaster":"https://host/master/x/","sUrlPrice":"https://host/price/x/","sUrlEvent":"https://host/event/x/"}"#;
        let response = WireLoginResponse::decode(raw).unwrap();

        assert_eq!(response.envelope.request_number, 1);
        assert_eq!(response.account_type, AccountType::Specific);
        assert!(response.general_account);
        assert!(!response.margin_account);
        assert_eq!(response.last_login_date.encode(), "20240103183000");
        assert_eq!(response.url_price, "https://host/price/x/");
    }

    #[test]
    fn test_empty_order_list_needs_fixups() {
        let raw = r#"{"p_no":"5","p_errno":"0","sCLMID":"CLMOrderList","sResultCode":"0","sIssueCode":"","sOrderSyoukaiStatus":"","sSikkouDay":"","aOrderList":""}"#;
        assert!(matches!(
            parse::<WireOrderListResponse>(raw, &[]),
            Err(ExchangeError::UnmarshalFailed(_))
        ));

        let response = WireOrderListResponse::decode(raw).unwrap();
        assert!(response.orders.is_empty());
        assert_eq!(response.status, OrderInquiryStatus::Unspecified);
    }

    #[test]
    fn test_order_row_with_empty_contract_columns() {
        let raw = r#"{"p_no":"6","p_errno":"0","sCLMID":"CLMOrderList","sResultCode":"0","aOrderList":[{"sOrderOrderNumber":"12","sOrderIssueCode":"6501","sOrderSizyouC":"00","sOrderZyoutoekiKazeiC":"1","sGenkinSinyouKubun":"0","sOrderBaibaiKubun":"3","sOrderOrderSuryou":"100","sOrderCurrentSuryou":"100","sOrderOrderPrice":"4200","sOrderCondition":"0","sOrderGyakusasiOrderType":"0","sOrderGyakusasiZyouken":"","sOrderYakuzyouSuryo":"","sOrderYakuzyouPrice":"","sOrderSikkouDay":"20240104","sOrderStatusCode":"1","sOrderStatus":"受付済","sOrderOrderDateTime":"20240104090001","sOrderOrderExpireDay":"20240104","sOrderKurikosiOrderFlg":"0","sOrderCorrectCancelKahiFlg":"1","sGaisanDaikin":""}]}"#;
        let response = WireOrderListResponse::decode(raw).unwrap();

        let order = &response.orders[0];
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.price, dec("4200"));
        assert_eq!(order.contract_quantity, 0);
        assert_eq!(order.contract_price, Decimal::ZERO);
        assert_eq!(order.execution_day.encode(), "20240104");
        assert!(order.amendable);
    }

    #[test]
    fn test_market_price_fixups() {
        let raw = r#"{"p_no":"7","p_errno":"0","sCLMID":"CLMMfdsGetMarketPrice","sResultCode":"0","aCLMMfdsMarketPrice":[{"sIssueCode":"6501","pDPP":"","tDPP:T":"","pPRP":"4180"},{"sIssueCode":"7203","pDPP":"2890.5","tDPP:T":"10:15","pPRP":"2875"}]}"#;
        let response = WireMarketPriceResponse::decode(raw).unwrap();

        assert_eq!(response.prices.len(), 2);
        assert_eq!(response.prices[0].current_price, Decimal::ZERO);
        assert!(response.prices[0].current_price_time.is_zero());
        assert_eq!(response.prices[1].current_price, dec("2890.5"));
        assert_eq!(response.prices[1].current_price_time.encode(), "10:15");

        let empty = r#"{"p_no":"8","p_errno":"0","sCLMID":"CLMMfdsGetMarketPrice","sResultCode":"0","aCLMMfdsMarketPrice":""}"#;
        assert!(WireMarketPriceResponse::decode(empty).unwrap().prices.is_empty());
    }

    #[test]
    fn test_master_record_dispatch() {
        let stock = WireMasterRecord::decode_record(
            r#"{"sCLMID":"CLMIssueMstKabu","sIssueCode":"6501","sIssueName":"日立製作所","sBaibaiTani":"100","sZyouzyouHakkouKabusu":"","sYusenSizyou":"00","sUpdateDate":"20240104060000"}"#,
        )
        .unwrap();
        match stock {
            WireMasterRecord::StockMaster(stock) => {
                assert_eq!(stock.issue_name, "日立製作所");
                assert_eq!(stock.trading_unit, 100);
                assert_eq!(stock.listed_shares, 0);
            }
            other => panic!("unexpected record {:?}", other),
        }

        let day = WireMasterRecord::decode_record(
            r#"{"sCLMID":"CLMDateZyouhou","sDayKey":"001","sTheDay":"20240104","sYokuEigyouDay_1":"20240105"}"#,
        )
        .unwrap();
        assert!(matches!(
            day,
            WireMasterRecord::BusinessDay(ref d) if d.the_day.encode() == "20240104"
        ));

        let unknown =
            WireMasterRecord::decode_record(r#"{"sCLMID":"CLMOrderErrReason","sCode":"1"}"#)
                .unwrap();
        assert!(matches!(
            unknown,
            WireMasterRecord::Unknown { ref clmid, .. } if clmid == "CLMOrderErrReason"
        ));
    }
}
