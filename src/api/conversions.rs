use crate::api::types::{
    WireBusinessDay, WireCancelOrderRequest, WireCancelOrderResponse, WireCorrectOrderRequest,
    WireCorrectOrderResponse, WireLoginRequest, WireLoginResponse, WireLogoutResponse,
    WireMarketPrice, WireMarketPriceRequest, WireMarketPriceResponse, WireMasterDownloadRequest,
    WireMasterRecord, WireNewOrderRequest, WireNewOrderResponse, WireOrder, WireOrderListRequest,
    WireOrderListResponse, WireStockExchangeMaster, WireStockMaster, WireSystemStatus, UNCHANGED,
};
use crate::core::errors::ExchangeError;
use crate::core::kernel::envelope::ResponseEnvelope;
use crate::core::kernel::session::{Session, SessionUrls};
use crate::core::kernel::temporal::WireDate;
use crate::core::types::{
    BusinessDay, CancelOrderRequest, CancelOrderResponse, CorrectOrderRequest,
    CorrectOrderResponse, Exchange, ExpireDay, LoginRequest, LoginResponse, LogoutResponse,
    MarketPrice, MarketPriceRequest, MarketPriceResponse, MasterDownloadRequest, MasterRecord,
    NewOrderRequest, NewOrderResponse, Order, OrderListRequest, OrderListResponse, ResponseCommon,
    ResultStatus, StockExchangeMaster, StockMaster, StopOrderType, SystemStatus,
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;

/// Price as sent on the wire; a market order is `"0"`.
pub fn encode_price(price: Option<Decimal>) -> String {
    price.map_or_else(|| "0".to_string(), |p| p.normalize().to_string())
}

fn encode_expire_day(expire_day: ExpireDay) -> WireDate {
    match expire_day {
        ExpireDay::Today => WireDate::today(),
        ExpireDay::Until(day) => WireDate::new(day),
    }
}

fn unchanged_or<T>(value: Option<T>, encode: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| UNCHANGED.to_string(), encode)
}

pub fn build_login_request(request: &LoginRequest) -> WireLoginRequest {
    WireLoginRequest {
        user_id: request.user_id.expose_secret().clone(),
        password: request.password.expose_secret().clone(),
    }
}

pub fn build_new_order_request(
    order: NewOrderRequest,
    second_password: &str,
) -> WireNewOrderRequest {
    let (trigger_price, stop_price) = match (order.stop_order_type, order.stop_trigger) {
        (StopOrderType::Normal, _) | (_, None) => ("0".to_string(), "0".to_string()),
        (_, Some(trigger)) => (
            trigger.trigger_price.normalize().to_string(),
            encode_price(trigger.price),
        ),
    };

    WireNewOrderRequest {
        account_type: order.account_type,
        issue_code: order.issue_code,
        exchange: order.exchange,
        side: order.side,
        execution_timing: order.execution_timing,
        price: encode_price(order.price),
        quantity: order.quantity,
        cash_margin: order.cash_margin,
        expire_day: encode_expire_day(order.expire_day),
        stop_order_type: order.stop_order_type,
        trigger_price,
        stop_price,
        closing_order: UNCHANGED.to_string(),
        closing_account_type: UNCHANGED.to_string(),
        second_password: second_password.to_string(),
    }
}

pub fn build_correct_order_request(
    order: CorrectOrderRequest,
    second_password: &str,
) -> WireCorrectOrderRequest {
    WireCorrectOrderRequest {
        order_number: order.order_number,
        business_day: WireDate::from(order.business_day),
        execution_timing: unchanged_or(order.execution_timing, |t| t.code().to_string()),
        price: unchanged_or(order.price, encode_price),
        quantity: unchanged_or(order.quantity, |q| q.to_string()),
        expire_day: order
            .expire_day
            .map_or_else(WireDate::no_change, encode_expire_day),
        trigger_price: unchanged_or(order.trigger_price, |p| p.normalize().to_string()),
        stop_price: unchanged_or(order.stop_price, encode_price),
        second_password: second_password.to_string(),
    }
}

pub fn build_cancel_order_request(
    order: CancelOrderRequest,
    second_password: &str,
) -> WireCancelOrderRequest {
    WireCancelOrderRequest {
        order_number: order.order_number,
        business_day: WireDate::from(order.business_day),
        second_password: second_password.to_string(),
    }
}

pub fn build_order_list_request(request: OrderListRequest) -> WireOrderListRequest {
    WireOrderListRequest {
        issue_code: request.issue_code,
        execution_day: WireDate::from(request.execution_day),
        status: request.status,
    }
}

pub fn build_market_price_request(request: &MarketPriceRequest) -> WireMarketPriceRequest {
    WireMarketPriceRequest {
        issue_codes: request.issue_codes.join(","),
        columns: request
            .columns
            .iter()
            .map(|column| column.code())
            .collect::<Vec<_>>()
            .join(","),
    }
}

pub fn build_master_download_request(
    request: &MasterDownloadRequest,
) -> WireMasterDownloadRequest {
    WireMasterDownloadRequest {
        tables: request
            .tables
            .iter()
            .map(|table| table.clmid())
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// Drops the request number and exposes the wire timestamps as decoded values.
pub fn convert_response_common(envelope: &ResponseEnvelope) -> ResponseCommon {
    ResponseCommon {
        sent_at: envelope.sent_at.time(),
        received_at: envelope.received_at.time(),
        error_code: envelope.error_code,
        error_message: envelope.error_message.clone(),
        message_type: envelope.clmid.clone(),
    }
}

fn result_status(code: &str, text: &str) -> ResultStatus {
    ResultStatus {
        code: code.to_string(),
        text: text.to_string(),
    }
}

/// Open a session from a login response, or explain why none can be opened.
pub fn session_from_login(response: &WireLoginResponse) -> Result<Session, ExchangeError> {
    if response.envelope.error_code != 0 {
        return Err(ExchangeError::CanNotCreateSession(format!(
            "transport error {}: {}",
            response.envelope.error_code, response.envelope.error_message
        )));
    }
    if response.result_code != "0" {
        return Err(ExchangeError::CanNotCreateSession(format!(
            "login refused {}: {}",
            response.result_code, response.result_text
        )));
    }
    if response.url_request.is_empty() {
        return Err(ExchangeError::CanNotCreateSession(
            "login response carried no request URL".to_string(),
        ));
    }

    Ok(Session::new(
        SessionUrls {
            request: response.url_request.clone(),
            event: response.url_event.clone(),
            master: response.url_master.clone(),
            price: response.url_price.clone(),
        },
        response.envelope.request_number,
    ))
}

pub fn convert_login_response(response: &WireLoginResponse) -> LoginResponse {
    LoginResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
        account_type: response.account_type,
        second_password_omitted: response.second_password_omit,
        last_login_at: response.last_login_date.time(),
        has_general_account: response.general_account,
        has_margin_account: response.margin_account,
        has_unread_documents: response.unread_documents,
    }
}

pub fn convert_logout_response(response: WireLogoutResponse) -> LogoutResponse {
    LogoutResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
    }
}

pub fn convert_new_order_response(response: WireNewOrderResponse) -> NewOrderResponse {
    NewOrderResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
        warning: result_status(&response.warning_code, &response.warning_text),
        order_number: response.order_number,
        business_day: response.business_day.time(),
        settlement_amount: response.settlement_amount,
        commission: response.commission,
        consumption_tax: response.consumption_tax,
        interest: response.interest,
        ordered_at: response.order_date.time(),
    }
}

pub fn convert_correct_order_response(response: WireCorrectOrderResponse) -> CorrectOrderResponse {
    CorrectOrderResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
        order_number: response.order_number,
        business_day: response.business_day.time(),
        settlement_amount: response.settlement_amount,
        commission: response.commission,
        consumption_tax: response.consumption_tax,
        ordered_at: response.order_date.time(),
    }
}

pub fn convert_cancel_order_response(response: WireCancelOrderResponse) -> CancelOrderResponse {
    CancelOrderResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
        order_number: response.order_number,
        business_day: response.business_day.time(),
        settlement_amount: response.settlement_amount,
        ordered_at: response.order_date.time(),
    }
}

pub fn convert_order(order: WireOrder) -> Order {
    Order {
        warning: result_status(&order.warning_code, &order.warning_text),
        order_number: order.order_number,
        issue_code: order.issue_code,
        exchange: order.exchange,
        account_type: order.account_type,
        cash_margin: order.cash_margin,
        side: order.side,
        quantity: order.quantity,
        remaining_quantity: order.remaining_quantity,
        price: order.price,
        execution_timing: order.execution_timing,
        stop_order_type: order.stop_order_type,
        trigger_price: order.trigger_price,
        contract_quantity: order.contract_quantity,
        contract_price: order.contract_price,
        execution_day: order.execution_day.time(),
        status_code: order.status_code,
        status: order.status,
        ordered_at: order.ordered_at.time(),
        expire_day: order.expire_day.time(),
        carried_over: order.carried_over,
        amendable: order.amendable,
        estimated_amount: order.estimated_amount,
    }
}

pub fn convert_order_list_response(response: WireOrderListResponse) -> OrderListResponse {
    OrderListResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
        warning: result_status(&response.warning_code, &response.warning_text),
        issue_code: response.issue_code,
        status: response.status,
        execution_day: response.execution_day.time(),
        orders: response.orders.into_iter().map(convert_order).collect(),
    }
}

pub fn convert_market_price(price: WireMarketPrice) -> MarketPrice {
    MarketPrice {
        issue_code: price.issue_code,
        current_price: price.current_price,
        current_price_time: price.current_price_time.time(),
        previous_close: price.previous_close,
        open: price.open,
        high: price.high,
        low: price.low,
        volume: price.volume,
        ask_price: price.ask_price,
        bid_price: price.bid_price,
        ask_quantity: price.ask_quantity,
        bid_quantity: price.bid_quantity,
    }
}

pub fn convert_market_price_response(response: WireMarketPriceResponse) -> MarketPriceResponse {
    MarketPriceResponse {
        common: convert_response_common(&response.envelope),
        result: result_status(&response.result_code, &response.result_text),
        prices: response
            .prices
            .into_iter()
            .map(convert_market_price)
            .collect(),
    }
}

pub fn convert_system_status(status: WireSystemStatus) -> SystemStatus {
    SystemStatus {
        status_key: status.status_key,
        login_permitted: status.login_permission == "1",
        system_status: status.system_status,
        created_at: status.created_at.time(),
        updated_at: status.updated_at.time(),
    }
}

pub fn convert_business_day(day: WireBusinessDay) -> BusinessDay {
    BusinessDay {
        day_key: day.day_key,
        previous_business_days: [
            day.previous_1.time(),
            day.previous_2.time(),
            day.previous_3.time(),
        ],
        the_day: day.the_day.time(),
        next_business_days: [day.next_1.time(), day.next_2.time(), day.next_3.time()],
        stock_delivery_day: day.stock_delivery_day.time(),
    }
}

pub fn convert_stock_master(stock: WireStockMaster) -> StockMaster {
    StockMaster {
        preferred_exchange: Exchange::from_code(&stock.preferred_exchange),
        issue_code: stock.issue_code,
        issue_name: stock.issue_name,
        issue_name_short: stock.issue_name_short,
        issue_name_kana: stock.issue_name_kana,
        issue_name_english: stock.issue_name_english,
        trading_unit: stock.trading_unit,
        listed_shares: stock.listed_shares,
        industry_code: stock.industry_code,
        industry_name: stock.industry_name,
        updated_at: stock.updated_at.time(),
    }
}

pub fn convert_stock_exchange_master(stock: WireStockExchangeMaster) -> StockExchangeMaster {
    StockExchangeMaster {
        exchange: Exchange::from_code(&stock.exchange),
        margin_eligible: !stock.margin_code.is_empty() && stock.margin_code != "0",
        issue_code: stock.issue_code,
        price_limit_low: stock.price_limit_low,
        price_limit_high: stock.price_limit_high,
        previous_close: stock.previous_close,
        listed_on: stock.listed_on.time(),
        updated_at: stock.updated_at.time(),
    }
}

pub fn convert_master_record(record: WireMasterRecord) -> MasterRecord {
    match record {
        WireMasterRecord::SystemStatus(status) => {
            MasterRecord::SystemStatus(convert_system_status(status))
        }
        WireMasterRecord::BusinessDay(day) => MasterRecord::BusinessDay(convert_business_day(day)),
        WireMasterRecord::StockMaster(stock) => {
            MasterRecord::StockMaster(convert_stock_master(stock))
        }
        WireMasterRecord::StockExchangeMaster(stock) => {
            MasterRecord::StockExchangeMaster(convert_stock_exchange_master(stock))
        }
        WireMasterRecord::Unknown { clmid, raw } => MasterRecord::Unknown {
            message_type: clmid,
            raw,
        },
    }
}
