use anyhow::Context;
use eshiten::core::config::ClientConfig;
use eshiten::core::traits::{MarketDataSource, SessionManager};
use eshiten::core::types::{LoginRequest, MarketPriceRequest};
use eshiten::build_connector;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Reads ESHITEN_USER_ID, ESHITEN_PASSWORD, ... (use ESHITEN_ENVIRONMENT=demo for safety)
    let config = ClientConfig::from_env("ESHITEN").context("loading configuration")?;
    let connector = build_connector(&config)?;

    // Ctrl-C cancels whatever is in flight
    let ctx = CancellationToken::new();
    let on_signal = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let (session, login) = connector
        .login(&ctx, LoginRequest::from_config(&config))
        .await
        .context("logging in")?;
    println!(
        "Logged in (last login {:?}, margin account: {})",
        login.last_login_at, login.has_margin_account
    );

    let request = MarketPriceRequest::new(vec!["6501".to_string(), "7203".to_string()]);
    match connector.market_price(&ctx, Some(&session), request).await {
        Ok(response) => {
            for price in response.prices {
                println!(
                    "{}: {} at {:?} (prev close {})",
                    price.issue_code,
                    price.current_price,
                    price.current_price_time,
                    price.previous_close
                );
            }
        }
        Err(e) => {
            println!("Error fetching prices: {}", e);
        }
    }

    let logout = connector.logout(&ctx, Some(&session)).await?;
    println!("Logged out: {}", logout.result.is_success());

    Ok(())
}
