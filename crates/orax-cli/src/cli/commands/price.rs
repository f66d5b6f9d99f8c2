//! Price command handler.

use std::time::Duration;

use anyhow::Result;
use orax_core::config::Config;
use orax_core::core::session::OracleSession;
use orax_core::oracle::{OracleKind, PriceQuote, UNKNOWN_ANSWER};

use super::await_answer;

pub async fn run(config: &Config, wait: Duration) -> Result<()> {
    let (session, mut rx) = OracleSession::connect(config).await?;
    session.submit_price_update();

    let answer = await_answer(&mut rx, OracleKind::DieselPrice, wait).await?;
    let quote = answer.as_deref().and_then(|payload| {
        PriceQuote::parse(payload)
            .inspect_err(|error| tracing::warn!(%error, "unusable price payload"))
            .ok()
    });

    match quote {
        Some(quote) => {
            println!("Diesel: {}", quote.diesel);
            println!("LPG:    {}", quote.lpg);
        }
        None => println!("{UNKNOWN_ANSWER}"),
    }
    Ok(())
}
