//! Ask command handler (knowledge oracle).

use std::time::Duration;

use anyhow::Result;
use orax_core::config::Config;
use orax_core::core::session::OracleSession;
use orax_core::oracle::{CANNOT_UNDERSTAND, OracleKind};

use super::await_answer;

pub async fn run(config: &Config, question: &str, wait: Duration) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("the question must not be empty");
    }

    let (session, mut rx) = OracleSession::connect(config).await?;
    session.submit_knowledge_query(question);

    match await_answer(&mut rx, OracleKind::Knowledge, wait).await? {
        Some(answer) => println!("{answer}"),
        None => println!("{CANNOT_UNDERSTAND}"),
    }
    Ok(())
}
