use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use crate::constants::BIND_ADDR;
use crate::model::{CreateNewsRequest, NewsRecord};

#[derive(Debug, Args, Clone)]
pub struct PostArgs {
    /// Base URL of the news server
    #[arg(short, long, default_value_t = format!("http://{BIND_ADDR}"))]
    pub server: String,

    /// Headline of the story
    #[arg(short, long)]
    pub title: String,

    /// Category label, e.g. Technology or Sports
    #[arg(short, long)]
    pub category: String,

    /// Full story text
    #[arg(short, long)]
    pub details: String,
}

#[derive(Deserialize)]
struct CreateResponse {
    success: bool,
    error: Option<String>,
    data: Option<NewsRecord>,
}

/// Publish a single news item through the REST API.
pub async fn run(args: PostArgs) -> Result<()> {
    let client = reqwest::Client::new();
    let request = CreateNewsRequest {
        title: args.title,
        category: args.category,
        details: args.details,
    };

    let outcome: CreateResponse = client
        .post(format!("{}/api/news", args.server))
        .json(&request)
        .send()
        .await
        .context("failed to reach the news server")?
        .json()
        .await
        .context("failed to decode the create response")?;

    if !outcome.success {
        bail!(
            "server rejected the item: {}",
            outcome.error.unwrap_or_else(|| "unknown error".into())
        );
    }

    let record = outcome
        .data
        .context("success response carried no record payload")?;
    println!("Published #{} [{}] {}", record.id, record.category, record.title);
    Ok(())
}
