use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use git_tweet_mashup::config::Config;
use git_tweet_mashup::github::GithubClient;
use git_tweet_mashup::mashup::{validate_search_term, Mashup};
use git_tweet_mashup::twitter::TwitterClient;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[clap(version, about = "Summarise GitHub projects and what Twitter says about them")]
struct Args {
    /// Term to search GitHub projects for
    term: Option<String>,
    /// Path to the configuration file
    #[clap(short, long, default_value = "./mashup.json")]
    config: PathBuf,
    /// Maximum number of projects to summarise (overrides the configuration file)
    #[clap(short, long)]
    max_projects: Option<usize>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(e) = main2().await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn main2() -> anyhow::Result<()> {
    let args: Args = Args::parse();
    let term = args.term.unwrap_or_default();
    validate_search_term(&term)?;
    let config = Config::load(&args.config).await?;

    let cancel = CancellationToken::new();
    let interrupted = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling outstanding requests");
            interrupted.cancel();
        }
    });

    let github = GithubClient::new(config.endpoints.github, config.retry, cancel.clone())?;
    let twitter = TwitterClient::connect(
        config.twitter,
        config.endpoints.twitter,
        config.posts_per_project,
        config.retry,
        cancel,
    )
    .await
    .context("Error creating Twitter client")?;

    let mashup = Mashup::new(
        Box::new(github),
        Box::new(twitter),
        args.max_projects.unwrap_or(config.project_results_count),
        config.posts_per_project as usize,
    );
    let summary = mashup.summary(&term).await?;
    println!("{}", summary);
    Ok(())
}
