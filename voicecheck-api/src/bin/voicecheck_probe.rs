//! voicecheck-probe - manual test client
//!
//! Sends an audio file to a running voicecheck-api, or analyses it locally
//! with `--offline` and prints the full feature vector.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voicecheck_api::models::{DetectRequest, Language};
use voicecheck_core::Analyzer;

#[derive(Parser, Debug)]
#[command(name = "voicecheck-probe")]
#[command(about = "Send an audio clip to voicecheck-api or analyse it locally")]
#[command(version)]
struct Args {
    /// Audio file (mp3, wav, flac, ogg, ...)
    file: PathBuf,

    /// Detection endpoint
    #[arg(long, default_value = "http://127.0.0.1:8000/detect", env = "VOICECHECK_URL")]
    url: String,

    /// Bearer token for the service
    #[arg(long, env = "VOICECHECK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Language echoed by the service
    #[arg(long, default_value = "english")]
    language: String,

    /// Analyse locally instead of calling the service
    #[arg(long)]
    offline: bool,

    /// Rule table for offline analysis
    #[arg(long, default_value = "advanced")]
    rule_set: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicecheck_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    debug!(bytes = bytes.len(), "Read audio file");

    if args.offline {
        let language: Language = args.language.parse().map_err(|e| anyhow::anyhow!("{}", e))?;
        let analyzer = Analyzer::for_rule_set(&args.rule_set)?;
        let analysis = tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&bytes))
            .await
            .context("Analysis task failed")??;

        let report = json!({
            "classification": analysis.verdict.classification,
            "confidence": analysis.verdict.confidence,
            "language": language,
            "explanation": analysis.verdict.explanation,
            "sample_rate": analysis.sample_rate,
            "duration_seconds": analysis.duration_seconds,
            "assessment": analysis.assessment,
            "features": analysis.features,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let Some(api_key) = args.api_key else {
        bail!("An API key is required: pass --api-key or set VOICECHECK_API_KEY");
    };

    let request = DetectRequest {
        audio_base64: STANDARD.encode(&bytes),
        language: Some(args.language),
    };

    let response = reqwest::Client::new()
        .post(&args.url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", args.url))?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("Response body is not JSON")?;

    println!("Status: {}", status);
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("Service returned {}", status);
    }
    Ok(())
}
