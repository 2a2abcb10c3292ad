//! Command handlers.

use fabula::{
    CallExecutor, ChatClient, Credentials, FabulaConfig, FabulaResult, JsonError,
    LanguageProfileCache, Pipeline, RemoteProfileResolver, RunReport,
};
use tracing::info;

/// Run the full pipeline for `topic`.
pub async fn run_topic(
    config: &FabulaConfig,
    topic: &str,
    languages: Vec<String>,
    upload: bool,
) -> FabulaResult<RunReport> {
    let languages = if languages.is_empty() {
        config.pipeline().languages().clone()
    } else {
        languages
    };

    let credentials = Credentials::from_env()?;
    let pipeline = Pipeline::from_config(config, &credentials)?;
    let report = pipeline.run(topic, &languages, upload).await?;
    print_report(&report);
    Ok(report)
}

fn print_report(report: &RunReport) {
    println!("Output: {}", report.layout.base().display());
    for (language, video) in &report.videos {
        match report.uploads.get(language) {
            Some(receipt) => println!("  {}: {} -> {}", language, video.display(), receipt.link),
            None => println!("  {}: {}", language, video.display()),
        }
    }
    let failures = report
        .video_failures
        .iter()
        .chain(&report.metadata_failures)
        .chain(&report.upload_failures);
    for (language, reason) in failures {
        println!("  {}: FAILED {}", language, reason);
    }
    if !report.silent_segments.is_empty() {
        println!("  silent segments: {:?}", report.silent_segments);
    }
    if !report.placeholder_images.is_empty() {
        println!("  placeholder images: {:?}", report.placeholder_images);
    }
}

/// Resolve the profile for `code` and print it as JSON.
pub async fn show_profile(config: &FabulaConfig, code: &str) -> FabulaResult<()> {
    let credentials = Credentials::from_env()?;
    let executor = CallExecutor::from_config(config.retry())?;
    let chat = ChatClient::new(executor, credentials.generation_key(), config.chat().clone());
    let cache = LanguageProfileCache::new(RemoteProfileResolver::new(chat));

    let profile = cache.get_profile(code).await;
    info!(code, language = %profile.language_name, "Resolved profile");
    let pretty = serde_json::to_string_pretty(profile.as_ref()).map_err(JsonError::from)?;
    println!("{}", pretty);
    Ok(())
}

/// Print the effective configuration.
pub fn show_config(config: &FabulaConfig) -> FabulaResult<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
