//! Tests for story script generation.

mod test_utils;

use fabula_error::{FabulaErrorKind, PipelineErrorKind};
use fabula_models::ScriptGenerator;
use fabula_retry::mock::{Reply, ScriptedTransport};
use test_utils::{chat_client, chat_json_reply, chat_reply, json_body, sample_script};

fn languages() -> Vec<String> {
    vec!["en".to_string(), "te".to_string()]
}

#[tokio::test(start_paused = true)]
async fn test_generate_parses_script() -> anyhow::Result<()> {
    let transport = ScriptedTransport::sequence(vec![chat_json_reply(sample_script())]);
    let generator = ScriptGenerator::new(chat_client(transport));

    let script = generator.generate("Joseph's coat", &languages()).await?;

    assert_eq!(script.scenes.len(), 3);
    assert_eq!(script.segments().len(), 5);
    assert_eq!(script.anchor(), "A young shepherd boy in a coat of many colors");
    assert_eq!(script.scenes[0].narration_for("te"), "యోసేపుకు పదకొండు మంది సోదరులు.");
    assert_eq!(script.scenes[2].narration_for("te"), "Language not available.");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_request_uses_script_sampling() -> anyhow::Result<()> {
    let transport = ScriptedTransport::sequence(vec![chat_json_reply(sample_script())]);
    let chat = chat_client(transport);
    let generator = ScriptGenerator::new(chat.clone());

    generator.generate("Joseph's coat", &languages()).await?;

    let requests = chat.executor().transport().requests();
    assert_eq!(requests.len(), 1);
    let body = json_body(&requests[0]);
    assert_eq!(body["model"], "deepseek-ai/DeepSeek-V3");
    assert_eq!(body["max_tokens"], 4096);
    assert!((body["temperature"].as_f64().unwrap_or_default() - 1.1).abs() < 1e-6);
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(
        requests[0].descriptor.header("authorization"),
        Some("Bearer sk-test")
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_fenced_reply_is_accepted() -> anyhow::Result<()> {
    let fenced = format!("```json\n{}\n```", sample_script());
    let transport = ScriptedTransport::sequence(vec![chat_reply(&fenced)]);
    let generator = ScriptGenerator::new(chat_client(transport));

    let script = generator.generate("Joseph's coat", &languages()).await?;

    assert_eq!(script.scenes.len(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() -> anyhow::Result<()> {
    let transport = ScriptedTransport::sequence(vec![
        Reply::status(503),
        Reply::timeout(),
        chat_json_reply(sample_script()),
    ]);
    let chat = chat_client(transport);
    let generator = ScriptGenerator::new(chat.clone());

    generator.generate("Joseph's coat", &languages()).await?;

    assert_eq!(chat.executor().transport().call_count(), 3);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rejected_key_fails_without_retry() {
    let transport = ScriptedTransport::always(Reply::text(401, "{\"error\": \"invalid key\"}"));
    let chat = chat_client(transport);
    let generator = ScriptGenerator::new(chat.clone());

    let err = generator
        .generate("Joseph's coat", &languages())
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(401));
    assert_eq!(chat.executor().transport().call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_prose_reply_is_json_error() {
    let transport = ScriptedTransport::sequence(vec![chat_reply("Once upon a time...")]);
    let generator = ScriptGenerator::new(chat_client(transport));

    let err = generator
        .generate("Joseph's coat", &languages())
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), FabulaErrorKind::Json(_)));
}

#[tokio::test(start_paused = true)]
async fn test_empty_script_is_rejected() {
    let transport = ScriptedTransport::sequence(vec![chat_reply("{\"scenes\": []}")]);
    let generator = ScriptGenerator::new(chat_client(transport));

    let err = generator
        .generate("Joseph's coat", &languages())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        FabulaErrorKind::Pipeline(e) if e.kind == PipelineErrorKind::EmptyScript
    ));
}
