use anyhow::Context;
use serde_json::json;

use super::OutputFormat;
use crate::client::{http, HttpTodoApi, MutationPipeline, Notice};

pub async fn login(base_url: &str, credential: &str, format: OutputFormat) -> anyhow::Result<()> {
    let (user, token) = http::sign_in(base_url, credential)
        .await
        .context("sign-in failed")?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "user": user, "token": token }))?
            );
        }
        OutputFormat::Text => {
            println!("Signed in.");
            println!("Session token (export as TODO_SESSION):");
            println!("{}", token);
        }
    }

    Ok(())
}

pub async fn whoami(base_url: &str, token: &str, format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/api/auth/whoami", base_url.trim_end_matches('/'));
    let response = reqwest::Client::new()
        .get(&url)
        .header(
            reqwest::header::COOKIE,
            format!("{}={}", crate::session::SESSION_COOKIE, token),
        )
        .send()
        .await
        .context("whoami request failed")?;

    let user: serde_json::Value = http::unwrap_envelope(response)
        .await
        .context("whoami failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => {
            let name = user["display_name"].as_str().unwrap_or("?");
            let email = user["email"].as_str().unwrap_or("?");
            println!("{} <{}>", name, email);
        }
    }

    Ok(())
}

pub async fn list(base_url: &str, token: &str, format: OutputFormat) -> anyhow::Result<()> {
    let mut pipeline = pipeline(base_url, token);
    pipeline
        .refresh()
        .await
        .context("failed to fetch todo list")?;

    print_list(&pipeline, format)?;
    Ok(())
}

pub async fn add(
    base_url: &str,
    token: &str,
    title: &str,
    description: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut pipeline = pipeline(base_url, token);
    pipeline
        .refresh()
        .await
        .context("failed to fetch todo list")?;

    let accepted = pipeline.add(title, description).await;
    finish_mutation(pipeline, accepted, format)
}

pub async fn toggle(
    base_url: &str,
    token: &str,
    id: &str,
    done: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut pipeline = pipeline(base_url, token);
    pipeline
        .refresh()
        .await
        .context("failed to fetch todo list")?;

    let accepted = pipeline.toggle(id, done).await;
    finish_mutation(pipeline, accepted, format)
}

pub async fn remove(
    base_url: &str,
    token: &str,
    id: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut pipeline = pipeline(base_url, token);
    pipeline
        .refresh()
        .await
        .context("failed to fetch todo list")?;

    let accepted = pipeline.remove(id).await;
    finish_mutation(pipeline, accepted, format)
}

fn pipeline(base_url: &str, token: &str) -> MutationPipeline<HttpTodoApi> {
    MutationPipeline::new(HttpTodoApi::new(base_url, token))
}

fn finish_mutation(
    mut pipeline: MutationPipeline<HttpTodoApi>,
    accepted: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    for notice in pipeline.take_notices() {
        match notice {
            Notice::Success(msg) => eprintln!("{}", msg),
            Notice::Failure(msg) => eprintln!("error: {}", msg),
        }
    }

    print_list(&pipeline, format)?;

    if !accepted {
        anyhow::bail!("mutation was rejected by the server");
    }
    Ok(())
}

fn print_list(
    pipeline: &MutationPipeline<HttpTodoApi>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(pipeline.todos())?);
        }
        OutputFormat::Text => {
            if pipeline.todos().is_empty() {
                println!("No todos.");
            }
            for todo in pipeline.todos() {
                let mark = if todo.completed { "x" } else { " " };
                println!("[{}] {}  ({})", mark, todo.title, todo.id);
            }
        }
    }
    Ok(())
}
