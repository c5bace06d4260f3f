//! Console courtroom: drives one case against a running judge server.
//!
//! Usage: `judge-debate [SIDE_A_FILE SIDE_B_FILE]`. Without files the built-in
//! sample case is fetched from the server. `JUDGE_URL` overrides the server
//! address.

use std::sync::Arc;

use anyhow::{Context, Result};
use judge_core::{CaseController, ControllerError, Language, Side};
use judge_sdk::{panel, JudgeClient, DEFAULT_BASE_URL};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

const HELP: &str = "\
commands:
  A: <text>            argue for side A
  B: <text>            argue for side B
  load <A|B> <file>    load a document (before the first verdict)
  decide               ask for the initial verdict
  lang <en|hi>         switch language
  show                 print the panels
  timeline             print the verdict timeline
  export <file>        write the case as JSON
  reset                start a new case
  quit";

type Court = CaseController<JudgeClient>;

fn print_panels(court: &Court) {
    let snapshot = court.snapshot();
    println!("{}", panel::lawyer_panel(&snapshot, Side::A));
    println!("{}", panel::lawyer_panel(&snapshot, Side::B));
    println!(
        "{}",
        panel::judge_panel(court.current_verdict().as_ref(), snapshot.language)
    );
}

fn report(err: &ControllerError) {
    if err.is_local() {
        println!("! {err}");
    } else {
        warn!("verdict request failed: {err}");
        println!("! request failed: {err}");
    }
}

async fn decide(court: &Court) {
    println!("... the judge is reading both sides");
    match court.request_initial_verdict().await {
        Ok(_) => print_panels(court),
        Err(e) => report(&e),
    }
}

async fn argue(court: &Court, side: Side, text: &str) {
    println!("... side {side} is arguing");
    match court.submit_argument(side, text).await {
        Ok(entry) => {
            println!("{}", entry.label());
            println!(
                "{}",
                panel::judge_panel(Some(&entry.verdict), court.language())
            );
            println!(
                "side {side}: {} argument(s) left",
                court.arguments_left(side)
            );
        },
        Err(e) => report(&e),
    }
}

async fn export(court: &Court, path: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(&court.snapshot())?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing {path}"))?;
    println!("case written to {path}");
    Ok(())
}

/// Returns false when the session should end.
async fn handle(court: &Court, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }
    if let Some((head, rest)) = line.split_once(':') {
        if let Some(side) = Side::parse(head) {
            argue(court, side, rest.trim()).await;
            return true;
        }
    }

    let mut parts = line.splitn(3, ' ');
    let cmd = parts.next().unwrap_or_default();
    match cmd {
        "quit" | "exit" => return false,
        "help" => println!("{HELP}"),
        "decide" => decide(court).await,
        "show" => print_panels(court),
        "timeline" => print!("{}", panel::timeline(&court.timeline(), court.language())),
        "reset" => {
            court.reset();
            println!("new case {}", court.case_id());
        },
        "lang" => match parts.next().and_then(Language::parse) {
            Some(lang) => court.set_language(lang),
            None => println!("! expected en or hi"),
        },
        "load" => match (parts.next().and_then(Side::parse), parts.next()) {
            (Some(side), Some(path)) => match court.load_document_file(side, path.trim()).await {
                Ok(chars) => println!("side {side}: {chars} characters loaded"),
                Err(e) => report(&e),
            },
            _ => println!("! usage: load <A|B> <file>"),
        },
        "export" => match parts.next() {
            Some(path) => {
                if let Err(e) = export(court, path.trim()).await {
                    println!("! {e:#}");
                }
            },
            None => println!("! usage: export <file>"),
        },
        _ => println!("unknown command, try `help`"),
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let base_url = std::env::var("JUDGE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let client = JudgeClient::new(&base_url);
    let court: Court = CaseController::new(Arc::new(client.clone()));
    info!(server = %base_url, case_id = %court.case_id(), "session started");

    let files: Vec<String> = std::env::args().skip(1).collect();
    match files.as_slice() {
        [a, b] => {
            court.load_document_file(Side::A, a).await?;
            court.load_document_file(Side::B, b).await?;
        },
        [] => {
            let a = client
                .fetch_sample("plaintiff")
                .await
                .context("fetching sample plaintiff case")?;
            let b = client
                .fetch_sample("defendant")
                .await
                .context("fetching sample defendant case")?;
            court.set_document(Side::A, a)?;
            court.set_document(Side::B, b)?;
            println!("loaded the sample case from {base_url}");
        },
        _ => anyhow::bail!("usage: judge-debate [SIDE_A_FILE SIDE_B_FILE]"),
    }

    decide(&court).await;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle(&court, &line).await {
            break;
        }
    }
    Ok(())
}
