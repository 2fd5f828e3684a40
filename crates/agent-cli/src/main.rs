//! science-agent CLI
//!
//! One-shot mode: `science-agent What is the half-life of carbon-14?`
//! Without arguments the question is read from stdin; an empty line asks the
//! default question.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use agent_core::orchestrator;
use agent_runtime::{AgentSettings, research_agent_cell};

const DEFAULT_QUESTION: &str =
    "What are the latest advances in artificial intelligence according to ArXiv?";

const RULE: &str = "============================================================";

#[derive(Parser)]
#[command(
    name = "science-agent",
    about = "Autonomous scientific research agent",
    version
)]
struct Cli {
    /// Question to ask; read from stdin when omitted
    question: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ Error processing: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cell = research_agent_cell(AgentSettings::from_env());
    let handle = cell.get_or_init().await?;

    print_banner();

    let question = if cli.question.is_empty() {
        prompt_question()?
    } else {
        cli.question.join(" ")
    };

    println!("\n🔍 Question: {question}\n");
    println!("🤔 Processing...\n");

    let result = orchestrator::query(&handle, &question).await?;

    println!("\n{RULE}");
    println!("📊 FINAL ANSWER");
    println!("{RULE}");
    println!("{}", result.answer);
    if let Some(tools) = &result.tools_used {
        println!("\n🛠  Tools used: {}", tools.join(", "));
    }
    println!("⏱  {:.2}s", result.processing_time);

    Ok(())
}

fn print_banner() {
    println!("\n{RULE}");
    println!("🔬 AUTONOMOUS SCIENTIFIC AGENT");
    println!("{RULE}");
    println!("\nAvailable tools:");
    for label in research_tools::tool_labels() {
        println!("  • {label}");
    }
    println!("\n{}", "-".repeat(RULE.len()));
}

fn prompt_question() -> anyhow::Result<String> {
    print!("\n💬 Ask your scientific question: ");
    std::io::stdout().flush().context("flushing stdout")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading question from stdin")?;

    Ok(question_or_default(&line))
}

fn question_or_default(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_or_default() {
        assert_eq!(question_or_default("  What is entropy?\n"), "What is entropy?");
        assert_eq!(question_or_default("\n"), DEFAULT_QUESTION);
    }

    #[test]
    fn test_args_join_into_question() {
        let cli = Cli::parse_from(["science-agent", "-v", "What", "is", "2+2?"]);
        assert!(cli.verbose);
        assert_eq!(cli.question.join(" "), "What is 2+2?");
    }
}
