use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config;
use crate::format::IssueFormatter;
use crate::icons::IconCache;
use crate::model::issue::Issue;
use crate::model::result_item::ScriptFilter;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub org: Option<String>,
    pub input: Option<String>,
    pub no_wait: bool,
    pub help: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    issues: Vec<Issue>,
}

/// Read issues from `--input` or stdin, format them, print the script filter
/// JSON, then let pending icon downloads finish.
pub async fn handle_format(args: CliArgs) -> Result<()> {
    let mut config = config::load_config()?;
    if let Some(org) = args.org {
        config.org = Some(org);
    }

    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read issues from {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read issues from stdin")?;
            buf
        }
    };
    let issues = parse_issues(&raw)?;
    tracing::info!(count = issues.len(), "formatting issues");

    let icons = IconCache::from_config(&config);
    let formatter = IssueFormatter::from_config(&config, icons)?;
    let output = ScriptFilter {
        items: formatter.format_issues(&issues),
    };

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &output)?;
    writeln!(stdout)?;
    stdout.flush()?;
    drop(stdout);

    if !args.no_wait {
        let outcomes = formatter.icons().wait_idle().await;
        tracing::debug!(tasks = outcomes.len(), "icon cache settled");
    }

    Ok(())
}

/// Accepts either a bare issue array or a Jira search response.
pub fn parse_issues(raw: &str) -> Result<Vec<Issue>> {
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let issues = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<Issue>>(raw).context("Failed to parse issues JSON")?
    } else {
        serde_json::from_str::<SearchResponse>(raw)
            .context("Failed to parse issues JSON")?
            .issues
    };
    Ok(issues)
}

/// Parse command line arguments.
///
/// Supported forms:
///   jira-alfred
///   jira-alfred --org acme --input issues.json
///   jira-alfred -i issues.json --no-wait
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--org" => {
                i += 1;
                match args.get(i) {
                    Some(org) => parsed.org = Some(org.clone()),
                    None => bail!("Missing value for -o/--org flag"),
                }
            }
            "-i" | "--input" => {
                i += 1;
                match args.get(i) {
                    Some(path) => parsed.input = Some(path.clone()),
                    None => bail!("Missing value for -i/--input flag"),
                }
            }
            "--no-wait" => parsed.no_wait = true,
            "-h" | "--help" => parsed.help = true,
            other => bail!("Unknown argument: {other}\n\nRun `jira-alfred --help` for usage"),
        }
        i += 1;
    }

    Ok(parsed)
}

pub fn print_help() {
    println!("jira-alfred — format Jira issues as Alfred script filter items\n");
    println!("USAGE:");
    println!("  jira-alfred [OPTIONS] < issues.json");
    println!();
    println!("OPTIONS:");
    println!("  -o, --org <name>     Atlassian organization (overrides config)");
    println!("  -i, --input <file>   Read issues from a file instead of stdin");
    println!("      --no-wait        Exit without waiting for icon downloads");
    println!("  -h, --help           Show this help");
    println!();
    println!("CONFIG:");
    println!("  ~/.jira-alfred/config.toml  (org, cache_dir, default_icon, match_tags, rasterizer)");
}
