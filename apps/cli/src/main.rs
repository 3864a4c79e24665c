use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use sysevent_core::{
    CrossBoundaryRecord, ListenerRule, LoopbackConfig, LoopbackService, QueryArg, QueryExecutor,
    QueryRule, RuleType, SubscribeCallback, SubscriptionRegistry, SwappableLocator,
    SysEventService, convert_record, delete_record,
};
use tracing_subscriber::EnvFilter;

use crate::{
    format::format_boundary_record,
    input::read_events,
    listener::{ToolListener, ToolQueryCallback},
};

mod format;
mod input;
mod listener;

/// CLI wrapper for RuleType (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliRuleType {
    #[default]
    WholeWord,
    Prefix,
    Regular,
}

impl From<CliRuleType> for RuleType {
    fn from(cli: CliRuleType) -> Self {
        match cli {
            CliRuleType::WholeWord => RuleType::WholeWord,
            CliRuleType::Prefix => RuleType::Prefix,
            CliRuleType::Regular => RuleType::Regular,
        }
    }
}

#[derive(Parser)]
#[command(name = "sysevent")]
#[command(about = "Subscribe to, query and marshal system events")]
struct Cli {
    /// Events kept by the in-process service
    #[arg(long, global = true, default_value_t = LoopbackConfig::default().history_capacity)]
    history_capacity: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct InputArgs {
    /// File with one flat-JSON event per line (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Publish events and print those matching the subscription rules
    Listen {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        domain: Option<String>,

        /// Event name; empty matches every event of the domain
        #[arg(short, long, default_value = "")]
        name: String,

        /// Subscribe by tag instead of domain and name
        #[arg(short, long)]
        tag: Option<String>,

        #[arg(short, long, default_value = "whole-word")]
        rule_type: CliRuleType,

        /// JSON array of listener rules, overrides domain/name/tag
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Also receive events tagged `debug`
        #[arg(long)]
        debug: bool,
    },

    /// Publish events, then run one historical query over them
    Query {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        domain: Option<String>,

        /// Comma separated event names
        #[arg(short, long, value_delimiter = ',')]
        names: Vec<String>,

        #[arg(short, long, default_value = "whole-word")]
        rule_type: CliRuleType,

        #[arg(long, default_value_t = -1)]
        begin: i64,

        #[arg(long, default_value_t = -1)]
        end: i64,

        #[arg(long, default_value_t = -1)]
        max: i32,
    },

    /// Convert each event into a cross-boundary record
    Marshal {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn loopback(history_capacity: usize) -> (Arc<LoopbackService>, Arc<SwappableLocator>) {
    let service = Arc::new(LoopbackService::new(LoopbackConfig {
        history_capacity,
        ..LoopbackConfig::default()
    }));
    let handle: Arc<dyn SysEventService> = service.clone();
    (service, Arc::new(SwappableLocator::new(Some(handle))))
}

fn listener_rules(
    domain: Option<String>,
    name: String,
    tag: Option<String>,
    rule_type: RuleType,
    rules_file: Option<PathBuf>,
) -> Result<Vec<ListenerRule>> {
    if let Some(path) = rules_file {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(serde_json::from_str(&content)?);
    }
    if let Some(tag) = tag {
        return Ok(vec![ListenerRule::with_tag(&tag, rule_type)]);
    }
    let domain = domain.context("either --domain, --tag or --rules is required")?;
    Ok(vec![ListenerRule::new(&domain, &name, rule_type)])
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (service, locator) = loopback(cli.history_capacity);

    match cli.command {
        Command::Listen {
            input,
            domain,
            name,
            tag,
            rule_type,
            rules,
            debug,
        } => {
            let rules = listener_rules(domain, name, tag, rule_type.into(), rules)?;
            let registry = SubscriptionRegistry::new(locator);
            let tool = Arc::new(ToolListener::new());
            let listener: Arc<dyn SubscribeCallback> = tool.clone();

            let result = registry.add_event_listener(Arc::clone(&listener), &rules, 0)?;
            anyhow::ensure!(result == 0, "subscription rejected with code {result}");
            tracing::info!("subscribed with {} rules", rules.len());
            if debug && !registry.set_debug_mode(&listener, true, 0) {
                eprintln!("{} failed to enable debug mode", style("Warning:").yellow().bold());
            }

            let events = read_events(input.input.as_deref())?;
            let published = events.len();
            for record in events {
                service.publish(record);
            }
            registry.remove_listener(&listener, 0);

            println!(
                "\n{} {} published, {} matched",
                style("Done:").dim(),
                style(published).cyan().bold(),
                style(tool.received()).cyan().bold()
            );
        }
        Command::Query {
            input,
            domain,
            names,
            rule_type,
            begin,
            end,
            max,
        } => {
            for record in read_events(input.input.as_deref())? {
                service.publish(record);
            }

            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let rules = match domain {
                Some(domain) => vec![QueryRule::new(&domain, &names, rule_type.into())],
                None => Vec::new(),
            };
            let arg = QueryArg {
                begin_time: begin,
                end_time: end,
                max_events: max,
            };
            let executor = QueryExecutor::new(locator);
            if !executor.query(&arg, &rules, Arc::new(ToolQueryCallback))? {
                anyhow::bail!("query was rejected by the service");
            }
        }
        Command::Marshal { input } => {
            let mut failures = 0usize;
            for record in read_events(input.input.as_deref())? {
                let mut boundary = CrossBoundaryRecord::zeroed();
                match convert_record(&record, &mut boundary) {
                    Ok(()) => println!(
                        "{} {}",
                        style("✓").green().bold(),
                        format_boundary_record(&boundary)
                    ),
                    Err(e) => {
                        failures += 1;
                        println!(
                            "{} {}/{}: {} (code {})",
                            style("✗").red().bold(),
                            record.domain(),
                            record.event_name(),
                            e,
                            e.code()
                        );
                    }
                }
                delete_record(&mut boundary);
            }
            if failures > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
