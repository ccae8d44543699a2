mod debug_report;

use speech_rules::{
    Dialect, Evaluator, MATHML, Options, PreconditionReport, QueryOutcome, RuleStore, parse_action_with, rules,
};
use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

const DEFAULT_DOMAIN: &str = "default.default";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    init_logging();

    let ok = match &config.command {
        Command::Parse(text) => {
            debug_report::print_parse(text, &parse_action_with(text, config.options.dialect), config.color)
        }
        Command::Rules => {
            let store = match build_store(&config) {
                Ok(store) => store,
                Err(err) => fail(&err),
            };
            debug_report::print_rules(&store, config.color);
            true
        }
        Command::Check => {
            let store = match build_store(&config) {
                Ok(store) => store,
                Err(err) => fail(&err),
            };
            debug_report::print_check(&store, config.color)
        }
        Command::Lookup(tag) => {
            let store = match build_store(&config) {
                Ok(store) => store,
                Err(err) => fail(&err),
            };
            let (domain, style) = config.domain.split_once('.').unwrap_or((config.domain.as_str(), "default"));
            let eval = TagEvaluator { holding: &config.holding };
            let found = store.lookup_rule_verbose(tag, domain, style, &eval);
            let reports = match &found {
                Ok(Some(_)) => Vec::new(),
                _ => near_misses(&store, tag, &eval),
            };
            debug_report::print_lookup(tag, &config.domain, &found, &reports, config.color)
        }
    };

    if !ok {
        std::process::exit(1);
    }
}

/// Preconditions whose query resolved but that still did not match.
fn near_misses(store: &RuleStore, tag: &String, eval: &TagEvaluator<'_>) -> Vec<PreconditionReport> {
    let keys: BTreeSet<&str> = store.entries().iter().map(|entry| entry.key.as_str()).collect();
    keys.into_iter()
        .flat_map(|key| store.debug_precondition(key, tag, eval))
        .filter(|report| report.query != QueryOutcome::NoNode)
        .collect()
}

fn fail(err: &str) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn build_store(config: &CliConfig) -> Result<RuleStore, String> {
    let mut store = RuleStore::with_options(config.options.clone());
    if !config.no_builtin {
        rules::mathml::define_into(&mut store);
    }
    for path in &config.tables {
        let json =
            std::fs::read_to_string(path).map_err(|err| format!("error: failed to read tables '{path}': {err}"))?;
        store.load_tables(MATHML, &json).map_err(|err| format!("error: {path}: {err}"))?;
    }
    Ok(store)
}

/// Treats a node as its element name: `self::mathml:<tag>` resolves to the
/// node when the tag matches, and a constraint holds when it was passed with
/// `--hold`.
struct TagEvaluator<'a> {
    holding: &'a [String],
}

impl Evaluator<String> for TagEvaluator<'_> {
    fn apply_query(&self, node: &String, query: &str) -> Option<String> {
        let tag = query.strip_prefix("self::")?;
        let tag = tag.strip_prefix("mathml:").unwrap_or(tag);
        (tag == "*" || tag == node.as_str()).then(|| node.clone())
    }

    fn apply_constraint(&self, _node: &String, constraint: &str) -> bool {
        self.holding.iter().any(|c| c == constraint)
    }
}

enum Command {
    Parse(String),
    Rules,
    Check,
    Lookup(String),
}

struct CliConfig {
    command: Command,
    options: Options,
    tables: Vec<String>,
    no_builtin: bool,
    domain: String,
    holding: Vec<String>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut command: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut options = Options::default();
    let mut tables = Vec::new();
    let mut no_builtin = false;
    let mut domain = DEFAULT_DOMAIN.to_string();
    let mut holding = Vec::new();
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("speech-rules {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--literal" => options.dialect = Dialect::Literal,
            "--no-builtin" => no_builtin = true,
            "--tables" => {
                tables.push(args.next().ok_or_else(|| "error: --tables expects a file".to_string())?);
            }
            "--domain" | "-d" => {
                domain = args.next().ok_or_else(|| "error: --domain expects a value".to_string())?;
            }
            "--hold" => {
                holding.push(args.next().ok_or_else(|| "error: --hold expects a constraint".to_string())?);
            }
            "--" => {
                positional.extend(args.by_ref());
                break;
            }
            _ if arg.starts_with("--tables=") => tables.push(arg.trim_start_matches("--tables=").to_string()),
            _ if arg.starts_with("--domain=") => domain = arg.trim_start_matches("--domain=").to_string(),
            _ if arg.starts_with("--hold=") => holding.push(arg.trim_start_matches("--hold=").to_string()),
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ if command.is_none() => command = Some(arg),
            _ => positional.push(arg),
        }
    }

    if command.is_none() && !positional.is_empty() {
        command = Some(positional.remove(0));
    }

    let command = match command.as_deref() {
        Some("parse") => {
            let text = if positional.is_empty() { read_stdin_input()? } else { positional.join(" ") };
            if text.trim().is_empty() {
                return Err(format!("error: no rule text provided\n\n{}", help_text()));
            }
            Command::Parse(text)
        }
        Some("rules") => Command::Rules,
        Some("check") => Command::Check,
        Some("lookup") => match positional.as_slice() {
            [tag] => Command::Lookup(tag.clone()),
            _ => return Err("error: lookup expects exactly one element name".to_string()),
        },
        Some(other) => return Err(format!("error: unknown command '{other}'\n\n{}", help_text())),
        None => return Err(format!("error: no command given\n\n{}", help_text())),
    };

    Ok(CliConfig { command, options, tables, no_builtin, domain, holding, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "speech-rules {version}

Speech rule store developer CLI.

Usage:
  speech-rules [OPTIONS] parse [--] <rule text...>
  speech-rules [OPTIONS] rules
  speech-rules [OPTIONS] check
  speech-rules [OPTIONS] lookup <element>

Commands:
  parse                      Parse a rule string (or stdin) and print its
                             components and canonical form.
  rules                      Print every mapping of every rule.
  check                      Report skipped definitions and rules without a
                             default.default mapping.
  lookup                     Select the rule for an element name.

Options:
  --tables <file>            Load extra JSON rule tables (repeatable).
  --no-builtin               Start from an empty store instead of the
                             built-in MathML rules.
  --literal                  Parse string literals in the literal dialect.
  -d, --domain <d.s>         Domain and style for lookup. Default: {default_domain}
  --hold <constraint>        Treat a constraint as true during lookup
                             (repeatable).
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Logging:
  RUST_LOG=speech_rules=debug shows every definition and selection.

Exit codes:
  0  Success.
  1  Rule error, failed check, or no rule found.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_domain = DEFAULT_DOMAIN
    )
}
