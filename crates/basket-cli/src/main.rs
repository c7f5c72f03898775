use anyhow::{Context, Result};
use basket_cli::{inspect, load_config, migrate, simulate};
use basket_core::PromotionMode;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("basket")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect, migrate and simulate stored shopping baskets")
        .arg(
            Arg::new("config")
                .long("config")
                .visible_alias("policy")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with [store] and [promotions] sections"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("inspect")
                .about("Decode a stored basket value and render it")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the stored value"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("migrate")
                .about("Rewrite a stored basket value in the current format")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding the stored value"),
                )
                .arg(
                    Arg::new("in-place")
                        .long("in-place")
                        .action(ArgAction::SetTrue)
                        .help("Write the migrated value back to the file"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Add products to an empty basket and render the result")
                .arg(
                    Arg::new("add")
                        .long("add")
                        .action(ArgAction::Append)
                        .help("Product id to add (repeatable)"),
                )
                .arg(
                    Arg::new("persisted")
                        .long("persisted")
                        .action(ArgAction::SetTrue)
                        .help("Store derived entries instead of projecting them"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

/// Filter used when `RUST_LOG` is unset; command status stays visible
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn,basket=info"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_value(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));
    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = load_config(config_path.map(PathBuf::as_path))?;
    tracing::debug!(config = ?config_path, key = %config.store.key, mode = ?config.store.mode, "configuration loaded");

    match matches.subcommand() {
        Some(("inspect", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing file argument")?;
            let report = inspect(&read_value(path)?, &config)?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match report.format {
                    Some(format) => println!("Format: {format}"),
                    None => println!("Format: unreadable (loads as empty)"),
                }
                print!("{}", report.text);
            }
        }
        Some(("migrate", args)) => {
            let path = args
                .get_one::<PathBuf>("file")
                .context("missing file argument")?;
            let outcome = migrate(&read_value(path)?, &config)?;

            match outcome.report.from {
                Some(from) if outcome.report.rewritten => {
                    tracing::info!(path = %path.display(), %from, "migrated to records");
                }
                Some(from) => tracing::info!(path = %path.display(), %from, "already current"),
                None => tracing::warn!(path = %path.display(), "value unreadable, left untouched"),
            }
            if args.get_flag("in-place") && outcome.report.rewritten {
                std::fs::write(path, &outcome.output)
                    .with_context(|| format!("writing {}", path.display()))?;
            } else {
                println!("{}", outcome.output);
            }
        }
        Some(("simulate", args)) => {
            if args.get_flag("persisted") {
                config.store.mode = PromotionMode::Persisted;
            }
            let adds: Vec<String> = args
                .get_many::<String>("add")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let report = simulate(&adds, &config)?;

            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.text);
                println!();
                println!("Stored: {}", report.stored.as_deref().unwrap_or("<none>"));
                println!("Writes: {}", report.writes);
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_default_directives_keep_status_visible() {
        assert_eq!(default_directives(false), "warn,basket=info");
        assert_eq!(default_directives(true), "debug");
        EnvFilter::try_new(default_directives(false)).unwrap();
    }

    #[test]
    fn test_simulate_collects_adds() {
        let matches = cli()
            .try_get_matches_from([
                "basket", "simulate", "--add", "apple", "--add", "lemon", "--persisted", "--policy",
                "rules.toml",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("rules.toml"))
        );
        let (_, args) = matches.subcommand().unwrap();
        let adds: Vec<_> = args.get_many::<String>("add").unwrap().collect();
        assert_eq!(adds, ["apple", "lemon"]);
        assert!(args.get_flag("persisted"));
    }
}
