//! Clap adapter for confapp.
//!
//! This module is the optional integration layer between the
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! The global flags come from the [`Cli`] derive. The `config` subcommand
//! group is built at runtime from a [`Registry`], because `config set` has one
//! `--<field.name>` flag per visible field and the field set is only known
//! once every feature area has registered.
//!
//! The only bridge to the core is [`action_from_matches()`], which converts
//! parsed matches into a [`ConfigAction`]. From there, all logic flows through
//! the clap-free [`ConfigContext::handle()`](crate::ConfigContext::handle) API.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, Parser};

use crate::field::Field;
use crate::registry::Registry;
use crate::types::{ConfigAction, Value};

const CONFIG_EXAMPLES: &str = "\
Examples:
  confapp config list
  confapp config describe log
  confapp config set --log.level debug";

const SET_EXAMPLES: &str = "\
Examples:
  confapp config set --log.level info
  confapp config set --log.level debug --log.output /var/log/app.log
  confapp config set --update.auto true --update.period 1h
  confapp config set --proxy.http http://proxy:8080";

/// Global flags, available on every subcommand.
#[derive(Debug, Parser)]
#[command(name = "confapp", version, about = "Typed, layered application configuration")]
pub struct Cli {
    /// Config file path (yaml, yml, json, toml, hcl or env)
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Display more verbose output in console output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// The full command tree: global flags plus the `config` group.
pub fn command(registry: &Registry) -> Command {
    Cli::command()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(config_command(registry))
}

/// `config list|describe|set`.
pub fn config_command(registry: &Registry) -> Command {
    Command::new("config")
        .about("Configuration management commands")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .after_help(CONFIG_EXAMPLES)
        .subcommand(selection_command("list", "List configuration values"))
        .subcommand(selection_command(
            "describe",
            "Describe configuration parameters",
        ))
        .subcommand(set_command(registry))
}

fn selection_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("prefix")
                .num_args(0..)
                .value_name("PREFIX")
                .help("Only show fields whose name starts with one of these"),
        )
        .arg(
            Arg::new("hidden")
                .long("hidden")
                .action(ArgAction::SetTrue)
                .help("Show hidden fields"),
        )
}

/// `config set` with one flag per non-hidden field, in registry order.
pub fn set_command(registry: &Registry) -> Command {
    registry.settable().fold(
        Command::new("set")
            .about("Set configuration values")
            .long_about(
                "Set configuration values.\n\n\
                 For more information about the configuration values, use the \"describe\" command.",
            )
            .after_help(SET_EXAMPLES),
        |cmd, field| cmd.arg(field_arg(field)),
    )
}

/// A `--<name> <VALUE>` flag. Fields with valid values get clap possible
/// values; the rest are checked against their declared type at parse time.
fn field_arg(field: &Field) -> Arg {
    let mut arg = Arg::new(field.name.clone())
        .long(field.name.clone())
        .value_name(field.field_type.as_str().to_uppercase())
        .help(field.description.clone())
        .action(ArgAction::Set);

    if let Some(short) = field.shorthand {
        arg = arg.short(short);
    }

    if field.valid_values.is_empty() {
        let ty = field.field_type;
        arg.value_parser(move |raw: &str| Value::parse(ty, raw).map(|_| raw.to_string()))
    } else {
        let allowed: Vec<String> = field.valid_values.iter().map(Value::to_string).collect();
        arg.value_parser(PossibleValuesParser::new(allowed))
    }
}

/// Convert parsed matches into a framework-agnostic `ConfigAction`.
///
/// Returns `None` when the matches are not for a `config` subcommand.
/// `set` values come out in registry order, whatever order they were given.
pub fn action_from_matches(registry: &Registry, matches: &ArgMatches) -> Option<ConfigAction> {
    let (name, config) = matches.subcommand()?;
    if name != "config" {
        return None;
    }

    match config.subcommand()? {
        ("list", m) => Some(ConfigAction::List {
            prefixes: prefixes(m),
            hidden: m.get_flag("hidden"),
        }),
        ("describe", m) => Some(ConfigAction::Describe {
            prefixes: prefixes(m),
            hidden: m.get_flag("hidden"),
        }),
        ("set", m) => Some(ConfigAction::Set {
            values: registry
                .settable()
                .filter_map(|f| {
                    m.get_one::<String>(&f.name)
                        .map(|v| (f.name.clone(), v.clone()))
                })
                .collect(),
        }),
        _ => None,
    }
}

fn prefixes(m: &ArgMatches) -> Vec<String> {
    m.get_many::<String>("prefix")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
