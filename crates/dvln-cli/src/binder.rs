//! Tolerant first pass over the command line
//!
//! Flags given on the command line are copied into the explicit layer of
//! [`Settings`] so the output controller and config scan see them before
//! the real dispatch parse. Flag problems are skipped here; the dispatch
//! parse reports them later. Problems that are not about a flag, such as an
//! unknown subcommand, are reported right away.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::ArgMatches;

use dvln_core::settings::{Settings, ValueKind};
use dvln_core::{Error, Result};

use crate::cli::{self, FlagSpec, PERSISTENT_FLAGS, ROOT_FLAGS, TOOL_NAME};

/// What to do after a failed parse attempt
#[derive(Debug)]
enum Recovery {
    /// Not a flag problem, report it
    Fatal,
    /// Retry with the offending tokens removed
    Retry(Vec<String>),
    /// Offending token could not be found
    GiveUp,
}

/// Record every flag given on the command line and return the name of the
/// command that would run (`dvln` when no subcommand matched)
///
/// `args` includes the executable name as its first element.
pub fn push_cli_opts(settings: &mut Settings, args: &[String]) -> Result<String> {
    let mut tokens = args.to_vec();

    for _ in 0..=args.len() {
        let command = cli::build_command(settings);
        match command.try_get_matches_from(&tokens) {
            Ok(matches) => return Ok(record_explicit(settings, &matches)),
            Err(err) => match classify(settings, &err, &tokens) {
                Recovery::Fatal => return Err(command_line_error(&err)),
                Recovery::Retry(next) => {
                    tracing::debug!(error = ?err.kind(), "Skipping flag problem in first pass");
                    tokens = next;
                }
                Recovery::GiveUp => break,
            },
        }
    }

    tracing::debug!("Falling back to a partial first pass");
    match cli::build_command(settings).ignore_errors(true).try_get_matches_from(&tokens) {
        Ok(matches) => Ok(record_explicit(settings, &matches)),
        Err(err) => {
            tracing::debug!(error = ?err.kind(), "First pass found nothing usable");
            Ok(TOOL_NAME.to_string())
        }
    }
}

/// Turn a parser error into a command line error with clap's message
pub fn command_line_error(err: &clap::Error) -> Error {
    let rendered = err.render().to_string();
    let message = rendered
        .trim()
        .strip_prefix("error:")
        .unwrap_or(rendered.trim())
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .trim();
    Error::command_line(format!("Error: {}", message))
}

/// Copy command line values into the explicit layer
fn record_explicit(settings: &mut Settings, matches: &ArgMatches) -> String {
    let root: Vec<FlagSpec> = PERSISTENT_FLAGS.iter().chain(ROOT_FLAGS).copied().collect();
    record_level(settings, matches, &root);

    match matches.subcommand() {
        Some((name, sub)) => {
            let flags: Vec<FlagSpec> = PERSISTENT_FLAGS
                .iter()
                .chain(cli::subcommand_flags(name))
                .copied()
                .collect();
            record_level(settings, sub, &flags);
            name.to_string()
        }
        None => TOOL_NAME.to_string(),
    }
}

fn record_level(settings: &mut Settings, matches: &ArgMatches, flags: &[FlagSpec]) {
    for spec in flags {
        if matches.value_source(spec.name) != Some(ValueSource::CommandLine) {
            continue;
        }
        match settings.get(spec.name).kind() {
            ValueKind::Bool => {
                if let Ok(Some(value)) = matches.try_get_one::<bool>(spec.name) {
                    settings.set(spec.name, *value);
                }
            }
            ValueKind::Int => {
                if let Ok(Some(value)) = matches.try_get_one::<i64>(spec.name) {
                    settings.set(spec.name, *value);
                }
            }
            ValueKind::Str => {
                if let Ok(Some(value)) = matches.try_get_one::<String>(spec.name) {
                    settings.set(spec.name, value.as_str());
                }
            }
        }
    }
}

fn invalid_arg(err: &clap::Error) -> Option<&str> {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.as_str()),
        _ => None,
    }
}

fn classify(settings: &Settings, err: &clap::Error, tokens: &[String]) -> Recovery {
    let arg = invalid_arg(err);
    let next = match err.kind() {
        ErrorKind::InvalidSubcommand => return Recovery::Fatal,
        ErrorKind::UnknownArgument => match arg {
            Some(arg) if !arg.starts_with('-') => return Recovery::Fatal,
            Some(arg) => drop_unknown(settings, tokens, arg),
            None => None,
        },
        ErrorKind::InvalidValue
        | ErrorKind::ValueValidation
        | ErrorKind::NoEquals
        | ErrorKind::TooManyValues
        | ErrorKind::TooFewValues
        | ErrorKind::WrongNumberOfValues => arg
            .and_then(long_name)
            .and_then(cli::find_flag)
            .and_then(|spec| drop_flag(settings, tokens, &spec)),
        _ => None,
    };

    match next {
        Some(next) if next != tokens => Recovery::Retry(next),
        _ => Recovery::GiveUp,
    }
}

/// Flag name from a rendered argument such as `--port <port>`
fn long_name(arg: &str) -> Option<&str> {
    let name = arg.strip_prefix("--")?;
    let end = name.find([' ', '[', '=', '<']).unwrap_or(name.len());
    Some(&name[..end]).filter(|n| !n.is_empty())
}

/// Remove a flag the parser does not know at this level
///
/// Flags known elsewhere in the tree also lose their separate value token.
/// A long flag unknown everywhere takes the next token with it unless that
/// token names a command.
fn drop_unknown(settings: &Settings, tokens: &[String], arg: &str) -> Option<Vec<String>> {
    if let Some(name) = arg.strip_prefix("--") {
        return Some(match cli::find_flag(name) {
            Some(spec) => {
                let takes_value = cli::takes_value(settings, &spec);
                drop_long(tokens, name, |_| takes_value)
            }
            None => drop_long(tokens, name, |next| !cli::is_command(next)),
        });
    }

    let short = arg.strip_prefix('-')?.chars().next()?;
    let known = cli::find_short(short).is_some_and(|spec| cli::takes_value(settings, &spec));
    drop_short(settings, tokens, short, known)
}

/// Remove every use of a known flag, long or short, with its value
fn drop_flag(settings: &Settings, tokens: &[String], spec: &FlagSpec) -> Option<Vec<String>> {
    let takes_value = cli::takes_value(settings, spec);
    let dropped = drop_long(tokens, spec.name, |_| takes_value);
    if dropped != tokens {
        return Some(dropped);
    }
    drop_short(settings, tokens, spec.short, takes_value)
}

/// Remove every `--name` and `--name=value`
///
/// `takes_value` decides whether a separate token after `--name` is its value.
fn drop_long(tokens: &[String], name: &str, takes_value: impl Fn(&str) -> bool) -> Vec<String> {
    let flag = format!("--{}", name);
    let with_value = format!("--{}=", name);
    let mut kept = Vec::with_capacity(tokens.len());
    let mut iter = tokens.iter().enumerate().peekable();

    while let Some((index, token)) = iter.next() {
        if index == 0 || past_terminator(&kept) {
            kept.push(token.clone());
            continue;
        }
        if token.starts_with(&with_value) {
            continue;
        }
        if *token == flag {
            if iter
                .peek()
                .is_some_and(|(_, next)| !next.starts_with('-') && takes_value(next))
            {
                iter.next();
            }
            continue;
        }
        kept.push(token.clone());
    }
    kept
}

/// Remove a short flag from the first cluster that uses it
///
/// Scanning a cluster stops at the first flag that takes a value, since
/// the rest of the cluster is that value.
fn drop_short(settings: &Settings, tokens: &[String], short: char, takes_value: bool) -> Option<Vec<String>> {
    for (index, token) in tokens.iter().enumerate().skip(1) {
        if token == "--" {
            return None;
        }
        let Some(cluster) = token.strip_prefix('-').filter(|c| !c.starts_with('-')) else {
            continue;
        };
        let Some(position) = cluster_position(settings, cluster, short) else {
            continue;
        };

        let mut next = tokens.to_vec();
        let before = &cluster[..position];
        let after = &cluster[position + short.len_utf8()..];
        let consumes_rest = takes_value || after.starts_with('=');
        let remaining = if consumes_rest {
            before.to_string()
        } else {
            format!("{}{}", before, after)
        };

        let drop_value = takes_value
            && after.is_empty()
            && tokens.get(index + 1).is_some_and(|t| !t.starts_with('-'));
        if drop_value {
            next.remove(index + 1);
        }
        if remaining.is_empty() {
            next.remove(index);
        } else {
            next[index] = format!("-{}", remaining);
        }
        return Some(next);
    }
    None
}

fn cluster_position(settings: &Settings, cluster: &str, short: char) -> Option<usize> {
    for (position, c) in cluster.char_indices() {
        if c == short {
            return Some(position);
        }
        if c == '=' {
            return None;
        }
        if cli::find_short(c).is_some_and(|spec| cli::takes_value(settings, &spec)) {
            return None;
        }
    }
    None
}

fn past_terminator(kept: &[String]) -> bool {
    kept.iter().skip(1).any(|t| t == "--")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvln_core::settings::dvln_registry;
    use dvln_core::codes;
    use dvln_core::Layer;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn settings() -> Settings {
        Settings::new(dvln_registry(), HashMap::new())
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn only_command_line_values_become_explicit() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "--debug", "get", "-c", "prod_x"])).unwrap();
        assert_eq!(name, "get");
        assert!(s.is_explicit("debug"));
        assert!(s.is_explicit("codebase"));
        assert!(!s.is_explicit("verbose"));
        assert!(!s.is_explicit("look"));
        assert_eq!(s.resolve("codebase").unwrap().layer, Layer::Cli);
        assert_eq!(s.get_string("codebase"), "prod_x");
    }

    #[test]
    fn persistent_flags_after_the_subcommand_are_recorded() {
        let mut s = settings();
        push_cli_opts(&mut s, &args(&["dvln", "pull", "-Dv", "--look=json"])).unwrap();
        assert!(s.get_bool("debug"));
        assert!(s.get_bool("verbose"));
        assert_eq!(s.get_string("look"), "json");
    }

    #[test]
    fn root_only_flags_are_typed() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "--port=4000", "-S"])).unwrap();
        assert_eq!(name, TOOL_NAME);
        assert_eq!(s.get_int("port"), 4000);
        assert!(s.get_bool("serve"));
    }

    #[test]
    fn unknown_long_flag_is_skipped() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "--baloney", "-D", "get"])).unwrap();
        assert_eq!(name, "get");
        assert!(s.get_bool("debug"));
    }

    #[test]
    fn unknown_long_flag_takes_its_value() {
        let mut s = settings();
        let tokens = args(&["dvln", "--baloney", "x", "-D", "get", "-c", "p"]);
        let name = push_cli_opts(&mut s, &tokens).unwrap();
        assert_eq!(name, "get");
        assert!(s.get_bool("debug"));
        assert_eq!(s.get_string("codebase"), "p");
    }

    #[test]
    fn unknown_long_flag_leaves_a_command_alone() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "--baloney", "pull", "-d", "proj_x"])).unwrap();
        assert_eq!(name, "pull");
        assert_eq!(s.get_string("devline"), "proj_x");
    }

    #[test]
    fn unknown_short_flag_is_removed_from_its_cluster() {
        let mut s = settings();
        push_cli_opts(&mut s, &args(&["dvln", "-DZv", "version"])).unwrap();
        assert!(s.get_bool("debug"));
        assert!(s.get_bool("verbose"));
    }

    #[test]
    fn bad_values_are_skipped() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "--port=abc", "--terse", "version"])).unwrap();
        assert_eq!(name, "version");
        assert!(!s.is_explicit("port"));
        assert!(s.get_bool("terse"));
    }

    #[test]
    fn subcommand_flag_at_root_loses_its_value() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "-c", "prod_x", "get"])).unwrap();
        assert_eq!(name, "get");
        assert!(!s.is_explicit("codebase"));
    }

    #[test]
    fn unknown_subcommand_is_fatal() {
        let mut s = settings();
        let err = push_cli_opts(&mut s, &args(&["dvln", "frobnicate"])).unwrap_err();
        assert_eq!(err.code(), codes::COMMAND_LINE);
        assert!(err.to_string().starts_with("Error: "), "message was {}", err);
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn stray_positional_is_fatal() {
        let mut s = settings();
        let err = push_cli_opts(&mut s, &args(&["dvln", "get", "extra"])).unwrap_err();
        assert_eq!(err.code(), codes::COMMAND_LINE);
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn help_topics_are_positional() {
        let mut s = settings();
        let name = push_cli_opts(&mut s, &args(&["dvln", "help", "get"])).unwrap();
        assert_eq!(name, "help");
    }

    #[test]
    fn long_names_from_rendered_args() {
        assert_eq!(long_name("--port <port>"), Some("port"));
        assert_eq!(long_name("--debug[=<debug>]"), Some("debug"));
        assert_eq!(long_name("--jobs"), Some("jobs"));
        assert_eq!(long_name("-J"), None);
        assert_eq!(long_name("--"), None);
    }

    #[test]
    fn dropping_stops_at_terminator() {
        let tokens = args(&["dvln", "--", "--baloney"]);
        assert_eq!(drop_long(&tokens, "baloney", |_| true), tokens);
        assert!(drop_short(&settings(), &args(&["dvln", "--", "-Z"]), 'Z', false).is_none());
    }

    #[test]
    fn short_value_is_not_a_cluster() {
        // the `j` in `-Ljson` is the look value, not a flag
        let s = settings();
        assert!(drop_short(&s, &args(&["dvln", "-Ljson"]), 'j', false).is_none());
        assert_eq!(
            drop_short(&s, &args(&["dvln", "-DJ", "4"]), 'J', true),
            Some(args(&["dvln", "-D"]))
        );
    }
}
