//! Command tree for dvln
//!
//! The tree is rebuilt from the current settings whenever it is needed, so
//! every flag shows the currently resolved value as its default.

use clap::builder::BoolishValueParser;
use clap::{Arg, ArgAction, ColorChoice, Command, value_parser};

use dvln_core::settings::{Settings, Value};

/// Name of the tool, used as the root command and in usage hints
pub const TOOL_NAME: &str = "dvln";

/// A setting bound to a command line flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSpec {
    /// Long flag name, same as the setting name
    pub name: &'static str,
    pub short: char,
}

const fn flag(name: &'static str, short: char) -> FlagSpec {
    FlagSpec { name, short }
}

/// Flags available on the root and every subcommand
pub const PERSISTENT_FLAGS: &[FlagSpec] = &[
    flag("analysis", 'A'),
    flag("config", 'C'),
    flag("debug", 'D'),
    flag("fatalon", 'F'),
    flag("force", 'f'),
    flag("globs", 'G'),
    flag("help", 'h'),
    flag("interact", 'i'),
    flag("jobs", 'J'),
    flag("look", 'L'),
    flag("quiet", 'q'),
    flag("record", 'R'),
    flag("terse", 't'),
    flag("verbose", 'v'),
];

/// Flags only the root command accepts
pub const ROOT_FLAGS: &[FlagSpec] = &[flag("port", 'P'), flag("serve", 'S'), flag("version", 'V')];

/// A subcommand and the flags it adds
#[derive(Debug, Clone, Copy)]
pub struct SubcommandSpec {
    pub name: &'static str,
    pub about: &'static str,
    pub long_about: &'static str,
    pub flags: &'static [FlagSpec],
}

pub const SUBCOMMANDS: &[SubcommandSpec] = &[
    SubcommandSpec {
        name: "get",
        about: "get packages for a codebase [+ devline]",
        long_about: "Get packages for a codebase [+ devline], create/modify a workspace, eg:\n  \
                     % dvln get --codebase=prod_x --devline=proj_x\n  \
                     % dvln get -c prod_x -d proj_x\n  \
                     % dvln g -d proj_x    (if cfgfile:codebase or env:DVLN_CODEBASE set)",
        flags: &[flag("codebase", 'c'), flag("devline", 'd'), flag("pkg", 'p'), flag("wkspcdir", 'w')],
    },
    SubcommandSpec {
        name: "pull",
        about: "pull/add/remove packages using current or given devline",
        long_about: "Pull/add/remove packages in a workspace using the current or a specified devline, eg:\n  \
                     % dvln pull --devline=proj_x\n  \
                     % dvln pull -d proj_x",
        flags: &[flag("devline", 'd'), flag("pkg", 'p')],
    },
    SubcommandSpec {
        name: "update",
        about: "update/add/remove packages (dynamically or based on a devline)",
        long_about: "Update/add/remove packages in a workspace dynamically or based on a devline, eg:\n  \
                     % dvln update --devline=proj_x\n  \
                     % dvln update -d proj_x\n  \
                     % dvln u    (will update using versions from the workspace's current base devline)",
        flags: &[flag("devline", 'd'), flag("pkg", 'p')],
    },
    SubcommandSpec {
        name: "version",
        about: "get the current version of the 'dvln' tool",
        long_about: "Get the current release version number of the 'dvln' tool:\n  \
                     % dvln version\n  \
                     Note: version can also be dumped directly from the dvln tool:\n  \
                     % dvln --version\n  \
                     % dvln -V",
        flags: &[],
    },
];

/// Name of the help subcommand
pub const HELP_COMMAND: &str = "help";

const ROOT_ABOUT: &str = "dvln: Multi-package development line and workspace management tool";

const ROOT_TEMPLATE: &str = "\
{about-with-newline}
{usage-heading} {usage}

Available Commands:
{subcommands}

Flags:
{options}

Use \"dvln help [command]\" for more information about a command.
";

/// Flags a subcommand adds on top of the persistent ones
pub fn subcommand_flags(name: &str) -> &'static [FlagSpec] {
    SUBCOMMANDS
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.flags)
        .unwrap_or(&[])
}

/// Look up a flag by long name anywhere in the tree
pub fn find_flag(name: &str) -> Option<FlagSpec> {
    PERSISTENT_FLAGS
        .iter()
        .chain(ROOT_FLAGS)
        .chain(SUBCOMMANDS.iter().flat_map(|s| s.flags.iter()))
        .find(|f| f.name == name)
        .copied()
}

/// Look up a flag by short name anywhere in the tree
pub fn find_short(short: char) -> Option<FlagSpec> {
    PERSISTENT_FLAGS
        .iter()
        .chain(ROOT_FLAGS)
        .chain(SUBCOMMANDS.iter().flat_map(|s| s.flags.iter()))
        .find(|f| f.short == short)
        .copied()
}

/// Whether `token` names a subcommand, `help` included
///
/// Prefixes count, as the parser infers subcommands from them.
pub fn is_command(token: &str) -> bool {
    !token.is_empty()
        && SUBCOMMANDS
            .iter()
            .map(|s| s.name)
            .chain([HELP_COMMAND])
            .any(|name| name.starts_with(token))
}

/// Whether a flag expects a value (everything but booleans)
pub fn takes_value(settings: &Settings, flag: &FlagSpec) -> bool {
    !matches!(settings.get(flag.name), Value::Bool(_))
}

/// Build the full command tree with defaults taken from `settings`
///
/// This never parses anything and never touches the explicit layer.
pub fn build_command(settings: &Settings) -> Command {
    let mut root = Command::new(TOOL_NAME)
        .bin_name(TOOL_NAME)
        .about(ROOT_ABOUT)
        .help_template(ROOT_TEMPLATE)
        .color(ColorChoice::Never)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .infer_subcommands(true)
        .args_override_self(true);

    // local options are listed ahead of the persistent ones
    for (order, spec) in PERSISTENT_FLAGS.iter().enumerate() {
        root = root.arg(bind_flag(settings, spec, PERSISTENT_ORDER + order).global(true));
    }
    for (order, spec) in ROOT_FLAGS.iter().enumerate() {
        root = root.arg(bind_flag(settings, spec, order));
    }

    for sub in SUBCOMMANDS {
        let mut command = Command::new(sub.name)
            .about(sub.about)
            .long_about(sub.long_about)
            .args_override_self(true);
        for (order, spec) in sub.flags.iter().enumerate() {
            command = command.arg(bind_flag(settings, spec, order));
        }
        root = root.subcommand(command);
    }

    root.subcommand(
        Command::new(HELP_COMMAND)
            .about("Help about any command")
            .args_override_self(true)
            .arg(
                Arg::new("command")
                    .num_args(0..)
                    .action(ArgAction::Append)
                    .help("command to show help for"),
            ),
    )
}

/// Help position of the first persistent flag
const PERSISTENT_ORDER: usize = 100;

/// Bind one setting as a flag, typed after its registered default
fn bind_flag(settings: &Settings, spec: &FlagSpec, order: usize) -> Arg {
    let description = settings
        .describe(spec.name)
        .map(|(d, _, _)| d.to_string())
        .unwrap_or_default();

    let arg = Arg::new(spec.name)
        .long(spec.name)
        .short(spec.short)
        .help(description)
        .display_order(order)
        .hide_default_value(spec.name == "help")
        .action(ArgAction::Set);

    match settings.get(spec.name) {
        Value::Bool(current) => arg
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .default_value(current.to_string())
            .value_parser(BoolishValueParser::new()),
        Value::Int(current) => arg
            .value_parser(value_parser!(i64))
            .default_value(current.to_string()),
        Value::Str(current) if current.is_empty() => arg,
        Value::Str(current) => arg.default_value(current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dvln_core::settings::dvln_registry;
    use std::collections::HashMap;

    fn settings() -> Settings {
        Settings::new(dvln_registry(), HashMap::new())
    }

    #[test]
    fn command_tree_is_valid() {
        build_command(&settings()).debug_assert();
    }

    #[test]
    fn every_flag_is_a_registered_setting() {
        let settings = settings();
        for spec in PERSISTENT_FLAGS
            .iter()
            .chain(ROOT_FLAGS)
            .chain(SUBCOMMANDS.iter().flat_map(|s| s.flags.iter()))
        {
            assert!(settings.registry().contains(spec.name), "{} is not registered", spec.name);
        }
    }

    #[test]
    fn defaults_follow_resolved_values() {
        let mut settings = settings();
        let mut command = build_command(&settings);
        let help = command.render_help().to_string();
        assert!(help.contains("[default: text]"), "help was:\n{}", help);

        settings.set("look", "json");
        let mut command = build_command(&settings);
        let help = command.render_help().to_string();
        assert!(help.contains("[default: json]"));
        assert!(help.contains("Available Commands:"));
        assert!(help.contains(ROOT_ABOUT));
    }

    #[test]
    fn subcommand_help_lists_local_flags_first() {
        let mut settings = settings();
        settings.set("help", true);
        let mut command = build_command(&settings);
        command.build();
        let help = command
            .find_subcommand_mut("get")
            .map(|get| get.render_help().to_string())
            .unwrap();

        let codebase = help.find("--codebase").unwrap();
        let analysis = help.find("--analysis").unwrap();
        assert!(codebase < analysis, "help was:\n{}", help);
        assert!(!help.contains("[default: true]"), "help was:\n{}", help);
    }

    #[test]
    fn bool_flags_accept_optional_values() {
        let matches = build_command(&settings())
            .try_get_matches_from(["dvln", "-Dv", "--terse=false", "get", "-c", "prod_x"])
            .unwrap();
        assert_eq!(matches.get_one::<bool>("debug"), Some(&true));
        assert_eq!(matches.get_one::<bool>("verbose"), Some(&true));
        assert_eq!(matches.get_one::<bool>("terse"), Some(&false));

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "get");
        assert_eq!(sub.get_one::<String>("codebase").map(String::as_str), Some("prod_x"));
    }

    #[test]
    fn subcommands_match_by_prefix() {
        let matches = build_command(&settings())
            .try_get_matches_from(["dvln", "up", "-d", "proj_x"])
            .unwrap();
        assert_eq!(matches.subcommand_name(), Some("update"));
    }

    #[test]
    fn lookup_helpers() {
        assert_eq!(find_flag("look").map(|f| f.short), Some('L'));
        assert_eq!(find_short('c').map(|f| f.name), Some("codebase"));
        assert!(find_short('Z').is_none());
        assert_eq!(subcommand_flags("pull").len(), 2);
        assert!(subcommand_flags(HELP_COMMAND).is_empty());
        assert!(takes_value(&settings(), &flag("look", 'L')));
        assert!(!takes_value(&settings(), &flag("debug", 'D')));
        assert!(is_command("get"));
        assert!(is_command("up"));
        assert!(is_command(HELP_COMMAND));
        assert!(!is_command("x"));
        assert!(!is_command(""));
    }
}
