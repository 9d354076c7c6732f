//! The settings dvln knows about

use super::registry::{Registry, Scope, UserLevel};

/// Version of the JSON response format
pub const API_VERSION: &str = "0.1";

/// Default TCP port for serve mode
pub const DEFAULT_PORT: i64 = 3856;

/// Build the registry of every dvln setting with its default
pub fn dvln_registry() -> Registry {
    use Scope::*;
    use UserLevel::*;

    let mut r = Registry::new();

    // Default only, never overridden
    r.register("apiver", API_VERSION, "JSON API revision", Internal, ConstGlobal);
    r.register("toolver", env!("CARGO_PKG_VERSION"), "current version of the dvln tool", Internal, ConstGlobal);
    r.register("wkspcmetadir", ".dvln", "where dvln config info exists in a workspace", Internal, ConstGlobal);

    // Environment, config file and default
    r.register("logfilelevel", "info", "log file output level (used if logging on)", Expert, BasicGlobal);
    r.register("screenlevel", "info", "screen output level", Expert, BasicGlobal);
    r.register("jsonindentlevel", 2i64, "JSON output indent spaces per level", Expert, BasicGlobal);
    r.register("jsonprefix", "", "JSON output line prefix", Expert, BasicGlobal);
    r.register("jsonraw", false, "compact single line JSON output", Expert, BasicGlobal);
    r.register("texthumanize", false, "digit grouping in text output", Expert, BasicGlobal);
    r.register("textindentlevel", 2i64, "text output indent spaces per level", Expert, BasicGlobal);
    r.register("textprefix", "", "text output line prefix", Expert, BasicGlobal);

    // Bound to flags
    r.register("analysis", false, "memory and timing analytics", Expert, CliGlobal);
    r.register("codebase", "", "codebase name or URL", Novice, CliGlobal);
    r.register("config", "~/.dvlncfg", "file|path, path scans cfg.json|toml|yml", Expert, CliGlobal);
    r.register("debug", false, "control debug output", Standard, CliGlobal);
    r.register("devline", "", "development line name", Novice, CliGlobal);
    r.register("fatalon", 1i64, "# of VCS errs needed to cause exit", Expert, CliGlobal);
    r.register("force", false, "force bypass of protections", Expert, CliGlobal);
    r.register("globs", "", "show settings available, cfg|env", Expert, CliOnlyGlobal);
    r.register("help", false, "help for the command", Standard, CliOnlyGlobal);
    r.register("interact", false, "prompting control", Standard, CliGlobal);
    r.register("jobs", "all", "# of CPU's to use for jobs", Expert, CliGlobal);
    r.register("look", "text", "output look, text|json", Expert, CliGlobal);
    r.register("pkg", "", "package selector, comma separated", Novice, CliOnlyGlobal);
    r.register("port", DEFAULT_PORT, "port # for --serve mode", Expert, CliGlobal);
    r.register("quiet", false, "silent running", Standard, CliGlobal);
    r.register("record", "off", "log to file or 'tmp'", Novice, CliGlobal);
    r.register("serve", false, "activate REST serve mode", Expert, CliGlobal);
    r.register("terse", false, "output brevity", Standard, CliGlobal);
    r.register("verbose", false, "output verbosity, extends debug", Standard, CliGlobal);
    r.register("version", false, "show tool version details", Standard, CliOnlyGlobal);
    r.register("wkspcdir", ".", "workspace directory", Standard, CliOnlyGlobal);

    // Set by the config scan
    r.register("configdir", "", "directory the config file was found in", Internal, CliOnlyGlobal);

    r
}
