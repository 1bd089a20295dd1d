//! void-plugins-list - show what the plugin registry can construct
//!
//! ```text
//! void-plugins-list [--json] [--all] [--debug-level <n>] [--load <library>]... [<id>...]
//! ```
//!
//! Without identifiers every registered factory is listed. Identifiers are
//! resolved one by one, loading their libraries as needed. The exit code is 1
//! when a requested library or identifier cannot be resolved.

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use void_plugins::logging::set_debug_level;
use void_plugins::{FactoryInfo, Registry};

const USAGE: &str =
    "Usage: void-plugins-list [--json] [--all] [--debug-level <n>] [--load <library>]... [<id>...]";

/// Command line options
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    json: bool,
    all: bool,
    help: bool,
    debug_level: Option<i32>,
    libraries: Vec<String>,
    ids: Vec<String>,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--json" => options.json = true,
                "--all" => options.all = true,
                "-h" | "--help" => options.help = true,
                "--load" => {
                    let library = args.next().ok_or("--load needs a library name")?;
                    options.libraries.push(library);
                }
                "--debug-level" => {
                    let level = args.next().ok_or("--debug-level needs a number")?;
                    let level = level
                        .parse()
                        .map_err(|_| format!("invalid debug level '{}'", level))?;
                    options.debug_level = Some(level);
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
                id => options.ids.push(id.to_string()),
            }
        }

        Ok(options)
    }
}

/// A failed request, reported after the listing
#[derive(Debug, Serialize)]
struct Failure {
    target: String,
    error: String,
}

#[derive(Debug, Default, Serialize)]
struct Report {
    search_path: Vec<PathBuf>,
    factories: Vec<FactoryInfo>,
    failures: Vec<Failure>,
}

fn collect(registry: &Registry, options: &Options) -> Report {
    registry.initialize_if_needed();
    let mut report = Report {
        search_path: registry.search_path(),
        ..Report::default()
    };

    let mut libraries = options.libraries.clone();
    if options.all {
        libraries.extend(registry.manifest_libraries());
    }

    for library in &libraries {
        match registry.load_library(library) {
            Ok(count) => log::debug!("Loaded '{}' ({} registrations)", library, count),
            Err(e) => report.failures.push(Failure {
                target: library.clone(),
                error: e.to_string(),
            }),
        }
    }

    if options.ids.is_empty() {
        report.factories = registry.factories().iter().map(|r| r.info().clone()).collect();
    } else {
        for id in &options.ids {
            match registry.get_info(id) {
                Ok(record) => report.factories.push(record.info().clone()),
                Err(e) => report.failures.push(Failure {
                    target: id.clone(),
                    error: e.to_string(),
                }),
            }
        }
    }

    report
}

fn write_text(report: &Report, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "search path:")?;
    for dir in &report.search_path {
        writeln!(out, "    {}", dir.display())?;
    }

    for info in &report.factories {
        writeln!(out, "{}", info.id)?;
        writeln!(out, "    library:   {}", info.library)?;
        writeln!(out, "    class:     {}", info.class_name)?;
        writeln!(out, "    signature: {}", info.signature_type_name)?;
        for (key, value) in info.properties.iter() {
            writeln!(out, "    {} = {}", key, value)?;
        }
    }

    for failure in &report.failures {
        writeln!(out, "error: {}: {}", failure.target, failure.error)?;
    }
    Ok(())
}

fn write_json(report: &Report, out: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

/// List factories, returning whether every request succeeded
fn run(registry: &Registry, options: &Options, out: &mut impl Write) -> io::Result<bool> {
    let report = collect(registry, options);

    if options.json {
        write_json(&report, out)?;
    } else {
        write_text(&report, out)?;
    }

    Ok(report.failures.is_empty())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if options.help {
        println!("{}", USAGE);
        return;
    }

    if let Some(level) = options.debug_level {
        set_debug_level(level);
    }

    let stdout = io::stdout();
    match run(Registry::instance(), &options, &mut stdout.lock()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            log::error!("Cannot write listing: {}", e);
            std::process::exit(1);
        }
    }
}
