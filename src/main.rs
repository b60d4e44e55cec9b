mod commands;
mod core;
mod engine;
mod graph;
mod logging;
mod output;
mod pattern;
mod ui;
mod utils;

use clap::{ArgGroup, Parser, Subcommand};
use core::error::{SkippyError, print_error};
use std::path::PathBuf;

/// Skip CI work for modules a change cannot affect
#[derive(Parser)]
#[command(name = "skippy")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Repository root (default: current directory)
  #[arg(long, global = true, value_name = "DIR")]
  root: Option<PathBuf>,

  /// Config file (default: skippy.toml, .skippy.toml, .config/skippy.toml)
  #[arg(long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Module manifest JSON, overriding `modules` in the config
  #[arg(long, global = true, value_name = "FILE")]
  modules: Option<PathBuf>,

  /// Debug logging
  #[arg(short, long, global = true, conflicts_with = "quiet")]
  verbose: bool,

  /// Errors only, no progress display
  #[arg(short, long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compute affected modules per tool and write the output files
  #[command(group(ArgGroup::new("input").required(true).args(["changed_files", "since", "from"])))]
  Affected {
    /// Newline-delimited list of changed files (`-` for stdin)
    #[arg(long, value_name = "FILE")]
    changed_files: Option<PathBuf>,
    /// Git ref to compare against HEAD (merge-base)
    #[arg(long, conflicts_with = "from")]
    since: Option<String>,
    /// Start ref (for ref pair mode)
    #[arg(long)]
    from: Option<String>,
    /// End ref (default: HEAD)
    #[arg(long, requires = "from")]
    to: Option<String>,
    /// Only resolve these tools (repeatable)
    #[arg(long = "tool", value_name = "TOOL")]
    tools: Vec<String>,
    /// Output root, overriding `[output] dir`
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Output format: text (default), json, names
    #[arg(long, default_value = "text")]
    format: String,
    /// Resolve and print without writing output files
    #[arg(long)]
    dry_run: bool,
  },

  /// Inspect the module dependency graph
  Graph {
    /// Output format: text (default), json, dot
    #[arg(long, default_value = "text")]
    format: String,
    /// Show the shortest dependency chain from one module to another
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    why: Option<Vec<String>>,
  },

  /// Show the merged configuration of every tool and validate patterns
  Tools {
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Write a starter skippy.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();
  logging::init(cli.verbose, cli.quiet);

  let root = match cli.root.clone() {
    Some(root) => root,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(SkippyError::from(e).context("Failed to get current directory")),
    },
  };

  let result = match cli.command {
    Commands::Affected {
      changed_files,
      since,
      from,
      to,
      tools,
      output,
      format,
      dry_run,
    } => core::context::RunContext::build(&root, cli.config.as_deref(), cli.modules.as_deref()).and_then(|ctx| {
      commands::run_affected(
        &ctx,
        commands::AffectedOptions {
          changed_files,
          since,
          from,
          to,
          tools,
          output,
          format,
          dry_run,
          quiet: cli.quiet,
        },
      )
    }),

    Commands::Graph { format, why } => {
      commands::run_graph(&root, cli.config.as_deref(), cli.modules.as_deref(), format, why)
    }

    Commands::Tools { json } => {
      core::config::SkippyConfig::load(&root, cli.config.as_deref()).and_then(|config| commands::run_tools(&config, json))
    }

    Commands::Init { force } => commands::run_init(&root, force),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: SkippyError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
