//! CLI frontend for the Dicer dice and ruleset engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use dicer_rules::RulesConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "dicer",
    about = "Dicer: dice expressions and tabletop ruleset commands",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice expression and print the expanded result
    Roll {
        /// Dice expression, e.g. 3d6+2
        expr: String,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// Faces of a bare `d`
        #[arg(short, long, default_value = "100")]
        faces: u32,
    },

    /// Print the smallest and largest value an expression can produce
    Range {
        /// Dice expression
        expr: String,

        /// Faces of a bare `d`
        #[arg(short, long, default_value = "100")]
        faces: u32,
    },

    /// Run one chat command against a JSON role file
    Exec {
        /// Role file (created on first write if missing)
        #[arg(short, long)]
        roles: PathBuf,

        /// Role id of the issuing user
        #[arg(short, long)]
        actor: i64,

        /// Role ids mentioned with `@` (repeatable)
        #[arg(short, long)]
        mention: Vec<i64>,

        /// Ruleset namespace (id, name or alias)
        #[arg(long, default_value = "coc7")]
        ruleset: String,

        /// RNG seed for reproducible rolls
        #[arg(short, long)]
        seed: Option<u64>,

        /// The command line, e.g. `.rc 侦查`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },

    /// List rulesets, a ruleset's commands, or one command's help
    List {
        /// Ruleset namespace (id, name or alias)
        ruleset: Option<String>,

        /// Command name or alias
        command: Option<String>,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config(seed: Option<u64>, faces: u32) -> RulesConfig {
    let config = RulesConfig::default().with_default_faces(faces);
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Roll { expr, seed, faces } => {
            commands::roll::run(&expr, &config(seed, faces).evaluator(), seed)
        }
        Commands::Range { expr, faces } => {
            commands::range::run(&expr, &config(None, faces).evaluator())
        }
        Commands::Exec {
            roles,
            actor,
            mention,
            ruleset,
            seed,
            line,
        } => {
            let request = commands::exec::ExecRequest {
                roles: &roles,
                actor,
                mentions: &mention,
                ruleset: &ruleset,
                line: &line.join(" "),
            };
            commands::exec::run(&request, &config(seed, 100))
        }
        Commands::List { ruleset, command } => {
            commands::list::run(ruleset.as_deref(), command.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
