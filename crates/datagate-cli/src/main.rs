use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "datagate", version, about = "datagate CLI")]
struct Cli {
    /// Log filter, used when RUST_LOG is not set (e.g. "debug", "datagate_policy=trace").
    #[arg(long, global = true, env = "DATAGATE_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a configuration file and report how each entity is exposed.
    Check {
        /// Path to the runtime configuration (YAML or JSON).
        #[arg(long, short, env = "DATAGATE_CONFIG")]
        config: PathBuf,
    },

    /// List the MCP tools a configuration registers.
    Tools {
        #[arg(long, short, env = "DATAGATE_CONFIG")]
        config: PathBuf,

        /// Print each tool's input schema.
        #[arg(long, short, default_value_t = false)]
        verbose: bool,
    },

    /// Print the describe_entities result for a role.
    Describe {
        #[arg(long, short, env = "DATAGATE_CONFIG")]
        config: PathBuf,

        /// Role to describe for. Defaults to anonymous.
        #[arg(long, short)]
        role: Option<String>,

        /// Only entity names and descriptions.
        #[arg(long, default_value_t = false)]
        name_only: bool,

        /// Restrict output to these entities (comma-separated).
        #[arg(long, value_delimiter = ',')]
        entities: Option<Vec<String>>,
    },

    /// Aggregate a JSON array of rows offline.
    Aggregate {
        /// File containing a JSON array of objects.
        #[arg(long)]
        records: PathBuf,

        /// count, avg, sum, min or max.
        #[arg(long, short)]
        function: String,

        /// Field to aggregate; "*" with count.
        #[arg(long)]
        field: String,

        /// Fields to group by (comma-separated).
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,

        #[arg(long, default_value_t = false)]
        distinct: bool,

        /// Having conditions such as gt=10 or in=1,2 (repeatable).
        #[arg(long)]
        having: Vec<String>,

        /// asc or desc.
        #[arg(long)]
        order: Option<String>,

        /// Keep only the first N groups.
        #[arg(long)]
        first: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Check { config } => commands::check::run(&config),
        Command::Tools { config, verbose } => commands::tools::list(&config, verbose),
        Command::Describe {
            config,
            role,
            name_only,
            entities,
        } => commands::describe::run(&config, role.as_deref(), name_only, entities),
        Command::Aggregate {
            records,
            function,
            field,
            group_by,
            distinct,
            having,
            order,
            first,
        } => commands::aggregate::run(commands::aggregate::AggregateArgs {
            records,
            function,
            field,
            group_by,
            distinct,
            having,
            order,
            first,
        }),
    }
}
