use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use viewprint::Result;
use viewprint::registry::Registry;
use viewprint::render::{RenderOptions, render_value};
use viewprint::spec::load_printers_file;
use viewprint::value::Snapshot;
use viewprint::value::snapshot::load_values_file;

#[derive(Parser)]
#[command(name = "viewprint")]
#[command(about = "Multi-view value printer", long_about = None)]
struct Cli {
    /// Log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render values from a snapshot file through the registered printers.
    Render {
        #[arg(long)]
        printers: String,

        #[arg(long)]
        values: String,

        /// Levels below each value to expand.
        #[arg(long, default_value_t = 4)]
        depth: usize,

        /// Children requested per node.
        #[arg(long)]
        page: Option<usize>,

        /// Only render this value.
        #[arg(long)]
        only: Option<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },

    /// Validate a printers file without rendering anything.
    Check {
        #[arg(long)]
        printers: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Commands::Render {
            printers,
            values,
            depth,
            page,
            only,
            out,
        } => {
            // 1) Register printers (fails on any configuration error).
            let mut registry = Registry::<Snapshot>::new();
            load_printers_file(&printers, &mut registry)?;

            // 2) Load the values to inspect.
            let values = load_values_file(&values)?;

            // 3) Render each value as an expanded tree.
            let opts = RenderOptions {
                max_depth: depth,
                page,
            };
            let mut text = String::new();
            for (name, value) in &values {
                if only.as_deref().is_some_and(|o| o != name) {
                    continue;
                }
                text.push_str(&render_value(name, value, &registry, &opts)?);
            }

            match out {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    println!("Wrote {}", path);
                }
                None => print!("{}", text),
            }
        }
        Commands::Check { printers } => {
            let mut registry = Registry::<Snapshot>::new();
            let n = load_printers_file(&printers, &mut registry)?;
            println!("{}: {} printers OK", printers, n);
        }
    }

    Ok(())
}
