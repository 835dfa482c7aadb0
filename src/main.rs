use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::error;
use wordgrep::{scan_and_index, OutputSink, QueryEngine, ScanConfig, INITIAL_BUCKET_COUNT};

#[derive(Parser)]
#[command(name = "wordgrep")]
#[command(about = "Index the words of a directory tree and answer interactive lookups")]
#[command(version)]
struct Cli {
    /// Directory to index
    directory: PathBuf,

    /// File that query results are written to
    output: PathBuf,

    /// File extensions to include (e.g., rs,txt)
    #[arg(short, long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Glob patterns for file or directory names to skip
    #[arg(short = 'x', long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Maximum file size in MB
    #[arg(long)]
    max_size: Option<u64>,

    /// Initial bucket count of the word index
    #[arg(long, default_value_t = INITIAL_BUCKET_COUNT)]
    buckets: usize,
}

/// Convert a `--max-size` value in MB to bytes, capping at `u64::MAX`
fn megabytes_to_bytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let mut config = ScanConfig::default();

    if let Some(exts) = cli.extensions {
        config.extensions = exts;
    }

    if let Some(excl) = cli.exclude {
        config.exclude_patterns = excl;
    }

    config.max_file_size = cli.max_size.map(megabytes_to_bytes);
    config.initial_buckets = cli.buckets;

    // Open the sink before indexing
    let build = OutputSink::open(&cli.output)
        .and_then(|sink| Ok((scan_and_index(&cli.directory, &config)?, sink)));

    let (corpus, sink) = match build {
        Ok(parts) => parts,
        Err(e) => {
            error!("{}", e);
            eprintln!("Could not build index, exiting.");
            std::process::exit(1);
        }
    };

    let mut engine = QueryEngine::new(corpus, sink);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    let result = engine.run(stdin.lock(), &mut stdout);
    drop(engine);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("Goodbye! Thank you and have a nice day.");
}
