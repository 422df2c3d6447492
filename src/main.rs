//! generange: genome range search over an augmented interval tree.
//!
//! Usage: generange <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{info, warn};

use generange::bed::{read_queries, read_records, GeneError};
use generange::catalog::{demo_records, demo_tree};
use generange::config::{self, DEFAULT_PORT};
use generange::generate::{GenerateCommand, GenerateConfig};
use generange::naive::{same_matches, NaiveIndex};
use generange::output::ResultWriter;
use generange::interval::GeneRecord;
use generange::parallel::{count_batch, search_batch, BatchStats};
use generange::request::{Envelope, SearchQuery, SearchResults, TreeStats};
use generange::server::Server;
use generange::tree::IntervalTree;

#[derive(Parser)]
#[command(name = "generange")]
#[command(version)]
#[command(about = "Genome range search - overlap queries over an augmented interval tree", long_about = None)]
struct Cli {
    /// Number of threads to use for batch queries (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Accept gene file records with start > end. They are stored as given
    /// and never match a query.
    #[arg(long, global = true)]
    allow_inverted: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find genes overlapping a closed query range
    Search {
        /// Query start position
        #[arg(short, long, allow_negative_numbers = true)]
        start: i64,

        /// Query end position
        #[arg(short, long, allow_negative_numbers = true)]
        end: i64,

        /// Gene file (default: built-in demo catalog)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print a JSON envelope instead of a listing
        #[arg(long)]
        json: bool,

        /// Sort results by position (tree order is pre-order otherwise)
        #[arg(long)]
        sort: bool,

        /// Also run a linear scan and check that both agree
        #[arg(long)]
        compare: bool,
    },

    /// Run many queries from a file against one tree
    Batch {
        /// Gene file (default: built-in demo catalog)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Query file: start<TAB>end per line
        #[arg(short, long)]
        queries: PathBuf,

        /// Print one overlap count per query instead of the matching genes
        #[arg(short, long)]
        count: bool,

        /// Print batch statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Report tree shape statistics
    Stats {
        /// Gene file (default: built-in demo catalog)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Serve search and add-gene requests as JSON lines over TCP
    Serve {
        /// Gene file used to seed the tree (default: built-in demo catalog)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Connection worker threads
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Seconds a connection may stay silent before it is closed (0 = never)
        #[arg(long, default_value = "30")]
        idle_timeout: u64,
    },

    /// Generate a synthetic gene file
    Generate {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of genes
        #[arg(short = 'n', long, default_value = "10000")]
        count: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Upper bound (exclusive) for start positions
        #[arg(long, default_value = "10000000")]
        max_position: i64,

        /// Maximum gene length
        #[arg(long, default_value = "5000")]
        max_length: i64,

        /// Emit genes in increasing start order (degenerate tree)
        #[arg(long)]
        sorted_starts: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    generange::logging::init_tracing();

    // Must be set before any gene file is parsed
    if cli.allow_inverted {
        config::set_allow_inverted(true);
    }

    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            warn!("Failed to initialize thread pool: {}", e);
        }
    }

    let result = match cli.command {
        Commands::Search {
            start,
            end,
            input,
            json,
            sort,
            compare,
        } => run_search(start, end, input, json, sort, compare),

        Commands::Batch {
            input,
            queries,
            count,
            stats,
        } => run_batch(input, queries, count, stats),

        Commands::Stats { input } => run_stats(input),

        Commands::Serve {
            input,
            host,
            port,
            workers,
            idle_timeout,
        } => run_serve(input, host, port, workers, idle_timeout),

        Commands::Generate {
            output,
            count,
            seed,
            max_position,
            max_length,
            sorted_starts,
        } => run_generate(
            output,
            GenerateConfig {
                count,
                seed,
                max_position,
                max_length,
                sorted_starts,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Read a gene file that must contain at least one gene.
fn read_gene_file(path: &Path) -> Result<Vec<GeneRecord>, GeneError> {
    let records = read_records(path)?;
    if records.is_empty() {
        return Err(GeneError::InvalidFormat(format!(
            "no genes found in {}",
            path.display()
        )));
    }
    Ok(records)
}

/// Load a gene file into a tree, or fall back to the demo catalog.
fn load_tree(input: Option<&Path>) -> Result<IntervalTree, GeneError> {
    let Some(path) = input else {
        let tree = demo_tree();
        info!("Interval tree initialized with {} demo genes", tree.len());
        return Ok(tree);
    };

    let tree: IntervalTree = read_gene_file(path)?.into_iter().collect();
    info!(
        "Interval tree initialized with {} genes from {} (height {})",
        tree.len(),
        path.display(),
        tree.height()
    );
    Ok(tree)
}

fn run_search(
    start: i64,
    end: i64,
    input: Option<PathBuf>,
    json: bool,
    sort: bool,
    compare: bool,
) -> Result<(), GeneError> {
    let query = match SearchQuery::new(start, end) {
        Ok(query) => query,
        Err(e) => {
            if json {
                println!("{}", Envelope::error(&e).to_json());
            }
            return Err(e.into());
        }
    };

    // Records are cloned into the naive index only when comparing.
    let records = match input.as_deref() {
        Some(path) if compare => Some(read_gene_file(path)?),
        None if compare => Some(demo_records()),
        _ => None,
    };
    let tree: IntervalTree = match &records {
        Some(records) => records.iter().cloned().collect(),
        None => load_tree(input.as_deref())?,
    };

    let mut results = tree.overlap_search(query.start, query.end);
    if sort {
        results.sort();
    }

    if let Some(records) = records {
        let naive: NaiveIndex = records.into_iter().collect();
        let naive_results = naive.overlap_search(query.start, query.end);
        check_agreement(&results, &naive_results)?;
        info!(
            "Linear scan agrees: {} match(es) over {} genes",
            naive_results.len(),
            naive.len()
        );
    }

    if json {
        let message = format!("Found {} overlapping gene(s)", results.len());
        println!("{}", Envelope::ok(message, SearchResults::new(query, results)).to_json());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());
    writer.write_listing(query.start, query.end, &results)?;
    writer.flush()
}

fn check_agreement(tree: &[&GeneRecord], scan: &[&GeneRecord]) -> Result<(), GeneError> {
    if same_matches(tree, scan) {
        Ok(())
    } else {
        Err(GeneError::Mismatch {
            tree: tree.len(),
            scan: scan.len(),
        })
    }
}

fn run_batch(
    input: Option<PathBuf>,
    queries: PathBuf,
    count: bool,
    stats: bool,
) -> Result<(), GeneError> {
    let tree = load_tree(input.as_deref())?;
    let queries = read_queries(&queries)?;

    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());
    let counts = if count {
        let counts = count_batch(&tree, &queries);
        for (&(query_start, query_end), &n) in queries.iter().zip(&counts) {
            writer.write_count_row(query_start, query_end, n)?;
        }
        counts
    } else {
        let results = search_batch(&tree, &queries);
        for (&(query_start, query_end), hits) in queries.iter().zip(&results) {
            for record in hits {
                writer.write_batch_row(query_start, query_end, record)?;
            }
        }
        results.iter().map(Vec::len).collect()
    };
    writer.flush()?;

    if stats {
        eprintln!("Batch stats: {}", BatchStats::from_counts(&counts));
    }
    Ok(())
}

fn run_stats(input: Option<PathBuf>) -> Result<(), GeneError> {
    let tree = load_tree(input.as_deref())?;
    let stats = TreeStats {
        genes: tree.len(),
        height: tree.height(),
        root_max_end: tree.root().map(|n| n.max_end()),
    };

    println!("genes\t{}", stats.genes);
    println!("height\t{}", stats.height);
    if let Some(root) = tree.root() {
        println!("root\t{}", root.record());
        println!("root_max_end\t{}", root.max_end());
    }
    if stats.genes > 2 && stats.height == stats.genes {
        warn!("tree is a single chain; queries will scan every gene");
    }
    Ok(())
}

fn run_serve(
    input: Option<PathBuf>,
    host: String,
    port: u16,
    workers: usize,
    idle_timeout: u64,
) -> Result<(), GeneError> {
    let tree = load_tree(input.as_deref())?;
    let idle_timeout = (idle_timeout > 0).then(|| Duration::from_secs(idle_timeout));
    let server = Server::bind((host.as_str(), port), tree)?.with_idle_timeout(idle_timeout);
    server.run(workers)?;
    Ok(())
}

fn run_generate(output: PathBuf, config: GenerateConfig) -> Result<(), GeneError> {
    GenerateCommand::new(config).run(&output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_gene_file_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# header only").unwrap();

        let err = read_gene_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("no genes found"));
        assert!(run_search(0, 10, Some(file.path().to_path_buf()), false, false, true).is_err());
        assert!(run_search(0, 10, Some(file.path().to_path_buf()), false, false, false).is_err());
    }

    #[test]
    fn test_check_agreement() {
        let a = GeneRecord::new(1, 5, "A");
        let b = GeneRecord::new(3, 9, "B");
        assert!(check_agreement(&[&a, &b], &[&b, &a]).is_ok());

        let err = check_agreement(&[&a], &[&a, &b]).unwrap_err();
        assert!(matches!(err, GeneError::Mismatch { tree: 1, scan: 2 }));
        assert_eq!(
            err.to_string(),
            "Tree and linear scan disagree: tree returned 1 match(es), scan returned 2"
        );
    }
}
