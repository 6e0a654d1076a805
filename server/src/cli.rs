//! Command line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wordvec_core::{LoadOptions, NeighborQuery, DEFAULT_TOP_N};

#[derive(Debug, Parser)]
#[command(name = "wordvec")]
#[command(about = "Query word vector tables: similarity, analogies, odd one out")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub table: TableArgs,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the table comes from and how it is loaded
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Vector table (.txt word2vec text or .wvsnap snapshot); falls back to
    /// WORDVEC_TABLE_PATH and the default model directories
    #[arg(long, global = true)]
    pub table: Option<PathBuf>,

    /// `token count` file with frequency counts for text tables
    #[arg(long, global = true)]
    pub vocab: Option<PathBuf>,

    /// Drop tokens seen fewer times than this
    #[arg(long, global = true, default_value_t = 1)]
    pub min_count: u64,

    /// Text table has no `<count> <dim>` header line
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Keep token case instead of lowercasing
    #[arg(long, global = true)]
    pub keep_case: bool,
}

impl TableArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            min_count: self.min_count,
            lowercase: !self.keep_case,
            has_header: !self.no_header,
            vocab_path: self.vocab.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cosine similarity of two tokens
    Similarity { a: String, b: String },

    /// Nearest neighbors of positive minus negative tokens
    MostSimilar {
        /// Token pulling the query toward it (repeatable)
        #[arg(short, long = "positive", required = true)]
        positive: Vec<String>,

        /// Token pushing the query away (repeatable)
        #[arg(short, long = "negative")]
        negative: Vec<String>,

        /// Number of neighbors
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
    },

    /// Token that fits least with the others
    DoesntMatch {
        #[arg(required = true)]
        tokens: Vec<String>,
    },

    /// Whether a token is in the vocabulary
    Contains { token: String },

    /// Raw vector of a token
    Vector { token: String },

    /// Position of B among the neighbors of A
    Rank { a: String, b: String },

    /// Table summary
    Stats,

    /// Write the loaded table as a snapshot (.wvsnap) or text table
    Convert {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Serve JSON-RPC queries over stdin/stdout
    Serve {
        /// Reload the table when its file changes
        #[arg(long)]
        watch: bool,
    },
}

impl Command {
    /// Query for the `most-similar` subcommand
    pub fn neighbor_query(&self) -> Option<NeighborQuery> {
        match self {
            Command::MostSimilar {
                positive,
                negative,
                top_n,
            } => Some(
                NeighborQuery::positive(positive)
                    .negative(negative)
                    .top_n(*top_n),
            ),
            _ => None,
        }
    }
}
