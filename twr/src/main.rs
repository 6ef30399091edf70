use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use libtwr::{
    tweets_from_file, tweets_from_file_iter, DictFormat, FilterOptions, Tokenizer, Tweet,
    TweetCorpus,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(version, about = "Read tweet dumps and build word dictionaries")]
struct Args {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every tweet of a dump file as one JSON document per line
    Cat {
        file: PathBuf,
        /// Read the file lazily, one JSON document per line
        #[arg(long)]
        lines: bool,
    },
    /// Build a dictionary from the text of every tweet in files or directories
    Dict {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Save as text instead of the compressed binary format
        #[arg(long)]
        text: bool,
        /// Strip punctuation and drop mentions, hashtags, links and other noise
        #[arg(long)]
        clean: bool,
        /// Drop tokens found in fewer documents than this
        #[arg(long)]
        no_below: Option<u64>,
        /// Drop tokens found in more than this fraction of documents
        #[arg(long)]
        no_above: Option<f64>,
        /// Keep at most this many of the most frequent tokens
        #[arg(long)]
        keep_n: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

fn write_tweet(writer: &mut impl Write, tweet: &Tweet) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *writer, tweet)?;
    writeln!(writer)?;
    Ok(())
}

fn cat(file: PathBuf, lines: bool) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    if lines {
        for tweet in tweets_from_file_iter(&file)? {
            write_tweet(&mut writer, &tweet?)?;
        }
    } else {
        for tweet in tweets_from_file(&file)? {
            write_tweet(&mut writer, &tweet)?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Cat { file, lines } => {
            cat(file.clone(), lines).with_context(|| format!("reading {}", file.display()))?
        }
        Command::Dict {
            inputs,
            output,
            text,
            clean,
            no_below,
            no_above,
            keep_n,
        } => {
            let corpus = TweetCorpus::from_paths(&inputs);
            info!(files = corpus.files().len(), "building dictionary");
            let tokenizer = if clean {
                Tokenizer::Tweet
            } else {
                Tokenizer::Plain
            };
            let mut dictionary = corpus.build_dictionary(tokenizer)?;

            if no_below.is_some() || no_above.is_some() || keep_n.is_some() {
                let defaults = FilterOptions::default();
                dictionary.filter_extremes(FilterOptions {
                    no_below: no_below.unwrap_or(defaults.no_below),
                    no_above: no_above.unwrap_or(defaults.no_above),
                    keep_n: keep_n.or(defaults.keep_n),
                });
            }

            dictionary
                .save(&output, DictFormat::from_flag(text))
                .with_context(|| format!("saving {}", output.display()))?;
            info!(
                documents = dictionary.num_docs(),
                tokens = dictionary.len(),
                "dictionary written to {}",
                output.display()
            );
        }
    }

    Ok(())
}
