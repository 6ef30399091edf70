use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::info;
use walkdir::WalkDir;

use crate::{
    dictionary::{Dictionary, Tokenizer},
    file::tweets_from_file,
    Result, Tweet,
};

const TWEET_EXTENSIONS: [&str; 3] = ["json", "jsonl", "bz2"];

fn is_tweet_file(path: &Path) -> bool {
    path.extension()
        .map(|s| {
            let extension = s.to_string_lossy();
            TWEET_EXTENSIONS.iter().any(|e| extension == *e)
        })
        .unwrap_or_default()
}

/// A set of tweet dump files read as one collection.
///
/// Every file may hold concatenated or line-delimited JSON, optionally
/// bzip2-compressed.
#[derive(Debug, Default, Clone)]
pub struct TweetCorpus {
    files: Vec<PathBuf>,
}

impl TweetCorpus {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// Collects the `.json`, `.jsonl` and `.bz2` files below `dir`, sorted by
    /// path. Unreadable entries are skipped.
    pub fn from_directory(dir: impl AsRef<Path>) -> Self {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && is_tweet_file(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        Self { files }
    }

    /// Files are taken as given, directories are expanded.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Self {
        let files = paths
            .iter()
            .flat_map(|path| {
                let path = path.as_ref();
                if path.is_dir() {
                    Self::from_directory(path).files
                } else {
                    vec![path.to_path_buf()]
                }
            })
            .collect();
        Self { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Reads every file in parallel. Tweets keep file order, then in-file
    /// order. Fails with the error of the first failing file.
    pub fn read_all(&self) -> Result<Vec<Tweet>> {
        let file_count = self.files.len();
        let processed_count = Mutex::new(0_usize);
        let per_file = self
            .files
            .par_iter()
            .map(|file| -> Result<Vec<Tweet>> {
                let tweets = tweets_from_file(file)?;

                let processed = {
                    let mut processed_count = processed_count.lock();
                    *processed_count += 1;
                    *processed_count
                };
                if processed % 100 == 0 || processed == file_count {
                    let percentage = (processed as f64 / file_count as f64) * 100f64;
                    info!("{}/{} files ({:.2}%)", processed, file_count, percentage);
                }
                Ok(tweets)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }

    /// Builds a dictionary over the text of every tweet.
    ///
    /// Files are read and tokenized in parallel batches, one file per worker
    /// thread, and added in corpus order, so ids do not depend on scheduling
    /// and only one batch is held in memory at a time.
    pub fn build_dictionary(&self, tokenizer: Tokenizer) -> Result<Dictionary> {
        let mut dictionary = Dictionary::new();
        let batch_size = rayon::current_num_threads().max(1);
        for (index, batch) in self.files.chunks(batch_size).enumerate() {
            let docs = batch
                .par_iter()
                .map(|file| -> Result<Vec<Vec<String>>> {
                    Ok(tweets_from_file(file)?
                        .iter()
                        .filter_map(Tweet::text)
                        .map(|text| tokenizer.tokenize(text))
                        .collect())
                })
                .collect::<Result<Vec<_>>>()?;
            dictionary.add_documents(docs.into_iter().flatten());
            info!(
                files = (index * batch_size + batch.len()).min(self.files.len()),
                total = self.files.len(),
                tokens = dictionary.len(),
                "indexed batch"
            );
        }
        Ok(dictionary)
    }
}
