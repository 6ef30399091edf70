use std::{
    fs::OpenOptions,
    io::{BufRead, BufReader, Lines, Read},
    path::{Path, PathBuf},
};

use bzip2::read::BzDecoder;
use tracing::{debug, info};

use crate::{json_stream::decode_concatenated, Error, Result, Tweet};

fn is_bzip2(path: &Path) -> bool {
    path.extension()
        .map(|s| s.to_string_lossy().as_ref() == "bz2")
        .unwrap_or_default()
}

/// Opens `path` for reading, decompressing `.bz2` files on the fly.
pub fn open_source(path: impl AsRef<Path>) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    if is_bzip2(path) {
        Ok(Box::new(BufReader::new(BzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads every tweet of a file of concatenated JSON documents into memory.
///
/// Records are not validated beyond being JSON objects. A file that is not
/// valid UTF-8 fails with [`Error::Io`] (`InvalidData`) before any JSON is
/// decoded. For large dumps written one document per line prefer
/// [`tweets_from_file_iter`].
pub fn tweets_from_file(path: impl AsRef<Path>) -> Result<Vec<Tweet>> {
    let path = path.as_ref();
    let contents = {
        let mut reader = open_source(path)?;
        let mut contents = String::new();
        reader
            .read_to_string(&mut contents)
            .map_err(|e| Error::io(path, e))?;
        contents
    };
    let tweets = decode_concatenated(&contents).map_err(|err| match err {
        Error::Parse { context, source } => {
            Error::parse(format!("{}: {}", path.display(), context), source)
        }
        other => other,
    })?;
    info!(path = %path.display(), count = tweets.len(), "read tweet file");
    Ok(tweets)
}

/// Opens a line-delimited tweet file for lazy reading.
pub fn tweets_from_file_iter(path: impl AsRef<Path>) -> Result<TweetLines> {
    TweetLines::open(path)
}

/// Lazy reader over a file holding one JSON document per line.
///
/// The file stays open while tweets remain. It is closed as soon as the last
/// line has been read, after the first error, on [`TweetLines::close`], or
/// when the reader is dropped, whichever comes first. Whitespace around a
/// document is ignored and blank lines are skipped. A line that is not valid
/// UTF-8 is yielded as [`Error::Io`] (`InvalidData`) and ends the iteration.
pub struct TweetLines {
    path: PathBuf,
    lines: Option<Lines<Box<dyn BufRead + Send>>>,
    line_number: usize,
}

impl TweetLines {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = open_source(&path)?;
        debug!(path = %path.display(), "opened line-delimited tweet file");
        Ok(Self {
            path,
            lines: Some(reader.lines()),
            line_number: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the underlying file handle is still held.
    pub fn is_open(&self) -> bool {
        self.lines.is_some()
    }

    /// Releases the file handle without reading the remaining lines.
    pub fn close(&mut self) {
        if self.lines.take().is_some() {
            debug!(path = %self.path.display(), line = self.line_number, "closed tweet file early");
        }
    }

    fn finish(&mut self) {
        self.lines = None;
    }
}

impl Iterator for TweetLines {
    type Item = Result<Tweet>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.lines.as_mut()?.next();
            let line = match next {
                None => {
                    self.finish();
                    return None;
                }
                Some(Err(source)) => {
                    self.finish();
                    return Some(Err(Error::io(&self.path, source)));
                }
                Some(Ok(line)) => line,
            };
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return match serde_json::from_str(line) {
                Ok(tweet) => Some(Ok(tweet)),
                Err(source) => {
                    self.finish();
                    Some(Err(Error::parse(
                        format!("{} line {}", self.path.display(), self.line_number),
                        source,
                    )))
                }
            };
        }
    }
}

/// Placeholder for a database-backed reader; always fails.
pub fn tweets_from_db() -> Result<Vec<Tweet>> {
    Err(Error::NotImplemented("tweets_from_db"))
}
