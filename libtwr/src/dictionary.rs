//! Word dictionaries built from document streams.
//!
//! A [`Dictionary`] maps every token it has seen to a dense integer id and
//! tracks how many documents contained it. Documents are consumed one at a
//! time, so a corpus never has to fit in memory.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs::OpenOptions,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use bzip2::{read::BzDecoder, write::BzEncoder, Compression};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{util, Error, Result};

/// On-disk representation of a saved dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DictFormat {
    /// `num_docs` on the first line, then `id<TAB>token<TAB>docfreq` per
    /// token sorted by token. Position counts are not kept.
    Text,
    /// bzip2-compressed serialization of the whole dictionary.
    #[default]
    Binary,
}

impl DictFormat {
    pub fn from_flag(as_text: bool) -> Self {
        if as_text {
            Self::Text
        } else {
            Self::Binary
        }
    }
}

/// How raw documents are split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tokenizer {
    /// Trim, lowercase, split on whitespace.
    #[default]
    Plain,
    /// Like `Plain`, then strip punctuation and drop tweet noise.
    Tweet,
}

impl Tokenizer {
    pub fn tokenize(self, doc: &str) -> Vec<String> {
        match self {
            Self::Plain => doc
                .trim()
                .to_lowercase()
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
            Self::Tweet => util::tweet_tokens(doc),
        }
    }
}

/// Bounds for [`Dictionary::filter_extremes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOptions {
    /// Drop tokens found in fewer documents than this.
    pub no_below: u64,
    /// Drop tokens found in more than this fraction of documents.
    pub no_above: f64,
    /// Keep only this many of the most frequent remaining tokens.
    pub keep_n: Option<usize>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            no_below: 5,
            no_above: 0.5,
            keep_n: Some(100_000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    token2id: BTreeMap<String, u32>,
    dfs: BTreeMap<u32, u64>,
    num_docs: u64,
    num_pos: u64,
    num_nnz: u64,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents<I, D, T>(docs: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut dictionary = Self::new();
        dictionary.add_documents(docs);
        dictionary
    }

    /// Tokenizes each raw text and adds it as a document.
    pub fn from_texts<I, S>(texts: I, tokenizer: Tokenizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_documents(
            texts
                .into_iter()
                .map(|text| tokenizer.tokenize(text.as_ref())),
        )
    }

    pub fn add_documents<I, D, T>(&mut self, docs: I)
    where
        I: IntoIterator<Item = D>,
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for doc in docs {
            self.add_document(doc);
        }
    }

    /// Adds one tokenized document. Unseen tokens get the next free ids in
    /// sorted token order.
    pub fn add_document<D, T>(&mut self, doc: D)
    where
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for token in doc {
            *counts.entry(token.as_ref().to_owned()).or_default() += 1;
        }

        let mut missing: Vec<&String> = counts
            .keys()
            .filter(|token| !self.token2id.contains_key(*token))
            .collect();
        missing.sort();
        for token in missing {
            let id = self.token2id.len() as u32;
            self.token2id.insert(token.clone(), id);
        }

        for (token, count) in &counts {
            if let Some(&id) = self.token2id.get(token) {
                *self.dfs.entry(id).or_default() += 1;
            }
            self.num_pos += count;
        }
        self.num_docs += 1;
        self.num_nnz += counts.len() as u64;
    }

    /// Bag-of-words of a tokenized document as `(id, count)` pairs sorted
    /// by id. Unknown tokens are ignored.
    pub fn doc2bow<D, T>(&self, doc: D) -> Vec<(u32, u64)>
    where
        D: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut bow: BTreeMap<u32, u64> = BTreeMap::new();
        for token in doc {
            if let Some(&id) = self.token2id.get(token.as_ref()) {
                *bow.entry(id).or_default() += 1;
            }
        }
        bow.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.token2id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token2id.is_empty()
    }

    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.token2id.get(token).copied()
    }

    pub fn token2id(&self) -> &BTreeMap<String, u32> {
        &self.token2id
    }

    pub fn id2token(&self) -> BTreeMap<u32, &str> {
        self.token2id
            .iter()
            .map(|(token, &id)| (id, token.as_str()))
            .collect()
    }

    /// Number of documents containing the token with this id.
    pub fn doc_freq(&self, id: u32) -> u64 {
        self.dfs.get(&id).copied().unwrap_or_default()
    }

    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Total number of tokens processed.
    pub fn num_pos(&self) -> u64 {
        self.num_pos
    }

    /// Sum over documents of the number of distinct tokens.
    pub fn num_nnz(&self) -> u64 {
        self.num_nnz
    }

    /// Removes rare and overly common tokens, then renumbers the rest.
    pub fn filter_extremes(&mut self, options: FilterOptions) {
        let no_above_abs = (options.no_above * self.num_docs as f64) as u64;
        let mut good: Vec<(u32, u64)> = self
            .token2id
            .values()
            .map(|&id| (id, self.doc_freq(id)))
            .filter(|&(_, df)| df >= options.no_below && df <= no_above_abs)
            .collect();
        // Most frequent first; ties keep the older id.
        good.sort_by(|(a_id, a_df), (b_id, b_df)| b_df.cmp(a_df).then(a_id.cmp(b_id)));
        if let Some(keep_n) = options.keep_n {
            good.truncate(keep_n);
        }

        let before = self.len();
        let keep: BTreeSet<u32> = good.into_iter().map(|(id, _)| id).collect();
        self.token2id.retain(|_, id| keep.contains(id));
        self.dfs.retain(|id, _| keep.contains(id));
        self.compactify();
        info!(before, after = self.len(), "filtered dictionary extremes");
    }

    /// Renumbers ids to `0..len` keeping their relative order.
    pub fn compactify(&mut self) {
        let mut ids: Vec<u32> = self.token2id.values().copied().collect();
        ids.sort_unstable();
        let remap: HashMap<u32, u32> = ids
            .into_iter()
            .enumerate()
            .map(|(new, old)| (old, new as u32))
            .collect();
        for id in self.token2id.values_mut() {
            *id = remap[&*id];
        }
        self.dfs = std::mem::take(&mut self.dfs)
            .into_iter()
            .filter_map(|(id, df)| remap.get(&id).map(|&new| (new, df)))
            .collect();
    }

    pub fn save(&self, path: impl AsRef<Path>, format: DictFormat) -> Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        match format {
            DictFormat::Text => {
                let mut writer = BufWriter::new(file);
                self.write_text(&mut writer)
                    .and_then(|_| writer.flush())
                    .map_err(|e| Error::io(path, e))?;
            }
            DictFormat::Binary => {
                let mut encoder = BzEncoder::new(BufWriter::new(file), Compression::default());
                serde_json::to_writer(&mut encoder, self)
                    .map_err(|e| Error::io(path, e.into()))?;
                encoder
                    .finish()
                    .and_then(|mut writer| writer.flush())
                    .map_err(|e| Error::io(path, e))?;
            }
        }
        info!(path = %path.display(), ?format, tokens = self.len(), "saved dictionary");
        Ok(())
    }

    fn write_text(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "{}", self.num_docs)?;
        for (token, id) in &self.token2id {
            writeln!(writer, "{}\t{}\t{}", id, token, self.doc_freq(*id))?;
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>, format: DictFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        match format {
            DictFormat::Text => Self::read_text(path, BufReader::new(file)),
            DictFormat::Binary => {
                serde_json::from_reader(BufReader::new(BzDecoder::new(file)))
                    .map_err(|e| Error::parse(path.display().to_string(), e))
            }
        }
    }

    fn read_text(path: &Path, reader: impl BufRead) -> Result<Self> {
        let malformed = |reason: String| Error::Dictionary {
            path: path.to_path_buf(),
            reason,
        };
        let mut lines = reader.lines();
        let header = lines
            .next()
            .ok_or_else(|| malformed("missing header".to_owned()))?
            .map_err(|e| Error::io(path, e))?;
        let num_docs = header
            .trim()
            .parse()
            .map_err(|_| malformed(format!("bad document count {:?}", header)))?;

        let mut dictionary = Self {
            num_docs,
            ..Self::default()
        };
        for (index, line) in lines.enumerate() {
            let line = line.map_err(|e| Error::io(path, e))?;
            if line.is_empty() {
                continue;
            }
            let line_number = index + 2;
            let mut fields = line.splitn(3, '\t');
            let (Some(id), Some(token), Some(df)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed(format!("line {} has fewer than 3 fields", line_number)));
            };
            let id: u32 = id
                .parse()
                .map_err(|_| malformed(format!("bad id on line {}", line_number)))?;
            let df: u64 = df
                .parse()
                .map_err(|_| malformed(format!("bad frequency on line {}", line_number)))?;
            dictionary.token2id.insert(token.to_owned(), id);
            dictionary.dfs.insert(id, df);
        }
        Ok(dictionary)
    }
}

/// Builds a dictionary from raw documents and saves it to `path`.
///
/// Each document is trimmed, lowercased and split on whitespace.
pub fn create_dictionary<I, S>(
    docs: I,
    path: impl AsRef<Path>,
    format: DictFormat,
) -> Result<Dictionary>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dictionary = Dictionary::from_texts(docs, Tokenizer::Plain);
    dictionary.save(path, format)?;
    Ok(dictionary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Dictionary {
        Dictionary::from_texts(
            [
                "  The river rose  ",
                "the RIVER fell",
                "bridges over the river",
            ],
            Tokenizer::Plain,
        )
    }

    #[test]
    fn test_ids_assigned_in_sorted_order_per_document() {
        let dictionary = sample();
        assert_eq!(dictionary.token_id("river"), Some(0));
        assert_eq!(dictionary.token_id("rose"), Some(1));
        assert_eq!(dictionary.token_id("the"), Some(2));
        assert_eq!(dictionary.token_id("fell"), Some(3));
        assert_eq!(dictionary.token_id("bridges"), Some(4));
        assert_eq!(dictionary.token_id("over"), Some(5));
        assert_eq!(dictionary.len(), 6);
    }

    #[test]
    fn test_counts() {
        let dictionary = sample();
        assert_eq!(dictionary.num_docs(), 3);
        assert_eq!(dictionary.num_pos(), 10);
        assert_eq!(dictionary.num_nnz(), 10);
        assert_eq!(dictionary.doc_freq(0), 3);
        assert_eq!(dictionary.doc_freq(3), 1);
    }

    #[test]
    fn test_doc2bow() {
        let dictionary = sample();
        assert_eq!(
            dictionary.doc2bow(["river", "unknown", "the", "river"]),
            vec![(0, 2), (2, 1)]
        );
    }

    #[test]
    fn test_filter_extremes_compactifies() {
        let mut dictionary = sample();
        dictionary.filter_extremes(FilterOptions {
            no_below: 1,
            no_above: 0.5,
            keep_n: None,
        });
        assert_eq!(dictionary.token_id("river"), None);
        assert_eq!(dictionary.token_id("the"), None);
        assert_eq!(dictionary.len(), 4);
        let ids: Vec<u32> = dictionary.id2token().keys().copied().collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(dictionary.token_id("rose"), Some(0));
        assert_eq!(dictionary.token_id("over"), Some(3));
    }

    #[test]
    fn test_filter_extremes_keep_n() {
        let mut dictionary = sample();
        dictionary.filter_extremes(FilterOptions {
            no_below: 1,
            no_above: 1.0,
            keep_n: Some(2),
        });
        assert_eq!(dictionary.len(), 2);
        assert!(dictionary.token_id("river").is_some());
        assert!(dictionary.token_id("the").is_some());
    }

    #[test]
    fn test_text_format_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.txt");
        let dictionary = create_dictionary(["b a", "a"], &path, DictFormat::Text).unwrap();
        assert_eq!(dictionary.len(), 2);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "2\n0\ta\t2\n1\tb\t1\n");

        let loaded = Dictionary::load(&path, DictFormat::Text).unwrap();
        assert_eq!(loaded.token2id(), dictionary.token2id());
        assert_eq!(loaded.num_docs(), 2);
        assert_eq!(loaded.doc_freq(0), 2);
    }

    #[test]
    fn test_binary_format_restores_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.bin");
        let dictionary = create_dictionary(
            ["the river rose", "the river fell"].iter(),
            &path,
            DictFormat::from_flag(false),
        )
        .unwrap();
        let raw = std::fs::read(&path).unwrap();
        assert!(raw.starts_with(b"BZh"));
        assert_eq!(Dictionary::load(&path, DictFormat::Binary).unwrap(), dictionary);
    }

    #[test]
    fn test_load_rejects_malformed_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.txt");
        std::fs::write(&path, "3\n0\tonly-two\n").unwrap();
        assert!(matches!(
            Dictionary::load(&path, DictFormat::Text),
            Err(Error::Dictionary { .. })
        ));
        std::fs::write(&path, "many\n").unwrap();
        assert!(matches!(
            Dictionary::load(&path, DictFormat::Text),
            Err(Error::Dictionary { .. })
        ));
    }

    #[test]
    fn test_tweet_tokenizer() {
        let dictionary = Dictionary::from_texts(["RT @nyc: Snow! #blizzard"], Tokenizer::Tweet);
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.token_id("snow"), Some(0));
    }
}
