//! Separator normalization and the four-way variant table.
//!
//! A path-like string can appear in files written with forward slashes,
//! escaped forward slashes, Windows backslashes or escaped backslashes. Every
//! search string is first collapsed to a canonical forward-slash form and then
//! re-expanded through [`SEPARATORS`], so the same index always names the same
//! separator style on both the search and the replace side.

/// The separator encodings, in iteration order: `/`, `//`, `\`, `\\`.
pub const SEPARATORS: [&str; 4] = ["/", "//", "\\", "\\\\"];

/// Converts any mix of single or doubled forward/back slashes to single
/// forward slashes.
///
/// Doubled backslashes are collapsed before single ones so `\\` is never
/// half-converted into `/\` and then matched again.
pub fn normalize(path: &str) -> String {
    path.replace("\\\\", "/")
        .replace('\\', "/")
        .replace("//", "/")
}

/// One search encoding together with the replacement in the same encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPair {
    pub search: String,
    pub replace: String,
}

/// The four index-aligned `(search, replace)` pairs for one request.
#[derive(Debug, Clone)]
pub struct VariantPairs {
    pairs: [VariantPair; 4],
}

impl VariantPairs {
    /// Normalizes both strings and expands them through [`SEPARATORS`].
    pub fn new(search: &str, replace: &str) -> Self {
        let search = normalize(search);
        let replace = normalize(replace);
        let pairs = SEPARATORS.map(|sep| VariantPair {
            search: search.replace('/', sep),
            replace: replace.replace('/', sep),
        });
        Self { pairs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantPair> {
        self.pairs.iter()
    }

    pub fn searches(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|p| p.search.as_str())
    }

    /// Pairs in table order, minus any whose search repeats an earlier one.
    fn distinct(&self) -> impl Iterator<Item = &VariantPair> {
        self.pairs
            .iter()
            .enumerate()
            .filter(|(i, pair)| !self.pairs[..*i].iter().any(|p| p.search == pair.search))
            .map(|(_, pair)| pair)
    }

    /// Counts occurrences of every distinct search variant in `text` as it is.
    ///
    /// Unlike [`apply`](Self::apply), the count never depends on the
    /// replacement strings.
    pub fn count(&self, text: &str) -> usize {
        self.distinct()
            .map(|pair| text.matches(pair.search.as_str()).count())
            .sum()
    }

    /// Applies all four pairs in order, returning the rewritten text and the
    /// number of occurrences replaced.
    ///
    /// Each pair is counted against the text left by the previous pairs. A
    /// pair whose search equals an earlier one is skipped, so a search without
    /// separators is applied exactly once.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut current = text.to_string();
        let mut total = 0;
        for pair in self.distinct() {
            let count = current.matches(pair.search.as_str()).count();
            if count > 0 {
                total += count;
                current = current.replace(pair.search.as_str(), &pair.replace);
            }
        }
        (current, total)
    }
}
