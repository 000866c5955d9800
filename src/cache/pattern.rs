//! Key pattern translation
//!
//! Callers speak glob (`*` for any run, `?` for one character); the backend
//! filters with SQL `LIKE`. Literal LIKE metacharacters are escaped so a key
//! containing `%` or `_` only matches itself.

/// LIKE pattern matching every key.
pub const MATCH_ALL: &str = "%";

/// A glob translated into the backend's LIKE syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern(String);

impl KeyPattern {
    /// Translates `glob`; `None`, `""` and `"*"` all mean match-all.
    pub fn from_glob(glob: Option<&str>) -> Self {
        let glob = match glob {
            None | Some("") | Some("*") => return Self::match_all(),
            Some(g) => g,
        };

        let mut like = String::with_capacity(glob.len() + 4);
        for ch in glob.chars() {
            match ch {
                '*' => like.push('%'),
                '?' => like.push('_'),
                '%' | '_' | '\\' => {
                    like.push('\\');
                    like.push(ch);
                }
                other => like.push(other),
            }
        }
        Self(like)
    }

    /// Pattern matching every key.
    pub fn match_all() -> Self {
        Self(MATCH_ALL.to_string())
    }

    /// True when the pattern matches every key.
    pub fn is_match_all(&self) -> bool {
        self.0 == MATCH_ALL
    }

    /// The LIKE form sent to the backend.
    pub fn as_like(&self) -> &str {
        &self.0
    }
}
