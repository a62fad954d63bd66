use std::fmt;

use crate::error::CrawlError;

/// Number of logical columns in a roll table row.
pub const ROLL_COLUMNS: usize = 9;

/// Column names of a roll record, in table order.
pub const ROLL_HEADER: [&str; ROLL_COLUMNS] = [
    "ID", "BD", "CD", "LD", "MD", "Character", "URL", "Purpose", "Time",
];

pub const ID_COLUMN: usize = 0;
pub const URL_COLUMN: usize = 6;
pub const LAST_COLUMN: usize = ROLL_COLUMNS - 1;

/// Returns true for the user-controlled columns (Character, URL, Purpose).
pub fn is_free_text_column(column: usize) -> bool {
    (5..=7).contains(&column)
}

/// Which of the two remote lookup forms to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Look up a single roll by its numeric ID.
    ById,
    /// Look up every roll made by a character.
    ByCharacter,
}

impl QueryKind {
    /// Path of the endpoint on the remote host.
    pub fn endpoint(&self) -> &'static str {
        match self {
            QueryKind::ById => "idlook.php",
            QueryKind::ByCharacter => "dicelook.php",
        }
    }

    /// Form fields submitted for `key`, in wire order.
    pub fn form_fields<'a>(&self, key: &'a str) -> [(&'static str, &'a str); 2] {
        match self {
            QueryKind::ById => [("name", key), ("search", "Search ID!")],
            QueryKind::ByCharacter => [("name", key), ("lets roll!", "Search!")],
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKind::ById => write!(f, "id"),
            QueryKind::ByCharacter => write!(f, "character"),
        }
    }
}

/// Quote and delimiter characters of the DSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    quote: char,
    delimiter: char,
}

impl FormatOptions {
    /// Validates a quote/delimiter pair.
    ///
    /// Both must be single ASCII characters other than CR or LF, and they
    /// must differ from each other.
    pub fn new(quote: char, delimiter: char) -> Result<Self, CrawlError> {
        for (label, c) in [("quote", quote), ("delimiter", delimiter)] {
            if !c.is_ascii() {
                return Err(CrawlError::ConfigError(format!(
                    "{label} must be an ASCII character, got {c:?}"
                )));
            }
            if c == '\n' || c == '\r' {
                return Err(CrawlError::ConfigError(format!(
                    "{label} may not be CR or LF"
                )));
            }
        }
        if quote == delimiter {
            return Err(CrawlError::ConfigError(format!(
                "quote and delimiter cannot be the same character ({quote:?})"
            )));
        }
        Ok(Self { quote, delimiter })
    }

    pub fn quote(&self) -> char {
        self.quote
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// File extension conventionally used for this delimiter.
    pub fn extension(&self) -> &'static str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}

impl Default for FormatOptions {
    /// Double quote and tab.
    fn default() -> Self {
        Self {
            quote: '"',
            delimiter: '\t',
        }
    }
}

/// Character that owns a roll, as found on the by-ID page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCharacter {
    /// Inner markup of the name cell, submitted verbatim to the by-character form.
    pub name: String,
    /// Name with markup removed.
    pub display_name: String,
    /// The name cell wraps the name in one extra element.
    pub decorated: bool,
}

impl ResolvedCharacter {
    /// How many positions the rolls table shifts on the by-character page.
    pub fn table_offset(&self) -> usize {
        usize::from(self.decorated)
    }
}

/// DSV text produced from one by-character page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Newline-terminated records, without header.
    pub dsv: String,
    pub rows: usize,
}

/// Result of one successful crawl cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutput {
    pub id: u64,
    /// Character name as submitted to the remote site.
    pub character: String,
    pub display_name: String,
    /// Newline-terminated DSV records, without header.
    pub dsv: String,
    pub rows: usize,
}
