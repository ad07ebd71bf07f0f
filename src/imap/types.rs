use chrono::NaiveDate;

/// A single IMAP SEARCH term. Only the criteria the tools actually use are
/// modeled; everything else the protocol offers stays out of scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTerm {
    /// `SINCE <date>`: internal date on or after the given day.
    Since(NaiveDate),
    /// `SUBJECT <string>`: subject contains the given substring.
    Subject(String),
}

/// A conjunction of search terms, rendered to an IMAP SEARCH query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    terms: Vec<SearchTerm>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.terms.push(SearchTerm::Since(date));
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.terms.push(SearchTerm::Subject(subject.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Renders the query string handed to UID SEARCH. Dates use the IMAP
    /// `d-MMM-yyyy` format (day not zero-padded); strings are quoted.
    pub fn to_query(&self) -> String {
        self.terms
            .iter()
            .map(|term| match term {
                SearchTerm::Since(date) => format!("SINCE {}", date.format("%-d-%b-%Y")),
                SearchTerm::Subject(subject) => format!("SUBJECT {}", quote(subject)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quotes a string per the IMAP grammar, escaping backslash and DQUOTE.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
