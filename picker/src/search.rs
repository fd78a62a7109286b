use crate::catalog::{CandidateId, CandidateIndex};

/// Separates the category filter from the needle in the query text.
pub const QUERY_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub category: Option<String>,
    pub needle: String,
}

impl Query {
    /// Parse raw query text. Empty text is not a query (it means "show all").
    ///
    /// `cat/needle` scopes the needle to a category; text without a separator
    /// is an unscoped needle, and so is text with more than one separator,
    /// taken verbatim.
    pub fn parse(text: &str) -> Option<Query> {
        if text.is_empty() {
            return None;
        }
        let parts: Vec<&str> = text.split(QUERY_SEPARATOR).collect();
        if parts.len() == 2 {
            return Some(Query {
                category: Some(parts[0].to_string()),
                needle: parts[1].to_string(),
            });
        }
        Some(Query {
            category: None,
            needle: text.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSet {
    All,
    Filtered(Vec<CandidateId>),
}

impl ResultSet {
    /// Ordered groups of the active set: one per category for `All`, a single
    /// group for `Filtered`.
    pub fn groups<I: CandidateIndex + ?Sized>(&self, index: &I) -> Vec<Vec<CandidateId>> {
        match self {
            ResultSet::All => index
                .categories()
                .iter()
                .map(|c| c.members.clone())
                .collect(),
            ResultSet::Filtered(ids) => vec![ids.clone()],
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ResultSet::All)
    }
}

pub struct SearchEngine<I> {
    index: I,
    text: String,
    result: ResultSet,
}

impl<I: CandidateIndex> SearchEngine<I> {
    pub fn new(index: I) -> Self {
        Self {
            index,
            text: String::new(),
            result: ResultSet::All,
        }
    }

    pub fn set_query_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.result = match Query::parse(text) {
            None => ResultSet::All,
            Some(q) => {
                let ids = self.index.find(q.category.as_deref(), &q.needle);
                log::debug!(
                    "search: category={:?} needle={:?} matches={}",
                    q.category,
                    q.needle,
                    ids.len()
                );
                ResultSet::Filtered(ids)
            }
        };
    }

    /// Re-run the current query (the index may have changed under it).
    pub fn refresh(&mut self) {
        let text = std::mem::take(&mut self.text);
        self.set_query_text(&text);
    }

    pub fn current_result_set(&self) -> &ResultSet {
        &self.result
    }

    pub fn groups(&self) -> Vec<Vec<CandidateId>> {
        self.result.groups(&self.index)
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut I {
        &mut self.index
    }
}
