//! Scanner output.

use crate::part::Part;

/// One part produced by the scanner together with its main-part verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPart {
    /// The finalised part.
    pub part: Part,
    /// Whether the part qualified as the main part.
    pub is_main: bool,
}

/// Ordered scanner output, validated before it is committed to a
/// [`MultiPart`](crate::MultiPart).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPartList {
    parts: Vec<ParsedPart>,
}

impl ParsedPartList {
    pub(crate) fn push(&mut self, part: Part, is_main: bool) {
        self.parts.push(ParsedPart { part, is_main });
    }

    /// Number of parsed parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether nothing was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of parts marked as main.
    #[must_use]
    pub fn main_count(&self) -> usize {
        self.parts.iter().filter(|parsed| parsed.is_main).count()
    }

    /// Whether exactly one part is marked as main.
    #[must_use]
    pub fn has_exactly_one_main_part(&self) -> bool {
        self.main_count() == 1
    }

    /// Content-ids of all parts; parts without one are listed as an empty
    /// string.
    #[must_use]
    pub fn content_ids(&self) -> Vec<String> {
        self.parts
            .iter()
            .map(|parsed| parsed.part.content_id().unwrap_or_default().to_string())
            .collect()
    }

    /// Iterates over the parsed parts in encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParsedPart> {
        self.parts.iter()
    }
}

impl IntoIterator for ParsedPartList {
    type Item = ParsedPart;
    type IntoIter = std::vec::IntoIter<ParsedPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParsedPartList {
    type Item = &'a ParsedPart;
    type IntoIter = std::slice::Iter<'a, ParsedPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
