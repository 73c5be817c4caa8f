//! Keyword matching shared by the repair and classification tables.
//!
//! Text is folded to lowercase without Spanish diacritics before matching, and
//! keywords are stored already folded. Keywords of up to three characters
//! (`ceo`, `qa`, `ey`, `jr`) only match whole tokens so that `cto` does not
//! fire inside `proyecto`; longer keywords match anywhere.

const WHOLE_TOKEN_MAX_CHARS: usize = 3;

pub fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' | 'ē' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct KeywordSet(pub &'static [&'static str]);

impl KeywordSet {
    /// `folded` must already have gone through [`fold`].
    pub fn matches(&self, folded: &str) -> bool {
        self.0.iter().any(|kw| keyword_matches(folded, kw))
    }
}

fn keyword_matches(haystack: &str, keyword: &str) -> bool {
    if keyword.chars().count() > WHOLE_TOKEN_MAX_CHARS {
        return haystack.contains(keyword);
    }
    haystack
        .match_indices(keyword)
        .any(|(start, _)| is_boundary(haystack, start, start + keyword.len()))
}

fn is_boundary(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// An ordered list of (label, keywords); the first group that matches wins.
#[derive(Debug, Clone, Copy)]
pub struct OrderedGroups {
    pub groups: &'static [(&'static str, KeywordSet)],
    pub fallback: Option<&'static str>,
}

impl OrderedGroups {
    pub fn first_match(&self, folded: &str) -> Option<&'static str> {
        self.groups
            .iter()
            .find(|(_, kws)| kws.matches(folded))
            .map(|(label, _)| *label)
    }

    pub fn label(&self, folded: &str) -> Option<&'static str> {
        self.first_match(folded).or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_accents_and_case() {
        assert_eq!(fold("Líder de Tecnología"), "lider de tecnologia");
        assert_eq!(fold("COMPAÑÍA"), "compania");
        assert_eq!(fold("Nestlé"), "nestle");
    }

    #[test]
    fn short_keywords_match_whole_tokens() {
        let set = KeywordSet(&["cto", "qa"]);
        assert!(set.matches("cto regional"));
        assert!(set.matches("analista qa/testing"));
        assert!(!set.matches("jefe de proyecto"));
        assert!(!set.matches("aquarium"));
    }

    #[test]
    fn punctuated_short_keyword() {
        let set = KeywordSet(&["jr."]);
        assert!(set.matches("analista jr. de datos"));
        assert!(!set.matches("jrx"));
    }

    #[test]
    fn long_keywords_match_substrings() {
        let set = KeywordSet(&["desarrollador"]);
        assert!(set.matches("desarrolladora backend"));
    }

    #[test]
    fn ordered_groups_first_wins() {
        const G: OrderedGroups = OrderedGroups {
            groups: &[
                ("A", KeywordSet(&["data"])),
                ("B", KeywordSet(&["data scientist"])),
            ],
            fallback: Some("Otros"),
        };
        assert_eq!(G.label("senior data scientist"), Some("A"));
        assert_eq!(G.label("contador"), Some("Otros"));
        assert_eq!(G.first_match("contador"), None);
    }
}
