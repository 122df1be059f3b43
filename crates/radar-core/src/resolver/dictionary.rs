//! Local symbol dictionary and the two lookups served from it

use async_trait::async_trait;
use std::collections::HashMap;

use super::ResolveStrategy;
use crate::error::Result;
use crate::model::{Identifier, Market};

/// Well-known listings shipped with the binary, in lookup order
const BUILTIN: &[(&str, Market, &str)] = &[
    ("2330", Market::Primary, "台積電"),
    ("2454", Market::Primary, "聯發科"),
    ("2317", Market::Primary, "鴻海"),
    ("2603", Market::Primary, "長榮"),
    ("2609", Market::Primary, "陽明"),
    ("2615", Market::Primary, "萬海"),
    ("3231", Market::Primary, "緯創"),
    ("2382", Market::Primary, "廣達"),
    ("2357", Market::Primary, "華碩"),
    ("3008", Market::Primary, "大立光"),
    ("2881", Market::Primary, "富邦金"),
    ("2882", Market::Primary, "國泰金"),
    ("2891", Market::Primary, "中信金"),
    ("1101", Market::Primary, "台泥"),
    ("1605", Market::Primary, "華新"),
    ("2303", Market::Primary, "聯電"),
    ("3034", Market::Primary, "聯詠"),
    ("6669", Market::Primary, "緯穎"),
    ("2379", Market::Primary, "瑞昱"),
    ("3037", Market::Primary, "欣興"),
    ("2345", Market::Primary, "智邦"),
    ("2412", Market::Primary, "中華電"),
    ("2308", Market::Primary, "台達電"),
    ("5871", Market::Primary, "中租"),
    ("2395", Market::Primary, "研華"),
    ("1513", Market::Primary, "中興電"),
    ("1519", Market::Primary, "華城"),
    ("3711", Market::Primary, "日月光"),
    ("4904", Market::Primary, "遠傳"),
    ("2409", Market::Primary, "友達"),
    ("3481", Market::Primary, "群創"),
    ("2002", Market::Primary, "中鋼"),
    ("2912", Market::Primary, "統一超"),
    ("1216", Market::Primary, "統一"),
    ("6505", Market::Primary, "台塑化"),
    ("1301", Market::Primary, "台塑"),
    ("0050", Market::Primary, "元大台灣50"),
    ("0056", Market::Primary, "元大高股息"),
    ("00878", Market::Primary, "國泰永續高股息"),
    ("6488", Market::Secondary, "環球晶"),
    ("5347", Market::Secondary, "世界"),
    ("3293", Market::Secondary, "鈊象"),
    ("8069", Market::Secondary, "元太"),
];

/// In-memory name/code table with O(1) exact lookups
#[derive(Debug, Clone, Default)]
pub struct SymbolDictionary {
    entries: Vec<Identifier>,
    by_name: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl SymbolDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary preloaded with the built-in listings
    pub fn builtin() -> Self {
        Self::new().with_entries(
            BUILTIN
                .iter()
                .map(|&(code, market, name)| Identifier::new(code, market, name)),
        )
    }

    /// Append entries. The first entry for a given name, symbol or code wins.
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = Identifier>) -> Self {
        for entry in entries {
            self.insert(entry);
        }
        self
    }

    pub fn insert(&mut self, entry: Identifier) {
        let index = self.entries.len();
        self.by_name
            .entry(normalize(&entry.display_name))
            .or_insert(index);
        self.by_symbol.entry(entry.symbol().to_uppercase()).or_insert(index);
        self.by_code.entry(entry.code.to_uppercase()).or_insert(index);
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact display name, canonical symbol, or bare code
    pub fn lookup_exact(&self, query: &str) -> Option<&Identifier> {
        let query = query.trim();
        let upper = query.to_uppercase();
        self.by_name
            .get(&normalize(query))
            .or_else(|| self.by_symbol.get(&upper))
            .or_else(|| self.by_code.get(&upper))
            .map(|&index| &self.entries[index])
    }

    /// First entry, in insertion order, whose display name contains `query`
    pub fn lookup_substring(&self, query: &str) -> Option<&Identifier> {
        let needle = normalize(query);
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| normalize(&entry.display_name).contains(&needle))
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Strategy 1: exact dictionary hit
pub struct ExactMatch {
    dictionary: SymbolDictionary,
}

impl ExactMatch {
    pub fn new(dictionary: SymbolDictionary) -> Self {
        Self { dictionary }
    }
}

#[async_trait]
impl ResolveStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "dictionary-exact"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Identifier>> {
        Ok(self.dictionary.lookup_exact(query).cloned())
    }
}

/// Strategy 2: partial display name
pub struct SubstringMatch {
    dictionary: SymbolDictionary,
}

impl SubstringMatch {
    pub fn new(dictionary: SymbolDictionary) -> Self {
        Self { dictionary }
    }
}

#[async_trait]
impl ResolveStrategy for SubstringMatch {
    fn name(&self) -> &'static str {
        "dictionary-substring"
    }

    async fn resolve(&self, query: &str) -> Result<Option<Identifier>> {
        Ok(self.dictionary.lookup_substring(query).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_by_name_symbol_and_code() {
        let dict = SymbolDictionary::builtin();

        let by_name = dict.lookup_exact("台積電").unwrap();
        assert_eq!(by_name.symbol(), "2330.TW");

        let by_symbol = dict.lookup_exact("6488.two").unwrap();
        assert_eq!(by_symbol.display_name, "環球晶");

        let by_code = dict.lookup_exact(" 6488 ").unwrap();
        assert_eq!(by_code.market, Market::Secondary);

        assert!(dict.lookup_exact("台積").is_none());
        assert!(dict.lookup_exact("6488.TW").is_none());
    }

    #[test]
    fn test_exact_prefers_full_name_over_substring() {
        let dict = SymbolDictionary::builtin();
        // 統一 is both a full name and a prefix of 統一超, which is listed first
        assert_eq!(dict.lookup_exact("統一").unwrap().code, "1216");
        assert_eq!(dict.lookup_substring("統一").unwrap().code, "2912");
    }

    #[test]
    fn test_substring_uses_insertion_order() {
        let dict = SymbolDictionary::new().with_entries([
            Identifier::new("1", Market::Primary, "Alpha Tech"),
            Identifier::new("2", Market::Primary, "Beta Tech"),
        ]);
        assert_eq!(dict.lookup_substring("tech").unwrap().code, "1");
        assert_eq!(dict.lookup_substring("beta").unwrap().code, "2");
        assert!(dict.lookup_substring("").is_none());
        assert!(dict.lookup_substring("gamma").is_none());
    }

    #[test]
    fn test_first_insert_wins_for_duplicate_codes() {
        let dict = SymbolDictionary::new().with_entries([
            Identifier::new("1234", Market::Primary, "First"),
            Identifier::new("1234", Market::Secondary, "Second"),
        ]);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.lookup_exact("1234").unwrap().display_name, "First");
        assert_eq!(dict.lookup_exact("1234.TWO").unwrap().display_name, "Second");
    }

    #[tokio::test]
    async fn test_strategies_wrap_lookups() {
        let exact = ExactMatch::new(SymbolDictionary::builtin());
        let partial = SubstringMatch::new(SymbolDictionary::builtin());

        assert_eq!(exact.resolve("2330").await.unwrap().unwrap().display_name, "台積電");
        assert!(exact.resolve("聯發").await.unwrap().is_none());
        assert_eq!(partial.resolve("聯發").await.unwrap().unwrap().code, "2454");
    }
}
