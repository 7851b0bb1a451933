//! Name normalization: raw result-file names to comparable token sets.
//!
//! Normalization is deterministic and infallible. All lookup tables live in
//! an immutable [`NormalizerConfig`] injected at construction time, so tests
//! can run with custom nickname tables and nothing depends on process-global
//! state.

use std::collections::{BTreeMap, BTreeSet};

/// Nickname spelling groups. Every member of a group is comparable with every
/// other member; expansion adds the alternates as extra tokens rather than
/// replacing what the file said.
const DEFAULT_NICKNAME_GROUPS: &[&[&str]] = &[
    &[
        "muhammad", "muhamad", "mohammad", "mohammed", "mohamed", "mohd", "muhd",
    ],
    &["abdul", "abd"],
    &["ahmad", "ahmed"],
    &["nurul", "nur"],
    &["terence", "terance"],
    &["alexander", "alex"],
    &["benjamin", "ben"],
    &["nicholas", "nick", "nic"],
    &["jonathan", "jon"],
    &["michael", "mike"],
    &["william", "will", "bill"],
    &["elizabeth", "liz", "beth"],
    &["katherine", "kate", "katie"],
];

/// Honorifics and courtesy titles dropped from names. Patronymic particles
/// (bin, binti, a/l, a/p) are NOT in this list: they are part of the name and
/// carry matching signal.
const DEFAULT_HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mdm", "madam", "sir", "dr", "en", "encik", "puan", "cik", "tuan",
    "haji", "hajah", "hj", "dato", "datuk", "datin", "tengku", "tunku",
];

/// Immutable normalization tables.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    nickname_groups: Vec<Vec<String>>,
    honorifics: BTreeSet<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_NICKNAME_GROUPS
                .iter()
                .map(|group| group.iter().map(|s| (*s).to_string()).collect()),
            DEFAULT_HONORIFICS.iter().map(|s| (*s).to_string()),
        )
    }
}

impl NormalizerConfig {
    pub fn new(
        nickname_groups: impl IntoIterator<Item = Vec<String>>,
        honorifics: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            nickname_groups: nickname_groups
                .into_iter()
                .map(|group| {
                    group
                        .into_iter()
                        .map(|s| s.to_lowercase())
                        .collect::<Vec<_>>()
                })
                .filter(|group: &Vec<String>| !group.is_empty())
                .collect(),
            honorifics: honorifics.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Tables with no nickname expansion and no honorific stripping.
    pub fn bare() -> Self {
        Self {
            nickname_groups: Vec::new(),
            honorifics: BTreeSet::new(),
        }
    }
}

/// A normalized name: the canonical comparable form of a raw name string.
///
/// Two token views are kept. The *expanded* set contains every nickname
/// alternate alongside the original spelling and exists for recall: a token
/// index over expanded sets finds "Mohd" rows when the query says
/// "Muhammad". The *canonical* set maps each name word to one group
/// representative and exists for counting: shared words are counted once no
/// matter how many alternate spellings a group carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    tokens: BTreeSet<String>,
    canonical: BTreeSet<String>,
    original: String,
}

impl NormalizedName {
    /// Expanded tokens (nickname alternates included), initials included.
    /// This is the set to query a token index with.
    pub fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }

    /// One token per name word, nickname groups collapsed to their
    /// representative. Word-overlap counts are computed on this set.
    pub fn canonical_tokens(&self) -> &BTreeSet<String> {
        &self.canonical
    }

    /// The raw string the tokens were derived from, kept for diagnostics.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Multi-character canonical tokens; the only ones that count toward
    /// matching thresholds. A single initial is not distinguishing.
    pub fn significant_tokens(&self) -> impl Iterator<Item = &str> {
        self.canonical
            .iter()
            .filter(|t| !is_initial(t))
            .map(String::as_str)
    }

    pub fn significant_count(&self) -> usize {
        self.significant_tokens().count()
    }
}

/// True for single-character tokens (initials).
pub fn is_initial(token: &str) -> bool {
    token.chars().count() == 1
}

/// Tokenizes full names into canonical comparable word sets.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    config: NormalizerConfig,
    /// token -> index into `config.nickname_groups`
    nickname_index: BTreeMap<String, usize>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl NameNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let mut nickname_index = BTreeMap::new();
        for (idx, group) in config.nickname_groups.iter().enumerate() {
            for member in group {
                nickname_index.insert(member.clone(), idx);
            }
        }
        Self {
            config,
            nickname_index,
        }
    }

    /// Normalize a raw name. Deterministic, never fails; empty or
    /// whitespace-only input yields an empty token set and the caller decides
    /// whether that is an error.
    pub fn normalize(&self, raw: &str) -> NormalizedName {
        let mut cleaned = String::with_capacity(raw.len());
        for ch in raw.to_lowercase().chars() {
            if ch.is_alphabetic() {
                cleaned.push(ch);
            } else if ch == '/' || ch == '\'' {
                // Joined rather than split: "a/l" stays one token instead of
                // decaying into two initials, "o'brien" stays "obrien".
            } else {
                cleaned.push(' ');
            }
        }

        let raw_tokens: Vec<&str> = cleaned.split_whitespace().collect();

        // Honorifics are noise, but never at the cost of emptying the set.
        let kept: Vec<&str> = raw_tokens
            .iter()
            .copied()
            .filter(|t| !self.config.honorifics.contains(*t))
            .collect();
        let kept = if kept.is_empty() { raw_tokens } else { kept };

        let mut tokens: BTreeSet<String> = kept.iter().map(|t| (*t).to_string()).collect();

        // Canonical view first: each word collapses to its group
        // representative, so "muhd mohd" is one word, not two.
        let canonical = tokens
            .iter()
            .map(|token| match self.nickname_index.get(token) {
                Some(&group_idx) => self.config.nickname_groups[group_idx][0].clone(),
                None => token.clone(),
            })
            .collect();

        // Expanded view second: alternates are added so both spellings are
        // present; the original token always survives.
        let mut expanded: BTreeSet<String> = BTreeSet::new();
        for token in &tokens {
            if let Some(&group_idx) = self.nickname_index.get(token) {
                for member in &self.config.nickname_groups[group_idx] {
                    expanded.insert(member.clone());
                }
            }
        }
        tokens.extend(expanded);

        NormalizedName {
            tokens,
            canonical,
            original: raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(normalizer: &NameNormalizer, raw: &str) -> Vec<String> {
        normalizer.normalize(raw).tokens().iter().cloned().collect()
    }

    #[test]
    fn lowercases_and_strips_punctuation() {
        let normalizer = NameNormalizer::default();
        assert_eq!(
            tokens(&normalizer, "LEE, Elson C."),
            vec!["c", "elson", "lee"]
        );
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let normalizer = NameNormalizer::default();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize("   \t ").is_empty());
        assert!(normalizer.normalize("123 456").is_empty());
    }

    #[test]
    fn patronymic_particles_are_kept() {
        let normalizer = NameNormalizer::default();
        let name = normalizer.normalize("Dhuha Zulfikry bin Hamid");
        assert!(name.tokens().contains("bin"));
    }

    #[test]
    fn slash_particles_collapse_to_one_token() {
        let normalizer = NameNormalizer::default();
        let name = normalizer.normalize("RAJESH A/L KUMARAN");
        assert!(name.tokens().contains("al"));
        assert!(!name.tokens().contains("l"));
    }

    #[test]
    fn honorifics_dropped_unless_set_would_empty() {
        let normalizer = NameNormalizer::default();
        let name = normalizer.normalize("Dato' LIM Keng Yaik");
        assert!(!name.tokens().contains("dato"));

        // A name that is nothing but honorifics keeps its tokens.
        let only = normalizer.normalize("Puan");
        assert_eq!(tokens(&normalizer, "Puan"), vec!["puan"]);
        assert!(!only.is_empty());
    }

    #[test]
    fn nickname_expansion_adds_without_replacing() {
        let normalizer = NameNormalizer::default();
        let name = normalizer.normalize("Muhd Dhuha");
        assert!(name.tokens().contains("muhd"));
        assert!(name.tokens().contains("muhammad"));
        assert!(name.tokens().contains("mohd"));
    }

    #[test]
    fn expansion_is_bidirectional() {
        let normalizer = NameNormalizer::default();
        let formal = normalizer.normalize("Terence Khoo");
        let variant = normalizer.normalize("Terance Khoo");
        let shared: Vec<_> = formal
            .tokens()
            .intersection(variant.tokens())
            .cloned()
            .collect();
        assert!(shared.contains(&"terence".to_string()));
        assert!(shared.contains(&"terance".to_string()));
    }

    #[test]
    fn canonical_view_collapses_nickname_variants() {
        let normalizer = NameNormalizer::default();
        let a = normalizer.normalize("Muhd Dhuha");
        let b = normalizer.normalize("Mohamed Dhuha");
        // Different spellings, identical canonical words.
        assert_eq!(a.canonical_tokens(), b.canonical_tokens());
        assert_eq!(a.canonical_tokens().len(), 2);
    }

    #[test]
    fn initials_are_retained_but_not_significant() {
        let normalizer = NameNormalizer::default();
        let name = normalizer.normalize("LEE C K");
        assert_eq!(name.tokens().len(), 3);
        assert_eq!(name.significant_count(), 1);
    }

    #[test]
    fn custom_tables_are_injectable() {
        let config = NormalizerConfig::new(
            vec![vec!["zul".to_string(), "zulfikry".to_string()]],
            vec!["coach".to_string()],
        );
        let normalizer = NameNormalizer::new(config);
        let name = normalizer.normalize("Coach Zul");
        assert!(name.tokens().contains("zulfikry"));
        assert!(!name.tokens().contains("coach"));
    }

    #[test]
    fn normalization_is_deterministic() {
        let normalizer = NameNormalizer::default();
        let a = normalizer.normalize("Muhd. Dhuha bin Zulfikry");
        let b = normalizer.normalize("Muhd. Dhuha bin Zulfikry");
        assert_eq!(a, b);
    }
}
