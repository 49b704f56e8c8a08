//! Rule merging.
//!
//! Rules are sorted, then adjacent rules whose keyed sections match
//! under the configured comparator are collapsed by unioning every
//! section, so no alternative is lost even when the comparator is
//! fuzzy. Every merge is logged at debug level.

use crate::corpus::{SyntacticTagger, Tokenizer};
use crate::grammar::{
    char_levenshtein, cosine_similarity, count_embed, tfidf_transform, token_levenshtein, Rule,
};
use std::collections::HashMap;
use tracing::debug;

/// Comparator deciding whether two rule sections count as equal for
/// merging purposes.
pub trait Equality {
    fn matches(&self, a: &[String], b: &[String]) -> bool;
}

/// Exact element-wise equality.
pub struct LiteralEqual;

impl Equality for LiteralEqual {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        let eq = a == b;
        if eq {
            debug!(?a, ?b, "literal equality matched");
        }
        eq
    }
}

/// Sections with identical POS signatures match.
pub struct PosEqual<'a, T: Tokenizer> {
    tagger: &'a SyntacticTagger<T>,
}

impl<'a, T: Tokenizer> PosEqual<'a, T> {
    pub fn new(tagger: &'a SyntacticTagger<T>) -> Self {
        Self { tagger }
    }
}

impl<T: Tokenizer> Equality for PosEqual<'_, T> {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        let (sig_a, _) = self.tagger.pos(&a.join(" "));
        let (sig_b, _) = self.tagger.pos(&b.join(" "));
        let eq = sig_a == sig_b;
        if eq {
            debug!(?a, ?b, signature = sig_a.join("-"), "POS equality matched");
        }
        eq
    }
}

/// Sections with identical constituency signatures match.
pub struct ConstituencyEqual<'a, T: Tokenizer> {
    tagger: &'a SyntacticTagger<T>,
}

impl<'a, T: Tokenizer> ConstituencyEqual<'a, T> {
    pub fn new(tagger: &'a SyntacticTagger<T>) -> Self {
        Self { tagger }
    }
}

impl<T: Tokenizer> Equality for ConstituencyEqual<'_, T> {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        let (sig_a, _) = self.tagger.constituency(&a.join(" "));
        let (sig_b, _) = self.tagger.constituency(&b.join(" "));
        let eq = sig_a == sig_b;
        if eq {
            debug!(?a, ?b, signature = sig_a.join("-"), "constituency equality matched");
        }
        eq
    }
}

/// Character-level Levenshtein similarity at or above a threshold.
pub struct CharLevenshteinEqual {
    pub threshold: f64,
}

impl Equality for CharLevenshteinEqual {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        let sim = char_levenshtein(&a.join(" "), &b.join(" "));
        let eq = sim >= self.threshold;
        if eq {
            debug!(?a, ?b, sim, threshold = self.threshold, "char Levenshtein matched");
        }
        eq
    }
}

/// Token-level Levenshtein similarity at or above a threshold.
pub struct TokenLevenshteinEqual {
    pub threshold: f64,
}

impl Equality for TokenLevenshteinEqual {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        let toks_a: Vec<String> = a.join(" ").split(' ').map(str::to_string).collect();
        let toks_b: Vec<String> = b.join(" ").split(' ').map(str::to_string).collect();
        let sim = token_levenshtein(&toks_a, &toks_b);
        let eq = sim >= self.threshold;
        if eq {
            debug!(?a, ?b, sim, threshold = self.threshold, "token Levenshtein matched");
        }
        eq
    }
}

/// TF-IDF cosine similarity at or above a threshold. Sections with
/// out-of-vocabulary tokens never match.
pub struct TfidfCosineEqual<'a, T: Tokenizer> {
    pub threshold: f64,
    pub vocab: &'a [String],
    pub idf: &'a HashMap<String, f64>,
    pub tokenizer: &'a T,
}

impl<T: Tokenizer> Equality for TfidfCosineEqual<'_, T> {
    fn matches(&self, a: &[String], b: &[String]) -> bool {
        let embed = |section: &[String]| -> Option<Vec<f64>> {
            let v = count_embed(&section.join(" "), self.vocab, self.tokenizer).ok()?;
            Some(tfidf_transform(v, self.vocab, self.idf))
        };
        let (Some(v1), Some(v2)) = (embed(a), embed(b)) else {
            debug!(?a, ?b, "section not embeddable, no match");
            return false;
        };
        let Ok(sim) = cosine_similarity(&v1, &v2) else {
            return false;
        };
        let eq = sim >= self.threshold;
        if eq {
            debug!(?a, ?b, sim, threshold = self.threshold, "TF-IDF cosine matched");
        }
        eq
    }
}

fn sort_pr(rules: &mut [Rule]) {
    rules.sort_by(|a, b| a.pre.cmp(&b.pre).then_with(|| a.root.cmp(&b.root)));
}

fn sort_ps(rules: &mut [Rule]) {
    rules.sort_by(|a, b| a.pre.cmp(&b.pre).then_with(|| a.suf.cmp(&b.suf)));
}

fn sort_rs(rules: &mut [Rule]) {
    rules.sort_by(|a, b| a.root.cmp(&b.root).then_with(|| a.suf.cmp(&b.suf)));
}

fn sort_prs(rules: &mut [Rule]) {
    rules.sort_by(|a, b| {
        a.pre
            .cmp(&b.pre)
            .then_with(|| a.root.cmp(&b.root))
            .then_with(|| a.suf.cmp(&b.suf))
    });
}

fn union(a: &[String], b: &[String]) -> Vec<String> {
    let mut out: Vec<String> = a.iter().chain(b).cloned().collect();
    out.sort();
    out.dedup();
    out
}

/// Collapse adjacent rules matching under `check` using `merge`.
fn merge_adjacent<C, M>(mut rules: Vec<Rule>, pass: &str, check: C, merge: M) -> Vec<Rule>
where
    C: Fn(&Rule, &Rule) -> bool,
    M: Fn(&Rule, &Rule) -> Rule,
{
    let mut i = 0;
    while i + 1 < rules.len() {
        if check(&rules[i], &rules[i + 1]) {
            let merged = merge(&rules[i], &rules[i + 1]);
            debug!(
                pass,
                left = %rules[i].render("a"),
                right = %rules[i + 1].render("b"),
                merged = %merged.render("m"),
                "merged rules"
            );
            rules[i] = merged;
            rules.remove(i + 1);
            continue;
        }
        i += 1;
    }
    rules
}

/// Merge adjacent rules whose prefixes match.
pub fn merge_p(mut rules: Vec<Rule>, eq: &dyn Equality) -> Vec<Rule> {
    sort_prs(&mut rules);
    merge_adjacent(
        rules,
        "merge_p",
        |a, b| eq.matches(&a.pre, &b.pre),
        |a, b| Rule {
            pre: union(&a.pre, &b.pre),
            root: union(&a.root, &b.root),
            suf: union(&a.suf, &b.suf),
            public: true,
            id: 0,
        },
    )
}

/// Merge adjacent rules whose roots match.
pub fn merge_r(mut rules: Vec<Rule>, eq: &dyn Equality) -> Vec<Rule> {
    sort_prs(&mut rules);
    merge_adjacent(
        rules,
        "merge_r",
        |a, b| eq.matches(&a.root, &b.root),
        |a, b| Rule {
            pre: union(&a.pre, &b.pre),
            root: union(&a.root, &b.root),
            suf: union(&a.suf, &b.suf),
            public: true,
            id: 0,
        },
    )
}

/// Merge adjacent rules whose suffixes match.
pub fn merge_s(mut rules: Vec<Rule>, eq: &dyn Equality) -> Vec<Rule> {
    sort_prs(&mut rules);
    merge_adjacent(
        rules,
        "merge_s",
        |a, b| eq.matches(&a.suf, &b.suf),
        |a, b| Rule {
            pre: union(&a.pre, &b.pre),
            root: union(&a.root, &b.root),
            suf: union(&a.suf, &b.suf),
            public: true,
            id: 0,
        },
    )
}

/// Merge adjacent rules whose prefixes and roots both match.
pub fn merge_pr(mut rules: Vec<Rule>, eq: &dyn Equality) -> Vec<Rule> {
    sort_pr(&mut rules);
    merge_adjacent(
        rules,
        "merge_pr",
        |a, b| eq.matches(&a.pre, &b.pre) && eq.matches(&a.root, &b.root),
        |a, b| Rule {
            pre: union(&a.pre, &b.pre),
            root: union(&a.root, &b.root),
            suf: union(&a.suf, &b.suf),
            public: true,
            id: 0,
        },
    )
}

/// Merge adjacent rules whose prefixes and suffixes both match.
pub fn merge_ps(mut rules: Vec<Rule>, eq: &dyn Equality) -> Vec<Rule> {
    sort_ps(&mut rules);
    merge_adjacent(
        rules,
        "merge_ps",
        |a, b| eq.matches(&a.pre, &b.pre) && eq.matches(&a.suf, &b.suf),
        |a, b| Rule {
            pre: union(&a.pre, &b.pre),
            root: union(&a.root, &b.root),
            suf: union(&a.suf, &b.suf),
            public: true,
            id: 0,
        },
    )
}

/// Merge adjacent rules whose roots and suffixes both match.
pub fn merge_rs(mut rules: Vec<Rule>, eq: &dyn Equality) -> Vec<Rule> {
    sort_rs(&mut rules);
    merge_adjacent(
        rules,
        "merge_rs",
        |a, b| eq.matches(&a.root, &b.root) && eq.matches(&a.suf, &b.suf),
        |a, b| Rule {
            pre: union(&a.pre, &b.pre),
            root: union(&a.root, &b.root),
            suf: union(&a.suf, &b.suf),
            public: true,
            id: 0,
        },
    )
}

/// Collapse all remaining single-alternative rules into one catch-all
/// rule whose root alternatives are the joined texts of the collapsed
/// rules.
pub fn merge_misc(mut rules: Vec<Rule>) -> Vec<Rule> {
    sort_prs(&mut rules);

    let is_single = |r: &Rule| r.pre.len() <= 1 && r.root.len() <= 1 && r.suf.len() <= 1;

    let mut misc_roots: Vec<String> = Vec::new();
    let mut kept = Vec::with_capacity(rules.len());
    for rule in rules {
        if is_single(&rule) && !rule.is_empty() {
            let joined = [rule.pre.join(" "), rule.root.join(" "), rule.suf.join(" ")]
                .join(" ")
                .trim()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            debug!(text = %joined, "collapsed rule into misc");
            if !misc_roots.contains(&joined) {
                misc_roots.push(joined);
            }
        } else if !is_single(&rule) {
            kept.push(rule);
        }
    }

    if !misc_roots.is_empty() {
        kept.push(Rule {
            pre: Vec::new(),
            root: misc_roots,
            suf: Vec::new(),
            public: true,
            id: 0,
        });
    }

    kept
}
