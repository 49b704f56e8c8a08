//! Rule factoring: frequent or synonymous expression groups are
//! extracted into private rules and replaced by references.

use crate::corpus::{SyntacticTagger, Tokenizer};
use crate::grammar::Rule;
use crate::models::{Result, SyngramError};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// User-supplied map of a term to its synonyms.
pub type Synonyms = HashMap<String, Vec<String>>;

/// Load a synonyms map from a JSON object file.
pub fn read_synonyms(path: &Path) -> Result<Synonyms> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SyngramError::io(format!("reading synonyms file {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| SyngramError::InvalidInput(format!("invalid synonyms file: {e}")))
}

/// Count every section alternative-set across the grammar, keyed by its
/// sorted `|`-joined form.
fn section_counts(rules: &mut [Rule]) -> HashMap<String, usize> {
    rules.sort_by(|a, b| a.render("").cmp(&b.render("")));

    let mut counts = HashMap::new();
    for rule in rules.iter_mut() {
        rule.sort_sections();
        for section in [&rule.pre, &rule.root, &rule.suf] {
            *counts.entry(section.join("|")).or_insert(0) += 1;
        }
    }
    counts
}

/// Candidate groups ordered by frequency descending, then
/// lexicographic. Empty groups and existing rule references are
/// skipped.
fn frequent_groups(counts: &HashMap<String, usize>) -> Vec<String> {
    let mut groups: Vec<String> = counts
        .keys()
        .filter(|g| !g.is_empty() && !g.starts_with('<') && !g.ends_with('>'))
        .cloned()
        .collect();
    groups.sort_by(|a, b| counts[b].cmp(&counts[a]).then_with(|| a.cmp(b)));
    groups
}

fn replace_matching_sections<F>(rule: &mut Rule, factored: &Rule, matches: F)
where
    F: Fn(&[String], &[String]) -> bool,
{
    if factored.root.is_empty() || factored.root == [String::new()] {
        return;
    }
    rule.sort_sections();

    let reference = factored.reference();
    if matches(&rule.pre, &factored.root) {
        rule.pre = vec![reference.clone()];
    }
    if matches(&rule.root, &factored.root) {
        rule.root = vec![reference.clone()];
    }
    if matches(&rule.suf, &factored.root) {
        rule.suf = vec![reference];
    }
}

/// Extract alternative sets occurring more than `min_count` times into
/// private rules, replacing each occurrence with a reference.
pub fn expression_factor(mut rules: Vec<Rule>, min_count: usize) -> Vec<Rule> {
    let counts = section_counts(&mut rules);

    for group in frequent_groups(&counts) {
        if counts[&group] <= min_count {
            continue;
        }
        let alternatives: Vec<String> = group.split('|').map(str::to_string).collect();
        let factored = Rule::factored(alternatives, rules.len() + 1);
        debug!(rule = %factored.render(&factored.name()), "factored expression group");

        for rule in rules.iter_mut() {
            replace_matching_sections(rule, &factored, |a, b| a == b);
        }
        rules.push(factored);
    }
    rules
}

/// Extract groups sharing a constituency signature. The factored rule
/// holds every surface form observed for the signature.
pub fn constituency_factor<T: Tokenizer>(
    mut rules: Vec<Rule>,
    tagger: &SyntacticTagger<T>,
    min_count: usize,
) -> Vec<Rule> {
    let signature = |s: &str| {
        let (tags, _) = tagger.constituency(s);
        tags.join("-")
    };

    // Signature frequency and the surface forms realizing each
    // signature, across every section alternative.
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut forms: HashMap<String, Vec<String>> = HashMap::new();
    for rule in rules.iter() {
        for section in [&rule.pre, &rule.root, &rule.suf] {
            for alt in section {
                if alt.is_empty() || alt.starts_with('<') {
                    continue;
                }
                let sig = signature(alt);
                *counts.entry(sig.clone()).or_insert(0) += 1;
                forms.entry(sig).or_default().push(alt.clone());
            }
        }
    }
    for v in forms.values_mut() {
        v.sort();
        v.dedup();
    }

    let mut signatures = frequent_groups(&counts);
    signatures.retain(|s| counts[s] > min_count);

    for sig in signatures {
        let factored = Rule::factored(forms[&sig].clone(), rules.len() + 1);
        debug!(signature = %sig, rule = %factored.render(&factored.name()), "factored constituency group");

        let section_matches = |a: &[String], _b: &[String]| -> bool {
            a.len() == 1 && !a[0].is_empty() && !a[0].starts_with('<') && signature(&a[0]) == sig
        };
        for rule in rules.iter_mut() {
            replace_matching_sections(rule, &factored, section_matches);
        }
        rules.push(factored);
    }
    rules
}

/// Find `needle` as a contiguous token subsequence of `haystack`.
fn find_subsequence(haystack: &[String], needle: &[String]) -> Option<(usize, usize)> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| &haystack[i..i + needle.len()] == needle)
        .map(|i| (i, i + needle.len()))
}

/// Replace every occurrence of a term or one of its synonyms with a
/// reference to a rule holding the full synonym set, regardless of
/// frequency.
pub fn synonym_factor<T: Tokenizer>(
    mut rules: Vec<Rule>,
    synonyms: &Synonyms,
    tokenizer: &T,
) -> Vec<Rule> {
    let mut terms: Vec<&String> = synonyms.keys().collect();
    terms.sort();

    for term in terms {
        let mut alternatives = synonyms[term].clone();
        alternatives.push(term.clone());
        alternatives.sort();
        alternatives.dedup();

        let factored = Rule::factored(alternatives, rules.len() + 1);
        let reference = factored.reference();
        debug!(term = %term, rule = %factored.render(&factored.name()), "factored synonym group");

        for rule in rules.iter_mut() {
            let haystack = [rule.pre.join(""), rule.root.join(""), rule.suf.join("")].join(" ");
            if !factored.root.iter().any(|s| haystack.contains(s.as_str())) {
                continue;
            }
            rule.sort_sections();
            for section in [&mut rule.pre, &mut rule.root, &mut rule.suf] {
                for alt in section.iter_mut() {
                    for synonym in &factored.root {
                        let needle = tokenizer.tokenize(synonym);
                        loop {
                            let tokens = tokenizer.tokenize(alt);
                            let Some((start, end)) = find_subsequence(&tokens, &needle) else {
                                break;
                            };
                            let mut replaced = tokens[..start].to_vec();
                            replaced.push(reference.clone());
                            replaced.extend_from_slice(&tokens[end..]);
                            *alt = replaced.join(" ");
                        }
                    }
                }
            }
        }
        rules.push(factored);
    }
    rules
}
