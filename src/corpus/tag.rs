//! Part-of-speech and shallow constituency tagging.
//!
//! Tags follow the Penn treebank tag set. The POS tagger is
//! deterministic: a closed-class lexicon backed by suffix and shape
//! heuristics. Constituency tags are produced by rewriting adjacent POS
//! tag sequences with a fixed rule table, shortest patterns first.

use crate::corpus::Tokenizer;
use regex::Regex;
use std::collections::HashMap;

/// Closed-class words with unambiguous Penn tags.
const LEXICON: &[(&str, &str)] = &[
    ("a", "DT"),
    ("an", "DT"),
    ("the", "DT"),
    ("this", "DT"),
    ("that", "DT"),
    ("these", "DT"),
    ("those", "DT"),
    ("every", "DT"),
    ("each", "DT"),
    ("some", "DT"),
    ("any", "DT"),
    ("no", "DT"),
    ("all", "PDT"),
    ("both", "PDT"),
    ("half", "PDT"),
    ("and", "CC"),
    ("or", "CC"),
    ("but", "CC"),
    ("nor", "CC"),
    ("yet", "CC"),
    ("of", "IN"),
    ("in", "IN"),
    ("on", "IN"),
    ("at", "IN"),
    ("by", "IN"),
    ("for", "IN"),
    ("with", "IN"),
    ("from", "IN"),
    ("into", "IN"),
    ("onto", "IN"),
    ("over", "IN"),
    ("under", "IN"),
    ("about", "IN"),
    ("after", "IN"),
    ("before", "IN"),
    ("between", "IN"),
    ("through", "IN"),
    ("during", "IN"),
    ("against", "IN"),
    ("without", "IN"),
    ("if", "IN"),
    ("because", "IN"),
    ("while", "IN"),
    ("than", "IN"),
    ("to", "TO"),
    ("i", "PRP"),
    ("you", "PRP"),
    ("he", "PRP"),
    ("she", "PRP"),
    ("it", "PRP"),
    ("we", "PRP"),
    ("they", "PRP"),
    ("me", "PRP"),
    ("him", "PRP"),
    ("her", "PRP"),
    ("us", "PRP"),
    ("them", "PRP"),
    ("my", "PRP$"),
    ("your", "PRP$"),
    ("his", "PRP$"),
    ("its", "PRP$"),
    ("our", "PRP$"),
    ("their", "PRP$"),
    ("can", "MD"),
    ("could", "MD"),
    ("may", "MD"),
    ("might", "MD"),
    ("must", "MD"),
    ("shall", "MD"),
    ("should", "MD"),
    ("will", "MD"),
    ("would", "MD"),
    ("be", "VB"),
    ("am", "VBP"),
    ("are", "VBP"),
    ("is", "VBZ"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("been", "VBN"),
    ("being", "VBG"),
    ("have", "VBP"),
    ("has", "VBZ"),
    ("had", "VBD"),
    ("do", "VBP"),
    ("does", "VBZ"),
    ("did", "VBD"),
    ("done", "VBN"),
    ("not", "RB"),
    ("n't", "RB"),
    ("very", "RB"),
    ("too", "RB"),
    ("also", "RB"),
    ("just", "RB"),
    ("only", "RB"),
    ("here", "RB"),
    ("there", "EX"),
    ("now", "RB"),
    ("then", "RB"),
    ("never", "RB"),
    ("always", "RB"),
    ("often", "RB"),
    ("again", "RB"),
    ("please", "UH"),
    ("oh", "UH"),
    ("yes", "UH"),
    ("okay", "UH"),
    ("hello", "UH"),
    ("what", "WP"),
    ("who", "WP"),
    ("whom", "WP"),
    ("whose", "WP$"),
    ("which", "WDT"),
    ("when", "WRB"),
    ("where", "WRB"),
    ("why", "WRB"),
    ("how", "WRB"),
    ("more", "JJR"),
    ("most", "JJS"),
    ("less", "JJR"),
    ("least", "JJS"),
    ("one", "CD"),
    ("two", "CD"),
    ("three", "CD"),
    ("four", "CD"),
    ("five", "CD"),
    ("six", "CD"),
    ("seven", "CD"),
    ("eight", "CD"),
    ("nine", "CD"),
    ("ten", "CD"),
];

/// Deterministic Penn-tag assigner.
pub struct PosTagger {
    lexicon: HashMap<&'static str, &'static str>,
    number: Regex,
}

impl PosTagger {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            number: Regex::new(r"^\d+([.,]\d+)*$").expect("static regex"),
        }
    }

    /// Tag a single token.
    pub fn tag_one(&self, token: &str) -> String {
        let lower = token.to_lowercase();

        if let Some(tag) = self.lexicon.get(lower.as_str()) {
            return (*tag).to_string();
        }
        match token {
            "." | "?" | "!" => return ".".to_string(),
            "," => return ",".to_string(),
            ":" | ";" => return ":".to_string(),
            "$" => return "$".to_string(),
            "#" => return "#".to_string(),
            _ => {}
        }
        if self.number.is_match(token) {
            return "CD".to_string();
        }

        // Suffix and shape heuristics, checked longest suffix first.
        let tag = if lower.ends_with("ing") && lower.len() > 4 {
            "VBG"
        } else if lower.ends_with("ed") && lower.len() > 3 {
            "VBD"
        } else if lower.ends_with("ly") && lower.len() > 3 {
            "RB"
        } else if lower.ends_with("est") && lower.len() > 4 {
            "JJS"
        } else if lower.ends_with("ous")
            || lower.ends_with("ful")
            || lower.ends_with("ive")
            || lower.ends_with("able")
            || lower.ends_with("al")
        {
            "JJ"
        } else if token.chars().next().is_some_and(char::is_uppercase) {
            if lower.ends_with('s') && lower.len() > 2 {
                "NNPS"
            } else {
                "NNP"
            }
        } else if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 2 {
            "NNS"
        } else {
            "NN"
        };
        tag.to_string()
    }

    /// Tag a token sequence.
    pub fn tag(&self, tokens: &[String]) -> Vec<String> {
        tokens.iter().map(|t| self.tag_one(t)).collect()
    }
}

impl Default for PosTagger {
    fn default() -> Self {
        Self::new()
    }
}

/// One constituency rewrite: a POS/phrase tag pattern collapsed into a
/// single phrase tag.
#[derive(Debug, Clone, Copy)]
struct ConstituencyRule {
    tag: &'static str,
    pattern: &'static [&'static str],
}

macro_rules! con_rule {
    ($tag:literal, [$($p:literal),+]) => {
        ConstituencyRule { tag: $tag, pattern: &[$($p),+] }
    };
}

/// Rewrite table, applied shortest pattern first. Patterns may contain
/// already-rewritten phrase tags, so repeated application builds larger
/// constituents.
const CONSTITUENCY_RULES: &[ConstituencyRule] = &[
    con_rule!("ADJP", ["JJ", "JJ"]),
    con_rule!("ADJP", ["RB", "JJ"]),
    con_rule!("ADJP", ["RB", "VBN"]),
    con_rule!("ADJP", ["RB", "JJR"]),
    con_rule!("ADJP", ["RBR", "JJ"]),
    con_rule!("ADJP", ["RBS", "JJ"]),
    con_rule!("ADJP", ["CD", "NN"]),
    con_rule!("ADJP", ["JJ", "PP"]),
    con_rule!("ADJP", ["ADJP", "PP"]),
    con_rule!("ADJP", ["JJ", "CC", "JJ"]),
    con_rule!("ADJP", ["CD", "CD", "NN"]),
    con_rule!("ADVP", ["RB", "RB"]),
    con_rule!("ADVP", ["RB", "PP"]),
    con_rule!("ADVP", ["RB", "NP"]),
    con_rule!("ADVP", ["IN", "JJS"]),
    con_rule!("CONJP", ["IN", "IN"]),
    con_rule!("CONJP", ["CC", "RB"]),
    con_rule!("CONJP", ["RB", "IN"]),
    con_rule!("CONJP", ["RB", "RB", "IN"]),
    con_rule!("CONJP", ["RB", "TO", "VB"]),
    con_rule!("LST", ["LS", ":"]),
    con_rule!("LST", ["LS", "."]),
    con_rule!("NP", ["DT", "NN"]),
    con_rule!("NP", ["DT", "NNS"]),
    con_rule!("NP", ["JJ", "NN"]),
    con_rule!("NP", ["JJ", "NNS"]),
    con_rule!("NP", ["NN", "NNS"]),
    con_rule!("NP", ["NNP", "NNP"]),
    con_rule!("NP", ["CD", "NN"]),
    con_rule!("NP", ["CD", "NNS"]),
    con_rule!("NP", ["PRP$", "NN"]),
    con_rule!("NP", ["PRP$", "NNS"]),
    con_rule!("NP", ["DT", "JJ", "NN"]),
    con_rule!("NP", ["DT", "NN", "NN"]),
    con_rule!("NP", ["NNP", "NNP", "NNP"]),
    con_rule!("NP", ["NP", "PP"]),
    con_rule!("NP", ["NP", "CC", "NP"]),
    con_rule!("PP", ["IN", "NP"]),
    con_rule!("PP", ["TO", "NP"]),
    con_rule!("QP", ["CD", "CD"]),
    con_rule!("QP", ["IN", "CD"]),
    con_rule!("QP", ["RB", "CD"]),
    con_rule!("QP", ["$", "CD", "CD"]),
    con_rule!("QP", ["IN", "CD", "CD"]),
    con_rule!("QP", ["RBR", "IN", "CD"]),
    con_rule!("QP", ["JJR", "IN", "CD"]),
    con_rule!("QP", ["CD", "TO", "CD"]),
    con_rule!("QP", ["#", "CD", "CD"]),
    con_rule!("WHADJP", ["WRB", "JJ"]),
    con_rule!("WHNP", ["WDT", "NNS"]),
    con_rule!("WHNP", ["WP$", "NNS"]),
    con_rule!("WHNP", ["WRB", "RB"]),
    con_rule!("VP", ["MD", "VP"]),
    con_rule!("VP", ["TO", "VP"]),
    con_rule!("VP", ["VB", "NP"]),
    con_rule!("VP", ["VB", "VP"]),
    con_rule!("VP", ["VBD", "NP"]),
    con_rule!("VP", ["VBD", "VP"]),
    con_rule!("VP", ["VBG", "NP"]),
    con_rule!("VP", ["VBN", "NP"]),
    con_rule!("VP", ["VBP", "NP"]),
    con_rule!("VP", ["VBP", "VP"]),
    con_rule!("VP", ["VBZ", "NP"]),
    con_rule!("VP", ["VBZ", "VP"]),
    con_rule!("VP", ["VP", "CC", "VP"]),
    con_rule!("VP", ["VBN", "NP", "PP"]),
];

/// POS tagging plus constituency rewriting over a tokenizer.
pub struct SyntacticTagger<T: Tokenizer> {
    tagger: PosTagger,
    tokenizer: T,
    rules: Vec<ConstituencyRule>,
}

impl<T: Tokenizer> SyntacticTagger<T> {
    pub fn new(tagger: PosTagger, tokenizer: T) -> Self {
        let mut rules = CONSTITUENCY_RULES.to_vec();
        rules.sort_by_key(|r| r.pattern.len());
        Self {
            tagger,
            tokenizer,
            rules,
        }
    }

    /// POS signature of a string: one tag per token.
    ///
    /// Returns `(tags, tokens)`, index-aligned.
    pub fn pos(&self, s: &str) -> (Vec<String>, Vec<String>) {
        let tokens = self.tokenizer.tokenize(s);
        let tags = self.tagger.tag(&tokens);
        (tags, tokens)
    }

    /// Constituency signature: POS tags rewritten bottom-up with the
    /// rule table. Each rewrite joins the covered surface tokens into
    /// one unit, so `tags` and `units` stay index-aligned.
    pub fn constituency(&self, s: &str) -> (Vec<String>, Vec<String>) {
        let (mut tags, mut units) = self.pos(s);

        loop {
            let mut changed = false;
            for rule in &self.rules {
                let mut i = 0;
                while i + rule.pattern.len() <= tags.len() {
                    let window = &tags[i..i + rule.pattern.len()];
                    if window == rule.pattern {
                        let merged = units[i..i + rule.pattern.len()].join(" ");
                        tags.splice(i..i + rule.pattern.len(), [rule.tag.to_string()]);
                        units.splice(i..i + rule.pattern.len(), [merged]);
                        changed = true;
                    }
                    i += 1;
                }
            }
            if !changed {
                break;
            }
        }

        (tags, units)
    }
}
