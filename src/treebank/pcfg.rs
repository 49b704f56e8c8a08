//! PCFG induction from treebank productions, phrase-rule filtering, and
//! JSON-lines encoding.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::models::Result;

/// Penn phrase-level nonterminals eligible as rule left-hand sides.
pub const PHRASE_LABELS: [&str; 19] = [
    "ADJP", "ADVP", "CONJP", "INTJ", "LST", "NAC", "NP", "NX", "PP", "PRN",
    "PRT", "QP", "RRC", "UCP", "VP", "WHADJP", "WHAVP", "WHNP", "WHPP",
];

/// Penn part-of-speech tags eligible as rule right-hand-side symbols.
pub const POS_TAGS: [&str; 45] = [
    "(", ")", ",", ":", ".", "''", "``", "#", "$", "CC", "CD", "DT", "EX",
    "FW", "IN", "JJ", "JJR", "JJS", "LS", "MD", "NN", "NNP", "NNPS", "NNS",
    "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP", "SYM", "TO", "UH",
    "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "WDT", "WP", "WP$", "WRB",
];

/// One grammar symbol on a production right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    NonTerminal(String),
    Terminal(String),
}

impl Symbol {
    pub fn value(&self) -> &str {
        match self {
            Symbol::NonTerminal(s) | Symbol::Terminal(s) => s,
        }
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::NonTerminal(s) => write!(f, "{s}"),
            Symbol::Terminal(s) => write!(f, "'{s}'"),
        }
    }
}

/// One context-free production.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<Symbol>,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

/// A production with its relative-frequency probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduction {
    pub production: Production,
    pub count: usize,
    pub prob: f64,
}

/// A probabilistic context-free grammar.
#[derive(Debug, Clone)]
pub struct Pcfg {
    pub start: String,
    pub productions: Vec<ScoredProduction>,
}

/// Induce a PCFG from pooled productions by relative frequency: each
/// production's probability is its count over the total count of its
/// left-hand side. Productions come out sorted by lhs, then descending
/// probability, then rhs.
pub fn induce_pcfg(start: &str, productions: &[Production]) -> Pcfg {
    let mut counts: HashMap<&Production, usize> = HashMap::new();
    let mut lhs_totals: HashMap<&str, usize> = HashMap::new();
    for prod in productions {
        *counts.entry(prod).or_insert(0) += 1;
        *lhs_totals.entry(prod.lhs.as_str()).or_insert(0) += 1;
    }

    let mut scored: Vec<ScoredProduction> = counts
        .into_iter()
        .map(|(prod, count)| ScoredProduction {
            production: prod.clone(),
            count,
            prob: count as f64 / lhs_totals[prod.lhs.as_str()] as f64,
        })
        .collect();
    scored.sort_by(|a, b| {
        a.production
            .lhs
            .cmp(&b.production.lhs)
            .then_with(|| b.prob.total_cmp(&a.prob))
            .then_with(|| a.production.rhs.cmp(&b.production.rhs))
    });

    Pcfg {
        start: start.to_string(),
        productions: scored,
    }
}

impl Pcfg {
    /// Productions whose left-hand side is `lhs`, in stored order.
    pub fn productions_for<'a>(
        &'a self,
        lhs: &'a str,
    ) -> impl Iterator<Item = &'a ScoredProduction> {
        self.productions
            .iter()
            .filter(move |sp| sp.production.lhs == lhs)
    }

    /// Phrase rules worth keeping: a phrase-level left-hand side, a
    /// probability of at least `min_prob`, at least two right-hand-side
    /// symbols, and every right-hand-side symbol a plain part-of-speech
    /// tag. Results are grouped by left-hand side in phrase-label order,
    /// most probable first within each group.
    pub fn phrase_rules(&self, min_prob: f64) -> Vec<&ScoredProduction> {
        let mut kept = Vec::new();
        for label in PHRASE_LABELS {
            kept.extend(
                self.productions_for(label)
                    .filter(|sp| sp.prob >= min_prob && is_pos_sequence(&sp.production)),
            );
        }
        kept
    }
}

/// True when the production rewrites to two or more symbols, each of
/// which is a Penn part-of-speech tag containing no annotation dash.
pub fn is_pos_sequence(production: &Production) -> bool {
    production.rhs.len() >= 2
        && production.rhs.iter().all(|sym| {
            sym.is_nonterminal()
                && !sym.value().contains('-')
                && POS_TAGS.contains(&sym.value())
        })
}

/// Encode one production as a single-key JSON object mapping its
/// left-hand side to the ordered right-hand symbols.
pub fn to_json_line(production: &Production) -> Result<String> {
    let rhs = production
        .rhs
        .iter()
        .map(|sym| Value::String(sym.value().to_string()))
        .collect();
    let mut object = Map::new();
    object.insert(production.lhs.clone(), Value::Array(rhs));
    Ok(serde_json::to_string(&Value::Object(object))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(s: &str) -> Symbol {
        Symbol::NonTerminal(s.to_string())
    }

    fn prod(lhs: &str, rhs: &[&str]) -> Production {
        Production {
            lhs: lhs.to_string(),
            rhs: rhs.iter().map(|s| nt(s)).collect(),
        }
    }

    #[test]
    fn test_induce_relative_frequency() {
        let prods = vec![
            prod("NP", &["DT", "NN"]),
            prod("NP", &["DT", "NN"]),
            prod("NP", &["DT", "NN"]),
            prod("NP", &["NNP"]),
            prod("VP", &["VBZ"]),
        ];
        let pcfg = induce_pcfg("S", &prods);

        assert_eq!(pcfg.productions.len(), 3);
        let np: Vec<_> = pcfg.productions_for("NP").collect();
        assert_eq!(np[0].production, prod("NP", &["DT", "NN"]));
        assert_eq!(np[0].count, 3);
        assert!((np[0].prob - 0.75).abs() < 1e-9);
        assert!((np[1].prob - 0.25).abs() < 1e-9);
        let vp: Vec<_> = pcfg.productions_for("VP").collect();
        assert!((vp[0].prob - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_induce_deterministic_order() {
        let prods = vec![
            prod("NP", &["JJ", "NN"]),
            prod("NP", &["DT", "NN"]),
            prod("ADJP", &["RB", "JJ"]),
        ];
        let pcfg = induce_pcfg("S", &prods);
        let lhs: Vec<_> = pcfg
            .productions
            .iter()
            .map(|sp| sp.production.lhs.as_str())
            .collect();
        assert_eq!(lhs, vec!["ADJP", "NP", "NP"]);
        // Equal probabilities fall back to rhs order.
        assert_eq!(pcfg.productions[1].production, prod("NP", &["DT", "NN"]));
    }

    #[test]
    fn test_is_pos_sequence() {
        assert!(is_pos_sequence(&prod("NP", &["DT", "NN"])));
        assert!(is_pos_sequence(&prod("QP", &["$", "CD", "CD"])));
        // Too short.
        assert!(!is_pos_sequence(&prod("NP", &["NNP"])));
        // Phrase label on the right.
        assert!(!is_pos_sequence(&prod("NP", &["NP", "PP"])));
        // Annotated tag.
        assert!(!is_pos_sequence(&prod("NP", &["DT", "NN-HLN"])));
        // Terminal on the right.
        let mut lexical = prod("DT", &["NN"]);
        lexical.rhs = vec![Symbol::Terminal("the".to_string()), nt("NN")];
        assert!(!is_pos_sequence(&lexical));
    }

    #[test]
    fn test_phrase_rules_filters_and_orders() {
        let mut prods = vec![prod("S", &["NP", "VP"])];
        for _ in 0..3 {
            prods.push(prod("NP", &["DT", "NN"]));
        }
        prods.push(prod("NP", &["NNP"]));
        prods.push(prod("VP", &["VB", "NP"]));
        prods.push(prod("ADJP", &["RB", "JJ"]));
        let pcfg = induce_pcfg("S", &prods);

        let rules = pcfg.phrase_rules(0.5);
        let rendered: Vec<_> = rules.iter().map(|sp| sp.production.to_string()).collect();
        // S is not a phrase label, VP -> VB NP has a phrase rhs,
        // NP -> NNP is unary.
        assert_eq!(rendered, vec!["ADJP -> RB JJ", "NP -> DT NN"]);
    }

    #[test]
    fn test_phrase_rules_min_prob() {
        let prods = vec![
            prod("NP", &["DT", "NN"]),
            prod("NP", &["JJ", "NN"]),
            prod("NP", &["JJ", "NN"]),
            prod("NP", &["JJ", "NN"]),
        ];
        let pcfg = induce_pcfg("S", &prods);
        assert_eq!(pcfg.phrase_rules(0.5).len(), 1);
        assert_eq!(pcfg.phrase_rules(0.2).len(), 2);
    }

    #[test]
    fn test_to_json_line() {
        let line = to_json_line(&prod("NP", &["DT", "JJ", "NN"])).unwrap();
        assert_eq!(line, r#"{"NP":["DT","JJ","NN"]}"#);
    }
}
