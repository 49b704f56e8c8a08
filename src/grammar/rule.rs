//! JSGF grammar rules.
//!
//! A rule holds three alternative sets: the prefixes, roots, and
//! suffixes of the corpus expressions it covers. Rendering produces one
//! JSGF right-hand side per rule.

use crate::corpus::{Text, BOUNDARY_CHARS};

/// One JSGF rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rule {
    /// Prefix alternatives
    pub pre: Vec<String>,

    /// Root alternatives
    pub root: Vec<String>,

    /// Suffix alternatives
    pub suf: Vec<String>,

    /// Public rules are entry points of the grammar
    pub public: bool,

    /// Sequential id assigned by [`set_ids`]; 0 means unassigned
    pub id: usize,
}

impl Rule {
    /// One rule covering a single triplet-split text.
    pub fn from_text(text: &Text) -> Self {
        Self {
            pre: vec![text.pre.clone()],
            root: vec![text.root.clone()],
            suf: vec![text.suf.clone()],
            public: true,
            id: 0,
        }
    }

    /// A private rule holding only factored-out root alternatives.
    pub fn factored(root: Vec<String>, id: usize) -> Self {
        Self {
            pre: Vec::new(),
            root,
            suf: Vec::new(),
            public: false,
            id,
        }
    }

    /// A rule is empty when it has no sections, or only blank
    /// single-alternative sections.
    pub fn is_empty(&self) -> bool {
        let total = self.pre.len() + self.root.len() + self.suf.len();
        if total == 0 {
            return true;
        }
        total <= 3
            && self
                .pre
                .iter()
                .chain(&self.root)
                .chain(&self.suf)
                .all(String::is_empty)
    }

    /// Sort every section in place.
    pub fn sort_sections(&mut self) {
        self.pre.sort();
        self.root.sort();
        self.suf.sort();
    }

    /// Derive the rule name from the root content and id: roots joined
    /// by `_`, angle brackets stripped, truncated to 20 characters,
    /// with a trailing `_{id}` when the id is set.
    pub fn name(&self) -> String {
        let mut base = self.root.join("_").replace(' ', "_");
        base.retain(|c| c != '<' && c != '>');
        let base: String = base.chars().take(20).collect();

        if self.id != 0 {
            format!("{base}_{}", self.id)
        } else {
            base
        }
    }

    /// JSGF reference to this rule.
    pub fn reference(&self) -> String {
        format!("<{}>", self.name())
    }

    /// Render the rule as a JSGF line.
    ///
    /// Each non-empty section is sorted and wrapped in `(...)` with
    /// alternatives joined by `|`; a section containing an empty
    /// alternative is optional and wrapped in `[...]` instead. Empty
    /// rules render as the empty string.
    pub fn render(&self, name: &str) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        if self.public {
            out.push_str("public ");
        }
        out.push_str(&format!("<{name}> ="));

        for section in [&self.pre, &self.root, &self.suf] {
            let rendered = render_section(section);
            if !rendered.is_empty() {
                out.push(' ');
                out.push_str(&rendered);
            }
        }
        out.push(';');

        out
    }
}

/// Render one alternative set: `(a|b)`, `[a|b]` when optional, or ``
/// when nothing remains.
fn render_section(section: &[String]) -> String {
    let mut alts: Vec<String> = section.iter().map(|s| join_boundaries(s)).collect();
    alts.sort();
    alts.dedup();

    let optional = alts.iter().any(String::is_empty);
    alts.retain(|s| !s.is_empty());

    if alts.is_empty() {
        return String::new();
    }
    let joined = alts.join("|");
    if optional {
        format!("[{joined}]")
    } else {
        format!("({joined})")
    }
}

/// Collapse the space the tokenizer inserted before boundary
/// characters.
fn join_boundaries(s: &str) -> String {
    let mut out = s.to_string();
    for c in BOUNDARY_CHARS {
        out = out.replace(&format!(" {c}"), &c.to_string());
    }
    out
}

/// Sort rules by name and number the unassigned ones, so truncated
/// names stay unique. Factored rules keep the id baked into the
/// references that already point at them.
pub fn set_ids(mut rules: Vec<Rule>) -> Vec<Rule> {
    rules.sort_by(|a, b| a.name().cmp(&b.name()));
    let mut next = rules.iter().map(|r| r.id).max().unwrap_or(0) + 1;
    for rule in rules.iter_mut().filter(|r| r.id == 0) {
        rule.id = next;
        next += 1;
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pre: &[&str], root: &[&str], suf: &[&str]) -> Rule {
        Rule {
            pre: pre.iter().map(|s| s.to_string()).collect(),
            root: root.iter().map(|s| s.to_string()).collect(),
            suf: suf.iter().map(|s| s.to_string()).collect(),
            public: true,
            id: 0,
        }
    }

    #[test]
    fn test_is_empty() {
        assert!(Rule::default().is_empty());
        assert!(rule(&[""], &[""], &[""]).is_empty());
        assert!(!rule(&[""], &["x"], &[""]).is_empty());
        assert!(!rule(&["a"], &["b"], &["c"]).is_empty());
    }

    #[test]
    fn test_render_basic() {
        let r = rule(&["please"], &["turn on"], &["the lights"]);
        assert_eq!(
            r.render("lights"),
            "public <lights> = (please) (turn on) (the lights);"
        );
    }

    #[test]
    fn test_render_optional_section() {
        let r = rule(&["", "please"], &["stop"], &[]);
        assert_eq!(r.render("stop"), "public <stop> = [please] (stop);");
    }

    #[test]
    fn test_render_sorts_alternatives() {
        let r = rule(&[], &["b", "a"], &[]);
        assert_eq!(r.render("r"), "public <r> = (a|b);");
    }

    #[test]
    fn test_render_joins_boundaries() {
        let r = rule(&[], &["what time is it ?"], &[]);
        assert_eq!(r.render("r"), "public <r> = (what time is it?);");
    }

    #[test]
    fn test_render_private() {
        let mut r = rule(&[], &["x"], &[]);
        r.public = false;
        assert_eq!(r.render("r"), "<r> = (x);");
    }

    #[test]
    fn test_name() {
        let r = rule(&[], &["turn on the kitchen lights"], &[]);
        assert_eq!(r.name(), "turn_on_the_kitchen_");

        let mut short = rule(&[], &["<other>"], &[]);
        short.id = 3;
        assert_eq!(short.name(), "other_3");
    }

    #[test]
    fn test_set_ids_deterministic() {
        let rules = vec![
            rule(&[], &["zebra"], &[]),
            rule(&[], &["apple"], &[]),
            rule(&[], &["mango"], &[]),
        ];
        let rules = set_ids(rules);
        assert_eq!(rules[0].root, vec!["apple"]);
        assert_eq!(rules[0].id, 1);
        assert_eq!(rules[2].root, vec!["zebra"]);
        assert_eq!(rules[2].id, 3);
    }
}
