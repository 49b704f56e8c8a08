//! JSGF grammar assembly and export.

use crate::grammar::Rule;
use crate::models::{Config, Result, SyngramError};
use std::path::Path;
use tracing::info;

/// A complete JSGF grammar ready for export.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub rules: Vec<Rule>,
}

impl Grammar {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Grammar headers: JSGF declaration, generator line, and an echo
    /// of the effective configuration.
    pub fn front_matter(&self, command: &str, input: &str, config: &Config) -> String {
        let mut out = String::new();
        out.push_str("#JSGF V1.0 ISO8859-1 en;\n");
        out.push_str(&format!(
            "#generated by syngram on {}\n",
            chrono::Utc::now().format("%Y-%m-%d")
        ));

        out.push_str("#cfg: {");
        out.push_str(&format!("\"command\":{command}, "));
        out.push_str(&format!("\"input\":{input}, "));
        for (key, value) in config.summary() {
            out.push_str(&format!("\"{key}\":{value}, "));
        }
        out.push_str("}\n\n");
        out.push_str("grammar main;\n\n");
        out
    }

    /// Grammar body: public rules first, then private rules, each
    /// sorted by rendered form.
    fn body(&self) -> String {
        let mut rules = self.rules.clone();
        rules.sort_by(|a, b| a.render("").cmp(&b.render("")));

        let mut out = String::new();
        for rule in rules.iter().filter(|r| r.public && !r.is_empty()) {
            out.push_str(&rule.render(&rule.name()));
            out.push('\n');
        }
        out.push('\n');
        for rule in rules.iter().filter(|r| !r.public && !r.is_empty()) {
            out.push_str(&rule.render(&rule.name()));
            out.push('\n');
        }
        out.trim().to_string()
    }

    /// Grammar body with a single public `main` rule referencing every
    /// public rule; all other rules are emitted private.
    fn body_main(&self) -> String {
        let main = Rule {
            pre: Vec::new(),
            root: self
                .rules
                .iter()
                .filter(|r| r.public && !r.is_empty())
                .map(Rule::reference)
                .collect(),
            suf: Vec::new(),
            public: true,
            id: 0,
        };

        let mut out = String::new();
        out.push_str(&main.render("main"));
        out.push_str("\n\n");
        for rule in self.rules.iter().filter(|r| !r.is_empty()) {
            let mut rule = rule.clone();
            rule.public = false;
            out.push_str(&rule.render(&rule.name()));
            out.push('\n');
        }
        out.trim().to_string()
    }

    /// Render the full grammar text.
    pub fn render(&self, command: &str, input: &str, config: &Config) -> String {
        let mut out = self.front_matter(command, input, config);
        if config.output.main_rule {
            out.push_str(&self.body_main());
        } else {
            out.push_str(&self.body());
        }
        out.push('\n');
        out
    }

    /// Write the grammar to the configured output path, or stdout when
    /// none is set.
    pub fn write(&self, command: &str, input: &str, config: &Config) -> Result<()> {
        let content = self.render(command, input, config);

        match &config.output.path {
            Some(path) => {
                write_output(path, &content)?;
                info!(path = %path.display(), rules = self.rules.len(), "wrote grammar");
            }
            None => print!("{content}"),
        }
        Ok(())
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| SyngramError::io(format!("writing grammar to {}", path.display()), e))
}
