//! Penn-style bracketed parse trees.

use crate::models::{Result, SyngramError};
use crate::treebank::{Production, Symbol};

/// One parse tree: labelled internal nodes over word leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Node { label: String, children: Vec<Tree> },
    Leaf(String),
}

impl Tree {
    /// Symbol this tree contributes to its parent's production.
    pub fn symbol(&self) -> Symbol {
        match self {
            Tree::Node { label, .. } => Symbol::NonTerminal(label.clone()),
            Tree::Leaf(word) => Symbol::Terminal(word.clone()),
        }
    }

    /// All productions of this tree: one per internal node, mapping its
    /// label to the symbols of its children, in depth-first order.
    pub fn productions(&self) -> Vec<Production> {
        let mut out = Vec::new();
        self.collect_productions(&mut out);
        out
    }

    fn collect_productions(&self, out: &mut Vec<Production>) {
        if let Tree::Node { label, children } = self {
            out.push(Production {
                lhs: label.clone(),
                rhs: children.iter().map(Tree::symbol).collect(),
            });
            for child in children {
                child.collect_productions(out);
            }
        }
    }

    /// Leaf words in order.
    pub fn leaves(&self) -> Vec<&str> {
        match self {
            Tree::Leaf(word) => vec![word.as_str()],
            Tree::Node { children, .. } => {
                children.iter().flat_map(Tree::leaves).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open(usize),
    Close(usize),
    Atom(usize, String),
}

fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut atom_start = None;

    for (i, c) in source.char_indices() {
        if c == '(' || c == ')' || c.is_whitespace() {
            if let Some(start) = atom_start.take() {
                tokens.push(Token::Atom(start, source[start..i].to_string()));
            }
            match c {
                '(' => tokens.push(Token::Open(i)),
                ')' => tokens.push(Token::Close(i)),
                _ => {}
            }
        } else if atom_start.is_none() {
            atom_start = Some(i);
        }
    }
    if let Some(start) = atom_start {
        tokens.push(Token::Atom(start, source[start..].to_string()));
    }
    tokens
}

/// Parse every bracketed tree in `source`.
///
/// The conventional extra wrapping parens of treebank files
/// (`( (S ...) )`) are stripped. `path` is only used in error messages.
pub fn parse_trees(source: &str, path: &str) -> Result<Vec<Tree>> {
    let tokens = lex(source);
    let mut trees = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match &tokens[pos] {
            Token::Open(_) => {
                let (tree, next) = parse_node(&tokens, pos, path)?;
                trees.push(unwrap_root(tree));
                pos = next;
            }
            Token::Close(offset) => {
                return Err(SyngramError::tree_parse(path, *offset, "unbalanced ')'"));
            }
            Token::Atom(offset, atom) => {
                return Err(SyngramError::tree_parse(
                    path,
                    *offset,
                    format!("stray token {atom:?} outside tree"),
                ));
            }
        }
    }
    Ok(trees)
}

/// Parse one `( label child* )` node starting at `pos` (an `Open`
/// token). Returns the node and the position after its closing paren.
fn parse_node(tokens: &[Token], pos: usize, path: &str) -> Result<(Tree, usize)> {
    let open_offset = match tokens[pos] {
        Token::Open(offset) => offset,
        _ => {
            return Err(SyngramError::Internal(
                "parse_node called off an open paren".to_string(),
            ))
        }
    };
    let mut pos = pos + 1;

    // Optional label; absent when the node is a bare wrapper.
    let label = match tokens.get(pos) {
        Some(Token::Atom(_, atom)) => {
            pos += 1;
            atom.clone()
        }
        _ => String::new(),
    };

    let mut children = Vec::new();
    loop {
        match tokens.get(pos) {
            Some(Token::Open(_)) => {
                let (child, next) = parse_node(tokens, pos, path)?;
                children.push(child);
                pos = next;
            }
            Some(Token::Atom(_, word)) => {
                children.push(Tree::Leaf(word.clone()));
                pos += 1;
            }
            Some(Token::Close(offset)) => {
                if label.is_empty() && children.is_empty() {
                    return Err(SyngramError::tree_parse(path, *offset, "empty node"));
                }
                return Ok((
                    Tree::Node {
                        label,
                        children,
                    },
                    pos + 1,
                ));
            }
            None => {
                return Err(SyngramError::tree_parse(
                    path,
                    open_offset,
                    "unclosed '(' at end of input",
                ));
            }
        }
    }
}

/// Strip a label-less single-child wrapper node.
fn unwrap_root(tree: Tree) -> Tree {
    match tree {
        Tree::Node {
            ref label,
            ref children,
        } if label.is_empty() && children.len() == 1 => children[0].clone(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(s: &str) -> Symbol {
        Symbol::NonTerminal(s.to_string())
    }

    fn term(s: &str) -> Symbol {
        Symbol::Terminal(s.to_string())
    }

    #[test]
    fn test_parse_simple_tree() {
        let trees = parse_trees("(S (NP (DT the) (NN dog)) (VP (VBZ barks)))", "t").unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].leaves(), vec!["the", "dog", "barks"]);
    }

    #[test]
    fn test_parse_strips_wrapper() {
        let trees = parse_trees("( (S (NP (NN dogs)) (VP (VBP bark))) )", "t").unwrap();
        let Tree::Node { label, .. } = &trees[0] else {
            panic!("expected node");
        };
        assert_eq!(label, "S");
    }

    #[test]
    fn test_parse_multiple_trees() {
        let source = "( (S (NN a)) )\n( (S (NN b)) )";
        let trees = parse_trees(source, "t").unwrap();
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn test_productions() {
        let trees = parse_trees("(S (NP (DT the) (NN dog)) (VP (VBZ barks)))", "t").unwrap();
        let prods = trees[0].productions();

        assert_eq!(
            prods[0],
            Production {
                lhs: "S".to_string(),
                rhs: vec![nt("NP"), nt("VP")],
            }
        );
        assert!(prods.contains(&Production {
            lhs: "NP".to_string(),
            rhs: vec![nt("DT"), nt("NN")],
        }));
        assert!(prods.contains(&Production {
            lhs: "DT".to_string(),
            rhs: vec![term("the")],
        }));
        assert_eq!(prods.len(), 6);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_trees("(S (NP", "t").unwrap_err(),
            SyngramError::TreeParse { .. }
        ));
        assert!(matches!(
            parse_trees(") oops", "t").unwrap_err(),
            SyngramError::TreeParse { .. }
        ));
        assert!(matches!(
            parse_trees("word", "t").unwrap_err(),
            SyngramError::TreeParse { .. }
        ));
        assert!(parse_trees("", "t").unwrap().is_empty());
    }

    #[test]
    fn test_parse_annotated_labels() {
        let trees = parse_trees("(S (NP-SBJ (-NONE- *)) (VP (VB go)))", "t").unwrap();
        let prods = trees[0].productions();
        assert_eq!(prods[0].rhs, vec![nt("NP-SBJ"), nt("VP")]);
        assert!(prods.contains(&Production {
            lhs: "-NONE-".to_string(),
            rhs: vec![term("*")],
        }));
    }
}
