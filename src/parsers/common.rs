use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    pub fn parse_source(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter produced no tree"))
    }
}

/// Buffered read of a whole source file.
pub fn read_source(file_path: &Path) -> Result<String> {
    let file =
        File::open(file_path).with_context(|| format!("failed to open {}", file_path.display()))?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader
        .read_to_string(&mut content)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    Ok(content)
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &TSNode<'a>, kind: &str) -> Option<TSNode<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Contiguous comment block directly above `node`, with comment markers
/// stripped and lines joined by `\n`.
pub fn leading_comment(node: &TSNode, source: &[u8]) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        if sibling.kind() != "comment" || sibling.end_position().row + 1 < next_row {
            break;
        }
        let block = strip_comment_markers(extract_text(&sibling, source));
        for line in block.lines().rev() {
            lines.push(line.to_string());
        }
        next_row = sibling.start_position().row;
        current = sibling.prev_sibling();
    }

    lines.reverse();
    let text = lines.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn strip_comment_markers(raw: &str) -> String {
    if let Some(body) = raw.strip_prefix("/*") {
        let body = body.strip_suffix("*/").unwrap_or(body);
        return body
            .lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .collect::<Vec<_>>()
            .join("\n");
    }
    let body = raw.strip_prefix("//").unwrap_or(raw);
    body.strip_prefix(' ').unwrap_or(body).trim_end().to_string()
}
