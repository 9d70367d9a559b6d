//! Declaration grammar for the PlantUML-like notation
//!
//! Declarations are recognized by an explicit rule table tried in a fixed
//! order rather than by a pattern-matching library, which keeps the
//! "ignore anything unmatched" behavior trivial to reason about.

use crate::core::ComponentType;

/// How a keyword declaration spells the component name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameForm {
    /// `keyword "Multi Word Name"`
    Quoted,
    /// `keyword Name` or `keyword "Multi Word Name"`
    BareOrQuoted,
}

/// One surface syntax mapped to a component type.
pub(crate) struct DeclarationRule {
    pub keyword: &'static str,
    pub form: NameForm,
    pub component_type: ComponentType,
}

/// Keyword declarations, tried in order. The bracketed `[Name]` form is
/// handled separately because it can occur several times per line.
pub(crate) const DECLARATION_RULES: &[DeclarationRule] = &[
    DeclarationRule {
        keyword: "actor",
        form: NameForm::BareOrQuoted,
        component_type: ComponentType::Actor,
    },
    DeclarationRule {
        keyword: "participant",
        form: NameForm::BareOrQuoted,
        component_type: ComponentType::Component,
    },
    DeclarationRule {
        keyword: "system",
        form: NameForm::BareOrQuoted,
        component_type: ComponentType::SystemBoundary,
    },
    DeclarationRule {
        keyword: "interface",
        form: NameForm::Quoted,
        component_type: ComponentType::Interface,
    },
    DeclarationRule {
        keyword: "package",
        form: NameForm::Quoted,
        component_type: ComponentType::Package,
    },
    DeclarationRule {
        keyword: "database",
        form: NameForm::Quoted,
        component_type: ComponentType::Database,
    },
    DeclarationRule {
        keyword: "queue",
        form: NameForm::Quoted,
        component_type: ComponentType::Queue,
    },
    DeclarationRule {
        keyword: "external",
        form: NameForm::Quoted,
        component_type: ComponentType::ExternalSystem,
    },
];

/// A recognized node declaration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Declaration {
    pub name: String,
    pub alias: Option<String>,
    pub component_type: ComponentType,
}

/// Extract every `[Name]` declaration on the line, each with an optional
/// `as Alias` suffix.
pub(crate) fn bracketed_declarations(line: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find(']') else {
            break;
        };
        let name = after_open[..close].trim();
        let tail = &after_open[close + 1..];
        if !name.is_empty() {
            declarations.push(Declaration {
                name: name.to_string(),
                alias: parse_alias(tail),
                component_type: ComponentType::Component,
            });
        }
        rest = tail;
    }
    declarations
}

/// Match the line against the keyword rule table.
pub(crate) fn match_keyword_rule(line: &str) -> Option<Declaration> {
    for rule in DECLARATION_RULES {
        let Some(rest) = strip_keyword(line, rule.keyword) else {
            continue;
        };
        let parsed = match rule.form {
            NameForm::Quoted => take_quoted(rest),
            NameForm::BareOrQuoted => {
                if rest.starts_with('"') {
                    take_quoted(rest)
                } else {
                    take_bare(rest)
                }
            }
        };
        let Some((name, tail)) = parsed else {
            continue;
        };
        return Some(Declaration {
            name,
            alias: parse_alias(tail),
            component_type: rule.component_type,
        });
    }
    None
}

/// An arrow token located inside a line: byte range plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Arrow {
    pub start: usize,
    pub end: usize,
    pub bidirectional: bool,
}

/// Find the first arrow on the line: one or more `-` followed by one or more
/// `>`, optionally preceded by `<` (which makes it bidirectional).
pub(crate) fn find_arrow(line: &str) -> Option<Arrow> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let mut j = i;
        let bidirectional = bytes[j] == b'<';
        if bidirectional {
            j += 1;
        }
        let shaft_start = j;
        while j < bytes.len() && bytes[j] == b'-' {
            j += 1;
        }
        if j > shaft_start {
            let head_start = j;
            while j < bytes.len() && bytes[j] == b'>' {
                j += 1;
            }
            if j > head_start {
                return Some(Arrow {
                    start: i,
                    end: j,
                    bidirectional,
                });
            }
        }
        i += 1;
    }
    None
}

/// Strip a case-insensitive keyword prefix; the keyword must be followed by
/// whitespace. Returns the remainder with leading whitespace removed.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    let tail = line.get(keyword.len()..)?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    if !tail.starts_with(char::is_whitespace) {
        return None;
    }
    Some(tail.trim_start())
}

fn take_quoted(s: &str) -> Option<(String, &str)> {
    let rest = s.strip_prefix('"')?;
    let close = rest.find('"')?;
    let name = rest[..close].trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), &rest[close + 1..]))
}

fn take_bare(s: &str) -> Option<(String, &str)> {
    let end = s
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((s[..end].to_string(), &s[end..]))
}

/// Parse an optional `as Alias` suffix; anything else trailing is ignored.
fn parse_alias(tail: &str) -> Option<String> {
    let rest = strip_keyword(tail.trim_start(), "as")?;
    let (alias, _) = take_bare(rest)?;
    Some(alias)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracketed_declaration() {
        let declarations = bracketed_declarations("[Frontend]");
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "Frontend");
        assert_eq!(declarations[0].alias, None);
        assert_eq!(declarations[0].component_type, ComponentType::Component);
    }

    #[test]
    fn test_bracketed_declaration_with_alias() {
        let declarations = bracketed_declarations("[Order Service] as OS");
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "Order Service");
        assert_eq!(declarations[0].alias.as_deref(), Some("OS"));
    }

    #[test]
    fn test_multiple_bracketed_declarations_per_line() {
        let declarations = bracketed_declarations("[A] --> [B]");
        let names: Vec<_> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_brackets_ignored() {
        assert!(bracketed_declarations("[  ]").is_empty());
        assert!(bracketed_declarations("no brackets here").is_empty());
    }

    #[test]
    fn test_keyword_rules_cover_the_type_table() {
        let cases = [
            ("actor Bob", "Bob", ComponentType::Actor),
            ("participant Billing", "Billing", ComponentType::Component),
            ("system Warehouse", "Warehouse", ComponentType::SystemBoundary),
            (
                "interface \"Payment API\"",
                "Payment API",
                ComponentType::Interface,
            ),
            ("package \"Shared\"", "Shared", ComponentType::Package),
            ("database \"Main DB\"", "Main DB", ComponentType::Database),
            ("queue \"Events\"", "Events", ComponentType::Queue),
            (
                "external \"Payment Gateway\"",
                "Payment Gateway",
                ComponentType::ExternalSystem,
            ),
        ];
        for (line, name, component_type) in cases {
            let declaration = match_keyword_rule(line)
                .unwrap_or_else(|| panic!("no rule matched {:?}", line));
            assert_eq!(declaration.name, name, "for {:?}", line);
            assert_eq!(declaration.component_type, component_type, "for {:?}", line);
        }
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let declaration = match_keyword_rule("DATABASE \"Ledger\" as L").unwrap();
        assert_eq!(declaration.component_type, ComponentType::Database);
        assert_eq!(declaration.alias.as_deref(), Some("L"));
    }

    #[test]
    fn test_quoted_keyword_without_quotes_does_not_match() {
        assert!(match_keyword_rule("database MainDB").is_none());
    }

    #[test]
    fn test_bare_keyword_accepts_quotes_too() {
        let declaration = match_keyword_rule("actor \"Support Agent\" as SA").unwrap();
        assert_eq!(declaration.name, "Support Agent");
        assert_eq!(declaration.alias.as_deref(), Some("SA"));
    }

    #[test]
    fn test_keyword_prefix_is_not_enough() {
        // "actors" is a different word, not the "actor" keyword
        assert!(match_keyword_rule("actors Bob").is_none());
        assert!(match_keyword_rule("actor").is_none());
    }

    #[test]
    fn test_find_arrow_variants() {
        let unidirectional = find_arrow("A --> B").unwrap();
        assert!(!unidirectional.bidirectional);
        assert_eq!(&"A --> B"[unidirectional.start..unidirectional.end], "-->");

        let short = find_arrow("A -> B").unwrap();
        assert!(!short.bidirectional);

        let long = find_arrow("A ----->> B").unwrap();
        assert!(!long.bidirectional);

        let bidirectional = find_arrow("A <--> B").unwrap();
        assert!(bidirectional.bidirectional);
        assert_eq!(
            &"A <--> B"[bidirectional.start..bidirectional.end],
            "<-->"
        );
    }

    #[test]
    fn test_find_arrow_rejects_non_arrows() {
        assert!(find_arrow("A -- B").is_none());
        assert!(find_arrow("A >> B").is_none());
        assert!(find_arrow("A < - > B").is_none());
        assert!(find_arrow("plain text").is_none());
    }

    #[test]
    fn test_detached_left_head_reads_as_unidirectional() {
        // `<` only counts when glued to the shaft
        let arrow = find_arrow("A < --> B").unwrap();
        assert!(!arrow.bidirectional);
        assert_eq!(&"A < --> B"[arrow.start..arrow.end], "-->");
    }
}
