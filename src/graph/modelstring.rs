use crate::error::{BayesError, Result};

/// Parse a bracketed modelstring like `[A][B|C:D][C|D][D]` into
/// `(node, parents)` groups. Listing order is preserved; the caller sorts.
pub(crate) fn parse(modelstring: &str) -> Result<Vec<(String, Vec<String>)>> {
    let trimmed = modelstring.trim();
    if trimmed.is_empty() {
        return Err(BayesError::Modelstring("empty string".to_string()));
    }
    let mut groups = Vec::new();
    let mut rest = trimmed;
    while !rest.is_empty() {
        if !rest.starts_with('[') {
            return Err(BayesError::Modelstring(format!(
                "expected '[' at {rest:?}"
            )));
        }
        let end = rest
            .find(']')
            .ok_or_else(|| BayesError::Modelstring(format!("unclosed bracket at {rest:?}")))?;
        let body = &rest[1..end];
        rest = &rest[end + 1..];
        let (node, parents) = match body.split_once('|') {
            Some((node, parents)) => (
                node,
                parents.split(':').map(str::to_string).collect::<Vec<_>>(),
            ),
            None => (body, Vec::new()),
        };
        if node.is_empty() || parents.iter().any(String::is_empty) {
            return Err(BayesError::Modelstring(format!(
                "empty name in group [{body}]"
            )));
        }
        groups.push((node.to_string(), parents));
    }
    Ok(groups)
}

/// Emit one bracket group, parents already sorted.
pub(crate) fn format_group(node: &str, parents: &[String]) -> String {
    if parents.is_empty() {
        format!("[{node}]")
    } else {
        format!("[{node}|{}]", parents.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups() {
        let groups = parse("[A][B|C:D][C|D][D]").unwrap();
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0], ("A".to_string(), vec![]));
        assert_eq!(
            groups[1],
            ("B".to_string(), vec!["C".to_string(), "D".to_string()])
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse("").is_err());
        assert!(parse("A][B]").is_err());
        assert!(parse("[A][B|]").is_err());
        assert!(parse("[A][B|C:]").is_err());
        assert!(parse("[A][B").is_err());
        assert!(parse("[]").is_err());
    }

    #[test]
    fn test_format_group() {
        assert_eq!(format_group("A", &[]), "[A]");
        assert_eq!(
            format_group("B", &["C".to_string(), "D".to_string()]),
            "[B|C:D]"
        );
    }
}
