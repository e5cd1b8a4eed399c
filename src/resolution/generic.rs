/// A type name split into its base, generic arguments and trailing
/// modifiers (`[]`, `[,]`, `?`).
///
/// `Dictionary<string, List<Foo>>[]` parses into base `Dictionary`, two
/// arguments (the second itself generic) and suffix `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub base: String,
    pub args: Vec<TypeName>,
    pub suffix: String,
}

impl TypeName {
    pub fn simple(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            args: Vec::new(),
            suffix: String::new(),
        }
    }

    /// Parses a name. Unbalanced brackets leave the whole string as an
    /// opaque base name.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        let (body, suffix) = split_suffix(trimmed);

        let Some(open) = body.find('<') else {
            return Self {
                base: body.to_string(),
                args: Vec::new(),
                suffix: suffix.to_string(),
            };
        };

        if !body.ends_with('>') {
            return Self::simple(trimmed);
        }

        let inner = &body[open + 1..body.len() - 1];
        let Some(parts) = split_top_level(inner) else {
            return Self::simple(trimmed);
        };

        Self {
            base: body[..open].trim().to_string(),
            args: parts.into_iter().map(TypeName::parse).collect(),
            suffix: suffix.to_string(),
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    /// Canonical rendering: `Base<A, B>suffix`.
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            return format!("{}{}", self.base, self.suffix);
        }
        let args: Vec<String> = self.args.iter().map(TypeName::render).collect();
        format!("{}<{}>{}", self.base, args.join(", "), self.suffix)
    }
}

/// Splits trailing array ranks and nullable markers off a name.
fn split_suffix(name: &str) -> (&str, &str) {
    let mut end = name.len();
    loop {
        let body = name[..end].trim_end();
        if let Some(stripped) = body.strip_suffix('?') {
            end = stripped.len();
        } else if body.ends_with(']') {
            match body.rfind('[') {
                Some(open) if body[open + 1..body.len() - 1].chars().all(|c| c == ',' || c.is_whitespace()) => {
                    end = open;
                }
                _ => break,
            }
        } else {
            end = body.len();
            break;
        }
    }
    (name[..end].trim_end(), name[end..].trim())
}

/// Splits a generic argument list on top-level commas. Returns `None` when
/// angle brackets are unbalanced.
fn split_top_level(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    parts.push(inner[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_generic_with_suffix() {
        let name = TypeName::parse("Dictionary<string,List<Foo>>[]");
        assert_eq!(name.base, "Dictionary");
        assert_eq!(name.args.len(), 2);
        assert_eq!(name.args[1].base, "List");
        assert_eq!(name.args[1].args[0].base, "Foo");
        assert_eq!(name.suffix, "[]");
        assert_eq!(name.render(), "Dictionary<string, List<Foo>>[]");
    }

    #[test]
    fn test_parse_nullable_and_multi_rank() {
        let name = TypeName::parse("int?[,]");
        assert_eq!(name.base, "int");
        assert_eq!(name.suffix, "?[,]");
    }

    #[test]
    fn test_unbalanced_is_opaque() {
        let name = TypeName::parse("Map<K, V");
        assert_eq!(name.base, "Map<K, V");
        assert!(!name.is_generic());
    }

    #[test]
    fn test_render_is_stable() {
        let canonical = "A.B<C.D, E<F>>";
        assert_eq!(TypeName::parse(canonical).render(), canonical);
    }
}
