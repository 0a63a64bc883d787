//! Placeholder rendering
//!
//! Syntax: `{name}` is replaced by the variable `name`, where a name is
//! ASCII letters, digits and underscores. `{{` and `}}` produce literal
//! braces. A lone `}` is kept as text; an unterminated `{` is an error.
//! Substitution is total: a placeholder without a variable fails the render.

use std::collections::HashMap;

use crate::templates::error::TemplateError;

/// Variables available to a render, keyed by placeholder name
pub type TemplateVariables = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Brace(char),
    Placeholder(&'a str),
}

/// Renders `{name}` placeholder templates
pub struct TemplateEngine;

impl TemplateEngine {
    /// Render a template with the given variables
    pub fn render(template: &str, variables: &TemplateVariables) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(template.len());
        for segment in parse(template)? {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Brace(brace) => output.push(brace),
                Segment::Placeholder(name) => {
                    let value = variables
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingVariable(name.to_string()))?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }

    /// Placeholder names in first-use order, without duplicates
    pub fn placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
        let mut names: Vec<String> = Vec::new();
        for segment in parse(template)? {
            if let Segment::Placeholder(name) = segment {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Check template syntax without rendering
    pub fn validate(template: &str) -> Result<(), TemplateError> {
        parse(template).map(|_| ())
    }
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut chars = template.char_indices().peekable();
    let mut text_start = 0;
    let mut line = 1;

    while let Some((index, ch)) = chars.next() {
        match ch {
            '\n' => line += 1,
            '{' => {
                push_text(&mut segments, &template[text_start..index]);

                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    segments.push(Segment::Brace('{'));
                    text_start = index + 2;
                    continue;
                }

                let rest = &template[index + 1..];
                let end = rest.find('}').ok_or_else(|| TemplateError::InvalidSyntax {
                    line,
                    message: "unterminated placeholder".to_string(),
                })?;
                let name = &rest[..end];
                if !is_valid_name(name) {
                    return Err(TemplateError::InvalidSyntax {
                        line,
                        message: format!("invalid placeholder name '{}'", name),
                    });
                }
                segments.push(Segment::Placeholder(name));

                let close = index + 1 + end;
                while matches!(chars.peek(), Some(&(next, _)) if next <= close) {
                    chars.next();
                }
                text_start = close + 1;
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                push_text(&mut segments, &template[text_start..index]);
                chars.next();
                segments.push(Segment::Brace('}'));
                text_start = index + 2;
            }
            _ => {}
        }
    }

    push_text(&mut segments, &template[text_start..]);
    Ok(segments)
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> TemplateVariables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let rendered = TemplateEngine::render(
            "设置参数为最大值{max_value}{unit}，执行{feature_name}",
            &vars(&[("max_value", "250"), ("unit", "毫米"), ("feature_name", "记忆功能")]),
        )
        .unwrap();
        assert_eq!(rendered, "设置参数为最大值250毫米，执行记忆功能");
    }

    #[test]
    fn test_render_missing_variable() {
        let err = TemplateEngine::render("{feature_name}{operation}", &vars(&[("feature_name", "x")]))
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingVariable(name) if name == "operation"));
    }

    #[test]
    fn test_escaped_braces() {
        let rendered = TemplateEngine::render("{{literal}} {name} }", &vars(&[("name", "v")])).unwrap();
        assert_eq!(rendered, "{literal} v }");
    }

    #[test]
    fn test_unterminated_placeholder_reports_line() {
        let err = TemplateEngine::render("第一行\n第二行{feature_name", &TemplateVariables::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidSyntax { line: 2, .. }));
    }

    #[test]
    fn test_invalid_placeholder_name() {
        assert!(matches!(
            TemplateEngine::validate("{功能}"),
            Err(TemplateError::InvalidSyntax { .. })
        ));
        assert!(TemplateEngine::validate("{}").is_err());
    }

    #[test]
    fn test_placeholders_in_order() {
        let names = TemplateEngine::placeholders("{b}{a}{b}{{c}}").unwrap();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_no_placeholders() {
        let rendered = TemplateEngine::render("系统正常启动", &TemplateVariables::new()).unwrap();
        assert_eq!(rendered, "系统正常启动");
    }
}
