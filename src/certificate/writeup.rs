// Write-up paragraph: placeholder substitution and punctuation spacing
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WriteupError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("unmatched '{{' in write-up")]
    UnclosedBrace,
    #[error("single '}}' encountered in write-up")]
    StrayClosingBrace,
}

fn space_before_punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+([.,:;!?])").expect("valid punctuation pattern"))
}

/// Substitute `{course}` and `{date}`; `{{` and `}}` are literal braces.
pub fn fill_placeholders(template: &str, course: &str, date: &str) -> Result<String, WriteupError> {
    let template = template.replace("{Course}", "{course}").replace("{Date}", "{date}");
    let mut out = String::with_capacity(template.len() + course.len() + date.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(k) => key.push(k),
                        None => return Err(WriteupError::UnclosedBrace),
                    }
                }
                match key.as_str() {
                    "course" => out.push_str(course),
                    "date" => out.push_str(date),
                    _ => return Err(WriteupError::UnknownPlaceholder(key)),
                }
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(WriteupError::StrayClosingBrace),
            other => out.push(other),
        }
    }

    Ok(out)
}

pub fn tidy_punctuation(text: &str) -> String {
    space_before_punctuation().replace_all(text, "$1").into_owned()
}

/// Final write-up text plus the substitution error, if the fallback sentence
/// had to be used.
pub fn compose_writeup(template: &str, course: &str, date: &str) -> (String, Option<WriteupError>) {
    match fill_placeholders(template, course, date) {
        Ok(text) => (tidy_punctuation(&text), None),
        Err(e) => {
            let fallback = format!(
                "has successfully completed the {} course on {}.",
                course, date
            );
            (fallback, Some(e))
        }
    }
}
