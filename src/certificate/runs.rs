// Splitting a paragraph into bold and regular runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

impl TextRun {
    pub fn regular(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }
}

/// Byte range of the first case-insensitive occurrence of `needle` in
/// `haystack`. Folding is per character, so both ends are char boundaries of
/// the original text.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    for (start, _) in haystack.char_indices() {
        let mut hay = haystack[start..].char_indices();
        let mut matched = true;
        let mut end = start;
        for n in needle.chars() {
            match hay.next() {
                Some((offset, h)) if h.to_lowercase().eq(n.to_lowercase()) => {
                    end = start + offset + h.len_utf8();
                }
                _ => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            return Some((start, end));
        }
    }
    None
}

/// Bold every occurrence of each phrase, first phrase first. Text already in a
/// bold run is never split again. Concatenating the result gives back `text`.
pub fn split_bold(text: &str, phrases: &[&str]) -> Vec<TextRun> {
    let mut runs = vec![TextRun::regular(text)];

    for phrase in phrases.iter().filter(|p| !p.is_empty()) {
        let mut next = Vec::with_capacity(runs.len());
        for run in runs {
            if run.bold {
                next.push(run);
                continue;
            }
            let mut rest = run.text.as_str();
            while let Some((start, end)) = find_case_insensitive(rest, phrase) {
                if start > 0 {
                    next.push(TextRun::regular(&rest[..start]));
                }
                next.push(TextRun::bold(&rest[start..end]));
                rest = &rest[end..];
            }
            if !rest.is_empty() {
                next.push(TextRun::regular(rest));
            }
        }
        runs = next;
    }

    runs
}
