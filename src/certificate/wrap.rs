// Greedy line wrapping over mixed regular/bold runs
use super::runs::TextRun;
use crate::fonts::Typeface;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    /// Word with its trailing space, newlines removed.
    pub text: String,
    pub bold: bool,
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrappedLine {
    pub words: Vec<PlacedWord>,
}

impl WrappedLine {
    pub fn width(&self) -> f32 {
        self.words.iter().map(|w| w.width).sum()
    }

    pub fn text(&self) -> String {
        self.words.iter().map(|w| w.text.as_str()).collect()
    }
}

/// Split each run on single spaces and give every fragment one trailing
/// space back, tagged with the run's weight.
pub fn words(runs: &[TextRun]) -> Vec<(String, bool)> {
    runs.iter()
        .flat_map(|run| {
            run.text.split(' ').map(move |fragment| {
                let mut word = fragment.replace('\n', "");
                word.push(' ');
                (word, run.bold)
            })
        })
        .collect()
}

/// Pack words into lines no wider than `max_width`. A word wider than the
/// budget on its own still gets a line to itself.
pub fn wrap_runs(
    runs: &[TextRun],
    max_width: f32,
    regular: &dyn Typeface,
    bold: &dyn Typeface,
) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let mut current = WrappedLine::default();
    let mut current_width = 0.0;

    for (text, is_bold) in words(runs) {
        let face = if is_bold { bold } else { regular };
        let width = face.advance(&text);
        if current_width + width > max_width && !current.words.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        current_width += width;
        current.words.push(PlacedWord {
            text,
            bold: is_bold,
            width,
        });
    }

    if !current.words.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::testing::BlockFace;

    fn faces() -> (BlockFace, BlockFace) {
        (BlockFace::new(10.0), BlockFace::new(12.0))
    }

    #[test]
    fn fragments_regain_one_space() {
        let runs = vec![TextRun::regular("has completed "), TextRun::bold("Weld\ning")];
        let words = words(&runs);
        assert_eq!(
            words,
            vec![
                ("has ".to_string(), false),
                ("completed ".to_string(), false),
                (" ".to_string(), false),
                ("Welding ".to_string(), true),
            ]
        );
    }

    #[test]
    fn lines_stay_within_budget() {
        let (regular, bold) = faces();
        let runs = vec![
            TextRun::regular("the quick brown fox jumps over the lazy dog and "),
            TextRun::bold("keeps running"),
            TextRun::regular(" far away"),
        ];
        let lines = wrap_runs(&runs, 100.0, &regular, &bold);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width() <= 100.0, "{:?} is {}", line.text(), line.width());
        }
        let total: usize = lines.iter().map(|l| l.words.len()).sum();
        assert_eq!(total, words(&runs).len());
    }

    #[test]
    fn bold_words_measure_with_bold_face() {
        let (regular, bold) = faces();
        let runs = vec![TextRun::regular("on "), TextRun::bold("July")];
        let lines = wrap_runs(&runs, 1000.0, &regular, &bold);
        assert_eq!(lines.len(), 1);
        let widths: Vec<f32> = lines[0].words.iter().map(|w| w.width).collect();
        assert_eq!(widths, vec![30.0, 10.0, 60.0]);
    }

    #[test]
    fn overlong_word_gets_own_line() {
        let (regular, bold) = faces();
        let runs = vec![TextRun::regular("a supercalifragilistic b")];
        let lines = wrap_runs(&runs, 50.0, &regular, &bold);
        let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
        assert_eq!(texts, vec!["a ", "supercalifragilistic ", "b "]);
        assert!(lines[1].width() > 50.0);
    }

    #[test]
    fn overlong_first_word_does_not_leave_blank_line() {
        let (regular, bold) = faces();
        let runs = vec![TextRun::regular("extraordinarily long")];
        let lines = wrap_runs(&runs, 40.0, &regular, &bold);
        assert!(lines.iter().all(|l| !l.words.is_empty()));
        assert_eq!(lines[0].text(), "extraordinarily ");
    }

    #[test]
    fn words_are_never_split() {
        let (regular, bold) = faces();
        let runs = vec![TextRun::regular("alpha beta gamma delta epsilon")];
        let lines = wrap_runs(&runs, 70.0, &regular, &bold);
        let rebuilt: String = lines.iter().map(|l| l.text()).collect();
        assert_eq!(rebuilt, "alpha beta gamma delta epsilon ");
    }

    #[test]
    fn no_runs_no_lines() {
        let (regular, bold) = faces();
        assert!(wrap_runs(&[], 100.0, &regular, &bold).is_empty());
    }
}
