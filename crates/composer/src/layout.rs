//! Headline layout: word wrapping, font-size fitting and highlight scanning.
//!
//! All functions are generic over [`TextMeasure`] so the numeric behavior can
//! be checked without a real font.

/// Pixel width of a run of text at a given font size
pub trait TextMeasure {
    fn text_width(&self, font_size: f32, text: &str) -> f32;
}

/// Bounds and limits for [`fit_text`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub max_width: f32,
    pub max_height: f32,
    pub max_font_size: f32,
    pub min_font_size: f32,
    pub step: f32,
    pub line_height_factor: f32,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_width: 980.0,
            max_height: 254.0,
            max_font_size: 72.0,
            min_font_size: 32.0,
            step: 2.0,
            line_height_factor: 1.2,
        }
    }
}

/// Result of fitting a headline into its box
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font_size: f32,
    pub line_height: f32,
    pub lines: Vec<String>,
}

impl TextLayout {
    pub fn total_height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

/// Greedy word wrap. A word is moved to a new line when appending it would
/// exceed `max_width`; a single word wider than the box sits alone.
pub fn wrap_words<M: TextMeasure + ?Sized>(
    measure: &M,
    font_size: f32,
    text: &str,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if measure.text_width(font_size, &candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shrink from `max_font_size` by `step` until the wrapped text fits
/// `max_height`. Never goes below `min_font_size`; if the floor still
/// overflows the floor layout is returned anyway.
pub fn fit_text<M: TextMeasure + ?Sized>(measure: &M, text: &str, options: &FitOptions) -> TextLayout {
    let floor = options.min_font_size.min(options.max_font_size);
    let step = if options.step > 0.0 { options.step } else { 1.0 };
    let mut font_size = options.max_font_size.max(floor);

    loop {
        let lines = wrap_words(measure, font_size, text, options.max_width);
        let line_height = font_size * options.line_height_factor;
        let layout = TextLayout {
            font_size,
            line_height,
            lines,
        };

        if layout.total_height() <= options.max_height || font_size <= floor {
            return layout;
        }
        font_size = (font_size - step).max(floor);
    }
}

/// Byte range of one highlight occurrence within a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

/// Every case-insensitive occurrence of every phrase in `line`, grouped by
/// phrase in the order given. The scan resumes one character after each
/// match start, so overlapping occurrences are all reported.
pub fn find_highlights<S: AsRef<str>>(line: &str, phrases: &[S]) -> Vec<HighlightSpan> {
    let haystack: Vec<(usize, char)> = line.char_indices().collect();
    let mut spans = Vec::new();

    for phrase in phrases {
        let needle: Vec<char> = phrase.as_ref().chars().collect();
        if needle.is_empty() || needle.len() > haystack.len() {
            continue;
        }

        for start in 0..=(haystack.len() - needle.len()) {
            let matched = haystack[start..start + needle.len()]
                .iter()
                .zip(&needle)
                .all(|((_, a), b)| chars_eq_ignore_case(*a, *b));
            if !matched {
                continue;
            }

            let last = start + needle.len();
            let end = haystack.get(last).map_or(line.len(), |(idx, _)| *idx);
            spans.push(HighlightSpan {
                start: haystack[start].0,
                end,
            });
        }
    }

    spans
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `0.5 * font_size` wide
    struct Monospace;

    impl TextMeasure for Monospace {
        fn text_width(&self, font_size: f32, text: &str) -> f32 {
            text.chars().count() as f32 * font_size * 0.5
        }
    }

    #[test]
    fn wrap_keeps_lines_within_width() {
        let text = "Central bank holds rates steady as inflation cools across the region";
        let max_width = 300.0;
        let lines = wrap_words(&Monospace, 20.0, text, max_width);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Monospace.text_width(20.0, line) <= max_width, "{line:?} overflows");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_places_oversized_word_alone() {
        let lines = wrap_words(&Monospace, 20.0, "a supercalifragilistic b", 100.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap_words(&Monospace, 20.0, "   ", 100.0).is_empty());
    }

    #[test]
    fn fit_picks_largest_size_that_fits() {
        let options = FitOptions {
            max_width: 400.0,
            max_height: 100.0,
            max_font_size: 60.0,
            min_font_size: 20.0,
            step: 10.0,
            line_height_factor: 1.2,
        };
        // 20 chars: at 40px that is 400px wide on one line, 48px tall.
        let layout = fit_text(&Monospace, "twenty characters ab", &options);

        assert_eq!(layout.font_size, 40.0);
        assert_eq!(layout.lines.len(), 1);
        assert!((layout.line_height - 48.0).abs() < 1e-3);
    }

    #[test]
    fn fit_stops_at_floor_when_nothing_fits() {
        let options = FitOptions {
            max_width: 50.0,
            max_height: 10.0,
            max_font_size: 72.0,
            min_font_size: 33.0,
            step: 4.0,
            line_height_factor: 1.2,
        };
        let layout = fit_text(&Monospace, "one two three four five six", &options);

        assert_eq!(layout.font_size, 33.0);
        assert!(layout.total_height() > options.max_height);
    }

    #[test]
    fn fit_terminates_with_degenerate_step() {
        let options = FitOptions {
            step: 0.0,
            max_height: 0.0,
            ..FitOptions::default()
        };
        let layout = fit_text(&Monospace, "word", &options);
        assert_eq!(layout.font_size, options.min_font_size);
    }

    #[test]
    fn highlights_are_case_insensitive() {
        let spans = find_highlights("Rates RISE as markets rise", &["rise"]);
        assert_eq!(
            spans,
            vec![
                HighlightSpan { start: 6, end: 10 },
                HighlightSpan { start: 22, end: 26 },
            ]
        );
    }

    #[test]
    fn highlights_include_overlapping_occurrences() {
        let spans = find_highlights("aaaa", &["aa"]);
        let starts: Vec<usize> = spans.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 1, 2]);
    }

    #[test]
    fn highlights_follow_phrase_order() {
        let spans = find_highlights("Oil prices jump", &["jump", "oil"]);
        assert_eq!(spans[0], HighlightSpan { start: 11, end: 15 });
        assert_eq!(spans[1], HighlightSpan { start: 0, end: 3 });
    }

    #[test]
    fn highlights_use_byte_offsets_for_multibyte_text() {
        let line = "Café crème wins";
        let spans = find_highlights(line, &["CRÈME"]);
        assert_eq!(spans.len(), 1);
        assert_eq!(&line[spans[0].start..spans[0].end], "crème");
    }

    #[test]
    fn empty_phrase_matches_nothing() {
        assert!(find_highlights("anything", &[""]).is_empty());
    }
}
