//! Page layout for the plan export
//!
//! Coordinates are in points measured from the top-left corner of an A4
//! page; the writer flips them into PDF space.

use crate::models::{MealSlot, Plan};
use crate::render::{NO_SNACKS, PLACEHOLDER};

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN: f64 = 40.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - MARGIN * 2.0;

pub const TITLE_SIZE: f64 = 20.0;
pub const SECTION_SIZE: f64 = 14.0;
pub const DAY_SIZE: f64 = 12.0;
pub const BODY_SIZE: f64 = 10.0;
pub const FOOTER_SIZE: f64 = BODY_SIZE - 2.0;

pub const LINE_HEIGHT: f64 = 14.0;
/// Cursor position on a fresh page
pub const TOP: f64 = 40.0;
/// A block needing `min` points breaks when `y + min` passes this
pub const BLOCK_LIMIT: f64 = 780.0;
/// A wrapped line breaks when the cursor is already past this
pub const LINE_LIMIT: f64 = 760.0;
pub const DEFAULT_BLOCK_MIN: f64 = 30.0;
pub const SECTION_BLOCK_MIN: f64 = 40.0;

const FOOTER_X: f64 = PAGE_WIDTH - 60.0;
const FOOTER_Y: f64 = 820.0;
const ITEM_INDENT: f64 = MARGIN + 20.0;

pub const PRIMARY: Rgb = Rgb(0x4F, 0x46, 0xE5);
pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
pub const LIGHT_TEXT: Rgb = Rgb(0x66, 0x66, 0x66);

pub const TITLE: &str = "AI Fitness Coach";
pub const SUBTITLE: &str = "Your Personalized Fitness Plan";
pub const WORKOUT_HEADER: &str = "7-Day Workout Plan";
pub const DIET_HEADER: &str = "7-Day Diet Plan";
pub const TIPS_HEADER: &str = "Tips & Motivation";

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// A single drawing instruction on a page
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Text with its baseline at `y`
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: Rgb,
        text: String,
    },
    /// Stroked line
    Rule {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Rgb,
    },
    /// Filled rectangle whose top edge is at `y`
    Bar {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text of every text op, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Laid-out export, ready for serialization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanDocument {
    pub pages: Vec<Page>,
}

impl PlanDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Helvetica advance width in 1/1000 em
fn helvetica_width(c: char) -> u32 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
        1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
        667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
        333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
        556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
    ];
    match c {
        ' '..='~' => u32::from(ASCII[c as usize - 0x20]),
        '•' => 350,
        '×' => 584,
        '—' => 1000,
        '“' | '”' => 333,
        _ => 556,
    }
}

/// Rendered width of `text` in points at `size`
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text.chars().map(helvetica_width).sum();
    f64::from(units) * size / 1000.0
}

/// Greedy word wrap to `max_width` points
///
/// Explicit newlines start a new line; a word wider than a whole line is
/// broken between characters. Empty input yields one empty line.
pub fn wrap_text(text: &str, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width(&candidate, size) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if text_width(word, size) <= max_width {
                line = word.to_string();
                continue;
            }

            for c in word.chars() {
                let mut next = line.clone();
                next.push(c);
                if !line.is_empty() && text_width(&next, size) > max_width {
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                } else {
                    line = next;
                }
            }
        }
        lines.push(line);
    }

    lines
}

fn text_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(placeholder)
}

struct Cursor {
    pages: Vec<Page>,
    y: f64,
    page_number: u32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP,
            page_number: 1,
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, x: f64, size: f64, font: Font, color: Rgb, text: impl Into<String>) {
        let y = self.y;
        self.push(DrawOp::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.into(),
        });
    }

    fn footer(&mut self) {
        let label = format!("Page {}", self.page_number);
        self.push(DrawOp::Text {
            x: FOOTER_X,
            y: FOOTER_Y,
            size: FOOTER_SIZE,
            font: Font::Regular,
            color: LIGHT_TEXT,
            text: label,
        });
        self.page_number += 1;
    }

    /// Close the current page with its footer and start another
    fn break_page(&mut self) {
        self.footer();
        self.pages.push(Page::default());
        self.y = TOP;
    }

    fn ensure_space(&mut self, min: f64) {
        if self.y + min > BLOCK_LIMIT {
            self.break_page();
        }
    }

    fn section_header(&mut self, title: &str) {
        self.ensure_space(SECTION_BLOCK_MIN);
        let y = self.y;
        self.push(DrawOp::Bar {
            x: 0.0,
            y: y - 20.0,
            width: PAGE_WIDTH,
            height: 30.0,
            color: PRIMARY,
        });
        self.text(MARGIN, SECTION_SIZE, Font::Bold, WHITE, title);
        self.y += 30.0;
    }

    fn day_title(&mut self, title: String) {
        self.ensure_space(DEFAULT_BLOCK_MIN);
        self.text(MARGIN, DAY_SIZE, Font::Bold, BLACK, title);
        self.y += 18.0;
    }

    fn wrapped(&mut self, text: &str, indent: f64) {
        for line in wrap_text(text, BODY_SIZE, CONTENT_WIDTH) {
            if self.y > LINE_LIMIT {
                self.break_page();
            }
            self.text(indent, BODY_SIZE, Font::Regular, BLACK, line);
            self.y += LINE_HEIGHT;
        }
    }

    fn finish(mut self) -> PlanDocument {
        self.footer();
        PlanDocument { pages: self.pages }
    }
}

/// Lay out a plan: title block, then workout, diet and tips sections,
/// each section starting on its own page
pub fn layout_plan(plan: &Plan) -> PlanDocument {
    let mut cursor = Cursor::new();

    cursor.text(MARGIN, TITLE_SIZE, Font::Bold, BLACK, TITLE);
    cursor.y += 28.0;
    cursor.text(MARGIN, BODY_SIZE + 1.0, Font::Regular, BLACK, SUBTITLE);
    cursor.y += 25.0;
    let y = cursor.y;
    cursor.push(DrawOp::Rule {
        x1: MARGIN,
        y1: y,
        x2: PAGE_WIDTH - MARGIN,
        y2: y,
        width: 1.0,
        color: PRIMARY,
    });
    cursor.y += 25.0;

    cursor.section_header(WORKOUT_HEADER);
    for day in &plan.workout {
        let title = match day.focus.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(focus) => format!("{} — {}", text_or(day.day.as_deref(), "Day"), focus),
            None => text_or(day.day.as_deref(), "Day").to_string(),
        };
        cursor.day_title(title);
        for ex in &day.exercises {
            let line = format!(
                "• {}: {} sets × {} reps (Rest {})",
                text_or(ex.name.as_deref(), "Exercise"),
                text_or(ex.sets.as_deref(), PLACEHOLDER),
                text_or(ex.reps.as_deref(), PLACEHOLDER),
                text_or(ex.rest.as_deref(), PLACEHOLDER)
            );
            cursor.wrapped(&line, ITEM_INDENT);
        }
        cursor.y += 6.0;
    }

    cursor.break_page();
    cursor.section_header(DIET_HEADER);
    for day in &plan.diet {
        cursor.day_title(text_or(day.day.as_deref(), "Day").to_string());
        for slot in MealSlot::ALL {
            let fallback = if slot == MealSlot::Snacks {
                NO_SNACKS
            } else {
                PLACEHOLDER
            };
            let line = format!("{}: {}", slot.label(), day.meal(slot).unwrap_or(fallback));
            cursor.wrapped(&line, ITEM_INDENT);
        }
        cursor.y += 6.0;
    }

    cursor.break_page();
    cursor.section_header(TIPS_HEADER);
    for tip in plan.tips.iter().filter(|t| !t.trim().is_empty()) {
        cursor.ensure_space(DEFAULT_BLOCK_MIN);
        cursor.wrapped(&format!("• {}", tip), MARGIN);
    }
    for line in plan.motivation.iter().filter(|m| !m.trim().is_empty()) {
        cursor.ensure_space(DEFAULT_BLOCK_MIN);
        cursor.wrapped(&format!("“{}”", line.trim()), MARGIN);
    }

    cursor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DietDay, Exercise, WorkoutDay};
    use proptest::prelude::*;
    use rstest::rstest;

    /// Body lines that fit on page one below the title block and the first
    /// day heading: baselines 166, 180, ... up to 760.
    const FIRST_PAGE_LINES: usize = 43;
    /// Body lines on a fresh page: baselines 40, 54, ... up to 760.
    const FRESH_PAGE_LINES: usize = 52;

    fn exercise(i: usize) -> Exercise {
        Exercise {
            name: Some(format!("Squat {}", i)),
            sets: Some("3".into()),
            reps: Some("10".into()),
            rest: Some("60s".into()),
        }
    }

    fn single_day_plan(lines: usize) -> Plan {
        Plan {
            workout: vec![WorkoutDay {
                day: Some("Day 1".into()),
                focus: Some("Legs".into()),
                exercises: (0..lines).map(exercise).collect(),
            }],
            ..Default::default()
        }
    }

    fn footers(doc: &PlanDocument) -> Vec<String> {
        doc.pages
            .iter()
            .map(|page| {
                page.texts()
                    .filter(|t| t.starts_with("Page "))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }

    #[test]
    fn test_line_capacity_matches_geometry() {
        let fresh = ((LINE_LIMIT - TOP) / LINE_HEIGHT).floor() as usize + 1;
        assert_eq!(fresh, FRESH_PAGE_LINES);
        let first_body_y = TOP + 28.0 + 25.0 + 25.0 + 30.0 + 18.0;
        let first = ((LINE_LIMIT - first_body_y) / LINE_HEIGHT).floor() as usize + 1;
        assert_eq!(first, FIRST_PAGE_LINES);
    }

    #[rstest]
    #[case(1)]
    #[case(FIRST_PAGE_LINES)]
    #[case(FIRST_PAGE_LINES + 1)]
    #[case(FIRST_PAGE_LINES + FRESH_PAGE_LINES)]
    #[case(FIRST_PAGE_LINES + FRESH_PAGE_LINES + 1)]
    #[case(FIRST_PAGE_LINES + FRESH_PAGE_LINES * 2 + 5)]
    fn test_workout_overflow_adds_pages(#[case] lines: usize) {
        let doc = layout_plan(&single_day_plan(lines));

        let overflow = lines.saturating_sub(FIRST_PAGE_LINES);
        let extra = (overflow + FRESH_PAGE_LINES - 1) / FRESH_PAGE_LINES;
        // Workout pages, then one page each for diet and tips.
        assert_eq!(doc.page_count(), 1 + extra + 2);

        let expected: Vec<String> = (1..=doc.page_count()).map(|n| format!("Page {}", n)).collect();
        assert_eq!(footers(&doc), expected);
    }

    #[test]
    fn test_sections_start_on_fresh_pages() {
        let doc = layout_plan(&Plan::default());
        assert_eq!(doc.page_count(), 3);

        let first: Vec<_> = doc.pages[0].texts().collect();
        assert_eq!(&first[..3], &[TITLE, SUBTITLE, WORKOUT_HEADER]);
        assert_eq!(doc.pages[1].texts().next(), Some(DIET_HEADER));
        assert_eq!(doc.pages[2].texts().next(), Some(TIPS_HEADER));
    }

    #[test]
    fn test_absent_fields_use_placeholders() {
        let plan = Plan {
            workout: vec![WorkoutDay {
                day: None,
                focus: None,
                exercises: vec![Exercise::default()],
            }],
            diet: vec![DietDay {
                day: Some("Day 1".into()),
                breakfast: Some("Oats".into()),
                ..Default::default()
            }],
            tips: vec!["Hydrate".into()],
            motivation: vec![],
        };
        let doc = layout_plan(&plan);

        let workout: Vec<_> = doc.pages[0].texts().collect();
        assert!(workout.contains(&"Day"));
        assert!(workout.contains(&"• Exercise: — sets × — reps (Rest —)"));

        let diet: Vec<_> = doc.pages[1].texts().collect();
        assert!(diet.contains(&"Breakfast: Oats"));
        assert!(diet.contains(&"Lunch: —"));
        assert!(diet.contains(&"Snacks: None"));

        assert!(doc.pages[2].texts().any(|t| t == "• Hydrate"));
    }

    #[rstest]
    #[case::null_fields(
        r#"{"workout":[{"day":null,"focus":null,"exercises":[{"name":null,"sets":null,"reps":null,"rest":null}]}],
            "diet":[{"day":"Day 1","Breakfast":null,"Lunch":null,"Dinner":null,"Snacks":null}]}"#,
        "• Exercise: — sets × — reps (Rest —)",
        "Snacks: None"
    )]
    #[case::wrong_typed_fields(
        r#"{"workout":[{"day":"Day 1","exercises":[{"name":["Push","ups"],"sets":3,"reps":true}]}],
            "diet":[{"day":"Day 1","Snacks":[]}],"tips":["Drink water",3]}"#,
        "• Push, ups: 3 sets × true reps (Rest —)",
        "Lunch: —"
    )]
    #[case::null_collections(
        r#"{"workout":[{"day":"Day 1","exercises":null}],
            "diet":[{"day":"Day 1","Lunch":{"main":"Rice"}}],"tips":null,"motivation":null}"#,
        "Day 1",
        r#"Lunch: {"main":"Rice"}"#
    )]
    fn test_odd_model_output_renders_placeholders(
        #[case] raw: &str,
        #[case] workout_line: &str,
        #[case] diet_line: &str,
    ) {
        let plan = crate::parser::parse_plan(raw).unwrap();

        let doc = layout_plan(&plan);
        assert_eq!(doc.page_count(), 3);
        assert!(doc.pages[0].texts().any(|t| t == workout_line));
        assert!(doc.pages[1].texts().any(|t| t == diet_line));

        let workout = crate::render::render_workout(&plan);
        assert_eq!(workout.len(), 1);
        let diet = crate::render::render_diet(&plan);
        assert!(diet.iter().all(|day| day.rows.len() == MealSlot::ALL.len()));
        assert!(!crate::render::diet_narration(&plan).is_empty());
    }

    #[test]
    fn test_day_title_with_focus() {
        let doc = layout_plan(&single_day_plan(1));
        assert!(doc.pages[0].texts().any(|t| t == "Day 1 — Legs"));
    }

    #[test]
    fn test_long_word_is_broken() {
        let word = "x".repeat(400);
        let lines = wrap_text(&word, BODY_SIZE, CONTENT_WIDTH);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_empty_text_is_one_line() {
        assert_eq!(wrap_text("", BODY_SIZE, CONTENT_WIDTH), vec![String::new()]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Wrapped lines never exceed the width and keep every word in order
        #[test]
        fn prop_wrap_respects_width(words in prop::collection::vec("[A-Za-z0-9,.]{1,30}", 0..60)) {
            let text = words.join(" ");
            let lines = wrap_text(&text, BODY_SIZE, CONTENT_WIDTH);
            for line in &lines {
                prop_assert!(text_width(line, BODY_SIZE) <= CONTENT_WIDTH);
            }
            let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
            prop_assert_eq!(rejoined, words.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
