//! Conversion of rendered text into formatted runs.

use pulldown_cmark::{Event, Parser, Tag};

use crate::TextRun;

/// Splits text into runs, turning `**bold**` spans into bold runs.
///
/// Block markup is kept as written: list markers and heading hashes come
/// back as literal text, and paragraphs are joined with newlines.
pub fn text_runs(text: &str) -> Vec<TextRun> {
    if !text.contains("**") {
        return vec![TextRun {
            text: text.to_string(),
            bold: false,
        }];
    }
    let mut runs = Runs::default();
    let mut strong = 0usize;
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut blocks = 0usize;
    let mut item_open = false;
    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::Strong) => strong += 1,
            Event::End(Tag::Strong) => strong = strong.saturating_sub(1),
            // loose list items wrap their text in a paragraph
            Event::Start(Tag::Paragraph) if item_open => item_open = false,
            Event::Start(Tag::Paragraph) | Event::Start(Tag::Heading(..)) | Event::Start(Tag::Item) => {
                item_open = matches!(event, Event::Start(Tag::Item));
                if blocks > 0 {
                    runs.push("\n", false);
                }
                blocks += 1;
                match event {
                    Event::Start(Tag::Heading(level, _, _)) => {
                        runs.push(&format!("{} ", "#".repeat(level as usize)), false)
                    }
                    Event::Start(Tag::Item) => match lists.last_mut() {
                        Some(Some(n)) => {
                            runs.push(&format!("{}. ", n), false);
                            *n += 1;
                        }
                        _ => runs.push("- ", false),
                    },
                    _ => {}
                }
            }
            Event::Start(Tag::List(start)) => lists.push(start),
            Event::End(Tag::List(_)) => {
                lists.pop();
            }
            Event::Text(t) | Event::Code(t) => {
                item_open = false;
                runs.push(&t, strong > 0)
            }
            Event::SoftBreak | Event::HardBreak => runs.push("\n", strong > 0),
            _ => {}
        }
    }
    runs.0
}

#[derive(Default)]
struct Runs(Vec<TextRun>);

impl Runs {
    /// Appends text, merging with the previous run of the same weight.
    fn push(&mut self, text: &str, bold: bool) {
        match self.0.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(text),
            _ => self.0.push(TextRun {
                text: text.to_string(),
                bold,
            }),
        }
    }
}
