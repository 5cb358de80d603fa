//! Session aggregate: chapters, choices, summaries, alignment and ending.
//!
//! A [`Session`] is owned by the [`Controller`](crate::Controller) and only
//! mutated through its transitions. Everything the view layer shows about a
//! playthrough is derived from here.

use crate::alignment::MoralAlignment;

/// Texts at most this many characters long are shown verbatim in the journey.
pub const EXCERPT_LIMIT: usize = 120;

/// Characters kept before the ellipsis when a text is longer than [`EXCERPT_LIMIT`].
pub const EXCERPT_KEEP: usize = 117;

/// Short form of a chapter used until its summary arrives.
pub fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LIMIT {
        return text.to_string();
    }
    let mut short: String = text.chars().take(EXCERPT_KEEP).collect();
    short.push_str("...");
    short
}

/// Summary substituted when the service cannot summarize a chapter.
pub fn fallback_summary(choice: &str) -> String {
    format!("You chose \"{choice}\" and continued your journey...")
}

/// One unit of narrative plus the choices offered after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub story: String,
    pub choices: Vec<String>,
    /// Label of the choice taken after this chapter.
    pub chosen: Option<String>,
    /// Service-generated summary, written once the next chapter exists.
    pub summary: Option<String>,
}

impl Chapter {
    pub fn new(story: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            story: story.into(),
            choices,
            chosen: None,
            summary: None,
        }
    }
}

/// A row of the journey sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyEntry {
    /// 1-based chapter number.
    pub number: usize,
    pub summary: Option<String>,
    /// Truncated raw text, shown when there is no summary.
    pub excerpt: String,
    pub choice: Option<String>,
}

/// Chapter progress against the configured limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub current: usize,
    pub limit: usize,
}

impl Progress {
    /// Fraction complete in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (self.current as f64 / self.limit as f64).clamp(0.0, 1.0)
    }

    pub fn label(&self) -> String {
        format!("Chapter {} of {}", self.current, self.limit)
    }
}

/// One continuous playthrough.
#[derive(Debug, Clone, Default)]
pub struct Session {
    id: Option<String>,
    chapters: Vec<Chapter>,
    alignment: MoralAlignment,
    conclusion: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service-issued token, if the opening came with one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Number of chapters so far; also the current chapter index (1-based).
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapters.last()
    }

    pub fn push_chapter(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
    }

    /// Attach a choice label to the chapter at `index`.
    pub fn record_choice(&mut self, index: usize, label: impl Into<String>) -> bool {
        match self.chapters.get_mut(index) {
            Some(chapter) => {
                chapter.chosen = Some(label.into());
                true
            }
            None => false,
        }
    }

    /// Remove a choice recorded for a request that did not go through.
    pub fn clear_choice(&mut self, index: usize) {
        if let Some(chapter) = self.chapters.get_mut(index) {
            chapter.chosen = None;
        }
    }

    /// Store a summary by chapter index, regardless of arrival order.
    ///
    /// Only completed chapters (with a recorded choice) accept a summary, so
    /// the summary count can never exceed the completion count.
    pub fn set_summary(&mut self, index: usize, summary: String) -> bool {
        match self.chapters.get_mut(index) {
            Some(chapter) if chapter.chosen.is_some() => {
                chapter.summary = Some(summary);
                true
            }
            _ => false,
        }
    }

    pub fn summary_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.summary.is_some()).count()
    }

    /// Chapters that have a choice recorded against them.
    pub fn completed_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.chosen.is_some()).count()
    }

    /// Every choice label made so far, in order.
    pub fn choices_made(&self) -> Vec<String> {
        self.chapters
            .iter()
            .filter_map(|c| c.chosen.clone())
            .collect()
    }

    pub fn alignment(&self) -> &MoralAlignment {
        &self.alignment
    }

    pub fn set_alignment(&mut self, alignment: MoralAlignment) {
        self.alignment = alignment;
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.conclusion.as_deref()
    }

    pub fn set_conclusion(&mut self, text: String) {
        self.conclusion = Some(text);
    }

    /// Chapter texts sent to the conclusion request: the summary where one
    /// exists, the raw story otherwise.
    pub fn conclusion_chapters(&self) -> Vec<String> {
        self.chapters
            .iter()
            .map(|c| c.summary.clone().unwrap_or_else(|| c.story.clone()))
            .collect()
    }

    pub fn journey(&self) -> Vec<JourneyEntry> {
        self.chapters
            .iter()
            .enumerate()
            .map(|(i, c)| JourneyEntry {
                number: i + 1,
                summary: c.summary.clone(),
                excerpt: excerpt(&c.story),
                choice: c.chosen.clone(),
            })
            .collect()
    }
}
