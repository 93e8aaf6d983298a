//! Renderer dispatch: turns slide render configs into positioned slide
//! elements, with one strategy per layout type.

mod chart;
mod rich_text;
mod table;

use std::collections::HashMap;
use std::fmt;

use log::debug;

pub use chart::{ChartStrategy, Columns};
pub use rich_text::text_runs;
pub use table::TableStrategy;

use crate::{
    ChartType, Color, ElementContent, Error, LayoutType, Rect, SlideElement, SlideRenderConfig,
    TextBox,
};

pub const TITLE_FRAME: Rect = Rect::new(0.5, 1.0, 18.0, 1.1);
pub const SUMMARY_FRAME: Rect = Rect::new(0.5, 2.0, 18.0, 1.2);
pub const CAPTION_FRAME: Rect = Rect::new(3.75, 3.5, 12.5, 1.2);
pub const CHART_SINGLE_FRAME: Rect = Rect::new(3.7, 4.54, 12.2, 7.48);
pub const CHART_LEFT_FRAME: Rect = Rect::new(0.75, 4.94, 10.5, 6.5);
pub const CHART_RIGHT_FRAME: Rect = Rect::new(12.75, 4.94, 10.5, 6.5);
pub const TABLE_FRAME: Rect = Rect::new(1.5, 4.5, 20.0, 8.96);

/// The role-based appearance of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    SlideTitle,
    BodyText,
    Caption,
}

impl TextRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlideTitle => "slide-title",
            Self::BodyText => "body-text",
            Self::Caption => "caption",
        }
    }

    /// Font size in points, boldness and colour.
    pub fn appearance(&self) -> (f64, bool, Color) {
        match self {
            Self::SlideTitle => (24.0, true, Color::BLACK),
            Self::BodyText => (14.0, false, Color::DARK_BLUE),
            Self::Caption => (10.0, false, Color::GRAY),
        }
    }
}

/// Builds a text element, converting `**bold**` markers into bold runs.
/// Roles that are bold throughout get every run bold.
pub fn text_element(page: usize, role: TextRole, frame: Rect, text: &str) -> SlideElement {
    let (font_size, bold, color) = role.appearance();
    let mut runs = text_runs(text);
    if bold {
        runs.iter_mut().for_each(|r| r.bold = true);
    }
    SlideElement {
        page,
        role: role.as_str().to_string(),
        frame,
        content: ElementContent::TextBox(TextBox {
            runs,
            font_size,
            color,
            word_wrap: true,
        }),
    }
}

/// The capability every layout strategy provides.
pub trait RenderStrategy: Send + Sync {
    /// The primary content elements (charts or tables) for the slide.
    fn content(&self, config: &SlideRenderConfig, page: usize) -> Result<Vec<SlideElement>, Error>;

    /// All elements of the slide in placement order: title, caption (if
    /// any), summary (if not empty), then content.
    fn render(&self, config: &SlideRenderConfig, page: usize) -> Result<Vec<SlideElement>, Error> {
        let content = self.content(config, page)?;
        let mut elements = Vec::with_capacity(content.len() + 3);
        elements.push(text_element(
            page,
            TextRole::SlideTitle,
            TITLE_FRAME,
            &config.title,
        ));
        if let Some(caption) = &config.caption {
            elements.push(text_element(page, TextRole::Caption, CAPTION_FRAME, caption));
        }
        if !config.summary.trim().is_empty() {
            elements.push(text_element(
                page,
                TextRole::BodyText,
                SUMMARY_FRAME,
                &config.summary,
            ));
        }
        elements.extend(content);
        Ok(elements)
    }
}

/// The open registry of layout strategies.
pub struct Renderers {
    strategies: HashMap<LayoutType, Box<dyn RenderStrategy>>,
}

impl Renderers {
    /// A registry without any strategies.
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// A registry with a strategy for every built-in layout type.
    pub fn standard() -> Self {
        let mut r = Self::empty();
        r.register(
            LayoutType::SingleColumnBar,
            ChartStrategy::new(ChartType::Bar, Columns::Single),
        );
        r.register(
            LayoutType::SingleColumnLine,
            ChartStrategy::new(ChartType::Line, Columns::Single),
        );
        r.register(
            LayoutType::DoubleColumnBar,
            ChartStrategy::new(ChartType::Bar, Columns::Double),
        );
        r.register(
            LayoutType::DoubleColumnLine,
            ChartStrategy::new(ChartType::Line, Columns::Double),
        );
        r.register(LayoutType::SingleColumnTable, TableStrategy);
        r
    }

    /// Registers the strategy for a layout, returning the one it replaces.
    pub fn register<S>(&mut self, layout: LayoutType, strategy: S) -> Option<Box<dyn RenderStrategy>>
    where
        S: RenderStrategy + 'static,
    {
        debug!("Registered render strategy for {}", layout);
        self.strategies.insert(layout, Box::new(strategy))
    }

    pub fn select(&self, layout: LayoutType) -> Result<&dyn RenderStrategy, Error> {
        self.strategies
            .get(&layout)
            .map(|s| s.as_ref())
            .ok_or(Error::UnsupportedLayout(layout))
    }

    /// Renders a slide with the strategy registered for its layout.
    pub fn render(&self, config: &SlideRenderConfig, page: usize) -> Result<Vec<SlideElement>, Error> {
        let elements = self.select(config.layout_type)?.render(config, page)?;
        debug!(
            "Rendered template {} on page {} ({} elements)",
            config.template_id,
            page,
            elements.len()
        );
        Ok(elements)
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Renderers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut layouts = self.strategies.keys().collect::<Vec<_>>();
        layouts.sort();
        f.debug_struct("Renderers")
            .field("layouts", &layouts)
            .finish()
    }
}


#[cfg(test)]
mod test {
    use super::test_support::*;
    use super::*;

    #[test]
    fn dispatches_by_layout() {
        let renderers = Renderers::standard();
        for layout in LayoutType::ALL {
            assert!(renderers.select(layout).is_ok(), "{}", layout);
        }
        let config = config(LayoutType::SingleColumnBar, vec![("main", series(&["sets"]))]);
        let elements = renderers.render(&config, 3).unwrap();
        let roles = elements.iter().map(|e| e.role.as_str()).collect::<Vec<_>>();
        assert_eq!(roles, vec!["slide-title", "body-text", "main"]);
        assert!(elements.iter().all(|e| e.page == 3));
        let summary = elements[1].content.as_text_box().unwrap();
        assert_eq!(summary.plain_text(), "Up 3%");
        assert_eq!(summary.runs.len(), 2);
        assert_eq!(elements[0].frame, TITLE_FRAME);
    }

    #[test]
    fn unregistered_layout_is_unsupported() {
        let mut renderers = Renderers::empty();
        let config = config(LayoutType::SingleColumnTable, vec![("t", matrix())]);
        assert!(matches!(
            renderers.render(&config, 1),
            Err(Error::UnsupportedLayout(LayoutType::SingleColumnTable))
        ));
        assert!(renderers
            .register(LayoutType::SingleColumnTable, TableStrategy)
            .is_none());
        assert!(renderers.render(&config, 1).is_ok());
    }

    #[test]
    fn caption_is_placed_and_empty_summary_skipped() {
        let mut config = config(LayoutType::SingleColumnLine, vec![("main", series(&["p"]))]);
        config.caption = Some("Unit: sets".to_string());
        config.summary = "  ".to_string();
        let elements = Renderers::standard().render(&config, 1).unwrap();
        let roles = elements.iter().map(|e| e.role.as_str()).collect::<Vec<_>>();
        assert_eq!(roles, vec!["slide-title", "caption", "main"]);
        let caption = elements[1].content.as_text_box().unwrap();
        assert_eq!(caption.color, Color::GRAY);
        assert_eq!(caption.font_size, 10.0);
    }

    #[test]
    fn custom_strategies_can_be_registered() {
        struct Blank;
        impl RenderStrategy for Blank {
            fn content(&self, _: &SlideRenderConfig, _: usize) -> Result<Vec<SlideElement>, Error> {
                Ok(Vec::new())
            }
        }
        let mut renderers = Renderers::standard();
        assert!(renderers.register(LayoutType::DoubleColumnBar, Blank).is_some());
        let config = config(LayoutType::DoubleColumnBar, vec![]);
        assert_eq!(renderers.render(&config, 1).unwrap().len(), 2);
    }
}
