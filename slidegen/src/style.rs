//! Layout and style resolution.
//!
//! Style parameters are resolved in layers: built-in defaults, then the
//! style book's global patch, then the layout's default patch, then the
//! template's style profile. Each layer only overrides the fields it sets.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use subtle_encoding::hex;

use crate::{Error, LayoutType, Map};

/// An RGB colour, written as `#RRGGBB` in definitions and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(192, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 176, 80);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const LIGHT_BLUE: Color = Color::rgb(212, 228, 255);
    pub const DARK_BLUE: Color = Color::rgb(0, 30, 80);
    pub const ORANGE: Color = Color::rgb(255, 192, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let digits = s.trim().trim_start_matches('#').to_ascii_lowercase();
        match hex::decode(digits.as_bytes()) {
            Ok(bytes) if bytes.len() == 3 => Ok(Self::rgb(bytes[0], bytes[1], bytes[2])),
            _ => Err(Error::config(format!(
                "invalid colour \"{}\", expected #RRGGBB",
                s
            ))),
        }
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// Fully resolved appearance parameters for one slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleParams {
    pub font_name: String,
    /// Chart text size in points.
    pub font_size: f64,
    pub show_legend: bool,
    pub show_data_labels: bool,
    pub show_x_axis: bool,
    pub show_y_axis: bool,
    /// Series colours, used in order and cycled.
    pub palette: Vec<Color>,
    /// Gap between bar clusters, as a percentage of bar width (0 to 500).
    pub gap_width: i32,
    /// Overlap of bars within a cluster (-100 to 100).
    pub overlap: i32,
    /// Put series after the first on a secondary value axis.
    pub secondary_axis: bool,
    /// Line width in points.
    pub line_width: f64,
    pub smooth_lines: bool,
    pub has_markers: bool,
    pub value_axis_max: Option<f64>,
    /// Table text size in points.
    pub table_font_size: f64,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 10.0,
            show_legend: true,
            show_data_labels: true,
            show_x_axis: true,
            show_y_axis: true,
            palette: vec![Color::ORANGE, Color::GREEN],
            gap_width: 150,
            overlap: 0,
            secondary_axis: false,
            line_width: 2.25,
            smooth_lines: false,
            has_markers: true,
            value_axis_max: None,
            table_font_size: 11.0,
        }
    }
}

impl StyleParams {
    fn check(&self) -> Result<(), Error> {
        if !(0..=500).contains(&self.gap_width) {
            return Err(Error::config(format!(
                "gap_width {} is outside 0..=500",
                self.gap_width
            )));
        }
        if !(-100..=100).contains(&self.overlap) {
            return Err(Error::config(format!(
                "overlap {} is outside -100..=100",
                self.overlap
            )));
        }
        if self.palette.is_empty() {
            return Err(Error::config("palette must contain at least one colour"));
        }
        if self.font_size <= 0.0 || self.table_font_size <= 0.0 || self.line_width <= 0.0 {
            return Err(Error::config("font sizes and line width must be positive"));
        }
        Ok(())
    }
}

/// A palette given either by name or inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteRef {
    Named(String),
    Colors(Vec<Color>),
}

/// A partial set of style parameters, overlaid onto another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub show_legend: Option<bool>,
    pub show_data_labels: Option<bool>,
    pub show_x_axis: Option<bool>,
    pub show_y_axis: Option<bool>,
    pub palette: Option<PaletteRef>,
    pub gap_width: Option<i32>,
    pub overlap: Option<i32>,
    pub secondary_axis: Option<bool>,
    pub line_width: Option<f64>,
    pub smooth_lines: Option<bool>,
    pub has_markers: Option<bool>,
    pub value_axis_max: Option<f64>,
    pub table_font_size: Option<f64>,
}

macro_rules! overlay {
    ($target:expr, $patch:expr, $($field:ident),+) => {
        $(
            if let Some(v) = &$patch.$field {
                $target.$field = v.clone();
            }
        )+
    };
}

/// Style definitions: a global patch, per-layout defaults, named profiles
/// and named palettes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleBook {
    pub global: StylePatch,
    pub layouts: Map<LayoutType, StylePatch>,
    pub profiles: Map<String, StylePatch>,
    pub palettes: Map<String, Vec<Color>>,
}

impl Default for StyleBook {
    fn default() -> Self {
        Self {
            global: StylePatch::default(),
            layouts: Map::new(),
            profiles: Map::new(),
            palettes: builtin_palettes(),
        }
    }
}

impl StyleBook {
    /// Parses a style book from YAML. Built-in palettes remain available
    /// unless a palette of the same name is given.
    pub fn from_yaml_str(content: &str) -> Result<Self, Error> {
        let mut book = serde_yaml::from_str::<Self>(content)?;
        for (name, colors) in builtin_palettes() {
            book.palettes.entry(name).or_insert(colors);
        }
        book.check()?;
        Ok(book)
    }

    /// Checks every layout default and profile against the global style.
    pub fn check(&self) -> Result<(), Error> {
        for layout in LayoutType::ALL {
            self.resolve(layout, None)?;
        }
        for name in self.profiles.keys() {
            self.resolve(LayoutType::SingleColumnBar, Some(name))
                .map_err(|e| Error::config(format!("style profile \"{}\": {}", name, e)))?;
        }
        Ok(())
    }

    pub fn has_profile(&self, profile: &str) -> bool {
        self.profiles.contains_key(profile)
    }

    /// Resolves the style for a layout and optional profile. An unknown
    /// profile is an error; a layout without defaults uses the global
    /// style.
    pub fn resolve(&self, layout: LayoutType, profile: Option<&str>) -> Result<StyleParams, Error> {
        let mut params = StyleParams::default();
        self.apply(&mut params, &self.global)?;
        if let Some(patch) = self.layouts.get(&layout) {
            self.apply(&mut params, patch)?;
        }
        if let Some(name) = profile {
            let patch = self
                .profiles
                .get(name)
                .ok_or_else(|| Error::config(format!("unknown style profile \"{}\"", name)))?;
            self.apply(&mut params, patch)?;
        }
        params.check()?;
        debug!(
            "Resolved style for {} (profile {})",
            layout,
            profile.unwrap_or("-")
        );
        Ok(params)
    }

    fn apply(&self, params: &mut StyleParams, patch: &StylePatch) -> Result<(), Error> {
        overlay!(
            params,
            patch,
            font_name,
            font_size,
            show_legend,
            show_data_labels,
            show_x_axis,
            show_y_axis,
            gap_width,
            overlap,
            secondary_axis,
            line_width,
            smooth_lines,
            has_markers,
            table_font_size
        );
        if let Some(max) = patch.value_axis_max {
            params.value_axis_max = Some(max);
        }
        match &patch.palette {
            Some(PaletteRef::Named(name)) => {
                params.palette = self
                    .palettes
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::config(format!("unknown palette \"{}\"", name)))?;
            }
            Some(PaletteRef::Colors(colors)) => params.palette = colors.clone(),
            None => {}
        }
        Ok(())
    }
}

fn builtin_palettes() -> Map<String, Vec<Color>> {
    const OLIVE: Color = Color::rgb(0, 176, 180);
    const SKY: Color = Color::rgb(0, 176, 240);
    const PALE_SKY: Color = Color::rgb(169, 227, 255);
    const SLATE: Color = Color::rgb(182, 191, 197);
    const TANGERINE: Color = Color::rgb(255, 102, 153);
    let table: [(&str, &[Color]); 18] = [
        ("2_orange_green", &[Color::ORANGE, Color::GREEN]),
        ("2_green_orange", &[Color::GREEN, Color::ORANGE]),
        ("2_orange_olive", &[Color::ORANGE, OLIVE]),
        ("2_olive_green", &[OLIVE, Color::GREEN]),
        ("2_white_olive", &[Color::WHITE, OLIVE]),
        ("2_blue_lightblue", &[SKY, PALE_SKY]),
        ("2_olive_orange", &[OLIVE, Color::ORANGE]),
        ("2_gray_lightblue2", &[SLATE, PALE_SKY]),
        ("1_olive", &[OLIVE]),
        ("1_orange", &[Color::ORANGE]),
        ("1_gray", &[SLATE]),
        ("1_lightblue", &[SKY]),
        ("1_tangerine", &[TANGERINE]),
        ("2_tangerine_gray", &[TANGERINE, SLATE]),
        ("2_gray_tangerine", &[SLATE, TANGERINE]),
        ("2_gray_lightblue", &[SLATE, SKY]),
        ("2_green_gray", &[Color::GREEN, SLATE]),
        ("2_olive_gray", &[OLIVE, SLATE]),
    ];
    table
        .iter()
        .map(|(name, colors)| (name.to_string(), colors.to_vec()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const STYLES: &str = r##"
global:
  font_size: 9
layouts:
  single_column_table:
    show_legend: false
  double_column_line:
    palette: 1_olive
profiles:
  compact:
    gap_width: 50
    palette: ["#FF6699", "b6bfc5"]
  broken:
    overlap: 150
"##;

    #[test]
    fn layers_override_in_order() {
        let mut book = StyleBook::from_yaml_str(
            &STYLES.replace("  broken:\n    overlap: 150\n", ""),
        )
        .unwrap();
        let s = book.resolve(LayoutType::SingleColumnBar, None).unwrap();
        assert_eq!(s.font_size, 9.0);
        assert!(s.show_legend);
        assert_eq!(s.palette, vec![Color::ORANGE, Color::GREEN]);

        let s = book.resolve(LayoutType::SingleColumnTable, None).unwrap();
        assert!(!s.show_legend);
        assert_eq!(s.table_font_size, 11.0);

        let s = book
            .resolve(LayoutType::DoubleColumnLine, Some("compact"))
            .unwrap();
        assert_eq!(s.gap_width, 50);
        assert_eq!(s.palette, vec![Color::rgb(255, 102, 153), Color::rgb(182, 191, 197)]);

        book.layouts.remove(&LayoutType::DoubleColumnLine);
        let s = book.resolve(LayoutType::DoubleColumnLine, None).unwrap();
        assert_eq!(s, book.resolve(LayoutType::SingleColumnBar, None).unwrap());
    }

    #[test]
    fn unknown_profile_fails_loudly() {
        let book = StyleBook::default();
        let err = book
            .resolve(LayoutType::SingleColumnBar, Some("fancy"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            StyleBook::from_yaml_str(STYLES),
            Err(Error::Config(_))
        ));
        let yaml = "profiles:\n  x:\n    palette: no_such_palette\n";
        assert!(matches!(StyleBook::from_yaml_str(yaml), Err(Error::Config(_))));
        let yaml = "profiles:\n  x:\n    palette: []\n";
        assert!(matches!(StyleBook::from_yaml_str(yaml), Err(Error::Config(_))));
    }

    #[test]
    fn colours_use_hex_notation() {
        let c = Color::try_from("#00B050".to_string()).unwrap();
        assert_eq!(c, Color::GREEN);
        assert_eq!(String::from(Color::DARK_BLUE), "#001E50");
        assert!(Color::try_from("#12345".to_string()).is_err());
        assert!(Color::try_from("red".to_string()).is_err());
    }
}
