//! Theme support for quicklog.

use ratatui::style::Color;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Names of the themes compiled into the binary.
pub const BUILTIN_THEMES: &[&str] = &["default", "light"];

/// A complete theme definition.
///
/// Field names are self-documenting (e.g., `bg_selected` = selected row
/// background, `text_muted` = muted text color).
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub bg_bar: Color,
    pub bg_selected: Color,

    // Borders
    pub border_dim: Color,
    pub border_active: Color,

    // Text
    pub text_muted: Color,
    pub text_dim: Color,
    pub text_normal: Color,
    pub text_bright: Color,

    // Accent
    pub accent: Color,
    pub hunk_header: Color,
    pub line_number: Color,

    // Diff
    pub added_fg: Color,
    pub removed_fg: Color,
    pub diff_delete_bg: Color,
    pub diff_insert_bg: Color,
    pub diff_empty_bg: Color,
    pub inline_delete_bg: Color,
    pub inline_insert_bg: Color,

    // Status
    pub error: Color,
    pub warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::builtin_default()
    }
}

/// JSON theme file format.
#[derive(Debug, Deserialize)]
#[allow(missing_docs)]
pub struct ThemeJson {
    #[serde(default)]
    pub defs: HashMap<String, String>,
    pub theme: HashMap<String, String>,
}

impl Theme {
    /// Load a theme by name. Checks user themes first, then builtin.
    ///
    /// Unknown names fall back to the default theme.
    pub fn load(name: &str) -> Self {
        if let Some(theme) = user_themes_dir().and_then(|dir| load_user_theme(&dir, name)) {
            return theme;
        }

        match name {
            "light" => Self::light(),
            "default" => Self::builtin_default(),
            other => {
                log::warn!("unknown theme {:?}, using default", other);
                Self::builtin_default()
            }
        }
    }

    /// List available theme names.
    pub fn list() -> Vec<String> {
        let mut themes: Vec<String> = BUILTIN_THEMES.iter().map(|s| s.to_string()).collect();

        if let Some(dir) = user_themes_dir() {
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().is_some_and(|e| e == "json") {
                        if let Some(stem) = path.file_stem() {
                            let name = stem.to_string_lossy().to_string();
                            if !themes.contains(&name) {
                                themes.push(name);
                            }
                        }
                    }
                }
            }
        }

        themes.sort();
        themes
    }

    /// Default dark theme.
    pub fn builtin_default() -> Self {
        Self {
            bg: Color::Rgb(18, 18, 22),
            bg_bar: Color::Rgb(26, 26, 32),
            bg_selected: Color::Rgb(45, 45, 55),

            border_dim: Color::Rgb(50, 50, 60),
            border_active: Color::Rgb(80, 200, 200),

            text_muted: Color::Rgb(80, 80, 92),
            text_dim: Color::Rgb(110, 110, 125),
            text_normal: Color::Rgb(175, 175, 185),
            text_bright: Color::Rgb(230, 230, 235),

            accent: Color::Rgb(80, 200, 200),
            hunk_header: Color::Rgb(97, 175, 239),
            line_number: Color::Rgb(80, 80, 92),

            added_fg: Color::Rgb(85, 185, 105),
            removed_fg: Color::Rgb(215, 85, 85),
            diff_delete_bg: Color::Rgb(45, 25, 30),
            diff_insert_bg: Color::Rgb(25, 45, 32),
            diff_empty_bg: Color::Rgb(22, 22, 26),
            inline_delete_bg: Color::Rgb(90, 40, 50),
            inline_insert_bg: Color::Rgb(40, 90, 55),

            error: Color::Rgb(215, 85, 85),
            warning: Color::Rgb(215, 175, 80),
        }
    }

    /// Light theme for bright terminals.
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 250),
            bg_bar: Color::Rgb(235, 235, 238),
            bg_selected: Color::Rgb(215, 225, 240),

            border_dim: Color::Rgb(200, 200, 208),
            border_active: Color::Rgb(3, 102, 214),

            text_muted: Color::Rgb(150, 150, 160),
            text_dim: Color::Rgb(106, 115, 125),
            text_normal: Color::Rgb(36, 41, 46),
            text_bright: Color::Rgb(0, 0, 0),

            accent: Color::Rgb(3, 102, 214),
            hunk_header: Color::Rgb(111, 66, 193),
            line_number: Color::Rgb(150, 150, 160),

            added_fg: Color::Rgb(34, 134, 58),
            removed_fg: Color::Rgb(203, 36, 49),
            diff_delete_bg: Color::Rgb(255, 238, 240),
            diff_insert_bg: Color::Rgb(230, 255, 237),
            diff_empty_bg: Color::Rgb(245, 245, 245),
            inline_delete_bg: Color::Rgb(253, 184, 192),
            inline_insert_bg: Color::Rgb(172, 242, 189),

            error: Color::Rgb(203, 36, 49),
            warning: Color::Rgb(176, 136, 0),
        }
    }
}

/// Get user themes directory (~/.config/quicklog/themes/).
fn user_themes_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("quicklog").join("themes"))
}

/// Load `<dir>/<name>.json`, if present and well-formed.
fn load_user_theme(dir: &Path, name: &str) -> Option<Theme> {
    let path = dir.join(format!("{}.json", name));
    if !path.exists() {
        return None;
    }

    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<ThemeJson>(&content) {
        Ok(json) => Some(resolve_theme(&json)),
        Err(e) => {
            log::warn!("ignoring theme {}: {}", path.display(), e);
            None
        }
    }
}

/// Parse a hex color string to Color.
fn parse_hex(s: &str) -> Option<Color> {
    let s = s.trim_start_matches('#');
    if s.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

/// Resolve a color value (hex or reference).
fn resolve_color(value: &str, defs: &HashMap<String, String>, fallback: Color) -> Color {
    if value.starts_with('#') {
        parse_hex(value).unwrap_or(fallback)
    } else if let Some(def) = defs.get(value) {
        parse_hex(def).unwrap_or(fallback)
    } else {
        fallback
    }
}

/// Resolve a theme JSON over the default theme. Keys are camelCase field names.
fn resolve_theme(json: &ThemeJson) -> Theme {
    let mut theme = Theme::builtin_default();

    macro_rules! apply {
        ($($field:ident => $key:literal),* $(,)?) => {
            $(
                if let Some(value) = json.theme.get($key) {
                    theme.$field = resolve_color(value, &json.defs, theme.$field);
                }
            )*
        };
    }

    apply! {
        bg => "bg",
        bg_bar => "bgBar",
        bg_selected => "bgSelected",
        border_dim => "borderDim",
        border_active => "borderActive",
        text_muted => "textMuted",
        text_dim => "textDim",
        text_normal => "textNormal",
        text_bright => "textBright",
        accent => "accent",
        hunk_header => "hunkHeader",
        line_number => "lineNumber",
        added_fg => "addedFg",
        removed_fg => "removedFg",
        diff_delete_bg => "diffDeleteBg",
        diff_insert_bg => "diffInsertBg",
        diff_empty_bg => "diffEmptyBg",
        inline_delete_bg => "inlineDeleteBg",
        inline_insert_bg => "inlineInsertBg",
        error => "error",
        warning => "warning",
    }

    theme
}
