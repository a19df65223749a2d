use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const PREFERRED_THEME: &str = "base16-eighties.dark";

/// Lazy-initialized syntect highlighting assets.
struct SyntectAssets {
    syntax_set: SyntaxSet,
    theme: Option<SyntectTheme>,
}

fn syntect_assets() -> &'static SyntectAssets {
    static ASSETS: OnceLock<SyntectAssets> = OnceLock::new();
    ASSETS.get_or_init(|| {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut theme_set = ThemeSet::load_defaults();
        let theme = theme_set
            .themes
            .remove(PREFERRED_THEME)
            .or_else(|| theme_set.themes.into_values().next());
        log::debug!(
            "loaded {} syntaxes for code panes",
            syntax_set.syntaxes().len()
        );
        SyntectAssets { syntax_set, theme }
    })
}

fn syntect_color_to_ratatui(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Resolves a protocol language name (`python`, `cpp_17`, `latex`) to a syntax definition.
fn find_syntax<'a>(syntax_set: &'a SyntaxSet, language: &str) -> Option<&'a SyntaxReference> {
    let language = language.trim().to_ascii_lowercase();
    if language.is_empty() {
        return None;
    }
    let base = language.split('_').next().unwrap_or(&language);
    let alias = match base {
        "csharp" | "c#" => "cs",
        "golang" => "go",
        "shell" | "bash" | "zsh" => "sh",
        "javascript" | "node" => "js",
        "c++" => "cpp",
        "text" | "plain" => "txt",
        other => other,
    };
    [language.as_str(), base, alias]
        .into_iter()
        .find_map(|token| {
            syntax_set
                .find_syntax_by_token(token)
                .or_else(|| syntax_set.find_syntax_by_extension(token))
        })
}

#[cfg(test)]
fn has_syntax(language: &str) -> bool {
    find_syntax(&syntect_assets().syntax_set, language).is_some()
}

/// Highlights a whole code block, keeping parser state across lines.
///
/// Languages without a syntax definition come back as unstyled lines.
pub fn highlight_block(code: &str, language: &str) -> Vec<Line<'static>> {
    let assets = syntect_assets();
    let (Some(syntax), Some(theme)) = (
        find_syntax(&assets.syntax_set, language),
        assets.theme.as_ref(),
    ) else {
        return plain_lines(code);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for source_line in LinesWithEndings::from(code) {
        let Ok(ranges) = highlighter.highlight_line(source_line, &assets.syntax_set) else {
            log::debug!("highlighting failed for {language}; using plain text");
            return plain_lines(code);
        };
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(style, text)| {
                let text = text.trim_end_matches(['\n', '\r']);
                if text.is_empty() {
                    return None;
                }
                let mut ratatui_style =
                    Style::default().fg(syntect_color_to_ratatui(style.foreground));
                if style.font_style.contains(FontStyle::BOLD) {
                    ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
                }
                if style.font_style.contains(FontStyle::ITALIC) {
                    ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
                }
                Some(Span::styled(text.to_string(), ratatui_style))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    lines
}

fn plain_lines(code: &str) -> Vec<Line<'static>> {
    code.lines().map(|line| Line::from(line.to_string())).collect()
}
