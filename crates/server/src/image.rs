//! SVG rendering of status cards.

/// Frame image width (1.91:1).
pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const BACKGROUND: &str = "#ffb66f";
const FONT_SIZE: u32 = 60;
const LINE_HEIGHT: f32 = 1.4;
/// Characters per line at 60px inside a 120px side padding.
const MAX_LINE_CHARS: usize = 28;

/// Render `text` centered on the frame's orange status background.
pub fn render_status_svg(text: &str) -> String {
    let lines = wrap(text, MAX_LINE_CHARS);
    let line_step = FONT_SIZE as f32 * LINE_HEIGHT;
    let block = line_step * lines.len().saturating_sub(1) as f32;
    let first_y = HEIGHT as f32 / 2.0 - block / 2.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str(&format!(
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        BACKGROUND
    ));
    svg.push_str(&format!(
        r#"<text x="50%" font-family="sans-serif" font-size="{}" letter-spacing="-1.5" fill="black" text-anchor="middle" dominant-baseline="middle">"#,
        FONT_SIZE
    ));
    for (i, line) in lines.iter().enumerate() {
        svg.push_str(&format!(
            r#"<tspan x="50%" y="{:.0}">{}</tspan>"#,
            first_y + line_step * i as f32,
            escape_xml(line)
        ));
    }
    svg.push_str("</text></svg>");
    svg
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
