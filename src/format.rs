//! Renders raw lesson/explanation files into decorated Telegram messages.

/// Hard cap on an outgoing message, applied after all decoration.
pub const MAX_MESSAGE_LEN: usize = 1900;

/// Glyph separating a Portuguese phrase from its English gloss.
const GLOSS_SEPARATOR: char = '—';

/// Topic identifier as a display title: "ser_vs_estar" -> "Ser Vs Estar".
pub fn title_case(topic: &str) -> String {
    topic
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a lesson file.
///
/// Lines with the gloss separator become a flag-decorated phrase/gloss
/// pair, split at the first separator. Lines starting with the literal
/// "Pronunciation" become a callout with the prefix stripped. Blank
/// lines stay as paragraph breaks, everything else passes through.
pub fn format_lesson(topic: &str, raw: &str) -> String {
    let mut out = format!("📖 {}\n\n", title_case(topic));

    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push('\n');
        } else if let Some(pos) = line.find(GLOSS_SEPARATOR) {
            let phrase = line[..pos].trim();
            let gloss = line[pos + GLOSS_SEPARATOR.len_utf8()..].trim();
            out.push_str("🇵🇹 ");
            out.push_str(phrase);
            out.push_str("\n🇬🇧 ");
            out.push_str(gloss);
            out.push('\n');
        } else if let Some(rest) = line.strip_prefix("Pronunciation") {
            out.push_str("🗣️ ");
            out.push_str(rest.trim_start_matches(':').trim());
            out.push('\n');
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    truncate(out)
}

/// Render an explanation file.
///
/// All-uppercase lines become section headings, lines starting with
/// "EXAMPLE" become a fixed example callout (their own text discarded),
/// blank lines stay as spacing, everything else passes through.
pub fn format_explanation(topic: &str, raw: &str) -> String {
    let mut out = format!("📚 {}\n\n", title_case(topic));

    for line in raw.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push('\n');
        } else if line.starts_with("EXAMPLE") {
            out.push_str("📝 Example:\n");
        } else if is_heading(line) {
            out.push_str("▪️ ");
            out.push_str(line);
            out.push('\n');
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    truncate(out)
}

/// A heading is a line whose letters are all uppercase, ignoring
/// whitespace, digits and punctuation. Requires at least one letter.
fn is_heading(line: &str) -> bool {
    let mut saw_letter = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            if c.is_lowercase() {
                return false;
            }
            saw_letter = true;
        }
    }
    saw_letter
}

/// Hard cut at `MAX_MESSAGE_LEN` characters, not word-aware. Every
/// outgoing reply goes through this, not just file-backed ones.
pub fn truncate(text: String) -> String {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        text
    } else {
        text.chars().take(MAX_MESSAGE_LEN).collect()
    }
}
