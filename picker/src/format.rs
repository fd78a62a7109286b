use crate::catalog::{Candidate, SkinTone};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Utf8,
    Codepoints,
}

pub fn parse_format(s: &str) -> anyhow::Result<Format> {
    match s {
        "utf-8" | "utf8" => Ok(Format::Utf8),
        "cp" => Ok(Format::Codepoints),
        other => anyhow::bail!("invalid format {}, expected utf-8|cp", other),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputFormat {
    pub format: Format,
    /// Prepended to every hex codepoint in `cp` format (e.g. `U+`).
    pub codepoint_prefix: String,
    pub newline: bool,
}

/// Render an accepted candidate for delivery.
///
/// The tone variant is used only when the candidate supports tones, so an
/// unsupported tone renders exactly like [`SkinTone::None`].
pub fn format_candidate(c: &Candidate, tone: SkinTone, out: &OutputFormat) -> String {
    let mut s = match out.format {
        Format::Utf8 => c.text_with(tone),
        Format::Codepoints => c
            .codepoints_with(tone)
            .iter()
            .map(|cp| format!("{}{:x}", out.codepoint_prefix, cp))
            .collect::<Vec<_>>()
            .join(" "),
    };
    if out.newline {
        s.push('\n');
    }
    s
}
