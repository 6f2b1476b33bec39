//! Boilerplate removal for decoded PDF text.
//!
//! Strips watermark tokens, site-domain footers and "Página N de M" footers,
//! and re-joins uppercase words whose accented letter was emitted on a line of
//! its own ("QUEST\nÃ\nO"). Text without any of these is returned unchanged.

use std::borrow::Cow;

use regex::Regex;
use tracing::trace;

use super::rules::PAGE_FOOTER;
use crate::error::{GabaritoError, Result};
use crate::models::config::NormalizeConfig;

/// Side-effect-free text normalizer. `normalize` is idempotent.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    watermark: Option<Regex>,
    footer_domains: Option<Regex>,
}

impl TextNormalizer {
    /// Normalizer with the default watermark markers and footer domains.
    pub fn new() -> Self {
        Self::from_config(&NormalizeConfig::default())
            .unwrap_or(Self { watermark: None, footer_domains: None })
    }

    /// Build a normalizer from configured markers and domains.
    pub fn from_config(config: &NormalizeConfig) -> Result<Self> {
        let watermark = literal_alternation(&config.watermark_markers)
            .map(|alt| Regex::new(&format!(r"(?:{})[ \t]*\S*[ \t]*", alt)))
            .transpose()
            .map_err(|e| GabaritoError::Config(format!("invalid watermark marker: {}", e)))?;

        let footer_domains = literal_alternation(&config.footer_domains)
            .map(|alt| Regex::new(&format!(r"(?i)(?:https?://)?(?:{})/?[ \t]*", alt)))
            .transpose()
            .map_err(|e| GabaritoError::Config(format!("invalid footer domain: {}", e)))?;

        Ok(Self {
            watermark,
            footer_domains,
        })
    }

    /// Remove boilerplate. Repeats until nothing changes, so the result is a
    /// fixed point; every pass that changes the text makes it strictly shorter.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let next = match self.pass(&current) {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            match next {
                Some(next) if next != current => {
                    trace!(
                        "normalize pass removed {} bytes",
                        current.len().saturating_sub(next.len())
                    );
                    current = next;
                }
                _ => return current,
            }
        }
    }

    fn pass<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = join_split_words(text);

        if let Some(re) = &self.watermark {
            out = replace_cow(out, re);
        }
        if let Some(re) = &self.footer_domains {
            out = replace_cow(out, re);
        }
        replace_cow(out, &PAGE_FOOTER)
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default configuration.
pub fn normalize(text: &str) -> String {
    TextNormalizer::new().normalize(text)
}

fn literal_alternation(items: &[String]) -> Option<String> {
    let mut literals: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if literals.is_empty() {
        return None;
    }
    // Longest first so "www.site" wins over "site".
    literals.sort_by(|a, b| b.len().cmp(&a.len()));
    Some(
        literals
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn replace_cow<'a>(text: Cow<'a, str>, re: &Regex) -> Cow<'a, str> {
    match text {
        Cow::Borrowed(s) => re.replace_all(s, ""),
        Cow::Owned(s) => {
            let replaced = match re.replace_all(&s, "") {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            Cow::Owned(replaced.unwrap_or(s))
        }
    }
}

fn is_lone_accented(line: &str) -> bool {
    let mut chars = line.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_uppercase() && !c.is_ascii(),
        _ => false,
    }
}

fn ends_uppercase(line: &str) -> bool {
    line.trim_end().chars().last().is_some_and(|c| c.is_uppercase())
}

fn starts_uppercase(line: &str) -> bool {
    line.trim_start().chars().next().is_some_and(|c| c.is_uppercase())
}

/// Accented capitals that are Portuguese words on their own ("É", "À").
fn is_standalone_word(line: &str) -> bool {
    matches!(line.trim(), "É" | "À")
}

fn is_single_token(line: &str) -> bool {
    line.split_whitespace().count() == 1
}

/// A lone accented capital glues to `other` unless it may be a word of its
/// own and `other` reads as a run of words rather than a fragment.
fn glues_to(lone: &str, other: &str) -> bool {
    is_lone_accented(lone) && (!is_standalone_word(lone) || is_single_token(other))
}

/// Join line breaks that sit between two uppercase letters when one side is
/// a lone accented capital. Decisions use the input lines only.
fn join_split_words(text: &str) -> Cow<'_, str> {
    let lines: Vec<&str> = text.split('\n').collect();
    let joins: Vec<bool> = lines
        .windows(2)
        .map(|pair| {
            ends_uppercase(pair[0])
                && starts_uppercase(pair[1])
                && (glues_to(pair[0], pair[1]) || glues_to(pair[1], pair[0]))
        })
        .collect();

    if !joins.iter().any(|&j| j) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(lines[0]);
    for (line, join) in lines[1..].iter().zip(joins) {
        if join {
            let keep = out.trim_end().len();
            out.truncate(keep);
            out.push_str(line.trim_start());
        } else {
            out.push('\n');
            out.push_str(line);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_removes_watermark_token() {
        let text = "Texto da prova pcimarkpci MjgwNDowMDE0OmIyNjU= continua";
        assert_eq!(normalize(text), "Texto da prova continua");
    }

    #[test]
    fn test_removes_domain_and_page_footer() {
        let text = "Enunciado\nwww.pciconcursos.com.br\nPágina 2 de 12\nA) opção";
        assert_eq!(normalize(text), "Enunciado\n\n\nA) opção");
    }

    #[test]
    fn test_joins_split_accented_word() {
        assert_eq!(normalize("QUEST\nÃ\nO 1"), "QUESTÃO 1");
        assert_eq!(normalize("ESCRITUR\nÁ\nRIO"), "ESCRITURÁRIO");
    }

    #[test]
    fn test_keeps_standalone_e_between_sentences() {
        let text = "A ALTERNATIVA CORRETA\nÉ\nA LETRA B";
        assert_eq!(normalize(text), text);
        assert_eq!(normalize("M\nÉ\nDICO"), "MÉDICO");
    }

    #[test]
    fn test_does_not_join_ordinary_lines() {
        let text = "ANALISTA\nTÉCNICO\nA\nB\nC";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_unchanged_when_nothing_matches() {
        let text = "1\nQual é a capital?\n  (A) Lisboa\n";
        assert_eq!(normalize(text), text);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "P\nÁ\nGINA 1 DE 3\ntexto",
            "pcimarkpcipcimarkpci X\nÉ\nÉ\nA",
            "Página 1 de 2 Página 3 de 4",
            "www.pciconcursos.com.br pcimarkpci tok\nQUEST\nÃ\nO",
            "",
            "\n\n",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_custom_markers() {
        let config = NormalizeConfig {
            watermark_markers: vec!["wm:".to_string()],
            footer_domains: vec!["example.org".to_string()],
        };
        let normalizer = TextNormalizer::from_config(&config).unwrap();
        assert_eq!(
            normalizer.normalize("a wm: 123 b https://example.org/ c"),
            "a b c"
        );
    }

    #[test]
    fn test_empty_config_only_strips_page_footers() {
        let config = NormalizeConfig {
            watermark_markers: Vec::new(),
            footer_domains: Vec::new(),
        };
        let normalizer = TextNormalizer::from_config(&config).unwrap();
        assert_eq!(normalizer.normalize("x pcimarkpci y Página 1 de 2"), "x pcimarkpci y ");
    }
}
