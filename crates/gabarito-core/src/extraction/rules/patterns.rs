//! Common regex patterns for exam and answer-key text.

use lazy_static::lazy_static;
use regex::Regex;

/// Public-sector role nouns used to anchor plausible header lines.
/// Accents are optional so that ASCII-folded PDFs still match.
pub const ROLE_KEYWORDS: &str = concat!(
    r"Militar|Bombeir[oa]|Pol[íi]cia|Policial|Perit[oa]|Agente|Analista|",
    r"T[ée]cnic[oa]|Engenheir[oa]|M[ée]dic[oa]|Professor[a]?|Fiscal|Delegad[oa]|",
    r"Auditor|Escriv[ãa]o|Assistente|Auxiliar|Enfermeir[oa]|Advogad[oa]|",
    r"Procurador|Contador|Oficial|Inspetor|Investigador|Soldado|Sargento|Guarda|",
    r"Escritur[áa]ri[oa]|Psic[óo]log[oa]|Nutricionista|Farmac[êe]utic[oa]|",
    r"Fisioterapeuta|Dentista|Cirurgi[ãa]o|Defensor|Promotor|Juiz"
);

lazy_static! {
    // Page footers ("Página 3 de 12", "Pagina 3/12")
    pub static ref PAGE_FOOTER: Regex = Regex::new(
        r"(?i)P[áa]gina[ \t]*\d{1,4}[ \t]*(?:de|/)[ \t]*\d{1,4}[ \t]*"
    ).unwrap();

    // Question boundaries: a bare 1-3 digit number alone on its line
    pub static ref QUESTION_NUMBER_LINE: Regex = Regex::new(
        r"(?m)^[ \t]*(\d{1,3})[ \t]*\r?$"
    ).unwrap();

    // Question boundaries: explicit "Questão 12" labels
    pub static ref QUESTION_LABEL: Regex = Regex::new(
        r"(?i)QUEST[ÃAÂ]O\s*[:\-–]?\s*(\d{1,4})"
    ).unwrap();

    // Header (a): "M1 – ANALISTA JUDICIÁRIO"
    pub static ref HEADER_NUMBERED_VARIANT: Regex = Regex::new(
        r"(?m)^[ \t]*M(\d{1,3})[ \t]*[–—-][ \t]*([^\n]*?\S)[ \t]*\r?$"
    ).unwrap();

    // Header (b): "Soldado Bombeiro Militar – Tipo 2"
    pub static ref HEADER_ROLE_TIPO: Regex = Regex::new(&format!(
        r"(?mi)^[ \t]*([^\n]{{0,120}}?\b(?:{})[^\n]{{0,120}}?)[ \t]*[–—-][ \t]*Tipo[ \t]*(\d{{1,3}})\b",
        ROLE_KEYWORDS
    )).unwrap();

    // Header (c): "GABARITO DEFINITIVO Analista de Sistemas Prova – 03"
    pub static ref HEADER_GABARITO_PROVA: Regex = Regex::new(
        r"(?mi)^[ \t]*(GABARITO(?:[ \t]+(?:OFICIAL|DEFINITIVO|PRELIMINAR))?[ \t:–—-]+[^\n]*?)[ \t]+Prova[ \t]*[–—-][ \t]*(\w{1,10})\b"
    ).unwrap();

    // Header (d): an ALL-CAPS role line directly followed by a numbered answer list
    pub static ref HEADER_CAPS_ROLE: Regex = Regex::new(
        r"(?m)^[ \t]*(\p{Lu}[\p{Lu} \t/().,\-–]*?(?:ÁRIO|ARIO|ÁRIA|ARIA|ISTA|ENTE|ADO|ADA|EIRO|EIRA|ÃO|AO|OR|ICO|ICA|OGO|OGA|EUTA)S?)[ \t]*\r?\n[ \t]*(?:\d{1,3}[ \t]*[-.)]?[ \t]*[A-EX]\b|(?:\d{1,3}[ \t]+){4}\d{1,3})"
    ).unwrap();

    // Header (b'): any short line mentioning a role keyword
    pub static ref HEADER_ROLE_LINE: Regex = Regex::new(&format!(
        r"(?mi)^[ \t]*([^\n]{{0,80}}?\b(?:{})[^\n]{{0,80}}?)[ \t]*\r?$",
        ROLE_KEYWORDS
    )).unwrap();

    // Whole-document fallback: "CARGO: Analista Judiciário"
    pub static ref CARGO_LABEL: Regex = Regex::new(
        r"(?i)CARGO[ \t]*[:\-–][ \t]*([^\n]+)"
    ).unwrap();

    // Exam-name cleanup
    pub static ref NAME_GABARITO_PREFIX: Regex = Regex::new(
        r"(?i)^GABARITO(?:[ \t]+(?:OFICIAL|DEFINITIVO|PRELIMINAR))?(?:[ \t]*\([^)\n]*\))?[ \t:–—-]*"
    ).unwrap();

    pub static ref NAME_CARGO_PREFIX: Regex = Regex::new(
        r"(?i)^CARGO[ \t]*[:\-–][ \t]*"
    ).unwrap();

    pub static ref NAME_ORDINAL_PREFIX: Regex = Regex::new(
        r"^(?:\d{1,3}[ \t]*[ºª°]|\d{1,3}[ \t]*[.)–—-]|[IVXL]{1,5}[ \t]*[.)–—-])[ \t]*"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // Inline answer pairs, tried in this order: "12-C", "12.C", "12 C"
    pub static ref INLINE_DASH_PAIR: Regex = Regex::new(
        r"\b(\d{1,3})[ \t]*[-–][ \t]*([A-EX])\b"
    ).unwrap();

    pub static ref INLINE_DOT_PAIR: Regex = Regex::new(
        r"\b(\d{1,3})[ \t]*\.[ \t]*([A-EX])\b"
    ).unwrap();

    pub static ref INLINE_SPACE_PAIR: Regex = Regex::new(
        r"\b(\d{1,3})[ \t]+([A-EX])\b"
    ).unwrap();
}
