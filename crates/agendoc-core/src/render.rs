//! Field rendering
//!
//! Each rendered field becomes one new paragraph at the end of the
//! document. A paragraph-type style goes on the paragraph; a character-type
//! style goes on the run holding the text.

use agendoc_ooxml::{Document, Paragraph};

use crate::config::{FieldConfig, StyleKind};
use crate::resolver::{ensure_registered, resolve_any, RenderContext, ResolvedStyle};

/// Separator between the time and place of a combined line
pub const COMBINED_SEPARATOR: &str = " · ";

/// Render one field as its own paragraph
///
/// Returns `false`, leaving the document untouched, when the text is
/// missing or blank.
pub fn render_field(
    document: &mut Document,
    field: &str,
    text: Option<&str>,
    config: &FieldConfig,
) -> bool {
    render_aliased_field(document, &[field], text, config)
}

/// Render a field known under several tag names; the style is resolved
/// through the names in order
pub fn render_aliased_field(
    document: &mut Document,
    names: &[&str],
    text: Option<&str>,
    config: &FieldConfig,
) -> bool {
    let Some(text) = non_blank(text) else {
        return false;
    };

    let style = resolve_any(names, config, RenderContext::Standalone);
    ensure_registered(document, &style.name, style.style_type);

    let paragraph = document.add_paragraph();
    apply_style(paragraph, text, &style);
    true
}

/// Render time and place together in one paragraph
///
/// With both present the paragraph reads `time · place`, the separator
/// being an unstyled run. With one present only that half is written. With
/// neither no paragraph is created and `false` is returned.
pub fn render_combined(
    document: &mut Document,
    (time_field, time_text): (&str, Option<&str>),
    (place_field, place_text): (&str, Option<&str>),
    config: &FieldConfig,
) -> bool {
    let time = non_blank(time_text).map(|text| {
        let style = resolve_any(&[time_field], config, RenderContext::CombinedHalf);
        (text, style)
    });
    let place = non_blank(place_text).map(|text| {
        let style = resolve_any(&[place_field], config, RenderContext::CombinedHalf);
        (text, style)
    });

    if time.is_none() && place.is_none() {
        return false;
    }

    for (_, style) in time.iter().chain(place.iter()) {
        ensure_registered(document, &style.name, style.style_type);
    }

    let paragraph = document.add_paragraph();
    if let Some((text, style)) = &time {
        apply_style(paragraph, text, style);
    }
    if time.is_some() && place.is_some() {
        paragraph.add_run(COMBINED_SEPARATOR);
    }
    if let Some((text, style)) = &place {
        apply_style(paragraph, text, style);
    }
    true
}

/// A paragraph style replaces any style already on the paragraph, so when
/// both halves of a combined line are paragraph-typed the place wins.
fn apply_style(paragraph: &mut Paragraph, text: &str, style: &ResolvedStyle) {
    match style.style_type {
        StyleKind::Paragraph => {
            paragraph.style = Some(style.name.clone());
            paragraph.add_run(text);
        }
        StyleKind::Character => paragraph.add_styled_run(text, style.name.clone()),
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldStyle;
    use crate::DEFAULT_STYLE_NAME;
    use agendoc_ooxml::{Run, StyleType};

    fn run(text: &str, style: Option<&str>) -> Run {
        Run {
            text: text.to_string(),
            style: style.map(str::to_string),
        }
    }

    #[test]
    fn test_blank_field_is_skipped() {
        let mut doc = Document::new();
        let styles_before = doc.styles.len();
        let config = FieldConfig::new();

        assert!(!render_field(&mut doc, "Sub-evento-Titulo", None, &config));
        assert!(!render_field(&mut doc, "Sub-evento-Titulo", Some(""), &config));
        assert!(!render_field(&mut doc, "Sub-evento-Titulo", Some(" \n\t"), &config));

        assert!(doc.paragraphs.is_empty());
        assert_eq!(doc.styles.len(), styles_before);
    }

    #[test]
    fn test_paragraph_style_field() {
        let mut doc = Document::new();
        let mut config = FieldConfig::new();
        config.insert(
            "Evento-Principal-Titulo",
            FieldStyle::new("Agenda Titol", StyleKind::Paragraph),
        );

        assert!(render_field(
            &mut doc,
            "Evento-Principal-Titulo",
            Some("  Gala  "),
            &config
        ));

        assert_eq!(doc.paragraphs.len(), 1);
        let para = &doc.paragraphs[0];
        assert_eq!(para.style.as_deref(), Some("Agenda Titol"));
        assert_eq!(para.runs, vec![run("Gala", None)]);
        assert_eq!(
            doc.styles.get("Agenda Titol").unwrap().style_type,
            StyleType::Paragraph
        );
    }

    #[test]
    fn test_character_style_field() {
        let mut doc = Document::new();
        let mut config = FieldConfig::new();
        config.insert("actividad-titulo", FieldStyle::new("Negreta", StyleKind::Character));

        render_field(&mut doc, "actividad-titulo", Some("Taller"), &config);

        let para = &doc.paragraphs[0];
        assert_eq!(para.style, None);
        assert_eq!(para.runs, vec![run("Taller", Some("Negreta"))]);
        assert_eq!(
            doc.styles.get("Negreta").unwrap().style_type,
            StyleType::Character
        );
    }

    #[test]
    fn test_unmapped_field_uses_default_paragraph_style() {
        let mut doc = Document::new();
        render_field(&mut doc, "Evento-Principal-Dia", Some("Dilluns"), &FieldConfig::new());

        assert_eq!(doc.paragraphs[0].style.as_deref(), Some(DEFAULT_STYLE_NAME));
        assert!(doc.styles.contains(DEFAULT_STYLE_NAME));
    }

    #[test]
    fn test_combined_both_present() {
        let mut doc = Document::new();
        let config = FieldConfig::new();

        assert!(render_combined(
            &mut doc,
            ("Sub-evento-Hora", Some("10:00")),
            ("Sub-evento-Lugar", Some("Hall A")),
            &config,
        ));

        assert_eq!(doc.paragraphs.len(), 1);
        let para = &doc.paragraphs[0];
        assert_eq!(para.plain_text(), "10:00 · Hall A");
        assert_eq!(
            para.runs,
            vec![
                run("10:00", Some(DEFAULT_STYLE_NAME)),
                run(" · ", None),
                run("Hall A", Some(DEFAULT_STYLE_NAME)),
            ]
        );
        assert_eq!(para.style, None);
    }

    #[test]
    fn test_combined_only_time() {
        let mut doc = Document::new();
        render_combined(
            &mut doc,
            ("Sub-evento-Hora", Some("10:00")),
            ("Sub-evento-Lugar", Some("  ")),
            &FieldConfig::new(),
        );

        assert_eq!(doc.paragraphs[0].plain_text(), "10:00");
        assert_eq!(doc.paragraphs[0].runs.len(), 1);
    }

    #[test]
    fn test_combined_only_place() {
        let mut doc = Document::new();
        render_combined(
            &mut doc,
            ("actividad-hora", None),
            ("actividad-lugar", Some("Hall A")),
            &FieldConfig::new(),
        );

        assert_eq!(doc.paragraphs[0].plain_text(), "Hall A");
    }

    #[test]
    fn test_combined_both_empty() {
        let mut doc = Document::new();
        assert!(!render_combined(
            &mut doc,
            ("actividad-hora", Some("")),
            ("actividad-lugar", None),
            &FieldConfig::new(),
        ));
        assert!(doc.paragraphs.is_empty());
    }

    #[test]
    fn test_combined_halves_styled_independently() {
        let mut doc = Document::new();
        let mut config = FieldConfig::new();
        config.insert("actividad-hora", FieldStyle::new("Hora", StyleKind::Character));
        config.insert("actividad-lugar", FieldStyle::new("Lloc", StyleKind::Paragraph));

        render_combined(
            &mut doc,
            ("actividad-hora", Some("18:30")),
            ("actividad-lugar", Some("Ateneu")),
            &config,
        );

        let para = &doc.paragraphs[0];
        assert_eq!(para.style.as_deref(), Some("Lloc"));
        assert_eq!(
            para.runs,
            vec![
                run("18:30", Some("Hora")),
                run(" · ", None),
                run("Ateneu", None),
            ]
        );
    }

    #[test]
    fn test_combined_two_paragraph_halves_place_wins() {
        let mut doc = Document::new();
        let mut config = FieldConfig::new();
        config.insert("actividad-hora", FieldStyle::new("Hora", StyleKind::Paragraph));
        config.insert("actividad-lugar", FieldStyle::new("Lloc", StyleKind::Paragraph));

        render_combined(
            &mut doc,
            ("actividad-hora", Some("18:30")),
            ("actividad-lugar", Some("Ateneu")),
            &config,
        );

        assert_eq!(doc.paragraphs[0].style.as_deref(), Some("Lloc"));
        assert!(doc.styles.contains("Hora"));
    }
}
