//! Agenda XML vocabulary and tree
//!
//! An agenda file nests three kinds of entity:
//!
//! ```text
//! <Agenda>
//!   <Evento-Principal>               main event
//!     <Evento-Principal-Titulo/> ...
//!     <Evento-Principal-Programa>
//!       <Sub-evento>                 sub-event
//!         <Sub-evento-Titulo/> ...
//!         <Sub-evento-actividades>
//!           <actividad>              activity
//!             <actividad-titulo/> ...
//! ```
//!
//! Every field is optional. The root element's name is not checked.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ConvertError, Result};

pub const MAIN_EVENT_TAG: &str = "Evento-Principal";
pub const PROGRAM_TAG: &str = "Evento-Principal-Programa";
pub const SUB_EVENT_TAG: &str = "Sub-evento";
pub const ACTIVITIES_TAG: &str = "Sub-evento-actividades";
pub const ACTIVITY_TAG: &str = "actividad";

/// An element of the parsed agenda
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventNode {
    /// Element name
    pub tag: String,
    /// Character data inside the element before its first child
    pub text: Option<String>,
    /// Child elements, in document order
    pub children: Vec<EventNode>,
}

impl EventNode {
    /// Create a node with no text and no children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Parse an XML document and return its root element
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<EventNode> = Vec::new();
        let mut root: Option<EventNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    stack.push(EventNode::new(tag));
                }
                Ok(Event::Empty(e)) => {
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    attach(&mut stack, &mut root, EventNode::new(tag))?;
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ConvertError::MalformedXml(e.to_string()))?;
                    match stack.last_mut() {
                        Some(node) => node.push_text(&text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(ConvertError::MalformedXml(
                                "text outside the root element".into(),
                            ))
                        }
                    }
                }
                Ok(Event::CData(t)) => {
                    if let Some(node) = stack.last_mut() {
                        node.push_text(&String::from_utf8_lossy(&t));
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node)?;
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ConvertError::MalformedXml(format!(
                        "at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ConvertError::MalformedXml(format!(
                "unclosed element <{}>",
                stack[stack.len() - 1].tag
            )));
        }
        root.ok_or_else(|| ConvertError::MalformedXml("document has no root element".into()))
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&EventNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given tag, in document order
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a EventNode> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Trimmed text, or `None` when absent, empty or whitespace-only
    pub fn content(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Trimmed text of the first child with the given tag
    pub fn child_content(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(EventNode::content)
    }

    fn push_text(&mut self, text: &str) {
        // Text after a child element is its tail, not ours
        if !self.children.is_empty() {
            return;
        }
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

fn attach(stack: &mut [EventNode], root: &mut Option<EventNode>, node: EventNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => {
            return Err(ConvertError::MalformedXml(format!(
                "second root element <{}>",
                node.tag
            )))
        }
    }
    Ok(())
}

/// The three entity levels of an agenda
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    MainEvent,
    SubEvent,
    Activity,
}

impl EntityKind {
    /// Field layout of this entity
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::MainEvent => &MAIN_EVENT,
            EntityKind::SubEvent => &SUB_EVENT,
            EntityKind::Activity => &ACTIVITY,
        }
    }
}

/// One logical field and the tag names it may appear under
///
/// The first name is canonical; the others are spellings found in real
/// agenda exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub names: &'static [&'static str],
}

impl FieldSlot {
    /// Canonical tag name, also the field's deduplication key
    pub fn key(&self) -> &'static str {
        self.names[0]
    }
}

/// A position in an entity's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A field rendered as its own paragraph
    Single(FieldSlot),
    /// Time and place rendered together as `time · place`
    TimePlace { time: FieldSlot, place: FieldSlot },
}

/// Ordered output slots of one entity type
#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub tag: &'static str,
    pub slots: &'static [Slot],
}

const fn single(names: &'static [&'static str]) -> Slot {
    Slot::Single(FieldSlot { names })
}

const fn time_place(time: &'static [&'static str], place: &'static [&'static str]) -> Slot {
    Slot::TimePlace {
        time: FieldSlot { names: time },
        place: FieldSlot { names: place },
    }
}

pub static MAIN_EVENT: EntitySchema = EntitySchema {
    kind: EntityKind::MainEvent,
    tag: MAIN_EVENT_TAG,
    slots: &[
        single(&["Evento-Principal-Titulo"]),
        single(&["Evento-Principal-Dia"]),
        time_place(&["Evento-Principal-Hora"], &["Evento-Principal-Lugar"]),
        single(&["Evento-Principal-Descripcion"]),
        single(&["Evento-Principal-info.extra"]),
    ],
};

pub static SUB_EVENT: EntitySchema = EntitySchema {
    kind: EntityKind::SubEvent,
    tag: SUB_EVENT_TAG,
    slots: &[
        single(&["Sub-evento-Titulo"]),
        single(&["Sub-evento-Dia"]),
        time_place(&["Sub-evento-Hora"], &["Sub-evento-Lugar"]),
        single(&["Sub-evento-Descripcion", "Sub-evento-descripcion"]),
        single(&["Sub-evento-info.extra"]),
    ],
};

pub static ACTIVITY: EntitySchema = EntitySchema {
    kind: EntityKind::Activity,
    tag: ACTIVITY_TAG,
    slots: &[
        single(&["actividad-titulo"]),
        time_place(&["actividad-hora"], &["actividad-lugar"]),
        single(&["actividad-descripcion", "actividad-descipcion"]),
        single(&["actividad-info-extra"]),
    ],
};

/// Every recognized field tag, aliases included, in schema order
pub fn all_field_names() -> impl Iterator<Item = &'static str> {
    [&MAIN_EVENT, &SUB_EVENT, &ACTIVITY]
        .into_iter()
        .flat_map(|schema| schema.slots.iter())
        .flat_map(|slot| match slot {
            Slot::Single(field) => field.names.to_vec(),
            Slot::TimePlace { time, place } => {
                time.names.iter().chain(place.names).copied().collect()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Agenda>
  <Evento-Principal>
    <Evento-Principal-Titulo> Festa Major </Evento-Principal-Titulo>
    <Evento-Principal-Hora>   </Evento-Principal-Hora>
    <Evento-Principal-Lugar/>
    <Evento-Principal-Programa>
      <Sub-evento><Sub-evento-Titulo>Concert</Sub-evento-Titulo></Sub-evento>
      <Sub-evento><Sub-evento-Titulo><![CDATA[Ball & Sopar]]></Sub-evento-Titulo></Sub-evento>
    </Evento-Principal-Programa>
  </Evento-Principal>
  <Evento-Principal/>
</Agenda>"#;

    #[test]
    fn test_parse_tree() {
        let root = EventNode::parse(SAMPLE).unwrap();
        assert_eq!(root.tag, "Agenda");
        assert_eq!(root.children_named(MAIN_EVENT_TAG).count(), 2);

        let event = root.child(MAIN_EVENT_TAG).unwrap();
        assert_eq!(event.child_content("Evento-Principal-Titulo"), Some("Festa Major"));

        let program = event.child(PROGRAM_TAG).unwrap();
        let titles: Vec<_> = program
            .children_named(SUB_EVENT_TAG)
            .filter_map(|s| s.child_content("Sub-evento-Titulo"))
            .collect();
        assert_eq!(titles, vec!["Concert", "Ball & Sopar"]);
    }

    #[test]
    fn test_blank_text_is_no_content() {
        let root = EventNode::parse(SAMPLE).unwrap();
        let event = root.child(MAIN_EVENT_TAG).unwrap();

        // Present but blank, and present but empty
        assert!(event.child("Evento-Principal-Hora").is_some());
        assert_eq!(event.child_content("Evento-Principal-Hora"), None);
        assert!(event.child("Evento-Principal-Lugar").is_some());
        assert_eq!(event.child_content("Evento-Principal-Lugar"), None);
        // Absent
        assert_eq!(event.child_content("Evento-Principal-Dia"), None);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let root = EventNode::parse("<a><b>Salt &amp; Pepper</b></a>").unwrap();
        assert_eq!(root.child_content("b"), Some("Salt & Pepper"));
    }

    #[test]
    fn test_text_stops_at_first_child() {
        let root = EventNode::parse(
            "<Evento-Principal-Titulo>Gala <b>x</b> nit<br/>!</Evento-Principal-Titulo>",
        )
        .unwrap();
        assert_eq!(root.content(), Some("Gala"));
        assert_eq!(root.child_content("b"), Some("x"));
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_malformed_is_rejected() {
        assert!(matches!(
            EventNode::parse("<a><b></a>"),
            Err(ConvertError::MalformedXml(_))
        ));
        assert!(matches!(
            EventNode::parse("<a><b>"),
            Err(ConvertError::MalformedXml(_))
        ));
        assert!(matches!(
            EventNode::parse("   "),
            Err(ConvertError::MalformedXml(_))
        ));
        assert!(matches!(
            EventNode::parse("<a/><b/>"),
            Err(ConvertError::MalformedXml(_))
        ));
    }

    #[test]
    fn test_slot_order() {
        let slots = EntityKind::Activity.schema().slots;
        assert_eq!(slots.len(), 4);
        assert!(matches!(slots[0], Slot::Single(f) if f.key() == "actividad-titulo"));
        assert!(matches!(
            slots[1],
            Slot::TimePlace { time, place }
                if time.key() == "actividad-hora" && place.key() == "actividad-lugar"
        ));
    }

    #[test]
    fn test_every_entity_has_one_pair() {
        for kind in [EntityKind::MainEvent, EntityKind::SubEvent, EntityKind::Activity] {
            let pairs = kind
                .schema()
                .slots
                .iter()
                .filter(|s| matches!(s, Slot::TimePlace { .. }))
                .count();
            assert_eq!(pairs, 1, "{:?}", kind);
        }
    }

    #[test]
    fn test_all_field_names_include_aliases() {
        let names: Vec<_> = all_field_names().collect();
        assert_eq!(names.len(), 19);
        assert!(names.contains(&"actividad-descipcion"));
        assert!(names.contains(&"Sub-evento-descripcion"));
        assert!(names.contains(&"Evento-Principal-info.extra"));
    }
}
