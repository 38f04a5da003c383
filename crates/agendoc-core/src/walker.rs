//! Agenda tree traversal
//!
//! Visits main events, their sub-events and the sub-events' activities in
//! document order, rendering each entity's fields in its schema slot order.

use std::collections::HashSet;

use agendoc_ooxml::Document;
use tracing::{debug, warn};

use crate::config::FieldConfig;
use crate::render::{render_aliased_field, render_combined};
use crate::schema::{
    EntityKind, EventNode, FieldSlot, Slot, ACTIVITIES_TAG, ACTIVITY_TAG, MAIN_EVENT_TAG,
    PROGRAM_TAG, SUB_EVENT_TAG,
};

/// Logical fields already rendered for one entity instance
///
/// Keys are canonical field names, so every alias of a field shares one
/// entry.
#[derive(Debug, Default)]
pub struct ProcessedFields {
    keys: HashSet<&'static str>,
}

impl ProcessedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field; returns `false` if it was already recorded
    pub fn mark(&mut self, key: &'static str) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Counts gathered during a walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub main_events: usize,
    pub sub_events: usize,
    pub activities: usize,
    pub paragraphs: usize,
}

/// Renders an agenda tree into a document
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    config: &'a FieldConfig,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a FieldConfig) -> Self {
        Self { config }
    }

    /// Render every main event under `root`, with its nested program
    pub fn walk(&self, root: &EventNode, document: &mut Document) -> WalkStats {
        let mut stats = WalkStats::default();

        for event in root.children_named(MAIN_EVENT_TAG) {
            stats.main_events += 1;
            stats.paragraphs += self.render_entity(EntityKind::MainEvent, event, document);

            let Some(program) = event.child(PROGRAM_TAG) else {
                continue;
            };
            for sub_event in program.children_named(SUB_EVENT_TAG) {
                stats.sub_events += 1;
                stats.paragraphs += self.render_entity(EntityKind::SubEvent, sub_event, document);

                let Some(activities) = sub_event.child(ACTIVITIES_TAG) else {
                    continue;
                };
                for activity in activities.children_named(ACTIVITY_TAG) {
                    stats.activities += 1;
                    stats.paragraphs +=
                        self.render_entity(EntityKind::Activity, activity, document);
                }
            }
        }

        debug!(
            "Walked {} main events, {} sub-events, {} activities",
            stats.main_events, stats.sub_events, stats.activities
        );
        stats
    }

    /// Render the fields of one entity, returning the number of paragraphs
    /// added
    ///
    /// Children that are not fields of the entity are ignored.
    pub fn render_entity(&self, kind: EntityKind, node: &EventNode, document: &mut Document) -> usize {
        let mut processed = ProcessedFields::new();
        let mut rendered = 0;

        for slot in kind.schema().slots {
            match *slot {
                Slot::Single(field) => {
                    if processed.contains(field.key()) {
                        continue;
                    }
                    let text = field_content(node, field);
                    if render_aliased_field(document, field.names, text, self.config) {
                        processed.mark(field.key());
                        rendered += 1;
                    }
                }
                Slot::TimePlace { time, place } => {
                    if processed.contains(time.key()) || processed.contains(place.key()) {
                        continue;
                    }
                    if !is_present(node, time) && !is_present(node, place) {
                        continue;
                    }
                    if render_combined(
                        document,
                        (time.key(), field_content(node, time)),
                        (place.key(), field_content(node, place)),
                        self.config,
                    ) {
                        rendered += 1;
                    }
                    processed.mark(time.key());
                    processed.mark(place.key());
                }
            }
        }

        rendered
    }
}

/// Render an agenda tree with the given configuration
pub fn walk(root: &EventNode, config: &FieldConfig, document: &mut Document) -> WalkStats {
    TreeWalker::new(config).walk(root, document)
}

fn is_present(node: &EventNode, field: FieldSlot) -> bool {
    field.names.iter().any(|name| node.child(name).is_some())
}

/// Text of the first alias with content
fn field_content(node: &EventNode, field: FieldSlot) -> Option<&str> {
    let mut found: Option<(&str, &str)> = None;
    for &name in field.names {
        let Some(text) = node.child_content(name) else {
            continue;
        };
        match found {
            None => found = Some((name, text)),
            Some((first, kept)) if kept != text => warn!(
                "Both <{}> and <{}> are set; rendering <{}> only",
                first, name, first
            ),
            Some(_) => {}
        }
    }
    found.map(|(_, text)| text)
}
