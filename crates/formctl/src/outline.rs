//! Plain-text outline of a render tree.
//!
//! One line per node: header, field name and action, then the body. List
//! elements are indented below their container; affordances are shown in
//! brackets.

use std::fmt;

use forms::{Affordance, Body, Control, NodeContent, Readout, RenderNode, RenderTree};

/// Displays a tree as an outline.
pub struct Outline<'a>(pub &'a RenderTree);

impl fmt::Display for Outline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.0.nodes() {
            write_node(f, node)?;
        }
        Ok(())
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &RenderNode) -> fmt::Result {
    let header = node.header().map(|h| h.text()).unwrap_or_default();
    let field = node.field();
    match node.content() {
        NodeContent::Scalar(body) => writeln!(
            f,
            "- {header} ({}, {}) {}",
            field.name,
            node.action(),
            describe(body)
        ),
        NodeContent::List(list) => {
            writeln!(f, "- {header} ({}, {}, list)", field.name, node.action())?;
            for element in list.elements() {
                let body = element.body().map(describe).unwrap_or_default();
                writeln!(f, "    - {body}{}", affordances(element))?;
            }
            if node.affordances().contains(&Affordance::Add) {
                writeln!(f, "    [add]")?;
            }
            Ok(())
        }
    }
}

fn affordances(node: &RenderNode) -> String {
    node.affordances()
        .iter()
        .filter_map(|a| match a {
            Affordance::Remove => Some(" [remove]"),
            Affordance::Add => None,
        })
        .collect()
}

fn describe(body: &Body) -> String {
    match body {
        Body::Control(Control::TextArea { surface, language }) => match language {
            Some(language) => format!("textarea({language}): {:?}", surface.text()),
            None => format!("textarea: {:?}", surface.text()),
        },
        Body::Control(Control::TextInput(input)) => format!("input: {:?}", input.value()),
        Body::Control(Control::NumberInput(input)) => format!("number: {:?}", input.value()),
        Body::Control(Control::Checkbox(checked)) => {
            format!("checkbox: [{}]", if *checked { "x" } else { " " })
        }
        Body::Readout(Readout::Markdown(text)) => format!("markdown: {text:?}"),
        Body::Readout(Readout::Source { text, language }) => match language {
            Some(language) => format!("source({language}): {text:?}"),
            None => format!("source: {text:?}"),
        },
        Body::Readout(Readout::Paragraph(text)) => format!("paragraph: {text:?}"),
    }
}
