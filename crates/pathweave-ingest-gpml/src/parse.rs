//! Streaming GPML reader.

use crate::{GpmlError, GpmlOptions, Result, DEFAULT_NODE_TYPE};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub group_ref: Option<String>,
    /// Identifier URI built from the node's `Xref`, when it names both parts.
    pub uri: Option<String>,
}

/// `<Group GroupId=".." GraphId=".."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDecl {
    pub group_id: String,
    pub graph_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Point {
    pub graph_ref: Option<String>,
    pub arrow_head: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramInteraction {
    pub id: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagram {
    pub title: Option<String>,
    /// Keyed by graph id, in document order; a repeated id replaces the node.
    pub nodes: IndexMap<String, DiagramNode>,
    pub groups: Vec<GroupDecl>,
    pub interactions: Vec<DiagramInteraction>,
}

/// Element currently open at the nesting level we care about.
enum Open {
    Nothing,
    DataNode(DiagramNode),
    Interaction(DiagramInteraction),
}

/// Attributes by local name; empty values count as absent.
fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut out = HashMap::new();
    for attr in element.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?;
        if !value.is_empty() {
            out.insert(key, value.into_owned());
        }
    }
    Ok(out)
}

struct DiagramReader<'o> {
    options: &'o GpmlOptions,
    diagram: Diagram,
    open: Open,
    seen_root: bool,
    auto_ids: usize,
    interaction_index: usize,
}

impl<'o> DiagramReader<'o> {
    fn start(&mut self, element: &BytesStart<'_>, self_closing: bool) -> Result<()> {
        match element.local_name().as_ref() {
            b"Pathway" => {
                self.seen_root = true;
                let mut attrs = attributes(element)?;
                self.diagram.title = attrs.remove("Name");
            }
            b"DataNode" => {
                let mut attrs = attributes(element)?;
                let id = match attrs.remove("GraphId") {
                    Some(id) => id,
                    None => {
                        let id = format!("auto_{}", self.auto_ids);
                        self.auto_ids += 1;
                        id
                    }
                };
                let node = DiagramNode {
                    label: attrs.remove("TextLabel").unwrap_or_else(|| id.clone()),
                    kind: attrs
                        .remove("Type")
                        .unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string()),
                    group_ref: attrs.remove("GroupRef"),
                    uri: None,
                    id,
                };
                if self_closing {
                    self.push_node(node);
                } else {
                    self.open = Open::DataNode(node);
                }
            }
            b"Xref" => {
                if let Open::DataNode(node) = &mut self.open {
                    // First Xref only.
                    if node.uri.is_none() {
                        let attrs = attributes(element)?;
                        if let (Some(db), Some(id)) = (attrs.get("Database"), attrs.get("ID")) {
                            node.uri = Some(self.options.xref_uri(db, id));
                        }
                    }
                }
            }
            b"Interaction" => {
                let mut attrs = attributes(element)?;
                let id = attrs
                    .remove("GraphId")
                    .unwrap_or_else(|| format!("interaction_{}", self.interaction_index));
                self.interaction_index += 1;
                let interaction = DiagramInteraction {
                    id,
                    points: Vec::new(),
                };
                if self_closing {
                    self.diagram.interactions.push(interaction);
                } else {
                    self.open = Open::Interaction(interaction);
                }
            }
            b"Point" => {
                if let Open::Interaction(interaction) = &mut self.open {
                    let mut attrs = attributes(element)?;
                    interaction.points.push(Point {
                        graph_ref: attrs.remove("GraphRef"),
                        arrow_head: attrs.remove("ArrowHead"),
                    });
                }
            }
            b"Group" => {
                let mut attrs = attributes(element)?;
                if let Some(group_id) = attrs.remove("GroupId") {
                    self.diagram.groups.push(GroupDecl {
                        group_id,
                        graph_id: attrs.remove("GraphId"),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) {
        match (local_name, std::mem::replace(&mut self.open, Open::Nothing)) {
            (b"DataNode", Open::DataNode(node)) => self.push_node(node),
            (b"Interaction", Open::Interaction(interaction)) => {
                self.diagram.interactions.push(interaction)
            }
            (_, open) => self.open = open,
        }
    }

    fn push_node(&mut self, node: DiagramNode) {
        self.diagram.nodes.insert(node.id.clone(), node);
    }
}

/// Parse a GPML document into its nodes, group declarations and interactions.
pub fn parse_diagram(xml: &str, options: &GpmlOptions) -> Result<Diagram> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut state = DiagramReader {
        options,
        diagram: Diagram::default(),
        open: Open::Nothing,
        seen_root: false,
        auto_ids: 0,
        interaction_index: 0,
    };

    loop {
        match reader.read_event()? {
            Event::Start(element) => state.start(&element, false)?,
            Event::Empty(element) => state.start(&element, true)?,
            Event::End(element) => state.end(element.local_name().as_ref()),
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.seen_root {
        return Err(GpmlError::MissingRoot);
    }
    tracing::debug!(
        nodes = state.diagram.nodes.len(),
        groups = state.diagram.groups.len(),
        interactions = state.diagram.interactions.len(),
        "parsed diagram"
    );
    Ok(state.diagram)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> Diagram {
        parse_diagram(xml, &GpmlOptions::default()).unwrap()
    }

    #[test]
    fn data_node_defaults() {
        let diagram = parse(
            r#"<Pathway>
                 <DataNode TextLabel="TP53"/>
                 <DataNode GraphId="x"/>
                 <DataNode TextLabel="MDM2"><Xref Database="Uniprot-TrEMBL" ID="Q00987"/></DataNode>
               </Pathway>"#,
        );
        let ids: Vec<&str> = diagram.nodes.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["auto_0", "x", "auto_1"]);
        assert_eq!(diagram.nodes["auto_0"].label, "TP53");
        assert_eq!(diagram.nodes["auto_0"].kind, "DataNode");
        assert_eq!(diagram.nodes["x"].label, "x");
        assert_eq!(
            diagram.nodes["auto_1"].uri.as_deref(),
            Some("https://identifiers.org/uniprot-trembl/Q00987")
        );
        assert!(diagram.title.is_none());
    }

    #[test]
    fn namespace_prefixes_are_ignored() {
        let diagram = parse(
            r#"<gpml:Pathway xmlns:gpml="http://pathvisio.org/GPML/2013a" Name="NS">
                 <gpml:DataNode GraphId="a" TextLabel="A" gpml:GroupRef="g"/>
                 <gpml:Group GroupId="g" GraphId="G"/>
               </gpml:Pathway>"#,
        );
        assert_eq!(diagram.title.as_deref(), Some("NS"));
        assert_eq!(diagram.nodes["a"].group_ref.as_deref(), Some("g"));
        assert_eq!(
            diagram.groups,
            vec![GroupDecl {
                group_id: "g".to_string(),
                graph_id: Some("G".to_string())
            }]
        );
    }

    #[test]
    fn interaction_points_and_fallback_ids() {
        let diagram = parse(
            r#"<Pathway>
                 <Interaction>
                   <Graphics>
                     <Point GraphRef="a"/>
                     <Point GraphRef="" ArrowHead="Arrow"/>
                     <Point GraphRef="b" ArrowHead="mim-conversion"/>
                   </Graphics>
                 </Interaction>
                 <Interaction GraphId="named"/>
               </Pathway>"#,
        );
        assert_eq!(diagram.interactions.len(), 2);
        let first = &diagram.interactions[0];
        assert_eq!(first.id, "interaction_0");
        assert_eq!(first.points.len(), 3);
        assert_eq!(first.points[1].graph_ref, None);
        assert_eq!(first.points[2].arrow_head.as_deref(), Some("mim-conversion"));
        assert_eq!(diagram.interactions[1].id, "named");
    }

    #[test]
    fn xref_outside_data_node_is_ignored() {
        let diagram = parse(
            r#"<Pathway>
                 <DataNode GraphId="a" TextLabel="A"/>
                 <Interaction GraphId="i"><Xref Database="x" ID="1"/></Interaction>
               </Pathway>"#,
        );
        assert!(diagram.nodes["a"].uri.is_none());
    }

    #[test]
    fn escaped_attribute_values_are_decoded() {
        let diagram = parse(r#"<Pathway Name="A &amp; B"><DataNode GraphId="n" TextLabel="&lt;x&gt;"/></Pathway>"#);
        assert_eq!(diagram.title.as_deref(), Some("A & B"));
        assert_eq!(diagram.nodes["n"].label, "<x>");
    }
}
