//! Container listing bodies
//!
//! Turns a GET body into child paths. The body format follows the `Accept` header
//! the entity sent; without one the cluster answers with one name per line.

use serde::Deserialize;

use super::{Context, ListingFormat};
use crate::error::{Error, Result};

/// One listing row; normal listings carry `name` or `subdir`, search rows carry
/// `type`, `container` and `name`
#[derive(Debug, Default, Deserialize)]
struct ListingItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    subdir: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    container: Option<String>,
}

impl ListingItem {
    fn child_path(&self, context: Context, parent: &str) -> String {
        if context == Context::Search {
            let container = self.container.as_deref().unwrap_or_default();
            return match self.kind.as_deref() {
                Some("container") => container.to_string(),
                _ => format!("{container}/{}", self.name.as_deref().unwrap_or_default()),
            };
        }

        let name = self
            .name
            .as_deref()
            .or(self.subdir.as_deref())
            .unwrap_or_default();
        join(parent, name)
    }
}

fn join(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Child paths named by a listing body
pub(crate) fn parse_listing(
    format: Option<ListingFormat>,
    context: Context,
    parent: &str,
    body: &[u8],
) -> Result<Vec<String>> {
    let items = match format {
        Some(ListingFormat::Json) => {
            let items: Vec<ListingItem> = serde_json::from_slice(body)?;
            items
        }
        Some(ListingFormat::Xml) => parse_xml(body)?,
        Some(ListingFormat::Text) | None => return Ok(parse_text(parent, body)),
    };

    Ok(items
        .iter()
        .map(|item| item.child_path(context, parent))
        .collect())
}

fn parse_text(parent: &str, body: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(body)
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(|line| join(parent, line))
        .collect()
}

/// Rows of an XML listing
///
/// The root element holds `<object>`/`<subdir>` rows for a container or
/// `<container>` rows for the account; object rows win when both appear.
fn parse_xml(body: &[u8]) -> Result<Vec<ListingItem>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);

    let mut objects = Vec::new();
    let mut containers = Vec::new();
    let mut current: Option<(String, ListingItem)> = None;
    let mut field = String::new();
    let mut depth = 0usize;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if depth == 2 {
                    let mut item = ListingItem::default();
                    if tag == "subdir" {
                        item.subdir = attribute(e, "name")?;
                    }
                    current = Some((tag, item));
                } else if depth == 3 {
                    field = tag;
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 1 && e.name().as_ref() == b"subdir" {
                    let item = ListingItem {
                        subdir: attribute(e, "name")?,
                        ..Default::default()
                    };
                    objects.push(item);
                }
            }
            Ok(Event::Text(ref e)) => {
                if depth == 3
                    && let Some((_, item)) = current.as_mut()
                {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::Listing(e.to_string()))?
                        .to_string();
                    set_field(item, &field, text);
                }
            }
            Ok(Event::CData(e)) => {
                if depth == 3
                    && let Some((_, item)) = current.as_mut()
                {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    set_field(item, &field, text);
                }
            }
            Ok(Event::End(_)) => {
                if depth == 2
                    && let Some((tag, item)) = current.take()
                {
                    match tag.as_str() {
                        "object" | "subdir" => objects.push(item),
                        "container" => containers.push(item),
                        _ => {}
                    }
                } else if depth == 3 {
                    field.clear();
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Listing(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(if objects.is_empty() { containers } else { objects })
}

fn set_field(item: &mut ListingItem, field: &str, text: String) {
    match field {
        "name" => item.name = Some(text),
        "subdir" => item.subdir = Some(text),
        "type" => item.kind = Some(text),
        "container" => item.container = Some(text),
        _ => {}
    }
}

fn attribute(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|e| Error::Listing(e.to_string()))?;
    match attr {
        Some(a) => {
            let value = a
                .unescape_value()
                .map_err(|e| Error::Listing(e.to_string()))?;
            Ok(Some(value.to_string()))
        }
        None => Ok(None),
    }
}
