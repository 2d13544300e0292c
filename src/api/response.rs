use crate::core::items::SelectItem;
use crate::error::FetchError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalized payload of one remote page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub items: Vec<SelectItem>,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
}

/// Custom deserializer: servers send option values as strings or numbers.
fn deserialize_option_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(default, deserialize_with = "deserialize_option_value")]
    value: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    selected: bool,
}

impl RawOption {
    fn into_item(self, group: Option<String>) -> SelectItem {
        SelectItem {
            value: self.value,
            text: self.text,
            group,
            selected: self.selected,
            hidden: false,
        }
    }
}

/// One raw entry: an optgroup with nested options, or a plain option.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Group {
        label: String,
        options: Vec<RawOption>,
    },
    Flat(RawOption),
}

type ListExtractor = fn(&Value) -> Option<Vec<Value>>;

fn extract_bare(value: &Value) -> Option<Vec<Value>> {
    value.as_array().cloned()
}

fn extract_data(value: &Value) -> Option<Vec<Value>> {
    // A `data` field that is not an array is tolerated as an empty list.
    value
        .get("data")
        .map(|d| d.as_array().cloned().unwrap_or_default())
}

fn extract_object(value: &Value) -> Option<Vec<Value>> {
    value.get("object").and_then(Value::as_array).cloned()
}

fn extract_items(value: &Value) -> Option<Vec<Value>> {
    value.get("items").and_then(Value::as_array).cloned()
}

/// Known response shapes, tried in priority order, first match wins.
const SHAPES: &[(&str, ListExtractor)] = &[
    ("array", extract_bare),
    ("data", extract_data),
    ("object", extract_object),
    ("items", extract_items),
];

/// Normalize a server response into a flat item list plus pagination fields.
///
/// Pagination is read independently of which shape produced the list: either
/// top-level `page`/`totalPages` or a nested `pagination` object.
pub fn parse_response(value: &Value) -> Result<ParsedResponse, FetchError> {
    if !value.is_array() && !value.is_object() {
        return Err(FetchError::Parse {
            message: "response is neither an array nor an object".to_string(),
        });
    }

    let raw_list = SHAPES
        .iter()
        .find_map(|(name, extract)| {
            extract(value).inspect(|list| {
                log::debug!("response matched '{}' shape ({} entries)", name, list.len());
            })
        })
        .unwrap_or_default();

    let mut items = Vec::new();
    for raw in raw_list {
        flatten_entry(raw, &mut items);
    }

    let (page, total_pages) = read_page_meta(value);
    Ok(ParsedResponse {
        items,
        page,
        total_pages,
    })
}

fn flatten_entry(raw: Value, out: &mut Vec<SelectItem>) {
    match serde_json::from_value::<RawEntry>(raw) {
        Ok(RawEntry::Group { label, options }) => {
            out.extend(
                options
                    .into_iter()
                    .map(|option| option.into_item(Some(label.clone()))),
            );
        }
        Ok(RawEntry::Flat(option)) => out.push(option.into_item(None)),
        Err(e) => log::debug!("skipping malformed item: {}", e),
    }
}

fn read_page_meta(value: &Value) -> (Option<u32>, Option<u32>) {
    let meta = if value.get("page").is_some() || value.get("totalPages").is_some() {
        Some(value)
    } else {
        value.get("pagination")
    };

    match meta {
        Some(m) => (read_u32(m, "page"), read_u32(m, "totalPages")),
        None => (None, None),
    }
}

fn read_u32(value: &Value, key: &str) -> Option<u32> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}
