use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// HTTP verb for the remote search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// Extra request parameters merged into every fetch, either a static map or a
/// closure receiving the current keyword and page.
#[derive(Clone, Default)]
pub enum AjaxData {
    #[default]
    None,
    Map(HashMap<String, String>),
    Builder(Arc<dyn Fn(&str, u32) -> HashMap<String, String> + Send + Sync>),
}

impl fmt::Debug for AjaxData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AjaxData::None => write!(f, "None"),
            AjaxData::Map(map) => f.debug_tuple("Map").field(map).finish(),
            AjaxData::Builder(_) => write!(f, "Builder(..)"),
        }
    }
}

/// Remote-search configuration supplied by the widget embedder.
///
/// The controller is in AJAX mode whenever a config is set, even one without
/// a usable url; `has_url` decides whether a fetch can actually be dispatched.
#[derive(Debug, Clone, Default)]
pub struct AjaxConfig {
    pub url: Option<String>,
    pub method: HttpMethod,
    pub data: AjaxData,
    pub keep_selected: bool,
}

impl AjaxConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn data_map(mut self, data: HashMap<String, String>) -> Self {
        self.data = AjaxData::Map(data);
        self
    }

    pub fn data_with<F>(mut self, builder: F) -> Self
    where
        F: Fn(&str, u32) -> HashMap<String, String> + Send + Sync + 'static,
    {
        self.data = AjaxData::Builder(Arc::new(builder));
        self
    }

    pub fn keep_selected(mut self, keep: bool) -> Self {
        self.keep_selected = keep;
        self
    }

    pub fn has_url(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Flatten the keyword, page number and configured extra data into the
/// key/value pairs sent on the wire (query string for GET, form body for POST).
pub fn build_params(config: &AjaxConfig, keyword: &str, page: u32) -> Vec<(String, String)> {
    let mut params = vec![
        ("keyword".to_string(), keyword.to_string()),
        ("page".to_string(), page.to_string()),
    ];

    match &config.data {
        AjaxData::None => {}
        AjaxData::Map(map) => {
            params.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        AjaxData::Builder(builder) => {
            params.extend(builder(keyword, page));
        }
    }

    params
}
