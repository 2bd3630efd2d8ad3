use web_sys::Window;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientConfig {
    /// Prefix for every API path; empty means same origin.
    pub api_base: String,
    pub debug: bool,
}

impl ClientConfig {
    pub fn from_window(window: &Window) -> Self {
        let search = window.location().search().ok().unwrap_or_default();
        Self::from_query(&search)
    }

    pub fn from_query(search: &str) -> Self {
        Self::parse(search, decode_uri_string)
    }

    /// `decode` undoes percent-encoding; a value it rejects is kept as is.
    pub fn parse(search: &str, decode: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ClientConfig::default();
        for pair in search.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "debug" | "log" => config.debug = matches!(value, "1" | "true"),
                "api" => config.api_base = decode(value).unwrap_or_else(|| value.to_string()),
                _ => {}
            }
        }
        config
    }
}

fn decode_uri_string(text: &str) -> Option<String> {
    js_sys::decode_uri_component(text)
        .ok()
        .and_then(|value| value.as_string())
}
