use gloo::console;
use puzzledrop_core::config::QUERY_KEYS;
use puzzledrop_core::{ConfigError, GameConfig};
use web_sys::UrlSearchParams;

/// Game config for this page load: defaults overridden by the query string.
pub(crate) fn load_game_config() -> GameConfig {
    let search = web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default();
    let (config, rejected) = parse_game_config_from_query(&search);
    for (key, err) in rejected {
        console::warn!(format!("ignoring query parameter {key}: {err}"));
    }
    config
}

pub(crate) fn parse_game_config_from_query(search: &str) -> (GameConfig, Vec<(String, ConfigError)>) {
    let search = search.trim();
    if search.is_empty() || search == "?" {
        return (GameConfig::default(), Vec::new());
    }
    let Ok(params) = UrlSearchParams::new_with_str(search) else {
        return (GameConfig::default(), Vec::new());
    };
    let pairs = QUERY_KEYS
        .iter()
        .filter_map(|key| params.get(key).map(|value| (key.to_string(), value)));
    config_from_pairs(pairs)
}

/// Applies each pair in order; rejected pairs leave the config untouched.
pub(crate) fn config_from_pairs<I>(pairs: I) -> (GameConfig, Vec<(String, ConfigError)>)
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut config = GameConfig::default();
    let mut rejected = Vec::new();
    for (key, value) in pairs {
        let mut candidate = config.clone();
        match candidate.apply_param(&key, &value) {
            Ok(()) => config = candidate,
            Err(err) => rejected.push((key, err)),
        }
    }
    (config, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzledrop_core::{ImageChangePolicy, ImageSource, TimingMode};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn timed_flag_uses_default_durations() {
        let (config, rejected) = config_from_pairs(pairs(&[("timed", "1")]));
        assert!(rejected.is_empty());
        assert_eq!(config.timing, TimingMode::timed_default());
    }

    #[test]
    fn bad_values_are_reported_and_skipped() {
        let (config, rejected) = config_from_pairs(pairs(&[
            ("piece_secs", "0"),
            ("global_secs", "90"),
            ("image_change", "sometimes"),
            ("image", "ftp://example.com/a.png"),
        ]));
        assert_eq!(
            config.timing,
            TimingMode::Timed {
                piece_secs: 5,
                global_secs: 90
            }
        );
        assert_eq!(config.image_change, ImageChangePolicy::ResetScore);
        assert_eq!(config.image, ImageSource::default());
        let keys: Vec<&str> = rejected.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["piece_secs", "image_change", "image"]);
    }

    #[test]
    fn later_pairs_override_earlier_ones() {
        let (config, _) = config_from_pairs(pairs(&[
            ("timed", "yes"),
            ("timed", "off"),
            ("image_change", "keep"),
        ]));
        assert_eq!(config.timing, TimingMode::Untimed);
        assert_eq!(config.image_change, ImageChangePolicy::KeepScore);
    }
}
