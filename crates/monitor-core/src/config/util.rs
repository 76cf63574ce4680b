pub(super) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(super) fn env_non_empty(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

pub(super) fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_non_empty(name).and_then(|v| v.parse().ok())
}
