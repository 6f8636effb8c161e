use super::*;

/// Parses a Go style duration such as `90s`, `1m` or `1h30m`.
pub(crate) fn parse(text: &str) -> Result<Duration, String> {
    let nanos = go_parse_duration::parse_duration(text.trim()).map_err(|err| format!("{err:?}"))?;
    u64::try_from(nanos)
        .map(Duration::from_nanos)
        .map_err(|_| "duration must not be negative".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_syntax() {
        assert_eq!(parse("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse("90s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse(" 3s "), Ok(Duration::from_secs(3)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("soon").is_err());
        assert!(parse("").is_err());
        assert!(parse("-5m").is_err());
    }
}
