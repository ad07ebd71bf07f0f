//! Argument helpers shared by the binaries.

use std::fs;
use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgError {
    #[error("invalid duration [{0}]: expected <number><s|m|h|d>")]
    InvalidDuration(String),

    #[error("invalid image spec [{0}]: expected mimetype:cid:path")]
    InvalidImageSpec(String),
}

/// Parses durations of the form `30s`, `15m`, `36h` or `7d`.
pub fn parse_duration(input: &str) -> Result<Duration, ArgError> {
    let input = input.trim();
    let unit = input
        .chars()
        .last()
        .ok_or_else(|| ArgError::InvalidDuration(input.to_string()))?;
    let value = &input[..input.len() - unit.len_utf8()];
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(ArgError::InvalidDuration(input.to_string())),
    };
    let value: u64 = value
        .parse()
        .map_err(|_| ArgError::InvalidDuration(input.to_string()))?;
    Ok(Duration::from_secs(value * multiplier))
}

/// Splits an inline-image spec `mimetype:cid:path` into its three parts.
/// The path may itself contain colons; only the first two are separators.
pub fn split_image_spec(spec: &str) -> Result<(String, String, String), ArgError> {
    let mut parts = spec.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(mime_type), Some(cid), Some(path))
            if !mime_type.is_empty() && !cid.is_empty() && !path.is_empty() =>
        {
            Ok((mime_type.to_string(), cid.to_string(), path.to_string()))
        }
        _ => Err(ArgError::InvalidImageSpec(spec.to_string())),
    }
}

/// Flag values containing a `/` are treated as file paths and read from
/// disk; anything else is returned as literal content.
pub fn file_or_literal(value: &str) -> io::Result<String> {
    if value.contains('/') {
        fs::read_to_string(value)
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn durations_parse_per_unit() {
        assert_eq!(parse_duration("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("15m"), Ok(Duration::from_secs(15 * 60)));
        assert_eq!(parse_duration("36h"), Ok(Duration::from_secs(36 * 3600)));
        assert_eq!(parse_duration("7d"), Ok(Duration::from_secs(7 * 86400)));
        assert_eq!(parse_duration(" 2h "), Ok(Duration::from_secs(2 * 3600)));
    }

    #[test]
    fn bad_durations_are_rejected() {
        for input in ["", "h", "12", "12w", "h12", "1.5h"] {
            assert!(parse_duration(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn image_spec_splits_on_first_two_colons() {
        let (mime_type, cid, path) = split_image_spec("image/png:logo:/tmp/a:b.png").unwrap();
        assert_eq!(mime_type, "image/png");
        assert_eq!(cid, "logo");
        assert_eq!(path, "/tmp/a:b.png");
    }

    #[test]
    fn incomplete_image_spec_is_rejected() {
        assert!(split_image_spec("image/png:logo").is_err());
        assert!(split_image_spec("::path").is_err());
    }

    #[test]
    fn literal_content_is_passed_through() {
        assert_eq!(file_or_literal("<b>hi</b>").unwrap(), "<b>hi</b>");
    }

    #[test]
    fn slash_means_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "from a file").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        assert_eq!(file_or_literal(&path).unwrap(), "from a file");
    }
}
