//! Classification of the streaming tool's quality-scan output.
//!
//! The tool's messages are matched by literal prefix; these strings are the
//! whole contract with the external program.

pub const AVAILABLE_STREAMS: &str = "Available streams:";
pub const NO_STREAMS_FOUND: &str = "error: No streams found on this URL:";
pub const NO_PLUGIN: &str = "error: No plugin can handle URL:";
pub const UNABLE_TO_OPEN: &str = "error: Unable to open URL:";

const QUALITY_MARKERS: [&str; 2] = ["(best)", "(worst)"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    QualitiesFound(Vec<String>),
    NoPluginForUrl,
    NoStreamFound,
    StreamError,
}

/// Classify one chunk of discovery output. First matching prefix wins.
pub fn classify(text: &str) -> Option<DiscoveryOutcome> {
    if let Some(rest) = text.strip_prefix(AVAILABLE_STREAMS) {
        Some(DiscoveryOutcome::QualitiesFound(parse_qualities(rest)))
    } else if text.starts_with(NO_STREAMS_FOUND) {
        Some(DiscoveryOutcome::NoStreamFound)
    } else if text.starts_with(NO_PLUGIN) {
        Some(DiscoveryOutcome::NoPluginForUrl)
    } else if text.starts_with(UNABLE_TO_OPEN) {
        Some(DiscoveryOutcome::StreamError)
    } else {
        None
    }
}

/// `" 360p, 480p (best), worst"` → `["360p", "480p", "worst"]`.
///
/// Only the first line is considered. `(best)`/`(worst)` are stripped as
/// trailing markers so names that merely contain them are left alone.
fn parse_qualities(list: &str) -> Vec<String> {
    let line = list.lines().next().unwrap_or("");
    line.split(',')
        .filter_map(|entry| {
            let mut name = entry.trim();
            for marker in QUALITY_MARKERS {
                if let Some(stripped) = name.strip_suffix(marker) {
                    name = stripped.trim_end();
                }
            }
            let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualities(text: &str) -> Vec<String> {
        match classify(text) {
            Some(DiscoveryOutcome::QualitiesFound(q)) => q,
            other => panic!("expected qualities, got {:?}", other),
        }
    }

    #[test]
    fn test_available_streams() {
        assert_eq!(
            qualities("Available streams: 360p, 480p (best), worst"),
            vec!["360p", "480p", "worst"]
        );
    }

    #[test]
    fn test_available_streams_with_both_markers_and_newline() {
        assert_eq!(
            qualities("Available streams: audio_only, 160p (worst), 720p60, 1080p60 (best)\n"),
            vec!["audio_only", "160p", "720p60", "1080p60"]
        );
    }

    #[test]
    fn test_only_first_line_is_parsed() {
        assert_eq!(
            qualities("Available streams: 360p, best\nerror: No plugin can handle URL: x"),
            vec!["360p", "best"]
        );
    }

    #[test]
    fn test_inner_marker_and_colon_survive() {
        assert_eq!(
            qualities("Available streams: alt:(best)cut, 720p"),
            vec!["alt:(best)cut", "720p"]
        );
    }

    #[test]
    fn test_empty_list() {
        assert!(qualities("Available streams:").is_empty());
        assert!(qualities("Available streams: , ,").is_empty());
    }

    #[test]
    fn test_error_prefixes() {
        assert_eq!(
            classify("error: No plugin can handle URL: foo.example"),
            Some(DiscoveryOutcome::NoPluginForUrl)
        );
        assert_eq!(
            classify("error: No streams found on this URL: twitch.tv/offline"),
            Some(DiscoveryOutcome::NoStreamFound)
        );
        assert_eq!(
            classify("error: Unable to open URL: https://x (404)"),
            Some(DiscoveryOutcome::StreamError)
        );
    }

    #[test]
    fn test_unrelated_output_is_unclassified() {
        assert_eq!(classify("[cli][info] Found matching plugin twitch"), None);
        assert_eq!(classify(""), None);
        // Strict prefix: leading whitespace does not match
        assert_eq!(classify(" Available streams: best"), None);
    }
}
