//! Source-kind classification.
//!
//! Decides what a raw user-supplied string refers to:
//!
//! | Input | Kind |
//! |-------|------|
//! | Path to an existing regular file | [`SourceKind::LocalFile`] |
//! | YouTube watch / short / shorts / embed / live / legacy URL | [`SourceKind::VideoReference`] |
//! | Anything else | [`SourceKind::GenericUrl`] |
//!
//! Classification never fails. Unparseable input is simply "not a video
//! reference" and falls through to [`SourceKind::GenericUrl`]; reachability
//! is left to the service.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Hosts that serve video references. Mobile and music variants behave
/// exactly like the canonical host.
const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

const SHORT_LINK_HOST: &str = "youtu.be";

/// First path segments that carry the video id in the second segment.
const VIDEO_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

const VIDEO_ID_QUERY_PARAM: &str = "v";

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static video id pattern"));

/// What a raw source string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    LocalFile(PathBuf),
    VideoReference { url: String, video_id: String },
    GenericUrl(String),
}

impl SourceKind {
    /// Short label used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::LocalFile(_) => "file",
            SourceKind::VideoReference { .. } => "video",
            SourceKind::GenericUrl(_) => "url",
        }
    }
}

/// Classify `raw`, using `is_file` to decide whether it names an existing
/// regular file.
///
/// The predicate is injected so this crate stays free of filesystem I/O;
/// the client crate passes a real metadata check.
pub fn classify_with<F>(raw: &str, is_file: F) -> SourceKind
where
    F: FnOnce(&Path) -> bool,
{
    let path = Path::new(raw);
    if !raw.is_empty() && is_file(path) {
        return SourceKind::LocalFile(path.to_path_buf());
    }

    if let Some(video_id) = parse_video_id(raw) {
        return SourceKind::VideoReference {
            url: raw.to_string(),
            video_id,
        };
    }

    SourceKind::GenericUrl(raw.to_string())
}

/// Extract and validate a video id from a URL on a known video host.
///
/// Returns `None` for anything that is not a well-formed video reference,
/// including strings that are not URLs at all.
pub fn parse_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    if !VIDEO_HOSTS.contains(&host.as_str()) {
        return None;
    }

    let candidate = raw_video_id(&url, &host)?;
    if VIDEO_ID_RE.is_match(&candidate) {
        Some(candidate)
    } else {
        None
    }
}

/// Host-specific id lookup, before format validation.
fn raw_video_id(url: &Url, host: &str) -> Option<String> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    if host == SHORT_LINK_HOST {
        return segments
            .first()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
    }

    if segments.len() >= 2 {
        let prefix = segments[0].to_ascii_lowercase();
        if VIDEO_PATH_PREFIXES.contains(&prefix.as_str()) {
            return Some(segments[1].trim().to_string());
        }
    }

    url.query_pairs()
        .filter(|(k, _)| k == VIDEO_ID_QUERY_PARAM)
        .map(|(_, v)| v.trim().to_string())
        .find(|v| !v.is_empty())
}
