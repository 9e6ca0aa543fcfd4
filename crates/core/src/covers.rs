use url::Url;

pub fn normalize_cover_path(raw: &str) -> String {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return String::new(),
    };
    let segments = match parsed.path_segments() {
        Some(segments) => segments,
        None => return String::new(),
    };

    let mut parts: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
    if parts.first() == Some(&"images") {
        parts.remove(0);
    }
    if parts.last().is_some_and(|last| is_sized_filename(last)) {
        parts.pop();
    }
    parts.join("/")
}

// Matches a trailing `WIDTHxHEIGHT.ext` component, e.g. `640x640.jpg`.
fn is_sized_filename(segment: &str) -> bool {
    let stem = match segment.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => return false,
    };
    match stem.split_once('x') {
        Some((w, h)) => {
            !w.is_empty()
                && !h.is_empty()
                && w.chars().all(|c| c.is_ascii_digit())
                && h.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_cover_path;

    #[test]
    fn strips_images_prefix_and_size_suffix() {
        assert_eq!(
            normalize_cover_path("https://x/images/1280x1280.jpg"),
            ""
        );
        assert_eq!(
            normalize_cover_path("https://x/images/abc/640x640.jpg"),
            "abc"
        );
        assert_eq!(
            normalize_cover_path("https://x/images/ab/cd/ef/320x320.png"),
            "ab/cd/ef"
        );
    }

    #[test]
    fn keeps_segments_that_are_not_sized() {
        assert_eq!(
            normalize_cover_path("https://x/images/abc/cover.jpg"),
            "abc/cover.jpg"
        );
        assert_eq!(
            normalize_cover_path("https://x/covers/abc/100x100.png"),
            "covers/abc"
        );
    }

    #[test]
    fn malformed_input_yields_empty() {
        assert_eq!(normalize_cover_path("not a url"), "");
        assert_eq!(normalize_cover_path(""), "");
        assert_eq!(normalize_cover_path("mailto:someone@example.com"), "");
    }
}
