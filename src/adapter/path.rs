//! Violation path normalization.
//!
//! Every adapter reports violations as dotted paths: object keys joined by
//! `.`, array indices as plain numbers (`otherFriends.3.email`). A failure
//! of the payload itself (for example, a non-object root) is reported as
//! `ROOT_PATH`.

pub const ROOT_PATH: &str = "$";

/// Append `segment` to a dotted `prefix`; an empty prefix is the root.
pub fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() || prefix == ROOT_PATH {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

/// Convert a JSON pointer (`/otherFriends/3/email`) into a dotted path.
pub fn from_pointer(pointer: &str) -> String {
    if pointer.is_empty() || pointer == "/" {
        return ROOT_PATH.to_string();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Dotted path from already-split segments.
pub fn from_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(".");
    if joined.is_empty() {
        ROOT_PATH.to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_to_dotted() {
        assert_eq!(from_pointer("/otherFriends/3/email"), "otherFriends.3.email");
        assert_eq!(from_pointer("/age"), "age");
        assert_eq!(from_pointer(""), ROOT_PATH);
    }

    #[test]
    fn test_pointer_unescapes_tokens() {
        assert_eq!(from_pointer("/a~1b/c~0d"), "a/b.c~d");
    }

    #[test]
    fn test_join_from_root() {
        assert_eq!(join("", "phone"), "phone");
        assert_eq!(join(ROOT_PATH, "phone"), "phone");
        assert_eq!(join("bestFriend", "phone"), "bestFriend.phone");
    }

    #[test]
    fn test_empty_segments_are_root() {
        assert_eq!(from_segments(Vec::<String>::new()), ROOT_PATH);
        assert_eq!(from_segments(["a", "0", "b"]), "a.0.b");
    }
}
