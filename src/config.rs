use crate::loader::FailurePolicy;

/// Options for a [`ScrollSequence`](crate::ScrollSequence).
///
/// The container is passed separately since it is a live element handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequenceOptions {
    /// Prefix prepended to every image name. Empty by default.
    pub images_root: String,
    /// Reserved; frames are always drawn centered at natural size.
    pub cover: bool,
    /// What the loader does when an image fails. Stalls by default.
    pub failure_policy: FailurePolicy,
}

impl SequenceOptions {
    /// Set the prefix prepended to every image name.
    pub fn with_images_root(mut self, root: impl Into<String>) -> Self {
        self.images_root = root.into();
        self
    }

    /// Set the reserved cover flag.
    pub fn with_cover(mut self, cover: bool) -> Self {
        self.cover = cover;
        self
    }

    /// Set the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Parse options from a TOML string.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

/// Numbered image names such as `0000.png` through `0110.png`.
///
/// ## Example
///
/// ```rust
/// use scroll_sequence::FramePattern;
///
/// let pattern = FramePattern::range(0, 2);
/// assert_eq!(pattern.names(), vec!["0000.png", "0001.png", "0002.png"]);
///
/// let reversed = FramePattern::range(0, 2).reversed();
/// assert_eq!(reversed.names(), vec!["0002.png", "0001.png", "0000.png"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FramePattern {
    /// Text before the number (e.g. a sub-directory)
    pub prefix: String,
    /// Zero-padded width of the number
    pub digits: usize,
    /// File extension without the dot
    pub extension: String,
    /// First number (inclusive)
    pub first: u32,
    /// Last number (inclusive)
    pub last: u32,
    /// Emit names from `last` down to `first`
    pub reverse: bool,
}

impl Default for FramePattern {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            digits: 4,
            extension: "png".to_string(),
            first: 0,
            last: 0,
            reverse: false,
        }
    }
}

impl FramePattern {
    /// Pattern over `first..=last` with default padding and extension.
    pub fn range(first: u32, last: u32) -> Self {
        Self {
            first,
            last,
            ..Self::default()
        }
    }

    /// Flip the emission order.
    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    /// Set the text placed before each number.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the file extension (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Number of names produced; zero when `first > last`.
    pub fn len(&self) -> usize {
        if self.first > self.last {
            0
        } else {
            (self.last - self.first) as usize + 1
        }
    }

    /// Returns `true` when the range is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self, number: u32) -> String {
        format!(
            "{}{:0width$}.{}",
            self.prefix,
            number,
            self.extension,
            width = self.digits
        )
    }

    /// Build the ordered name list.
    pub fn names(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let numbers = self.first..=self.last;
        if self.reverse {
            numbers.rev().map(|n| self.name(n)).collect()
        } else {
            numbers.map(|n| self.name(n)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = SequenceOptions::default();
        assert_eq!(options.images_root, "");
        assert!(!options.cover);
        assert_eq!(options.failure_policy, FailurePolicy::Stall);
    }

    #[test]
    fn builder_options() {
        let options = SequenceOptions::default()
            .with_images_root("./images/apple/")
            .with_cover(true)
            .with_failure_policy(FailurePolicy::Skip);
        assert_eq!(options.images_root, "./images/apple/");
        assert!(options.cover);
        assert_eq!(options.failure_policy, FailurePolicy::Skip);
    }

    #[test]
    fn pattern_padding_and_prefix() {
        let pattern = FramePattern::range(109, 110)
            .with_prefix("tree/")
            .with_extension("jpg");
        assert_eq!(pattern.names(), vec!["tree/0109.jpg", "tree/0110.jpg"]);
    }

    #[test]
    fn pattern_full_range() {
        let names = FramePattern::range(0, 110).reversed().names();
        assert_eq!(names.len(), 111);
        assert_eq!(names[0], "0110.png");
        assert_eq!(names[110], "0000.png");
    }

    #[test]
    fn pattern_empty_range() {
        let pattern = FramePattern::range(5, 4);
        assert!(pattern.is_empty());
        assert!(pattern.names().is_empty());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn options_from_toml() {
        let options = SequenceOptions::from_toml_str(
            r#"
            images_root = "./images/tree/"
            failure_policy = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(options.images_root, "./images/tree/");
        assert!(!options.cover);
        assert_eq!(options.failure_policy, FailurePolicy::Skip);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn pattern_from_toml() {
        let pattern: FramePattern = toml::from_str("last = 2\nreverse = true").unwrap();
        assert_eq!(pattern.names(), vec!["0002.png", "0001.png", "0000.png"]);
    }
}
