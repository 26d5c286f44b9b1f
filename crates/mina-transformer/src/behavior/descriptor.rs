//! Top-level sections of a component descriptor.

/// How a top-level descriptor property is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorSection {
    /// `created`, renamed to `onLoad` with a `params` argument.
    Created,
    /// `beforeDestroy`, renamed to `onUnload`.
    BeforeDestroy,
    /// `onPullDownRefresh`, kept.
    PullDownRefresh,
    /// `onReachBottom`, kept.
    ReachBottom,
    /// `data`, turned into a plain object.
    Data,
    /// `computed`, flattened.
    Computed,
    /// `methods`, flattened.
    Methods,
    /// `filters`, flattened.
    Filters,
    /// `components`, removed.
    Components,
    /// Anything else, kept as written.
    Other,
}

impl DescriptorSection {
    /// Classifies a property by its key.
    pub fn classify(key: Option<&str>) -> Self {
        match key {
            Some("created") => DescriptorSection::Created,
            Some("beforeDestroy") => DescriptorSection::BeforeDestroy,
            Some("onPullDownRefresh") => DescriptorSection::PullDownRefresh,
            Some("onReachBottom") => DescriptorSection::ReachBottom,
            Some("data") => DescriptorSection::Data,
            Some("computed") => DescriptorSection::Computed,
            Some("methods") => DescriptorSection::Methods,
            Some("filters") => DescriptorSection::Filters,
            Some("components") => DescriptorSection::Components,
            _ => DescriptorSection::Other,
        }
    }

    /// The mini-program name for a renamed lifecycle hook.
    pub fn renamed_hook(self) -> Option<&'static str> {
        match self {
            DescriptorSection::Created => Some("onLoad"),
            DescriptorSection::BeforeDestroy => Some("onUnload"),
            _ => None,
        }
    }
}
