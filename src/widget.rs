use crate::config::WidgetBehavior;

/// Options handed to the widget constructor for one lightbox group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    /// CSS selector scoping the instance to one group's anchors.
    pub selector: String,
    pub touch_navigation: bool,
    pub loop_navigation: bool,
    pub autoplay_videos: bool,
    pub close_button: bool,
    pub close_on_outside_click: bool,
    pub preload: bool,
    /// Always false: captions travel on the anchor's data-description and
    /// aria-label attributes, not the widget's built-in caption rendering.
    pub desc_position: bool,
}

impl WidgetOptions {
    pub fn for_group(selector: &str, behavior: &WidgetBehavior) -> Self {
        Self {
            selector: selector.to_string(),
            touch_navigation: behavior.touch_navigation,
            loop_navigation: behavior.loop_navigation,
            autoplay_videos: behavior.autoplay_videos,
            close_button: behavior.close_button,
            close_on_outside_click: behavior.close_on_outside_click,
            preload: behavior.preload,
            desc_position: false,
        }
    }
}

/// Handle returned by the widget constructor for one group.
pub trait LightboxHandle {
    /// Re-index the group so anchors added since construction become navigable.
    fn reload(&mut self);
}

/// The external lightbox widget collaborator.
pub trait LightboxWidget {
    fn create(&mut self, options: WidgetOptions) -> Box<dyn LightboxHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_group_copies_behavior_and_forces_desc_position_off() {
        let behavior = WidgetBehavior {
            touch_navigation: false,
            loop_navigation: true,
            autoplay_videos: false,
            close_button: true,
            close_on_outside_click: false,
            preload: true,
        };
        let options = WidgetOptions::for_group(".lw-group-0-3", &behavior);
        assert_eq!(options.selector, ".lw-group-0-3");
        assert!(!options.touch_navigation);
        assert!(options.loop_navigation);
        assert!(!options.autoplay_videos);
        assert!(!options.close_on_outside_click);
        assert!(!options.desc_position);
    }
}
