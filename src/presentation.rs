// SPDX-License-Identifier: GPL-3.0-only

//! Presentation layer interface
//!
//! Declarative effects are realized by the presentation layer, not by the
//! engine: on every active-effect change and on session start the core
//! reports the active effect's descriptor, and whatever hosts the preview
//! element toggles the style token. The core never touches presentation
//! styling itself.

use crate::effects::EffectDescriptor;
use tracing::info;

/// Receiver for active-effect notifications
pub trait PresentationSink: Send {
    /// Called whenever the active effect changes, and once on session start
    fn effect_changed(&mut self, descriptor: &EffectDescriptor);
}

/// Default sink that just logs the change
///
/// Useful for headless runs; a UI host replaces this with its own sink.
#[derive(Debug, Default)]
pub struct LogPresentation;

impl PresentationSink for LogPresentation {
    fn effect_changed(&mut self, descriptor: &EffectDescriptor) {
        match &descriptor.style_token {
            Some(token) if token.is_empty() => {
                info!(id = %descriptor.id, "Active effect changed (style cleared)");
            }
            Some(token) => {
                info!(id = %descriptor.id, style = %token, "Active effect changed");
            }
            None => {
                info!(id = %descriptor.id, "Active effect changed (kernel)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        seen: Vec<String>,
    }

    impl PresentationSink for RecordingSink {
        fn effect_changed(&mut self, descriptor: &EffectDescriptor) {
            self.seen.push(descriptor.id.clone());
        }
    }

    #[test]
    fn test_sink_receives_descriptor() {
        let mut sink = RecordingSink::default();
        sink.effect_changed(&EffectDescriptor {
            id: "sepia".to_string(),
            display_name: "Sepia".to_string(),
            style_token: None,
        });
        assert_eq!(sink.seen, vec!["sepia".to_string()]);
    }
}
