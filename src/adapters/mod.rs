// Adapters layer: concrete implementations for external systems (transport, templating, operator gate).

pub mod confirm;
pub mod notifier;
pub mod template;
