pub mod notifiers;
pub mod traits;
pub mod trackers;

pub use notifiers::build_notifier;
pub use traits::NotifierPlugin;
