pub mod dispatch;
pub mod domains;
pub mod engine;
pub mod exclusion;
pub mod matcher;

pub use crate::domain::model::{Assignment, ExclusionGroup, Matching, Participant, ParticipantId, Registry};
pub use crate::domain::ports::{Confirmation, Notifier};
pub use crate::utils::error::Result;
