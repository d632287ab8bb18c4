pub mod key;
pub mod record;

pub use key::TranslationKey;
pub use record::{FileOutcome, MigrationRecord, MigrationStatus};
