//! Unified error type for Cardroom.

use cardroom_actor::ActorError;
use cardroom_table::TableError;
use cardroom_variants::CatalogError;

use crate::CommandError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// The rule catalog failed to load or validate. Fatal at startup.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A registry operation failed.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A manager refused new work.
    #[error(transparent)]
    Actor(#[from] ActorError),

    /// A user command was rejected or stopped part-way.
    #[error(transparent)]
    Command(#[from] CommandError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardroom_protocol::TableId;

    #[test]
    fn test_from_catalog_error() {
        let err = CatalogError::MissingDefault("No Variant".into());
        let cardroom_err: CardroomError = err.into();
        assert!(matches!(cardroom_err, CardroomError::Catalog(_)));
        assert!(cardroom_err.to_string().contains("No Variant"));
    }

    #[test]
    fn test_from_table_error() {
        let err = TableError::NoSuchTable(TableId(1));
        let cardroom_err: CardroomError = err.into();
        assert!(matches!(cardroom_err, CardroomError::Table(_)));
    }

    #[test]
    fn test_from_actor_error() {
        let err = ActorError::Closed("table".into());
        let cardroom_err: CardroomError = err.into();
        assert!(matches!(cardroom_err, CardroomError::Actor(_)));
        assert_eq!(cardroom_err.to_string(), "table manager is closed to new requests");
    }

    #[test]
    fn test_from_command_error() {
        let err = CommandError::SelfTransfer;
        let cardroom_err: CardroomError = err.into();
        assert!(matches!(cardroom_err, CardroomError::Command(_)));
    }
}
