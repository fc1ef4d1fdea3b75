//! Reference drivers shipped with the crate.

pub mod dummy;
pub mod dummy_offsite;

use super::static_catalog::StaticCatalog;
use dummy::DummyDriver;
use dummy_offsite::DummyOffsiteDriver;

/// The catalog the global registry resolves names against.
pub fn builtin_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_unit("merchant_dummy", |r| {
            r.concrete("merchant_dummy", || Box::new(DummyDriver));
        })
        .with_unit("merchant_dummy_offsite", |r| {
            r.concrete("merchant_dummy_offsite", || Box::new(DummyOffsiteDriver));
        })
}
