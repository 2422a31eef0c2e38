//! The fixed stage list, in evaluation order.

mod access_mode;
mod scope;
mod setup;
mod terms;
mod upsert;

pub use access_mode::AccessModeGate;
pub use scope::ScopeGate;
pub use setup::SetupGate;
pub use terms::TermsGate;
pub use upsert::UpsertStage;

use crate::gate::Gate;

/// Stages run by [`AuthorizationPipeline`](crate::AuthorizationPipeline).
pub fn default_stages() -> Vec<Box<dyn Gate>> {
    vec![
        Box::new(SetupGate),
        Box::new(UpsertStage),
        Box::new(ScopeGate),
        Box::new(TermsGate),
        Box::new(AccessModeGate),
    ]
}
