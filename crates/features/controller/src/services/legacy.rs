use super::lifecycle::{BuildTreeLifecycleControllerFactory, VintageLifecycleControllerFactory};
use super::work_graph::{DefaultWorkGraphPreparer, WorkGraphPreparer};
use super::{BundleKind, InstrumentationStrategy, ServiceBundle};
use crate::error::ControllerError;
use arbor_kernel::registry::ServiceRegistry;
use std::sync::Arc;

/// Services registered when the configuration cache is off, and for nested build trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyBundle;

impl ServiceBundle for LegacyBundle {
    fn kind(&self) -> BundleKind {
        BundleKind::Legacy
    }

    fn register(&self, registry: &mut ServiceRegistry) -> Result<(), ControllerError> {
        registry
            .add(InstrumentationStrategy::Vintage)?
            .add_shared::<dyn BuildTreeLifecycleControllerFactory>(Arc::new(
                VintageLifecycleControllerFactory,
            ))?
            .add_shared::<dyn WorkGraphPreparer>(Arc::new(DefaultWorkGraphPreparer))?;
        Ok(())
    }
}
