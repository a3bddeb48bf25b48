//! Ready-made service descriptions using the JSON handlers.
//!
//! Both presets read arguments from the `a` parameter, render results and
//! faults as JSON envelopes, and filter the [`RESERVED_METHODS`].

use crate::handler::{
    JsonArgumentExtractor, JsonFaultRenderer, JsonResultRenderer, SessionTargetResolver,
    SharedTargetResolver,
};
use crate::method::Exposed;
use crate::registration::ServiceDescription;

/// Method names that JSON presets never expose remotely.
pub const RESERVED_METHODS: [&str; 5] = ["_configure", "new", "default", "clone", "drop"];

/// A JSON service with one default-constructed object per caller session.
pub fn json_session_service<T>(name: impl Into<String>) -> ServiceDescription
where
    T: Exposed + Default,
{
    json_handlers(ServiceDescription::new::<T>(name))
        .target_resolver(SessionTargetResolver::with_default::<T>())
}

/// A JSON service with one default-constructed object shared by all callers.
pub fn json_shared_service<T>(name: impl Into<String>) -> ServiceDescription
where
    T: Exposed + Default,
{
    json_handlers(ServiceDescription::new::<T>(name))
        .target_resolver(SharedTargetResolver::with_default::<T>())
}

fn json_handlers(description: ServiceDescription) -> ServiceDescription {
    RESERVED_METHODS.iter().fold(
        description
            .argument_extractor(JsonArgumentExtractor::default())
            .result_renderer(JsonResultRenderer)
            .fault_renderer(JsonFaultRenderer),
        |description, method| description.filter_method(*method),
    )
}
