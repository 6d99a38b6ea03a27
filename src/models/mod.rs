//! Model registry module

pub mod registry;

pub use registry::{
    classify, discover, merge, static_catalog, ModelCatalog, ModelDescriptor, ModelSource,
};
