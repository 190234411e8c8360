pub mod model_metadata;
pub mod model_storage;
pub mod model_loader;
pub mod model_routes;
pub mod model_registry;
pub mod config;

pub use model_metadata::ModelMetadata;
pub use model_storage::{save_model_with_metadata, load_metadata, load_model_with_metadata, describe_metadata};
pub use model_loader::{validate_metadata, BurnModelLoader, ModelLoader};
pub use model_routes::ModelRoutes;
pub use model_registry::ModelRegistry;
pub use config::{AppConfig, DeviceType, ImageSettings, LoggingSettings, ModelSettings};
