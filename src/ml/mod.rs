pub mod classifier;
pub mod preprocess;
pub mod leaf_model;
pub mod burn_classifier;
pub mod inference;

pub use classifier::Classifier;
pub use preprocess::{ImagePreprocessor, ImageTensor, DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT};
pub use leaf_model::{LeafClassifier, LeafModelConfig};
pub use burn_classifier::BurnClassifier;
pub use inference::{argmax, Classification, InferenceEngine};
