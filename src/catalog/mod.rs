pub mod labels;
pub mod knowledge;

pub use labels::{labels_for, class_index_to_label, label_to_class_index};
pub use knowledge::{lookup, DiseaseInfo, Solution, NO_INFORMATION};
