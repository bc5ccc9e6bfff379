pub mod category;
pub mod classifier;
pub mod config;
pub mod corrections;
pub mod error;
pub mod items;
pub mod lexicon;
pub mod matcher;
pub mod morphology;
pub mod normalize;
pub mod prefs;
#[cfg(feature = "remote")]
pub mod remote;
pub mod scorer;
pub mod shared;
pub mod storage;

pub use category::{anchor_slug, normalize_category, Category};
pub use classifier::{classify, classify_by_keywords, Classification, Classifier};
pub use corrections::{CorrectionStore, Corrections, NoCorrections};
pub use error::CestaError;
pub use normalize::{normalize, tokenize};
