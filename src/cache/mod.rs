pub mod learning_path_cache;

pub use learning_path_cache::LearningPathCache;
