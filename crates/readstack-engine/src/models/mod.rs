pub mod article;
pub mod progress;

pub use article::Article;
pub use progress::ReadingProgress;
