pub mod gemini;
pub mod imagekit;
pub mod repository;
pub mod stripe;

pub use gemini::GeminiClient;
pub use imagekit::ImageKitClient;
pub use repository::ChatRepository;
pub use stripe::StripeClient;
