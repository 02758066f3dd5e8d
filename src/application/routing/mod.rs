//! Topic routing with direct-message fallback

pub mod router;

pub use router::TopicRouter;
