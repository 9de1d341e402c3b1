pub mod genre;
pub mod transcript;

pub use genre::{Genre, GENRES};
pub use transcript::{Author, ChatEntry, ChatTranscript};
