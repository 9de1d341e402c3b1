pub mod game;
pub mod metrics;
pub mod phrase_source;
pub mod pipeline;
pub mod providers;
pub mod responder;
pub mod session;

pub use game::{Game, GameError, GenreSelection};
pub use phrase_source::{LoadError, PhraseList, PhraseSource};
pub use pipeline::{ProviderStage, Reply, ReplySource, ResponsePipeline};
pub use responder::LocalResponder;
pub use session::{CursorPolicy, PhraseSession};
