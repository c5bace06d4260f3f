pub mod chat;
pub mod instruction;

pub use chat::ChatCompletionsJudge;
