//! Language-model adapters.

mod mock_model;
mod openai_model;

pub use mock_model::{MockModel, MockReply};
pub use openai_model::{OpenAiConfig, OpenAiModel};
