// Resume screening: PDF text extraction, model-reply parsing, the bounded
// batch runner, and the page/API that drive them.
// All model calls go through llm_client; nothing here talks HTTP to the model.

pub mod batch;
pub mod extract;
pub mod form;
pub mod handlers;
pub mod parser;
pub mod view;
