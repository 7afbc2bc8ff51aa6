/*!
 * Translation of a book through a language model.
 *
 * - `prompts`: prompt wording for text and table content
 * - `retry`: per-request retry policy (rate limits, transient failures)
 * - `model`: the `TranslationModel` capability and its provider-backed implementation
 * - `orchestrator`: `BookTranslator`, which walks a book and records outcomes
 * - `concurrency`: per-provider defaults for requests in flight
 */

pub use self::concurrency::ProviderProfile;
pub use self::model::{create_model, ModelTranslator, TranslationModel};
pub use self::orchestrator::{BookTranslator, ProgressCallback, TranslationSummary};
pub use self::retry::RetryPolicy;

pub mod concurrency;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod retry;
