//! Output classification and interactive prompt handling.
//!
//! Every output line goes through the same steps in order: prompt match, notice
//! side effect, noise filter, per-kind transform, accumulate.

mod classify;
mod driver;
mod prompts;

pub use classify::{classify_line, is_noise, notice_for, LineClass, NOISE_PREFIXES};
pub use driver::drive;
pub use prompts::{match_prompt, PromptRule, Response, PRODUCTION_DEPLOY_PROMPT, PROMPT_RULES};
