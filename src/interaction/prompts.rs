//! Declarative table of CLI prompts and how to answer them.

use crate::ui::Ui;

/// Printed before a deploy to a production account.
pub const PRODUCTION_DEPLOY_PROMPT: &str =
    "WARNING! You are deploying to a Production account, enter YES to continue";

/// How a recognized prompt is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Inject this line without asking.
    Fixed(&'static str),
    /// Ask the user to type `expected`; inject `accept` on an exact match, else `reject`.
    Confirm {
        prompt: &'static str,
        expected: &'static str,
        accept: &'static str,
        reject: &'static str,
    },
}

impl Response {
    /// The line to inject. Cancelling the confirmation counts as a mismatch.
    pub async fn resolve(&self, ui: &dyn Ui) -> String {
        match *self {
            Response::Fixed(line) => line.to_string(),
            Response::Confirm {
                prompt,
                expected,
                accept,
                reject,
            } => {
                let answer = ui.input(prompt, None).await;
                if answer.as_deref() == Some(expected) {
                    accept.to_string()
                } else {
                    reject.to_string()
                }
            }
        }
    }
}

/// A prompt substring and its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptRule {
    pub needle: &'static str,
    pub response: Response,
}

/// Checked in order; the first match wins. The production warning also contains
/// "enter YES to continue", so it must come first.
pub const PROMPT_RULES: &[PromptRule] = &[
    PromptRule {
        needle: PRODUCTION_DEPLOY_PROMPT,
        response: Response::Confirm {
            prompt: "You are deploying to a Production account. Type 'Deploy' to continue.",
            expected: "Deploy",
            accept: "YES",
            reject: "NO",
        },
    },
    PromptRule {
        needle: "Type YES to continue",
        response: Response::Fixed("YES"),
    },
    PromptRule {
        needle: "enter YES to continue",
        response: Response::Fixed("YES"),
    },
    PromptRule {
        needle: "Type YES to update the manifest file",
        response: Response::Fixed("YES"),
    },
    PromptRule {
        needle: "Proceed with deploy?",
        response: Response::Fixed("YES"),
    },
];

pub fn match_prompt(line: &str) -> Option<&'static PromptRule> {
    PROMPT_RULES.iter().find(|rule| line.contains(rule.needle))
}
