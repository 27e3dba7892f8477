//! Prompt composition for report simplification.
//!
//! The system message is the fixed instruction template followed by a
//! one-line language directive. The user message is the raw report,
//! wrapped in triple quotes on their own lines.

/// Fixed instruction template. Reproduced byte-for-byte, section titles included.
pub const SIMPLIFY_TEMPLATE: &str = r#"
You are a compassionate, clear-speaking doctor explaining radiology results to a patient.
Rewrite the following radiology report in language that is simple, respectful, and easy to understand.
Speak the way an ideal doctor would — someone who is calm, kind, knowledgeable, and emotionally intelligent.
Your explanation should:
•   Be written at a 7th–8th grade reading level
•   Avoid unnecessary medical jargon; explain any technical terms briefly if needed
•   Be accurate and clinically responsible — don’t overstate or speculate
•   Reassure the patient when appropriate, without minimizing serious findings
•   Offer helpful context and clearly mention any next steps or recommendations in the report
Structure your output like this:
1.  A short summary of the most important points in one sentence -> if the patient only has time to read this one sentence, he/she should be able to get as much information out of this one sentence as possible
2.  What was found (in plain language)
3.  What it might mean (calm, non-alarming tone)
4.  What happens next (based on what the report says)
Use this at the beginning of the sections as a title:
    1: "💬 One-sentence Summary",
    2: "🔍 What Was Found",
    3: "🧠 What It Might Mean",
    4: "📋 What Happens Next"
Style:
•   Make the complex radiology report seem simple after the simplification
•   Break the complex report down into simpler pieces the patient can understand
•   Don’t invent things that are not mentioned in the report
•   Write it like the patient would explain it to someone else who has no medical background
Here is the report to simplify:
"#;

/// Section titles the provider is asked to use, in order.
pub const SECTION_TITLES: [&str; 4] = [
    "💬 One-sentence Summary",
    "🔍 What Was Found",
    "🧠 What It Might Mean",
    "📋 What Happens Next",
];

/// Exact-match directive table.
const DIRECTIVES: [(&str, &str); 5] = [
    ("en", "Please write the explanation in English."),
    ("de", "Bitte schreibe die Erklärung auf Deutsch."),
    ("fr", "Veuillez rédiger l'explication en français."),
    ("es", "Por favor, escriba la explicación en español."),
    ("it", "Per favore, scrivi la spiegazione in italiano."),
];

/// Directive for any language outside the table.
pub const FALLBACK_DIRECTIVE: &str =
    "Please write the explanation in the same language as the report.";

const QUOTE_DELIMITER: &str = "\"\"\"";

/// System instruction and user content for one completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Directive line for a language code. Case-sensitive exact match.
pub fn directive_for(language_code: &str) -> &'static str {
    DIRECTIVES
        .iter()
        .find(|(code, _)| *code == language_code)
        .map(|(_, directive)| *directive)
        .unwrap_or(FALLBACK_DIRECTIVE)
}

/// Build the prompt pair. Pure; the report is passed through untouched.
pub fn compose(report_text: &str, language_code: &str) -> PromptPair {
    PromptPair {
        system: format!("{SIMPLIFY_TEMPLATE}\n\n{}", directive_for(language_code)),
        user: quote_report(report_text),
    }
}

fn quote_report(report_text: &str) -> String {
    format!("{QUOTE_DELIMITER}\n{report_text}\n{QUOTE_DELIMITER}")
}
