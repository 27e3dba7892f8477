//! The single form page.
//!
//! Rendered server-side from a [`PageView`] through an askama template,
//! which escapes every interpolated value. The only script on the page
//! toggles the busy indicator while a submission is in flight.

use askama::Template;

use crate::api::markdown::render_markdown;
use crate::config;
use crate::feedback::FeedbackError;
use crate::pipeline::language_detect::display_name;
use crate::pipeline::SimplifyError;
use crate::session::Session;

/// A message shown above a page section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
    Error { message: String, detail: Option<String> },
}

impl Notice {
    fn class(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Info(_) => "info",
            Self::Warning(_) => "warning",
            Self::Error { .. } => "error",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::Info(m) | Self::Warning(m) => m,
            Self::Error { message, .. } => message,
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            Self::Error { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<&SimplifyError> for Notice {
    fn from(err: &SimplifyError) -> Self {
        if err.is_warning() {
            Notice::Warning(err.to_string())
        } else {
            Notice::Error {
                message: err.to_string(),
                detail: err.detail(),
            }
        }
    }
}

/// Notices for a feedback submission outcome.
pub fn feedback_notices(outcome: &Result<(), FeedbackError>) -> Vec<Notice> {
    let mut notices = vec![Notice::Success("Thanks for your feedback!".into())];
    notices.push(match outcome {
        Ok(()) => Notice::Info("✅ Feedback saved.".into()),
        Err(FeedbackError::Rejected { .. }) => {
            Notice::Warning("⚠️ Feedback not saved. Please try again.".into())
        }
        Err(e @ FeedbackError::Transport(_)) => Notice::Error {
            message: "Error sending feedback.".into(),
            detail: Some(e.to_string()),
        },
    });
    notices
}

/// Cached result shown below the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub text: String,
    pub language: String,
}

/// Everything the page needs to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub report_input: String,
    pub submit_notices: Vec<Notice>,
    pub feedback_notices: Vec<Notice>,
    pub result: Option<ResultView>,
    pub usage_count: u32,
}

impl PageView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            result: session.last_result().map(|text| ResultView {
                text: text.to_string(),
                language: session
                    .detected_language()
                    .unwrap_or(config::FALLBACK_LANGUAGE)
                    .to_string(),
            }),
            usage_count: session.usage_count(),
            ..Self::default()
        }
    }

    fn cap_reached(&self) -> bool {
        self.usage_count >= config::USAGE_CAP
    }
}

/// Result panel values; the explanation is already HTML.
struct ResultPanel<'a> {
    language: &'a str,
    explanation_html: String,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Radiology Simplifier</title>
  <link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🧾</text></svg>">
  <style>
    * { box-sizing: border-box; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
      background: #fff; color: #1c1917; margin: 0;
    }
    main { max-width: 730px; margin: 0 auto; padding: 2rem 1rem; }
    .caption { color: #78716c; font-size: 14px; }
    blockquote { border-left: 4px solid #d6d3d1; margin: 1rem 0; padding: 0.25rem 1rem; color: #57534e; }
    label { display: block; margin: 1rem 0 0.5rem; }
    textarea {
      width: 100%; height: 300px; font-size: 16px; line-height: 1.6; padding: 1em;
      border: 1px solid #d6d3d1; border-radius: 8px; font-family: inherit;
    }
    input[type=text] { width: 100%; padding: 0.6em; font-size: 15px; border: 1px solid #d6d3d1; border-radius: 8px; }
    .btn {
      border-radius: 12px; padding: 0.6em 1.4em; font-size: 16px; cursor: pointer;
      border: 1px solid #d6d3d1; background: #fff; color: #1c1917; text-decoration: none;
      display: inline-block; margin: 0.75rem 0;
    }
    .btn-primary { background: #ff4b4b; border-color: #ff4b4b; color: #fff; }
    .btn:disabled { opacity: 0.5; cursor: not-allowed; }
    .columns { display: flex; gap: 1rem; }
    .notice { padding: 0.75rem 1rem; border-radius: 8px; margin: 0.75rem 0; }
    .notice.success { background: #dcfce7; color: #166534; }
    .notice.info { background: #dbeafe; color: #1e40af; }
    .notice.warning { background: #fef9c3; color: #854d0e; }
    .notice.error { background: #fee2e2; color: #991b1b; }
    .notice pre { white-space: pre-wrap; font-size: 13px; }
    #busy { display: none; color: #57534e; }
    .usage { color: #78716c; }
    footer { font-size: 13px; color: #888; text-align: center; margin-top: 4rem; }
  </style>
</head>
<body>
<main>
  <h1>🧾 Radiology Report Simplifier</h1>
  <p class="caption">Understand your radiology report in clear, kind language.</p>
  <blockquote>
    ⚠️ <em>This tool is for informational purposes only and not a substitute for professional medical advice.<br>
    No data is stored. Always consult your healthcare provider.</em>
  </blockquote>

  <form method="post" action="/simplify" id="simplify-form">
    <label for="report">📄 Paste your radiology report below</label>
    <textarea id="report" name="report" placeholder="Type or paste your radiology report here...">{{ report_input }}</textarea>
    <button class="btn btn-primary" type="submit" id="simplify-button">✨ Simplify Report</button>
    <div id="busy">⏳ Analyzing and simplifying your report...</div>
  </form>
  {% for notice in submit_notices %}
  <div class="notice {{ notice.class() }}">{{ notice.message() }}{% if let Some(detail) = notice.detail() %}<details><summary>Details</summary><pre>{{ detail }}</pre></details>{% endif %}</div>
  {% endfor %}
  {% if cap_reached %}
  <form method="post" action="/session/reset"><button class="btn btn-secondary" type="submit">🔄 Start a new session</button></form>
  {% endif %}
  {% if let Some(result) = result %}
  <section class="result">
    <div class="notice success">✅ Simplification complete.</div>
    <p>🌐 Detected report language: <strong>{{ result.language }}</strong></p>
    <h4>✨ Here’s your simplified explanation:</h4>
    <div class="explanation">
{{ result.explanation_html|safe }}
    </div>
    <a class="btn btn-secondary" href="/download" download="{{ file_name }}">📄 Download Explanation</a>

    <h4>🗣️ Was this explanation helpful?</h4>
    <form method="post" action="/feedback" class="feedback">
      <label for="comment">💬 Any suggestions or thoughts?</label>
      <input type="text" id="comment" name="comment" maxlength="{{ comment_max_chars }}"
             placeholder="Optional. (Type first and click 👍 Yes or 👎 No after)">
      <div class="columns">
        <button class="btn" type="submit" name="verdict" value="yes">👍 Yes</button>
        <button class="btn" type="submit" name="verdict" value="no">👎 No</button>
      </div>
    </form>
    {% for notice in feedback_notices %}
    <div class="notice {{ notice.class() }}">{{ notice.message() }}{% if let Some(detail) = notice.detail() %}<details><summary>Details</summary><pre>{{ detail }}</pre></details>{% endif %}</div>
    {% endfor %}
  </section>
  {% endif %}
  <p class="usage"><small>🔄 Uses this session: {{ usage_count }}/{{ usage_cap }}</small></p>

  <footer>
    Built by a medical student.<br>
    Designed to save time — and make patients feel confident.
  </footer>
</main>
<script>
  document.getElementById('simplify-form').addEventListener('submit', function () {
    document.getElementById('busy').style.display = 'block';
    document.getElementById('simplify-button').disabled = true;
  });
</script>
</body>
</html>"#,
    ext = "html"
)]
struct PageTemplate<'a> {
    report_input: &'a str,
    submit_notices: &'a [Notice],
    feedback_notices: &'a [Notice],
    cap_reached: bool,
    result: Option<ResultPanel<'a>>,
    file_name: &'a str,
    comment_max_chars: usize,
    usage_count: u32,
    usage_cap: u32,
}

/// Render the full page.
pub fn render(view: &PageView) -> Result<String, askama::Error> {
    PageTemplate {
        report_input: &view.report_input,
        submit_notices: &view.submit_notices,
        feedback_notices: &view.feedback_notices,
        cap_reached: view.cap_reached(),
        result: view.result.as_ref().map(|r| ResultPanel {
            language: display_name(&r.language),
            explanation_html: render_markdown(&r.text),
        }),
        file_name: config::DOWNLOAD_FILE_NAME,
        comment_max_chars: config::FEEDBACK_COMMENT_MAX_CHARS,
        usage_count: view.usage_count,
        usage_cap: config::USAGE_CAP,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::CompletionError;

    fn page(view: &PageView) -> String {
        render(view).unwrap()
    }

    #[test]
    fn empty_session_has_no_result_panel() {
        let html = page(&PageView::from_session(&Session::new()));
        assert!(html.contains("🧾 Radiology Report Simplifier"));
        assert!(html.contains("Uses this session: 0/3"));
        assert!(!html.contains("Simplification complete"));
        assert!(!html.contains("/session/reset"));
    }

    #[test]
    fn result_panel_shows_language_and_text() {
        let mut session = Session::new();
        session.record_success("**Good news**".into(), Some("de".into()));
        let html = page(&PageView::from_session(&session));
        assert!(html.contains("✅ Simplification complete."));
        assert!(html.contains("Detected report language: <strong>German</strong>"));
        assert!(html.contains("<strong>Good news</strong>"));
        assert!(html.contains("href=\"/download\""));
        assert!(html.contains("value=\"yes\""));
        assert!(html.contains("maxlength=\"300\""));
        assert!(html.contains("Uses this session: 1/3"));
    }

    #[test]
    fn unknown_language_code_is_shown_raw() {
        let mut session = Session::new();
        session.record_success("x".into(), Some("nl".into()));
        let html = page(&PageView::from_session(&session));
        assert!(html.contains("Detected report language: <strong>nl</strong>"));
    }

    #[test]
    fn report_input_is_escaped() {
        let view = PageView {
            report_input: "</textarea><script>{{ usage_count }}".into(),
            ..PageView::default()
        };
        let html = page(&view);
        assert!(!html.contains("</textarea><script>"));
        assert!(html.contains("&lt;script&gt;{{ usage_count }}"));
    }

    #[test]
    fn capped_session_offers_reset() {
        let mut session = Session::new();
        for _ in 0..3 {
            session.record_success("x".into(), None);
        }
        let html = page(&PageView::from_session(&session));
        assert!(html.contains("/session/reset"));
        assert!(html.contains("Uses this session: 3/3"));
    }

    #[test]
    fn provider_error_notice_carries_detail() {
        let err = SimplifyError::Provider(CompletionError::Http("<b>boom</b>".into()));
        let view = PageView {
            submit_notices: vec![Notice::from(&err)],
            ..PageView::default()
        };
        let html = page(&view);
        assert!(html.contains("notice error"));
        assert!(html.contains("Something went wrong. Please try again."));
        assert!(html.contains("<details>"));
        assert!(html.contains("&lt;b&gt;boom"));
    }

    #[test]
    fn warnings_have_no_detail() {
        let view = PageView {
            submit_notices: vec![Notice::from(&SimplifyError::Input)],
            ..PageView::default()
        };
        let html = page(&view);
        assert!(html.contains("notice warning"));
        assert!(html.contains("Please paste a report first."));
        assert!(!html.contains("<details>"));
    }

    #[test]
    fn feedback_notices_render_inside_result() {
        let mut session = Session::new();
        session.record_success("x".into(), Some("en".into()));
        let mut view = PageView::from_session(&session);
        view.feedback_notices = feedback_notices(&Ok(()));
        let html = page(&view);
        assert!(html.contains("Thanks for your feedback!"));
        assert!(html.contains("✅ Feedback saved."));
    }

    #[test]
    fn feedback_outcomes_map_to_notices() {
        let ok = feedback_notices(&Ok(()));
        assert_eq!(ok[1], Notice::Info("✅ Feedback saved.".into()));

        let rejected = feedback_notices(&Err(FeedbackError::Rejected { status: 500 }));
        assert_eq!(
            rejected[1],
            Notice::Warning("⚠️ Feedback not saved. Please try again.".into())
        );

        let failed = feedback_notices(&Err(FeedbackError::Transport("refused".into())));
        assert!(matches!(&failed[1], Notice::Error { message, .. } if message == "Error sending feedback."));
        assert_eq!(failed[1].detail(), Some("Error sending feedback: refused"));
    }
}
