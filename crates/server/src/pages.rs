//! HTML page rendering.
//!
//! Small string-building functions; user-influenced text goes through
//! `escape_html` before landing in markup.

use archetype_extractor::NarrativeSet;
use archetype_report::ReportView;
use std::fmt::Write as _;

/// Debug dump shows at most this many characters per narrative.
const DEBUG_PREVIEW_CHARS: usize = 800;

// Shown in the footer of every page.
const TIKTOK_URL: &str = "https://www.tiktok.com/@neptunee7777";
const INSTAGRAM_URL: &str = "https://www.instagram.com/kendallm16";

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn shell(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ font-family: Georgia, serif; max-width: 46rem; margin: 2rem auto; \
         padding: 0 1rem; color: #222; }}\n\
         h1 {{ font-size: 1.8rem; }}\n\
         pre.narrative {{ white-space: pre-wrap; font-family: inherit; }}\n\
         .locked {{ color: #8a5a00; }}\n\
         footer {{ margin-top: 3rem; font-style: italic; color: #666; }}\n\
         .socials {{ margin-top: 2rem; font-size: 0.9rem; }}\n\
         </style>\n</head>\n<body>\n{body}\n\
         <p class=\"socials\"><a href=\"{TIKTOK_URL}\">TikTok</a> \u{00b7} \
         <a href=\"{INSTAGRAM_URL}\">Instagram</a></p>\n</body>\n</html>\n"
    )
}

pub(crate) fn landing_page() -> String {
    let body = r#"<h1>Big 5 Detailed Archetype Report</h1>
<p>Select a level for each of the five traits, then unlock your archetype's
detailed narrative with a one-time free code or a purchase.</p>
<form id="trait-form">
  <label>Openness <select id="o"><option>Low</option><option selected>Medium</option><option>High</option></select></label>
  <label>Conscientiousness <select id="c"><option>Low</option><option selected>Medium</option><option>High</option></select></label>
  <label>Extraversion <select id="e"><option>Low</option><option selected>Medium</option><option>High</option></select></label>
  <label>Agreeableness <select id="a"><option>Low</option><option selected>Medium</option><option>High</option></select></label>
  <label>Neuroticism <select id="n"><option>Low</option><option selected>Medium</option><option>High</option></select></label>
  <label>Free code (optional) <input id="free" placeholder="8-character code"></label>
  <button type="submit">View my report</button>
</form>
<p><a href="/subtype">Take the subtype quiz</a></p>
<script>
document.getElementById("trait-form").addEventListener("submit", function (ev) {
  ev.preventDefault();
  var code = ["o", "c", "e", "a", "n"].map(function (id) {
    return document.getElementById(id).value;
  }).join("-");
  var free = document.getElementById("free").value.trim();
  var target = "/report?code=" + encodeURIComponent(code);
  if (free) { target += "&free=" + encodeURIComponent(free); }
  window.location = target;
});
</script>"#;
    shell("Big 5 Archetype Report", body)
}

pub(crate) fn quiz_page() -> String {
    let body = r#"<h1>Subtype Quiz</h1>
<p>Not sure where you land on each trait? Answer honestly, with your first
instinct.</p>
<ol>
  <li>A free evening appears in your calendar. Do you fill it with people,
      a project, or nothing at all?</li>
  <li>When plans change at the last minute, are you relieved, annoyed, or
      indifferent?</li>
  <li>Do you finish what you start because you said you would, or because
      it still interests you?</li>
  <li>When a friend is wrong, do you say so plainly, soften it, or let it
      pass?</li>
  <li>How long does a bad morning follow you around?</li>
</ol>
<p>Score each answer Low, Medium, or High against its trait, then
<a href="/">build your code on the landing page</a>.</p>"#;
    shell("Subtype Quiz", body)
}

pub(crate) fn report_page(view: &ReportView) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1>\n<p>Traits: <strong>{}</strong></p>\n<p>Subtype: <span class=\"locked\">{}</span></p>\n",
        escape_html(&view.archetype),
        escape_html(&view.traits),
        escape_html(&view.subtype),
    );
    for section in &view.sections {
        let _ = write!(
            body,
            "<h2>{}</h2>\n<pre class=\"narrative\">{}</pre>\n",
            escape_html(&section.title),
            escape_html(&section.body),
        );
    }
    let _ = write!(
        body,
        "<p><a href=\"/api/download-report?code={}\">Download as .docx</a></p>\n<footer>{}</footer>",
        urlencode(&view.traits),
        escape_html(&view.quote),
    );
    shell("Detailed Archetype Report", &body)
}

pub(crate) fn debug_page(narratives: &NarrativeSet) -> String {
    let mut html = String::from("<h1>All Archetypes</h1>");
    for (code, text) in narratives.iter_by_code() {
        let name = narratives.name_for_text(text).unwrap_or("Unknown");
        let preview: String = text.chars().take(DEBUG_PREVIEW_CHARS).collect();
        let _ = write!(
            html,
            "<h2>{} ({})</h2><pre>{}...</pre><hr>",
            escape_html(name),
            escape_html(code),
            escape_html(&preview),
        );
    }
    html
}

fn urlencode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}
