//! Server-rendered HTML: the public verification page and the landing page.
//!
//! Every record-derived string goes through `html_escape` before it reaches
//! the markup.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::Html,
};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use idverify_api::{AppState, Backend};
use idverify_core::{
  record::IdentityRecord,
  verify::{Advisor, Verdict, VerdictSource, Verification, VerificationState},
};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;background:#f1f5f9;margin:0;padding:2rem}\
main{max-width:28rem;margin:auto;background:#fff;border-radius:1rem;overflow:hidden;\
box-shadow:0 10px 30px rgba(0,0,0,.08)}\
.banner{padding:1.25rem;color:#fff;text-align:center}\
.banner h1{margin:0;font-size:1.5rem;letter-spacing:.08em}\
.ok{background:#16a34a}.bad{background:#dc2626}.unknown{background:#475569}\
.card{padding:1.5rem;text-align:center}\
.card img{width:8rem;height:8rem;border-radius:50%;object-fit:cover}\
dl{display:grid;grid-template-columns:auto 1fr;gap:.4rem 1rem;text-align:left}\
dt{color:#64748b}dd{margin:0;font-weight:600}\
footer{padding:1rem;color:#94a3b8;font-size:.8rem;text-align:center}";

/// `GET /`: forwards `#/verify/<id>` links (the form printed on QR codes)
/// to the server-rendered page.
pub async fn landing() -> Html<&'static str> {
  Html(concat!(
    "<!doctype html><html><head><meta charset=\"utf-8\">",
    "<meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">",
    "<title>IDVerify</title></head><body>",
    "<p id=\"msg\">IDVerify. Scan an ID card QR code to verify it.</p>",
    "<script>",
    "var p='#/verify/';",
    "if(location.hash.indexOf(p)===0){",
    "var id=location.hash.slice(p.length);",
    "document.getElementById('msg').textContent='Verifying...';",
    "location.replace('verify/'+encodeURIComponent(id));",
    "}",
    "</script></body></html>",
  ))
}

/// `GET /verify/{id}`: public verdict page.
pub async fn verify<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> (StatusCode, Html<String>)
where
  S: Backend,
  A: Advisor + 'static,
{
  let verification = state.resolver.resolve(&id).await;
  let status = match verification.state {
    VerificationState::NotFound => StatusCode::NOT_FOUND,
    _ => StatusCode::OK,
  };
  (status, Html(render(&verification)))
}

/// Render a terminal verification as a full HTML document.
pub fn render(v: &Verification) -> String {
  let (class, heading, body) = match (&v.record, &v.verdict) {
    (Some(record), Some(verdict)) => {
      let class = if verdict.allowed { "ok" } else { "bad" };
      (class, verdict.label.clone(), record_card(record, verdict))
    }
    _ => (
      "unknown",
      "ID NOT FOUND".to_owned(),
      "<div class=\"card\"><p>This ID card is not registered.</p></div>".to_owned(),
    ),
  };

  format!(
    "<!doctype html><html><head><meta charset=\"utf-8\">\
     <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
     <title>{title} | IDVerify</title><style>{STYLE}</style></head><body><main>\
     <div class=\"banner {class}\"><h1>{title}</h1></div>{body}\
     <footer>Checked on {checked}</footer></main></body></html>",
    title = text(&heading),
    checked = v.checked_on,
  )
}

fn record_card(record: &IdentityRecord, verdict: &Verdict) -> String {
  let mut rows = String::new();
  let mut row = |label: &str, value: &str| {
    if !value.trim().is_empty() {
      rows.push_str(&format!("<dt>{}</dt><dd>{}</dd>", text(label), text(value)));
    }
  };
  row("Employee No.", &record.employee_number);
  row("Designation", &record.designation);
  row("Department", &record.department);
  row("Valid till", &record.valid_till.format("%d %b %Y").to_string());
  for field in &record.custom_fields {
    row(&field.label, &field.value);
  }

  let source = if verdict.source == VerdictSource::Advisory {
    " (advisory check)"
  } else {
    ""
  };

  format!(
    "<div class=\"card\"><img src=\"../api/records/{photo}/photo\" alt=\"\">\
     <h2>{name}</h2><p>{reason}{source}</p><dl>{rows}</dl></div>",
    photo = attr(record.id.as_str()),
    name = text(&record.name),
    reason = text(&verdict.reason),
  )
}
