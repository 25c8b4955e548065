//! Plain HTML pages for browsers. Every interpolated value is escaped.

use models::{info::InfoResponse, statistic::StatisticResponse};

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn rows(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("<tr><th>{}</th><td>{}</td></tr>", escape(k), escape(v)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn info_page(info: &InfoResponse) -> String {
    let table = rows(&[
        ("Name", info.name.as_str()),
        ("Synopsis", info.synopsis.as_str()),
        ("Version", info.version.as_str()),
        ("Institution", info.institution.as_str()),
        ("Release time", info.release_time.as_str()),
        ("Support email", info.support_email.as_str()),
        ("Category", info.category.as_str()),
        ("Research subject", info.research_subject.as_str()),
        ("Tags", info.tags.as_str()),
    ]);
    page("Service information", &format!("<h1>{}</h1>\n<table>\n{table}\n</table>", escape(&info.name)))
}

pub fn stats_page(stats: &StatisticResponse) -> String {
    let table = rows(&[
        ("Name", stats.name.as_str()),
        ("Value", stats.value.as_str()),
        ("Last reset", stats.last_reset.as_str()),
    ]);
    page("Service statistics", &format!("<h1>Statistics</h1>\n<table>\n{table}\n</table>"))
}

pub fn support_page(support_email: &str) -> String {
    let email = escape(support_email);
    page(
        "Support",
        &format!(
            "<h1>Support</h1>\n<p>Questions and problem reports can be sent to <a href=\"mailto:{email}\">{email}</a>.</p>"
        ),
    )
}

/// Demo counter application: current value plus add/reset buttons posting to `/update`.
pub fn app_page(stats: &StatisticResponse) -> String {
    page(
        "Counter",
        &format!(
            "<h1>Counter</h1>\n\
             <p>Invocations: <span id=\"value\">{}</span></p>\n\
             <p>Last reset: <span id=\"last_reset\">{}</span></p>\n\
             <form method=\"post\" action=\"/update\">\n\
             <button type=\"submit\" name=\"add\" value=\"1\">Add</button>\n\
             <button type=\"submit\" name=\"reset\" value=\"1\">Reset</button>\n\
             </form>",
            escape(&stats.value),
            escape(&stats.last_reset)
        ),
    )
}
