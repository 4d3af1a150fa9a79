//! HTML for form and landing pages

use crate::forms::{FieldKind, FormPage};
use formtrap_common::{escape_html, HoneypotFields};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

/// Form page with its fields, any validation errors and the honeypot markers
pub fn form_page(page: &FormPage, honeypot: &HoneypotFields, errors: &[String]) -> String {
    let mut body = String::new();

    if !page.intro.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", escape_html(&page.intro)));
    }

    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">\n");
        for name in errors {
            body.push_str(&format!("<li>{} is required</li>\n", escape_html(name)));
        }
        body.push_str("</ul>\n");
    }

    body.push_str(&format!(
        "<form action=\"/{}/\" method=\"post\">\n",
        escape_html(&page.slug)
    ));

    for field in &page.fields {
        let name = escape_html(&field.name);
        let required = if field.required { " required" } else { "" };
        body.push_str(&format!(
            "<p><label for=\"{name}\">{label}</label>\n",
            name = name,
            label = escape_html(&field.label)
        ));
        match field.kind {
            FieldKind::Multiline => body.push_str(&format!(
                "<textarea id=\"{name}\" name=\"{name}\"{required}></textarea></p>\n",
                name = name,
                required = required
            )),
            kind => body.push_str(&format!(
                "<input type=\"{kind}\" id=\"{name}\" name=\"{name}\"{required}></p>\n",
                kind = kind.input_type(),
                name = name,
                required = required
            )),
        }
    }

    body.push_str(&honeypot.to_html());
    body.push_str("\n<button type=\"submit\">Submit</button>\n</form>");

    layout(&page.title, &body)
}

/// Confirmation shown after every submission, stored or not
pub fn landing_page(page: &FormPage) -> String {
    let body = format!("<p>{}</p>", escape_html(&page.thank_you_text));
    layout(&page.title, &body)
}

pub fn not_found() -> String {
    layout("Page not found", "<p>Sorry, this page could not be found.</p>")
}
