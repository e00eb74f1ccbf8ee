//! vCard 3.0 contact card built from a parsed profile.

use crate::sections::basics::ContactInfo;
use crate::sections::ParseContext;

const LINE_OCTETS: usize = 75;
const CRLF: &str = "\r\n";

/// Escapes text values: backslash, comma, semicolon, newlines.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Folds a content line at 75 octets without splitting a UTF-8 sequence.
/// Continuation lines start with a single space.
pub fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > LINE_OCTETS {
            out.push_str(CRLF);
            out.push(' ');
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

struct CardWriter {
    out: String,
}

impl CardWriter {
    fn line(&mut self, name: &str, value: &str) {
        self.out.push_str(&fold_line(&format!("{name}:{value}")));
        self.out.push_str(CRLF);
    }

    fn text(&mut self, name: &str, value: &str) {
        if !value.trim().is_empty() {
            self.line(name, &escape_text(value));
        }
    }
}

pub fn build_vcard(ctx: &ParseContext, contact: Option<&ContactInfo>) -> String {
    let basics = &ctx.documents.stable.basics;
    let first = ctx.first_name.as_deref().unwrap_or_default();
    let last = ctx.last_name.as_deref().unwrap_or_default();
    let full_name = if basics.name.is_empty() {
        format!("{first} {last}").trim().to_string()
    } else {
        basics.name.clone()
    };

    let mut card = CardWriter { out: String::new() };
    card.line("BEGIN", "VCARD");
    card.line("VERSION", "3.0");
    card.line("N", &format!("{};{};;;", escape_text(last), escape_text(first)));
    card.line("FN", &escape_text(&full_name));
    card.text("TITLE", &basics.label);
    card.text("EMAIL;TYPE=INTERNET", &basics.email);

    let phones: Vec<(String, Option<String>)> = contact
        .and_then(|c| c.phone_numbers.as_deref())
        .map(|numbers| {
            numbers
                .iter()
                .filter(|n| !n.number.trim().is_empty())
                .map(|n| (n.number.clone(), n.kind.clone()))
                .collect()
        })
        .unwrap_or_default();
    if phones.is_empty() {
        card.text("TEL", &basics.phone);
    }
    for (number, kind) in phones {
        let name = match kind {
            Some(kind) => format!("TEL;TYPE={}", kind.to_ascii_uppercase()),
            None => "TEL".to_string(),
        };
        card.text(&name, &number);
    }

    card.text("URL", &basics.url);
    for profile in &basics.profiles {
        card.text(&format!("X-SOCIALPROFILE;TYPE={}", profile.network.to_ascii_lowercase()), &profile.url);
    }

    let location = &basics.location;
    if !(location.address.is_empty() && location.postal_code.is_empty() && location.country_code.is_empty()) {
        card.line(
            "ADR;TYPE=HOME",
            &format!(
                ";;{};{};{};{};{}",
                escape_text(&location.address),
                escape_text(&location.city),
                escape_text(&location.region),
                escape_text(&location.postal_code),
                escape_text(&location.country_code.to_ascii_uppercase()),
            ),
        );
    }

    if !basics.image.is_empty() {
        card.line("PHOTO;VALUE=URI", &basics.image);
    }
    card.text("NOTE", &basics.summary);
    card.line("END", "VCARD");
    card.out
}
