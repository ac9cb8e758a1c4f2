//! Message bodies for the notification channels

use crate::models::LeadRecord;

/// Telegram rejects messages longer than this, counted in UTF-16 code units
pub const TELEGRAM_MAX_LEN: usize = 4096;

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain number: integers without a fractional part, otherwise as-is
pub fn plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Italian grouping: `.` for thousands, `,` for decimals, at most three
/// fraction digits.
pub fn it_number(n: f64) -> String {
    let rounded = (n * 1000.0).round() / 1000.0;
    let fixed = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::new();
    let digits = int_part.len();
    for (i, d) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(d);
    }

    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

pub fn email_subject(lead: &LeadRecord, campaign: &str) -> String {
    format!(
        "Nuova richiesta quota {}% — {}",
        plain_number(lead.share_percent),
        campaign
    )
}

pub fn email_html(lead: &LeadRecord, campaign: &str) -> String {
    let message = escape_html(&lead.message).replace('\n', "<br/>");

    format!(
        r#"<div style="font-family:system-ui,-apple-system,Segoe UI,Roboto">
  <h2>Richiesta quota {share}% — {campaign}</h2>
  <p><strong>Nome:</strong> {name}<br/>
     <strong>Email:</strong> {email}<br/>
     <strong>Azienda:</strong> {company}</p>
  <p><strong>Messaggio:</strong><br/>{message}</p>
  <hr/>
  <p><strong>Ore stimate incluse:</strong> {hours} h<br/>
     <strong>Investimento stimato:</strong> € {cost}<br/>
     <strong>Obiettivo annuo:</strong> € {target}</p>
  <p><strong>Assunzioni</strong>: {weeks} sett × {days} gg × {per_day} h</p>
  <hr/>
  <p style="color:#666">UA: {ua}<br/>IP: {ip}</p>
</div>
"#,
        share = plain_number(lead.share_percent),
        campaign = escape_html(campaign),
        name = escape_html(&lead.name),
        email = escape_html(&lead.email),
        company = escape_html(&lead.company),
        message = message,
        hours = lead.client_hours,
        cost = it_number(lead.client_cost),
        target = it_number(lead.target),
        weeks = plain_number(lead.weeks),
        days = plain_number(lead.days_per_week),
        per_day = plain_number(lead.hours_per_day),
        ua = escape_html(&lead.user_agent),
        ip = escape_html(&lead.ip),
    )
}

/// Plain-text summary for chat channels, cut to `max_len` UTF-16 units
pub fn chat_text(lead: &LeadRecord, max_len: usize) -> String {
    let text = format!(
        "Nuova richiesta quota {share}%\n\
         Nome: {name}\n\
         Email: {email}\n\
         Azienda: {company}\n\
         Ore: {hours} h · Investimento: € {cost}\n\
         Assunzioni: {weeks} sett × {days} gg × {per_day} h\n\
         \n\
         {message}",
        share = plain_number(lead.share_percent),
        name = lead.name,
        email = lead.email,
        company = lead.company,
        hours = lead.client_hours,
        cost = it_number(lead.client_cost),
        weeks = plain_number(lead.weeks),
        days = plain_number(lead.days_per_week),
        per_day = plain_number(lead.hours_per_day),
        message = lead.message,
    );

    truncate_utf16(&text, max_len)
}

/// Cut `s` to at most `max_len` UTF-16 code units, ending with `…` when
/// cut. Never splits a character.
pub fn truncate_utf16(s: &str, max_len: usize) -> String {
    if s.encode_utf16().count() <= max_len {
        return s.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let budget = max_len - '…'.len_utf16();
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}
